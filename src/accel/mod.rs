//! ADXL345 accelerometer acquisition engine.
//!
//! - [`registers`]: register map and bit fields
//! - [`engine`]: non-blocking acquisition state machine (bring-up, factory
//!   self-test, FIFO integration, angle derivation)

pub mod engine;
pub mod registers;

pub use engine::{AccelBus, AccelEngine, AccelState, Axis};
pub use registers::Register;
