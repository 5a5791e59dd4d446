//! Inclinometer library - testable modules for the tilt meter firmware.
//!
//! This library contains the two device state machines and everything else
//! that can be tested on the host machine. The binary (`main.rs`) uses this
//! library and adds the embedded-specific code (SPI/DMA transports and the
//! orchestration loop).
//!
//! # Architecture
//!
//! Two cooperative, non-blocking state machines advanced one step per
//! millisecond tick:
//!
//! - [`accel::AccelEngine`]: ADXL345 bring-up, factory self-test, FIFO
//!   integration and roll/pitch angle derivation
//! - [`display::DisplayEngine`]: SSD1306 bring-up, frame composition and
//!   DMA-driven transfers
//!
//! Both engines own their transport through a trait ([`accel::AccelBus`],
//! [`display::DisplayPort`]) injected at construction, so host tests drive
//! them with scripted mocks.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test --lib
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod accel;
pub mod button;
pub mod config;
pub mod display;
pub mod error;
pub mod timing;

pub use error::{ErrorCode, Operation, Severity};
