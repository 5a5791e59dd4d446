//! SSD1306 display composition and transfer engine.
//!
//! - [`commands`]: command set and bring-up sequence
//! - [`icons`]: arrows, reference-mode and hold bitmaps
//! - [`frame`]: page-organized frame buffer, addressing regions and the
//!   `embedded-graphics` canvas used for glyph composition
//! - [`engine`]: non-blocking transfer state machine and the draw operations

pub mod commands;
pub mod engine;
pub mod frame;
pub mod icons;

pub use commands::Command;
pub use engine::{DisplayEngine, DisplayLine, DisplayPort, DisplayState, ReferenceMode, TransferStatus};
pub use frame::{Frame, FrameRegion};
