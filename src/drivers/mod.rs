//! Hardware transport implementations (ARM only).
//!
//! - [`adxl345_bus`]: blocking SPI + chip select + INT1 input behind
//!   `AccelBus`
//! - [`ssd1306_port`]: SPI with a raw DMA channel for frame data behind
//!   `DisplayPort`

pub mod adxl345_bus;
pub mod ssd1306_port;

pub use adxl345_bus::Adxl345Bus;
pub use ssd1306_port::Ssd1306Port;
