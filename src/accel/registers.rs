//! ADXL345 register map and bit fields.
//!
//! See the datasheet, section "Register Map". Only the registers the
//! acquisition engine touches are listed.

/// Register addresses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    DeviceId = 0x00,
    BandwidthRate = 0x2C,
    PowerControl = 0x2D,
    InterruptEnable = 0x2E,
    DataFormat = 0x31,
    DataX0 = 0x32,
    FifoControl = 0x38,
}

impl Register {
    /// Raw register address (also the SPI write opcode).
    #[must_use]
    pub const fn addr(self) -> u8 { self as u8 }
}

/// Expected DEVID value.
pub const DEVICE_ID: u8 = 0xE5;

/// Number of consecutive data registers holding one X/Y/Z sample.
pub const DATA_REGISTER_COUNT: usize = 6;

// SPI opcode modifier bits (OR'ed with the register address by the bus).
pub const SPI_READ: u8 = 0x80;
pub const SPI_MULTI_BYTE: u8 = 0x40;

// DATA_FORMAT bits
pub const SELF_TEST: u8 = 0x80;
pub const INT_ACTIVE_LOW: u8 = 0x20;
pub const FULL_RESOLUTION: u8 = 0x08;
pub const RANGE_16G: u8 = 0x03;

/// Default data format: 4-wire SPI, active-low interrupts, 13-bit
/// right-justified resolution, +/-16 g range, self-test off.
pub const DATA_FORMAT_DEFAULT: u8 = INT_ACTIVE_LOW | FULL_RESOLUTION | RANGE_16G;

// BW_RATE bits
pub const RATE_200HZ: u8 = 0x0B;
pub const POWER_NORMAL: u8 = 0x00;

// POWER_CTL bits
pub const MEASURE_MODE: u8 = 0x08;

// INT_ENABLE bits
pub const INT_WATERMARK: u8 = 0x02;

// FIFO_CTL bits
pub const FIFO_BYPASS: u8 = 0x00;
pub const FIFO_STREAM: u8 = 0x80;

/// Stream mode with the watermark one below the batch size: the interrupt
/// fires while the last sample of the batch is still being produced.
pub const FIFO_CONTROL_STREAM: u8 =
    FIFO_STREAM | (crate::config::SAMPLES_PER_BATCH as u8 - 1);

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_format_default_has_self_test_off() {
        assert_eq!(DATA_FORMAT_DEFAULT & SELF_TEST, 0);
        assert_eq!(DATA_FORMAT_DEFAULT, 0x2B);
    }

    #[test]
    fn test_fifo_watermark_level() {
        assert_eq!(FIFO_CONTROL_STREAM & 0x1F, 31);
        assert_eq!(FIFO_CONTROL_STREAM & 0xC0, FIFO_STREAM);
    }

    #[test]
    fn test_read_opcode_layout() {
        // Burst read of the data block: read + multi-byte + address
        let opcode = SPI_READ | SPI_MULTI_BYTE | Register::DataX0.addr();
        assert_eq!(opcode, 0xF2);
    }
}
