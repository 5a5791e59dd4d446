//! `AccelBus` over SPI1 with chip select and the INT1 watermark line.
//!
//! The ADXL345 talks SPI mode 3 at up to 5 MHz. Register writes are a
//! two-byte frame; reads OR the read (and multi-byte) modifier bits into the
//! address and clock dummy bytes while the device answers, so the echoed
//! opcode byte never reaches the caller's buffer.

use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Duration, block_for};
use inclinometer_pico2::accel::registers::{
    DATA_REGISTER_COUNT,
    SPI_MULTI_BYTE,
    SPI_READ,
};
use inclinometer_pico2::accel::{AccelBus, Register};
use inclinometer_pico2::error::{ErrorCode, Operation, Severity};

/// Gap the device needs between two consecutive FIFO reads.
const FIFO_READ_GAP: Duration = Duration::from_micros(5);

pub struct Adxl345Bus<'d> {
    spi: Spi<'d, SPI1, Blocking>,
    cs: Output<'d>,
    watermark: Input<'d>,
}

impl<'d> Adxl345Bus<'d> {
    pub fn new(
        spi: Spi<'d, SPI1, Blocking>,
        cs: Output<'d>,
        watermark: Input<'d>,
    ) -> Self {
        Self { spi, cs, watermark }
    }
}

impl AccelBus for Adxl345Bus<'_> {
    fn write_register(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), ErrorCode> {
        let frame = [register.addr(), value];

        self.cs.set_low();
        let result = self.spi.blocking_write(&frame);
        self.cs.set_high();

        result.map_err(|_| ErrorCode::new(Operation::WriteRegister, 2, Severity::Warning))
    }

    fn read_registers(
        &mut self,
        first: Register,
        buffer: &mut [u8],
    ) -> Result<(), ErrorCode> {
        let mut opcode = first.addr() | SPI_READ;
        if buffer.len() > 1 {
            opcode |= SPI_MULTI_BYTE;
        }

        // Opcode byte plus the largest burst (one data block)
        let mut frame = [0u8; 1 + DATA_REGISTER_COUNT];
        frame[0] = opcode;
        let frame = &mut frame[..1 + buffer.len()];

        self.cs.set_low();
        let result = self.spi.blocking_transfer_in_place(frame);
        self.cs.set_high();

        result.map_err(|_| ErrorCode::new(Operation::ReadRegisters, 2, Severity::Warning))?;
        buffer.copy_from_slice(&frame[1..]);

        // FIFO pops need 5 us of bus idle before the next pop
        if first == Register::DataX0 {
            block_for(FIFO_READ_GAP);
        }

        Ok(())
    }

    fn data_ready(&self) -> bool {
        // Interrupts are configured active-low (DATA_FORMAT INT_INVERT)
        self.watermark.is_low()
    }
}
