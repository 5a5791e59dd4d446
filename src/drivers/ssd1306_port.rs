//! `DisplayPort` over SPI0 with one raw DMA channel for frame data.
//!
//! Commands go out through blocking writes with the data/command line low.
//! Frame data is handed to a DMA channel feeding the SPI TX FIFO so the
//! engine can keep polling instead of waiting out a 1 KiB transfer; the
//! channel's CTRL register exposes the busy and bus-error bits the engine's
//! `transfer_status` poll maps onto.

use embassy_rp::Peri;
use embassy_rp::gpio::Output;
use embassy_rp::pac;
use embassy_rp::peripherals::{DMA_CH0, SPI0};
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Duration, block_for};
use inclinometer_pico2::display::commands::{self, Command};
use inclinometer_pico2::display::{DisplayPort, TransferStatus};
use inclinometer_pico2::error::{ErrorCode, Operation, Severity};

/// Index of the claimed DMA channel (matches the `DMA_CH0` peripheral held
/// by the port).
const FRAME_DMA_CHANNEL: usize = 0;

/// Reset pulse width; the controller asks for 3 us minimum.
const RESET_PULSE: Duration = Duration::from_micros(10);

pub struct Ssd1306Port<'d> {
    spi: Spi<'d, SPI0, Blocking>,
    dc: Output<'d>,
    res: Output<'d>,
    cs: Output<'d>,
    _dma: Peri<'d, DMA_CH0>,
}

impl<'d> Ssd1306Port<'d> {
    pub fn new(
        spi: Spi<'d, SPI0, Blocking>,
        dc: Output<'d>,
        res: Output<'d>,
        cs: Output<'d>,
        dma: Peri<'d, DMA_CH0>,
    ) -> Self {
        Self {
            spi,
            dc,
            res,
            cs,
            _dma: dma,
        }
    }
}

impl DisplayPort for Ssd1306Port<'_> {
    fn reset(&mut self) {
        self.res.set_low();
        block_for(RESET_PULSE);
        self.res.set_high();
        block_for(RESET_PULSE);
    }

    fn send_command(
        &mut self,
        command: Command,
        parameters: &[u8],
    ) -> Result<(), ErrorCode> {
        commands::check_parameter_count(parameters)?;

        self.dc.set_low();
        self.cs.set_low();
        let mut result = self.spi.blocking_write(&[command.opcode()]);
        if result.is_ok() && !parameters.is_empty() {
            result = self.spi.blocking_write(parameters);
        }
        self.cs.set_high();

        result.map_err(|_| ErrorCode::new(Operation::SendCommand, 2, Severity::Warning))
    }

    fn start_frame_transfer(
        &mut self,
        data: &[u8],
    ) {
        self.dc.set_high();
        self.cs.set_low();

        let channel = pac::DMA.ch(FRAME_DMA_CHANNEL);

        // Reprogram only while disabled
        channel.ctrl_trig().modify(|w| w.set_en(false));
        channel.read_addr().write_value(data.as_ptr() as u32);
        channel
            .write_addr()
            .write_value(pac::SPI0.dr().as_ptr() as u32);
        channel.trans_count().write_value(data.len() as u32);

        // Writing CTRL_TRIG with EN set starts the transfer
        channel.ctrl_trig().write(|w| {
            w.set_incr_read(true);
            w.set_incr_write(false);
            w.set_data_size(pac::dma::vals::DataSize::SIZE_BYTE);
            w.set_treq_sel(pac::dma::vals::TreqSel::SPI0_TX);
            w.set_chain_to(FRAME_DMA_CHANNEL as u8);
            w.set_en(true);
        });
    }

    fn transfer_status(&self) -> TransferStatus {
        let control = pac::DMA.ch(FRAME_DMA_CHANNEL).ctrl_trig().read();
        if control.ahb_error() {
            TransferStatus::Faulted
        } else if control.busy() {
            TransferStatus::Busy
        } else {
            TransferStatus::Complete
        }
    }

    fn finish_transfer(&mut self) {
        let channel = pac::DMA.ch(FRAME_DMA_CHANNEL);
        channel.ctrl_trig().modify(|w| {
            w.set_en(false);
            // Bus-error flags are write-one-to-clear
            w.set_read_error(true);
            w.set_write_error(true);
        });

        // Drain the serial shifter before releasing the device
        while pac::SPI0.sr().read().bsy() {}
        self.cs.set_high();
    }
}
