//! Handheld inclinometer firmware for Raspberry Pi Pico 2 (RP2350).
//!
//! Reads roll and pitch from an ADXL345 over SPI1 and shows them on a
//! 128x64 SSD1306 over SPI0 with DMA frame transfers.
//!
//! # Architecture
//!
//! Both device engines are cooperative state machines advanced once per
//! millisecond tick; neither ever blocks beyond one bounded SPI transaction.
//! The loop alternates roll and pitch pushes so each display transfer stays
//! small.
//!
//! # Button Controls
//!
//! - **Zero**: toggle between absolute angles and angles relative to the
//!   current position
//! - **Hold**: freeze the displayed values
//!
//! The binary only targets ARM; on the host this file is an empty stub so
//! `cargo test` and `cargo build` work without a cross toolchain.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

#[cfg(target_arch = "arm")]
mod drivers;

#[cfg(target_arch = "arm")]
mod firmware {
    use defmt::{error, info, warn};
    use embassy_executor::Spawner;
    use embassy_rp::gpio::{Input, Level, Output, Pull};
    use embassy_rp::spi::{self, Spi};
    use embassy_time::{Duration, Ticker};
    use inclinometer_pico2::accel::{AccelEngine, AccelState, Axis};
    use inclinometer_pico2::button::ButtonState;
    use inclinometer_pico2::config::TICK_PERIOD_MS;
    use inclinometer_pico2::display::{DisplayEngine, DisplayLine, ReferenceMode};
    use inclinometer_pico2::error::{ErrorCode, Severity};
    use {defmt_rtt as _, panic_probe as _};

    use crate::drivers::{Adxl345Bus, Ssd1306Port};

    // Program metadata for `picotool info`
    #[unsafe(link_section = ".bi_entries")]
    #[used]
    pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
        embassy_rp::binary_info::rp_program_name!(c"inclinometer"),
        embassy_rp::binary_info::rp_program_description!(
            c"Handheld inclinometer (ADXL345 + SSD1306)"
        ),
        embassy_rp::binary_info::rp_cargo_version!(),
        embassy_rp::binary_info::rp_program_build_attribute!(),
    ];

    /// SSD1306 serial clock tops out at 10 MHz.
    fn display_spi_config() -> spi::Config {
        let mut config = spi::Config::default();
        config.frequency = 10_000_000;
        config
    }

    /// ADXL345 talks SPI mode 3, up to 5 MHz.
    fn accel_spi_config() -> spi::Config {
        let mut config = spi::Config::default();
        config.frequency = 2_000_000;
        config.polarity = spi::Polarity::IdleHigh;
        config.phase = spi::Phase::CaptureOnSecondTransition;
        config
    }

    /// Route a step failure to the log matching its severity.
    fn log_failure(
        device: &str,
        error: ErrorCode,
    ) {
        match error.severity() {
            Severity::Error | Severity::Critical => {
                error!("{=str} failure: {}", device, error);
            }
            _ => warn!("{=str} warning: {}", device, error),
        }
    }

    #[embassy_executor::main]
    async fn main(_spawner: Spawner) {
        info!("Inclinometer starting...");
        let p = embassy_rp::init(Default::default());

        // Display on SPI0: CLK=18, MOSI=19, CS=17, DC=16, RES=20 (TX only)
        let display_spi =
            Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, display_spi_config());
        let port = Ssd1306Port::new(
            display_spi,
            Output::new(p.PIN_16, Level::Low),
            Output::new(p.PIN_20, Level::High),
            Output::new(p.PIN_17, Level::High),
            p.DMA_CH0,
        );
        let mut display = DisplayEngine::new(port);

        // Accelerometer on SPI1: CLK=10, MOSI=11, MISO=12, CS=13, INT1=14
        let accel_spi =
            Spi::new_blocking(p.SPI1, p.PIN_10, p.PIN_11, p.PIN_12, accel_spi_config());
        let bus = Adxl345Bus::new(
            accel_spi,
            Output::new(p.PIN_13, Level::High),
            Input::new(p.PIN_14, Pull::None),
        );
        let mut accel = AccelEngine::new(bus);

        // Buttons are active-low with internal pull-ups
        let zero_button = Input::new(p.PIN_2, Pull::Up);
        let hold_button = Input::new(p.PIN_3, Pull::Up);
        let mut zero_state = ButtonState::new();
        let mut hold_state = ButtonState::new();

        info!("Peripherals initialized");

        let mut zeroed = false;
        let mut hold = false;
        let mut next_line = DisplayLine::Roll;

        let mut ticker = Ticker::every(Duration::from_millis(u64::from(TICK_PERIOD_MS)));
        loop {
            ticker.next().await;

            if let Err(e) = accel.step(TICK_PERIOD_MS) {
                log_failure("accelerometer", e);
            }
            if let Err(e) = display.step(TICK_PERIOD_MS) {
                log_failure("display", e);
            }

            if zero_state.just_pressed(zero_button.is_low(), TICK_PERIOD_MS)
                && display.is_ready()
            {
                zeroed = !zeroed;
                if zeroed {
                    accel.zero_current_position();
                } else {
                    accel.restore_absolute_reference();
                }
                display.print_reference_icon(if zeroed {
                    ReferenceMode::Relative
                } else {
                    ReferenceMode::Absolute
                });
                info!("Reference: {=str}", if zeroed { "relative" } else { "absolute" });
                continue;
            }

            if hold_state.just_pressed(hold_button.is_low(), TICK_PERIOD_MS)
                && display.is_ready()
            {
                hold = !hold;
                display.print_hold_icon(hold);
                info!("Hold: {=bool}", hold);
                continue;
            }

            if hold || !display.is_ready() || accel.state() != AccelState::Measuring {
                continue;
            }

            // Alternate the two lines so each transfer stays one small region
            let (axis, line) = match next_line {
                DisplayLine::Roll => (Axis::X, DisplayLine::Roll),
                DisplayLine::Pitch => (Axis::Y, DisplayLine::Pitch),
            };
            next_line = match next_line {
                DisplayLine::Roll => DisplayLine::Pitch,
                DisplayLine::Pitch => DisplayLine::Roll,
            };

            if accel.has_changed(axis)
                && let Err(e) = display.print_angle(accel.angle_tenths(axis), line)
            {
                log_failure("display", e);
            }
        }
    }
}

#[cfg(not(target_arch = "arm"))]
fn main() {}
