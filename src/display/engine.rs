//! Non-blocking SSD1306 composition and transfer state machine.
//!
//! Draw calls are pure memory writes into the staged frame region plus
//! bookkeeping of the matching addressing window; the state machine then
//! sends the window commands and hands the staged bytes to the port's block
//! transfer. The engine never blocks on the transfer itself, it polls the
//! port once per step.
//!
//! # State machine
//!
//! ```text
//! Configuring -> SendingData -> WaitingForTransferDone -> Idle
//! Idle -> SendingData (on any draw call)
//! ```
//!
//! Callers are expected to draw only while [`DisplayEngine::is_ready`] holds.
//! Drawing earlier overwrites the staged region mid-flight: the display may
//! show a torn frame, but the machine itself stays consistent.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use profont::PROFONT_12_POINT;

use super::commands::{self, Command};
use super::frame::{Frame, FrameRegion};
use super::icons::{
    ABSOLUTE_REFERENCE_ICON,
    ARROWS_ICON,
    ARROWS_ICON_WIDTH,
    HOLD_ICON,
    RELATIVE_REFERENCE_ICON,
    STATUS_ICON_WIDTH,
};
use crate::config::{SCREEN_PAGES, SCREEN_WIDTH, TRANSFER_TIMEOUT_MS};
use crate::error::{ErrorCode, Operation, Severity};
use crate::timing::CountdownTimer;

/// Largest angle magnitude the display renders, in tenths of a degree.
/// Larger readings are clamped, not rejected.
pub const MAX_ANGLE_TENTHS: i16 = 900;

/// Column where the angle text starts (right of the arrows icon).
const ANGLE_TEXT_COLUMN: usize = 40;

/// An angle line spans two pages (the 15 px glyphs need 16 rows).
const ANGLE_TEXT_PAGES: usize = 2;

/// Widest angle text: sign, two digits, dot, tenths digit, degree sign.
const ANGLE_TEXT_GLYPHS: usize = 6;

/// Page carrying the horizontal separator between the two angle lines.
const SEPARATOR_PAGE: usize = 4;

/// First separator column; the arrows icon zone stays clear.
const SEPARATOR_FIRST_COLUMN: usize = 32;

/// Two-pixel-high separator line within its page.
const SEPARATOR_PATTERN: u8 = 0x03;

/// Status icons live on the last page, right-aligned.
const STATUS_ICON_PAGE: usize = SCREEN_PAGES - 1;
const REFERENCE_ICON_COLUMN: usize = SCREEN_WIDTH - STATUS_ICON_WIDTH;
const HOLD_ICON_COLUMN: usize = REFERENCE_ICON_COLUMN - STATUS_ICON_WIDTH;

/// Which of the two angle lines a draw targets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum DisplayLine {
    /// Upper line, pages 1-2.
    Roll,
    /// Lower line, pages 5-6.
    Pitch,
}

impl DisplayLine {
    const fn first_page(self) -> usize {
        match self {
            Self::Roll => 1,
            Self::Pitch => 5,
        }
    }
}

/// Measurement reference announced by the bottom-right icon.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum ReferenceMode {
    /// Angles relative to gravity.
    Absolute,
    /// Angles relative to a zeroed position.
    Relative,
}

/// Outcome of polling an in-flight block transfer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum TransferStatus {
    /// Still moving bytes.
    Busy,
    /// All bytes delivered.
    Complete,
    /// The transfer engine reported an error.
    Faulted,
}

/// Synchronous-serial transport to the display, including the block-transfer
/// engine used for frame data.
///
/// Implementations own the serial peripheral, the data/command and reset
/// lines and one transfer channel. `send_command` drives the data/command
/// line low for the opcode and its parameters; the transaction must be
/// bounded, and a failed one reports `(SendCommand, 2, Warning)`.
/// `start_frame_transfer` switches to data mode and starts moving `data`
/// in the background; the buffer must stay untouched until
/// [`DisplayPort::finish_transfer`].
pub trait DisplayPort {
    /// Pulse the hardware reset line.
    fn reset(&mut self);

    /// Send one command opcode followed by its parameter bytes.
    fn send_command(
        &mut self,
        command: Command,
        parameters: &[u8],
    ) -> Result<(), ErrorCode>;

    /// Arm and start a background transfer of `data` in data mode.
    fn start_frame_transfer(
        &mut self,
        data: &[u8],
    );

    /// Poll the in-flight transfer.
    fn transfer_status(&self) -> TransferStatus;

    /// Tear down the transfer channel after completion, timeout or fault.
    fn finish_transfer(&mut self);
}

/// Composition and transfer state machine states.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum DisplayState {
    /// Resetting and writing the bring-up command sequence.
    Configuring,
    /// A staged region is waiting for its window commands and transfer start.
    SendingData,
    /// A block transfer is in flight.
    WaitingForTransferDone,
    /// Nothing staged, nothing in flight.
    Idle,
}

/// SSD1306 display engine.
pub struct DisplayEngine<P: DisplayPort> {
    port: P,
    state: DisplayState,
    timer: CountdownTimer,
    frame: Frame,
    region: FrameRegion,
}

impl<P: DisplayPort> DisplayEngine<P> {
    /// Create an engine owning its transport, ready to start bring-up.
    pub fn new(port: P) -> Self {
        Self {
            port,
            state: DisplayState::Configuring,
            timer: CountdownTimer::new(),
            frame: Frame::new(),
            region: FrameRegion::full_screen(),
        }
    }

    /// Current state machine node.
    #[must_use]
    pub const fn state(&self) -> DisplayState { self.state }

    /// Whether the engine can accept a new draw without tearing the frame
    /// currently in flight.
    #[must_use]
    pub fn is_ready(&self) -> bool { self.state == DisplayState::Idle }

    /// Advance the state machine by one tick.
    ///
    /// `elapsed_ms` is the time since the previous step; it feeds the
    /// transfer timeout. Never blocks beyond the bounded command writes.
    pub fn step(
        &mut self,
        elapsed_ms: u32,
    ) -> Result<(), ErrorCode> {
        self.timer.tick(elapsed_ms);

        match self.state {
            DisplayState::Configuring => self.step_configuring(),
            DisplayState::SendingData => self.step_sending_data(),
            DisplayState::WaitingForTransferDone => self.step_waiting_for_transfer(),
            DisplayState::Idle => Ok(()),
        }
    }

    /// Stage the full base screen: arrows icon, separator line and the
    /// absolute-reference icon. Forces a transfer of the whole frame.
    pub fn draw_base_screen(&mut self) {
        self.frame.clear();

        for page in 0..SCREEN_PAGES {
            self.frame.blit(
                page * SCREEN_WIDTH,
                &ARROWS_ICON[page * ARROWS_ICON_WIDTH..(page + 1) * ARROWS_ICON_WIDTH],
            );
        }

        self.frame.fill(
            SEPARATOR_PAGE * SCREEN_WIDTH + SEPARATOR_FIRST_COLUMN,
            SCREEN_WIDTH - SEPARATOR_FIRST_COLUMN,
            SEPARATOR_PATTERN,
        );

        self.frame.blit(
            STATUS_ICON_PAGE * SCREEN_WIDTH + REFERENCE_ICON_COLUMN,
            &ABSOLUTE_REFERENCE_ICON,
        );

        self.region = FrameRegion::full_screen();
        self.state = DisplayState::SendingData;
    }

    /// Stage an angle readout on `line`, clamped to +/-90.0 degrees.
    ///
    /// The staged region always covers the full six-glyph width so a shorter
    /// text erases the previous longer one.
    pub fn print_angle(
        &mut self,
        tenths: i16,
        line: DisplayLine,
    ) -> Result<(), ErrorCode> {
        let clamped = tenths.clamp(-MAX_ANGLE_TENTHS, MAX_ANGLE_TENTHS);

        let mut text: String<8> = String::new();
        let sign = if clamped < 0 { '-' } else { '+' };
        let magnitude = clamped.unsigned_abs();
        write!(text, "{sign}{}.{}\u{00B0}", magnitude / 10, magnitude % 10)
            .map_err(|_| ErrorCode::new(Operation::PrintAngle, 1, Severity::Warning))?;

        let font = &PROFONT_12_POINT;
        let glyph_width = (font.character_size.width + font.character_spacing) as usize;
        let width = glyph_width * ANGLE_TEXT_GLYPHS;

        self.frame.fill(0, width * ANGLE_TEXT_PAGES, 0x00);
        let mut canvas = self.frame.canvas(width, ANGLE_TEXT_PAGES);
        let style = MonoTextStyle::new(font, BinaryColor::On);
        // The canvas clips, drawing cannot fail
        let _ = Text::with_baseline(&text, Point::zero(), style, Baseline::Top).draw(&mut canvas);

        self.region = FrameRegion::new(
            ANGLE_TEXT_COLUMN,
            width,
            line.first_page(),
            ANGLE_TEXT_PAGES,
        );
        self.state = DisplayState::SendingData;
        Ok(())
    }

    /// Stage the reference-mode icon in the bottom-right corner.
    pub fn print_reference_icon(
        &mut self,
        mode: ReferenceMode,
    ) {
        let icon = match mode {
            ReferenceMode::Absolute => &ABSOLUTE_REFERENCE_ICON,
            ReferenceMode::Relative => &RELATIVE_REFERENCE_ICON,
        };
        self.frame.blit(0, icon);

        self.region = FrameRegion::new(
            REFERENCE_ICON_COLUMN,
            STATUS_ICON_WIDTH,
            STATUS_ICON_PAGE,
            1,
        );
        self.state = DisplayState::SendingData;
    }

    /// Stage (or erase) the hold icon left of the reference icon.
    pub fn print_hold_icon(
        &mut self,
        shown: bool,
    ) {
        if shown {
            self.frame.blit(0, &HOLD_ICON);
        } else {
            self.frame.fill(0, STATUS_ICON_WIDTH, 0x00);
        }

        self.region = FrameRegion::new(HOLD_ICON_COLUMN, STATUS_ICON_WIDTH, STATUS_ICON_PAGE, 1);
        self.state = DisplayState::SendingData;
    }

    /// Reset the controller and write the bring-up sequence.
    ///
    /// On failure the engine stays in Configuring so the next step retries
    /// the whole sequence; giving up is the caller's policy.
    fn step_configuring(&mut self) -> Result<(), ErrorCode> {
        self.port.reset();

        for (command, parameters) in commands::INIT_SEQUENCE {
            self.port
                .send_command(command, parameters)
                .map_err(|e| e.push(Operation::DisplayInit, 1))?;
        }

        self.draw_base_screen();
        Ok(())
    }

    /// Set the addressing window and hand the staged bytes to the transfer
    /// engine. Window command failures drop the staged frame and return to
    /// Idle.
    fn step_sending_data(&mut self) -> Result<(), ErrorCode> {
        if let Err(e) = self
            .port
            .send_command(Command::SetColumnAddress, &self.region.columns)
        {
            self.state = DisplayState::Idle;
            return Err(e.push(Operation::SendData, 1));
        }

        if let Err(e) = self
            .port
            .send_command(Command::SetPageAddress, &self.region.pages)
        {
            self.state = DisplayState::Idle;
            return Err(e.push(Operation::SendData, 2));
        }

        self.port.start_frame_transfer(self.frame.staged(self.region.len));
        self.timer.arm(TRANSFER_TIMEOUT_MS);
        self.state = DisplayState::WaitingForTransferDone;
        Ok(())
    }

    /// Poll the in-flight transfer; stop it on completion, timeout or fault.
    fn step_waiting_for_transfer(&mut self) -> Result<(), ErrorCode> {
        let outcome = match self.port.transfer_status() {
            TransferStatus::Busy => {
                if !self.timer.expired() {
                    return Ok(());
                }
                Err(ErrorCode::new(Operation::WaitTransfer, 1, Severity::Error))
            }
            TransferStatus::Faulted => {
                Err(ErrorCode::new(Operation::WaitTransfer, 2, Severity::Error))
            }
            TransferStatus::Complete => Ok(()),
        };

        self.port.finish_transfer();
        self.state = DisplayState::Idle;
        outcome
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
