//! SSD1306 command set.
//!
//! Only the commands the engine issues are listed. Commands travel on the
//! serial link with the data/command line low; their parameter bytes follow
//! immediately.

use crate::error::{ErrorCode, Operation, Severity};

/// Command opcodes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    SetAddressingMode = 0x20,
    SetColumnAddress = 0x21,
    SetPageAddress = 0x22,
    SetContrast = 0x81,
    SetChargePump = 0x8D,
    SegmentRemapReversed = 0xA1,
    DisplayOn = 0xAF,
    ScanDirectionReversed = 0xC8,
    SetComPins = 0xDA,
    SetClockDivide = 0xD5,
}

impl Command {
    /// Raw opcode byte.
    #[must_use]
    pub const fn opcode(self) -> u8 { self as u8 }
}

/// Maximum number of parameter bytes a command can carry.
pub const MAX_PARAMETERS: usize = 6;

// Parameter values used during bring-up
pub const HORIZONTAL_ADDRESSING: u8 = 0x00;
pub const COM_PINS_ALTERNATIVE: u8 = 0x12;
pub const CONTRAST_HIGHEST: u8 = 0xFF;
pub const CLOCK_FREQ_MID_DIV_1: u8 = 0x80;
pub const CHARGE_PUMP_ENABLED: u8 = 0x14;

/// Ordered bring-up sequence, per the datasheet application example.
/// Registers keeping their reset values are not touched.
pub const INIT_SEQUENCE: [(Command, &[u8]); 8] = [
    (Command::ScanDirectionReversed, &[]),
    (Command::SetComPins, &[COM_PINS_ALTERNATIVE]),
    (Command::SegmentRemapReversed, &[]),
    (Command::SetAddressingMode, &[HORIZONTAL_ADDRESSING]),
    (Command::SetContrast, &[CONTRAST_HIGHEST]),
    (Command::SetClockDivide, &[CLOCK_FREQ_MID_DIV_1]),
    (Command::SetChargePump, &[CHARGE_PUMP_ENABLED]),
    (Command::DisplayOn, &[]),
];

/// Validate a parameter list before it reaches the wire.
///
/// Local, non-fatal: the caller receives a warning and the machine state is
/// unaffected.
pub fn check_parameter_count(parameters: &[u8]) -> Result<(), ErrorCode> {
    if parameters.len() > MAX_PARAMETERS {
        return Err(ErrorCode::new(Operation::SendCommand, 1, Severity::Warning));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
