//! Icon bitmaps, page-organized (one byte per column, bit 0 on top).
//!
//! The arrows icon spans the full display height on the left edge; the
//! reference-mode and hold icons share the bottom-right corner of the screen.

/// Width of the arrows icon in pixels (and columns per page row).
pub const ARROWS_ICON_WIDTH: usize = 32;

/// Directional arrows icon, 32x64.
pub const ARROWS_ICON: [u8; 256] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x80, 0xC0, 0xE0, 0xF0,
    0xF0, 0xE0, 0xC0, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x02, 0x03, 0x03, 0x03, 0x03, 0xFF,
    0xFF, 0x03, 0x03, 0x03, 0x03, 0x02, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF,
    0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x80, 0xC0, 0xE0, 0xF0, 0xF8, 0xFC,
    0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0xFF,
    0xFF, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80,
    0xFC, 0xF8, 0xF0, 0xE0, 0xC0, 0x80, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x03, 0x07, 0x0F, 0x1F, 0x3F,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0xFF,
    0xFF, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x3F, 0x1F, 0x0F, 0x07, 0x03, 0x01, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF,
    0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x40, 0xC0, 0xC0, 0xC0, 0xC0, 0xFF,
    0xFF, 0xC0, 0xC0, 0xC0, 0xC0, 0x40, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x01, 0x03, 0x07, 0x0F,
    0x0F, 0x07, 0x03, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Width of the status icons (reference mode, hold) in pixels.
pub const STATUS_ICON_WIDTH: usize = 16;

/// Absolute reference mode: a ground symbol.
pub const ABSOLUTE_REFERENCE_ICON: [u8; STATUS_ICON_WIDTH] = [
    0x00, 0x00, 0xA0, 0x60, 0x20, 0xA0, 0x60, 0x3F,
    0xBF, 0x60, 0x20, 0xA0, 0x60, 0x20, 0x00, 0x00,
];

/// Relative (zeroed) reference mode: an inclined ramp.
pub const RELATIVE_REFERENCE_ICON: [u8; STATUS_ICON_WIDTH] = [
    0x00, 0x00, 0x80, 0x80, 0xC0, 0xC0, 0xA0, 0xA0,
    0x90, 0x90, 0x88, 0x88, 0x84, 0x84, 0x00, 0x00,
];

/// Hold indicator: two pause bars.
pub const HOLD_ICON: [u8; STATUS_ICON_WIDTH] = [
    0x00, 0x00, 0x00, 0x00, 0x7E, 0x7E, 0x00, 0x00,
    0x00, 0x00, 0x7E, 0x7E, 0x00, 0x00, 0x00, 0x00,
];

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FRAME_BYTES, SCREEN_PAGES};

    #[test]
    fn test_arrows_icon_covers_full_height() {
        assert_eq!(ARROWS_ICON.len(), ARROWS_ICON_WIDTH * SCREEN_PAGES);
        assert!(ARROWS_ICON.len() <= FRAME_BYTES);
    }

    #[test]
    fn test_status_icons_are_one_page() {
        assert_eq!(ABSOLUTE_REFERENCE_ICON.len(), STATUS_ICON_WIDTH);
        assert_eq!(RELATIVE_REFERENCE_ICON.len(), STATUS_ICON_WIDTH);
        assert_eq!(HOLD_ICON.len(), STATUS_ICON_WIDTH);
        // The two reference glyphs must be distinguishable
        assert_ne!(ABSOLUTE_REFERENCE_ICON, RELATIVE_REFERENCE_ICON);
    }
}
