//! Timing and sampling configuration constants.
//!
//! # Optimization: Pre-computed Constants
//!
//! Derived values (averaging shift, watermark level, frame size) are computed
//! at compile time as `const`, with compile-time assertions guarding the
//! relationships the state machines rely on.

// =============================================================================
// Scheduler Configuration
// =============================================================================

/// Scheduler tick period in milliseconds. Both engines are stepped once per
/// tick with this value as their elapsed time.
pub const TICK_PERIOD_MS: u32 = 1;

// =============================================================================
// Accelerometer Configuration
// =============================================================================

/// Maximum number of milliseconds to wait for the first valid device ID and,
/// later, for each FIFO watermark before the engine latches its failed state.
pub const ACQUISITION_TIMEOUT_MS: u32 = 1000;

/// Settle delay after enabling the self-test force, per the ADXL345
/// electrical characteristics.
pub const SELF_TEST_SETTLE_MS: u32 = 25;

/// Number of FIFO samples integrated into one averaged measurement.
/// Must stay a power of two (see the assertion below).
pub const SAMPLES_PER_BATCH: usize = 32;

/// Right-shift applied to the per-axis accumulators to divide by
/// [`SAMPLES_PER_BATCH`] during integration.
pub const BATCH_AVERAGING_SHIFT: u32 = 5;

// The shift must divide the batch exactly, otherwise integration would
// silently scale the samples.
const _: () = assert!(
    SAMPLES_PER_BATCH >> BATCH_AVERAGING_SHIFT == 1,
    "BATCH_AVERAGING_SHIFT does not divide SAMPLES_PER_BATCH"
);

// =============================================================================
// Display Configuration
// =============================================================================

/// Display width in pixels (SSD1306: 128x64).
pub const SCREEN_WIDTH: usize = 128;

/// Display height in pixels.
pub const SCREEN_HEIGHT: usize = 64;

/// A page is 8 vertically stacked pixel rows, one byte per column.
pub const PAGE_HEIGHT: usize = 8;

/// Number of display pages.
pub const SCREEN_PAGES: usize = SCREEN_HEIGHT / PAGE_HEIGHT;

/// Full frame size in bytes (one bit per pixel, column-major within a page).
pub const FRAME_BYTES: usize = SCREEN_WIDTH * SCREEN_PAGES;

/// Maximum number of milliseconds a DMA frame transfer may take before the
/// display engine aborts it.
pub const TRANSFER_TIMEOUT_MS: u32 = 10;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(SAMPLES_PER_BATCH, 1 << BATCH_AVERAGING_SHIFT);
        assert_eq!(FRAME_BYTES, 1024);
        assert_eq!(SCREEN_PAGES, 8);
        assert!(TRANSFER_TIMEOUT_MS > 0);
        assert!(SELF_TEST_SETTLE_MS < ACQUISITION_TIMEOUT_MS);
    }
}
