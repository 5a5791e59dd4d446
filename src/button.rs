//! Button debounce handling for the zero and hold controls.
//!
//! Provides time-based edge detection with debouncing to prevent
//! multiple triggers from contact bounce on physical buttons. Timing is fed
//! from the same explicit millisecond ticks that drive the device engines.

/// Debounce duration in milliseconds.
pub const DEBOUNCE_MS: u32 = 50;

/// Button debounce state with time-based edge detection.
pub struct ButtonState {
    was_pressed: bool,
    since_change_ms: u32,
}

impl ButtonState {
    /// Create a new button state (not pressed).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            was_pressed: false,
            since_change_ms: DEBOUNCE_MS,
        }
    }

    /// Returns true only on the falling edge (button just pressed).
    ///
    /// Buttons are active-low, so `is_low` means pressed. Includes debounce
    /// logic to prevent multiple triggers from contact bounce.
    pub fn just_pressed(
        &mut self,
        is_low: bool,
        elapsed_ms: u32,
    ) -> bool {
        self.since_change_ms = self.since_change_ms.saturating_add(elapsed_ms);

        if is_low != self.was_pressed {
            // Only accept the change once the contact settled
            if self.since_change_ms < DEBOUNCE_MS {
                return false;
            }

            self.was_pressed = is_low;
            self.since_change_ms = 0;

            // Falling edge only
            return is_low;
        }

        false
    }
}

impl Default for ButtonState {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_triggers_once() {
        let mut b = ButtonState::new();
        assert!(b.just_pressed(true, 1));
        // Held down: no retrigger
        assert!(!b.just_pressed(true, 1));
        assert!(!b.just_pressed(true, 1000));
    }

    #[test]
    fn test_release_does_not_trigger() {
        let mut b = ButtonState::new();
        assert!(b.just_pressed(true, 1));
        assert!(!b.just_pressed(false, DEBOUNCE_MS));
    }

    #[test]
    fn test_bounce_is_filtered() {
        let mut b = ButtonState::new();
        assert!(b.just_pressed(true, 1));
        // Contact bounce right after the press: ignored
        assert!(!b.just_pressed(false, 1));
        assert!(!b.just_pressed(true, 1));
    }

    #[test]
    fn test_second_press_after_debounce() {
        let mut b = ButtonState::new();
        assert!(b.just_pressed(true, 1));
        assert!(!b.just_pressed(false, DEBOUNCE_MS));
        assert!(b.just_pressed(true, DEBOUNCE_MS));
    }
}
