//! Timing and layout constants shared by the display, siren and input code.
//!
//! Durations are plain integers in the unit named by the suffix because they feed
//! straight into [`embedded_hal::delay::DelayNs`].

/// Number of digit positions on the panel.
pub const CELL_COUNT: usize = 4;

/// Number of cathode lines: seven segments plus the decimal point.
pub const SEGMENT_COUNT: usize = 8;

/// Number of anode groups: four digits, the colon and the AM/PM apostrophe.
pub const ANODE_COUNT: usize = 6;

/// How long one element is energized per multiplexing pass. 200 µs is dim but visible;
/// the panel has no current-limiting resistors, so this also bounds the duty cycle.
pub const BRIGHT_LEVEL_US: u32 = 50;

/// Dark time between passes when the foreground shows the alarm time.
pub const ALARM_PASS_GAP_MS: u32 = 1;

/// Passes drawn per display-refresh interrupt.
pub const REFRESH_ITERATIONS: u16 = 10;

/// Display-refresh interrupt period: an 8-bit timer at 64 µs per count.
pub const REFRESH_PERIOD_US: u32 = 16_384;

/// Hardware tick period.
pub const TICK_PERIOD_US: u32 = 1_000_000;

/// A hold gesture must still be held after this long to count.
pub const HOLD_CONFIRM_MS: u32 = 1_000;

/// Passes used to show the time while a hold gesture is being confirmed or released.
pub const HOLD_DISPLAY_ITERATIONS: u16 = 1_000;

/// Pause after each clock-set adjustment.
pub const EDIT_PACE_MS: u32 = 100;

/// Passes used to show the alarm time per alarm-set iteration.
pub const ALARM_EDIT_ITERATIONS: u16 = 100;

/// Lit and dark halves of a confirmation or entry blink.
pub const BLINK_ITERATIONS: u16 = 250;
pub const BLINK_DARK_MS: u32 = 250;

/// Confirmation blinks on leaving clock-set and alarm-set.
pub const SET_CLOCK_EXIT_BLINKS: u8 = 3;
pub const SET_ALARM_EXIT_BLINKS: u8 = 4;

/// Half period of the buzzer square wave (about 1.7 kHz).
pub const SIREN_HALF_PERIOD_US: u32 = 300;

/// Silence between the two bursts of a chirp.
pub const SIREN_GAP_MS: u32 = 50;

/// Square-wave cycles per burst while the alarm rings.
pub const ALARM_CHIRP_CYCLES: u16 = 500;

/// Square-wave cycles per burst at power-up.
pub const POWER_UP_CHIRP_CYCLES: u16 = 20;

/// Passes of the "88:88" lamp test shown at boot.
pub const LAMP_TEST_ITERATIONS: u16 = 100;

/// Minutes added to the wall time when snooze is pressed.
pub const SNOOZE_MINUTES: u8 = 9;

/// Consecutive same-button iterations before the edit step grows.
pub const RAMP_GROUP: u8 = 6;

/// Largest edit step in minutes.
pub const MAX_MINUTE_CHANGE: u8 = 30;
