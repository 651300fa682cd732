//! Operating modes of the foreground loop and the accelerating edit step.

use crate::button::Button;
use crate::shared_constants::{MAX_MINUTE_CHANGE, RAMP_GROUP};

/// Which branch of the input state machine owns the controls.
///
/// Both set modes are entered by a hold gesture and left only through the snooze button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Normal,
    /// Editing the wall time.
    SetClock(SetPhase),
    /// Editing the alarm time. The display-refresh interrupt is suspended throughout.
    SetAlarm(SetPhase),
}

/// Progress through a set mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetPhase {
    /// The entry gesture is still held; nothing is edited until it is released.
    Entering,
    /// Increase and decrease adjust the time; snooze confirms.
    Editing,
    /// Confirmation shown; waiting for snooze to be released.
    Leaving,
}

/// Press-repeat acceleration for the edit buttons.
///
/// Every [`RAMP_GROUP`] consecutive iterations of the same button grow the step by one
/// minute, up to [`MAX_MINUTE_CHANGE`]. A different button, or a release, starts over at
/// one minute.
///
/// # Example
///
/// ```
/// use clockit::{Button, Ramp};
///
/// let mut ramp = Ramp::new();
/// let steps: Vec<u8> = (0..8).map(|_| ramp.press(Button::Increase)).collect();
/// assert_eq!(steps, [1, 1, 1, 1, 1, 1, 2, 2]);
///
/// assert_eq!(ramp.press(Button::Decrease), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ramp {
    previous: Option<Button>,
    repeats: u8,
    minute_change: u8,
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new()
    }
}

impl Ramp {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: None,
            repeats: 0,
            minute_change: 1,
        }
    }

    /// Records one iteration with `button` held and returns the minutes to apply.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "repeats resets at RAMP_GROUP and minute_change is capped"
    )]
    pub fn press(&mut self, button: Button) -> u8 {
        if self.previous == Some(button) {
            self.repeats += 1;
        } else {
            *self = Self::new();
            self.previous = Some(button);
        }
        if self.repeats >= RAMP_GROUP {
            self.minute_change = (self.minute_change + 1).min(MAX_MINUTE_CHANGE);
            self.repeats = 0;
        }
        self.minute_change
    }

    /// Both edit buttons are up.
    pub fn release(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub const fn minute_change(&self) -> u8 {
        self.minute_change
    }
}
