//! The clock's three momentary buttons and its alarm slide switch.
//!
//! Controls are sampled, not interrupt-driven. Holding is the only debouncing: a gesture
//! counts when the same level is read before and after a fixed delay.

use embedded_hal::digital::InputPin;

use crate::Result;
use crate::error::Error::CannotReadInput;

/// One of the momentary buttons.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Increase,
    Decrease,
    Snooze,
}

/// One reading of every control, with electrical polarity already resolved.
#[expect(
    clippy::struct_excessive_bools,
    reason = "Each flag is one independent physical line"
)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inputs {
    pub increase: bool,
    pub decrease: bool,
    pub snooze: bool,
    /// Alarm slide switch is in the "on" position.
    pub armed: bool,
}

impl Inputs {
    #[must_use]
    pub const fn is_pressed(self, button: Button) -> bool {
        match button {
            Button::Increase => self.increase,
            Button::Decrease => self.decrease,
            Button::Snooze => self.snooze,
        }
    }

    /// The clock-set gesture: increase and decrease together.
    #[must_use]
    pub const fn both_edit_buttons(self) -> bool {
        self.increase && self.decrease
    }

    #[must_use]
    pub const fn any_edit_button(self) -> bool {
        self.increase || self.decrease
    }
}

/// The input lines: three active-low buttons and an active-high switch.
///
/// # Example
///
/// ```
/// use clockit::Controls;
/// use clockit::sim::{SimInput, VirtualClock};
///
/// let clock = VirtualClock::new();
/// let snooze = SimInput::button(&clock);
/// let mut controls = Controls::new(
///     SimInput::button(&clock),
///     SimInput::button(&clock),
///     snooze.clone(),
///     SimInput::switch(&clock),
/// );
///
/// snooze.press_now();
/// let inputs = controls.sample()?;
/// assert!(inputs.snooze && !inputs.increase && !inputs.armed);
/// # Ok::<(), clockit::Error>(())
/// ```
pub struct Controls<I> {
    increase: I,
    decrease: I,
    snooze: I,
    alarm_switch: I,
}

impl<I: InputPin> Controls<I> {
    #[must_use]
    pub const fn new(increase: I, decrease: I, snooze: I, alarm_switch: I) -> Self {
        Self {
            increase,
            decrease,
            snooze,
            alarm_switch,
        }
    }

    /// Reads all four lines.
    ///
    /// # Errors
    ///
    /// Returns [`CannotReadInput`](crate::Error::CannotReadInput) if a line cannot be read.
    pub fn sample(&mut self) -> Result<Inputs> {
        Ok(Inputs {
            increase: self.increase.is_low().map_err(|_| CannotReadInput)?,
            decrease: self.decrease.is_low().map_err(|_| CannotReadInput)?,
            snooze: self.snooze.is_low().map_err(|_| CannotReadInput)?,
            armed: self.alarm_switch.is_high().map_err(|_| CannotReadInput)?,
        })
    }
}
