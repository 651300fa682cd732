//! Piezo buzzer driven push-pull from two output lines.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::Result;
use crate::error::Error::CannotSetOutputState;
use crate::shared_constants::{SIREN_GAP_MS, SIREN_HALF_PERIOD_US};

/// A two-line buzzer driver.
///
/// # Example
///
/// ```
/// use clockit::Siren;
/// use clockit::sim::{SimPin, VirtualClock};
///
/// let clock = VirtualClock::new();
/// let mut siren = Siren::new(SimPin::new(&clock), SimPin::new(&clock));
/// let mut delay = clock.clone();
/// siren.chirp(20, &mut delay)?;
/// # Ok::<(), clockit::Error>(())
/// ```
pub struct Siren<O> {
    line1: O,
    line2: O,
}

impl<O: OutputPin> Siren<O> {
    #[must_use]
    pub const fn new(line1: O, line2: O) -> Self {
        Self { line1, line2 }
    }

    /// Two bursts of `cycles` square-wave periods separated by [`SIREN_GAP_MS`] of silence.
    ///
    /// Both lines are low on return, including on error where possible.
    ///
    /// # Errors
    ///
    /// Returns an error if a buzzer line refuses a level.
    pub fn chirp(&mut self, cycles: u16, delay: &mut impl DelayNs) -> Result<()> {
        let result = self.two_bursts(cycles, delay);
        let silenced = self.silence();
        result.and(silenced)
    }

    pub fn into_lines(self) -> (O, O) {
        (self.line1, self.line2)
    }

    fn two_bursts(&mut self, cycles: u16, delay: &mut impl DelayNs) -> Result<()> {
        self.burst(cycles, delay)?;
        self.silence()?;
        delay.delay_ms(SIREN_GAP_MS);
        self.burst(cycles, delay)
    }

    fn burst(&mut self, cycles: u16, delay: &mut impl DelayNs) -> Result<()> {
        for _ in 0..cycles {
            self.drive(false, true)?;
            delay.delay_us(SIREN_HALF_PERIOD_US);
            self.drive(true, false)?;
            delay.delay_us(SIREN_HALF_PERIOD_US);
        }
        Ok(())
    }

    fn silence(&mut self) -> Result<()> {
        self.drive(false, false)
    }

    fn drive(&mut self, line1_high: bool, line2_high: bool) -> Result<()> {
        self.line1
            .set_state(line1_high.into())
            .map_err(|_| CannotSetOutputState)?;
        self.line2
            .set_state(line2_high.into())
            .map_err(|_| CannotSetOutputState)
    }
}
