//! Twelve-hour time-of-day values and the clock's wraparound rules.
//!
//! The same record shape serves the wall time, the alarm time and the snooze target.
//! Hours run 1..=12 and the meridiem flips exactly when the hours step into 12 going
//! forward, or into 11 going backward.

use derive_more::derive::Display;

use crate::shared_constants::SNOOZE_MINUTES;
use crate::{Error, Result};

/// Morning or afternoon half of a 12-hour clock.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Meridiem {
    #[default]
    #[display("AM")]
    Am,
    #[display("PM")]
    Pm,
}

impl Meridiem {
    /// The other half of the day.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Am => Self::Pm,
            Self::Pm => Self::Am,
        }
    }
}

/// Hours, minutes, seconds and meridiem of a 12-hour clock.
///
/// Always holds hours in 1..=12 and minutes and seconds in 0..=59.
///
/// # Example
///
/// ```
/// use clockit::{ClockTime, Meridiem};
///
/// let now = ClockTime::new(11, 55, 30, Meridiem::Pm)?;
/// let target = now.snooze_target();
/// assert_eq!(target, ClockTime::new(12, 4, 0, Meridiem::Am)?);
/// # Ok::<(), clockit::Error>(())
/// ```
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[display("{hours}:{minutes:02}:{seconds:02} {meridiem}")]
pub struct ClockTime {
    hours: u8,
    minutes: u8,
    seconds: u8,
    meridiem: Meridiem,
}

impl ClockTime {
    /// Midnight, the wall time at power-up.
    pub const MIDNIGHT: Self = Self::from_parts(12, 0, 0, Meridiem::Am);

    /// The display lamp-test pattern. Not a valid time; only [`crate::bit_matrix_led4::Frame`]
    /// ever sees it.
    pub(crate) const LAMP_TEST: Self = Self::from_parts(88, 88, 88, Meridiem::Am);

    /// Creates a time, checking every field is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTime`] if hours are outside 1..=12 or minutes or seconds
    /// are above 59.
    pub const fn new(hours: u8, minutes: u8, seconds: u8, meridiem: Meridiem) -> Result<Self> {
        if hours < 1 || hours > 12 || minutes > 59 || seconds > 59 {
            return Err(Error::InvalidTime {
                hours,
                minutes,
                seconds,
            });
        }
        Ok(Self::from_parts(hours, minutes, seconds, meridiem))
    }

    pub(crate) const fn from_parts(hours: u8, minutes: u8, seconds: u8, meridiem: Meridiem) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            meridiem,
        }
    }

    #[must_use]
    pub const fn hours(&self) -> u8 {
        self.hours
    }

    #[must_use]
    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    #[must_use]
    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    #[must_use]
    pub const fn meridiem(&self) -> Meridiem {
        self.meridiem
    }

    /// Advances by one second, carrying into minutes and hours.
    ///
    /// A minute carry always leaves seconds at 0.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Each increment is guarded by a comparison against 59"
    )]
    pub fn advance_second(&mut self) {
        if self.seconds < 59 {
            self.seconds += 1;
            return;
        }
        self.seconds = 0;
        if self.minutes < 59 {
            self.minutes += 1;
            return;
        }
        self.minutes = 0;
        self.next_hour();
        debug_assert!(self.is_valid(), "tick left {self:?} out of range");
    }

    /// Adds `minute_change` minutes without touching seconds.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "The sum fits in u16 and the loop keeps it below 60 before narrowing"
    )]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "The loop leaves total below 60"
    )]
    pub fn add_minutes(&mut self, minute_change: u8) {
        let mut total = u16::from(self.minutes) + u16::from(minute_change);
        while total > 59 {
            total -= 60;
            self.next_hour();
        }
        self.minutes = total as u8;
    }

    /// Subtracts `minute_change` minutes without touching seconds.
    ///
    /// Crossing below zero does not borrow exactly: it snaps to minute 59 of the
    /// previous hour, the way the set buttons have always behaved.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "The subtraction only runs when it cannot underflow"
    )]
    pub fn sub_minutes(&mut self, minute_change: u8) {
        if minute_change > self.minutes {
            self.minutes = 59;
            self.previous_hour();
        } else {
            self.minutes -= minute_change;
        }
    }

    /// The time the alarm should ring again after a snooze started now.
    #[must_use]
    pub fn snooze_target(self) -> Self {
        let mut target = Self {
            seconds: 0,
            ..self
        };
        target.add_minutes(SNOOZE_MINUTES);
        target
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Hours below 12 cannot overflow"
    )]
    fn next_hour(&mut self) {
        self.hours = if self.hours >= 12 { 1 } else { self.hours + 1 };
        if self.hours == 12 {
            self.meridiem = self.meridiem.flip();
        }
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Hours above 1 cannot underflow"
    )]
    fn previous_hour(&mut self) {
        self.hours = if self.hours <= 1 { 12 } else { self.hours - 1 };
        if self.hours == 11 {
            self.meridiem = self.meridiem.flip();
        }
    }

    const fn is_valid(&self) -> bool {
        self.hours >= 1 && self.hours <= 12 && self.minutes <= 59 && self.seconds <= 59
    }
}

/// The wall-clock time plus the half-second blink flag that drives the colon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    pub time: ClockTime,
    /// Toggled by every tick; the colon is lit while this is set.
    pub blink: bool,
}

impl WallTime {
    #[must_use]
    pub const fn new(time: ClockTime) -> Self {
        Self { time, blink: false }
    }

    /// The transition applied by the hardware tick.
    pub fn tick(&mut self) {
        self.blink = !self.blink;
        self.time.advance_second();
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    fn at(hours: u8, minutes: u8, seconds: u8, meridiem: Meridiem) -> ClockTime {
        ClockTime::new(hours, minutes, seconds, meridiem).expect("valid test time")
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(ClockTime::new(0, 0, 0, Meridiem::Am).is_err());
        assert!(ClockTime::new(13, 0, 0, Meridiem::Am).is_err());
        assert!(ClockTime::new(12, 60, 0, Meridiem::Am).is_err());
        assert_eq!(
            ClockTime::new(1, 2, 60, Meridiem::Pm),
            Err(Error::InvalidTime {
                hours: 1,
                minutes: 2,
                seconds: 60
            })
        );
    }

    #[test]
    fn tick_into_twelve_flips_meridiem() {
        let mut time = at(11, 59, 59, Meridiem::Am);
        time.advance_second();
        assert_eq!(time, at(12, 0, 0, Meridiem::Pm));
    }

    #[test]
    fn tick_out_of_twelve_keeps_meridiem() {
        let mut time = at(12, 59, 59, Meridiem::Pm);
        time.advance_second();
        assert_eq!(time, at(1, 0, 0, Meridiem::Pm));
    }

    #[test]
    fn add_minutes_carries_into_hour() {
        let mut time = at(11, 50, 17, Meridiem::Pm);
        time.add_minutes(15);
        assert_eq!(time, at(12, 5, 17, Meridiem::Am), "seconds are left alone");
    }

    #[test]
    fn sub_minutes_snaps_to_fifty_nine() {
        let mut time = at(12, 3, 0, Meridiem::Pm);
        time.sub_minutes(5);
        assert_eq!(time, at(11, 59, 0, Meridiem::Am));

        let mut time = at(1, 0, 9, Meridiem::Am);
        time.sub_minutes(1);
        assert_eq!(time, at(12, 59, 9, Meridiem::Am));

        let mut time = at(4, 5, 0, Meridiem::Am);
        time.sub_minutes(5);
        assert_eq!(time, at(4, 0, 0, Meridiem::Am));
    }

    #[test]
    fn snooze_target_zeroes_seconds() {
        assert_eq!(
            at(9, 58, 41, Meridiem::Pm).snooze_target(),
            at(10, 7, 0, Meridiem::Pm)
        );
        assert_eq!(
            at(11, 55, 0, Meridiem::Pm).snooze_target(),
            at(12, 4, 0, Meridiem::Am)
        );
    }

    #[test]
    fn wall_tick_toggles_blink() {
        let mut wall = WallTime::new(ClockTime::MIDNIGHT);
        wall.tick();
        assert!(wall.blink);
        wall.tick();
        assert!(!wall.blink);
        assert_eq!(wall.time, at(12, 0, 2, Meridiem::Am));
    }

    #[test]
    fn formats_like_a_clock_face() {
        assert_eq!(at(7, 5, 9, Meridiem::Am).to_string(), "7:05:09 AM");
    }
}
