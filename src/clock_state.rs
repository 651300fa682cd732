//! Wall time, alarm settings and alarm runtime flags, shared by the tick interrupt, the
//! display-refresh interrupt and the foreground loop.
//!
//! Every access goes through [`SharedClock`], which copies the whole [`ClockState`] in or
//! out inside one short critical section. Readers therefore never see hours from one
//! tick and minutes from another.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

use crate::clock_time::{ClockTime, Meridiem, WallTime};

/// Alarm time at power-up.
const BOOT_ALARM: ClockTime = ClockTime::from_parts(11, 55, 0, Meridiem::Pm);

/// Everything the three contexts share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockState {
    pub wall: WallTime,
    pub alarm: ClockTime,
    /// When a snoozed alarm rings again. `None` can never match the wall time.
    pub snooze_target: Option<ClockTime>,
    /// Alarm slide switch position, as last sampled by the foreground.
    pub armed: bool,
    pub ringing: bool,
    pub snooze_active: bool,
    /// Set by each tick; the wall-time refresh spends it on one siren chirp while ringing.
    pub chirp_pending: bool,
}

impl Default for ClockState {
    fn default() -> Self {
        Self::boot()
    }
}

impl ClockState {
    /// The silent, disarmed state the clock powers up in.
    #[must_use]
    pub const fn boot() -> Self {
        Self {
            wall: WallTime::new(ClockTime::MIDNIGHT),
            alarm: BOOT_ALARM,
            snooze_target: None,
            armed: false,
            ringing: false,
            snooze_active: false,
            chirp_pending: false,
        }
    }

    /// The once-per-second transition.
    pub fn tick(&mut self) {
        self.chirp_pending = true;
        self.wall.tick();
    }

    /// Starts ringing if the wall time has reached the alarm or the snooze target.
    ///
    /// Matching is to the second. Once snoozed, only the snooze target can ring until the
    /// switch is turned off.
    pub fn check_alarm(&mut self) {
        if !self.armed {
            self.ringing = false;
            return;
        }
        if self.ringing {
            return;
        }
        let now = self.wall.time;
        self.ringing = if self.snooze_active {
            self.snooze_target == Some(now)
        } else {
            now == self.alarm
        };
    }

    /// Silences a ringing alarm and schedules it again [`SNOOZE_MINUTES`] from now.
    ///
    /// Returns whether anything was snoozed.
    ///
    /// [`SNOOZE_MINUTES`]: crate::shared_constants::SNOOZE_MINUTES
    pub fn snooze(&mut self) -> bool {
        if !self.ringing {
            return false;
        }
        self.ringing = false;
        self.snooze_active = true;
        self.snooze_target = Some(self.wall.time.snooze_target());
        true
    }

    /// Forgets any pending snooze so it cannot ring after the switch is cycled.
    pub fn switch_off(&mut self) {
        self.snooze_active = false;
        self.snooze_target = None;
    }

    /// Spends the chirp armed by the last tick, if the alarm is ringing.
    pub fn take_chirp(&mut self) -> bool {
        if self.ringing && self.chirp_pending {
            self.chirp_pending = false;
            true
        } else {
            false
        }
    }
}

/// The process-wide [`ClockState`], safe to use from interrupt and foreground context.
///
/// # Example
///
/// ```
/// use clockit::{ClockState, SharedClock};
///
/// static CLOCK: SharedClock = SharedClock::new(ClockState::boot());
///
/// // In the tick interrupt:
/// CLOCK.tick();
///
/// // Anywhere else, work on a consistent copy:
/// let state = CLOCK.snapshot();
/// assert_eq!(state.wall.time.seconds(), 1);
/// ```
pub struct SharedClock(Mutex<CriticalSectionRawMutex, Cell<ClockState>>);

impl SharedClock {
    #[must_use]
    pub const fn new(state: ClockState) -> Self {
        Self(Mutex::new(Cell::new(state)))
    }

    /// An atomic copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ClockState {
        self.0.lock(Cell::get)
    }

    /// Atomically reads, modifies and writes back the state.
    ///
    /// Keep `f` short: it runs with interrupts masked.
    pub fn update<R>(&self, f: impl FnOnce(&mut ClockState) -> R) -> R {
        self.0.lock(|cell| {
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }

    /// Applies one hardware tick.
    pub fn tick(&self) {
        self.update(ClockState::tick);
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    fn at(hours: u8, minutes: u8, seconds: u8, meridiem: Meridiem) -> ClockTime {
        ClockTime::new(hours, minutes, seconds, meridiem).expect("valid test time")
    }

    fn armed_at(wall: ClockTime, alarm: ClockTime) -> ClockState {
        ClockState {
            wall: WallTime::new(wall),
            alarm,
            armed: true,
            ..ClockState::boot()
        }
    }

    #[test]
    fn boot_is_silent_and_disarmed() {
        let state = ClockState::boot();
        assert_eq!(state.wall.time, ClockTime::MIDNIGHT);
        assert_eq!(state.alarm, at(11, 55, 0, Meridiem::Pm));
        assert!(!state.armed && !state.ringing && !state.snooze_active);
        assert_eq!(state.snooze_target, None);
    }

    #[test]
    fn rings_only_on_the_matching_second() {
        let alarm = at(7, 0, 0, Meridiem::Am);
        let mut state = armed_at(at(6, 59, 59, Meridiem::Am), alarm);
        state.check_alarm();
        assert!(!state.ringing);
        state.tick();
        state.check_alarm();
        assert!(state.ringing);

        let mut late = armed_at(at(7, 0, 1, Meridiem::Am), alarm);
        late.check_alarm();
        assert!(!late.ringing);

        let mut wrong_half = armed_at(at(7, 0, 0, Meridiem::Pm), alarm);
        wrong_half.check_alarm();
        assert!(!wrong_half.ringing);
    }

    #[test]
    fn switch_off_silences() {
        let mut state = armed_at(at(7, 0, 0, Meridiem::Am), at(7, 0, 0, Meridiem::Am));
        state.check_alarm();
        assert!(state.ringing);
        state.armed = false;
        state.check_alarm();
        assert!(!state.ringing);
    }

    #[test]
    fn snooze_schedules_nine_minutes_out() {
        let mut state = armed_at(at(9, 58, 30, Meridiem::Pm), at(9, 58, 30, Meridiem::Pm));
        assert!(!state.snooze(), "nothing to snooze yet");
        state.check_alarm();
        assert!(state.snooze());
        assert!(!state.ringing);
        assert!(state.snooze_active);
        assert_eq!(state.snooze_target, Some(at(10, 7, 0, Meridiem::Pm)));
    }

    #[test]
    fn snooze_suppresses_the_plain_alarm_until_switched_off() {
        let alarm = at(7, 0, 0, Meridiem::Am);
        let mut state = armed_at(alarm, alarm);
        state.snooze_active = true;
        state.snooze_target = Some(at(7, 9, 0, Meridiem::Am));
        state.check_alarm();
        assert!(!state.ringing);

        state.switch_off();
        state.check_alarm();
        assert!(state.ringing);
    }

    #[test]
    fn chirp_is_spent_once_per_tick() {
        let mut state = armed_at(at(7, 0, 0, Meridiem::Am), at(7, 0, 0, Meridiem::Am));
        state.check_alarm();
        assert!(!state.take_chirp(), "no tick has armed a chirp yet");
        state.tick();
        assert!(state.take_chirp());
        assert!(!state.take_chirp());
    }

    #[test]
    fn shared_clock_update_is_visible_in_snapshots() {
        let clock = SharedClock::new(ClockState::boot());
        clock.tick();
        clock.update(|state| state.wall.time.add_minutes(5));
        let state = clock.snapshot();
        assert_eq!(state.wall.time, at(12, 5, 1, Meridiem::Am));
        assert!(state.wall.blink);
    }
}
