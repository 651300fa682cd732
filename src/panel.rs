//! The clock face: display multiplexer, buzzer and the delay source that paces both.
//!
//! The foreground loop and the display-refresh interrupt both draw on the same [`Panel`].
//! It lives in a [`PanelSlot`]; whoever draws takes it out for the duration of the
//! drawing, so the two contexts can never interleave their pulses.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::Result;
use crate::bit_matrix_led4::Frame;
use crate::clock_state::{ClockState, SharedClock};
use crate::led4::SegmentSink;
use crate::multiplexer::Multiplexer;
use crate::shared_constants::{ALARM_CHIRP_CYCLES, ALARM_PASS_GAP_MS, BRIGHT_LEVEL_US};
use crate::siren::Siren;

/// Display and buzzer hardware, plus the delay that times their pulses.
pub struct Panel<S, O, D> {
    multiplexer: Multiplexer<S>,
    siren: Siren<O>,
    delay: D,
}

impl<S: SegmentSink, O: OutputPin, D: DelayNs> Panel<S, O, D> {
    #[must_use]
    pub const fn new(sink: S, siren: Siren<O>, delay: D) -> Self {
        Self {
            multiplexer: Multiplexer::new(sink),
            siren,
            delay,
        }
    }

    /// Shows the wall time for `iterations` multiplexing passes.
    ///
    /// Each pass works on a fresh snapshot, so a tick landing mid-call shows up on the next
    /// pass. With the switch on, the alarm dot is lit and a ringing alarm sounds one chirp
    /// per tick with the display blanked. With it off, any pending snooze is forgotten.
    ///
    /// # Errors
    ///
    /// Returns an error if a display or buzzer line refuses a level.
    pub fn show_wall(&mut self, clock: &SharedClock, iterations: u16) -> Result<()> {
        for _ in 0..iterations {
            let state = clock.snapshot();
            let frame = Frame::time(&state.wall.time, state.wall.blink, state.armed)?;
            self.multiplexer.show(&frame, &mut self.delay)?;
            let chirp = clock.update(|state: &mut ClockState| {
                if state.armed {
                    state.take_chirp()
                } else {
                    state.switch_off();
                    false
                }
            });
            if chirp {
                self.chirp(ALARM_CHIRP_CYCLES)?;
            }
            self.delay.delay_us(BRIGHT_LEVEL_US);
        }
        Ok(())
    }

    /// Shows the alarm time for `iterations` passes. The colon follows the wall-time blink;
    /// the alarm dot is never lit here.
    ///
    /// # Errors
    ///
    /// Returns an error if a display line refuses a level.
    pub fn show_alarm(&mut self, clock: &SharedClock, iterations: u16) -> Result<()> {
        for _ in 0..iterations {
            let state = clock.snapshot();
            let frame = Frame::time(&state.alarm, state.wall.blink, false)?;
            self.multiplexer.show(&frame, &mut self.delay)?;
            self.delay.delay_ms(ALARM_PASS_GAP_MS);
        }
        Ok(())
    }

    /// Leaves the display dark for `ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if a display line refuses a level.
    pub fn blank(&mut self, ms: u32) -> Result<()> {
        self.multiplexer.clear()?;
        self.delay.delay_ms(ms);
        Ok(())
    }

    /// Blanks the display and sounds one two-burst chirp.
    ///
    /// # Errors
    ///
    /// Returns an error if a display or buzzer line refuses a level.
    pub fn chirp(&mut self, cycles: u16) -> Result<()> {
        self.multiplexer.clear()?;
        self.siren.chirp(cycles, &mut self.delay)
    }

    /// Lights every element ("88:88" and all indicators) for `iterations` passes.
    ///
    /// # Errors
    ///
    /// Returns an error if a display line refuses a level.
    pub fn lamp_test(&mut self, iterations: u16) -> Result<()> {
        let frame = Frame::lamp_test()?;
        for _ in 0..iterations {
            self.multiplexer.show(&frame, &mut self.delay)?;
            self.delay.delay_us(BRIGHT_LEVEL_US);
        }
        Ok(())
    }

    pub const fn sink(&self) -> &S {
        self.multiplexer.sink()
    }

    pub fn into_parts(self) -> (S, Siren<O>, D) {
        (self.multiplexer.into_sink(), self.siren, self.delay)
    }
}

/// Interrupt-safe home of the [`Panel`].
///
/// # Example
///
/// ```
/// use clockit::PanelSlot;
///
/// let slot: PanelSlot<u32> = PanelSlot::new();
/// assert_eq!(slot.with(|panel| *panel), None, "nothing installed yet");
///
/// slot.install(7);
/// assert_eq!(slot.with(|panel| *panel + 1), Some(8));
/// ```
pub struct PanelSlot<P>(Mutex<CriticalSectionRawMutex, RefCell<Option<P>>>);

impl<P> PanelSlot<P> {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self(Mutex::new(RefCell::new(None)))
    }

    /// Puts `panel` in the slot, returning whatever was there.
    pub fn install(&self, panel: P) -> Option<P> {
        self.0.lock(|cell| cell.borrow_mut().replace(panel))
    }

    /// Takes the panel out of the slot.
    pub fn take(&self) -> Option<P> {
        self.0.lock(|cell| cell.borrow_mut().take())
    }

    /// Runs `f` on the panel outside any critical section.
    ///
    /// Returns `None` without running `f` if the slot is empty, which is also the case while
    /// another context is inside `with`.
    pub fn with<R>(&self, f: impl FnOnce(&mut P) -> R) -> Option<R> {
        let mut panel = self.take()?;
        let result = f(&mut panel);
        self.install(panel);
        Some(result)
    }
}

impl<P> Default for PanelSlot<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;
    use crate::clock_time::{ClockTime, Meridiem, WallTime};
    use crate::shared_constants::{SIREN_GAP_MS, SIREN_HALF_PERIOD_US};
    use crate::sim::{RecordingSink, SimPin, VirtualClock};

    type TestPanel = Panel<RecordingSink, SimPin, VirtualClock>;

    fn panel(clock: &VirtualClock) -> TestPanel {
        Panel::new(
            RecordingSink::new(clock),
            Siren::new(SimPin::new(clock), SimPin::new(clock)),
            clock.clone(),
        )
    }

    fn ringing_at(time: ClockTime) -> ClockState {
        ClockState {
            wall: WallTime::new(time),
            alarm: time,
            armed: true,
            ringing: true,
            chirp_pending: true,
            ..ClockState::boot()
        }
    }

    #[test]
    fn wall_time_shows_alarm_dot_only_when_armed() {
        let clock = VirtualClock::new();
        let mut panel = panel(&clock);
        let shared = SharedClock::new(ClockState::boot());

        panel.show_wall(&shared, 1).expect("sim never fails");
        assert_eq!(panel.sink().last_text(), "12:00");
        assert!(!panel.sink().saw_alarm_dot());

        shared.update(|state| state.armed = true);
        panel.show_wall(&shared, 1).expect("sim never fails");
        assert!(panel.sink().saw_alarm_dot());
        assert!(panel.sink().saw_am_dot());
    }

    #[test]
    fn ringing_chirps_once_per_tick() {
        let clock = VirtualClock::new();
        let mut panel = panel(&clock);
        let time = ClockTime::new(7, 0, 0, Meridiem::Am).expect("valid test time");
        let shared = SharedClock::new(ringing_at(time));

        panel.show_wall(&shared, 3).expect("sim never fails");

        let chirp_us = 4 * u64::from(ALARM_CHIRP_CYCLES) * u64::from(SIREN_HALF_PERIOD_US)
            + u64::from(SIREN_GAP_MS) * 1_000;
        assert!(clock.now_us() >= chirp_us, "one chirp sounded");
        assert!(clock.now_us() < 2 * chirp_us, "and only one");
        assert!(!shared.snapshot().chirp_pending);

        let (_, siren, _) = panel.into_parts();
        let (line1, line2) = siren.into_lines();
        assert!(line1.is_low() && line2.is_low());
    }

    #[test]
    fn disarmed_wall_time_forgets_snooze() {
        let clock = VirtualClock::new();
        let mut panel = panel(&clock);
        let shared = SharedClock::new(ClockState {
            snooze_active: true,
            snooze_target: ClockTime::new(7, 9, 0, Meridiem::Am).ok(),
            ..ClockState::boot()
        });

        panel.show_wall(&shared, 1).expect("sim never fails");

        let state = shared.snapshot();
        assert!(!state.snooze_active);
        assert_eq!(state.snooze_target, None);
    }

    #[test]
    fn alarm_time_has_no_alarm_dot() {
        let clock = VirtualClock::new();
        let mut panel = panel(&clock);
        let shared = SharedClock::new(ClockState {
            armed: true,
            ..ClockState::boot()
        });

        panel.show_alarm(&shared, 2).expect("sim never fails");

        assert_eq!(panel.sink().last_text(), "11:55");
        assert!(!panel.sink().saw_alarm_dot());
        assert!(!panel.sink().saw_am_dot(), "boot alarm is PM");
    }

    #[test]
    fn slot_is_empty_while_in_use() {
        let slot = PanelSlot::new();
        slot.install(1_u8);
        let nested = slot.with(|outer| {
            *outer += 1;
            slot.with(|inner| *inner)
        });
        assert_eq!(nested, Some(None));
        assert_eq!(slot.take(), Some(2));
    }
}
