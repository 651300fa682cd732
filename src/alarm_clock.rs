//! The alarm clock application: interrupt entry points plus the foreground state machine.
//!
//! Board glue owns one [`AlarmClockStatic`] in a `static`, calls
//! [`on_tick`](AlarmClockStatic::on_tick) from the 1 Hz timer interrupt and
//! [`on_refresh`](AlarmClockStatic::on_refresh) from the display timer interrupt, and runs
//! [`AlarmClock::run`] in the foreground.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use portable_atomic::{AtomicBool, Ordering};

use crate::Result;
use crate::button::{Button, Controls, Inputs};
use crate::clock_state::{ClockState, SharedClock};
use crate::clock_time::ClockTime;
use crate::led4::SegmentSink;
use crate::never::Never;
use crate::panel::{Panel, PanelSlot};
use crate::shared_constants::{
    ALARM_EDIT_ITERATIONS, BLINK_DARK_MS, BLINK_ITERATIONS, EDIT_PACE_MS, HOLD_CONFIRM_MS,
    HOLD_DISPLAY_ITERATIONS, LAMP_TEST_ITERATIONS, POWER_UP_CHIRP_CYCLES, REFRESH_ITERATIONS,
    SET_ALARM_EXIT_BLINKS, SET_CLOCK_EXIT_BLINKS,
};
use crate::state_machine::{Mode, Ramp, SetPhase};

/// Static type for the [`AlarmClock`]: everything the interrupt handlers touch.
pub struct AlarmClockStatic<S, O, D> {
    clock: SharedClock,
    panel: PanelSlot<Panel<S, O, D>>,
    refresh_enabled: AtomicBool,
}

impl<S, O, D> AlarmClockStatic<S, O, D> {
    /// Creates the statics with boot-time clock state, no panel, and refresh enabled.
    #[must_use]
    pub const fn new_static() -> Self {
        Self {
            clock: SharedClock::new(ClockState::boot()),
            panel: PanelSlot::new(),
            refresh_enabled: AtomicBool::new(true),
        }
    }

    /// The shared time and alarm state.
    pub const fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// An atomic copy of the shared state.
    #[must_use]
    pub fn snapshot(&self) -> ClockState {
        self.clock.snapshot()
    }

    /// Whether the display-refresh interrupt currently draws anything.
    #[must_use]
    pub fn refresh_enabled(&self) -> bool {
        self.refresh_enabled.load(Ordering::Acquire)
    }

    /// Hands the display and buzzer hardware over. Returns the previous panel, if any.
    pub fn install_panel(&self, panel: Panel<S, O, D>) -> Option<Panel<S, O, D>> {
        self.panel.install(panel)
    }

    /// Runs `f` on the installed panel. `None` if there is none or it is in use.
    pub fn with_panel<R>(&self, f: impl FnOnce(&mut Panel<S, O, D>) -> R) -> Option<R> {
        self.panel.with(f)
    }

    /// Body of the once-per-second timer interrupt.
    pub fn on_tick(&self) {
        self.clock.tick();
    }

    fn set_refresh(&self, enabled: bool) {
        self.refresh_enabled.store(enabled, Ordering::Release);
    }
}

impl<S: SegmentSink, O: OutputPin, D: DelayNs> AlarmClockStatic<S, O, D> {
    /// Body of the display-refresh interrupt: a few passes of the wall time.
    ///
    /// Does nothing while refresh is suspended or while the foreground is drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if a display or buzzer line refuses a level.
    pub fn on_refresh(&self) -> Result<()> {
        if !self.refresh_enabled() {
            return Ok(());
        }
        self.panel
            .with(|panel| panel.show_wall(&self.clock, REFRESH_ITERATIONS))
            .unwrap_or(Ok(()))
    }
}

/// The foreground half of the alarm clock.
///
/// Each [`poll`](AlarmClock::poll) samples the controls once and runs one step of the
/// current [`Mode`]. Waiting inside a step is done with the injected delay, during which
/// the tick and refresh interrupts keep running.
///
/// # Example
///
/// ```
/// use clockit::sim::{RecordingSink, SimInput, SimPin, VirtualClock};
/// use clockit::{AlarmClock, AlarmClockStatic, ClockTime, Controls, Mode, Panel, Siren};
///
/// let clock = VirtualClock::new();
/// let statics: &'static AlarmClockStatic<RecordingSink, SimPin, VirtualClock> =
///     Box::leak(Box::new(AlarmClockStatic::new_static()));
/// statics.install_panel(Panel::new(
///     RecordingSink::new(&clock),
///     Siren::new(SimPin::new(&clock), SimPin::new(&clock)),
///     clock.clone(),
/// ));
/// clock.every(1_000_000, move || statics.on_tick());
///
/// let controls = Controls::new(
///     SimInput::button(&clock),
///     SimInput::button(&clock),
///     SimInput::button(&clock),
///     SimInput::switch(&clock),
/// );
/// let mut alarm_clock = AlarmClock::new(statics, controls, clock.clone());
/// alarm_clock.boot()?;
/// alarm_clock.poll()?;
/// assert_eq!(alarm_clock.mode(), Mode::Normal);
/// assert_eq!(statics.snapshot().wall.time, ClockTime::MIDNIGHT);
/// # Ok::<(), clockit::Error>(())
/// ```
pub struct AlarmClock<'a, S, O, I, D> {
    statics: &'a AlarmClockStatic<S, O, D>,
    controls: Controls<I>,
    delay: D,
    mode: Mode,
    ramp: Ramp,
}

impl<'a, S, O, I, D> AlarmClock<'a, S, O, I, D>
where
    S: SegmentSink,
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    #[must_use]
    pub const fn new(
        statics: &'a AlarmClockStatic<S, O, D>,
        controls: Controls<I>,
        delay: D,
    ) -> Self {
        Self {
            statics,
            controls,
            delay,
            mode: Mode::Normal,
            ramp: Ramp::new(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Power-up: lamp test and chirp, then the default time and alarm.
    ///
    /// # Errors
    ///
    /// Returns an error if a display or buzzer line refuses a level.
    pub fn boot(&mut self) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::info!("clockit boot");
        self.draw(|panel| {
            panel.lamp_test(LAMP_TEST_ITERATIONS)?;
            panel.chirp(POWER_UP_CHIRP_CYCLES)
        })?;
        self.statics
            .clock
            .update(|state| *state = ClockState::boot());
        self.ramp.release();
        self.statics.set_refresh(true);
        self.enter(Mode::Normal);
        Ok(())
    }

    /// Boots, then polls forever.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`boot`](Self::boot) or [`poll`](Self::poll).
    pub fn run(&mut self) -> Result<Never> {
        self.boot()?;
        loop {
            self.poll()?;
        }
    }

    /// One iteration of the foreground loop.
    ///
    /// # Errors
    ///
    /// Returns an error if a control cannot be read or an output line refuses a level.
    pub fn poll(&mut self) -> Result<()> {
        let inputs = self.sample()?;
        match self.mode {
            Mode::Normal => self.poll_normal(inputs),
            Mode::SetClock(phase) => self.poll_set_clock(phase, inputs),
            Mode::SetAlarm(phase) => self.poll_set_alarm(phase, inputs),
        }
    }

    fn poll_normal(&mut self, inputs: Inputs) -> Result<()> {
        if inputs.snooze && self.statics.clock.update(ClockState::snooze) {
            #[cfg(feature = "defmt")]
            defmt::info!("snoozed until {}", self.statics.snapshot().snooze_target);
        }

        if inputs.both_edit_buttons() {
            self.delay.delay_ms(HOLD_CONFIRM_MS);
            if self.sample()?.both_edit_buttons() {
                self.enter(Mode::SetClock(SetPhase::Entering));
                return Ok(());
            }
        }

        if inputs.snooze {
            self.statics.set_refresh(false);
            self.draw(|panel| panel.show_alarm(&self.statics.clock, HOLD_DISPLAY_ITERATIONS))?;
            if self.sample()?.snooze {
                self.enter(Mode::SetAlarm(SetPhase::Entering));
                return Ok(());
            }
            self.statics.set_refresh(true);
        }

        #[cfg(feature = "defmt")]
        let was_ringing = self.statics.snapshot().ringing;
        self.statics.clock.update(ClockState::check_alarm);
        #[cfg(feature = "defmt")]
        if !was_ringing && self.statics.snapshot().ringing {
            defmt::info!("alarm ringing");
        }
        Ok(())
    }

    fn poll_set_clock(&mut self, phase: SetPhase, inputs: Inputs) -> Result<()> {
        match phase {
            SetPhase::Entering if inputs.both_edit_buttons() => {
                self.draw(|panel| panel.show_wall(&self.statics.clock, HOLD_DISPLAY_ITERATIONS))
            }
            SetPhase::Entering => {
                self.ramp.release();
                self.enter(Mode::SetClock(SetPhase::Editing));
                Ok(())
            }
            SetPhase::Editing if inputs.snooze => {
                for _ in 0..SET_CLOCK_EXIT_BLINKS {
                    self.draw(|panel| {
                        panel.show_wall(&self.statics.clock, BLINK_ITERATIONS)?;
                        panel.blank(BLINK_DARK_MS)
                    })?;
                }
                self.enter(Mode::SetClock(SetPhase::Leaving));
                Ok(())
            }
            SetPhase::Editing => {
                self.edit(inputs, wall_time, EDIT_PACE_MS);
                Ok(())
            }
            SetPhase::Leaving => {
                if !inputs.snooze {
                    self.enter(Mode::Normal);
                }
                Ok(())
            }
        }
    }

    fn poll_set_alarm(&mut self, phase: SetPhase, inputs: Inputs) -> Result<()> {
        match phase {
            SetPhase::Entering if inputs.snooze => self.draw(|panel| {
                panel.blank(BLINK_DARK_MS)?;
                panel.show_alarm(&self.statics.clock, BLINK_ITERATIONS)
            }),
            SetPhase::Entering => {
                self.ramp.release();
                self.enter(Mode::SetAlarm(SetPhase::Editing));
                Ok(())
            }
            SetPhase::Editing => {
                self.draw(|panel| panel.show_alarm(&self.statics.clock, ALARM_EDIT_ITERATIONS))?;
                let inputs_after = self.sample()?;
                if inputs_after.snooze {
                    for _ in 0..SET_ALARM_EXIT_BLINKS {
                        self.draw(|panel| {
                            panel.show_alarm(&self.statics.clock, BLINK_ITERATIONS)?;
                            panel.blank(BLINK_DARK_MS)
                        })?;
                    }
                    self.enter(Mode::SetAlarm(SetPhase::Leaving));
                } else {
                    self.edit(inputs_after, alarm_time, 0);
                }
                Ok(())
            }
            SetPhase::Leaving => {
                if !inputs.snooze {
                    self.statics.set_refresh(true);
                    self.enter(Mode::Normal);
                }
                Ok(())
            }
        }
    }

    /// Applies held edit buttons to the time chosen by `target`, pausing `pace_ms` after
    /// each adjustment.
    fn edit(&mut self, inputs: Inputs, target: fn(&mut ClockState) -> &mut ClockTime, pace_ms: u32) {
        if !inputs.any_edit_button() {
            self.ramp.release();
            return;
        }
        for button in [Button::Increase, Button::Decrease] {
            if !inputs.is_pressed(button) {
                continue;
            }
            let minute_change = self.ramp.press(button);
            self.statics.clock.update(|state| {
                let time = target(state);
                if button == Button::Increase {
                    time.add_minutes(minute_change);
                } else {
                    time.sub_minutes(minute_change);
                }
            });
            self.delay.delay_ms(pace_ms);
        }
    }

    /// Samples the controls and publishes the switch position.
    fn sample(&mut self) -> Result<Inputs> {
        let inputs = self.controls.sample()?;
        self.statics.clock.update(|state| state.armed = inputs.armed);
        Ok(inputs)
    }

    /// Runs `f` on the panel. Skipped if no panel is installed.
    fn draw(&self, f: impl FnOnce(&mut Panel<S, O, D>) -> Result<()>) -> Result<()> {
        self.statics.panel.with(f).unwrap_or(Ok(()))
    }

    fn enter(&mut self, mode: Mode) {
        #[cfg(feature = "defmt")]
        defmt::info!("mode: {} -> {}", self.mode, mode);
        self.mode = mode;
    }
}

const fn wall_time(state: &mut ClockState) -> &mut ClockTime {
    &mut state.wall.time
}

const fn alarm_time(state: &mut ClockState) -> &mut ClockTime {
    &mut state.alarm
}
