//! Host-side stand-ins for the clock's hardware, driven by virtual time.
//!
//! [`VirtualClock`] is the delay source and the interrupt controller at once: every delay
//! advances virtual time, and periodic handlers registered with
//! [`every`](VirtualClock::every) fire at their due instants inside those delays. A handler
//! that is already running cannot fire again until it returns, but other handlers can
//! preempt it, which is how the tick interrupts a display refresh on the real part.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::Result;
use crate::alarm_clock::{AlarmClock, AlarmClockStatic};
use crate::bit_matrix_led4::{Anode, Indicator, Pulse, decode_digit};
use crate::button::Controls;
use crate::clock_state::ClockState;
use crate::clock_time::ClockTime;
use crate::led4::SegmentSink;
use crate::panel::Panel;
use crate::shared_constants::{REFRESH_PERIOD_US, TICK_PERIOD_US};
use crate::siren::Siren;

type Handler = Box<dyn FnMut()>;

struct PeriodicTimer {
    period_us: u64,
    next_us: u64,
    /// `None` while the handler is running.
    handler: Option<Handler>,
}

#[derive(Default)]
struct Timeline {
    now_us: Cell<u64>,
    timers: RefCell<Vec<PeriodicTimer>>,
}

/// Virtual time plus simulated periodic interrupts.
///
/// Clones share the same timeline.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use clockit::sim::VirtualClock;
/// use embedded_hal::delay::DelayNs;
///
/// let clock = VirtualClock::new();
/// let fired = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&fired);
/// clock.every(1_000, move || counter.set(counter.get() + 1));
///
/// let mut delay = clock.clone();
/// delay.delay_ms(5);
/// assert_eq!(fired.get(), 5);
/// assert_eq!(clock.now_us(), 5_000);
/// ```
#[derive(Clone, Default)]
pub struct VirtualClock(Rc<Timeline>);

impl VirtualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now_us(&self) -> u64 {
        self.0.now_us.get()
    }

    /// Registers `handler` to run every `period_us`, first one period from now.
    ///
    /// # Panics
    ///
    /// Panics if `period_us` is zero.
    pub fn every(&self, period_us: u32, handler: impl FnMut() + 'static) {
        assert!(period_us > 0, "a periodic handler needs a non-zero period");
        let period_us = u64::from(period_us);
        self.0.timers.borrow_mut().push(PeriodicTimer {
            period_us,
            next_us: self.now_us().saturating_add(period_us),
            handler: Some(Box::new(handler)),
        });
    }

    /// Moves time forward by `us`, running every handler that comes due on the way.
    ///
    /// A handler that overruns its own period fires once more as soon as it returns, the
    /// way a pending interrupt flag would.
    pub fn advance_us(&self, us: u64) {
        let target = self.now_us().saturating_add(us);
        while let Some((index, due_us)) = self.next_due(target) {
            self.0.now_us.set(self.now_us().max(due_us));
            let (mut handler, period_us) = {
                let mut timers = self.0.timers.borrow_mut();
                let Some(timer) = timers.get_mut(index) else {
                    break;
                };
                (timer.handler.take(), timer.period_us)
            };
            if let Some(handler) = handler.as_mut() {
                handler();
            }
            if let Some(timer) = self.0.timers.borrow_mut().get_mut(index) {
                timer.next_us = due_us.saturating_add(period_us).max(self.now_us());
                timer.handler = handler;
            }
        }
        self.0.now_us.set(self.now_us().max(target));
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms.saturating_mul(1_000));
    }

    /// Earliest idle handler due at or before `target`.
    fn next_due(&self, target: u64) -> Option<(usize, u64)> {
        self.0
            .timers
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.handler.is_some() && timer.next_us <= target)
            .min_by_key(|(_, timer)| timer.next_us)
            .map(|(index, timer)| (index, timer.next_us))
    }
}

impl DelayNs for VirtualClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance_us(u64::from(ns.div_ceil(1_000)));
    }

    fn delay_us(&mut self, us: u32) {
        self.advance_us(u64::from(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_ms(u64::from(ms));
    }
}

// ============================================================================
// SimInput
// ============================================================================

/// A scriptable button or switch line.
///
/// The script is a list of "active" intervals in virtual time. Clones share the script,
/// so a test keeps one clone and hands the other to [`Controls`](crate::Controls).
#[derive(Clone)]
pub struct SimInput {
    clock: VirtualClock,
    active_low: bool,
    /// Half-open `[start, end)` intervals; `None` means still active.
    active: Rc<RefCell<Vec<(u64, Option<u64>)>>>,
}

impl SimInput {
    /// A momentary button: active (pressed) pulls the line low.
    #[must_use]
    pub fn button(clock: &VirtualClock) -> Self {
        Self::new(clock, true)
    }

    /// A slide switch: active ("on") drives the line high.
    #[must_use]
    pub fn switch(clock: &VirtualClock) -> Self {
        Self::new(clock, false)
    }

    fn new(clock: &VirtualClock, active_low: bool) -> Self {
        Self {
            clock: clock.clone(),
            active_low,
            active: Rc::default(),
        }
    }

    /// Becomes active now and stays active until [`release_now`](Self::release_now).
    pub fn press_now(&self) {
        if !self.is_active() {
            self.active.borrow_mut().push((self.clock.now_us(), None));
        }
    }

    /// Ends any open-ended activity now.
    pub fn release_now(&self) {
        let now = self.clock.now_us();
        for interval in self.active.borrow_mut().iter_mut() {
            if interval.1.is_none() {
                interval.1 = Some(now);
            }
        }
    }

    /// Active from now for exactly `ms` of virtual time.
    pub fn press_for_ms(&self, ms: u64) {
        let now = self.clock.now_us();
        self.active
            .borrow_mut()
            .push((now, Some(now.saturating_add(ms.saturating_mul(1_000)))));
    }

    pub fn set_on(&self, on: bool) {
        if on {
            self.press_now();
        } else {
            self.release_now();
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        let now = self.clock.now_us();
        self.active
            .borrow()
            .iter()
            .any(|&(start, end)| start <= now && end.is_none_or(|end| now < end))
    }
}

impl ErrorType for SimInput {
    type Error = Infallible;
}

impl InputPin for SimInput {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.is_active() != self.active_low)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.is_active() == self.active_low)
    }
}

// ============================================================================
// SimPin
// ============================================================================

/// An output line that remembers when it changed level. Starts low.
///
/// Clones share the line, so a test can keep watching a pin it has handed to a driver.
#[derive(Clone)]
pub struct SimPin {
    clock: VirtualClock,
    /// Instants at which the level changed, with the new level.
    transitions: Rc<RefCell<Vec<(u64, bool)>>>,
}

impl SimPin {
    #[must_use]
    pub fn new(clock: &VirtualClock) -> Self {
        Self {
            clock: clock.clone(),
            transitions: Rc::default(),
        }
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        self.transitions
            .borrow()
            .last()
            .is_some_and(|&(_, high)| high)
    }

    #[must_use]
    pub fn is_low(&self) -> bool {
        !self.is_high()
    }

    #[must_use]
    pub fn rising_edges(&self) -> usize {
        self.transitions
            .borrow()
            .iter()
            .filter(|&&(_, high)| high)
            .count()
    }

    /// Half-open `[start, end)` spans during which the line was high; an open span ends
    /// at the current virtual time.
    #[must_use]
    pub fn high_intervals(&self) -> Vec<(u64, u64)> {
        let mut intervals = Vec::new();
        let mut rose_at = None;
        for &(at, high) in self.transitions.borrow().iter() {
            match (high, rose_at) {
                (true, _) => rose_at = Some(at),
                (false, Some(start)) => {
                    intervals.push((start, at));
                    rose_at = None;
                }
                (false, None) => {}
            }
        }
        if let Some(start) = rose_at {
            intervals.push((start, self.clock.now_us()));
        }
        intervals
    }

    fn set(&self, high: bool) {
        if self.is_high() != high {
            self.transitions
                .borrow_mut()
                .push((self.clock.now_us(), high));
        }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

// ============================================================================
// RecordingSink
// ============================================================================

/// A [`SegmentSink`] that checks the multiplexing rules and remembers what was shown.
///
/// Pulses are grouped into passes: a pass starts with the first pulse after the panel has
/// been dark for any non-zero time.
pub struct RecordingSink {
    clock: VirtualClock,
    live: Option<(Pulse, u64)>,
    dark_since_us: u64,
    pulse_count: usize,
    pass_count: usize,
    overlap_count: usize,
    max_on_us: u64,
    pass: Vec<Pulse>,
    faces: Vec<String>,
}

impl RecordingSink {
    #[must_use]
    pub fn new(clock: &VirtualClock) -> Self {
        Self {
            clock: clock.clone(),
            live: None,
            dark_since_us: 0,
            pulse_count: 0,
            pass_count: 0,
            overlap_count: 0,
            max_on_us: 0,
            pass: Vec::new(),
            faces: Vec::new(),
        }
    }

    #[must_use]
    pub const fn pulse_count(&self) -> usize {
        self.pulse_count
    }

    #[must_use]
    pub const fn pass_count(&self) -> usize {
        self.pass_count
    }

    /// Pulses energized while another group was still live.
    #[must_use]
    pub const fn overlap_count(&self) -> usize {
        self.overlap_count
    }

    /// Longest time any group stayed live.
    #[must_use]
    pub const fn max_on_us(&self) -> u64 {
        self.max_on_us
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// The pulses of the most recent pass.
    #[must_use]
    pub fn last_pass(&self) -> &[Pulse] {
        &self.pass
    }

    /// The digits of the most recent pass as `H:MM` or `HH:MM`, whether or not the colon
    /// was lit. Empty if no digit was shown.
    #[must_use]
    pub fn last_text(&self) -> String {
        face_text(&self.pass)
    }

    /// Every distinct text of the completed passes, in order, without consecutive repeats.
    #[must_use]
    pub fn faces(&self) -> &[String] {
        &self.faces
    }

    #[must_use]
    pub fn saw_colon(&self) -> bool {
        self.pass.contains(&Indicator::Colon.pulse())
    }

    #[must_use]
    pub fn saw_alarm_dot(&self) -> bool {
        self.pass.contains(&Indicator::AlarmDot.pulse())
    }

    #[must_use]
    pub fn saw_am_dot(&self) -> bool {
        self.pass.contains(&Indicator::AmDot.pulse())
    }

    fn finish_pass(&mut self) {
        let text = face_text(&self.pass);
        if !text.is_empty() && self.faces.last() != Some(&text) {
            self.faces.push(text);
        }
        self.pass.clear();
    }
}

impl SegmentSink for RecordingSink {
    fn energize(&mut self, anode: Anode, cathodes: u8) -> Result<()> {
        let now = self.clock.now_us();
        if self.live.is_some() {
            self.overlap_count = self.overlap_count.saturating_add(1);
        } else if now > self.dark_since_us || self.pass_count == 0 {
            self.finish_pass();
            self.pass_count = self.pass_count.saturating_add(1);
        }
        let pulse = Pulse::new(anode, cathodes);
        self.pass.push(pulse);
        self.pulse_count = self.pulse_count.saturating_add(1);
        self.live = Some((pulse, now));
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if let Some((_, since)) = self.live.take() {
            let now = self.clock.now_us();
            self.max_on_us = self.max_on_us.max(now.saturating_sub(since));
            self.dark_since_us = now;
        }
        Ok(())
    }
}

// ============================================================================
// SimBoard
// ============================================================================

/// Statics of a simulated clock.
pub type SimAlarmClockStatic = AlarmClockStatic<RecordingSink, SimPin, VirtualClock>;

/// Foreground of a simulated clock.
pub type SimAlarmClock = AlarmClock<'static, RecordingSink, SimPin, SimInput, VirtualClock>;

/// A whole clock wired to simulated parts, with both interrupts running on virtual time.
///
/// The statics are leaked to get the `'static` lifetime the interrupt handlers need.
pub struct SimBoard {
    pub clock: VirtualClock,
    pub statics: &'static SimAlarmClockStatic,
    pub alarm_clock: SimAlarmClock,
    pub increase: SimInput,
    pub decrease: SimInput,
    pub snooze: SimInput,
    pub alarm_switch: SimInput,
    pub buzzer: (SimPin, SimPin),
}

impl SimBoard {
    /// Wires everything up without booting.
    ///
    /// # Panics
    ///
    /// The refresh handler panics if drawing fails, which simulated parts never do.
    #[must_use]
    pub fn new() -> Self {
        let clock = VirtualClock::new();
        let statics: &'static SimAlarmClockStatic =
            Box::leak(Box::new(SimAlarmClockStatic::new_static()));
        let buzzer = (SimPin::new(&clock), SimPin::new(&clock));
        statics.install_panel(Panel::new(
            RecordingSink::new(&clock),
            Siren::new(buzzer.0.clone(), buzzer.1.clone()),
            clock.clone(),
        ));
        clock.every(TICK_PERIOD_US, move || statics.on_tick());
        clock.every(REFRESH_PERIOD_US, move || {
            if let Err(err) = statics.on_refresh() {
                panic!("{err}");
            }
        });

        let increase = SimInput::button(&clock);
        let decrease = SimInput::button(&clock);
        let snooze = SimInput::button(&clock);
        let alarm_switch = SimInput::switch(&clock);
        let controls = Controls::new(
            increase.clone(),
            decrease.clone(),
            snooze.clone(),
            alarm_switch.clone(),
        );
        let alarm_clock = AlarmClock::new(statics, controls, clock.clone());
        Self {
            clock,
            statics,
            alarm_clock,
            increase,
            decrease,
            snooze,
            alarm_switch,
            buzzer,
        }
    }

    /// A board that has already run its power-up sequence.
    ///
    /// # Errors
    ///
    /// Propagates a boot failure, which simulated parts never cause.
    pub fn booted() -> Result<Self> {
        let mut board = Self::new();
        board.alarm_clock.boot()?;
        Ok(board)
    }

    #[must_use]
    pub fn state(&self) -> ClockState {
        self.statics.snapshot()
    }

    pub fn set_wall_time(&self, time: ClockTime) {
        self.statics.clock().update(|state| state.wall.time = time);
    }

    pub fn set_alarm_time(&self, time: ClockTime) {
        self.statics.clock().update(|state| state.alarm = time);
    }

    /// Polls once per virtual millisecond for `ms`.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`AlarmClock::poll`].
    pub fn run_for_ms(&mut self, ms: u64) -> Result<()> {
        let until = self.clock.now_us().saturating_add(ms.saturating_mul(1_000));
        while self.clock.now_us() < until {
            self.alarm_clock.poll()?;
            self.clock.advance_ms(1);
        }
        Ok(())
    }

    /// Polls once per virtual millisecond until `done` holds or `limit_ms` has passed.
    /// Returns whether `done` held.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`AlarmClock::poll`].
    pub fn run_until(&mut self, limit_ms: u64, done: impl Fn(&Self) -> bool) -> Result<bool> {
        let until = self.clock.now_us().saturating_add(limit_ms.saturating_mul(1_000));
        while self.clock.now_us() < until {
            self.alarm_clock.poll()?;
            if done(self) {
                return Ok(true);
            }
            self.clock.advance_ms(1);
        }
        Ok(done(self))
    }

    /// Runs `f` on the display recorder. `None` only while the panel is in use.
    pub fn with_sink<R>(&self, f: impl FnOnce(&RecordingSink) -> R) -> Option<R> {
        self.statics.with_panel(|panel| f(panel.sink()))
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

fn face_text(pass: &[Pulse]) -> String {
    let digit_at = |anode: Anode| {
        pass.iter()
            .filter(|pulse| pulse.anode == anode)
            .find_map(|pulse| decode_digit(pulse.cathodes))
    };
    let digits = Anode::DIGITS.map(digit_at);
    if digits.iter().all(Option::is_none) {
        return String::new();
    }
    let glyph = |digit: Option<u8>| digit.map_or(' ', |value| char::from(b'0'.saturating_add(value)));
    let [tens, ones, minutes_tens, minutes_ones] = digits;
    let mut text = String::new();
    if tens.is_some() {
        text.push(glyph(tens));
    }
    text.push(glyph(ones));
    text.push(':');
    text.push(glyph(minutes_tens));
    text.push(glyph(minutes_ones));
    text
}
