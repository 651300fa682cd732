//! Core of a crystal-timed 12-hour alarm clock on a resistor-less 4-digit LED panel.
//!
//! Three contexts share the clock: a once-per-second tick interrupt
//! ([`AlarmClockStatic::on_tick`]), a display-refresh interrupt
//! ([`AlarmClockStatic::on_refresh`]) and the foreground polling loop
//! ([`AlarmClock::poll`]). All time state lives in [`SharedClock`] and is only
//! read or written through atomic snapshots.
#![cfg_attr(target_os = "none", no_std)]

pub mod alarm_clock;
pub mod bit_matrix_led4;
pub mod button;
pub mod clock_state;
pub mod clock_time;
mod error;
pub mod led4;
pub mod multiplexer;
mod never;
pub mod panel;
pub mod shared_constants;
#[cfg(not(target_os = "none"))]
pub mod sim;
pub mod siren;
pub mod state_machine;

// Re-export commonly used items
pub use alarm_clock::{AlarmClock, AlarmClockStatic};
pub use button::{Button, Controls, Inputs};
pub use clock_state::{ClockState, SharedClock};
pub use clock_time::{ClockTime, Meridiem, WallTime};
pub use error::{Error, Result};
pub use led4::{Anode, OutputArray, PinSink, SegmentSink};
pub use never::Never;
pub use panel::{Panel, PanelSlot};
pub use siren::Siren;
pub use state_machine::{Mode, Ramp, SetPhase};
