use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An output line (display anode/cathode or buzzer) refused a level.
    #[display("Error setting output state")]
    CannotSetOutputState,

    /// A button or switch line could not be sampled.
    #[display("Error reading input state")]
    CannotReadInput,

    /// A 12-hour time outside 1..=12 hours, 0..=59 minutes or 0..=59 seconds.
    #[display("Invalid 12-hour time {hours}:{minutes:02}:{seconds:02}")]
    InvalidTime {
        /// Requested hours.
        hours: u8,
        /// Requested minutes.
        minutes: u8,
        /// Requested seconds.
        seconds: u8,
    },

    /// A display frame has no room for another pulse.
    #[display("Display frame is full")]
    FrameFull,
}
