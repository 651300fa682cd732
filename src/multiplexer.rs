//! Time-division multiplexing of one [`Frame`] onto a [`SegmentSink`].

use embedded_hal::delay::DelayNs;

use crate::Result;
use crate::bit_matrix_led4::Frame;
use crate::led4::SegmentSink;
use crate::shared_constants::BRIGHT_LEVEL_US;

/// Lights the elements of a frame one at a time.
///
/// Every pulse is preceded by a clear and the pass ends with a clear, so no anode group is
/// ever live for longer than [`BRIGHT_LEVEL_US`] and never two at once.
pub struct Multiplexer<S> {
    sink: S,
}

impl<S: SegmentSink> Multiplexer<S> {
    #[must_use]
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }

    /// One multiplexing pass over `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink refuses a level. The sink is cleared on a best-effort
    /// basis before returning.
    pub fn show(&mut self, frame: &Frame, delay: &mut impl DelayNs) -> Result<()> {
        let result = self.pulse_all(frame, delay);
        let cleared = self.sink.clear();
        result.and(cleared)
    }

    /// De-energizes the whole panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink refuses a level.
    pub fn clear(&mut self) -> Result<()> {
        self.sink.clear()
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn pulse_all(&mut self, frame: &Frame, delay: &mut impl DelayNs) -> Result<()> {
        for pulse in frame.pulses() {
            self.sink.clear()?;
            self.sink.energize(pulse.anode, pulse.cathodes)?;
            delay.delay_us(BRIGHT_LEVEL_US);
        }
        Ok(())
    }
}
