use embedded_hal::digital::{OutputPin, PinState};

use crate::Result;
use crate::error::Error::CannotSetOutputState;

/// Array of output pins for LED displays.
///
/// See the [`PinSink`](crate::led4::PinSink) documentation for usage examples.
pub struct OutputArray<P, const N: usize>([P; N]);

impl<P: OutputPin, const N: usize> OutputArray<P, N> {
    pub const fn new(outputs: [P; N]) -> Self {
        Self(outputs)
    }

    #[inline]
    pub(crate) fn set_state_at_index(&mut self, index: usize, state: PinState) -> Result<()> {
        self.0
            .get_mut(index)
            .ok_or(CannotSetOutputState)?
            .set_state(state)
            .map_err(|_| CannotSetOutputState)
    }

    #[inline]
    pub(crate) fn set_all(&mut self, state: PinState) -> Result<()> {
        for output in &mut self.0 {
            output.set_state(state).map_err(|_| CannotSetOutputState)?;
        }
        Ok(())
    }

    /// Gives the pins back, e.g. to inspect simulated lines in tests.
    pub fn into_inner(self) -> [P; N] {
        self.0
    }
}

impl<P: OutputPin> OutputArray<P, { u8::BITS as usize }> {
    /// Drives bit `i` of `bits` onto pin `i`: a set bit takes the pin to `on`.
    #[inline]
    pub(crate) fn set_from_bits(&mut self, mut bits: u8, on: PinState) -> Result<()> {
        for output in &mut self.0 {
            let state = if (bits & 1) == 1 { on } else { !on };
            output.set_state(state).map_err(|_| CannotSetOutputState)?;
            bits >>= 1;
        }
        Ok(())
    }
}
