//! The output side of a resistor-less, common-anode 4-digit 7-segment LED panel.
//!
//! The multiplexer sees the panel only as a [`SegmentSink`]: "energize one anode group with
//! these cathodes" and "clear everything". [`PinSink`] implements that over plain
//! `embedded-hal` output pins.
//!
//! See [`PinSink`] for wiring and a usage example.

use embedded_hal::digital::{OutputPin, PinState};

use crate::Result;
use crate::shared_constants::{ANODE_COUNT, SEGMENT_COUNT};

// ============================================================================
// OutputArray Submodule
// ============================================================================

mod output_array;
pub use output_array::OutputArray;

pub use crate::bit_matrix_led4::Anode;

// ============================================================================
// SegmentSink Trait
// ============================================================================

/// Opaque output sink for the display.
///
/// Implementations must leave at most one anode group live at any time. Callers always
/// [`clear`](SegmentSink::clear) before energizing the next group.
pub trait SegmentSink {
    /// Selects `anode` with the cathode lines in `cathodes` (bit 0 is segment A) pulled to
    /// their "on" level.
    ///
    /// # Errors
    ///
    /// Returns an error if an output line refuses a level.
    fn energize(&mut self, anode: Anode, cathodes: u8) -> Result<()>;

    /// De-energizes every anode group and cathode line.
    ///
    /// # Errors
    ///
    /// Returns an error if an output line refuses a level.
    fn clear(&mut self) -> Result<()>;
}

impl<S: SegmentSink + ?Sized> SegmentSink for &mut S {
    fn energize(&mut self, anode: Anode, cathodes: u8) -> Result<()> {
        (**self).energize(anode, cathodes)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
}

// ============================================================================
// PinSink
// ============================================================================

/// A [`SegmentSink`] over output pins of a common-anode panel.
///
/// # Hardware Requirements
///
/// - Anode pins select a group: HIGH = on, LOW = off. Order: digits 1-4, colon, apostrophe.
/// - Cathode pins select segments: LOW = on, HIGH = off. Order: A-G, then decimal point.
///
/// # Example
///
/// ```
/// use clockit::sim::{SimPin, VirtualClock};
/// use clockit::{Anode, OutputArray, PinSink, SegmentSink};
///
/// let clock = VirtualClock::new();
/// let anodes = OutputArray::new(core::array::from_fn(|_| SimPin::new(&clock)));
/// let cathodes = OutputArray::new(core::array::from_fn(|_| SimPin::new(&clock)));
/// let mut sink = PinSink::new(anodes, cathodes);
///
/// sink.energize(Anode::Digit4, 0b_0000_0110)?; // '1' on the rightmost digit
/// sink.clear()?;
/// # Ok::<(), clockit::Error>(())
/// ```
pub struct PinSink<A, C> {
    anodes: OutputArray<A, ANODE_COUNT>,
    cathodes: OutputArray<C, SEGMENT_COUNT>,
}

impl<A: OutputPin, C: OutputPin> PinSink<A, C> {
    #[must_use]
    pub const fn new(
        anodes: OutputArray<A, ANODE_COUNT>,
        cathodes: OutputArray<C, SEGMENT_COUNT>,
    ) -> Self {
        Self { anodes, cathodes }
    }

    /// Gives the pin arrays back.
    pub fn into_parts(self) -> (OutputArray<A, ANODE_COUNT>, OutputArray<C, SEGMENT_COUNT>) {
        (self.anodes, self.cathodes)
    }
}

impl<A: OutputPin, C: OutputPin> SegmentSink for PinSink<A, C> {
    fn energize(&mut self, anode: Anode, cathodes: u8) -> Result<()> {
        // Cathodes first so the group never lights with the previous pattern.
        self.cathodes.set_from_bits(cathodes, PinState::Low)?;
        self.anodes.set_state_at_index(anode.index(), PinState::High)
    }

    fn clear(&mut self) -> Result<()> {
        self.anodes.set_all(PinState::Low)?;
        self.cathodes.set_all(PinState::High)
    }
}
