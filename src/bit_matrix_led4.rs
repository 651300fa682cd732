//! Segment patterns and the lookup table from display elements to drive descriptors.
//!
//! The panel is common-anode: an element lights when its anode group is selected and its
//! cathode lines are pulled low. The colon and the AM/PM apostrophe have their own anode
//! groups but borrow the C and F cathode lines; the "alarm armed" dot is the decimal
//! point of digit 4.

use heapless::Vec;

use crate::clock_time::{ClockTime, Meridiem};
use crate::shared_constants::{ANODE_COUNT, CELL_COUNT};
use crate::{Error, Result};

/// Most pulses in one pass: four digits, colon, alarm dot and AM dot.
pub const FRAME_CAPACITY: usize = 7;

// ============================================================================
// LED Constants
// ============================================================================

/// Constants for 7-segment LED displays. Bit 0 is segment A.
struct Leds;

impl Leds {
    const SEG_C: u8 = 0b_0000_0100;
    const SEG_F: u8 = 0b_0010_0000;

    /// Segments for digits 0-9.
    const DIGITS: [u8; 10] = [
        0b_0011_1111, // Digit 0
        0b_0000_0110, // Digit 1
        0b_0101_1011, // Digit 2
        0b_0100_1111, // Digit 3
        0b_0110_0110, // Digit 4
        0b_0110_1101, // Digit 5
        0b_0111_1101, // Digit 6
        0b_0000_0111, // Digit 7
        0b_0111_1111, // Digit 8
        0b_0110_1111, // Digit 9
    ];

    const DECIMAL: u8 = 0b_1000_0000;

    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Modulo is required for digit extraction"
    )]
    fn digit(value: u8) -> u8 {
        Self::DIGITS
            .get(usize::from(value % 10))
            .copied()
            .unwrap_or(0)
    }
}

/// Segment pattern to numeral, for anything that needs to read the panel back.
#[must_use]
pub fn decode_digit(cathodes: u8) -> Option<u8> {
    let position = Leds::DIGITS.iter().position(|&bits| bits == cathodes)?;
    u8::try_from(position).ok()
}

// ============================================================================
// Drive descriptors
// ============================================================================

/// One anode group. Only one may ever be energized at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Anode {
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Colon,
    Apostrophe,
}

impl Anode {
    pub const ALL: [Self; ANODE_COUNT] = [
        Self::Digit1,
        Self::Digit2,
        Self::Digit3,
        Self::Digit4,
        Self::Colon,
        Self::Apostrophe,
    ];

    /// The digit groups, left to right.
    pub const DIGITS: [Self; CELL_COUNT] = [Self::Digit1, Self::Digit2, Self::Digit3, Self::Digit4];

    /// Position of this group's line in the anode [`OutputArray`](crate::OutputArray).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Digit1 => 0,
            Self::Digit2 => 1,
            Self::Digit3 => 2,
            Self::Digit4 => 3,
            Self::Colon => 4,
            Self::Apostrophe => 5,
        }
    }

    const fn digit(position: usize) -> Self {
        debug_assert!(position < CELL_COUNT, "digit position out of range");
        match position {
            0 => Self::Digit1,
            1 => Self::Digit2,
            2 => Self::Digit3,
            _ => Self::Digit4,
        }
    }
}

/// Non-digit marks on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    Colon,
    /// Decimal point of digit 4: the alarm switch is on.
    AlarmDot,
    /// The apostrophe: lit in the AM half of the day.
    AmDot,
}

impl Indicator {
    #[must_use]
    pub const fn pulse(self) -> Pulse {
        match self {
            Self::Colon => Pulse::new(Anode::Colon, Leds::SEG_C),
            Self::AlarmDot => Pulse::new(Anode::Digit4, Leds::DECIMAL),
            Self::AmDot => Pulse::new(Anode::Apostrophe, Leds::SEG_F),
        }
    }
}

/// One element to energize: an anode group plus the cathode lines to pull low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse {
    pub anode: Anode,
    /// Bit 0 is segment A, bit 7 the decimal point.
    pub cathodes: u8,
}

impl Pulse {
    #[must_use]
    pub const fn new(anode: Anode, cathodes: u8) -> Self {
        Self { anode, cathodes }
    }

    /// A numeral on digit `position`, 0 being the leftmost and 3 the rightmost.
    #[must_use]
    pub(crate) fn digit(position: usize, value: u8) -> Self {
        Self::new(Anode::digit(position), Leds::digit(value))
    }
}

// ============================================================================
// Frame
// ============================================================================

/// The pulses of one multiplexing pass, in the order they are shown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame(Vec<Pulse, FRAME_CAPACITY>);

impl Frame {
    /// Lays out `time` as H:MM or HH:MM plus the requested indicators.
    ///
    /// The tens-of-hours digit is left dark below 10 o'clock. The AM dot follows the
    /// meridiem of `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameFull`] if the pulses do not fit, which cannot happen with
    /// [`FRAME_CAPACITY`] sized for every element.
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Division is required for digit extraction"
    )]
    pub fn time(time: &ClockTime, colon: bool, alarm_dot: bool) -> Result<Self> {
        let mut frame = Self::default();
        let (hours, minutes) = (time.hours(), time.minutes());
        if hours > 9 {
            frame.push(Pulse::digit(0, hours / 10))?;
        }
        frame.push(Pulse::digit(1, hours))?;
        frame.push(Pulse::digit(2, minutes / 10))?;
        frame.push(Pulse::digit(3, minutes))?;
        if colon {
            frame.push(Indicator::Colon.pulse())?;
        }
        if alarm_dot {
            frame.push(Indicator::AlarmDot.pulse())?;
        }
        if time.meridiem() == Meridiem::Am {
            frame.push(Indicator::AmDot.pulse())?;
        }
        Ok(frame)
    }

    /// Every element lit: "88:88" with all three indicators.
    ///
    /// # Errors
    ///
    /// See [`Frame::time`].
    pub fn lamp_test() -> Result<Self> {
        Self::time(&ClockTime::LAMP_TEST, true, true)
    }

    #[must_use]
    pub fn pulses(&self) -> &[Pulse] {
        &self.0
    }

    #[must_use]
    pub fn contains(&self, pulse: Pulse) -> bool {
        self.0.contains(&pulse)
    }

    fn push(&mut self, pulse: Pulse) -> Result<()> {
        self.0.push(pulse).map_err(|_| Error::FrameFull)
    }
}
