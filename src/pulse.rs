//! Bit-to-byte timing table.
//!
//! With the SPI clock at [`SPI_CLOCK_HZ`] one byte takes 1.333 µs on the wire,
//! which is one NeoPixel bit period at 750 kHz. The MOSI line is high for every
//! set bit of the byte, so the number of leading ones is the high time of the
//! simulated pulse.

use bitfield::bitfield;

use crate::saturate_u32;

/// SPI clock the transport must be configured with. 24 MHz bus clock divided
/// by 4.
pub const SPI_CLOCK_HZ: u32 = 6_000_000;

/// Pulse byte for a "0" color bit: lead slot only.
pub const PULSE_ZERO: u8 = 0x80;

/// Pulse byte for a "1" color bit: everything but the tail slot.
pub const PULSE_ONE: u8 = 0xFE;

bitfield! {
    /// One SPI byte viewed as eight waveform slots, sent MSB first.
    ///
    /// The bit layout is as follows:
    /// - Bit 7: Lead slot, always high so every bit period starts with a rising edge
    /// - Bits 6-1: Body slots, high only for a "1" bit
    /// - Bit 0: Tail slot, always low so the next period has an edge to start on
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct PulseByte(u8);
    impl Debug;
    /// Lead slot
    pub lead, set_lead: 7;
    /// Body slots
    pub u8, body, set_body: 6, 1;
    /// Tail slot
    pub tail, set_tail: 0;
}

impl PulseByte {
    const BODY_HIGH: u8 = 0b11_1111;

    /// Build the pulse byte for one color bit.
    #[must_use]
    pub fn for_bit(bit: bool) -> Self {
        let mut pulse = Self(0);
        pulse.set_lead(true);
        pulse.set_body(if bit { Self::BODY_HIGH } else { 0 });
        pulse.set_tail(false);
        pulse
    }

    /// Interpret a byte from the pulse buffer.
    ///
    /// Returns `None` if the byte is neither of the two pulse patterns.
    #[must_use]
    pub fn decode(byte: u8) -> Option<bool> {
        let pulse = Self(byte);
        if !pulse.lead() || pulse.tail() {
            return None;
        }
        match pulse.body() {
            0 => Some(false),
            Self::BODY_HIGH => Some(true),
            _ => None,
        }
    }

    /// The raw byte handed to the SPI data register.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Pulse byte for one color bit, usable in const contexts.
#[must_use]
#[inline]
pub const fn pulse_for(bit: bool) -> u8 {
    if bit {
        PULSE_ONE
    } else {
        PULSE_ZERO
    }
}

/// High time in nanoseconds of a pulse pattern clocked at `clock_hz`,
/// saturating at `u32::MAX`.
///
/// # Panics
///
/// Panics if `clock_hz` is 0.
#[must_use]
pub const fn high_time_ns(pattern: u8, clock_hz: u32) -> u32 {
    saturate_u32(pattern.leading_ones() as u64 * 1_000_000_000 / clock_hz as u64)
}

/// Length in nanoseconds of one pulse byte, i.e. one NeoPixel bit period,
/// saturating at `u32::MAX`.
///
/// # Panics
///
/// Panics if `clock_hz` is 0.
#[must_use]
pub const fn bit_period_ns(clock_hz: u32) -> u32 {
    saturate_u32(8 * 1_000_000_000 / clock_hz as u64)
}

#[cfg(feature = "defmt")]
impl defmt::Format for PulseByte {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PulseByte({=u8:#b})", self.0);
    }
}
