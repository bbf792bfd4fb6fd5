//! DMA-readable pulse buffer and the color encoder that fills it.
//!
//! Every color bit becomes one byte: [`PULSE_ONE`] for a set bit and
//! [`PULSE_ZERO`] for a clear bit. A pixel therefore occupies
//! [`BITS_PER_PIXEL`] consecutive bytes, laid out in the order the strip
//! consumes them:
//!
//! | Bytes | Source bits            |
//! |-------|------------------------|
//! | 0-7   | green, bit 7 to bit 0  |
//! | 8-15  | red, bit 7 to bit 0    |
//! | 16-23 | blue, bit 7 to bit 0   |
//!
//! # Example
//! ```rust
//! use neopixel_spi_dma::pulse::{PULSE_ONE, PULSE_ZERO};
//! use neopixel_spi_dma::{compute_buffer_len, Color, PulseBuffer};
//!
//! const PIXELS: usize = 8;
//! const LEN: usize = compute_buffer_len(PIXELS);
//!
//! let mut buffer = PulseBuffer::<PIXELS, LEN>::new();
//! let written = buffer.encode(&[Color::BLACK, Color::WHITE]).unwrap();
//!
//! assert_eq!(written, 48);
//! assert!(buffer.as_bytes()[..24].iter().all(|&b| b == PULSE_ZERO));
//! assert!(buffer.as_bytes()[24..48].iter().all(|&b| b == PULSE_ONE));
//! ```
//!
//! # Memory Layout
//! The buffer is a single flat byte array aligned to four bytes, so it can be
//! handed to a DMA channel as one contiguous source region. Only the first
//! `24 × N` bytes are meaningful after encoding `N` colors; the remainder keeps
//! whatever an earlier, longer frame left there.
//!
//! # Safety
//! The DMA engine reads the buffer through [`ReadBuffer`] while the CPU is not
//! allowed to touch it. The [`PixelDriver`](crate::PixelDriver) enforces this
//! by holding the only mutable borrow and refusing to encode until the
//! previous transfer is reported complete.

use core::fmt;

use embedded_dma::ReadBuffer;

use crate::pulse::{pulse_for, PulseByte, PULSE_ONE, PULSE_ZERO};
use crate::{compute_buffer_len, Color, Error, Result, BITS_PER_PIXEL};

const BITS_PER_CHANNEL: usize = 8;

/// Pulse bytes for a fixed number of pixels.
///
/// # Type Parameters
/// - `PIXELS`: Number of pixels the buffer can hold
/// - `LEN`: Buffer length in bytes, must be `compute_buffer_len(PIXELS)`
///
/// A mismatched `LEN` is rejected at compile time when [`PulseBuffer::new`]
/// is instantiated.
#[derive(Clone)]
#[repr(C)]
#[repr(align(4))]
pub struct PulseBuffer<const PIXELS: usize, const LEN: usize> {
    data: [u8; LEN],
}

impl<const PIXELS: usize, const LEN: usize> Default for PulseBuffer<PIXELS, LEN> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PIXELS: usize, const LEN: usize> PulseBuffer<PIXELS, LEN> {
    const LEN_MATCHES: () = assert!(
        LEN == compute_buffer_len(PIXELS),
        "LEN must be compute_buffer_len(PIXELS)"
    );

    /// Create a buffer with every pixel encoded as black.
    /// # Example
    /// ```rust
    /// use neopixel_spi_dma::{compute_buffer_len, PulseBuffer};
    ///
    /// const PIXELS: usize = 30;
    /// const LEN: usize = compute_buffer_len(PIXELS);
    ///
    /// // usually placed in a `static` so its address never changes
    /// let buffer = PulseBuffer::<PIXELS, LEN>::new();
    /// assert_eq!(buffer.as_bytes().len(), 720);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::LEN_MATCHES;
        Self {
            data: [PULSE_ZERO; LEN],
        }
    }

    /// Number of pixels this buffer was sized for.
    #[must_use]
    pub const fn pixel_capacity(&self) -> usize {
        PIXELS
    }

    /// Check that `count` colors can be encoded.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for zero colors,
    /// [`Error::CapacityExceeded`] for more colors than the buffer holds.
    pub const fn check_pixel_count(count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::InvalidArgument);
        }
        if count > PIXELS {
            return Err(Error::CapacityExceeded {
                requested: count,
                capacity: PIXELS,
            });
        }
        Ok(())
    }

    /// Encode `colors` into the start of the buffer, one pixel after another.
    ///
    /// Returns the number of bytes written, always `24 × colors.len()`.
    /// Bytes past that point are left untouched.
    ///
    /// # Errors
    ///
    /// See [`PulseBuffer::check_pixel_count`]. On error nothing is written.
    pub fn encode(&mut self, colors: &[Color]) -> Result<usize> {
        Self::check_pixel_count(colors.len())?;
        for (slot, color) in self.data.chunks_exact_mut(BITS_PER_PIXEL).zip(colors) {
            encode_into(slot, *color);
        }
        Ok(compute_buffer_len(colors.len()))
    }

    /// Encode a single pixel in place.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] if `index` is past the end of the strip.
    pub fn encode_pixel(&mut self, index: usize, color: Color) -> Result<()> {
        let slot = self
            .data
            .chunks_exact_mut(BITS_PER_PIXEL)
            .nth(index)
            .ok_or(Error::CapacityExceeded {
                requested: index.saturating_add(1),
                capacity: PIXELS,
            })?;
        encode_into(slot, color);
        Ok(())
    }

    /// Read back the color currently encoded for a pixel.
    ///
    /// Returns `None` if `index` is out of range or the pixel's bytes are not
    /// valid pulse patterns.
    #[must_use]
    pub fn decode_pixel(&self, index: usize) -> Option<Color> {
        let slot = self.pixel_bytes(index)?;
        let mut packed = 0u32;
        for &byte in slot {
            packed = (packed << 1) | u32::from(PulseByte::decode(byte)?);
        }
        Some(Color::from_packed(packed))
    }

    /// The pulse bytes of one pixel.
    #[must_use]
    pub fn pixel_bytes(&self, index: usize) -> Option<&[u8]> {
        self.data.chunks_exact(BITS_PER_PIXEL).nth(index)
    }

    /// The whole buffer as handed to the DMA engine.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

// Writes one pixel: each wire-order channel scanned with a mask starting at
// 0x80, so every channel goes out MSB first.
fn encode_into(slot: &mut [u8], color: Color) {
    for (bits, channel) in slot
        .chunks_exact_mut(BITS_PER_CHANNEL)
        .zip(color.wire_bytes())
    {
        let mut mask = 0x80u8;
        for byte in bits {
            *byte = pulse_for(channel & mask != 0);
            mask >>= 1;
        }
    }
}

unsafe impl<const PIXELS: usize, const LEN: usize> ReadBuffer for PulseBuffer<PIXELS, LEN> {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        (self.data.as_ptr(), LEN)
    }
}

unsafe impl<const PIXELS: usize, const LEN: usize> ReadBuffer for &mut PulseBuffer<PIXELS, LEN> {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        (self.data.as_ptr(), LEN)
    }
}

impl<const PIXELS: usize, const LEN: usize> fmt::Debug for PulseBuffer<PIXELS, LEN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulseBuffer")
            .field("size", &LEN)
            .field("pixels", &PIXELS)
            .field("ones", &self.data.iter().filter(|&&b| b == PULSE_ONE).count())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const PIXELS: usize, const LEN: usize> defmt::Format for PulseBuffer<PIXELS, LEN> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PulseBuffer<{}, {}>", PIXELS, LEN);
        defmt::write!(f, " address: {=usize:#x}", self.data.as_ptr() as usize);
    }
}
