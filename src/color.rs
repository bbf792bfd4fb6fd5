//! Packed 24-bit pixel colors in strip wire order.
//!
//! NeoPixel strips expect green first, then red, then blue. A [`Color`] keeps
//! the three channels packed the same way in the low 24 bits of a `u32`:
//!
//! | Bits  | Channel |
//! |-------|---------|
//! | 23-16 | green   |
//! | 15-8  | red     |
//! | 7-0   | blue    |
//!
//! so the encoder can walk the value from bit 23 down to bit 0 and emit the
//! strip's bit order directly. Note that a raw `0x00FF00` therefore is *red*,
//! not green. Use [`Color::from_rgb`] or the `Rgb888` conversion when the
//! source is in the usual R-G-B order.

use bitfield::bitfield;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

bitfield! {
    /// 24-bit color packed as G-R-B.
    ///
    /// The bit layout is as follows:
    /// - Bits 31-24: unused, always zero
    /// - Bits 23-16: Green channel
    /// - Bits 15-8: Red channel
    /// - Bits 7-0: Blue channel
    #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct Color(u32);
    impl Debug;
    /// Green channel
    pub u8, green, set_green: 23, 16;
    /// Red channel
    pub u8, red, set_red: 15, 8;
    /// Blue channel
    pub u8, blue, set_blue: 7, 0;
}

impl Color {
    /// Mask of the bits carrying color data.
    pub const MASK: u32 = 0x00FF_FFFF;

    /// All channels off.
    pub const BLACK: Self = Self(0);

    /// All channels fully on.
    pub const WHITE: Self = Self(Self::MASK);

    /// Build a color from channels given in the usual red, green, blue order.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_grb(green, red, blue)
    }

    /// Build a color from channels given in wire order.
    #[must_use]
    pub const fn from_grb(green: u8, red: u8, blue: u8) -> Self {
        Self(((green as u32) << 16) | ((red as u32) << 8) | blue as u32)
    }

    /// Build a color from a packed G-R-B value. Bits above 23 are ignored.
    #[must_use]
    pub const fn from_packed(value: u32) -> Self {
        Self(value & Self::MASK)
    }

    /// The packed G-R-B value.
    #[must_use]
    pub const fn packed(self) -> u32 {
        self.0
    }

    /// The three channel bytes in the order they go out on the wire.
    #[must_use]
    pub fn wire_bytes(self) -> [u8; 3] {
        [self.green(), self.red(), self.blue()]
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::from_packed(value)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.packed()
    }
}

impl From<(u8, u8, u8)> for Color {
    /// Channels are taken as `(red, green, blue)`.
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::from_rgb(red, green, blue)
    }
}

impl From<Rgb888> for Color {
    fn from(color: Rgb888) -> Self {
        Self::from_rgb(color.r(), color.g(), color.b())
    }
}

impl From<Color> for Rgb888 {
    fn from(color: Color) -> Self {
        Rgb888::new(color.red(), color.green(), color.blue())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Color {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Color(g: {}, r: {}, b: {})",
            self.green(),
            self.red(),
            self.blue()
        );
    }
}
