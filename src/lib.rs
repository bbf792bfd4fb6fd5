//! SPI/DMA driver for NeoPixel (WS2812) LED strips.
//!
//! ## How NeoPixel Strips Work
//!
//! A NeoPixel strip is a chain of LEDs that each carry a tiny controller. The
//! chain is driven over a single data wire with no clock: every color bit is a
//! fixed-length period that starts high and ends low, and the *length of the
//! high part* decides whether the bit is a 0 or a 1.
//!
//! ### Signal shape
//! - **"0" bit** – short high pulse, long low tail
//! - **"1" bit** – long high pulse, short low tail
//! - **Reset** – the line held low for longer than the reset interval latches
//!   the shifted colors into the LEDs and restarts the chain at the first pixel
//!
//! Each pixel consumes 24 bits in the order green, red, blue, each channel
//! most-significant bit first, and forwards everything after that to the next
//! pixel.
//!
//! ### Generating the waveform with SPI
//! Bit-banging the data line ties up the CPU for the whole frame and is
//! sensitive to interrupts. Instead this crate runs an SPI peripheral at a
//! fixed clock where one *byte* lasts exactly one NeoPixel bit period and lets
//! the MOSI pin play the data line:
//!
//! | Color bit | SPI byte | High time at 6 MHz |
//! |-----------|----------|--------------------|
//! | 0         | `0x80`   | ≈ 167 ns           |
//! | 1         | `0xFE`   | ≈ 1167 ns          |
//!
//! The bytes are rendered into a [`PulseBuffer`] and a DMA channel feeds them
//! to the SPI data register on each transmit-ready request, so the CPU is free
//! while the frame goes out.
//!
//! ### Frame sequence
//! 1. Wait until the previous DMA transfer has drained.
//! 2. Release the data line so it idles low and start the reset timer.
//! 3. Encode the new colors into the (single) pulse buffer.
//! 4. Wait out whatever is left of the reset interval.
//! 5. Arm the DMA channel and reconnect the data line.
//!
//! The completion interrupt clears the DMA done indicator, marks the transfer
//! complete and releases the line again.
//!
//! ## Crate Layout
//!
//! - [`color`] – packed 24-bit G-R-B [`Color`]
//! - [`pulse`] – the bit-to-byte timing table
//! - [`buffer`] – the [`PulseBuffer`] encoder, DMA readable
//! - [`transport`] – traits the hardware bring-up code implements
//! - [`driver`] – the [`PixelDriver`] transmit controller and [`TransmitFlag`]
//!
//! ## Example
//! ```rust
//! use neopixel_spi_dma::transport::{CompletionPort, MicrosTimer, Transport};
//! use neopixel_spi_dma::{compute_buffer_len, Color, PixelDriver, PulseBuffer, TransmitFlag};
//!
//! struct Spi;
//! impl Transport for Spi {
//!     fn load(&mut self, _source: *const u8, _len: usize) {}
//!     fn drive_line(&mut self) {}
//!     fn release_line(&mut self) {}
//!     fn start(&mut self) {}
//! }
//! impl CompletionPort for Spi {
//!     fn acknowledge(&mut self) {}
//!     fn release_line(&mut self) {}
//! }
//!
//! struct Ticks(u32);
//! impl MicrosTimer for Ticks {
//!     fn restart(&mut self) {
//!         self.0 = 0;
//!     }
//!     fn elapsed_us(&mut self) -> u32 {
//!         self.0 += 10;
//!         self.0
//!     }
//! }
//!
//! const PIXELS: usize = 8;
//! const LEN: usize = compute_buffer_len(PIXELS);
//!
//! // a `static` on the target
//! let buffer = Box::leak(Box::new(PulseBuffer::<PIXELS, LEN>::new()));
//! let flag = TransmitFlag::new();
//! let mut driver = PixelDriver::new(buffer, &flag, Spi, Ticks(0));
//!
//! driver.update(&[Color::from(0x00_FF_00); PIXELS]).unwrap();
//!
//! // normally called from the DMA completion interrupt
//! flag.complete(&mut Spi);
//! assert!(driver.is_idle());
//! ```
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and emits `defmt` trace
//! messages from the transmit controller. No functional changes.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod color;
pub mod driver;
mod error;
pub mod pulse;
pub mod transport;

pub use buffer::PulseBuffer;
pub use color::Color;
pub use driver::{PixelDriver, TransmitFlag, TransmitState};
pub use error::{Error, Result};

/// Number of color bits, and therefore pulse bytes, per pixel.
pub const BITS_PER_PIXEL: usize = 24;

/// Minimum time in microseconds the data line has to stay low between
/// frames so the strip latches the previous one.
pub const RESET_INTERVAL_US: u32 = 70;

/// Computes the pulse buffer length for `PulseBuffer`
///
/// # Arguments
///
/// * `pixels` - Number of pixels on the strip
///
/// # Returns
///
/// Number of bytes needed to hold one pulse byte per color bit
#[must_use]
pub const fn compute_buffer_len(pixels: usize) -> usize {
    pixels * BITS_PER_PIXEL
}

/// Computes how long the DMA engine needs to stream a full strip.
///
/// # Arguments
///
/// * `pixels` - Number of pixels on the strip
/// * `clock_hz` - SPI clock the transport was configured with
///
/// # Returns
///
/// Transfer time in microseconds, rounded up, excluding the reset interval.
/// Saturates at `u32::MAX`.
///
/// # Panics
///
/// Panics if `clock_hz` is 0.
#[must_use]
pub const fn compute_transfer_us(pixels: usize, clock_hz: u32) -> u32 {
    let bits = (compute_buffer_len(pixels) as u64).saturating_mul(8);
    saturate_u32(bits.saturating_mul(1_000_000).div_ceil(clock_hz as u64))
}

pub(crate) const fn saturate_u32(value: u64) -> u32 {
    if value > u32::MAX as u64 {
        u32::MAX
    } else {
        value as u32
    }
}
