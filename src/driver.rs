//! Transmit controller for one strip.
//!
//! The controller shares a single [`PulseBuffer`] with the DMA engine. Nothing
//! is double-buffered: while a frame is streaming the CPU must keep its hands
//! off the buffer, and the [`TransmitFlag`] is how it knows when that is over.
//!
//! # States
//! - **Idle**: flag reads complete, nothing streaming
//! - **Preparing**: inside [`PixelDriver::update`], data line released, reset
//!   timer running, encoder writing the buffer
//! - **Armed**: flag reads in flight, DMA engine streaming the buffer
//!
//! The completion interrupt moves the driver from `Armed` back to `Idle` by
//! calling [`TransmitFlag::complete`].
//!
//! # Wiring the completion interrupt
//! ```rust,ignore
//! static FLAG: TransmitFlag = TransmitFlag::new();
//!
//! #[interrupt]
//! fn DMA1() {
//!     FLAG.complete(&mut DmaCompletion);
//! }
//! ```

use core::hint::spin_loop;
use core::sync::atomic::{compiler_fence, AtomicBool, Ordering};

use embedded_dma::ReadBuffer;

use crate::transport::{CompletionPort, MicrosTimer, Transport};
use crate::{Color, Error, PulseBuffer, Result, RESET_INTERVAL_US};

/// Where a driver is in its transmit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitState {
    /// No transfer in flight.
    Idle,
    /// Encoding a frame while the data line is held low.
    ///
    /// Only passed through inside [`PixelDriver::update`] and
    /// [`PixelDriver::try_update`], so [`PixelDriver::state`] never returns
    /// it. It shows up in the `defmt` transition traces.
    Preparing,
    /// The DMA engine owns the buffer.
    Armed,
}

/// Transmission-complete flag shared between the foreground and the DMA
/// completion interrupt.
///
/// Lives in a `static` (or anywhere that outlives the driver) so the interrupt
/// handler can reach it without going through the driver.
#[derive(Debug)]
pub struct TransmitFlag {
    complete: AtomicBool,
}

impl Default for TransmitFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl TransmitFlag {
    /// A flag in the complete state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            complete: AtomicBool::new(true),
        }
    }

    /// `true` once the last armed transfer has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    pub(crate) fn mark_complete(&self) {
        self.complete.store(true, Ordering::Release);
    }

    pub(crate) fn mark_in_flight(&self) {
        self.complete.store(false, Ordering::Release);
    }

    /// Completion handler. Call from the DMA completion interrupt.
    ///
    /// Clears the hardware done indicator, marks the transfer complete and
    /// releases the data line, which starts the reset gap for the next frame.
    /// Does not block or allocate.
    pub fn complete<C: CompletionPort + ?Sized>(&self, port: &mut C) {
        port.acknowledge();
        self.mark_complete();
        port.release_line();
    }
}

/// Drives one strip of `PIXELS` pixels.
///
/// Takes the pulse buffer as `&'static mut`, so the buffer cannot move, and
/// no other code can write it while the DMA engine reads it, even if the
/// driver is leaked with [`core::mem::forget`]. Dropping the driver waits for
/// any transfer in flight to finish.
///
/// # Type Parameters
/// - `T`: SPI + DMA transport
/// - `M`: microsecond timer for the reset gap
/// - `PIXELS`: Number of pixels on the strip
/// - `LEN`: Pulse buffer length, `compute_buffer_len(PIXELS)`
pub struct PixelDriver<'a, T, M, const PIXELS: usize, const LEN: usize>
where
    T: Transport,
    M: MicrosTimer,
{
    buffer: &'static mut PulseBuffer<PIXELS, LEN>,
    flag: &'a TransmitFlag,
    transport: T,
    timer: M,
}

impl<'a, T, M, const PIXELS: usize, const LEN: usize> PixelDriver<'a, T, M, PIXELS, LEN>
where
    T: Transport,
    M: MicrosTimer,
{
    /// Take over an initialized transport and timer.
    ///
    /// Releases the data line and leaves `flag` in the complete state, so the
    /// first [`update`](PixelDriver::update) goes straight through.
    ///
    /// The buffer has to live for the rest of the program, usually in a
    /// `static`. A buffer on the stack is rejected:
    ///
    /// ```compile_fail
    /// use neopixel_spi_dma::transport::{MicrosTimer, Transport};
    /// use neopixel_spi_dma::{PixelDriver, PulseBuffer, TransmitFlag};
    ///
    /// struct Spi;
    /// impl Transport for Spi {
    ///     fn load(&mut self, _source: *const u8, _len: usize) {}
    ///     fn drive_line(&mut self) {}
    ///     fn release_line(&mut self) {}
    ///     fn start(&mut self) {}
    /// }
    /// struct Ticks;
    /// impl MicrosTimer for Ticks {
    ///     fn restart(&mut self) {}
    ///     fn elapsed_us(&mut self) -> u32 {
    ///         u32::MAX
    ///     }
    /// }
    ///
    /// let flag = TransmitFlag::new();
    /// let mut buffer = PulseBuffer::<1, 24>::new();
    /// let driver = PixelDriver::new(&mut buffer, &flag, Spi, Ticks);
    /// ```
    ///
    /// Only the completion handler can mark a transfer finished:
    ///
    /// ```compile_fail
    /// let flag = neopixel_spi_dma::TransmitFlag::new();
    /// flag.mark_complete();
    /// ```
    pub fn new(
        buffer: &'static mut PulseBuffer<PIXELS, LEN>,
        flag: &'a TransmitFlag,
        mut transport: T,
        timer: M,
    ) -> Self {
        transport.release_line();
        flag.mark_complete();
        Self {
            buffer,
            flag,
            transport,
            timer,
        }
    }

    /// Number of pixels on the strip.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        PIXELS
    }

    /// `true` if no transfer is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.flag.is_complete()
    }

    /// Current state as seen from outside [`update`](PixelDriver::update).
    #[must_use]
    pub fn state(&self) -> TransmitState {
        if self.is_idle() {
            TransmitState::Idle
        } else {
            TransmitState::Armed
        }
    }

    /// The pulse buffer as last encoded.
    #[must_use]
    pub fn pulse_buffer(&self) -> &PulseBuffer<PIXELS, LEN> {
        self.buffer
    }

    /// Spin until the transfer in flight, if any, has finished.
    ///
    /// Never returns if the completion interrupt never fires.
    pub fn wait_idle(&self) {
        while !self.flag.is_complete() {
            spin_loop();
        }
    }

    /// Send a frame.
    ///
    /// Waits for the previous frame to drain, encodes `colors` while the data
    /// line is held low for at least [`RESET_INTERVAL_US`], then arms the DMA
    /// engine and returns without waiting for the transfer.
    ///
    /// The whole pulse buffer is streamed every time. Pixels past the end of
    /// `colors` repeat whatever was encoded there last.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty slice and
    /// [`Error::CapacityExceeded`] for more colors than the strip has. Both
    /// are reported before waiting and without touching the buffer or the
    /// hardware.
    pub fn update(&mut self, colors: &[Color]) -> Result<()> {
        Self::check(colors)?;
        self.wait_idle();
        self.transmit(colors)
    }

    /// Send a frame if the previous one has drained.
    ///
    /// Like [`update`](PixelDriver::update) but never blocks on the previous
    /// transfer, for callers that impose their own deadline.
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] if a transfer is still in flight, otherwise as
    /// [`update`](PixelDriver::update).
    pub fn try_update(&mut self, colors: &[Color]) -> Result<()> {
        Self::check(colors)?;
        if !self.is_idle() {
            return Err(Error::Busy);
        }
        self.transmit(colors)
    }

    fn check(colors: &[Color]) -> Result<()> {
        PulseBuffer::<PIXELS, LEN>::check_pixel_count(colors.len()).inspect_err(|_err| {
            #[cfg(feature = "defmt")]
            defmt::debug!("rejected update of {} pixels: {}", colors.len(), _err);
        })
    }

    fn transmit(&mut self, colors: &[Color]) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::trace!("{} -> {}", TransmitState::Idle, TransmitState::Preparing);

        self.timer.restart();
        self.transport.release_line();

        self.buffer.encode(colors)?;

        while self.timer.elapsed_us() < RESET_INTERVAL_US {
            spin_loop();
        }

        self.flag.mark_in_flight();
        // SAFETY: the buffer stays mutably borrowed by this driver, and it is
        // only written again after the completion handler marks the flag.
        let (source, len) = unsafe { self.buffer.read_buffer() };
        self.transport.load(source, len);
        self.transport.drive_line();
        // encoded bytes must be in memory before the DMA engine starts
        compiler_fence(Ordering::SeqCst);
        self.transport.start();

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "{} -> {}: {} bytes",
            TransmitState::Preparing,
            TransmitState::Armed,
            len
        );
        Ok(())
    }
}

impl<T, M, const PIXELS: usize, const LEN: usize> Drop for PixelDriver<'_, T, M, PIXELS, LEN>
where
    T: Transport,
    M: MicrosTimer,
{
    fn drop(&mut self) {
        self.wait_idle();
    }
}

impl<T, M, const PIXELS: usize, const LEN: usize> core::fmt::Debug
    for PixelDriver<'_, T, M, PIXELS, LEN>
where
    T: Transport,
    M: MicrosTimer,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelDriver")
            .field("pixels", &PIXELS)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<T, M, const PIXELS: usize, const LEN: usize> defmt::Format
    for PixelDriver<'_, T, M, PIXELS, LEN>
where
    T: Transport,
    M: MicrosTimer,
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PixelDriver<{}, {}>", PIXELS, LEN);
        defmt::write!(f, " state: {}", self.state());
    }
}
