//! Hardware capabilities the transmit controller depends on.
//!
//! The register-level bring-up (clock gating, pin mux, SPI master at
//! [`SPI_CLOCK_HZ`](crate::pulse::SPI_CLOCK_HZ), DMA channel pointed at the SPI
//! data register and triggered by its transmit request, completion interrupt
//! registration) belongs to the board support code. That code hands the
//! driver objects implementing these traits once everything is configured.
//!
//! A typical split on a microcontroller with a DMA channel feeding SPI:
//!
//! | Method                          | Register work                                   |
//! |---------------------------------|-------------------------------------------------|
//! | [`Transport::release_line`]     | route the MOSI pin away from SPI so it idles low |
//! | [`Transport::load`]             | write source address and byte count             |
//! | [`Transport::drive_line`]       | route the MOSI pin back to the SPI peripheral   |
//! | [`Transport::start`]            | enable peripheral requests on the DMA channel   |
//! | [`CompletionPort::acknowledge`] | clear the channel's done flag                   |

/// Foreground access to the SPI + DMA engine.
///
/// Methods are called in the order `release_line`, `load`, `drive_line`,
/// `start` for every frame, and never while a transfer is in flight.
pub trait Transport {
    /// Program the DMA source address and transfer length in bytes.
    ///
    /// `source` stays valid and unmodified until the completion handler has
    /// run for this transfer.
    fn load(&mut self, source: *const u8, len: usize);

    /// Connect the data line to the serial output.
    fn drive_line(&mut self);

    /// Disconnect the data line so it is held low.
    fn release_line(&mut self);

    /// Let the DMA engine start moving bytes on the peripheral's requests.
    fn start(&mut self);
}

/// Interrupt-side access used by the completion handler.
///
/// Implementations run in interrupt context and must not block or allocate.
pub trait CompletionPort {
    /// Clear the hardware's transfer-done indicator.
    fn acknowledge(&mut self);

    /// Disconnect the data line so it is held low.
    fn release_line(&mut self);
}

/// Free-running microsecond counter used to time the reset gap.
pub trait MicrosTimer {
    /// Start counting from zero.
    fn restart(&mut self);

    /// Microseconds since the last [`restart`](MicrosTimer::restart).
    fn elapsed_us(&mut self) -> u32;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn load(&mut self, source: *const u8, len: usize) {
        T::load(self, source, len);
    }

    fn drive_line(&mut self) {
        T::drive_line(self);
    }

    fn release_line(&mut self) {
        T::release_line(self);
    }

    fn start(&mut self) {
        T::start(self);
    }
}

impl<C: CompletionPort + ?Sized> CompletionPort for &mut C {
    fn acknowledge(&mut self) {
        C::acknowledge(self);
    }

    fn release_line(&mut self) {
        C::release_line(self);
    }
}

impl<M: MicrosTimer + ?Sized> MicrosTimer for &mut M {
    fn restart(&mut self) {
        M::restart(self);
    }

    fn elapsed_us(&mut self) -> u32 {
        M::elapsed_us(self)
    }
}
