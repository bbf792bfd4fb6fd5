use derive_more::{Display, Error};

/// Errors reported synchronously by the encoder and the transmit controller.
///
/// Nothing here is raised from the completion interrupt; hardware faults after
/// a transfer is armed are not visible at this layer.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No colors were given.
    #[display("no colors given")]
    InvalidArgument,
    /// More colors were given than the pulse buffer can hold.
    #[display("{requested} pixels requested but the buffer holds {capacity}")]
    CapacityExceeded {
        /// Number of colors passed in.
        requested: usize,
        /// Number of pixels the pulse buffer was sized for.
        capacity: usize,
    },
    /// A transfer is still in flight. Only returned by the non-blocking entry
    /// points.
    #[display("previous transfer still in flight")]
    Busy,
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::InvalidArgument => defmt::write!(f, "InvalidArgument"),
            Self::CapacityExceeded {
                requested,
                capacity,
            } => defmt::write!(
                f,
                "CapacityExceeded {{ requested: {}, capacity: {} }}",
                requested,
                capacity
            ),
            Self::Busy => defmt::write!(f, "Busy"),
        }
    }
}
