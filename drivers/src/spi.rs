//! Full-duplex synchronous bus contract.

use core::fmt;

/// Error from a bus transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiError {
    /// The physical transport failed mid-transfer.
    Io,
    /// Both buffers were supplied with different lengths.
    LengthMismatch,
}

impl fmt::Display for SpiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "spi I/O error"),
            Self::LengthMismatch => write!(f, "spi buffer length mismatch"),
        }
    }
}

/// Full-duplex synchronous bus.
pub trait Spi {
    /// Transmit `w` while simultaneously receiving into `r`.
    ///
    /// When both buffers are supplied they must be the same length.
    /// Omitting `r` transmits without waiting for response bytes; omitting
    /// `w` shifts out zero fill while capturing `r.len()` bytes.
    fn tx(&mut self, w: Option<&[u8]>, r: Option<&mut [u8]>) -> Result<(), SpiError>;

    /// Exchange a single byte.  For bulk traffic [`tx`] is the better call.
    ///
    /// [`tx`]: Spi::tx
    fn transfer(&mut self, byte: u8) -> Result<u8, SpiError>;
}
