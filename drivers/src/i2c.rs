//! Addressed synchronous bus contract.

use core::fmt;

/// Error from an addressed bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cError {
    /// The physical transport failed mid-transaction.
    Io,
    /// The target did not acknowledge its address or a data byte.
    Nack,
    /// Both buffers were supplied with different lengths.
    LengthMismatch,
}

impl fmt::Display for I2cError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "i2c I/O error"),
            Self::Nack => write!(f, "i2c target did not acknowledge"),
            Self::LengthMismatch => write!(f, "i2c buffer length mismatch"),
        }
    }
}

/// Addressed synchronous bus.
pub trait I2c {
    /// One transaction against the target at `addr`: write all of `w` (if
    /// supplied), then read into `r` (if supplied).  When both buffers are
    /// supplied they must be the same length; either may be omitted for a
    /// write-only or read-only transaction.
    fn tx(&mut self, addr: u16, w: Option<&[u8]>, r: Option<&mut [u8]>) -> Result<(), I2cError>;
}
