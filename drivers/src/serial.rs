use core::fmt;

/// Error from a serial transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    /// The physical transport failed mid-transfer.
    Io,
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "serial I/O error"),
        }
    }
}

/// Byte-stream serial port.
///
/// Implemented by machine UARTs.  Reads and writes move whatever the
/// hardware can take right now and report the count; [`buffered`] says how
/// many received bytes can be read without blocking.
///
/// [`buffered`]: Uart::buffered
pub trait Uart {
    /// Read up to `buf.len()` buffered bytes, returning the count
    /// (`0` when nothing is pending).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;

    /// Write up to `buf.len()` bytes, returning the count the transmitter
    /// accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize, SerialError>;

    /// Number of received bytes available to [`read`] without blocking.
    ///
    /// [`read`]: Uart::read
    fn buffered(&self) -> usize;
}
