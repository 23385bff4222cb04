//! Structured network error shared by the driver contract and the runtime ABI.
//!
//! Every layer forwards `NetError` values unchanged; conversion to a POSIX
//! errno happens only at the runtime boundary via [`NetError::to_errno`].

use core::fmt;

/// Network error type.
///
/// Drivers, the adapter, and the runtime-facing interface all speak this one
/// type.  The adapter never remaps, wraps, or retries — whatever the driver
/// produced is what the runtime observes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetError {
    /// Descriptor is closed or was never allocated (EBADF).
    BadDescriptor,
    /// Operation would block (EAGAIN / EWOULDBLOCK).
    WouldBlock,
    /// Bounded wait expired before the operation completed (ETIMEDOUT).
    TimedOut,
    /// Address family not supported by this device (EAFNOSUPPORT).
    AddressFamilyNotSupported,
    /// Socket type / protocol combination not supported (EPROTONOSUPPORT).
    ProtocolNotSupported,
    /// Invalid argument (EINVAL).
    InvalidArgument,
    /// Address already in use (EADDRINUSE).
    AddressInUse,
    /// Socket is not connected (ENOTCONN).
    NotConnected,
    /// Socket is already connected (EISCONN).
    AlreadyConnected,
    /// Connection refused by remote host (ECONNREFUSED).
    ConnectionRefused,
    /// Connection reset by remote host (ECONNRESET).
    ConnectionReset,
    /// No buffer space available (ENOBUFS).
    NoBufferSpace,
    /// Datagram exceeds the device's maximum payload (EMSGSIZE).
    MessageTooLong,
    /// Hostname resolution failed (EHOSTUNREACH).
    LookupFailed,
    /// Link is down or addressing has not completed yet (ENETDOWN).
    LinkDown,
    /// Operation not implemented by this device (EOPNOTSUPP).
    Unsupported,
}

impl NetError {
    /// Convert to a POSIX errno value (negative) for the runtime boundary.
    pub const fn to_errno(&self) -> i32 {
        match self {
            Self::BadDescriptor => -9,              // EBADF
            Self::WouldBlock => -11,                // EAGAIN
            Self::TimedOut => -110,                 // ETIMEDOUT
            Self::AddressFamilyNotSupported => -97, // EAFNOSUPPORT
            Self::ProtocolNotSupported => -93,      // EPROTONOSUPPORT
            Self::InvalidArgument => -22,           // EINVAL
            Self::AddressInUse => -98,              // EADDRINUSE
            Self::NotConnected => -107,             // ENOTCONN
            Self::AlreadyConnected => -106,         // EISCONN
            Self::ConnectionRefused => -111,        // ECONNREFUSED
            Self::ConnectionReset => -104,          // ECONNRESET
            Self::NoBufferSpace => -105,            // ENOBUFS
            Self::MessageTooLong => -90,            // EMSGSIZE
            Self::LookupFailed => -113,             // EHOSTUNREACH (no dedicated resolver errno)
            Self::LinkDown => -100,                 // ENETDOWN
            Self::Unsupported => -95,               // EOPNOTSUPP
        }
    }
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadDescriptor => write!(f, "bad socket descriptor"),
            Self::WouldBlock => write!(f, "operation would block"),
            Self::TimedOut => write!(f, "operation timed out"),
            Self::AddressFamilyNotSupported => write!(f, "address family not supported"),
            Self::ProtocolNotSupported => write!(f, "protocol not supported"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::AddressInUse => write!(f, "address already in use"),
            Self::NotConnected => write!(f, "socket not connected"),
            Self::AlreadyConnected => write!(f, "socket already connected"),
            Self::ConnectionRefused => write!(f, "connection refused"),
            Self::ConnectionReset => write!(f, "connection reset by peer"),
            Self::NoBufferSpace => write!(f, "no buffer space available"),
            Self::MessageTooLong => write!(f, "message too long"),
            Self::LookupFailed => write!(f, "hostname lookup failed"),
            Self::LinkDown => write!(f, "network link is down"),
            Self::Unsupported => write!(f, "operation not supported"),
        }
    }
}
