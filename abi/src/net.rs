//! Raw socket ABI: the POSIX-style integer constants and address layout the
//! host runtime's networking layer passes across the driver boundary.
//!
//! Typed wrappers for these values live in the drivers crate; this module is
//! the single source of truth for the numeric codes themselves.

// =============================================================================
// Address families
// =============================================================================

/// Address family: IPv4 Internet protocols.
pub const AF_INET: i32 = 2;
/// Address family: IPv6 Internet protocols.
pub const AF_INET6: i32 = 10;

// =============================================================================
// Socket types
// =============================================================================

/// Socket type: byte-stream (TCP).
pub const SOCK_STREAM: i32 = 1;
/// Socket type: datagram (UDP).
pub const SOCK_DGRAM: i32 = 2;
/// Socket type modifier: non-blocking mode.
///
/// This bit does not fit in the one-byte socket-type field of the raw device
/// interface; it exists only on the typed side of the boundary.
pub const SOCK_NONBLOCK: i32 = 0o4000;

// =============================================================================
// Protocols
// =============================================================================

/// Protocol: selected by the socket type (the usual case).
pub const IPPROTO_IP: i32 = 0;
/// Protocol: TCP.
pub const IPPROTO_TCP: i32 = 6;
/// Protocol: UDP.
pub const IPPROTO_UDP: i32 = 17;

// =============================================================================
// Send/receive flags
// =============================================================================

/// Process out-of-band data.
pub const MSG_OOB: u16 = 0x0001;
/// Read queued data without consuming it.
pub const MSG_PEEK: u16 = 0x0002;
/// Datagram was truncated to fit the supplied buffer.
pub const MSG_TRUNC: u16 = 0x0020;
/// Return immediately instead of waiting, regardless of the timeout.
pub const MSG_DONTWAIT: u16 = 0x0040;
/// Wait until the full request is satisfied.
pub const MSG_WAITALL: u16 = 0x0100;
/// Fetch from the per-socket error queue.
pub const MSG_ERRQUEUE: u16 = 0x2000;

// =============================================================================
// Socket options
// =============================================================================

/// Option level: socket layer itself.
pub const SOL_SOCKET: i32 = 1;

/// Allow local address reuse (level `SOL_SOCKET`).
pub const SO_REUSEADDR: i32 = 2;
/// Enable keep-alive probes (level `SOL_SOCKET`).
pub const SO_KEEPALIVE: i32 = 9;
/// Linger on close if unsent data remains (level `SOL_SOCKET`).
pub const SO_LINGER: i32 = 13;
/// Receive timeout (level `SOL_SOCKET`).
pub const SO_RCVTIMEO: i32 = 20;
/// Send timeout (level `SOL_SOCKET`).
pub const SO_SNDTIMEO: i32 = 21;

/// Disable Nagle's algorithm (level `IPPROTO_TCP`).
pub const TCP_NODELAY: i32 = 1;
/// Interval between keep-alive probes (level `IPPROTO_TCP`).
pub const TCP_KEEPINTVL: i32 = 5;

// =============================================================================
// Socket address
// =============================================================================

/// IPv4 socket address — mirrors POSIX `sockaddr_in` layout.
///
/// This is the address form the host runtime passes across the raw device
/// boundary; the driver contract uses the compact 6-byte form instead, and
/// the adapter converts between the two losslessly.
#[repr(C)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct SockAddrIn {
    pub family: u16,
    /// Port in **network** byte order (big-endian).
    pub port: u16,
    /// IPv4 address in network byte order.
    pub addr: [u8; 4],
    pub _pad: [u8; 8],
}

impl SockAddrIn {
    /// Build an `AF_INET` address from a host-order port and network-order
    /// address bytes.
    #[inline]
    pub const fn new(port: u16, addr: [u8; 4]) -> Self {
        Self {
            family: AF_INET as u16,
            port: port.to_be(),
            addr,
            _pad: [0; 8],
        }
    }
}
