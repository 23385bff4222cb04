//! Primitive-typed network device interface consumed by the host runtime.
//!
//! The runtime's networking layer is written against plain integers and
//! fixed-size byte arrays; it never sees the typed driver contract.  The
//! drivers crate provides the adapter that implements this trait on top of
//! a typed device driver.

use core::any::Any;
use core::time::Duration;

use crate::error::NetError;
use crate::net::SockAddrIn;

/// Descriptor returned by [`RawNetdev::accept`] in place of a real one.
///
/// The driver's accept creates a new connected socket, but this interface
/// has no way to hand its descriptor back, so the adapter reports the
/// driver's success or failure with this placeholder standing in for it.
pub const ACCEPT_FD_PLACEHOLDER: usize = 0;

/// Raw device interface: the exact method set the runtime's net layer calls.
///
/// Three deliberate gaps relative to the typed driver contract:
///
/// - No `send_to`/`recv_from`.  The runtime does datagram traffic through
///   `connect` followed by `send`/`recv`.
/// - `accept` returns [`ACCEPT_FD_PLACEHOLDER`] (see above) and ignores its
///   `peer` argument.
/// - `sock_type` is a single byte, so type modifier bits such as
///   `SOCK_NONBLOCK` cannot cross this boundary.
///
/// Implementations must be callable from any task concurrently; all locking
/// lives behind `&self`.
pub trait RawNetdev: Send + Sync {
    /// Bring the device's network link up (associate, DHCP, and so on).
    fn net_connect(&self) -> Result<(), NetError>;

    /// Drop the link.  Fire-and-forget: no result, never blocks the caller.
    fn net_disconnect(&self);

    /// Resolve `name` to an IPv4 address in network byte order.
    fn get_host_by_name(&self, name: &str) -> Result<[u8; 4], NetError>;

    /// The device's MAC address.
    fn get_hardware_addr(&self) -> Result<[u8; 6], NetError>;

    /// The device's IPv4 address in network byte order.
    ///
    /// Fails with [`NetError::LinkDown`] until addressing has completed.
    fn get_ip_addr(&self) -> Result<[u8; 4], NetError>;

    /// Allocate a socket.  `family` and `protocol` are POSIX codes
    /// (`AF_*`, `IPPROTO_*`); `sock_type` is the narrowed one-byte
    /// `SOCK_STREAM`/`SOCK_DGRAM` code.
    fn socket(&self, family: i32, sock_type: u8, protocol: i32) -> Result<usize, NetError>;

    /// Bind `sockfd` to a local address.
    fn bind(&self, sockfd: usize, addr: SockAddrIn) -> Result<(), NetError>;

    /// Connect `sockfd` to a remote address.
    fn connect(&self, sockfd: usize, addr: SockAddrIn) -> Result<(), NetError>;

    /// Mark `sockfd` passive with the given backlog bound.
    fn listen(&self, sockfd: usize, backlog: i32) -> Result<(), NetError>;

    /// Wait up to `timeout` for an inbound connection.
    ///
    /// `peer` is accepted for signature compatibility and ignored.  On
    /// success the returned descriptor is always [`ACCEPT_FD_PLACEHOLDER`].
    fn accept(&self, sockfd: usize, peer: SockAddrIn, timeout: Duration)
    -> Result<usize, NetError>;

    /// Send bytes, waiting up to `timeout` for buffer space.
    fn send(&self, sockfd: usize, buf: &[u8], flags: u16, timeout: Duration)
    -> Result<usize, NetError>;

    /// Receive bytes, waiting up to `timeout` for data.
    fn recv(&self, sockfd: usize, buf: &mut [u8], flags: u16, timeout: Duration)
    -> Result<usize, NetError>;

    /// Release `sockfd`.  Further use of the descriptor must fail with
    /// [`NetError::BadDescriptor`].
    fn close(&self, sockfd: usize) -> Result<(), NetError>;

    /// Set a socket option.  The value is opaque to the boundary; the driver
    /// downcasts to the concrete type it expects for `opt`.
    fn set_sock_opt(
        &self,
        sockfd: usize,
        level: i32,
        opt: i32,
        value: &dyn Any,
    ) -> Result<(), NetError>;
}
