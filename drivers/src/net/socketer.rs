//! Typed Berkeley-sockets contract implemented by network device drivers.

use core::any::Any;
use core::time::Duration;

use super::types::{
    AddressFamily, NetError, Protocol, SockAddr, SockFlags, SockOpt, SockOptLevel, SockType, Sockfd,
};

/// The socket surface a network device driver exposes.
///
/// Every operation is keyed by a [`Sockfd`] issued by [`socket`]; the driver
/// exclusively owns the descriptor table and all per-socket state behind it.
/// Operations on a descriptor the driver did not issue (or has since closed)
/// fail with [`NetError::BadDescriptor`].
///
/// # Timeouts
///
/// Blocking operations take an explicit `timeout` rather than consulting
/// hidden per-socket state.  A zero timeout means *do not wait*: complete
/// immediately if possible, otherwise fail with [`NetError::TimedOut`].
/// There is no unbounded-wait sentinel; callers that want one pass
/// [`Duration::MAX`].
///
/// # Concurrency
///
/// Methods take `&self` and implementations must be safe to call from
/// multiple contexts concurrently.  Drivers serialize internally.
///
/// [`socket`]: Socketer::socket
pub trait Socketer: Send + Sync {
    /// Create an endpoint for communication and return its descriptor.
    ///
    /// `sock_type` may carry modifier bits such as [`SockType::NONBLOCK`]
    /// alongside the base type.
    ///
    /// # Errors
    ///
    /// [`NetError::AddressFamilyNotSupported`] or
    /// [`NetError::ProtocolNotSupported`] if the driver cannot provide the
    /// requested combination; [`NetError::NoBufferSpace`] if its socket
    /// table is full.
    fn socket(
        &self,
        family: AddressFamily,
        sock_type: SockType,
        protocol: Protocol,
    ) -> Result<Sockfd, NetError>;

    /// Assign a local address to the socket.
    ///
    /// An unspecified address binds all interfaces; a zero port asks the
    /// driver to pick an ephemeral one.
    ///
    /// # Errors
    ///
    /// [`NetError::AddressInUse`] if the port is already bound.
    fn bind(&self, sockfd: Sockfd, addr: SockAddr) -> Result<(), NetError>;

    /// Connect the socket to a remote peer.
    ///
    /// When `host` is `Some`, the driver resolves the name itself and `addr`
    /// supplies only the port.  When `host` is `None`, `addr` is the
    /// complete destination.
    ///
    /// # Errors
    ///
    /// [`NetError::LookupFailed`] if `host` cannot be resolved;
    /// [`NetError::ConnectionRefused`] if the peer rejects;
    /// [`NetError::AlreadyConnected`] if the socket is connected.
    fn connect(&self, sockfd: Sockfd, host: Option<&str>, addr: SockAddr) -> Result<(), NetError>;

    /// Mark a bound stream socket as accepting connections.
    ///
    /// `backlog` is a hint for the pending-connection queue depth; drivers
    /// may clamp it.
    fn listen(&self, sockfd: Sockfd, backlog: i32) -> Result<(), NetError>;

    /// Wait up to `timeout` for an incoming connection on a listening
    /// socket.
    ///
    /// On success returns the descriptor of the newly created connected
    /// socket together with the peer's address.
    ///
    /// # Errors
    ///
    /// [`NetError::InvalidArgument`] if the socket is not listening;
    /// [`NetError::TimedOut`] if no connection arrived in time.
    fn accept(&self, sockfd: Sockfd, timeout: Duration) -> Result<(Sockfd, SockAddr), NetError>;

    /// Transmit on a connected socket, waiting up to `timeout` for buffer
    /// space.  Returns the number of bytes queued, which may be short.
    ///
    /// # Errors
    ///
    /// [`NetError::NotConnected`] if the socket has no peer;
    /// [`NetError::MessageTooLong`] if the payload cannot fit a datagram.
    fn send(
        &self,
        sockfd: Sockfd,
        buf: &[u8],
        flags: SockFlags,
        timeout: Duration,
    ) -> Result<usize, NetError>;

    /// Transmit to an explicit destination, connected or not.
    ///
    /// The same as [`send`] otherwise.
    ///
    /// [`send`]: Socketer::send
    fn send_to(
        &self,
        sockfd: Sockfd,
        buf: &[u8],
        flags: SockFlags,
        timeout: Duration,
        to: SockAddr,
    ) -> Result<usize, NetError>;

    /// Receive into `buf`, waiting up to `timeout` for data.  Returns the
    /// number of bytes written; `Ok(0)` is a genuine zero-length datagram,
    /// not a timeout.
    ///
    /// [`SockFlags::PEEK`] leaves the data queued;
    /// [`SockFlags::DONTWAIT`] forces non-blocking regardless of `timeout`.
    ///
    /// # Errors
    ///
    /// [`NetError::TimedOut`] if nothing arrived in time.
    fn recv(
        &self,
        sockfd: Sockfd,
        buf: &mut [u8],
        flags: SockFlags,
        timeout: Duration,
    ) -> Result<usize, NetError>;

    /// Receive and report the sender: the same as [`recv`] with the source
    /// address of the delivered datagram alongside the byte count.
    ///
    /// [`recv`]: Socketer::recv
    fn recv_from(
        &self,
        sockfd: Sockfd,
        buf: &mut [u8],
        flags: SockFlags,
        timeout: Duration,
    ) -> Result<(usize, SockAddr), NetError>;

    /// Release the descriptor and all socket state behind it.  The
    /// descriptor is invalid afterwards and may be reissued.
    fn close(&self, sockfd: Sockfd) -> Result<(), NetError>;

    /// Set a socket option.
    ///
    /// `value` is deliberately open-typed: each option documents the
    /// concrete type it expects (timeouts take [`Duration`], switches take
    /// `bool` or `i32`) and the driver downcasts.
    ///
    /// # Errors
    ///
    /// [`NetError::InvalidArgument`] if the option is unknown to the driver
    /// or `value` has the wrong type.
    fn set_sock_opt(
        &self,
        sockfd: Sockfd,
        level: SockOptLevel,
        opt: SockOpt,
        value: &dyn Any,
    ) -> Result<(), NetError>;
}
