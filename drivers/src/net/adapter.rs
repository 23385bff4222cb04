//! Bridge between the typed driver contract and the raw runtime interface.
//!
//! [`NetdevAdapter`] wraps one [`NetDevice`] and implements
//! [`keel_abi::RawNetdev`] on top of it.  The adapter is a pure shim: it
//! converts representations at the boundary and forwards.  It holds no
//! locks, never blocks on its own, and never remaps errors — a
//! [`NetError`] produced by the driver reaches the runtime unchanged.
//!
//! The conversion helpers are free functions so they can be exercised
//! without a device behind them.

extern crate alloc;

use alloc::boxed::Box;
use core::any::Any;
use core::time::Duration;

use keel_abi::net::SockAddrIn;
use keel_abi::netdev::{ACCEPT_FD_PLACEHOLDER, RawNetdev};

use super::netdev::NetDevice;
use super::types::{
    AddressFamily, Ipv4Addr, NetError, Port, Protocol, SockAddr, SockFlags, SockOpt, SockOptLevel,
    SockType, Sockfd,
};

// =============================================================================
// Boundary conversions
// =============================================================================

/// Widen the raw one-byte socket type to the typed form.
///
/// The raw field cannot carry modifier bits (`SOCK_NONBLOCK` is above the
/// byte range), so the result is always a bare base type.
#[inline]
pub const fn socktype_from_raw(raw: u8) -> SockType {
    SockType(raw as i32)
}

/// Narrow a raw descriptor to the typed form.
///
/// Descriptors are driver-issued and non-negative, so values the driver
/// handed out round-trip exactly.
#[inline]
pub const fn fd_from_raw(raw: usize) -> Sockfd {
    Sockfd(raw as i32)
}

/// Widen a typed descriptor for the raw interface.
#[inline]
pub const fn fd_to_raw(fd: Sockfd) -> usize {
    fd.0 as usize
}

/// Convert the runtime's `sockaddr_in`-style address to the compact 6-byte
/// driver form.  Port and address bytes carry over exactly.
#[inline]
pub const fn sockaddr_from_raw(raw: &SockAddrIn) -> SockAddr {
    SockAddr::new(
        Ipv4Addr::from_bytes(raw.addr),
        Port::new(u16::from_be(raw.port)),
    )
}

/// Convert a driver address back to the runtime's layout.  Inverse of
/// [`sockaddr_from_raw`] for every address.
#[inline]
pub const fn sockaddr_to_raw(addr: &SockAddr) -> SockAddrIn {
    SockAddrIn::new(addr.port().as_u16(), addr.ip().octets())
}

/// Interpret raw send/receive flag bits.
///
/// Uses retain semantics: bits this layer has no name for stay set and
/// reach the driver.
#[inline]
pub const fn flags_from_raw(raw: u16) -> SockFlags {
    SockFlags::from_bits_retain(raw)
}

// =============================================================================
// Adapter
// =============================================================================

/// Implements the runtime-facing [`RawNetdev`] interface over a typed
/// [`NetDevice`] driver.
pub struct NetdevAdapter {
    dev: Box<dyn NetDevice>,
}

impl NetdevAdapter {
    /// Wrap a driver.  The adapter owns it for the rest of its life.
    pub fn new(dev: Box<dyn NetDevice>) -> Self {
        Self { dev }
    }
}

impl RawNetdev for NetdevAdapter {
    fn net_connect(&self) -> Result<(), NetError> {
        self.dev.net_connect()
    }

    fn net_disconnect(&self) {
        self.dev.net_disconnect();
    }

    fn get_host_by_name(&self, name: &str) -> Result<[u8; 4], NetError> {
        self.dev.get_host_by_name(name).map(|ip| ip.octets())
    }

    fn get_hardware_addr(&self) -> Result<[u8; 6], NetError> {
        self.dev.get_hardware_addr().map(|mac| mac.octets())
    }

    fn get_ip_addr(&self) -> Result<[u8; 4], NetError> {
        self.dev.get_ip_addr().map(|ip| ip.octets())
    }

    fn socket(&self, family: i32, sock_type: u8, protocol: i32) -> Result<usize, NetError> {
        self.dev
            .socket(
                AddressFamily(family),
                socktype_from_raw(sock_type),
                Protocol(protocol),
            )
            .map(fd_to_raw)
    }

    fn bind(&self, sockfd: usize, addr: SockAddrIn) -> Result<(), NetError> {
        self.dev.bind(fd_from_raw(sockfd), sockaddr_from_raw(&addr))
    }

    fn connect(&self, sockfd: usize, addr: SockAddrIn) -> Result<(), NetError> {
        // The raw interface carries no host name; resolution happened on the
        // runtime side already.
        self.dev
            .connect(fd_from_raw(sockfd), None, sockaddr_from_raw(&addr))
    }

    fn listen(&self, sockfd: usize, backlog: i32) -> Result<(), NetError> {
        self.dev.listen(fd_from_raw(sockfd), backlog)
    }

    fn accept(
        &self,
        sockfd: usize,
        _peer: SockAddrIn,
        timeout: Duration,
    ) -> Result<usize, NetError> {
        // The driver produces a real connected descriptor and the peer
        // address, but this interface cannot return either: success maps to
        // the placeholder descriptor, failure passes through.
        self.dev
            .accept(fd_from_raw(sockfd), timeout)
            .map(|_| ACCEPT_FD_PLACEHOLDER)
    }

    fn send(
        &self,
        sockfd: usize,
        buf: &[u8],
        flags: u16,
        timeout: Duration,
    ) -> Result<usize, NetError> {
        self.dev
            .send(fd_from_raw(sockfd), buf, flags_from_raw(flags), timeout)
    }

    fn recv(
        &self,
        sockfd: usize,
        buf: &mut [u8],
        flags: u16,
        timeout: Duration,
    ) -> Result<usize, NetError> {
        self.dev
            .recv(fd_from_raw(sockfd), buf, flags_from_raw(flags), timeout)
    }

    fn close(&self, sockfd: usize) -> Result<(), NetError> {
        self.dev.close(fd_from_raw(sockfd))
    }

    fn set_sock_opt(
        &self,
        sockfd: usize,
        level: i32,
        opt: i32,
        value: &dyn Any,
    ) -> Result<(), NetError> {
        self.dev.set_sock_opt(
            fd_from_raw(sockfd),
            SockOptLevel(level),
            SockOpt(opt),
            value,
        )
    }
}
