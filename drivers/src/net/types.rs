//! Type-safe socket primitives for the driver-facing network contract.
//!
//! This module provides the newtype wrappers driver authors program against:
//! they eliminate byte-order mixups, address/port confusion, and raw numeric
//! comparisons for protocol fields at compile time.  All wrappers are
//! zero-cost (`#[repr(transparent)]`) and usable in a `#![no_std]` driver.
//!
//! The family/type/protocol/option wrappers are deliberately **open**: they
//! carry the raw POSIX code and define associated constants for the values
//! this layer knows about.  Unknown codes flow through the runtime boundary
//! numerically; the driver is the single source of truth for which codes it
//! supports and rejects the rest itself.

use core::fmt;

use bitflags::bitflags;

use keel_abi::net;

pub use keel_abi::error::NetError;

// =============================================================================
// Address newtypes
// =============================================================================

/// IPv4 address stored in **network byte order** (`[u8; 4]`).
///
/// The inner representation is always big-endian, matching the wire format.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ipv4Addr(pub [u8; 4]);

impl Ipv4Addr {
    /// `0.0.0.0` — the unspecified address (bind to any interface).
    pub const UNSPECIFIED: Self = Self([0, 0, 0, 0]);
    /// `127.0.0.1` — the loopback address.
    pub const LOCALHOST: Self = Self([127, 0, 0, 1]);

    /// Convert from a raw `[u8; 4]` (already in network byte order).
    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Return the raw bytes in network byte order.
    #[inline]
    pub const fn octets(&self) -> [u8; 4] {
        self.0
    }

    /// `true` if the address is in the `127.0.0.0/8` loopback range.
    #[inline]
    pub const fn is_loopback(&self) -> bool {
        self.0[0] == 127
    }

    /// `true` if the address is `0.0.0.0`.
    #[inline]
    pub const fn is_unspecified(&self) -> bool {
        self.0[0] == 0 && self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0
    }

    /// Parse a dotted-decimal literal such as `"192.168.4.1"`.
    ///
    /// Strict form only: four decimal octets, each 0-255, no leading `+`,
    /// no hex or octal forms.  Returns `None` on anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let mut out = [0u8; 4];
        let mut idx = 0;
        for part in s.split('.') {
            if idx == 4 || part.is_empty() || part.len() > 3 {
                return None;
            }
            let mut val: u16 = 0;
            for c in part.bytes() {
                if !c.is_ascii_digit() {
                    return None;
                }
                val = val * 10 + (c - b'0') as u16;
            }
            if val > 255 {
                return None;
            }
            out[idx] = val as u8;
            idx += 1;
        }
        if idx != 4 {
            return None;
        }
        Some(Self(out))
    }
}

impl fmt::Debug for Ipv4Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl fmt::Display for Ipv4Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

/// Port number in **host byte order**.
///
/// Conversion to/from network (big-endian) byte order is explicit via
/// [`to_network_bytes`] / [`from_network_bytes`].  This prevents accidentally
/// passing a host-order value where network-order is expected.
///
/// [`to_network_bytes`]: Port::to_network_bytes
/// [`from_network_bytes`]: Port::from_network_bytes
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Port(pub u16);

impl Port {
    /// Construct a port from a host-order `u16`.
    #[inline]
    pub const fn new(val: u16) -> Self {
        Self(val)
    }

    /// Serialize to big-endian bytes for the wire.
    #[inline]
    pub const fn to_network_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Deserialize from big-endian wire bytes.
    #[inline]
    pub const fn from_network_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    /// `true` if the port is in the IANA ephemeral range (49152-65535).
    #[inline]
    pub const fn is_ephemeral(&self) -> bool {
        self.0 >= 49152
    }

    /// Return the raw host-order `u16` value.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port({})", self.0)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hardware MAC address (6 bytes).
///
/// Distinct type prevents confusion with other 6-byte arrays.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Return the raw bytes.
    #[inline]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

// =============================================================================
// SockAddr
// =============================================================================

/// Socket address: exactly a 2-byte port followed by a 4-byte IPv4 address,
/// both in **network byte order**.
///
/// This 6-byte layout is the driver contract's wire form.  The runtime-native
/// [`SockAddrIn`] layout differs; [`adapter`] converts between the two
/// losslessly in both directions.
///
/// [`SockAddrIn`]: keel_abi::net::SockAddrIn
/// [`adapter`]: crate::net::adapter
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SockAddr {
    port: [u8; 2],
    ip: [u8; 4],
}

impl SockAddr {
    /// Create a `SockAddr` from typed components.
    #[inline]
    pub const fn new(ip: Ipv4Addr, port: Port) -> Self {
        Self {
            port: port.to_network_bytes(),
            ip: ip.octets(),
        }
    }

    /// The address component.
    #[inline]
    pub const fn ip(&self) -> Ipv4Addr {
        Ipv4Addr(self.ip)
    }

    /// The port component, converted back to host order.
    #[inline]
    pub const fn port(&self) -> Port {
        Port::from_network_bytes(self.port)
    }

    /// Serialize to the 6-byte wire layout: big-endian port, then address.
    #[inline]
    pub const fn to_bytes(&self) -> [u8; 6] {
        [
            self.port[0],
            self.port[1],
            self.ip[0],
            self.ip[1],
            self.ip[2],
            self.ip[3],
        ]
    }

    /// Deserialize from the 6-byte wire layout.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self {
            port: [bytes[0], bytes[1]],
            ip: [bytes[2], bytes[3], bytes[4], bytes[5]],
        }
    }
}

impl fmt::Debug for SockAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip(), self.port())
    }
}

impl fmt::Display for SockAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip(), self.port())
    }
}

// =============================================================================
// Family / type / protocol codes
// =============================================================================

/// Address family code (`AF_*`).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressFamily(pub i32);

impl AddressFamily {
    /// IPv4 Internet protocols.
    pub const INET: Self = Self(net::AF_INET);
    /// IPv6 Internet protocols.
    pub const INET6: Self = Self(net::AF_INET6);
}

impl fmt::Debug for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INET => write!(f, "AF_INET"),
            Self::INET6 => write!(f, "AF_INET6"),
            Self(other) => write!(f, "AF({other})"),
        }
    }
}

/// Socket type code (`SOCK_*`), including optional modifier bits.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SockType(pub i32);

impl SockType {
    /// Sequenced, reliable, connection-based byte stream.
    pub const STREAM: Self = Self(net::SOCK_STREAM);
    /// Connectionless, unreliable datagrams of a fixed maximum length.
    pub const DGRAM: Self = Self(net::SOCK_DGRAM);
    /// Modifier bit: non-blocking mode.
    pub const NONBLOCK: Self = Self(net::SOCK_NONBLOCK);

    /// The type with modifier bits stripped.
    #[inline]
    pub const fn base(self) -> Self {
        Self(self.0 & !net::SOCK_NONBLOCK)
    }

    /// `true` if the non-blocking modifier bit is set.
    #[inline]
    pub const fn is_non_blocking(self) -> bool {
        self.0 & net::SOCK_NONBLOCK != 0
    }
}

impl fmt::Debug for SockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base() {
            Self::STREAM => write!(f, "SOCK_STREAM")?,
            Self::DGRAM => write!(f, "SOCK_DGRAM")?,
            Self(other) => write!(f, "SOCK({other})")?,
        }
        if self.is_non_blocking() {
            write!(f, "|SOCK_NONBLOCK")?;
        }
        Ok(())
    }
}

/// Protocol code (`IPPROTO_*`).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Protocol(pub i32);

impl Protocol {
    /// Protocol chosen by the socket type (the usual `0` argument).
    pub const IP: Self = Self(net::IPPROTO_IP);
    /// TCP.
    pub const TCP: Self = Self(net::IPPROTO_TCP);
    /// UDP.
    pub const UDP: Self = Self(net::IPPROTO_UDP);
}

impl fmt::Debug for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::IP => write!(f, "IPPROTO_IP"),
            Self::TCP => write!(f, "IPPROTO_TCP"),
            Self::UDP => write!(f, "IPPROTO_UDP"),
            Self(other) => write!(f, "IPPROTO({other})"),
        }
    }
}

// =============================================================================
// Flags and options
// =============================================================================

bitflags! {
    /// Per-call behavior modifiers for send/receive (`MSG_*`).
    ///
    /// Constructed from raw runtime values with [`from_bits_retain`], so
    /// flag bits this layer does not know about survive the crossing and
    /// reach the driver intact.
    ///
    /// [`from_bits_retain`]: SockFlags::from_bits_retain
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SockFlags: u16 {
        /// Process out-of-band data.
        const OOB = net::MSG_OOB;
        /// Return queued data without consuming it.
        const PEEK = net::MSG_PEEK;
        /// Report the real datagram length even when truncated.
        const TRUNC = net::MSG_TRUNC;
        /// Never wait, regardless of the timeout argument.
        const DONTWAIT = net::MSG_DONTWAIT;
        /// Wait until the full request is satisfied.
        const WAITALL = net::MSG_WAITALL;
        /// Fetch from the per-socket error queue.
        const ERRQUEUE = net::MSG_ERRQUEUE;
    }
}

impl fmt::Display for SockFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(none)");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "{name}")?;
            first = false;
        }
        Ok(())
    }
}

/// Socket option level (`SOL_SOCKET` or a protocol number).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SockOptLevel(pub i32);

impl SockOptLevel {
    /// The socket layer itself.
    pub const SOCKET: Self = Self(net::SOL_SOCKET);
    /// TCP protocol options.
    pub const TCP: Self = Self(net::IPPROTO_TCP);
}

impl fmt::Debug for SockOptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::SOCKET => write!(f, "SOL_SOCKET"),
            Self::TCP => write!(f, "SOL(IPPROTO_TCP)"),
            Self(other) => write!(f, "SOL({other})"),
        }
    }
}

/// Socket option name, interpreted relative to a [`SockOptLevel`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SockOpt(pub i32);

impl SockOpt {
    /// Allow local address reuse (level [`SockOptLevel::SOCKET`]).
    pub const REUSEADDR: Self = Self(net::SO_REUSEADDR);
    /// Enable keep-alive probes (level [`SockOptLevel::SOCKET`]).
    pub const KEEPALIVE: Self = Self(net::SO_KEEPALIVE);
    /// Linger on close if unsent data remains (level [`SockOptLevel::SOCKET`]).
    pub const LINGER: Self = Self(net::SO_LINGER);
    /// Receive timeout (level [`SockOptLevel::SOCKET`]).
    pub const RCVTIMEO: Self = Self(net::SO_RCVTIMEO);
    /// Send timeout (level [`SockOptLevel::SOCKET`]).
    pub const SNDTIMEO: Self = Self(net::SO_SNDTIMEO);
    /// Disable Nagle's algorithm (level [`SockOptLevel::TCP`]).
    pub const NODELAY: Self = Self(net::TCP_NODELAY);
    /// Keep-alive probe interval (level [`SockOptLevel::TCP`]).
    pub const KEEPINTVL: Self = Self(net::TCP_KEEPINTVL);
}

impl fmt::Debug for SockOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SockOpt({})", self.0)
    }
}

// =============================================================================
// Sockfd
// =============================================================================

/// Socket descriptor — an opaque handle scoped to one driver instance.
///
/// The driver exclusively owns the mapping from descriptor to socket state;
/// everything above it only ever holds the value.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sockfd(pub i32);

impl fmt::Debug for Sockfd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sockfd({})", self.0)
    }
}

impl fmt::Display for Sockfd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
