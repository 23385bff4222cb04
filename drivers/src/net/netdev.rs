//! Full network device contract: link lifecycle, identity, and sockets.

use super::socketer::Socketer;
use super::types::{Ipv4Addr, MacAddr, NetError};

/// A complete network device driver.
///
/// # Architecture
///
/// The contract layers three concerns onto one object:
///
/// * **Link lifecycle** — [`net_connect`] / [`net_disconnect`] bring the
///   device onto and off the network (associate, authenticate, acquire an
///   address — whatever the hardware needs).
/// * **Identity** — [`get_hardware_addr`] and [`get_ip_addr`] report who the
///   device is at L2 and L3; [`get_host_by_name`] resolves names using
///   whatever resolver the device has.
/// * **Sockets** — the full [`Socketer`] surface.
///
/// The runtime talks to a device through the primitive-typed mirror of this
/// contract ([`keel_abi::RawNetdev`]); [`adapter`] bridges the two.  Drivers
/// implement only this trait and never see raw codes.
///
/// # Concurrency
///
/// Same rules as [`Socketer`]: `&self` methods, internally serialized,
/// callable from multiple contexts.
///
/// [`net_connect`]: NetDevice::net_connect
/// [`net_disconnect`]: NetDevice::net_disconnect
/// [`get_hardware_addr`]: NetDevice::get_hardware_addr
/// [`get_ip_addr`]: NetDevice::get_ip_addr
/// [`get_host_by_name`]: NetDevice::get_host_by_name
/// [`adapter`]: crate::net::adapter
pub trait NetDevice: Socketer {
    /// Bring the device onto the IP network.
    ///
    /// Idempotent: connecting an already-connected device succeeds.
    ///
    /// # Errors
    ///
    /// [`NetError::LinkDown`] if the medium is unavailable.
    fn net_connect(&self) -> Result<(), NetError>;

    /// Take the device off the network.  Infallible.
    ///
    /// The fate of sockets left open across a disconnect is the driver's
    /// to decide; only [`get_ip_addr`] is required to start reporting
    /// [`NetError::LinkDown`].
    ///
    /// [`get_ip_addr`]: NetDevice::get_ip_addr
    fn net_disconnect(&self);

    /// Resolve a hostname, or an IPv4 address in standard dot notation,
    /// to an address.
    ///
    /// # Errors
    ///
    /// [`NetError::LookupFailed`] if the name does not resolve.
    fn get_host_by_name(&self, name: &str) -> Result<Ipv4Addr, NetError>;

    /// The device MAC address.
    fn get_hardware_addr(&self) -> Result<MacAddr, NetError>;

    /// The IP address currently assigned to the device, by DHCP or
    /// statically.
    ///
    /// # Errors
    ///
    /// [`NetError::LinkDown`] if the device has not joined a network.
    fn get_ip_addr(&self) -> Result<Ipv4Addr, NetError>;
}
