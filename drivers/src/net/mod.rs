//! Network device contract.
//!
//! Everything a network driver and its consumers need, in four layers:
//!
//! - [`types`] — the socket domain model (addresses, ports, descriptors,
//!   family/type/protocol codes, flags, errors).
//! - [`socketer`] and [`netdev`] — the typed contract a driver implements:
//!   the Berkeley-sockets surface plus link lifecycle and identity.
//! - [`adapter`] — the shim that presents a typed driver to the runtime
//!   through the primitive-typed [`keel_abi::RawNetdev`] interface.
//! - [`loopback`] — the in-tree reference device.
//!
//! A platform brings networking up by building its device and passing it to
//! [`use_netdev`] once during init.

extern crate alloc;

use alloc::boxed::Box;

use keel_lib::klog_info;

pub mod adapter;
pub mod loopback;
pub mod netdev;
pub mod socketer;
pub mod types;


pub use adapter::NetdevAdapter;
pub use loopback::{LoopbackConfig, LoopbackDev, init_loopback};
pub use netdev::NetDevice;
pub use socketer::Socketer;
pub use types::{
    AddressFamily, Ipv4Addr, MacAddr, NetError, Port, Protocol, SockAddr, SockFlags, SockOpt,
    SockOptLevel, SockType, Sockfd,
};

/// Publish `dev` as the system network device.
///
/// Wraps the driver in [`NetdevAdapter`] and installs it in the runtime
/// service registry, where the host runtime's networking layer picks it up.
/// The installed adapter lives for the rest of the program.
///
/// The first device wins.  Returns `false` if one was already installed;
/// the rejected driver is dropped.
pub fn use_netdev(dev: Box<dyn NetDevice>) -> bool {
    let adapter: &'static NetdevAdapter = Box::leak(Box::new(NetdevAdapter::new(dev)));
    let registered = keel_lib::runtime_services::register_netdev(adapter);
    if registered {
        klog_info!("netdev: device adapter installed");
    }
    registered
}
