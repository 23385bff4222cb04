//! Registration seam between device drivers and the host runtime.
//!
//! A driver stack publishes exactly one raw network device here during
//! bring-up; the runtime's networking layer fetches it through [`netdev`].
//! The cell is write-once: the first registration wins and later attempts
//! are rejected, so a misbehaving second driver cannot swap the device out
//! from under live sockets.

use keel_abi::netdev::RawNetdev;

use crate::klog_warn;
use crate::once_lock::OnceLock;

static NETDEV: OnceLock<&'static dyn RawNetdev> = OnceLock::new();

/// Publish the raw network device the runtime should use.
///
/// Returns `true` if this call performed the registration, `false` if a
/// device was already registered (the attempt is logged and ignored).
pub fn register_netdev(dev: &'static dyn RawNetdev) -> bool {
    let mut won = false;
    NETDEV.call_once(|| {
        won = true;
        dev
    });
    if !won {
        klog_warn!("runtime_services: netdev already registered, ignoring");
    }
    won
}

/// The registered raw network device, if any.
#[inline]
pub fn netdev() -> Option<&'static dyn RawNetdev> {
    NETDEV.get().copied()
}

/// `true` once a network device has been registered.
#[inline]
pub fn netdev_registered() -> bool {
    NETDEV.is_completed()
}
