//! Locking primitives for driver state.
//!
//! Drivers own all their locking behind `&self` methods; the adapter and the
//! runtime boundary take no locks of their own.  The contract layer runs on
//! targets without an OS mutex, so these are the `spin` crate's primitives
//! re-exported under the names the rest of the tree uses.

pub use spin::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
