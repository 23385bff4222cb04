#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod klog;
pub mod once_lock;
pub mod ring_buffer;
pub mod runtime_services;
pub mod sync;

#[cfg(test)]
mod ring_buffer_tests;
#[cfg(test)]
mod runtime_services_tests;

pub use klog::{KlogLevel, klog_get_level, klog_register_backend, klog_set_level};
pub use once_lock::OnceLock;
pub use ring_buffer::RingBuffer;
pub use sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
