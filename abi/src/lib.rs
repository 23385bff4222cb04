//! Keel Runtime-Driver ABI Types
//!
//! This crate provides the canonical definitions for everything shared
//! between network device drivers and the host runtime that consumes them.
//! Having a single source of truth eliminates:
//! - Duplicate constant definitions
//! - ABI mismatches between the driver side and the runtime side
//! - The need for unsafe FFI conversions
//!
//! All struct types in this crate are `#[repr(C)]` for ABI stability.

#![no_std]
#![forbid(unsafe_code)]

pub mod error;
pub mod net;
pub mod netdev;


pub use error::*;
pub use net::*;
pub use netdev::*;
