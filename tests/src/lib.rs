//! Integration surface for the keel driver stack.
//!
//! The library half is a conformance checklist: a sequence of behavioral
//! checks any [`NetDevice`](keel_drivers::net::NetDevice) implementation can
//! be driven through, reporting the first unmet expectation by name.  A
//! platform port runs the checklist against its driver during bring-up the
//! same way the tests here run it against the loopback device.
//!
//! The test half exercises the stack end to end on a hosted target: real
//! bounded waits against a registered time source, cross-thread blocking,
//! and the runtime-facing raw registration surface.

#![cfg_attr(not(test), no_std)]

pub mod conformance;

#[cfg(test)]
mod netdev_tests;

pub use conformance::{CheckResult, run_all};
