#![cfg_attr(not(test), no_std)]

pub mod i2c;
pub mod net;
pub mod pwm;
pub mod serial;
pub mod spi;


pub use net::use_netdev;
pub use net::{NetDevice, Socketer};
