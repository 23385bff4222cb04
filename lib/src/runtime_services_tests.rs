//! Tests for the netdev registration sink.
//!
//! Covers:
//! - accessor returns the registered device
//! - first registration wins, later attempts are rejected
//!
//! The sink is a process-wide static, so a single test function drives the
//! whole sequence in order.

use core::any::Any;
use core::time::Duration;

use keel_abi::error::NetError;
use keel_abi::net::SockAddrIn;
use keel_abi::netdev::RawNetdev;

use crate::runtime_services;

/// Raw device stub that answers identity queries with a fixed MAC.
struct StubRawNetdev {
    mac: [u8; 6],
}

impl RawNetdev for StubRawNetdev {
    fn net_connect(&self) -> Result<(), NetError> {
        Ok(())
    }

    fn net_disconnect(&self) {}

    fn get_host_by_name(&self, _name: &str) -> Result<[u8; 4], NetError> {
        Err(NetError::LookupFailed)
    }

    fn get_hardware_addr(&self) -> Result<[u8; 6], NetError> {
        Ok(self.mac)
    }

    fn get_ip_addr(&self) -> Result<[u8; 4], NetError> {
        Err(NetError::LinkDown)
    }

    fn socket(&self, _family: i32, _sock_type: u8, _protocol: i32) -> Result<usize, NetError> {
        Err(NetError::NoBufferSpace)
    }

    fn bind(&self, _sockfd: usize, _addr: SockAddrIn) -> Result<(), NetError> {
        Ok(())
    }

    fn connect(&self, _sockfd: usize, _addr: SockAddrIn) -> Result<(), NetError> {
        Ok(())
    }

    fn listen(&self, _sockfd: usize, _backlog: i32) -> Result<(), NetError> {
        Ok(())
    }

    fn accept(
        &self,
        _sockfd: usize,
        _peer: SockAddrIn,
        _timeout: Duration,
    ) -> Result<usize, NetError> {
        Err(NetError::TimedOut)
    }

    fn send(
        &self,
        _sockfd: usize,
        buf: &[u8],
        _flags: u16,
        _timeout: Duration,
    ) -> Result<usize, NetError> {
        Ok(buf.len())
    }

    fn recv(
        &self,
        _sockfd: usize,
        _buf: &mut [u8],
        _flags: u16,
        _timeout: Duration,
    ) -> Result<usize, NetError> {
        Err(NetError::TimedOut)
    }

    fn close(&self, _sockfd: usize) -> Result<(), NetError> {
        Ok(())
    }

    fn set_sock_opt(
        &self,
        _sockfd: usize,
        _level: i32,
        _opt: i32,
        _value: &dyn Any,
    ) -> Result<(), NetError> {
        Ok(())
    }
}

static FIRST: StubRawNetdev = StubRawNetdev {
    mac: [0x02, 0, 0, 0, 0, 0x01],
};
static SECOND: StubRawNetdev = StubRawNetdev {
    mac: [0x02, 0, 0, 0, 0, 0x02],
};

#[test]
fn test_registration_sequence() {
    assert!(
        runtime_services::register_netdev(&FIRST),
        "first registration is accepted"
    );
    assert!(
        runtime_services::netdev_registered(),
        "sink reports a device after registration"
    );

    let dev = runtime_services::netdev().expect("accessor returns the device");
    assert_eq!(
        dev.get_hardware_addr(),
        Ok(FIRST.mac),
        "accessor hands back the registered device"
    );

    assert!(
        !runtime_services::register_netdev(&SECOND),
        "second registration is rejected"
    );
    let dev = runtime_services::netdev().expect("device still present");
    assert_eq!(
        dev.get_hardware_addr(),
        Ok(FIRST.mac),
        "first device survives a duplicate registration attempt"
    );
}
