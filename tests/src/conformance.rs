//! Behavioral checklist for network device drivers.
//!
//! Each check drives one slice of the [`NetDevice`] contract using only
//! zero timeouts, so a run can never hang on a driver that waits
//! incorrectly.  Delivery is expected to complete within a single poll;
//! devices that complete transfers asynchronously need scheduling of their
//! own between steps and should be exercised with bounded waits instead.
//!
//! Run the checklist against a freshly created device: checks bind fixed
//! ports (6100-6399) and assume the table starts empty.  Every check closes
//! the sockets it opens, so the checks compose over one device.

use core::time::Duration;

use keel_drivers::net::{
    AddressFamily, Ipv4Addr, NetDevice, NetError, Port, Protocol, SockAddr, SockFlags, SockType,
    Sockfd,
};
use keel_lib::klog_info;

/// `Ok(())`, or the first unmet expectation by name.
pub type CheckResult = Result<(), &'static str>;

const NONE: SockFlags = SockFlags::empty();
const POLL: Duration = Duration::ZERO;

fn check(cond: bool, what: &'static str) -> CheckResult {
    if cond { Ok(()) } else { Err(what) }
}

fn loopback_at(port: u16) -> SockAddr {
    SockAddr::new(Ipv4Addr::LOCALHOST, Port::new(port))
}

/// Sockets open and close for every supported type/protocol pairing, and
/// stale descriptors are refused.
pub fn socket_lifecycle(dev: &dyn NetDevice) -> CheckResult {
    let pairings = [
        (SockType::STREAM, Protocol::IP),
        (SockType::STREAM, Protocol::TCP),
        (SockType::DGRAM, Protocol::IP),
        (SockType::DGRAM, Protocol::UDP),
    ];
    for (sock_type, protocol) in pairings {
        let fd = dev
            .socket(AddressFamily::INET, sock_type, protocol)
            .map_err(|_| "supported type/protocol pairing refused")?;
        dev.close(fd).map_err(|_| "close of a fresh socket failed")?;
        check(
            dev.close(fd) == Err(NetError::BadDescriptor),
            "closed descriptor not invalidated",
        )?;
    }
    check(
        dev.close(Sockfd(-1)) == Err(NetError::BadDescriptor),
        "negative descriptor accepted",
    )
}

/// The full stream path: listen, refused early accept, connect, pairing,
/// data both ways, end-of-stream after peer close.
pub fn stream_contract(dev: &dyn NetDevice) -> CheckResult {
    let listener = dev
        .socket(AddressFamily::INET, SockType::STREAM, Protocol::TCP)
        .map_err(|_| "stream socket refused")?;
    dev.bind(listener, loopback_at(6100))
        .map_err(|_| "stream bind refused")?;
    dev.listen(listener, 4).map_err(|_| "listen refused")?;
    check(
        dev.accept(listener, POLL) == Err(NetError::TimedOut),
        "accept on an empty backlog must time out",
    )?;

    let client = dev
        .socket(AddressFamily::INET, SockType::STREAM, Protocol::TCP)
        .map_err(|_| "client socket refused")?;
    dev.connect(client, None, loopback_at(6100))
        .map_err(|_| "connect to own listener refused")?;
    let (server, peer) = dev
        .accept(listener, POLL)
        .map_err(|_| "accept after connect found nothing")?;
    check(peer.port().as_u16() != 0, "accepted peer has no port")?;

    dev.send(client, b"ping", NONE, POLL)
        .map_err(|_| "stream send refused")?;
    let mut buf = [0u8; 8];
    let n = dev
        .recv(server, &mut buf, NONE, POLL)
        .map_err(|_| "stream recv found nothing")?;
    check(&buf[..n] == b"ping", "stream payload corrupted")?;

    dev.send(server, b"pong", NONE, POLL)
        .map_err(|_| "reply send refused")?;
    let n = dev
        .recv(client, &mut buf, NONE, POLL)
        .map_err(|_| "reply recv found nothing")?;
    check(&buf[..n] == b"pong", "reply payload corrupted")?;

    dev.close(client).map_err(|_| "client close failed")?;
    check(
        dev.recv(server, &mut buf, NONE, POLL) == Ok(0),
        "drained socket must read end-of-stream after peer close",
    )?;
    dev.close(server).map_err(|_| "server close failed")?;
    dev.close(listener).map_err(|_| "listener close failed")
}

/// Datagram delivery by port, source addresses usable for replies, and
/// zero-length payloads distinct from timeouts.
pub fn dgram_contract(dev: &dyn NetDevice) -> CheckResult {
    let server = dev
        .socket(AddressFamily::INET, SockType::DGRAM, Protocol::UDP)
        .map_err(|_| "dgram socket refused")?;
    dev.bind(server, loopback_at(6200))
        .map_err(|_| "dgram bind refused")?;
    let client = dev
        .socket(AddressFamily::INET, SockType::DGRAM, Protocol::UDP)
        .map_err(|_| "second dgram socket refused")?;

    dev.send_to(client, b"query", NONE, POLL, loopback_at(6200))
        .map_err(|_| "send_to refused")?;
    let mut buf = [0u8; 16];
    let (n, from) = dev
        .recv_from(server, &mut buf, NONE, POLL)
        .map_err(|_| "datagram not delivered")?;
    check(&buf[..n] == b"query", "datagram payload corrupted")?;
    check(from.port().as_u16() != 0, "datagram source has no port")?;

    dev.send_to(server, b"", NONE, POLL, from)
        .map_err(|_| "reply to reported source refused")?;
    check(
        dev.recv(client, &mut buf, NONE, POLL) == Ok(0),
        "zero-length datagram must arrive as a zero-length read",
    )?;

    dev.close(client).map_err(|_| "dgram close failed")?;
    dev.close(server).map_err(|_| "dgram close failed")
}

/// The timeout discipline: zero budgets report timed-out, the no-wait flag
/// reports would-block, and neither consumes anything.
pub fn timeout_contract(dev: &dyn NetDevice) -> CheckResult {
    let fd = dev
        .socket(AddressFamily::INET, SockType::DGRAM, Protocol::UDP)
        .map_err(|_| "dgram socket refused")?;
    dev.bind(fd, loopback_at(6300))
        .map_err(|_| "dgram bind refused")?;
    let mut buf = [0u8; 4];
    check(
        dev.recv(fd, &mut buf, NONE, POLL) == Err(NetError::TimedOut),
        "empty recv with a zero budget must report timed-out",
    )?;
    check(
        dev.recv(fd, &mut buf, SockFlags::DONTWAIT, Duration::from_secs(1))
            == Err(NetError::WouldBlock),
        "the no-wait flag must report would-block regardless of budget",
    )?;
    dev.close(fd).map_err(|_| "close failed")
}

/// Link lifecycle and identity: joining is idempotent, the address is gated
/// on the link, and name resolution handles dotted notation.
pub fn identity_contract(dev: &dyn NetDevice) -> CheckResult {
    dev.net_connect().map_err(|_| "joining the network failed")?;
    dev.net_connect()
        .map_err(|_| "joining twice must be harmless")?;
    dev.get_ip_addr()
        .map_err(|_| "no address while the link is up")?;
    dev.get_hardware_addr()
        .map_err(|_| "hardware address unreadable")?;
    let resolved = dev
        .get_host_by_name("192.0.2.7")
        .map_err(|_| "dotted notation must resolve locally")?;
    check(
        resolved == Ipv4Addr([192, 0, 2, 7]),
        "dotted notation resolved to the wrong address",
    )?;
    check(
        dev.get_host_by_name("").is_err(),
        "the empty name cannot resolve",
    )
}

/// Run every check against `dev`, logging each as it passes.  Stops at the
/// first unmet expectation.
pub fn run_all(dev: &dyn NetDevice) -> CheckResult {
    let checks: [(&str, fn(&dyn NetDevice) -> CheckResult); 5] = [
        ("socket_lifecycle", socket_lifecycle),
        ("stream_contract", stream_contract),
        ("dgram_contract", dgram_contract),
        ("timeout_contract", timeout_contract),
        ("identity_contract", identity_contract),
    ];
    for (name, run) in checks {
        run(dev)?;
        klog_info!("conformance: {} ok", name);
    }
    Ok(())
}
