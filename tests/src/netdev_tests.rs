//! End-to-end tests for the driver stack on a hosted target.
//!
//! Covers:
//! - the conformance checklist against the loopback device
//! - real bounded waits: expiry after the deadline, unblocking when the
//!   awaited event arrives from another thread, stored receive timeouts
//!   capping unbounded waits
//! - the runtime-facing path: registration through [`init_loopback`], then
//!   socket setup, a cross-thread connect, the placeholder accept result,
//!   and data flow entirely through the raw interface
//!
//! A monotonic time source backed by the host clock is installed before any
//! waiting test runs, so bounded waits here really wait.

use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Instant;

use core::time::Duration;

use keel_abi::net::SockAddrIn;
use keel_abi::netdev::{ACCEPT_FD_PLACEHOLDER, RawNetdev};
use keel_drivers::net::{
    AddressFamily, Ipv4Addr, LoopbackDev, NetError, Port, Protocol, SockAddr, SockFlags, SockOpt,
    SockOptLevel, SockType, Socketer, init_loopback,
};
use keel_lib::clock;

static CLOCK_ORIGIN: OnceLock<Instant> = OnceLock::new();

fn host_monotonic_ns() -> u64 {
    CLOCK_ORIGIN
        .get_or_init(Instant::now)
        .elapsed()
        .as_nanos()
        .min(u64::MAX as u128) as u64
}

/// Install the host clock as the platform time source.  Safe to call from
/// every test; the first call wins.
fn install_host_clock() {
    CLOCK_ORIGIN.get_or_init(Instant::now);
    clock::register_time_source(host_monotonic_ns);
}

const NONE: SockFlags = SockFlags::empty();

fn local(port: u16) -> SockAddr {
    SockAddr::new(Ipv4Addr::LOCALHOST, Port::new(port))
}

#[test]
fn test_conformance_checklist_passes_on_loopback() {
    install_host_clock();
    let dev = LoopbackDev::new();
    crate::conformance::run_all(&dev).expect("loopback is the reference implementation");
    assert_eq!(dev.open_sockets(), 0, "the checklist closes what it opens");
}

#[test]
fn test_bounded_wait_expires_after_deadline() {
    install_host_clock();
    let dev = LoopbackDev::new();
    let fd = dev
        .socket(AddressFamily::INET, SockType::DGRAM, Protocol::UDP)
        .expect("socket");
    dev.bind(fd, local(7000)).expect("bind");

    let mut buf = [0u8; 4];
    let started = Instant::now();
    assert_eq!(
        dev.recv(fd, &mut buf, NONE, Duration::from_millis(30)),
        Err(NetError::TimedOut),
        "nothing ever arrives"
    );
    assert!(
        started.elapsed() >= Duration::from_millis(30),
        "the wait used its whole budget, elapsed {:?}",
        started.elapsed()
    );
}

#[test]
fn test_stored_rcvtimeo_caps_unbounded_wait() {
    install_host_clock();
    let dev = LoopbackDev::new();
    let fd = dev
        .socket(AddressFamily::INET, SockType::DGRAM, Protocol::UDP)
        .expect("socket");
    dev.bind(fd, local(7010)).expect("bind");
    dev.set_sock_opt(
        fd,
        SockOptLevel::SOCKET,
        SockOpt::RCVTIMEO,
        &Duration::from_millis(25),
    )
    .expect("store receive timeout");

    let mut buf = [0u8; 4];
    let started = Instant::now();
    assert_eq!(
        dev.recv(fd, &mut buf, NONE, Duration::MAX),
        Err(NetError::TimedOut),
        "the effectively-unbounded wait ends"
    );
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(25),
        "the stored timeout was honored, elapsed {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(10),
        "the stored timeout capped the wait, elapsed {elapsed:?}"
    );
}

#[test]
fn test_accept_unblocks_when_peer_connects() {
    install_host_clock();
    let dev = Arc::new(LoopbackDev::new());
    let listener = dev
        .socket(AddressFamily::INET, SockType::STREAM, Protocol::TCP)
        .expect("listener");
    dev.bind(listener, local(7100)).expect("bind");
    dev.listen(listener, 4).expect("listen");

    let connector = {
        let dev = Arc::clone(&dev);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(25));
            let client = dev
                .socket(AddressFamily::INET, SockType::STREAM, Protocol::TCP)
                .expect("client");
            dev.connect(client, None, local(7100)).expect("connect");
        })
    };

    let (server, peer) = dev
        .accept(listener, Duration::from_secs(5))
        .expect("accept unblocked by the connect");
    assert!(
        peer.port().is_ephemeral(),
        "peer carries the client's auto-assigned address, got {peer}"
    );
    assert_ne!(server, listener, "accept produced a distinct socket");
    connector.join().expect("connector thread");
}

#[test]
fn test_waitall_spans_delayed_sends() {
    install_host_clock();
    let dev = Arc::new(LoopbackDev::new());
    let listener = dev
        .socket(AddressFamily::INET, SockType::STREAM, Protocol::TCP)
        .expect("listener");
    dev.bind(listener, local(7200)).expect("bind");
    dev.listen(listener, 4).expect("listen");

    let sender = {
        let dev = Arc::clone(&dev);
        thread::spawn(move || {
            let client = dev
                .socket(AddressFamily::INET, SockType::STREAM, Protocol::TCP)
                .expect("client");
            dev.connect(client, None, local(7200)).expect("connect");
            for chunk in [&b"aaa"[..], &b"bbb"[..]] {
                thread::sleep(Duration::from_millis(10));
                dev.send(client, chunk, NONE, Duration::from_secs(1))
                    .expect("send chunk");
            }
        })
    };

    let (server, _) = dev
        .accept(listener, Duration::from_secs(5))
        .expect("accept");
    let mut buf = [0u8; 6];
    let n = dev
        .recv(server, &mut buf, SockFlags::WAITALL, Duration::from_secs(5))
        .expect("recv collected everything");
    assert_eq!(&buf[..n], b"aaabbb", "bytes from both delayed sends");
    sender.join().expect("sender thread");
}

/// The only test that touches the process-wide registration cell.
#[test]
fn test_raw_surface_end_to_end() {
    install_host_clock();
    assert!(init_loopback(), "registration wins in this process");
    let raw: &'static dyn RawNetdev =
        keel_lib::runtime_services::netdev().expect("registered device fetchable");

    raw.net_connect().expect("join");
    assert_eq!(
        raw.get_ip_addr().expect("address while up"),
        [127, 0, 0, 1],
        "loopback address through the raw surface"
    );
    assert_eq!(
        raw.get_host_by_name("localhost").expect("resolution"),
        [127, 0, 0, 1],
        "name resolution through the raw surface"
    );

    let listener = raw.socket(2, 1, 6).expect("raw stream socket");
    raw.bind(listener, SockAddrIn::new(7300, [127, 0, 0, 1]))
        .expect("raw bind");
    raw.listen(listener, 4).expect("raw listen");

    let connector = thread::spawn(move || {
        thread::sleep(Duration::from_millis(25));
        let client = raw.socket(2, 1, 6).expect("raw client socket");
        raw.connect(client, SockAddrIn::new(7300, [127, 0, 0, 1]))
            .expect("raw connect");
        client
    });

    let accepted = raw
        .accept(listener, SockAddrIn::default(), Duration::from_secs(5))
        .expect("raw accept unblocked");
    assert_eq!(
        accepted, ACCEPT_FD_PLACEHOLDER,
        "the raw surface cannot carry the real accepted descriptor"
    );

    let client = connector.join().expect("connector thread");
    let n = raw
        .send(client, b"raw bytes", 0, Duration::from_secs(1))
        .expect("raw send");
    assert_eq!(n, 9, "payload queued through the raw surface");

    raw.close(client).expect("raw close client");
    raw.close(listener).expect("raw close listener");
}
