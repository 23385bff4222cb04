//! Loopback network device (`lo`).
//!
//! # Architecture
//!
//! The whole device is one socket table behind a single [`Mutex`]: an array
//! of [`MAX_SOCKETS`] slots, each holding an in-memory socket.  Datagram
//! sockets deliver by port lookup within the table; stream sockets pair up at
//! connect time and then push into each other's receive queues.  No wire, no
//! checksums, no ARP.
//!
//! Bounded waits spin-poll the table against the [`clock`] deadline,
//! releasing the lock between polls.  When no time source is registered, a
//! bounded wait degrades to a single immediate poll.
//!
//! # Concurrency
//!
//! Every contract method takes `&self` and holds the table lock for one poll
//! at a time, never across a wait.
//!
//! [`clock`]: keel_lib::clock

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::any::Any;
use core::time::Duration;

use keel_lib::sync::Mutex;
use keel_lib::{RingBuffer, clock, klog_info};

use super::netdev::NetDevice;
use super::socketer::Socketer;
use super::types::{
    AddressFamily, Ipv4Addr, MacAddr, NetError, Port, Protocol, SockAddr, SockFlags, SockOpt,
    SockOptLevel, SockType, Sockfd,
};

/// Number of socket slots in the table.  The slot index is the descriptor.
pub const MAX_SOCKETS: usize = 16;

/// Default queued messages per socket before senders have to wait (streams)
/// or datagrams get dropped.
const RX_QUEUE_CAPACITY: usize = 32;

/// Hard bound on the pending-connection queue; `listen` backlogs clamp here.
const BACKLOG_CAPACITY: usize = 8;

/// Default largest datagram payload, matching UDP over IPv4.
const MAX_DGRAM_PAYLOAD: usize = 65507;

/// First port of the ephemeral range used for automatic binds.
const EPHEMERAL_BASE: u16 = 49152;

/// Receive flags this device implements.
const RECV_FLAGS: SockFlags = SockFlags::PEEK
    .union(SockFlags::DONTWAIT)
    .union(SockFlags::TRUNC)
    .union(SockFlags::WAITALL);

/// Send flags this device implements.
const SEND_FLAGS: SockFlags = SockFlags::DONTWAIT;

/// Tunables for one device instance.
#[derive(Clone, Copy, Debug)]
pub struct LoopbackConfig {
    /// Queued messages per socket before senders have to wait (streams) or
    /// datagrams get dropped.  Clamped to at least 1.
    pub rx_queue_depth: usize,
    /// Largest accepted datagram payload.
    pub max_dgram_payload: usize,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            rx_queue_depth: RX_QUEUE_CAPACITY,
            max_dgram_payload: MAX_DGRAM_PAYLOAD,
        }
    }
}

/// One queued message: payload plus the sender's address.
struct Datagram {
    from: SockAddr,
    payload: Vec<u8>,
}

/// Backlog entry: a server-side socket created at connect time, waiting in
/// the listener's queue to be accepted.
#[derive(Clone, Copy, Default)]
struct PendingConn {
    slot: usize,
    peer: SockAddr,
}

struct Listener {
    backlog: RingBuffer<PendingConn, BACKLOG_CAPACITY>,
    limit: u32,
}

/// Per-socket state.  The slot index in the table is the descriptor value.
struct SocketState {
    family: AddressFamily,
    sock_type: SockType,
    protocol: Protocol,
    local: Option<SockAddr>,
    peer: Option<SockAddr>,
    /// Paired stream socket's slot, set when the pairing is created.
    peer_slot: Option<usize>,
    /// The paired socket closed; sends fail, drained reads return 0.
    peer_closed: bool,
    listener: Option<Listener>,
    rx: VecDeque<Datagram>,
    recv_timeout: Option<Duration>,
    send_timeout: Option<Duration>,
    reuse_addr: bool,
}

impl SocketState {
    fn new(family: AddressFamily, sock_type: SockType, protocol: Protocol) -> Self {
        Self {
            family,
            sock_type,
            protocol,
            local: None,
            peer: None,
            peer_slot: None,
            peer_closed: false,
            listener: None,
            rx: VecDeque::new(),
            recv_timeout: None,
            send_timeout: None,
            reuse_addr: false,
        }
    }

    fn is_stream(&self) -> bool {
        self.sock_type.base() == SockType::STREAM
    }
}

/// Inner state of the loopback device, behind the table [`Mutex`].
struct LoopbackInner {
    sockets: [Option<SocketState>; MAX_SOCKETS],
    next_ephemeral: u16,
    link_up: bool,
    config: LoopbackConfig,
}

fn slot_of(fd: Sockfd) -> Result<usize, NetError> {
    if fd.0 < 0 || fd.0 as usize >= MAX_SOCKETS {
        return Err(NetError::BadDescriptor);
    }
    Ok(fd.0 as usize)
}

impl LoopbackInner {
    fn socket_ref(&self, fd: Sockfd) -> Result<&SocketState, NetError> {
        let idx = slot_of(fd)?;
        self.sockets[idx].as_ref().ok_or(NetError::BadDescriptor)
    }

    fn socket_mut(&mut self, fd: Sockfd) -> Result<&mut SocketState, NetError> {
        let idx = slot_of(fd)?;
        self.sockets[idx].as_mut().ok_or(NetError::BadDescriptor)
    }

    fn free_slot(&self) -> Option<usize> {
        self.sockets.iter().position(Option::is_none)
    }

    /// `true` if another socket of the same base type holds `port` and the
    /// bind is not permitted by mutual `SO_REUSEADDR`.
    fn port_in_use(&self, port: u16, base: SockType, reuse: bool, skip: usize) -> bool {
        self.sockets.iter().enumerate().any(|(j, slot)| {
            j != skip
                && slot.as_ref().is_some_and(|s| {
                    s.sock_type.base() == base
                        && s.local.is_some_and(|a| a.port().as_u16() == port)
                        && !(reuse && s.reuse_addr)
                })
        })
    }

    fn find_listener(&self, port: u16) -> Option<usize> {
        self.sockets.iter().position(|slot| {
            slot.as_ref().is_some_and(|s| {
                s.listener.is_some() && s.local.is_some_and(|a| a.port().as_u16() == port)
            })
        })
    }

    fn find_dgram_receiver(&self, port: u16) -> Option<usize> {
        self.sockets.iter().position(|slot| {
            slot.as_ref().is_some_and(|s| {
                s.sock_type.base() == SockType::DGRAM
                    && s.local.is_some_and(|a| a.port().as_u16() == port)
            })
        })
    }

    fn alloc_ephemeral(&mut self, base: SockType) -> Result<u16, NetError> {
        let span = u16::MAX - EPHEMERAL_BASE + 1;
        for _ in 0..span {
            let candidate = self.next_ephemeral;
            self.next_ephemeral = if candidate == u16::MAX {
                EPHEMERAL_BASE
            } else {
                candidate + 1
            };
            if !self.port_in_use(candidate, base, false, usize::MAX) {
                return Ok(candidate);
            }
        }
        Err(NetError::AddressInUse)
    }

    /// Local address of the socket, auto-binding an ephemeral port first if
    /// it has none.
    fn ensure_bound(&mut self, idx: usize) -> Result<SockAddr, NetError> {
        let base = match &self.sockets[idx] {
            Some(s) => {
                if let Some(local) = s.local {
                    return Ok(local);
                }
                s.sock_type.base()
            }
            None => return Err(NetError::BadDescriptor),
        };
        let port = self.alloc_ephemeral(base)?;
        let local = SockAddr::new(Ipv4Addr::LOCALHOST, Port::new(port));
        if let Some(s) = self.sockets[idx].as_mut() {
            s.local = Some(local);
        }
        Ok(local)
    }
}

/// How long a blocked operation may keep polling.
enum WaitBudget {
    /// One poll, then give up.
    Poll,
    /// Poll until the monotonic clock passes this value.
    Deadline(u64),
}

fn wait_budget(timeout: Duration) -> WaitBudget {
    if timeout.is_zero() || !clock::time_source_registered() {
        return WaitBudget::Poll;
    }
    let ns = timeout.as_nanos().min(u64::MAX as u128) as u64;
    WaitBudget::Deadline(clock::monotonic_ns().saturating_add(ns))
}

/// Copy queued stream bytes into `buf`, spanning entries, consuming what was
/// copied unless `peek`.
fn drain_stream(state: &mut SocketState, buf: &mut [u8], peek: bool) -> usize {
    let mut copied = 0;
    if peek {
        for dg in state.rx.iter() {
            if copied == buf.len() {
                break;
            }
            let n = (buf.len() - copied).min(dg.payload.len());
            buf[copied..copied + n].copy_from_slice(&dg.payload[..n]);
            copied += n;
        }
        return copied;
    }
    while copied < buf.len() {
        let Some(front) = state.rx.front_mut() else {
            break;
        };
        if front.payload.is_empty() {
            state.rx.pop_front();
            continue;
        }
        let n = (buf.len() - copied).min(front.payload.len());
        buf[copied..copied + n].copy_from_slice(&front.payload[..n]);
        copied += n;
        if n == front.payload.len() {
            state.rx.pop_front();
        } else {
            front.payload.drain(..n);
        }
    }
    copied
}

fn duration_opt(value: &dyn Any) -> Result<Duration, NetError> {
    value
        .downcast_ref::<Duration>()
        .copied()
        .ok_or(NetError::InvalidArgument)
}

fn switch_opt(value: &dyn Any) -> Result<bool, NetError> {
    if let Some(b) = value.downcast_ref::<bool>() {
        return Ok(*b);
    }
    if let Some(n) = value.downcast_ref::<i32>() {
        return Ok(*n != 0);
    }
    Err(NetError::InvalidArgument)
}

/// The loopback network device.
///
/// Implements the full [`NetDevice`] contract against local memory.  Serves
/// as the reference driver and as the device the self-tests run against.
pub struct LoopbackDev {
    inner: Mutex<LoopbackInner>,
}

impl LoopbackDev {
    /// Create a device with default tunables, an empty socket table, and the
    /// link down.
    pub fn new() -> Self {
        Self::with_config(LoopbackConfig::default())
    }

    /// Create a device with explicit tunables.
    pub fn with_config(config: LoopbackConfig) -> Self {
        let config = LoopbackConfig {
            rx_queue_depth: config.rx_queue_depth.max(1),
            ..config
        };
        Self {
            inner: Mutex::new(LoopbackInner {
                sockets: [const { None }; MAX_SOCKETS],
                next_ephemeral: EPHEMERAL_BASE,
                link_up: false,
                config,
            }),
        }
    }

    /// Number of sockets currently open.  Diagnostic hook for leak checks.
    pub fn open_sockets(&self) -> usize {
        self.inner
            .lock()
            .sockets
            .iter()
            .filter(|s| s.is_some())
            .count()
    }

    /// Poll `poll` until it produces an outcome or the budget for `timeout`
    /// runs out.  The table lock is held only inside each poll.
    fn wait_on<T>(
        &self,
        timeout: Duration,
        mut poll: impl FnMut(&mut LoopbackInner) -> Option<Result<T, NetError>>,
    ) -> Result<T, NetError> {
        let budget = wait_budget(timeout);
        loop {
            {
                let mut inner = self.inner.lock();
                if let Some(outcome) = poll(&mut inner) {
                    return outcome;
                }
            }
            match budget {
                WaitBudget::Poll => return Err(NetError::TimedOut),
                WaitBudget::Deadline(deadline_ns) => {
                    if clock::monotonic_ns() >= deadline_ns {
                        return Err(NetError::TimedOut);
                    }
                    core::hint::spin_loop();
                }
            }
        }
    }

    /// `(is_stream, non_blocking)` for the socket, validated.
    fn classify(&self, sockfd: Sockfd) -> Result<(bool, bool), NetError> {
        let inner = self.inner.lock();
        let s = inner.socket_ref(sockfd)?;
        Ok((s.is_stream(), s.sock_type.is_non_blocking()))
    }

    fn stored_recv_timeout(&self, sockfd: Sockfd) -> Option<Duration> {
        self.inner
            .lock()
            .socket_ref(sockfd)
            .ok()
            .and_then(|s| s.recv_timeout)
    }

    fn stored_send_timeout(&self, sockfd: Sockfd) -> Option<Duration> {
        self.inner
            .lock()
            .socket_ref(sockfd)
            .ok()
            .and_then(|s| s.send_timeout)
    }

    fn do_send(
        &self,
        sockfd: Sockfd,
        buf: &[u8],
        flags: SockFlags,
        timeout: Duration,
        explicit_to: Option<SockAddr>,
    ) -> Result<usize, NetError> {
        if flags.bits() & !SEND_FLAGS.bits() != 0 {
            return Err(NetError::Unsupported);
        }
        let idx = slot_of(sockfd)?;
        let (stream, non_blocking) = self.classify(sockfd)?;

        if stream {
            // A connected stream socket ignores an explicit destination.
            if buf.is_empty() {
                return Ok(0);
            }
            let timeout = if timeout == Duration::MAX {
                self.stored_send_timeout(sockfd).unwrap_or(timeout)
            } else {
                timeout
            };
            let poll = |inner: &mut LoopbackInner| -> Option<Result<usize, NetError>> {
                let depth = inner.config.rx_queue_depth;
                let (peer_idx, from) = {
                    let state = match inner.socket_ref(sockfd) {
                        Ok(s) => s,
                        Err(e) => return Some(Err(e)),
                    };
                    if state.peer_closed {
                        return Some(Err(NetError::ConnectionReset));
                    }
                    let Some(peer_idx) = state.peer_slot else {
                        return Some(Err(NetError::NotConnected));
                    };
                    (peer_idx, state.local.unwrap_or_default())
                };
                match inner.sockets.get_mut(peer_idx).and_then(|s| s.as_mut()) {
                    Some(peer) if peer.rx.len() >= depth => None,
                    Some(peer) => {
                        peer.rx.push_back(Datagram {
                            from,
                            payload: buf.to_vec(),
                        });
                        Some(Ok(buf.len()))
                    }
                    None => Some(Err(NetError::ConnectionReset)),
                }
            };
            if flags.contains(SockFlags::DONTWAIT) || non_blocking {
                return match self.wait_on(Duration::ZERO, poll) {
                    Err(NetError::TimedOut) => Err(NetError::WouldBlock),
                    other => other,
                };
            }
            return self.wait_on(timeout, poll);
        }

        // Datagram path: deliver or drop, never waits.
        let mut inner = self.inner.lock();
        if buf.len() > inner.config.max_dgram_payload {
            return Err(NetError::MessageTooLong);
        }
        let depth = inner.config.rx_queue_depth;
        let dest = match explicit_to {
            Some(to) if to.ip().is_unspecified() => SockAddr::new(Ipv4Addr::LOCALHOST, to.port()),
            Some(to) => to,
            None => inner.socket_ref(sockfd)?.peer.ok_or(NetError::NotConnected)?,
        };
        if !dest.ip().is_loopback() {
            return Err(NetError::ConnectionRefused);
        }
        let from = inner.ensure_bound(idx)?;
        if let Some(ridx) = inner.find_dgram_receiver(dest.port().as_u16()) {
            if let Some(receiver) = inner.sockets[ridx].as_mut() {
                if receiver.rx.len() < depth {
                    receiver.rx.push_back(Datagram {
                        from,
                        payload: buf.to_vec(),
                    });
                }
            }
        }
        Ok(buf.len())
    }

    fn do_recv(
        &self,
        sockfd: Sockfd,
        buf: &mut [u8],
        flags: SockFlags,
        timeout: Duration,
    ) -> Result<(usize, SockAddr), NetError> {
        if flags.bits() & !RECV_FLAGS.bits() != 0 {
            return Err(NetError::Unsupported);
        }
        let (_, non_blocking) = self.classify(sockfd)?;
        let timeout = if timeout == Duration::MAX {
            self.stored_recv_timeout(sockfd).unwrap_or(timeout)
        } else {
            timeout
        };
        let poll = |inner: &mut LoopbackInner| -> Option<Result<(usize, SockAddr), NetError>> {
            let state = match inner.socket_mut(sockfd) {
                Ok(s) => s,
                Err(e) => return Some(Err(e)),
            };
            if state.is_stream() {
                if flags.contains(SockFlags::WAITALL) && !state.peer_closed {
                    let queued: usize = state.rx.iter().map(|d| d.payload.len()).sum();
                    if queued < buf.len() {
                        return None;
                    }
                }
                if state.rx.is_empty() {
                    if state.peer_closed {
                        // Orderly shutdown by the peer reads as end-of-stream.
                        return Some(Ok((0, state.peer.unwrap_or_default())));
                    }
                    return None;
                }
                let from = state.peer.unwrap_or_default();
                let n = drain_stream(state, buf, flags.contains(SockFlags::PEEK));
                Some(Ok((n, from)))
            } else {
                let front = state.rx.front()?;
                let full_len = front.payload.len();
                let from = front.from;
                let n = buf.len().min(full_len);
                buf[..n].copy_from_slice(&front.payload[..n]);
                if !flags.contains(SockFlags::PEEK) {
                    state.rx.pop_front();
                }
                let reported = if flags.contains(SockFlags::TRUNC) {
                    full_len
                } else {
                    n
                };
                Some(Ok((reported, from)))
            }
        };
        if flags.contains(SockFlags::DONTWAIT) || non_blocking {
            return match self.wait_on(Duration::ZERO, poll) {
                Err(NetError::TimedOut) => Err(NetError::WouldBlock),
                other => other,
            };
        }
        self.wait_on(timeout, poll)
    }
}

impl Default for LoopbackDev {
    fn default() -> Self {
        Self::new()
    }
}

impl Socketer for LoopbackDev {
    fn socket(
        &self,
        family: AddressFamily,
        sock_type: SockType,
        protocol: Protocol,
    ) -> Result<Sockfd, NetError> {
        if family != AddressFamily::INET {
            return Err(NetError::AddressFamilyNotSupported);
        }
        let proto_ok = match sock_type.base() {
            SockType::STREAM => protocol == Protocol::IP || protocol == Protocol::TCP,
            SockType::DGRAM => protocol == Protocol::IP || protocol == Protocol::UDP,
            _ => return Err(NetError::ProtocolNotSupported),
        };
        if !proto_ok {
            return Err(NetError::ProtocolNotSupported);
        }
        let mut inner = self.inner.lock();
        let Some(idx) = inner.free_slot() else {
            return Err(NetError::NoBufferSpace);
        };
        inner.sockets[idx] = Some(SocketState::new(family, sock_type, protocol));
        Ok(Sockfd(idx as i32))
    }

    fn bind(&self, sockfd: Sockfd, addr: SockAddr) -> Result<(), NetError> {
        let idx = slot_of(sockfd)?;
        if !(addr.ip().is_unspecified() || addr.ip().is_loopback()) {
            return Err(NetError::InvalidArgument);
        }
        let mut inner = self.inner.lock();
        let (base, reuse) = {
            let s = inner.socket_ref(sockfd)?;
            if s.local.is_some() {
                return Err(NetError::InvalidArgument);
            }
            (s.sock_type.base(), s.reuse_addr)
        };
        let port = addr.port().as_u16();
        let port = if port == 0 {
            inner.alloc_ephemeral(base)?
        } else {
            if inner.port_in_use(port, base, reuse, idx) {
                return Err(NetError::AddressInUse);
            }
            port
        };
        if let Some(s) = inner.sockets[idx].as_mut() {
            s.local = Some(SockAddr::new(Ipv4Addr::LOCALHOST, Port::new(port)));
        }
        Ok(())
    }

    fn connect(&self, sockfd: Sockfd, host: Option<&str>, addr: SockAddr) -> Result<(), NetError> {
        let idx = slot_of(sockfd)?;
        let dest = match host {
            Some(name) => SockAddr::new(self.get_host_by_name(name)?, addr.port()),
            None if addr.ip().is_unspecified() => SockAddr::new(Ipv4Addr::LOCALHOST, addr.port()),
            None => addr,
        };
        if !dest.ip().is_loopback() {
            return Err(NetError::ConnectionRefused);
        }

        let mut inner = self.inner.lock();
        let stream = {
            let s = inner.socket_ref(sockfd)?;
            if s.peer.is_some() {
                return Err(NetError::AlreadyConnected);
            }
            if s.listener.is_some() {
                return Err(NetError::InvalidArgument);
            }
            s.is_stream()
        };

        if !stream {
            inner.ensure_bound(idx)?;
            if let Some(s) = inner.sockets[idx].as_mut() {
                s.peer = Some(dest);
            }
            return Ok(());
        }

        let Some(listener_idx) = inner.find_listener(dest.port().as_u16()) else {
            return Err(NetError::ConnectionRefused);
        };
        {
            let listener = inner.sockets[listener_idx]
                .as_ref()
                .and_then(|s| s.listener.as_ref())
                .ok_or(NetError::ConnectionRefused)?;
            if listener.backlog.len() >= listener.limit || listener.backlog.is_full() {
                return Err(NetError::ConnectionRefused);
            }
        }
        let client_local = inner.ensure_bound(idx)?;
        let Some(server_idx) = inner.free_slot() else {
            return Err(NetError::NoBufferSpace);
        };
        let (family, sock_type, protocol) = {
            let s = inner.socket_ref(sockfd)?;
            (s.family, s.sock_type, s.protocol)
        };
        let mut server = SocketState::new(family, sock_type, protocol);
        server.local = Some(dest);
        server.peer = Some(client_local);
        server.peer_slot = Some(idx);
        inner.sockets[server_idx] = Some(server);

        let pushed = inner.sockets[listener_idx]
            .as_mut()
            .and_then(|s| s.listener.as_mut())
            .is_some_and(|l| {
                l.backlog.try_push(PendingConn {
                    slot: server_idx,
                    peer: client_local,
                })
            });
        if !pushed {
            inner.sockets[server_idx] = None;
            return Err(NetError::ConnectionRefused);
        }
        if let Some(s) = inner.sockets[idx].as_mut() {
            s.peer = Some(dest);
            s.peer_slot = Some(server_idx);
        }
        Ok(())
    }

    fn listen(&self, sockfd: Sockfd, backlog: i32) -> Result<(), NetError> {
        let mut inner = self.inner.lock();
        let state = inner.socket_mut(sockfd)?;
        if !state.is_stream() || state.local.is_none() {
            return Err(NetError::InvalidArgument);
        }
        if state.peer.is_some() {
            return Err(NetError::AlreadyConnected);
        }
        let limit = (backlog.max(1) as u32).min(BACKLOG_CAPACITY as u32);
        match state.listener.as_mut() {
            Some(listener) => listener.limit = limit,
            None => {
                state.listener = Some(Listener {
                    backlog: RingBuffer::new(),
                    limit,
                });
            }
        }
        Ok(())
    }

    fn accept(&self, sockfd: Sockfd, timeout: Duration) -> Result<(Sockfd, SockAddr), NetError> {
        let (_, non_blocking) = self.classify(sockfd)?;
        let poll = |inner: &mut LoopbackInner| -> Option<Result<(Sockfd, SockAddr), NetError>> {
            loop {
                let pending = {
                    let state = match inner.socket_mut(sockfd) {
                        Ok(s) => s,
                        Err(e) => return Some(Err(e)),
                    };
                    let Some(listener) = state.listener.as_mut() else {
                        return Some(Err(NetError::InvalidArgument));
                    };
                    match listener.backlog.try_pop() {
                        Some(p) => p,
                        None => return None,
                    }
                };
                // Skip pairings whose server side died with its listener.
                if inner
                    .sockets
                    .get(pending.slot)
                    .and_then(|s| s.as_ref())
                    .is_some()
                {
                    return Some(Ok((Sockfd(pending.slot as i32), pending.peer)));
                }
            }
        };
        if non_blocking {
            return match self.wait_on(Duration::ZERO, poll) {
                Err(NetError::TimedOut) => Err(NetError::WouldBlock),
                other => other,
            };
        }
        self.wait_on(timeout, poll)
    }

    fn send(
        &self,
        sockfd: Sockfd,
        buf: &[u8],
        flags: SockFlags,
        timeout: Duration,
    ) -> Result<usize, NetError> {
        self.do_send(sockfd, buf, flags, timeout, None)
    }

    fn send_to(
        &self,
        sockfd: Sockfd,
        buf: &[u8],
        flags: SockFlags,
        timeout: Duration,
        to: SockAddr,
    ) -> Result<usize, NetError> {
        self.do_send(sockfd, buf, flags, timeout, Some(to))
    }

    fn recv(
        &self,
        sockfd: Sockfd,
        buf: &mut [u8],
        flags: SockFlags,
        timeout: Duration,
    ) -> Result<usize, NetError> {
        self.do_recv(sockfd, buf, flags, timeout).map(|(n, _)| n)
    }

    fn recv_from(
        &self,
        sockfd: Sockfd,
        buf: &mut [u8],
        flags: SockFlags,
        timeout: Duration,
    ) -> Result<(usize, SockAddr), NetError> {
        self.do_recv(sockfd, buf, flags, timeout)
    }

    fn close(&self, sockfd: Sockfd) -> Result<(), NetError> {
        let idx = slot_of(sockfd)?;
        let mut inner = self.inner.lock();
        let Some(state) = inner.sockets[idx].take() else {
            return Err(NetError::BadDescriptor);
        };
        if let Some(peer_idx) = state.peer_slot {
            if let Some(peer) = inner.sockets.get_mut(peer_idx).and_then(|s| s.as_mut()) {
                peer.peer_closed = true;
            }
        }
        if let Some(mut listener) = state.listener {
            // Un-accepted pairings die with their listener.
            while let Some(pending) = listener.backlog.try_pop() {
                let client_idx = inner
                    .sockets
                    .get_mut(pending.slot)
                    .and_then(|s| s.take())
                    .and_then(|embryo| embryo.peer_slot);
                if let Some(ci) = client_idx {
                    if let Some(client) = inner.sockets.get_mut(ci).and_then(|s| s.as_mut()) {
                        client.peer_closed = true;
                    }
                }
            }
        }
        Ok(())
    }

    fn set_sock_opt(
        &self,
        sockfd: Sockfd,
        level: SockOptLevel,
        opt: SockOpt,
        value: &dyn Any,
    ) -> Result<(), NetError> {
        let mut inner = self.inner.lock();
        let state = inner.socket_mut(sockfd)?;
        match (level, opt) {
            (SockOptLevel::SOCKET, SockOpt::RCVTIMEO) => {
                state.recv_timeout = Some(duration_opt(value)?);
            }
            (SockOptLevel::SOCKET, SockOpt::SNDTIMEO) => {
                state.send_timeout = Some(duration_opt(value)?);
            }
            (SockOptLevel::SOCKET, SockOpt::REUSEADDR) => {
                state.reuse_addr = switch_opt(value)?;
            }
            // Validated and discarded: loopback has no keepalive machinery
            // and no transmit coalescing to disable.
            (SockOptLevel::SOCKET, SockOpt::KEEPALIVE) => {
                switch_opt(value)?;
            }
            (SockOptLevel::TCP, SockOpt::NODELAY) => {
                switch_opt(value)?;
            }
            (SockOptLevel::TCP, SockOpt::KEEPINTVL) => {
                duration_opt(value)?;
            }
            _ => return Err(NetError::InvalidArgument),
        }
        Ok(())
    }
}

impl NetDevice for LoopbackDev {
    fn net_connect(&self) -> Result<(), NetError> {
        let mut inner = self.inner.lock();
        if !inner.link_up {
            inner.link_up = true;
            klog_info!("loopback: link up");
        }
        Ok(())
    }

    fn net_disconnect(&self) {
        let mut inner = self.inner.lock();
        if inner.link_up {
            inner.link_up = false;
            klog_info!("loopback: link down");
        }
    }

    fn get_host_by_name(&self, name: &str) -> Result<Ipv4Addr, NetError> {
        if name == "localhost" {
            return Ok(Ipv4Addr::LOCALHOST);
        }
        Ipv4Addr::parse(name).ok_or(NetError::LookupFailed)
    }

    fn get_hardware_addr(&self) -> Result<MacAddr, NetError> {
        Ok(MacAddr([0; 6]))
    }

    fn get_ip_addr(&self) -> Result<Ipv4Addr, NetError> {
        if self.inner.lock().link_up {
            Ok(Ipv4Addr::LOCALHOST)
        } else {
            Err(NetError::LinkDown)
        }
    }
}

// =============================================================================
// Loopback registration
// =============================================================================

use alloc::boxed::Box;

/// Create a loopback device and publish it as the system network device.
///
/// Returns `false` if a device was already registered; the first one wins.
pub fn init_loopback() -> bool {
    let registered = super::use_netdev(Box::new(LoopbackDev::new()));
    if registered {
        klog_info!("loopback: registered as system netdev");
    } else {
        klog_info!("loopback: a netdev is already registered, skipping");
    }
    registered
}
