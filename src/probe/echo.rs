//! ICMP echo (ping) probe.
//!
//! Sends exactly one ICMPv4 Echo Request over a raw layer-4 socket and waits
//! for the matching Echo Reply. Raw sockets need root or `CAP_NET_RAW`;
//! without them the prober cannot be constructed and the caller reports a
//! failed step.

use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::Packet;
use pnet::transport::{
    icmp_packet_iter, transport_channel, TransportChannelType, TransportProtocol,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long to wait for the echo reply.
pub const ECHO_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest single wait on the socket before the stop flag is checked again.
const POLL_SLICE: Duration = Duration::from_millis(50);
const TRANSPORT_BUFFER_SIZE: usize = 4096;
const ECHO_HEADER_LEN: usize = 8;
const ECHO_PAYLOAD_LEN: usize = 8;
const ECHO_PAYLOAD: [u8; ECHO_PAYLOAD_LEN] = *b"nethlthz";
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

static SEQUENCE: AtomicU16 = AtomicU16::new(0);

/// Echo prober could not be set up or the request could not be sent.
#[derive(Debug)]
pub enum EchoError {
    /// Opening the raw socket failed (usually missing privileges).
    Channel(io::Error),
    /// Building the request packet failed.
    Packet(&'static str),
    /// Sending the request failed.
    Send(io::Error),
    /// Reading from the socket failed.
    Receive(io::Error),
    /// The blocking task did not complete.
    Task(String),
}

impl fmt::Display for EchoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EchoError::Channel(e) => write!(f, "failed to open raw ICMP socket: {}", e),
            EchoError::Packet(msg) => write!(f, "failed to build echo request: {}", msg),
            EchoError::Send(e) => write!(f, "failed to send echo request: {}", e),
            EchoError::Receive(e) => write!(f, "failed to receive echo reply: {}", e),
            EchoError::Task(msg) => write!(f, "echo task failed: {}", msg),
        }
    }
}

impl std::error::Error for EchoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EchoError::Channel(e) | EchoError::Send(e) | EchoError::Receive(e) => Some(e),
            _ => None,
        }
    }
}

/// Sends a single echo request.
#[async_trait]
pub trait EchoProber: Send + Sync {
    /// Returns `Ok(true)` if a reply arrived within `timeout`, `Ok(false)` if not.
    async fn echo(&self, target: Ipv4Addr, timeout: Duration) -> Result<bool, EchoError>;
}

/// Echo prober backed by a raw ICMPv4 socket.
#[derive(Debug, Default, Clone, Copy)]
pub struct IcmpEchoProber;

impl IcmpEchoProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EchoProber for IcmpEchoProber {
    async fn echo(&self, target: Ipv4Addr, timeout: Duration) -> Result<bool, EchoError> {
        // Dropping this future (request cancelled or deadline hit) stops the
        // blocking wait within one poll slice
        let stop = CancellationToken::new();
        let _guard = stop.clone().drop_guard();

        tokio::task::spawn_blocking(move || ping_once(target, timeout, &stop))
            .await
            .map_err(|e| EchoError::Task(e.to_string()))?
    }
}

/// Whether this process may open raw sockets without extra capabilities.
pub fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

fn ping_once(
    target: Ipv4Addr,
    timeout: Duration,
    stop: &CancellationToken,
) -> Result<bool, EchoError> {
    let (mut tx, mut rx) =
        transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP).map_err(EchoError::Channel)?;

    let identifier = std::process::id() as u16;
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut buffer = [0u8; ECHO_HEADER_LEN + ECHO_PAYLOAD_LEN];
    let request = build_echo_request(&mut buffer, identifier, sequence)?;

    tx.send_to(request, IpAddr::V4(target))
        .map_err(EchoError::Send)?;
    debug!(%target, identifier, sequence, "Echo request sent");

    let mut replies = icmp_packet_iter(&mut rx);
    let reachable = wait_for_reply(timeout, stop, |slice| {
        Ok(replies.next_with_timeout(slice)?.map(|(packet, source)| {
            source == IpAddr::V4(target) && is_matching_reply(&packet, identifier, sequence)
        }))
    })?;

    if reachable {
        debug!(%target, "Echo reply received");
    }
    Ok(reachable)
}

/// Poll for a matching reply in slices of at most [`POLL_SLICE`].
///
/// `poll` waits up to the given slice and yields `None` when nothing
/// arrived, `Some(true)` for the awaited reply and `Some(false)` for any
/// other packet. Returns `Ok(false)` once `timeout` elapsed or `stop` fired.
fn wait_for_reply<F>(timeout: Duration, stop: &CancellationToken, mut poll: F) -> Result<bool, EchoError>
where
    F: FnMut(Duration) -> io::Result<Option<bool>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if stop.is_cancelled() {
            return Ok(false);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }

        if poll(remaining.min(POLL_SLICE)).map_err(EchoError::Receive)? == Some(true) {
            return Ok(true);
        }
    }
}

fn build_echo_request(
    buffer: &mut [u8],
    identifier: u16,
    sequence: u16,
) -> Result<MutableEchoRequestPacket<'_>, EchoError> {
    let mut request =
        MutableEchoRequestPacket::new(buffer).ok_or(EchoError::Packet("buffer too small"))?;

    request.set_icmp_type(IcmpTypes::EchoRequest);
    request.set_icmp_code(IcmpCode(0));
    request.set_identifier(identifier);
    request.set_sequence_number(sequence);
    request.set_payload(&ECHO_PAYLOAD);
    request.set_checksum(0);

    let checksum = IcmpPacket::new(request.packet())
        .map(|p| icmp::checksum(&p))
        .ok_or(EchoError::Packet("truncated icmp header"))?;
    request.set_checksum(checksum);

    Ok(request)
}

fn is_matching_reply(packet: &IcmpPacket<'_>, identifier: u16, sequence: u16) -> bool {
    if packet.get_icmp_type() != IcmpTypes::EchoReply {
        return false;
    }
    EchoReplyPacket::new(packet.packet())
        .map(|reply| reply.get_identifier() == identifier && reply.get_sequence_number() == sequence)
        .unwrap_or(false)
}
