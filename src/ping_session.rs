use crate::details::icmp::{self, sequence_number::SequenceNumber, AddressFamily, IcmpMessage};
use crate::details::payload;
use crate::details::socket::{RawSocketFactory, TSocket, TSocketFactory};
use crate::statistics::StatisticsHandle;
use crate::utils::lookup_host;
use crate::{EchoReplyData, NonEchoData, PingError, PingProbeConfig, PingResult, ProbeOutcome, Ttl};
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;
use std::{fmt, io};

// Large enough for any IPv4 datagram including its header.
const RECV_BUFFER_LEN: usize = 1 << 16;

/// Echo probing state for one target.
///
/// Every call to [`ProbeSession::probe`] performs exactly one echo request/reply round trip on a
/// fresh raw socket and updates the shared [`StatisticsHandle`].
pub struct ProbeSession {
    target: IpAddr,
    family: AddressFamily,
    identifier: u16,
    payload: Vec<u8>,
    config: PingProbeConfig,
    sequence_number: u64,
    statistics: StatisticsHandle,
    socket_factory: Box<dyn TSocketFactory>,
}

impl fmt::Debug for ProbeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeSession")
            .field("target", &self.target)
            .field("family", &self.family)
            .field("identifier", &self.identifier)
            .field("sequence_number", &self.sequence_number)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ProbeSession {
    /// Resolves `host` once and prepares a session probing it over raw sockets.
    pub fn new(host: &str, config: PingProbeConfig) -> PingResult<ProbeSession> {
        let target = lookup_host(host)?;
        tracing::debug!("resolved {} to {}", host, target);
        Self::with_target(target, config)
    }

    pub fn with_target(target: IpAddr, config: PingProbeConfig) -> PingResult<ProbeSession> {
        Self::with_socket_factory(target, config, Box::new(RawSocketFactory))
    }

    pub(crate) fn with_socket_factory(
        target: IpAddr,
        config: PingProbeConfig,
        socket_factory: Box<dyn TSocketFactory>,
    ) -> PingResult<ProbeSession> {
        config.validate()?;
        Ok(ProbeSession {
            target,
            family: AddressFamily::of(target),
            identifier: process_identifier(),
            payload: payload::filler(config.payload_size),
            statistics: StatisticsHandle::new(config.payload_size),
            sequence_number: 0,
            config,
            socket_factory,
        })
    }

    pub fn target(&self) -> IpAddr {
        self.target
    }

    pub fn address_family(&self) -> AddressFamily {
        self.family
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    /// Number of probes attempted so far; the next probe carries this value (modulo 2^16).
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn config(&self) -> &PingProbeConfig {
        &self.config
    }

    pub fn statistics(&self) -> StatisticsHandle {
        self.statistics.clone()
    }

    /// Probes with the configured TTL.
    pub fn probe(&mut self) -> PingResult<ProbeOutcome> {
        self.probe_with_ttl(self.config.ttl)
    }

    /// Sends one echo request with hop limit `ttl` and waits for the answer.
    ///
    /// The sequence number and the sent counter advance on every call, whatever the result.
    /// A missing answer is [`ProbeOutcome::Timeout`], not an error.
    pub fn probe_with_ttl(&mut self, ttl: Ttl) -> PingResult<ProbeOutcome> {
        let sequence_number = SequenceNumber::from_counter(self.sequence_number);
        self.sequence_number += 1;
        self.statistics.update(crate::Statistics::record_sent);

        let socket = self.socket_factory.open(self.family, ttl).map_err(PingError::SocketOpen)?;
        let message = icmp::encode_echo_request(self.family, self.identifier, sequence_number, &self.payload)?;

        let addr = SocketAddr::new(self.target, 0);
        let start_time = Instant::now();
        let written = socket.send_to(&message, &addr.into()).map_err(PingError::Transport)?;
        if written != message.len() {
            return Err(PingError::ShortWrite { written, expected: message.len() });
        }
        tracing::trace!("sent echo request icmp_seq={} to {}", u16::from(sequence_number), self.target);

        let outcome = self.receive(&*socket, sequence_number, start_time)?;
        tracing::debug!("{:?}", outcome);
        Ok(outcome)
    }

    fn receive(&self, socket: &dyn TSocket, sequence_number: SequenceNumber, start_time: Instant) -> PingResult<ProbeOutcome> {
        let deadline = start_time + self.config.timeout;
        let timeout = ProbeOutcome::Timeout { sequence_number: sequence_number.into() };
        let mut buf = vec![0u8; RECV_BUFFER_LEN];

        loop {
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(remaining) if !remaining.is_zero() => remaining,
                _ => return Ok(timeout),
            };
            socket.set_read_timeout(remaining).map_err(PingError::Receive)?;

            let (n_bytes, source) = match socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    return Ok(timeout);
                }
                Err(e) => return Err(PingError::Receive(e)),
            };
            let rtt = start_time.elapsed();

            match icmp::decode(self.family, &buf[..n_bytes])? {
                IcmpMessage::EchoRequest(_) => {
                    tracing::trace!("skipping echo request from {}", source);
                }
                IcmpMessage::EchoReply(echo)
                    if echo.identifier != self.identifier || echo.sequence_number != sequence_number =>
                {
                    tracing::trace!(
                        "skipping echo reply from {} with id={} icmp_seq={}",
                        source,
                        echo.identifier,
                        u16::from(echo.sequence_number)
                    );
                }
                IcmpMessage::EchoReply(echo) => {
                    let lost_bytes = payload::count_lost_bytes(&self.payload, &echo.payload);
                    self.statistics.update(|statistics| statistics.record_received(rtt, lost_bytes));
                    return Ok(ProbeOutcome::Reply(EchoReplyData {
                        bytes_received: echo.payload.len(),
                        lost_bytes,
                        loss_percent: payload::loss_percent(lost_bytes, self.payload.len()),
                        source,
                        sequence_number: sequence_number.into(),
                        rtt,
                    }));
                }
                IcmpMessage::Informational { icmp_type, icmp_code } => {
                    tracing::trace!("skipping icmp type={} code={} from {}", icmp_type, icmp_code, source);
                }
                IcmpMessage::Error { icmp_type, icmp_code, quoted }
                    if quoted.map_or(true, |quoted| {
                        quoted.identifier != self.identifier || quoted.sequence_number != sequence_number
                    }) =>
                {
                    tracing::trace!(
                        "skipping icmp error type={} code={} from {} for another request",
                        icmp_type,
                        icmp_code,
                        source
                    );
                }
                IcmpMessage::Error { icmp_type, icmp_code, .. } => {
                    self.statistics.update(|statistics| statistics.record_received(rtt, 0));
                    return Ok(ProbeOutcome::NonEcho(NonEchoData {
                        icmp_type,
                        icmp_code,
                        source,
                        sequence_number: sequence_number.into(),
                        rtt,
                    }));
                }
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn process_identifier() -> u16 {
    (std::process::id() & 0xffff) as u16
}
