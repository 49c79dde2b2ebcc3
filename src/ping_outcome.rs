use crate::statistics::duration_to_ms;
use std::net::IpAddr;
use std::time::Duration;

/// Result of one echo round trip that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeOutcome {
    Reply(EchoReplyData),
    /// Some other ICMP message arrived first, e.g. time exceeded.
    NonEcho(NonEchoData),
    Timeout { sequence_number: u16 },
}

impl ProbeOutcome {
    pub fn sequence_number(&self) -> u16 {
        match self {
            ProbeOutcome::Reply(data) => data.sequence_number,
            ProbeOutcome::NonEcho(data) => data.sequence_number,
            ProbeOutcome::Timeout { sequence_number } => *sequence_number,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct EchoReplyData {
    /// Length of the echo payload that came back.
    pub bytes_received: usize,
    pub lost_bytes: usize,
    pub loss_percent: f64,
    pub source: IpAddr,
    pub sequence_number: u16,
    pub rtt: Duration,
}

impl EchoReplyData {
    pub fn rtt_ms(&self) -> f64 {
        duration_to_ms(self.rtt)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NonEchoData {
    pub icmp_type: u8,
    pub icmp_code: u8,
    pub source: IpAddr,
    pub sequence_number: u16,
    pub rtt: Duration,
}

impl NonEchoData {
    pub fn rtt_ms(&self) -> f64 {
        duration_to_ms(self.rtt)
    }
}
