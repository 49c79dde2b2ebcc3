use crate::{PingError, PingResult, Ttl};
use std::time::Duration;

pub const DEFAULT_PAYLOAD_SIZE: usize = 64;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

// Largest echo payload that still fits into an IPv4 datagram.
const MAX_PAYLOAD_SIZE: usize = 65_507;

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct PingProbeConfig {
    /// Number of filler bytes in every echo request.
    pub payload_size: usize,
    /// Hop limit of outgoing probes.
    pub ttl: Ttl,
    /// Receive deadline, counted from the moment the request is sent.
    pub timeout: Duration,
    /// Pause between two probes of a [`crate::PingRunner`].
    pub interval: Duration,
}

impl Default for PingProbeConfig {
    fn default() -> Self {
        PingProbeConfig {
            payload_size: DEFAULT_PAYLOAD_SIZE,
            ttl: Ttl::default(),
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl PingProbeConfig {
    pub fn validate(&self) -> PingResult<()> {
        if !self.ttl.is_valid() {
            return Err(PingError::InvalidConfig("ttl must be positive".to_owned()));
        }
        if self.payload_size > MAX_PAYLOAD_SIZE {
            return Err(PingError::InvalidConfig(format!(
                "payload size {} exceeds {MAX_PAYLOAD_SIZE} bytes",
                self.payload_size
            )));
        }
        if self.timeout.is_zero() {
            return Err(PingError::InvalidConfig("timeout must be positive".to_owned()));
        }
        Ok(())
    }
}
