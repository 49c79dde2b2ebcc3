use std::io;

pub type PingResult<T> = std::result::Result<T, PingError>;

#[derive(Debug, thiserror::Error)]
pub enum PingError {
    #[error("could not resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not open ICMP socket: {0}")]
    SocketOpen(#[source] io::Error),

    #[error("could not encode ICMP message: {0}")]
    Encode(String),

    #[error("error sending ICMP message: {0}")]
    Transport(#[source] io::Error),

    #[error("short write: sent {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("error receiving ICMP message: {0}")]
    Receive(#[source] io::Error),

    #[error("could not decode ICMP message: {0}")]
    Decode(String),

    #[error("ping runner is halted")]
    RunnerHalted,
}

impl PingError {
    /// Errors that must stop the process before any probing happens.
    /// Everything else only aborts the current attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PingError::Resolve { .. } | PingError::InvalidConfig(_))
    }
}
