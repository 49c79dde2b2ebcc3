#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! ICMP echo probing: one request/reply round trip per call, payload loss detection and
//! running statistics that can be read from another thread at any time.

pub use details::icmp::AddressFamily;
pub use ping_config::*;
pub use ping_error::{PingError, PingResult};
pub use ping_outcome::*;
pub use ping_runner::PingRunner;
pub use ping_session::ProbeSession;
pub use reporter::{interrupt_channel, spawn_reporter, InterruptReceiver, InterruptSender};
pub use statistics::{RttSummary, Snapshot, Statistics, StatisticsHandle};
pub use ttl::Ttl;
pub use utils::lookup_host;

mod details;
mod ping_config;
mod ping_error;
mod ping_outcome;
mod ping_runner;
mod ping_session;
mod reporter;
mod statistics;
mod ttl;
mod utils;
