use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Cumulative counters of one probe session.
///
/// Only the probe engine mutates them; readers go through [`StatisticsHandle::snapshot`].
#[derive(Clone, Debug, PartialEq)]
pub struct Statistics {
    packets_sent: u64,
    packets_received: u64,
    bytes_lost: u64,
    rtt_min_ms: f64,
    rtt_max_ms: f64,
    rtt_total_ms: f64,
    payload_size: usize,
}

impl Statistics {
    pub(crate) fn new(payload_size: usize) -> Self {
        Statistics {
            packets_sent: 0,
            packets_received: 0,
            bytes_lost: 0,
            rtt_min_ms: f64::INFINITY,
            rtt_max_ms: f64::NEG_INFINITY,
            rtt_total_ms: 0.0,
            payload_size,
        }
    }

    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    pub fn bytes_lost(&self) -> u64 {
        self.bytes_lost
    }

    pub fn rtt_min_ms(&self) -> f64 {
        self.rtt_min_ms
    }

    pub fn rtt_max_ms(&self) -> f64 {
        self.rtt_max_ms
    }

    pub fn rtt_total_ms(&self) -> f64 {
        self.rtt_total_ms
    }

    pub(crate) fn record_sent(&mut self) {
        self.packets_sent += 1;
    }

    /// Records a received reply. `lost_bytes` is zero for non-echo replies.
    pub(crate) fn record_received(&mut self, rtt: Duration, lost_bytes: usize) {
        let rtt_ms = duration_to_ms(rtt);
        self.rtt_min_ms = self.rtt_min_ms.min(rtt_ms);
        self.rtt_max_ms = self.rtt_max_ms.max(rtt_ms);
        self.rtt_total_ms += rtt_ms;
        self.packets_received += 1;
        self.bytes_lost += lost_bytes as u64;
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> Snapshot {
        if self.packets_received == 0 {
            return Snapshot {
                sent: self.packets_sent,
                received: 0,
                bytes_lost: self.bytes_lost,
                loss_percent: 100.0,
                rtt: None,
            };
        }

        let expected_bytes = self.packets_sent as f64 * self.payload_size as f64;
        let loss_percent = if expected_bytes > 0.0 { self.bytes_lost as f64 / expected_bytes * 100.0 } else { 0.0 };
        Snapshot {
            sent: self.packets_sent,
            received: self.packets_received,
            bytes_lost: self.bytes_lost,
            loss_percent,
            rtt: Some(RttSummary {
                min_ms: self.rtt_min_ms,
                avg_ms: self.rtt_total_ms / self.packets_received as f64,
                max_ms: self.rtt_max_ms,
            }),
        }
    }
}

pub(crate) fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1e3
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RttSummary {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
}

/// Consistent view of the counters, taken under a single lock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub sent: u64,
    pub received: u64,
    pub bytes_lost: u64,
    /// Lost payload bytes relative to all payload bytes sent; 100 while nothing was received.
    pub loss_percent: f64,
    /// `None` while nothing was received.
    pub rtt: Option<RttSummary>,
}

/// Shared handle to the statistics of a session, for the probe loop and the reporter.
#[derive(Clone, Debug)]
pub struct StatisticsHandle {
    inner: Arc<Mutex<Statistics>>,
}

impl StatisticsHandle {
    pub(crate) fn new(payload_size: usize) -> Self {
        StatisticsHandle { inner: Arc::new(Mutex::new(Statistics::new(payload_size))) }
    }

    fn lock(&self) -> MutexGuard<'_, Statistics> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Copy of the raw counters.
    pub fn get(&self) -> Statistics {
        self.lock().clone()
    }

    pub(crate) fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Statistics),
    {
        f(&mut self.lock());
    }
}
