use std::sync::mpsc;
use std::thread::JoinHandle;

use crate::{PingError, PingResult, ProbeOutcome, ProbeSession};

pub(crate) type ProbeOutcomeSender = mpsc::Sender<PingResult<ProbeOutcome>>;
pub(crate) type ProbeOutcomeReceiver = mpsc::Receiver<PingResult<ProbeOutcome>>;

/// Drives a [`ProbeSession`] on its own thread: probe, publish the result, wait the configured
/// interval, repeat. Only one probe is ever in flight.
pub struct PingRunner {
    halt_tx: mpsc::Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
    outcome_rx: ProbeOutcomeReceiver,
}

impl Drop for PingRunner {
    fn drop(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = self.halt_tx.send(());
            if handle.join().is_err() {
                tracing::error!("probe thread panicked");
            }
        }
    }
}

impl PingRunner {
    /// Starts probing. With `count` the runner stops by itself after that many probes.
    pub fn start(session: ProbeSession, count: Option<u64>) -> Self {
        let (halt_tx, halt_rx) = mpsc::channel::<()>();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let thread_handle = Self::start_probe_thread(session, count, halt_rx, outcome_tx);

        Self { halt_tx, thread_handle: Some(thread_handle), outcome_rx }
    }

    /// Blocks until the next probe finished. `None` once the runner stopped probing.
    pub fn next_outcome(&self) -> Option<PingResult<ProbeOutcome>> {
        self.outcome_rx.recv().ok()
    }

    pub fn try_next_outcome(&self) -> PingResult<Option<ProbeOutcome>> {
        match self.outcome_rx.try_recv() {
            Ok(result) => result.map(Some),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(PingError::RunnerHalted),
        }
    }

    /// Stops the probe loop and waits for it. A probe in flight runs until its reply or deadline.
    pub fn halt(mut self) -> std::thread::Result<()> {
        // mpsc::Sender::send() returns error only if the probe thread already finished.
        let _maybe_err = self.halt_tx.send(());
        match self.thread_handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }

    fn start_probe_thread(
        mut session: ProbeSession,
        count: Option<u64>,
        halt_rx: mpsc::Receiver<()>,
        outcome_tx: ProbeOutcomeSender,
    ) -> JoinHandle<()> {
        std::thread::spawn(move || {
            tracing::trace!("probe thread start with count {:?}", count);
            let interval = session.config().interval;
            let mut n_probes: u64 = 0;
            loop {
                // (1) Probe.
                let result = session.probe();
                n_probes += 1;
                if let Err(e) = &result {
                    tracing::warn!("probe failed: {}", e);
                }

                // (2) Publish.
                if outcome_tx.send(result).is_err() {
                    tracing::trace!("outcome receiver dropped");
                    break;
                }
                if count.map_or(false, |count| n_probes >= count) {
                    break;
                }

                // (3) Sleep for the interval, or stop when halted.
                match halt_rx.recv_timeout(interval) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }
            }
            tracing::trace!("probe thread end after {} probes", n_probes);
        })
    }
}
