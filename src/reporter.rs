use crate::{Snapshot, StatisticsHandle};
use std::sync::mpsc;
use std::thread::JoinHandle;

pub type InterruptSender = mpsc::Sender<()>;
pub type InterruptReceiver = mpsc::Receiver<()>;

pub fn interrupt_channel() -> (InterruptSender, InterruptReceiver) {
    mpsc::channel()
}

/// Spawns the thread that waits for an interrupt and then hands one statistics snapshot to
/// `report`. Terminating the process is up to `report`.
///
/// Nothing is reported if every [`InterruptSender`] is dropped without sending.
pub fn spawn_reporter<F>(interrupt_rx: InterruptReceiver, statistics: StatisticsHandle, report: F) -> JoinHandle<()>
where
    F: FnOnce(Snapshot) + Send + 'static,
{
    std::thread::spawn(move || {
        if interrupt_rx.recv().is_err() {
            tracing::trace!("interrupt channel closed");
            return;
        }
        tracing::trace!("interrupt received");
        report(statistics.snapshot());
    })
}
