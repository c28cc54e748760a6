use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Sender, select};
use tracing::debug;

use super::collector::Collector;
use super::walker::CancellationToken;

/// Callback receiving `(file_count, total_bytes)` on every progress tick
pub type ProgressFn = Box<dyn FnMut(u64, u64) + Send + 'static>;

/// Message sent by a background scan
#[derive(Debug, Clone)]
pub enum ScanMessage {
    /// Progress update
    Progress(ScanProgress),
    /// Walk finished, building the snapshot
    Finalizing,
    /// Scan completed, the snapshot is returned by the join handle
    Completed,
    /// Scan was cancelled
    Cancelled,
    /// Scan failed before or during the walk
    Error(String),
}

/// Scanning progress statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanProgress {
    /// Files admitted so far (directories in directory mode)
    pub files: u64,
    /// Total bytes admitted so far
    pub bytes: u64,
}

/// Periodic sampler of the collector's live counters.
///
/// Runs on its own timer thread and only reads the collector, through the
/// same lock the workers write with. Each tick forwards the latest values;
/// ticks missed by a slow callback are dropped, never queued.
pub struct ProgressReporter {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Start sampling. Returns `None` (and spawns nothing) without a callback.
    pub fn start(
        collector: Arc<Collector>,
        interval: Duration,
        cancel: CancellationToken,
        callback: Option<ProgressFn>,
    ) -> Option<Self> {
        let mut callback = callback?;
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        let handle = std::thread::spawn(move || {
            let ticker = crossbeam_channel::tick(interval);
            loop {
                select! {
                    recv(ticker) -> _ => {
                        if cancel.is_cancelled() {
                            debug!("progress reporter stopping: cancelled");
                            break;
                        }
                        let (files, bytes) = collector.progress();
                        callback(files, bytes);
                    }
                    recv(stop_rx) -> _ => break,
                }
            }
        });

        Some(Self { stop_tx, handle })
    }

    /// Stop the timer and wait for the thread to exit
    pub fn stop(self) {
        drop(self.stop_tx);
        let _ = self.handle.join();
    }
}
