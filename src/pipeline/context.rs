//! Pipeline context: the two bounded queues and the shared cancel token.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::types::{ProcessResult, WorkItem};
use crate::utils::config::CANCEL_POLL_INTERVAL;

/// Shared abort signal. Cloning shares the flag; the deadline (if any) is copied.
///
/// Checked by the feeder before each push and by workers before each pull and during the
/// rate-limit pause. A lookup call already in flight is not interrupted.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also reports cancelled once `timeout` has elapsed from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().and_timeout(timeout)
    }

    /// Same flag, plus a deadline `timeout` from now.
    pub fn and_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Sleep for `duration` in small slices. Returns false if cancelled before it ran out.
    /// A duration too large to add to `Instant::now()` sleeps until cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let until = Instant::now().checked_add(duration);
        loop {
            if self.is_cancelled() {
                return false;
            }
            let slice = match until {
                Some(until) => {
                    let now = Instant::now();
                    if now >= until {
                        return true;
                    }
                    (until - now).min(CANCEL_POLL_INTERVAL)
                }
                None => CANCEL_POLL_INTERVAL,
            };
            thread::sleep(slice);
        }
    }
}

/// Item queue (feeder → workers) and result queue (workers → collector), both bounded to `batch_size`.
/// The feeder gets `item_tx`; workers get `item_rx` and a clone of `result_tx`; the collector gets `result_rx`.
pub struct PipelineChannels {
    pub item_tx: Sender<WorkItem>,
    pub item_rx: Receiver<WorkItem>,
    pub result_tx: Sender<ProcessResult>,
    pub result_rx: Receiver<ProcessResult>,
}

pub fn create_pipeline_channels(capacity: usize) -> PipelineChannels {
    let (item_tx, item_rx) = bounded::<WorkItem>(capacity);
    let (result_tx, result_rx) = bounded::<ProcessResult>(capacity);
    PipelineChannels {
        item_tx,
        item_rx,
        result_tx,
        result_rx,
    }
}
