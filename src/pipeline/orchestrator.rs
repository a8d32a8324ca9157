use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use super::collector::{ProgressCallback, collect_results};
use super::context::{CancelToken, PipelineChannels, create_pipeline_channels};
use super::error_handler::report_lookup_failures;
use super::feeder::spawn_feeder_thread;
use super::worker::{WorkerReport, spawn_workers};
use crate::error::{PipelineError, PipelineResult};
use crate::source::MetafieldLookup;
use crate::{ConcurrencyConfig, FilterOutcome, NamespaceKey, ProductRecord, ProgressUpdate};

/// Coordinator lifecycle. `Done` is entered exactly once per pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Draining,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Running => "running",
            PipelineState::Draining => "draining",
            PipelineState::Done => "done",
        };
        f.write_str(s)
    }
}

/// One-shot worker-pool pipeline: feeder → item queue → N workers → result queue → collector.
///
/// ```ignore
/// let lookup: Arc<dyn MetafieldLookup> = Arc::new(CatalogLookup::from_products(&products));
/// let mut pipeline = Pipeline::new(ConcurrencyConfig::default());
/// let outcome = pipeline.start(products, &"product_tab.details".parse()?, lookup)?;
/// ```
pub struct Pipeline {
    config: ConcurrencyConfig,
    state: PipelineState,
    cancel: CancelToken,
    on_progress: Option<ProgressCallback>,
}

impl Pipeline {
    pub fn new(config: ConcurrencyConfig) -> Self {
        Self {
            config,
            state: PipelineState::Idle,
            cancel: CancelToken::new(),
            on_progress: None,
        }
    }

    /// Share an externally owned token (Ctrl+C handler, timeout).
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Receive progress notifications instead of the default info log line.
    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + 'static,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &ConcurrencyConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("pipeline: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Run the whole pipeline on `products` and return retained products plus stats.
    ///
    /// Fails with `InvalidConfig` (nothing spawned, state stays `Idle`) or `AlreadyStarted`.
    /// If the cancel token fires, in-flight items finish, queued items are abandoned, and the
    /// partial outcome comes back inside `PipelineError::Cancelled`. A worker thread that dies
    /// outside the lookup guard yields `PipelineError::WorkerFailed` with whatever was collected.
    pub fn start(
        &mut self,
        products: Vec<ProductRecord>,
        key: &NamespaceKey,
        lookup: Arc<dyn MetafieldLookup>,
    ) -> PipelineResult<FilterOutcome> {
        if self.state != PipelineState::Idle {
            return Err(PipelineError::AlreadyStarted);
        }
        self.config.validate()?;

        let started = Instant::now();
        let total = products.len();
        let products: Vec<Arc<ProductRecord>> = products.into_iter().map(Arc::new).collect();
        let key = Arc::new(key.clone());

        self.transition(PipelineState::Running);
        let PipelineChannels {
            item_tx,
            item_rx,
            result_tx,
            result_rx,
        } = create_pipeline_channels(self.config.batch_size);

        let worker_handles = spawn_workers(
            self.config.max_workers,
            &item_rx,
            &result_tx,
            &lookup,
            &key,
            self.config.rate_limit,
            &self.cancel,
        );
        // Only workers hold item_rx / result_tx from here on: the result queue closes when the last worker exits.
        drop(item_rx);
        drop(result_tx);

        let feeder_handle = spawn_feeder_thread(products, item_tx, self.cancel.clone());
        debug!(
            "pipeline: {} workers, queue capacity {}, rate limit {:?}",
            self.config.max_workers, self.config.batch_size, self.config.rate_limit
        );

        let (retained, mut stats) = collect_results(
            result_rx,
            total,
            self.config.preserve_order,
            self.on_progress.as_ref(),
        );
        self.transition(PipelineState::Draining);

        let fed = join_feeder(feeder_handle);
        let worker_died = join_workers(worker_handles);
        stats.wall_clock = started.elapsed();
        self.transition(PipelineState::Done);

        info!(
            "Average processing time per product: {:?}",
            stats.average_duration()
        );
        report_lookup_failures(&stats);
        let outcome = FilterOutcome {
            retained,
            stats,
            total,
        };

        let processed = outcome.stats.processed;
        if worker_died {
            warn!(
                "worker pool stopped early: {} of {} products processed",
                processed, total
            );
            return Err(PipelineError::WorkerFailed {
                partial: Box::new(outcome),
            });
        }
        if processed < total {
            if self.cancel.is_cancelled() {
                warn!(
                    "pipeline cancelled: {} of {} products fed, {} processed",
                    fed, total, processed
                );
                return Err(PipelineError::Cancelled {
                    partial: Box::new(outcome),
                });
            }
            warn!(
                "result queue closed after {} of {} products",
                processed, total
            );
            return Err(PipelineError::WorkerFailed {
                partial: Box::new(outcome),
            });
        }
        Ok(outcome)
    }
}

fn join_feeder(handle: JoinHandle<usize>) -> usize {
    handle.join().unwrap_or_else(|_| {
        warn!("feeder thread panicked");
        0
    })
}

/// Join every worker. True if any of them panicked.
fn join_workers(handles: Vec<JoinHandle<WorkerReport>>) -> bool {
    let mut died = false;
    for h in handles {
        match h.join() {
            Ok(report) if report.failures > 0 => debug!(
                "[Worker {}] {} of {} lookups failed",
                report.worker_id, report.failures, report.processed
            ),
            Ok(_) => {}
            Err(_) => {
                warn!("worker thread panicked");
                died = true;
            }
        }
    }
    died
}
