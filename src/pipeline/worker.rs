use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::context::CancelToken;
use crate::NamespaceKey;
use crate::error::RemoteLookupError;
use crate::source::MetafieldLookup;
use crate::types::{ProcessResult, WorkItem};
use crate::utils::config::CANCEL_POLL_INTERVAL;

/// What a worker thread hands back when it exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub processed: usize,
    pub failures: usize,
}

/// Everything one worker owns. Workers share nothing mutable; only the queues and the read-only lookup.
pub struct WorkerContext {
    pub worker_id: usize,
    pub item_rx: Receiver<WorkItem>,
    pub result_tx: Sender<ProcessResult>,
    pub lookup: Arc<dyn MetafieldLookup>,
    pub key: Arc<NamespaceKey>,
    pub rate_limit: Duration,
    pub cancel: CancelToken,
}

/// Spawn `num_workers` workers (ids 0..n). Caller must drop its own `result_tx` after this
/// so the result queue closes when the last worker exits.
pub fn spawn_workers(
    num_workers: usize,
    item_rx: &Receiver<WorkItem>,
    result_tx: &Sender<ProcessResult>,
    lookup: &Arc<dyn MetafieldLookup>,
    key: &Arc<NamespaceKey>,
    rate_limit: Duration,
    cancel: &CancelToken,
) -> Vec<JoinHandle<WorkerReport>> {
    (0..num_workers)
        .map(|worker_id| {
            let ctx = WorkerContext {
                worker_id,
                item_rx: item_rx.clone(),
                result_tx: result_tx.clone(),
                lookup: Arc::clone(lookup),
                key: Arc::clone(key),
                rate_limit,
                cancel: cancel.clone(),
            };
            thread::spawn(move || worker_loop(ctx))
        })
        .collect()
}

/// Pull until the item queue is closed and drained (or cancelled), check each product,
/// send one result per item, then pause `rate_limit` before the next pull.
pub fn worker_loop(ctx: WorkerContext) -> WorkerReport {
    let mut report = WorkerReport {
        worker_id: ctx.worker_id,
        ..Default::default()
    };
    while let Some(item) = next_item(&ctx.item_rx, &ctx.cancel) {
        let result = process_item(ctx.worker_id, item, &*ctx.lookup, &ctx.key);
        if result.lookup_error.is_some() {
            report.failures += 1;
        }
        if ctx.result_tx.send(result).is_err() {
            warn!("[Worker {}] result queue closed early", ctx.worker_id);
            break;
        }
        report.processed += 1;
        if !ctx.rate_limit.is_zero() && !ctx.cancel.sleep(ctx.rate_limit) {
            break;
        }
    }
    debug!(
        "[Worker {}] completed processing {} products",
        report.worker_id, report.processed
    );
    report
}

/// Next item, or None once the queue is closed and empty or the token is cancelled.
fn next_item(item_rx: &Receiver<WorkItem>, cancel: &CancelToken) -> Option<WorkItem> {
    loop {
        if cancel.is_cancelled() {
            return None;
        }
        match item_rx.recv_timeout(CANCEL_POLL_INTERVAL) {
            Ok(item) => return Some(item),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}

/// Run the lookup for one item. Errors and panics count as "metafield absent".
pub fn process_item(
    worker_id: usize,
    item: WorkItem,
    lookup: &dyn MetafieldLookup,
    key: &NamespaceKey,
) -> ProcessResult {
    let start = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        lookup.has_metafield(&item.product.id, key)
    }))
    .unwrap_or_else(|panic| Err(RemoteLookupError(panic_message(&*panic))));
    let elapsed = start.elapsed();

    let (matched, lookup_error) = match outcome {
        Ok(matched) => (matched, None),
        Err(err) => {
            debug!(
                "[Worker {}] lookup for product {} failed: {}",
                worker_id, item.product.id, err
            );
            (false, Some(err))
        }
    };
    ProcessResult {
        index: item.index,
        product: item.product,
        matched,
        worker_id,
        elapsed,
        lookup_error,
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let msg = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("lookup panicked: {msg}")
}
