//! Result collector: single consumer of the result queue.

use crossbeam_channel::Receiver;
use log::info;
use std::sync::Arc;

use crate::types::{PipelineStats, ProcessResult, ProductRecord, ProgressUpdate};
use crate::utils::config::ProgressConsts;

/// Progress sink; called on the collector's thread, so keep it fast.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send>;

/// Drain `result_rx` until every sender is gone. Records each result once, keeps matched
/// products, and reports progress every [`ProgressConsts::PROGRESS_INTERVAL`] items
/// (to `on_progress` if given, else an info log line).
///
/// Retained order follows arrival unless `preserve_order`, in which case it is sorted back
/// to input order by feed index.
pub fn collect_results(
    result_rx: Receiver<ProcessResult>,
    total: usize,
    preserve_order: bool,
    on_progress: Option<&ProgressCallback>,
) -> (Vec<Arc<ProductRecord>>, PipelineStats) {
    let mut stats = PipelineStats::default();
    let mut retained: Vec<(usize, Arc<ProductRecord>)> = Vec::new();

    while let Ok(result) = result_rx.recv() {
        stats.record(&result);
        if result.matched {
            retained.push((result.index, result.product));
        }
        if stats.processed.is_multiple_of(ProgressConsts::PROGRESS_INTERVAL) {
            let update = ProgressUpdate {
                processed: stats.processed,
                total,
            };
            match on_progress {
                Some(cb) => cb(update),
                None => info!("Progress: {}/{} products processed", update.processed, total),
            }
        }
    }

    if preserve_order {
        retained.sort_unstable_by_key(|(index, _)| *index);
    }
    let retained = retained.into_iter().map(|(_, p)| p).collect();
    (retained, stats)
}
