use log::warn;

use crate::PipelineStats;

/// Warn once with the count of absorbed lookup failures. Called by the coordinator after every run.
pub fn report_lookup_failures(stats: &PipelineStats) {
    if stats.lookup_failures == 0 {
        return;
    }
    warn!(
        "{} of {} metafield lookups failed and were counted as absent",
        stats.lookup_failures, stats.processed
    );
}

/// Print each failed product id and its error to stderr (verbose CLI runs).
pub fn list_lookup_failures(stats: &PipelineStats) {
    for f in &stats.failures {
        eprintln!("  failed: {} ({})", f.product_id, f.message);
    }
}
