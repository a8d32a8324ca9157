//! Progress bar utilities for displaying processing status

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::ProgressUpdate;
use crate::utils::config::ProgressConsts;

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    /// Create a new progress bar configuration
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " products"
    )))
}

/// Update progress bar by `n`.
/// Uses try_lock so the collector never blocks on a contended bar.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Final progress update for the remainder after chunked updates.
/// Call once after the run with the processed count and the same `chunk_size`.
pub fn flush_progress_remainder(pb: Option<&ProgressBar>, processed: usize, chunk_size: usize) {
    if let Some(pb) = pb {
        let remaining = processed % chunk_size;
        if remaining > 0 {
            update_progress_bar(pb, remaining);
        }
    }
}

/// Collector callback that advances the bar one progress chunk per notification.
pub fn progress_callback(bar: &ProgressBar) -> impl Fn(ProgressUpdate) + Send + 'static {
    let bar = Arc::clone(bar);
    move |_update: ProgressUpdate| update_progress_bar(&bar, ProgressConsts::PROGRESS_INTERVAL)
}

/// Verbose runs get a percentage bar sized to the product count; otherwise none.
pub fn setup_progress(verbose: bool, total: usize) -> Option<ProgressBar> {
    verbose.then(|| {
        create_progress_bar(ProgressBarConfig::new(
            total,
            "Checking",
            Animation::Classic,
        ))
    })
}
