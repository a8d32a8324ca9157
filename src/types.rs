//! Public and internal types for the metasift API and pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PipelineError, RemoteLookupError};
use crate::utils::config::PipelineDefaults;

/// One metafield attached to a product: `namespace.key = value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafield {
    pub namespace: String,
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A product as fetched from the store. Never mutated once it enters the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub metafields: Vec<Metafield>,
}

impl ProductRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            metafields: Vec::new(),
        }
    }

    /// Builder-style helper, mostly for fixtures.
    pub fn with_metafield(
        mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.metafields.push(Metafield {
            namespace: namespace.into(),
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// True when a metafield matches both namespace and key and its value is non-empty.
    pub fn has_metafield(&self, key: &NamespaceKey) -> bool {
        self.metafields
            .iter()
            .any(|m| m.namespace == key.namespace && m.key == key.key && !m.value.is_empty())
    }
}

/// Parsed `"<namespace>.<key>"` filter, e.g. `product_tab.details`.
///
/// Exactly one `.` is allowed and neither half may be empty. Parsing happens once,
/// before the pipeline starts; workers only ever see a valid key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamespaceKey {
    pub namespace: String,
    pub key: String,
}

impl NamespaceKey {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }
}

impl FromStr for NamespaceKey {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(key), None) if !namespace.is_empty() && !key.is_empty() => {
                Ok(Self::new(namespace, key))
            }
            _ => Err(PipelineError::InvalidNamespaceKey(s.to_string())),
        }
    }
}

impl TryFrom<&str> for NamespaceKey {
    type Error = PipelineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for NamespaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.key)
    }
}

/// Worker-pool tuning. Built once (defaults → file → env → CLI) and passed by value into the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcurrencyConfig {
    /// Number of worker threads, i.e. the cap on concurrent outbound lookups. Must be ≥ 1.
    pub max_workers: usize,
    /// Delay each worker waits after finishing an item. Global call rate ≈ `max_workers / rate_limit`.
    pub rate_limit: Duration,
    /// Capacity of the item and result queues (backpressure bound), not a split size.
    /// Zero makes both queues rendezvous channels: every send waits for a receiver.
    pub batch_size: usize,
    /// Sort retained products back into input order after draining.
    pub preserve_order: bool,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_workers: PipelineDefaults::MAX_WORKERS,
            rate_limit: Duration::from_millis(PipelineDefaults::RATE_LIMIT_MS),
            batch_size: PipelineDefaults::BATCH_SIZE,
            preserve_order: false,
        }
    }
}

impl ConcurrencyConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_workers == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A product on its way to a worker, tagged with its position in the input.
#[derive(Clone, Debug)]
pub struct WorkItem {
    pub index: usize,
    pub product: Arc<ProductRecord>,
}

/// Outcome of checking one product. Produced by a worker, consumed once by the collector.
#[derive(Clone, Debug)]
pub struct ProcessResult {
    pub index: usize,
    pub product: Arc<ProductRecord>,
    /// Predicate outcome. Always false when `lookup_error` is set.
    pub matched: bool,
    pub worker_id: usize,
    /// Time spent in the lookup call (rate-limit sleep excluded).
    pub elapsed: Duration,
    pub lookup_error: Option<RemoteLookupError>,
}

/// A lookup that failed and was counted as "metafield absent".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupFailure {
    pub product_id: String,
    pub message: String,
}

/// Aggregate counters, owned by the collector and published after the result queue closes.
#[derive(Clone, Debug, Default)]
pub struct PipelineStats {
    pub processed: usize,
    pub retained: usize,
    pub lookup_failures: usize,
    pub failures: Vec<LookupFailure>,
    /// Sum of per-item lookup durations.
    pub total_duration: Duration,
    /// Items processed per worker id.
    pub per_worker: BTreeMap<usize, usize>,
    /// Wall-clock time from start to drain.
    pub wall_clock: Duration,
}

impl PipelineStats {
    pub fn record(&mut self, result: &ProcessResult) {
        self.processed += 1;
        self.total_duration += result.elapsed;
        *self.per_worker.entry(result.worker_id).or_insert(0) += 1;
        if result.matched {
            self.retained += 1;
        }
        if let Some(err) = &result.lookup_error {
            self.lookup_failures += 1;
            self.failures.push(LookupFailure {
                product_id: result.product.id.clone(),
                message: err.to_string(),
            });
        }
    }

    /// Mean lookup duration; zero when nothing was processed.
    pub fn average_duration(&self) -> Duration {
        match u32::try_from(self.processed) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_duration / n,
            Err(_) => Duration::from_secs_f64(
                self.total_duration.as_secs_f64() / self.processed as f64,
            ),
        }
    }
}

/// What a pipeline run returns: retained products plus stats. `total` is the input length.
#[derive(Clone, Debug, Default)]
pub struct FilterOutcome {
    pub retained: Vec<Arc<ProductRecord>>,
    pub stats: PipelineStats,
    pub total: usize,
}

impl FilterOutcome {
    /// Retained product ids, in retained order.
    pub fn retained_ids(&self) -> Vec<&str> {
        self.retained.iter().map(|p| p.id.as_str()).collect()
    }
}

/// Advisory progress notification emitted by the collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub processed: usize,
    pub total: usize,
}

/// Full options for the CLI run. Library callers use [`ConcurrencyConfig`] directly.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// JSON export to read products from.
    pub products_path: PathBuf,
    /// Raw `"<namespace>.<key>"`; parsed right before the run.
    pub namespace_key: String,
    pub concurrency: ConcurrencyConfig,
    /// Abort the run after this long (cancels the shared token).
    pub timeout: Option<Duration>,
    /// Debug logging and progress bar.
    pub verbose: bool,
    /// Print each retained product.
    pub list_products: bool,
}
