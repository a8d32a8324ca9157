use thiserror::Error;

use crate::FilterOutcome;

/// Listing products from the store failed. The pipeline never starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to fetch products: {0}")]
pub struct RemoteFetchError(pub String);

/// A single metafield lookup failed. Absorbed by the worker and counted in the stats.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("metafield lookup failed: {0}")]
pub struct RemoteLookupError(pub String);

/// Errors surfaced by the pipeline to its caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid concurrency config: {0}")]
    InvalidConfig(String),
    #[error("{0:?} is not a valid namespace key (expected '<namespace>.<key>')")]
    InvalidNamespaceKey(String),
    #[error(transparent)]
    RemoteFetch(#[from] RemoteFetchError),
    #[error(
        "pipeline cancelled after processing {} of {} products",
        .partial.stats.processed,
        .partial.total
    )]
    Cancelled { partial: Box<FilterOutcome> },
    #[error(
        "worker pool stopped early: {} of {} products processed",
        .partial.stats.processed,
        .partial.total
    )]
    WorkerFailed { partial: Box<FilterOutcome> },
    #[error("pipeline was already started; build a new one per run")]
    AlreadyStarted,
}

impl PipelineError {
    /// Partial results carried by a cancelled run or one whose workers died.
    pub fn partial_outcome(&self) -> Option<&FilterOutcome> {
        match self {
            PipelineError::Cancelled { partial } | PipelineError::WorkerFailed { partial } => {
                Some(&**partial)
            }
            _ => None,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
