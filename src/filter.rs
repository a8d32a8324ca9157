//! CLI run: load products, wire Ctrl+C and progress, run the pipeline.

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

use crate::engine::progress::{flush_progress_remainder, progress_callback, setup_progress};
use crate::pipeline::{CancelToken, Pipeline, list_lookup_failures};
use crate::source::{CatalogLookup, JsonFileSource, MetafieldLookup, ProductSource};
use crate::utils::config::ProgressConsts;
use crate::{FilterOutcome, NamespaceKey, Opts, PipelineError};

/// Result of a CLI run: the outcome, and whether it was cut short by Ctrl+C or the timeout.
pub struct FilterRun {
    pub outcome: FilterOutcome,
    pub cancelled: bool,
}

fn cancel_token_for(opts: &Opts) -> Result<CancelToken> {
    let cancel = match opts.timeout {
        Some(t) => CancelToken::with_timeout(t),
        None => CancelToken::new(),
    };
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("set Ctrl+C handler")?;
    Ok(cancel)
}

/// Filter the products in `opts.products_path` by `opts.namespace_key`.
/// Lookups are answered from the metafields in the same export.
pub fn filter_products_with_opts(opts: &Opts) -> Result<FilterRun> {
    let key: NamespaceKey = opts.namespace_key.parse()?;
    opts.concurrency.validate()?;

    let source = JsonFileSource::new(opts.products_path.clone());
    info!("Fetching all products from {}...", source.path().display());
    let products = source.list_all()?;
    info!("Successfully fetched {} total products", products.len());

    let lookup: Arc<dyn MetafieldLookup> = Arc::new(CatalogLookup::from_products(&products));
    let cancel = cancel_token_for(opts)?;
    let bar = setup_progress(opts.verbose, products.len());

    let mut pipeline = Pipeline::new(opts.concurrency.clone()).with_cancel_token(cancel);
    if let Some(bar) = bar.as_ref() {
        pipeline = pipeline.with_progress(progress_callback(bar));
    }

    let (outcome, cancelled) = match pipeline.start(products, &key, lookup) {
        Ok(outcome) => (outcome, false),
        Err(PipelineError::Cancelled { partial }) => (*partial, true),
        Err(e) => return Err(e.into()),
    };
    flush_progress_remainder(
        bar.as_ref(),
        outcome.stats.processed,
        ProgressConsts::PROGRESS_INTERVAL,
    );
    if bar.is_some() {
        eprintln!();
    }
    if opts.verbose {
        list_lookup_failures(&outcome.stats);
    }
    Ok(FilterRun { outcome, cancelled })
}
