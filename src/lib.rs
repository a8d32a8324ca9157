//! Metasift: concurrent metafield filter over a product catalog.
//!
//! Products are fanned out to a fixed pool of rate-limited worker threads, each asking a
//! [`MetafieldLookup`] whether the product carries a non-empty `namespace.key` metafield.
//! Results are drained by a single collector into the retained set plus [`PipelineStats`].

pub mod engine;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod source;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::{PipelineError, PipelineResult, RemoteFetchError, RemoteLookupError};
pub use pipeline::{CancelToken, Pipeline, PipelineState};
pub use source::{CatalogLookup, JsonFileSource, MetafieldLookup, ProductSource, StaticSource};

use log::debug;
use std::sync::Arc;

/// Keep the products of `products` whose `namespace_key` metafield is present and non-empty.
///
/// `namespace_key` is parsed first (`"<namespace>.<key>"`); a malformed key or an invalid
/// `config` fails before any thread is spawned. Per-product lookup errors never fail the
/// call: they count as "absent" and show up in `stats.lookup_failures`.
pub fn filter_by_metafield(
    products: Vec<ProductRecord>,
    namespace_key: &str,
    config: ConcurrencyConfig,
    lookup: Arc<dyn MetafieldLookup>,
) -> PipelineResult<FilterOutcome> {
    let key: NamespaceKey = namespace_key.parse()?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        config
    );
    Pipeline::new(config).start(products, &key, lookup)
}

/// List every product from `source`, then filter like [`filter_by_metafield`].
///
/// Key and config are validated before the listing call; a listing failure is returned as
/// [`PipelineError::RemoteFetch`] and the pipeline never starts.
pub fn fetch_and_filter(
    source: &dyn ProductSource,
    namespace_key: &str,
    config: ConcurrencyConfig,
    lookup: Arc<dyn MetafieldLookup>,
) -> PipelineResult<FilterOutcome> {
    let key: NamespaceKey = namespace_key.parse()?;
    config.validate()?;
    let products = source.list_all()?;
    debug!("fetched {} products", products.len());
    Pipeline::new(config).start(products, &key, lookup)
}
