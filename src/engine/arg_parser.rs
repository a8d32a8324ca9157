use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const PRODUCTS: &'static str = "products.json";
}

/// Concurrent metafield filter over a product catalog export.
#[derive(Clone, Parser)]
#[command(name = "metasift")]
#[command(about = "Keep the products that carry a non-empty <namespace>.<key> metafield.")]
pub struct Cli {
    /// Product export (JSON array or {"products": [...]}). Default: products.json.
    #[arg(value_name = "PRODUCTS")]
    pub products: Option<PathBuf>,

    /// Metafield to filter on, as <namespace>.<key> (e.g. product_tab.details).
    #[arg(long, short = 'k')]
    pub key: Option<String>,

    /// Number of concurrent workers (lookups in flight).
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Per-worker delay between lookups, in milliseconds.
    #[arg(long, short = 'r', value_parser = clap::value_parser!(u64))]
    pub rate_limit_ms: Option<u64>,

    /// Item/result queue capacity.
    #[arg(long, short = 'b', value_parser = clap::value_parser!(usize))]
    pub batch_size: Option<usize>,

    /// Abort after this many seconds; partial results are reported.
    #[arg(long, short = 't', value_parser = clap::value_parser!(u64))]
    pub timeout_secs: Option<u64>,

    /// Keep retained products in input order.
    #[arg(long, short = 'o', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub ordered: Option<bool>,

    /// List each retained product.
    #[arg(long, short = 'l', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub list: Option<bool>,

    /// Verbose output (debug logs and progress bar).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

impl Cli {
    /// Products path, falling back to `products.json` in the working directory.
    pub fn products_path_or_default(&self) -> PathBuf {
        self.products
            .clone()
            .unwrap_or_else(|| PathBuf::from(DefaultArgs::PRODUCTS))
    }
}
