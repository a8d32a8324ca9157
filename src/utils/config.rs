//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    settings_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                settings_filename: format!(".{pkg}.toml"),
                env_prefix: format!("{}_", pkg.to_uppercase()),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// `.metasift.toml`, looked up in the working directory.
    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    /// Prefix for environment overrides, e.g. `METASIFT_`.
    pub fn env_var(&self, name: &str) -> String {
        format!("{}{}", self.env_prefix, name)
    }
}

// ---- Worker pool ----

/// Defaults for [`ConcurrencyConfig`](crate::ConcurrencyConfig).
pub struct PipelineDefaults;

impl PipelineDefaults {
    /// Concurrent lookups in flight.
    pub const MAX_WORKERS: usize = 5;
    /// Per-worker pause after each lookup (ms). 5 workers / 500 ms ≈ 10 calls/s.
    pub const RATE_LIMIT_MS: u64 = 500;
    /// Item and result queue capacity.
    pub const BATCH_SIZE: usize = 50;
}

// ---- Cancellation ----

/// How often blocked feeder/worker calls wake up to check the cancel token.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

// ---- Progress ----

pub struct ProgressConsts;

impl ProgressConsts {
    /// Emit a progress notification every this many processed items.
    pub const PROGRESS_INTERVAL: usize = 10;
}
