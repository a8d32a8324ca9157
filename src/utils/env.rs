//! Environment overrides: `../.env` then `.env` (both optional) → `METASIFT_*` variables.
//! Read once at the CLI edge and folded into [`Opts`]; the pipeline never reads the environment.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

/// Load `.env` files from `dir` and its parent into the process environment. Missing files are fine.
pub fn load_dotenv(dir: &Path) {
    for path in [dir.join("..").join(".env"), dir.join(".env")] {
        if path.is_file() {
            match dotenvy::from_path(&path) {
                Ok(()) => debug!("Loaded {}", path.display()),
                Err(e) => log::warn!("{}: {}", path.display(), e),
            }
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    let var = PackagePaths::get().env_var(name);
    std::env::var(&var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parsed<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_value(name)
        .map(|s| {
            s.parse::<T>()
                .with_context(|| format!("parse {}", PackagePaths::get().env_var(name)))
        })
        .transpose()
}

/// Apply `METASIFT_*` overrides to opts. Call after the settings file and before CLI flags.
pub fn apply_env_to_opts(opts: &mut Opts) -> Result<()> {
    if let Some(key) = env_value("NAMESPACE_KEY") {
        opts.namespace_key = key;
    }
    if let Some(n) = env_parsed::<usize>("MAX_WORKERS")? {
        opts.concurrency.max_workers = n;
    }
    if let Some(ms) = env_parsed::<u64>("RATE_LIMIT_MS")? {
        opts.concurrency.rate_limit = Duration::from_millis(ms);
    }
    if let Some(n) = env_parsed::<usize>("BATCH_SIZE")? {
        opts.concurrency.batch_size = n;
    }
    Ok(())
}
