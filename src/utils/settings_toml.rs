//! Load `.metasift.toml` from a directory (CLI only). The library never reads it; callers pass a `ConcurrencyConfig`.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct SettingsToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    products: Option<String>,
    key: Option<String>,
    workers: Option<usize>,
    rate_limit_ms: Option<u64>,
    batch_size: Option<usize>,
    ordered: Option<bool>,
    timeout_secs: Option<u64>,
    list: Option<bool>,
    verbose: Option<bool>,
}

/// Parse settings text. Unknown keys are ignored.
pub fn parse_settings_toml(s: &str) -> Result<SettingsToml, toml::de::Error> {
    toml::from_str(s)
}

/// Load `.metasift.toml` from `dir` if present. Returns None if file missing or unreadable.
pub fn load_settings_toml(dir: &Path) -> Option<SettingsToml> {
    let path = dir.join(PackagePaths::get().settings_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_settings_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $sec.$sec_field {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Apply file settings to opts (only fields present in the file). Call before env and CLI.
pub fn apply_file_to_opts(file: &SettingsToml, opts: &mut Opts) {
    let sec = &file.settings;
    if let Some(ref p) = sec.products {
        opts.products_path = p.into();
    }
    if let Some(ref k) = sec.key {
        opts.namespace_key = k.clone();
    }
    apply_file_opt!(sec, opts, workers => concurrency.max_workers);
    if let Some(ms) = sec.rate_limit_ms {
        opts.concurrency.rate_limit = Duration::from_millis(ms);
    }
    apply_file_opt!(sec, opts, batch_size => concurrency.batch_size);
    apply_file_opt!(sec, opts, ordered => concurrency.preserve_order);
    if let Some(secs) = sec.timeout_secs {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    apply_file_opt!(sec, opts, list => list_products);
    apply_file_opt!(sec, opts, verbose => verbose);
}
