//! CLI command handler: layer settings, run the filter, print what was kept.

use anyhow::{Result, bail};
use colored::Colorize;
use log::debug;
use std::path::Path;
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::filter::{FilterRun, filter_products_with_opts};
use crate::utils::{
    apply_env_to_opts, apply_file_to_opts, load_dotenv, load_settings_toml, setup_logging,
};
use crate::{FilterOutcome, Opts};

/// Overwrite opts field from a CLI flag when given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $cli_field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $cli.$cli_field {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Defaults → `.metasift.toml` → `.env` / `METASIFT_*` → CLI flags.
pub fn build_opts(cli: &Cli, dir: &Path) -> Result<Opts> {
    let mut opts = Opts {
        products_path: cli.products_path_or_default(),
        ..Default::default()
    };
    if let Some(file) = load_settings_toml(dir) {
        apply_file_to_opts(&file, &mut opts);
    }
    load_dotenv(dir);
    apply_env_to_opts(&mut opts)?;

    if let Some(ref p) = cli.products {
        opts.products_path = p.clone();
    }
    if let Some(ref k) = cli.key {
        opts.namespace_key = k.clone();
    }
    apply_cli_opt!(cli, opts, workers => concurrency.max_workers);
    if let Some(ms) = cli.rate_limit_ms {
        opts.concurrency.rate_limit = Duration::from_millis(ms);
    }
    apply_cli_opt!(cli, opts, batch_size => concurrency.batch_size);
    if let Some(secs) = cli.timeout_secs {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    apply_cli_opt!(cli, opts, ordered => concurrency.preserve_order);
    apply_cli_opt!(cli, opts, list => list_products);
    apply_cli_opt!(cli, opts, verbose => verbose);
    Ok(opts)
}

/// Print retained products as `i. Product: <title> (ID: <id>)`.
fn print_retained(outcome: &FilterOutcome) {
    for (i, product) in outcome.retained.iter().enumerate() {
        println!("{}. Product: {} (ID: {})", i + 1, product.title, product.id);
    }
}

fn print_summary(outcome: &FilterOutcome, key: &str) {
    let stats = &outcome.stats;
    println!(
        "{} | {} | {} | avg {:?} | {:?} total",
        format!("Processed: {}/{}", stats.processed, outcome.total).cyan(),
        format!("With {}: {}", key, stats.retained).green(),
        format!("Lookup failures: {}", stats.lookup_failures).yellow(),
        stats.average_duration(),
        stats.wall_clock,
    );
}

/// Run the filter with layered options and print results.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let opts = build_opts(cli, &cwd)?;
    setup_logging(opts.verbose);
    debug!("{:#?}", opts);
    if opts.namespace_key.is_empty() {
        bail!("no metafield key given; pass --key <namespace>.<key> or set METASIFT_NAMESPACE_KEY");
    }

    let FilterRun { outcome, cancelled } = filter_products_with_opts(&opts)?;
    if opts.list_products {
        print_retained(&outcome);
    }
    print_summary(&outcome, &opts.namespace_key);
    if cancelled {
        bail!(
            "run cancelled after {} of {} products; results above are partial",
            outcome.stats.processed,
            outcome.total
        );
    }
    Ok(())
}
