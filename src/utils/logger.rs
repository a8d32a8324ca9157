//! CLI log format. Info lines read `[metasift] msg`; warnings and errors also carry the level
//! and the module that raised them (`[metasift WARN pipeline::worker] msg`).

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter, Record};
use std::io::Write;

const CRATE: &str = env!("CARGO_PKG_NAME");

/// Level for this crate's own records. Dependencies stay at warn.
pub fn crate_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Module path relative to the crate: `metasift::pipeline::worker` → `pipeline::worker`.
fn module_of(target: &str) -> &str {
    target
        .strip_prefix(CRATE)
        .map(|rest| rest.trim_start_matches("::"))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(target)
}

/// One log line without the trailing newline.
pub fn render_line(record: &Record) -> String {
    let tag = CRATE.cyan();
    let msg = record.args().to_string();
    let level = match record.level() {
        Level::Info => return format!("[{tag}] {msg}"),
        Level::Debug => return format!("[{tag}] {}", msg.dimmed()),
        Level::Error => "ERROR".red().bold(),
        Level::Warn => "WARN".yellow(),
        Level::Trace => "TRACE".dimmed(),
    };
    format!("[{tag} {level} {}] {msg}", module_of(record.target()).white())
}

/// Install the env_logger formatter. `RUST_LOG`, when set, overrides the default filters.
/// Uses `try_init` so a second call, or a logger the caller already installed, is left alone.
pub fn setup_logging(verbose: bool) {
    let _ = Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module(CRATE, crate_level(verbose))
        .parse_env("RUST_LOG")
        .format(|buf, record| writeln!(buf, "{}", render_line(record)))
        .try_init();
}
