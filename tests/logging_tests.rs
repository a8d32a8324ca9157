//! Log output: the line format, and the failure warning every pipeline run emits.
//!
//! Installs a capturing logger for the whole test binary, so it lives apart from the other tests.

use log::{Level, LevelFilter, Log, Metadata, Record};
use metasift::utils::{crate_level, render_line};
use metasift::{ConcurrencyConfig, NamespaceKey, ProductRecord, RemoteLookupError, filter_by_metafield};
use std::sync::{Arc, Mutex};
use std::time::Duration;

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

struct Capture;

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;

fn install_capture() {
    let _ = log::set_logger(&CAPTURE);
    log::set_max_level(LevelFilter::Debug);
}

fn warnings_containing(needle: &str) -> Vec<String> {
    RECORDS
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .filter(|(level, msg)| *level == Level::Warn && msg.contains(needle))
        .map(|(_, msg)| msg.clone())
        .collect()
}

// --- failure warning ---

#[test]
fn test_library_run_warns_about_lookup_failures() {
    install_capture();
    let products: Vec<ProductRecord> = (0..7)
        .map(|i| ProductRecord::new(format!("w{i}"), format!("Widget {i}")))
        .collect();
    let lookup = Arc::new(|id: &str, _key: &NamespaceKey| -> Result<bool, RemoteLookupError> {
        if id == "w1" || id == "w3" || id == "w5" {
            Err(RemoteLookupError(format!("HTTP 429 for {id}")))
        } else {
            Ok(true)
        }
    });
    let config = ConcurrencyConfig {
        max_workers: 2,
        rate_limit: Duration::ZERO,
        batch_size: 4,
        preserve_order: false,
    };
    let outcome = filter_by_metafield(products, "product_tab.details", config, lookup).unwrap();
    assert_eq!(outcome.stats.lookup_failures, 3);

    let warned = warnings_containing("3 of 7 metafield lookups failed");
    assert_eq!(warned.len(), 1, "expected one failure warning, got {warned:?}");
}

#[test]
fn test_clean_run_has_no_failure_warning() {
    install_capture();
    let products: Vec<ProductRecord> = (0..11)
        .map(|i| ProductRecord::new(format!("c{i}"), format!("Clean {i}")))
        .collect();
    let lookup = Arc::new(|_id: &str, _key: &NamespaceKey| -> Result<bool, RemoteLookupError> {
        Ok(false)
    });
    let config = ConcurrencyConfig {
        rate_limit: Duration::ZERO,
        ..Default::default()
    };
    filter_by_metafield(products, "product_tab.details", config, lookup).unwrap();
    assert!(warnings_containing("of 11 metafield lookups failed").is_empty());
}

// --- line format ---

#[test]
fn test_info_line_has_crate_tag_only() {
    colored::control::set_override(false);
    let line = render_line(
        &Record::builder()
            .args(format_args!("Successfully fetched 3 total products"))
            .level(Level::Info)
            .target("metasift::filter")
            .build(),
    );
    assert_eq!(line, "[metasift] Successfully fetched 3 total products");
}

#[test]
fn test_warn_line_names_level_and_module() {
    colored::control::set_override(false);
    let line = render_line(
        &Record::builder()
            .args(format_args!("worker thread panicked"))
            .level(Level::Warn)
            .target("metasift::pipeline::orchestrator")
            .build(),
    );
    assert_eq!(line, "[metasift WARN pipeline::orchestrator] worker thread panicked");
}

#[test]
fn test_foreign_target_is_kept_whole() {
    colored::control::set_override(false);
    let line = render_line(
        &Record::builder()
            .args(format_args!("bad header"))
            .level(Level::Error)
            .target("dotenvy::parse")
            .build(),
    );
    assert_eq!(line, "[metasift ERROR dotenvy::parse] bad header");
}

#[test]
fn test_crate_level_follows_verbose() {
    assert_eq!(crate_level(false), LevelFilter::Info);
    assert_eq!(crate_level(true), LevelFilter::Debug);
}
