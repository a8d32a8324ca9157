use metasift::source::parse_product_export;
use metasift::utils::{apply_file_to_opts, parse_settings_toml};
use metasift::{
    CatalogLookup, ConcurrencyConfig, MetafieldLookup, NamespaceKey, Opts, PipelineError,
    PipelineStats, ProcessResult, ProductRecord, ProductSource, RemoteLookupError, StaticSource,
};
use std::sync::Arc;
use std::time::Duration;

fn details() -> NamespaceKey {
    NamespaceKey::new("product_tab", "details")
}

// --- NamespaceKey ---

#[test]
fn test_namespace_key_parses_single_dot() {
    let key: NamespaceKey = "product_tab.details".parse().unwrap();
    assert_eq!(key.namespace, "product_tab");
    assert_eq!(key.key, "details");
    assert_eq!(key.to_string(), "product_tab.details");
}

#[test]
fn test_namespace_key_rejects_no_dot() {
    let err = "badkey".parse::<NamespaceKey>().unwrap_err();
    assert!(matches!(err, PipelineError::InvalidNamespaceKey(ref s) if s == "badkey"));
}

#[test]
fn test_namespace_key_rejects_two_dots() {
    assert!(matches!(
        NamespaceKey::try_from("a.b.c"),
        Err(PipelineError::InvalidNamespaceKey(_))
    ));
}

#[test]
fn test_namespace_key_rejects_empty_halves() {
    for bad in [".details", "product_tab.", ".", ""] {
        assert!(
            bad.parse::<NamespaceKey>().is_err(),
            "{bad:?} should be rejected"
        );
    }
}

// --- ConcurrencyConfig ---

#[test]
fn test_config_default_is_valid() {
    let config = ConcurrencyConfig::default();
    assert!(config.validate().is_ok());
    assert!(config.max_workers >= 1);
    assert!(!config.preserve_order);
}

#[test]
fn test_config_zero_workers_invalid() {
    let config = ConcurrencyConfig {
        max_workers: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(PipelineError::InvalidConfig(_))
    ));
}

#[test]
fn test_config_zero_batch_size_is_valid() {
    let config = ConcurrencyConfig {
        batch_size: 0,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

// --- ProductRecord::has_metafield ---

#[test]
fn test_has_metafield_requires_namespace_key_and_value() {
    let p = ProductRecord::new("1", "Shirt").with_metafield("product_tab", "details", "Cotton");
    assert!(p.has_metafield(&details()));
    assert!(!p.has_metafield(&NamespaceKey::new("product_tab", "care")));
    assert!(!p.has_metafield(&NamespaceKey::new("other", "details")));
}

#[test]
fn test_has_metafield_empty_value_is_absent() {
    let p = ProductRecord::new("1", "Shirt").with_metafield("product_tab", "details", "");
    assert!(!p.has_metafield(&details()));
}

// --- PipelineStats ---

fn result(id: &str, matched: bool, worker_id: usize, ms: u64) -> ProcessResult {
    ProcessResult {
        index: 0,
        product: Arc::new(ProductRecord::new(id, id)),
        matched,
        worker_id,
        elapsed: Duration::from_millis(ms),
        lookup_error: None,
    }
}

#[test]
fn test_stats_average_of_empty_is_zero() {
    let stats = PipelineStats::default();
    assert_eq!(stats.average_duration(), Duration::ZERO);
}

#[test]
fn test_stats_record_counts_and_average() {
    let mut stats = PipelineStats::default();
    stats.record(&result("a", true, 0, 10));
    stats.record(&result("b", false, 1, 30));
    stats.record(&result("c", true, 0, 20));
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.retained, 2);
    assert_eq!(stats.lookup_failures, 0);
    assert_eq!(stats.total_duration, Duration::from_millis(60));
    assert_eq!(stats.average_duration(), Duration::from_millis(20));
    assert_eq!(stats.per_worker.get(&0), Some(&2));
    assert_eq!(stats.per_worker.get(&1), Some(&1));
}

#[test]
fn test_stats_record_lookup_failure() {
    let mut stats = PipelineStats::default();
    let mut r = result("x", false, 2, 5);
    r.lookup_error = Some(RemoteLookupError("timeout".to_string()));
    stats.record(&r);
    assert_eq!(stats.lookup_failures, 1);
    assert_eq!(stats.failures[0].product_id, "x");
    assert!(stats.failures[0].message.contains("timeout"));
}

// --- sources / lookups ---

#[test]
fn test_parse_export_bare_array() {
    let json = r#"[
        {"id": "gid://shopify/Product/1", "title": "Shirt",
         "metafields": [{"namespace": "product_tab", "key": "details", "value": "Cotton"}]},
        {"id": "gid://shopify/Product/2", "title": "Hat"}
    ]"#;
    let products = parse_product_export(json).unwrap();
    assert_eq!(products.len(), 2);
    assert!(products[0].has_metafield(&details()));
    assert!(products[1].metafields.is_empty());
}

#[test]
fn test_parse_export_wrapped() {
    let json = r#"{"products": [{"id": "1", "title": "Shirt"}]}"#;
    let products = parse_product_export(json).unwrap();
    assert_eq!(products[0].title, "Shirt");
}

#[test]
fn test_parse_export_invalid_is_fetch_error() {
    let err = parse_product_export("{not json").unwrap_err();
    assert!(err.to_string().contains("invalid product export"));
}

#[test]
fn test_json_file_source_missing_file() {
    let source = metasift::JsonFileSource::new("/nonexistent/products.json");
    assert!(source.list_all().is_err());
}

#[test]
fn test_static_source_preserves_order() {
    let products = vec![ProductRecord::new("1", "a"), ProductRecord::new("2", "b")];
    let listed = StaticSource::new(products.clone()).list_all().unwrap();
    assert_eq!(listed, products);
}

#[test]
fn test_catalog_lookup() {
    let products = vec![
        ProductRecord::new("1", "Shirt").with_metafield("product_tab", "details", "Cotton"),
        ProductRecord::new("2", "Hat"),
    ];
    let lookup = CatalogLookup::from_products(&products);
    assert_eq!(lookup.len(), 2);
    assert_eq!(lookup.has_metafield("1", &details()), Ok(true));
    assert_eq!(lookup.has_metafield("2", &details()), Ok(false));
    assert!(lookup.has_metafield("3", &details()).is_err());
}

#[test]
fn test_closure_is_a_lookup() {
    let lookup = |id: &str, _key: &NamespaceKey| -> Result<bool, RemoteLookupError> {
        Ok(id.starts_with('k'))
    };
    assert_eq!(lookup.has_metafield("keep", &details()), Ok(true));
    assert_eq!(lookup.has_metafield("drop", &details()), Ok(false));
}

// --- settings file ---

#[test]
fn test_settings_toml_applies_present_fields_only() {
    let file = parse_settings_toml(
        r#"
        [settings]
        key = "product_tab.details"
        workers = 8
        rate_limit_ms = 250
        ordered = true
        "#,
    )
    .unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.namespace_key, "product_tab.details");
    assert_eq!(opts.concurrency.max_workers, 8);
    assert_eq!(opts.concurrency.rate_limit, Duration::from_millis(250));
    assert!(opts.concurrency.preserve_order);
    assert_eq!(
        opts.concurrency.batch_size,
        ConcurrencyConfig::default().batch_size
    );
    assert_eq!(opts.timeout, None);
}

#[test]
fn test_settings_toml_empty_file_changes_nothing() {
    let file = parse_settings_toml("").unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.concurrency, ConcurrencyConfig::default());
}
