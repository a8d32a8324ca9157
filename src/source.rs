//! Collaborators at the pipeline's edges: where products come from and how a metafield is checked.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{RemoteFetchError, RemoteLookupError};
use crate::{Metafield, NamespaceKey, ProductRecord};

/// Yields the full, ordered product list.
pub trait ProductSource {
    fn list_all(&self) -> Result<Vec<ProductRecord>, RemoteFetchError>;
}

/// Answers "does this product carry a non-empty `namespace.key` metafield?".
///
/// Called concurrently from every worker thread, so implementations must be `Send + Sync`.
/// Errors are absorbed by the worker (counted, treated as absent).
pub trait MetafieldLookup: Send + Sync {
    fn has_metafield(&self, product_id: &str, key: &NamespaceKey)
    -> Result<bool, RemoteLookupError>;
}

impl<F> MetafieldLookup for F
where
    F: Fn(&str, &NamespaceKey) -> Result<bool, RemoteLookupError> + Send + Sync,
{
    fn has_metafield(
        &self,
        product_id: &str,
        key: &NamespaceKey,
    ) -> Result<bool, RemoteLookupError> {
        self(product_id, key)
    }
}

/// In-memory product list.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    products: Vec<ProductRecord>,
}

impl StaticSource {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }
}

impl ProductSource for StaticSource {
    fn list_all(&self) -> Result<Vec<ProductRecord>, RemoteFetchError> {
        Ok(self.products.clone())
    }
}

/// Accepts either a bare array or an export wrapped as `{"products": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductExport {
    Bare(Vec<ProductRecord>),
    Wrapped { products: Vec<ProductRecord> },
}

/// Products read from a JSON export on disk.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse a JSON product export (bare array or `{"products": [...]}`).
pub fn parse_product_export(json: &str) -> Result<Vec<ProductRecord>, RemoteFetchError> {
    let export: ProductExport = serde_json::from_str(json)
        .map_err(|e| RemoteFetchError(format!("invalid product export: {e}")))?;
    Ok(match export {
        ProductExport::Bare(products) => products,
        ProductExport::Wrapped { products } => products,
    })
}

impl ProductSource for JsonFileSource {
    fn list_all(&self) -> Result<Vec<ProductRecord>, RemoteFetchError> {
        let s = std::fs::read_to_string(&self.path)
            .map_err(|e| RemoteFetchError(format!("{}: {}", self.path.display(), e)))?;
        parse_product_export(&s)
            .map_err(|e| RemoteFetchError(format!("{}: {}", self.path.display(), e.0)))
    }
}

/// Lookup backed by a product-id → metafields map, e.g. built from the same export the products came from.
///
/// An id that is not in the catalog fails the lookup, the way a per-product fetch would.
#[derive(Clone, Debug, Default)]
pub struct CatalogLookup {
    metafields: HashMap<String, Vec<Metafield>>,
}

impl CatalogLookup {
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a ProductRecord>,
    {
        let metafields = products
            .into_iter()
            .map(|p| (p.id.clone(), p.metafields.clone()))
            .collect();
        Self { metafields }
    }

    pub fn len(&self) -> usize {
        self.metafields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metafields.is_empty()
    }
}

impl MetafieldLookup for CatalogLookup {
    fn has_metafield(
        &self,
        product_id: &str,
        key: &NamespaceKey,
    ) -> Result<bool, RemoteLookupError> {
        let fields = self
            .metafields
            .get(product_id)
            .ok_or_else(|| RemoteLookupError(format!("product {product_id} not found")))?;
        Ok(fields
            .iter()
            .any(|m| m.namespace == key.namespace && m.key == key.key && !m.value.is_empty()))
    }
}
