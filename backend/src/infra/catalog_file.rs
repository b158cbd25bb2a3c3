use std::fs;
use std::path::Path;

use crate::core::catalog::{Catalog, CatalogError};
use crate::core::models::Product;

/// Reads a JSON array of products and validates it into a [`Catalog`].
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = fs::read_to_string(path)?;
    parse_catalog(&raw)
}

pub fn parse_catalog(raw: &str) -> Result<Catalog, CatalogError> {
    let products: Vec<Product> = serde_json::from_str(raw)?;
    Catalog::new(products)
}
