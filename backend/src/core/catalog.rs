use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::core::models::Product;

/// Cap applied when the filters are cleared.
pub const DEFAULT_MAX_PRICE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Upper bound of the max-price slider.
pub const MAX_PRICE_CEILING: Decimal = Decimal::from_parts(2000, 0, 0, false, 0);

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse failure: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate product id {0}")]
    DuplicateId(u32),

    #[error("Product {0} has a negative price")]
    NegativePrice(u32),
}

/// Current search text, artist filter and price cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_text: String,
    pub artist_filter: String,
    pub max_price: Decimal,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            artist_filter: String::new(),
            max_price: DEFAULT_MAX_PRICE,
        }
    }
}

impl FilterCriteria {
    pub fn set_search(&mut self, text: &str) {
        self.search_text = text.to_string();
    }

    /// An empty name selects every artist.
    pub fn set_artist(&mut self, artist: &str) {
        self.artist_filter = artist.to_string();
    }

    pub fn set_max_price(&mut self, max_price: Decimal) {
        self.max_price = max_price.clamp(Decimal::ZERO, MAX_PRICE_CEILING);
    }

    /// Applies raw slider/text input. Unparsable input keeps the current cap.
    pub fn set_max_price_input(&mut self, raw: &str) {
        match Decimal::from_str(raw.trim()) {
            Ok(v) => self.set_max_price(v),
            Err(_) => tracing::debug!(raw, "ignoring unparsable max price"),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if !self.search_text.is_empty()
            && !product.search_text().contains(&self.search_text.to_lowercase())
        {
            return false;
        }
        if !self.artist_filter.is_empty() && product.artist != self.artist_filter {
            return false;
        }
        product.price <= self.max_price
    }
}

/// Products passing `criteria`, in catalog order.
pub fn filter<'a>(products: &'a [Product], criteria: &FilterCriteria) -> Vec<&'a Product> {
    products.iter().filter(|p| criteria.matches(p)).collect()
}

/// Distinct artist names in first-seen order.
pub fn artists(products: &[Product]) -> Vec<&str> {
    let mut seen = HashSet::new();
    products
        .iter()
        .map(|p| p.artist.as_str())
        .filter(|a| seen.insert(*a))
        .collect()
}

/// The immutable product list the storefront sells from.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        for p in &products {
            if !ids.insert(p.id) {
                return Err(CatalogError::DuplicateId(p.id));
            }
            if p.price.is_sign_negative() && !p.price.is_zero() {
                return Err(CatalogError::NegativePrice(p.id));
            }
        }
        Ok(Self { products })
    }

    /// The house selection shipped with the store.
    pub fn builtin() -> Self {
        let products = vec![
            Product::new(
                1,
                "Abbey Road",
                "The Beatles",
                Decimal::new(2999, 2),
                "Edición clásica remasterizada",
            )
            .with_img("images/thebeatles.jpg"),
            Product::new(
                2,
                "Dark Side of the Moon",
                "Pink Floyd",
                Decimal::new(2499, 2),
                "Vinilo 180g edición 50 aniversario",
            )
            .with_img("images/pinkfloyd.png"),
            Product::new(
                3,
                "Back in Black",
                "AC/DC",
                Decimal::new(1999, 2),
                "Portada icónica, excelente estado",
            )
            .with_img("images/AC.png"),
            Product::new(4, "Rumours", "Fleetwood Mac", Decimal::new(2199, 2), "Pressing original")
                .with_img("images/fleetwood.jpg"),
        ];
        Self { products }
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&Product> {
        filter(&self.products, criteria)
    }

    pub fn artists(&self) -> Vec<&str> {
        artists(&self.products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Product> {
        vec![
            Product::new(1, "A", "X", Decimal::from(10), "first pressing"),
            Product::new(2, "B", "Y", Decimal::from(20), "Gatefold"),
            Product::new(3, "C", "X", Decimal::from(1000), ""),
        ]
    }

    fn ids(products: &[&Product]) -> Vec<u32> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_default_criteria_returns_full_catalog() {
        let products = sample();
        let out = filter(&products, &FilterCriteria::default());
        assert_eq!(ids(&out), vec![1, 2, 3]);
    }

    #[test]
    fn test_artist_filter_is_exact() {
        let products = sample();
        let mut criteria = FilterCriteria::default();
        criteria.set_artist("Y");
        assert_eq!(ids(&filter(&products, &criteria)), vec![2]);

        criteria.set_artist("y");
        assert!(filter(&products, &criteria).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let products = sample();
        let mut criteria = FilterCriteria::default();
        criteria.set_search("GATEFOLD");
        assert_eq!(ids(&filter(&products, &criteria)), vec![2]);

        criteria.set_search("x");
        assert_eq!(ids(&filter(&products, &criteria)), vec![1, 3]);
    }

    #[test]
    fn test_max_price_is_inclusive() {
        let products = sample();
        let mut criteria = FilterCriteria::default();
        assert_eq!(ids(&filter(&products, &criteria)), vec![1, 2, 3]);

        criteria.set_max_price(Decimal::from(20));
        assert_eq!(ids(&filter(&products, &criteria)), vec![1, 2]);
    }

    #[test]
    fn test_filter_preserves_order_and_is_subset() {
        let products = sample();
        let mut criteria = FilterCriteria::default();
        criteria.set_search("first");
        criteria.set_max_price(Decimal::from(500));
        let out = filter(&products, &criteria);
        assert_eq!(ids(&out), vec![1]);
        assert!(out.iter().all(|p| products.contains(*p)));
    }

    #[test]
    fn test_max_price_input_is_lenient() {
        let mut criteria = FilterCriteria::default();
        criteria.set_max_price_input("abc");
        assert_eq!(criteria.max_price, DEFAULT_MAX_PRICE);

        criteria.set_max_price_input(" 25.5 ");
        assert_eq!(criteria.max_price, Decimal::new(255, 1));

        criteria.set_max_price_input("-3");
        assert_eq!(criteria.max_price, Decimal::ZERO);

        criteria.set_max_price_input("99999");
        assert_eq!(criteria.max_price, MAX_PRICE_CEILING);
    }

    #[test]
    fn test_clear_restores_defaults() {
        let mut criteria = FilterCriteria::default();
        criteria.set_search("abbey");
        criteria.set_artist("The Beatles");
        criteria.set_max_price(Decimal::from(5));
        assert!(!criteria.is_default());

        criteria.clear();
        assert!(criteria.is_default());
        assert_eq!(criteria.max_price, Decimal::from(1000));
    }

    #[test]
    fn test_artists_first_seen_order() {
        let products = sample();
        assert_eq!(artists(&products), vec!["X", "Y"]);
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let mut products = sample();
        products.push(Product::new(2, "Dup", "Z", Decimal::ONE, ""));
        assert!(matches!(Catalog::new(products), Err(CatalogError::DuplicateId(2))));
    }

    #[test]
    fn test_catalog_rejects_negative_price() {
        let products = vec![Product::new(9, "Bad", "Z", Decimal::from(-1), "")];
        assert!(matches!(Catalog::new(products), Err(CatalogError::NegativePrice(9))));
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 4);
        assert_eq!(
            catalog.artists(),
            vec!["The Beatles", "Pink Floyd", "AC/DC", "Fleetwood Mac"]
        );
        assert_eq!(catalog.get(3).map(|p| p.title.as_str()), Some("Back in Black"));
        assert!(catalog.get(42).is_none());

        let mut criteria = FilterCriteria::default();
        criteria.set_search("floyd");
        assert_eq!(ids(&catalog.filter(&criteria)), vec![2]);
    }
}
