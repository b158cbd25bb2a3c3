use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Product {
    pub id: u32,
    pub title: String,
    pub artist: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: Option<String>,
}

impl Product {
    pub fn new(id: u32, title: &str, artist: &str, price: Decimal, description: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            price,
            description: description.to_string(),
            img: None,
        }
    }

    pub fn with_img(mut self, img: &str) -> Self {
        self.img = Some(img.to_string());
        self
    }

    /// Lower-cased `title artist description`, the text free-text search runs against.
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.artist, self.description).to_lowercase()
    }
}

/// One cart row: the product's fields plus a quantity that never drops below 1.
///
/// Field order matches the persisted record layout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct CartLineItem {
    pub id: u32,
    pub title: String,
    pub artist: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default = "one", deserialize_with = "lenient_qty")]
    pub qty: u32,
}

impl CartLineItem {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            artist: product.artist.clone(),
            price: product.price,
            description: product.description.clone(),
            img: product.img.clone(),
            qty: 1,
        }
    }

    /// Returns a copy of this row carrying `qty`, floored at 1.
    pub fn with_qty(&self, qty: u32) -> Self {
        Self {
            qty: qty.max(1),
            ..self.clone()
        }
    }

    /// Saturates at the `Decimal` bounds instead of overflowing.
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.qty))
    }
}

fn one() -> u32 {
    1
}

// Hand-edited or foreign snapshots may carry 0, negatives or fractions.
fn lenient_qty<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_qty(raw.trunc() as i64))
}

/// Clamps any requested quantity into `1..=u32::MAX`.
pub fn clamp_qty(qty: i64) -> u32 {
    qty.clamp(1, u32::MAX as i64) as u32
}

/// Renders an amount with exactly two decimal places. Only used for display;
/// internal sums stay exact.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_search_text_is_lowercased_concatenation() {
        let p = Product::new(1, "Abbey Road", "The Beatles", price("29.99"), "Remastered");
        assert_eq!(p.search_text(), "abbey road the beatles remastered");
    }

    #[test]
    fn test_with_qty_floors_at_one() {
        let item = CartLineItem::from_product(&Product::new(1, "A", "X", price("10"), ""));
        assert_eq!(item.with_qty(0).qty, 1);
        assert_eq!(item.with_qty(7).qty, 7);
        // Original row is untouched.
        assert_eq!(item.qty, 1);
    }

    #[test]
    fn test_subtotal_is_exact() {
        let item = CartLineItem::from_product(&Product::new(1, "A", "X", price("0.10"), ""))
            .with_qty(3);
        assert_eq!(item.subtotal(), price("0.30"));
    }

    #[test]
    fn test_subtotal_saturates() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(20), 0);
        let item = CartLineItem::from_product(&Product::new(1, "A", "X", huge, ""))
            .with_qty(u32::MAX);
        assert_eq!(item.subtotal(), Decimal::MAX);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(price("40")), "40.00");
        assert_eq!(format_money(price("59.98")), "59.98");
        assert_eq!(format_money(price("1.005")), "1.01");
    }

    #[test]
    fn test_line_item_json_layout() {
        let item = CartLineItem::from_product(
            &Product::new(2, "Rumours", "Fleetwood Mac", price("21.99"), "Pressing original")
                .with_img("images/fleetwood.jpg"),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["price"], 21.99);
        assert_eq!(json["img"], "images/fleetwood.jpg");
        assert_eq!(json["qty"], 1);
    }

    #[test]
    fn test_lenient_qty_on_deserialize() {
        let raw = r#"{"id":1,"title":"A","artist":"X","price":10,"description":"","img":null,"qty":-4}"#;
        let item: CartLineItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.qty, 1);

        let raw = r#"{"id":1,"title":"A","artist":"X","price":10,"qty":2.7}"#;
        let item: CartLineItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.qty, 2);
        assert_eq!(item.description, "");
        assert_eq!(item.img, None);
    }

    #[test]
    fn test_clamp_qty() {
        assert_eq!(clamp_qty(0), 1);
        assert_eq!(clamp_qty(-5), 1);
        assert_eq!(clamp_qty(12), 12);
        assert_eq!(clamp_qty(i64::MAX), u32::MAX);
    }
}
