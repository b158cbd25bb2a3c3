use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::cart::{CartSummary, parse_qty};
use crate::core::catalog::FilterCriteria;
use crate::core::models::{CartLineItem, Product, format_money};

/// Flat JSON representation of a catalog product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiProduct {
    pub id: u32,
    pub title: String,
    pub artist: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Price rounded to two places for display.
    pub price_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl From<&Product> for ApiProduct {
    fn from(p: &Product) -> Self {
        ApiProduct {
            id: p.id,
            title: p.title.clone(),
            artist: p.artist.clone(),
            description: p.description.clone(),
            price: p.price,
            price_label: format_money(p.price),
            img: p.img.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiCartLine {
    pub id: u32,
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub qty: u32,
    pub subtotal: String,
}

impl From<&CartLineItem> for ApiCartLine {
    fn from(item: &CartLineItem) -> Self {
        ApiCartLine {
            id: item.id,
            title: item.title.clone(),
            artist: item.artist.clone(),
            img: item.img.clone(),
            price: item.price,
            qty: item.qty,
            subtotal: format_money(item.subtotal()),
        }
    }
}

/// Cart read view: rows newest first, badge count and formatted total.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiCart {
    pub items: Vec<ApiCartLine>,
    pub item_count: u64,
    pub total: String,
    pub can_checkout: bool,
}

impl From<CartSummary<'_>> for ApiCart {
    fn from(summary: CartSummary<'_>) -> Self {
        ApiCart {
            items: summary.items.iter().map(ApiCartLine::from).collect(),
            item_count: summary.item_count,
            total: format_money(summary.total),
            can_checkout: !summary.items.is_empty(),
        }
    }
}

// ── Filter criteria ──────────────────────────────────────────

/// Query-string form of [`FilterCriteria`]. Absent fields take their
/// cleared defaults; `max_price` is applied leniently.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ApiCriteria {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}

impl From<&ApiCriteria> for FilterCriteria {
    fn from(api: &ApiCriteria) -> Self {
        let mut criteria = FilterCriteria::default();
        criteria.set_search(&api.q);
        criteria.set_artist(&api.artist);
        if let Some(raw) = &api.max_price {
            criteria.set_max_price_input(raw);
        }
        criteria
    }
}

impl From<&FilterCriteria> for ApiCriteria {
    fn from(c: &FilterCriteria) -> Self {
        ApiCriteria {
            q: c.search_text.clone(),
            artist: c.artist_filter.clone(),
            max_price: Some(c.max_price.to_string()),
        }
    }
}

// ── Cart requests ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: u32,
}

/// `qty` may arrive as a number or as the raw text of an input box.
#[derive(Debug, Deserialize)]
pub struct SetQtyRequest {
    #[serde(default)]
    pub qty: serde_json::Value,
}

impl SetQtyRequest {
    pub fn qty(&self) -> i64 {
        match &self.qty {
            serde_json::Value::String(s) => parse_qty(s),
            serde_json::Value::Number(n) => parse_qty(&n.to_string()),
            _ => 1,
        }
    }
}
