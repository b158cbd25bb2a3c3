use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::core::models::{CartLineItem, Product, clamp_qty};
use crate::core::storage::SlotStore;

/// Slot key the cart is stored under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Derived read view over the cart, recomputed on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary<'a> {
    pub items: &'a [CartLineItem],
    pub item_count: u64,
    pub total: Decimal,
}

/// The shopping cart: an ordered list of line items, newest first, written
/// through to a [`SlotStore`] after every effective mutation.
///
/// Construction hydrates from the slot. Missing or unreadable data yields an
/// empty cart instead of an error, so opening a store never fails.
pub struct CartStore<S: SlotStore> {
    items: Vec<CartLineItem>,
    slot: S,
    key: String,
}

impl<S: SlotStore> CartStore<S> {
    #[cfg(test)]
    pub fn open(slot: S) -> Self {
        Self::open_with_key(slot, DEFAULT_CART_KEY)
    }

    pub fn open_with_key(slot: S, key: &str) -> Self {
        let items = hydrate(&slot, key);
        info!(key, lines = items.len(), "cart hydrated");
        Self {
            items,
            slot,
            key: key.to_string(),
        }
    }

    /// Bumps the quantity of an existing row in place, or prepends a new row
    /// with quantity 1.
    pub fn add(&mut self, product: &Product) {
        match self.position(product.id) {
            Some(idx) => {
                let next = self.items[idx].qty.saturating_add(1);
                self.items[idx] = self.items[idx].with_qty(next);
            }
            None => self.items.insert(0, CartLineItem::from_product(product)),
        }
        debug!(id = product.id, "added to cart");
        self.persist();
    }

    /// Returns whether a row was removed. Absent ids are a no-op.
    pub fn remove(&mut self, id: u32) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.items.remove(idx);
        debug!(id, "removed from cart");
        self.persist();
        true
    }

    /// Replaces the row's quantity with `max(1, qty)`. Never deletes the row.
    /// Returns whether the id was present.
    pub fn set_qty(&mut self, id: u32, qty: i64) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.items[idx] = self.items[idx].with_qty(clamp_qty(qty));
        debug!(id, qty = self.items[idx].qty, "quantity set");
        self.persist();
        true
    }

    /// [`set_qty`](Self::set_qty) from raw user input; see [`parse_qty`].
    pub fn set_qty_input(&mut self, id: u32, raw: &str) -> bool {
        self.set_qty(id, parse_qty(raw))
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn get(&self, id: u32) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn can_checkout(&self) -> bool {
        !self.is_empty()
    }

    /// Saturating sum of line subtotals, so oversized rows can't panic a read.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartLineItem::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Sum of quantities, not the number of rows.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.qty)).sum()
    }

    pub fn summary(&self) -> CartSummary<'_> {
        CartSummary {
            items: &self.items,
            item_count: self.item_count(),
            total: self.total(),
        }
    }

    #[cfg(test)]
    pub fn slot(&self) -> &S {
        &self.slot
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    // Write failures leave the in-memory cart authoritative for the session.
    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.items) {
            Ok(j) => j,
            Err(e) => {
                error!("Cart serialization failed: {e}");
                return;
            }
        };
        if let Err(e) = self.slot.save(&self.key, &json) {
            error!(key = %self.key, "Cart save failed: {e}");
        }
    }
}

/// Lenient quantity parsing: anything non-numeric becomes 1, fractions are
/// truncated, and the result is floored at 1.
pub fn parse_qty(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return v.max(1);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => (v.trunc() as i64).max(1),
        Ok(v) if v == f64::INFINITY => i64::MAX,
        _ => 1,
    }
}

fn hydrate<S: SlotStore>(slot: &S, key: &str) -> Vec<CartLineItem> {
    let raw = match slot.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key, "Cart slot unreadable, starting empty: {e}");
            return Vec::new();
        }
    };
    let items: Vec<CartLineItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(key, "Cart snapshot corrupt, starting empty: {e}");
            return Vec::new();
        }
    };
    let mut seen = HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.id)).collect()
}
