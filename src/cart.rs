//! The customer's in-progress cart.
//!
//! One cart per session, restored from the `bojoCart` document at startup
//! so a reload does not lose the selection. Every mutation persists
//! synchronously before returning; a failed write keeps the in-memory cart
//! intact and is only logged — losing the cart over a disk hiccup would be
//! worse than re-entering it after a crash.

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::db::{self, DbState};
use crate::order::{round2, CartLine, TAX_RATE};

/// Storage key holding the cart, unchanged from the site's original
/// localStorage layout.
pub const CART_KEY: &str = "bojoCart";

/// Cart contents plus computed totals, rounded for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Mutable pre-checkout selection owned by one customer session.
pub struct CartStore {
    db: Arc<DbState>,
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Restore the persisted cart, or start empty.
    pub fn load(db: Arc<DbState>) -> Self {
        let lines = db::read_state(&db, CART_KEY).unwrap_or_default();
        CartStore { db, lines }
    }

    fn persist(&self) {
        if let Err(e) = db::write_state(&self.db, CART_KEY, &self.lines) {
            warn!("cart persist failed, keeping in-memory copy: {e}");
        }
    }

    /// Add one unit of an item. An item already in the cart gets its
    /// quantity incremented instead of a duplicate line.
    pub fn add_item(&mut self, name: &str, price: f64) {
        match self.lines.iter_mut().find(|line| line.name == name) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine {
                name: name.to_string(),
                price,
                quantity: 1,
            }),
        }
        self.persist();
    }

    /// Adjust a line's quantity by `delta`; dropping to zero or below
    /// removes the line. Out-of-range indexes are ignored.
    pub fn set_quantity(&mut self, index: usize, delta: i32) {
        let Some(line) = self.lines.get_mut(index) else {
            return;
        };
        let quantity = line.quantity as i64 + delta as i64;
        if quantity <= 0 {
            self.lines.remove(index);
        } else {
            line.quantity = quantity as u32;
        }
        self.persist();
    }

    /// Remove a line outright. Out-of-range indexes are a silent no-op.
    pub fn remove_item(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
            self.persist();
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines (the cart badge count).
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Current lines plus subtotal / tax / total, rounded to 2 decimals.
    pub fn snapshot(&self) -> CartSnapshot {
        let subtotal = round2(
            self.lines
                .iter()
                .map(|line| line.price * line.quantity as f64)
                .sum(),
        );
        let tax = round2(subtotal * TAX_RATE);
        let total = round2(subtotal + tax);
        CartSnapshot {
            lines: self.lines.clone(),
            subtotal,
            tax,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> CartStore {
        CartStore::load(Arc::new(db::test_db()))
    }

    #[test]
    fn adding_same_item_twice_increments_quantity() {
        let mut cart = cart();
        cart.add_item("Burger", 10.0);
        cart.add_item("Burger", 10.0);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.lines()[0].price, 10.0);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn quantity_dropping_to_zero_removes_the_line() {
        let mut cart = cart();
        cart.add_item("Salad", 6.0);
        cart.add_item("Salad", 6.0);

        cart.set_quantity(0, -1);
        assert_eq!(cart.lines()[0].quantity, 1);

        cart.set_quantity(0, -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_out_of_range_is_a_no_op() {
        let mut cart = cart();
        cart.add_item("Pizza", 12.0);
        cart.set_quantity(5, 1);
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn remove_item_out_of_range_is_a_no_op() {
        let mut cart = cart();
        cart.add_item("Pizza", 12.0);
        cart.remove_item(3);
        assert_eq!(cart.lines().len(), 1);
        cart.remove_item(0);
        assert!(cart.is_empty());
    }

    #[test]
    fn snapshot_totals_follow_the_tax_formula() {
        let mut cart = cart();
        cart.add_item("Pizza", 12.0);
        cart.set_quantity(0, 1); // quantity 2
        cart.add_item("Salad", 6.0);

        let snap = cart.snapshot();
        assert_eq!(snap.subtotal, 30.0);
        assert_eq!(snap.tax, 3.0);
        assert_eq!(snap.total, 33.0);
    }

    #[test]
    fn snapshot_of_empty_cart_is_all_zero() {
        let snap = cart().snapshot();
        assert!(snap.is_empty());
        assert_eq!(snap.subtotal, 0.0);
        assert_eq!(snap.tax, 0.0);
        assert_eq!(snap.total, 0.0);
    }

    #[test]
    fn cart_survives_a_reload() {
        let db = Arc::new(db::test_db());
        {
            let mut cart = CartStore::load(Arc::clone(&db));
            cart.add_item("Burger", 10.0);
            cart.add_item("Fries", 4.0);
        }
        let restored = CartStore::load(db);
        assert_eq!(restored.lines().len(), 2);
        assert_eq!(restored.lines()[1].name, "Fries");
    }

    #[test]
    fn clear_persists_the_empty_cart() {
        let db = Arc::new(db::test_db());
        let mut cart = CartStore::load(Arc::clone(&db));
        cart.add_item("Burger", 10.0);
        cart.clear();

        let restored = CartStore::load(db);
        assert!(restored.is_empty());
    }
}
