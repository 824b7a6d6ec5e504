//! Checkout: turns a cart snapshot plus customer-entered fields into a
//! stored order.
//!
//! Validation aborts the whole operation before anything is committed; a
//! successful checkout appends exactly one order and clears the cart.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::cart::{CartSnapshot, CartStore};
use crate::error::{Error, Result};
use crate::order::{Customer, Order, OrderType, ORDER_NUMBER_PREFIX};
use crate::status::OrderStatus;
use crate::store::OrderStore;

/// How many times to re-roll a colliding order number before giving up and
/// using the last candidate anyway. With 10 000 values and a handful of
/// open orders this bound is theoretical.
const ORDER_NUMBER_REROLLS: usize = 32;

/// Customer-submitted checkout fields, as entered in the form.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub order_type: OrderType,
    pub delivery_address: Option<String>,
    pub order_notes: Option<String>,
    pub payment_method: String,
}

impl OrderDraft {
    /// Validate the draft against a cart snapshot and produce an immutable
    /// [`Order`] with a fresh number and timestamp. `taken` is the set of
    /// order numbers already in the store, used to avoid collisions.
    pub fn build(&self, cart: &CartSnapshot, taken: &[String]) -> Result<Order> {
        if cart.is_empty() {
            return Err(Error::validation("empty cart"));
        }
        if self.customer_name.trim().is_empty() {
            return Err(Error::validation("customer name is required"));
        }
        if self.customer_phone.trim().is_empty() {
            return Err(Error::validation("customer phone is required"));
        }
        if self.payment_method.trim().is_empty() {
            return Err(Error::validation("payment method is required"));
        }

        let delivery_address = self
            .delivery_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        if self.order_type == OrderType::Delivery && delivery_address.is_none() {
            return Err(Error::validation(
                "delivery address is required for delivery orders",
            ));
        }

        let order_notes = self
            .order_notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let email = self
            .customer_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        Ok(Order {
            order_number: generate_order_number(taken),
            customer: Customer {
                name: self.customer_name.trim().to_string(),
                phone: self.customer_phone.trim().to_string(),
                email,
            },
            order_type: self.order_type,
            delivery_address,
            order_notes,
            payment_method: self.payment_method.trim().to_string(),
            items: cart.lines.clone(),
            subtotal: cart.subtotal,
            tax: cart.tax,
            total: cart.total,
            timestamp: Utc::now(),
            status: OrderStatus::New,
        })
    }
}

/// Generate a `BOJO-####` order number, re-rolling while the candidate is
/// already taken. Entropy comes from UUID v4 bits.
pub fn generate_order_number(taken: &[String]) -> String {
    let mut candidate = String::new();
    for _ in 0..ORDER_NUMBER_REROLLS {
        let n = (Uuid::new_v4().as_u128() % 10_000) as u16;
        candidate = format!("{ORDER_NUMBER_PREFIX}{n:04}");
        if !taken.iter().any(|t| t == &candidate) {
            return candidate;
        }
    }
    candidate
}

/// End-to-end checkout: build an order from the current cart, append it to
/// the store, and clear the cart. The cart is only cleared after the store
/// accepted the order.
pub async fn place_order<S: OrderStore>(
    store: &S,
    cart: &mut CartStore,
    draft: &OrderDraft,
) -> Result<Order> {
    let snapshot = cart.snapshot();
    let taken: Vec<String> = store
        .list()
        .await
        .into_iter()
        .map(|o| o.order_number)
        .collect();
    let order = draft.build(&snapshot, &taken)?;
    store.append(&order).await?;
    cart.clear();
    info!(
        order_number = %order.order_number,
        total = order.total,
        "order placed"
    );
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::local_store::LocalStore;
    use std::sync::Arc;

    fn draft(order_type: OrderType) -> OrderDraft {
        OrderDraft {
            customer_name: "Ada Lovelace".into(),
            customer_phone: "555-0100".into(),
            customer_email: None,
            order_type,
            delivery_address: None,
            order_notes: None,
            payment_method: "cash".into(),
        }
    }

    fn cart_with(items: &[(&str, f64, u32)]) -> CartStore {
        let mut cart = CartStore::load(Arc::new(db::test_db()));
        for (name, price, quantity) in items {
            for _ in 0..*quantity {
                cart.add_item(name, *price);
            }
        }
        cart
    }

    #[test]
    fn empty_cart_is_rejected() {
        let cart = cart_with(&[]);
        let err = draft(OrderType::Takeout)
            .build(&cart.snapshot(), &[])
            .expect_err("empty cart");
        assert!(matches!(err, Error::Validation(msg) if msg == "empty cart"));
    }

    #[test]
    fn delivery_without_address_is_rejected_takeout_is_not() {
        let cart = cart_with(&[("Pizza", 12.0, 1)]);
        let snap = cart.snapshot();

        assert!(draft(OrderType::Delivery).build(&snap, &[]).is_err());
        assert!(draft(OrderType::Takeout).build(&snap, &[]).is_ok());

        let mut with_address = draft(OrderType::Delivery);
        with_address.delivery_address = Some("1 Harbor Way".into());
        assert!(with_address.build(&snap, &[]).is_ok());
    }

    #[test]
    fn blank_delivery_address_counts_as_missing() {
        let cart = cart_with(&[("Pizza", 12.0, 1)]);
        let mut d = draft(OrderType::Delivery);
        d.delivery_address = Some("   ".into());
        assert!(d.build(&cart.snapshot(), &[]).is_err());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let cart = cart_with(&[("Pizza", 12.0, 1)]);
        let snap = cart.snapshot();

        let mut no_name = draft(OrderType::Takeout);
        no_name.customer_name = " ".into();
        assert!(no_name.build(&snap, &[]).is_err());

        let mut no_phone = draft(OrderType::Takeout);
        no_phone.customer_phone = String::new();
        assert!(no_phone.build(&snap, &[]).is_err());

        let mut no_payment = draft(OrderType::Takeout);
        no_payment.payment_method = String::new();
        assert!(no_payment.build(&snap, &[]).is_err());
    }

    #[test]
    fn built_order_snapshots_cart_and_totals() {
        let cart = cart_with(&[("Pizza", 12.0, 2), ("Salad", 6.0, 1)]);
        let order = draft(OrderType::Takeout)
            .build(&cart.snapshot(), &[])
            .expect("build order");

        assert_eq!(order.subtotal, 30.0);
        assert_eq!(order.tax, 3.0);
        assert_eq!(order.total, 33.0);
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.items.len(), 2);
        assert!(order.order_number.starts_with(ORDER_NUMBER_PREFIX));
    }

    #[test]
    fn order_numbers_are_prefixed_and_zero_padded() {
        for _ in 0..50 {
            let number = generate_order_number(&[]);
            let digits = number.strip_prefix(ORDER_NUMBER_PREFIX).expect("prefix");
            assert_eq!(digits.len(), 4);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn generation_avoids_taken_numbers() {
        // With only a few numbers taken, 32 rolls find a free one
        // essentially always.
        let taken: Vec<String> = (0..20).map(|n| format!("BOJO-{n:04}")).collect();
        for _ in 0..20 {
            assert!(!taken.contains(&generate_order_number(&taken)));
        }
    }

    #[tokio::test]
    async fn place_order_appends_and_clears_the_cart() {
        let store = LocalStore::new(Arc::new(db::test_db()));
        let mut cart = cart_with(&[("Burger", 10.0, 1)]);

        let order = place_order(&store, &mut cart, &draft(OrderType::DineIn))
            .await
            .expect("place order");

        assert!(cart.is_empty());
        let stored = store.list().await;
        assert_eq!(stored, vec![order]);
    }

    #[tokio::test]
    async fn failed_validation_leaves_cart_and_store_untouched() {
        let store = LocalStore::new(Arc::new(db::test_db()));
        let mut cart = cart_with(&[("Burger", 10.0, 1)]);

        let result = place_order(&store, &mut cart, &draft(OrderType::Delivery)).await;
        assert!(result.is_err());
        assert_eq!(cart.lines().len(), 1);
        assert!(store.list().await.is_empty());
    }
}
