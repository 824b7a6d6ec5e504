//! The order persistence contract.
//!
//! Every backend (local SQLite mirror, remote HTTP API, server-side flat
//! file) exposes the same five operations over the full order collection.
//! Updates follow the collection-level read-modify-write pattern the site
//! has always used: load everything, edit one record, write everything
//! back. That is last-write-wins under concurrent writers — callers are
//! expected to serialize mutations through a single owner per session.

use tracing::warn;

use crate::error::{Error, Result};
use crate::order::Order;
use crate::status::OrderStatus;

/// Append / list / replace / update-status / clear over the order collection.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// All stored orders in insertion order. Never fails outward: read
    /// failures degrade to an empty collection (logged by the backend).
    async fn list(&self) -> Vec<Order>;

    /// Overwrite the entire collection.
    async fn replace_all(&self, orders: &[Order]) -> Result<()>;

    /// Add one order, keeping everything already stored.
    async fn append(&self, order: &Order) -> Result<()> {
        let mut orders = self.list().await;
        orders.push(order.clone());
        self.replace_all(&orders).await
    }

    /// Set the status of the order with this exact order number and persist
    /// the collection back. Fails with [`Error::NotFound`] — mutating
    /// nothing — when the number matches no stored order; the terminal rule
    /// (`completed` never changes) is enforced here for every backend.
    async fn update_status(&self, order_number: &str, requested: OrderStatus) -> Result<Order> {
        let mut orders = self.list().await;
        let Some(pos) = orders.iter().position(|o| o.order_number == order_number) else {
            warn!(order_number, "status update target not found");
            return Err(Error::NotFound {
                order_number: order_number.to_string(),
                known_orders: orders.into_iter().map(|o| o.order_number).collect(),
            });
        };
        let next = orders[pos].status.transition_to(requested)?;
        orders[pos].status = next;
        let updated = orders[pos].clone();
        self.replace_all(&orders).await?;
        Ok(updated)
    }

    /// Replace the collection with an empty one.
    async fn clear_all(&self) -> Result<()> {
        self.replace_all(&[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Customer, OrderType};
    use chrono::Utc;
    use std::sync::Mutex;

    /// Minimal in-memory backend exercising the default trait methods.
    struct MemStore {
        orders: Mutex<Vec<Order>>,
        fail_writes: bool,
    }

    impl MemStore {
        fn new() -> Self {
            MemStore {
                orders: Mutex::new(Vec::new()),
                fail_writes: false,
            }
        }
    }

    impl OrderStore for MemStore {
        async fn list(&self) -> Vec<Order> {
            self.orders.lock().unwrap().clone()
        }

        async fn replace_all(&self, orders: &[Order]) -> Result<()> {
            if self.fail_writes {
                return Err(Error::StorageWrite("disk full".into()));
            }
            *self.orders.lock().unwrap() = orders.to_vec();
            Ok(())
        }
    }

    fn order(number: &str, status: OrderStatus) -> Order {
        Order {
            order_number: number.to_string(),
            customer: Customer {
                name: "Ada".into(),
                phone: "555-0100".into(),
                email: None,
            },
            order_type: OrderType::Takeout,
            delivery_address: None,
            order_notes: None,
            payment_method: "cash".into(),
            items: vec![],
            subtotal: 10.0,
            tax: 1.0,
            total: 11.0,
            timestamp: Utc::now(),
            status,
        }
    }

    #[tokio::test]
    async fn append_keeps_existing_orders() {
        let store = MemStore::new();
        store.append(&order("BOJO-0001", OrderStatus::New)).await.unwrap();
        store.append(&order("BOJO-0002", OrderStatus::New)).await.unwrap();
        let numbers: Vec<String> = store
            .list()
            .await
            .into_iter()
            .map(|o| o.order_number)
            .collect();
        assert_eq!(numbers, vec!["BOJO-0001", "BOJO-0002"]);
    }

    #[tokio::test]
    async fn update_status_changes_only_the_target() {
        let store = MemStore::new();
        store.append(&order("BOJO-0007", OrderStatus::New)).await.unwrap();
        store.append(&order("BOJO-0008", OrderStatus::New)).await.unwrap();

        let updated = store
            .update_status("BOJO-0007", OrderStatus::Ready)
            .await
            .expect("update status");
        assert_eq!(updated.status, OrderStatus::Ready);

        let orders = store.list().await;
        assert_eq!(orders[0].status, OrderStatus::Ready);
        assert_eq!(orders[0].total, 11.0);
        assert_eq!(orders[1].status, OrderStatus::New);
    }

    #[tokio::test]
    async fn update_status_unknown_number_reports_not_found_without_mutating() {
        let store = MemStore::new();
        store.append(&order("BOJO-0001", OrderStatus::New)).await.unwrap();
        let before = store.list().await;

        let err = store
            .update_status("BOJO-9999", OrderStatus::Ready)
            .await
            .expect_err("missing order");
        match err {
            Error::NotFound {
                order_number,
                known_orders,
            } => {
                assert_eq!(order_number, "BOJO-9999");
                assert_eq!(known_orders, vec!["BOJO-0001"]);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(store.list().await, before);
    }

    #[tokio::test]
    async fn completed_orders_never_leave_completed() {
        let store = MemStore::new();
        store
            .append(&order("BOJO-0042", OrderStatus::Completed))
            .await
            .unwrap();

        for requested in [OrderStatus::New, OrderStatus::Preparing, OrderStatus::Ready] {
            assert!(store.update_status("BOJO-0042", requested).await.is_err());
            assert_eq!(store.list().await[0].status, OrderStatus::Completed);
        }
    }

    #[tokio::test]
    async fn clear_all_then_list_is_empty() {
        let store = MemStore::new();
        store.append(&order("BOJO-0001", OrderStatus::New)).await.unwrap();
        store.clear_all().await.unwrap();
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn write_failure_surfaces_from_update() {
        let store = MemStore {
            orders: Mutex::new(vec![order("BOJO-0001", OrderStatus::New)]),
            fail_writes: true,
        };
        let err = store
            .update_status("BOJO-0001", OrderStatus::Preparing)
            .await
            .expect_err("write should fail");
        assert!(matches!(err, Error::StorageWrite(_)));
    }
}
