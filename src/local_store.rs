//! Durable local order store.
//!
//! The Rust-side equivalent of the browser's `localStorage["bojoOrders"]`
//! mirror: the full order collection as one JSON document in the
//! `local_state` table. Used standalone in tests and as the fallback half
//! of [`crate::sync::SyncedStore`].

use std::sync::Arc;

use crate::db::{self, DbState};
use crate::error::Result;
use crate::order::Order;
use crate::store::OrderStore;

/// Storage key holding the order collection, unchanged from the site's
/// original localStorage layout.
pub const ORDERS_KEY: &str = "bojoOrders";

/// Order store backed by the local SQLite `local_state` table.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<DbState>,
}

impl LocalStore {
    pub fn new(db: Arc<DbState>) -> Self {
        LocalStore { db }
    }
}

impl OrderStore for LocalStore {
    async fn list(&self) -> Vec<Order> {
        db::read_state(&self.db, ORDERS_KEY).unwrap_or_default()
    }

    async fn replace_all(&self, orders: &[Order]) -> Result<()> {
        db::write_state(&self.db, ORDERS_KEY, &orders)
    }
}
