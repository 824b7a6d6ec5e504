//! Keeps the local and remote order stores in agreement.
//!
//! Reads prefer the remote collection (it is the one the restaurant staff
//! mutate from other devices) and fall back to the local mirror when the
//! server is unreachable or has nothing. Writes go local-first: the local
//! write must succeed, the remote mirror is best-effort — a customer's
//! order is never rejected because the network is down.

use tracing::{debug, warn};

use crate::error::Result;
use crate::local_store::LocalStore;
use crate::order::Order;
use crate::remote::RemoteStore;
use crate::store::OrderStore;

/// Local + optional remote backend behind the one [`OrderStore`] contract.
#[derive(Clone)]
pub struct SyncedStore {
    local: LocalStore,
    remote: Option<RemoteStore>,
}

impl SyncedStore {
    pub fn new(local: LocalStore, remote: RemoteStore) -> Self {
        SyncedStore {
            local,
            remote: Some(remote),
        }
    }

    /// Operate without a remote backend at all (offline installs).
    pub fn local_only(local: LocalStore) -> Self {
        SyncedStore {
            local,
            remote: None,
        }
    }

    /// Remote-first load with local fallback. A successful non-empty remote
    /// read refreshes the local mirror so later fallbacks stay current.
    async fn load(&self) -> Vec<Order> {
        if let Some(remote) = &self.remote {
            match remote.fetch().await {
                Ok(orders) if !orders.is_empty() => {
                    if let Err(e) = self.local.replace_all(&orders).await {
                        warn!("refreshing local mirror failed: {e}");
                    }
                    return orders;
                }
                Ok(_) => debug!("remote collection empty, using local mirror"),
                Err(e) => warn!("remote load failed, using local mirror: {e}"),
            }
        }
        self.local.list().await
    }

    /// Persist to both backends. Local must succeed; a remote failure is
    /// logged and the operation still reports success to the caller.
    async fn store_both(&self, orders: &[Order]) -> Result<()> {
        self.local.replace_all(orders).await?;
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.replace_all(orders).await {
                warn!("remote mirror write failed, local copy kept: {e}");
            }
        }
        Ok(())
    }
}

impl OrderStore for SyncedStore {
    async fn list(&self) -> Vec<Order> {
        self.load().await
    }

    async fn replace_all(&self, orders: &[Order]) -> Result<()> {
        self.store_both(orders).await
    }
}
