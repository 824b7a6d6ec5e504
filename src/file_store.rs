//! Order store over a single pretty-printed JSON array file.
//!
//! This is the server-side backend: `orders.json` in the data directory,
//! human-readable and compatible with the files the previous deployment
//! produced. Reads are tolerant (a missing or mangled file is an empty
//! collection), writes rewrite the whole array. A process-wide mutex
//! serialises mutations; the files involved are a few kilobytes, so plain
//! blocking IO is fine even under the async callers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::order::Order;
use crate::store::OrderStore;

struct Inner {
    path: PathBuf,
    lock: Mutex<()>,
}

/// File-backed [`OrderStore`], cheap to clone into handler state.
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<Inner>,
}

impl FileStore {
    /// Open (or create) the order file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::StorageWrite(format!("create data dir: {e}")))?;
        }
        if !path.exists() {
            fs::write(&path, "[]")
                .map_err(|e| Error::StorageWrite(format!("create {}: {e}", path.display())))?;
            info!(path = %path.display(), "created empty order file");
        }
        Ok(FileStore {
            inner: Arc::new(Inner {
                path,
                lock: Mutex::new(()),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    fn read_orders(&self) -> Vec<Order> {
        let raw = match fs::read_to_string(&self.inner.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    path = %self.inner.path.display(),
                    "order file unreadable, treating as empty: {e}"
                );
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(orders) => orders,
            Err(e) => {
                warn!(
                    path = %self.inner.path.display(),
                    "order file is not a valid order array, treating as empty: {e}"
                );
                Vec::new()
            }
        }
    }

    fn write_orders(&self, orders: &[Order]) -> Result<()> {
        let pretty = serde_json::to_string_pretty(orders)
            .map_err(|e| Error::StorageWrite(format!("serialize orders: {e}")))?;
        fs::write(&self.inner.path, pretty)
            .map_err(|e| Error::StorageWrite(format!("write {}: {e}", self.inner.path.display())))
    }
}

impl OrderStore for FileStore {
    async fn list(&self) -> Vec<Order> {
        let _guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.read_orders()
    }

    async fn replace_all(&self, orders: &[Order]) -> Result<()> {
        let _guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.write_orders(orders)
    }

    // The default append would take the lock twice (list then replace);
    // do the read-modify-write under one guard instead.
    async fn append(&self, order: &Order) -> Result<()> {
        let _guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut orders = self.read_orders();
        orders.push(order.clone());
        self.write_orders(&orders)
    }
}
