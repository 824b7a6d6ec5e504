//! Staff-facing admin console: passphrase gate, order filtering, and the
//! dashboard statistics.
//!
//! The passphrase hash and lockout counters live in the SQLite
//! `local_state` table. The gate protects the console UI only; the store
//! itself is not authenticated, so anything with filesystem or API access
//! bypasses it. That trust boundary is inherited from the deployment this
//! replaces and is accepted here.

use bcrypt::DEFAULT_COST;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::db::{self, DbState};
use crate::error::{Error, Result};
use crate::order::Order;
use crate::status::OrderStatus;
use crate::store::OrderStore;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAX_FAILED_ATTEMPTS: u32 = 5;
const LOCKOUT_MINUTES: i64 = 15;
const PASSPHRASE_HASH_KEY: &str = "admin_passphrase_hash";
const LOCKOUT_KEY: &str = "admin_lockout";

// ---------------------------------------------------------------------------
// Passphrase gate
// ---------------------------------------------------------------------------

/// Lockout tracking entry, persisted so a restart does not reset it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockoutEntry {
    attempts: u32,
    last_attempt: DateTime<Utc>,
}

impl Default for LockoutEntry {
    fn default() -> Self {
        LockoutEntry {
            attempts: 0,
            last_attempt: Utc::now(),
        }
    }
}

/// bcrypt passphrase check with failed-attempt lockout.
pub struct AdminGate {
    db: Arc<DbState>,
    lockout: Mutex<LockoutEntry>,
}

impl AdminGate {
    pub fn new(db: Arc<DbState>) -> Self {
        let lockout = db::read_state(&db, LOCKOUT_KEY).unwrap_or_default();
        AdminGate {
            db,
            lockout: Mutex::new(lockout),
        }
    }

    /// Whether a passphrase has been configured at all.
    pub fn has_passphrase(&self) -> bool {
        db::read_state::<String>(&self.db, PASSPHRASE_HASH_KEY).is_some()
    }

    /// Hash and store a new admin passphrase, replacing any previous one.
    pub fn set_passphrase(&self, passphrase: &str) -> Result<()> {
        if passphrase.trim().is_empty() {
            return Err(Error::validation("admin passphrase must not be empty"));
        }
        let hash = bcrypt::hash(passphrase, DEFAULT_COST)
            .map_err(|e| Error::StorageWrite(format!("passphrase hashing failed: {e}")))?;
        db::write_state(&self.db, PASSPHRASE_HASH_KEY, &hash)?;
        info!("admin passphrase updated");
        Ok(())
    }

    /// Verify a passphrase attempt. Five failures lock the gate for
    /// fifteen minutes; a success resets the counter.
    pub fn verify(&self, passphrase: &str) -> Result<()> {
        let mut lockout = self
            .lockout
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if lockout.attempts >= MAX_FAILED_ATTEMPTS {
            let elapsed = Utc::now() - lockout.last_attempt;
            if elapsed < Duration::minutes(LOCKOUT_MINUTES) {
                let remaining = LOCKOUT_MINUTES - elapsed.num_minutes();
                return Err(Error::validation(format!(
                    "Too many failed attempts. Try again in {remaining} minute(s)."
                )));
            }
        }

        let Some(hash) = db::read_state::<String>(&self.db, PASSPHRASE_HASH_KEY) else {
            return Err(Error::validation("no admin passphrase configured"));
        };

        if bcrypt::verify(passphrase, &hash).unwrap_or(false) {
            lockout.attempts = 0;
            lockout.last_attempt = Utc::now();
            self.persist_lockout(&lockout);
            return Ok(());
        }

        lockout.attempts += 1;
        lockout.last_attempt = Utc::now();
        warn!(attempts = lockout.attempts, "failed admin login attempt");
        self.persist_lockout(&lockout);
        Err(Error::validation("incorrect passphrase"))
    }

    fn persist_lockout(&self, lockout: &LockoutEntry) {
        if let Err(e) = db::write_state(&self.db, LOCKOUT_KEY, lockout) {
            warn!("persisting lockout state failed: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering and statistics
// ---------------------------------------------------------------------------

/// The console's status filter: everything, or one exact status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => order.status == *status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        Ok(StatusFilter::Only(s.parse().map_err(Error::Validation)?))
    }
}

/// Orders matching the filter, newest first (the console's listing order).
pub fn filter_orders(orders: &[Order], filter: StatusFilter) -> Vec<Order> {
    let mut matched: Vec<Order> = orders.iter().filter(|o| filter.matches(o)).cloned().collect();
    matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matched
}

/// Per-status counts for the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub new: usize,
    pub preparing: usize,
    pub ready: usize,
    pub completed: usize,
    pub completed_today: usize,
}

impl OrderStats {
    /// Count orders per status; `today` decides the completed-today split.
    pub fn compute(orders: &[Order], today: NaiveDate) -> Self {
        let mut stats = OrderStats::default();
        for order in orders {
            match order.status {
                OrderStatus::New => stats.new += 1,
                OrderStatus::Preparing => stats.preparing += 1,
                OrderStatus::Ready => stats.ready += 1,
                OrderStatus::Completed => {
                    stats.completed += 1;
                    if order.timestamp.date_naive() == today {
                        stats.completed_today += 1;
                    }
                }
            }
        }
        stats
    }

    /// The number shown on the "completed" card: today's completions when
    /// there are any, otherwise the lifetime count.
    pub fn displayed_completed(&self) -> usize {
        if self.completed_today > 0 {
            self.completed_today
        } else {
            self.completed
        }
    }
}

/// Move one order to a new status, logging the transition for the audit
/// trail. All rules live in the store contract.
pub async fn set_status<S: OrderStore>(
    store: &S,
    order_number: &str,
    status: OrderStatus,
) -> Result<Order> {
    let order = store.update_status(order_number, status).await?;
    info!(
        order_number = %order.order_number,
        status = order.status.as_str(),
        "admin status change"
    );
    Ok(order)
}
