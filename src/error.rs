//! Error types for the order lifecycle.
//!
//! Read failures are deliberately absent: every read path degrades to an
//! empty collection instead of erroring (the admin panel and tracker must
//! keep working off whatever data is reachable).

use thiserror::Error;

/// Errors surfaced by cart, checkout, and order-store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A submitted field set or cart failed validation. The operation was
    /// aborted with no partial state committed.
    #[error("{0}")]
    Validation(String),

    /// An order number matched nothing in the store. Carries every known
    /// order number for the tracker's diagnostic output.
    #[error("order {order_number} not found")]
    NotFound {
        order_number: String,
        known_orders: Vec<String>,
    },

    /// A durable write failed. In-memory state is not rolled back, so the
    /// caller may be left with a durability gap (logged, not retried).
    #[error("storage write failed: {0}")]
    StorageWrite(String),

    /// The remote backend was unreachable or answered with a failure.
    #[error("{0}")]
    Network(String),
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
