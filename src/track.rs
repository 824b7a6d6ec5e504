//! Customer-facing order tracking.
//!
//! Accepts free-form order-number input ("bojo-0007", "0007", ...) and
//! resolves it against the store with a tolerant candidate chain. The
//! tracking timeline is derived purely from the current status: only the
//! creation instant is a real timestamp, later milestones carry static
//! descriptive text.

use crate::error::{Error, Result};
use crate::order::{Order, OrderType, ORDER_NUMBER_PREFIX};
use crate::status::OrderStatus;
use crate::store::OrderStore;

/// One row of the tracking timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Milestone {
    pub title: &'static str,
    pub detail: String,
    pub completed: bool,
}

/// A resolved tracking lookup: the order plus its rendered timeline.
#[derive(Debug, Clone)]
pub struct Tracking {
    pub order: Order,
    pub timeline: Vec<Milestone>,
}

/// The lookups attempted for a raw customer input, in order: exact,
/// uppercased, `BOJO-` prefix added when missing, prefix stripped when
/// present (for records stored without it).
pub fn lookup_candidates(raw: &str) -> Vec<String> {
    let exact = raw.trim().to_string();
    let upper = exact.to_uppercase();

    let mut candidates = vec![exact.clone(), upper.clone()];
    if let Some(stripped) = upper.strip_prefix(ORDER_NUMBER_PREFIX) {
        candidates.push(stripped.to_string());
    } else {
        candidates.push(format!("{ORDER_NUMBER_PREFIX}{upper}"));
    }
    candidates.dedup();
    candidates
}

/// Look up one order by customer-entered number and render its timeline.
///
/// On a miss the error carries every known order number so support staff
/// can see what the store actually holds.
pub async fn track<S: OrderStore>(store: &S, raw: &str) -> Result<Tracking> {
    let orders = store.list().await;
    for candidate in lookup_candidates(raw) {
        if let Some(order) = orders.iter().find(|o| o.order_number == candidate) {
            return Ok(Tracking {
                timeline: timeline(order),
                order: order.clone(),
            });
        }
    }
    Err(Error::NotFound {
        order_number: raw.trim().to_string(),
        known_orders: orders.into_iter().map(|o| o.order_number).collect(),
    })
}

fn status_rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::New => 0,
        OrderStatus::Preparing => 1,
        OrderStatus::Ready => 2,
        OrderStatus::Completed => 3,
    }
}

/// Milestones for the tracking view, derived from current status alone.
pub fn timeline(order: &Order) -> Vec<Milestone> {
    let rank = status_rank(order.status);

    let mut rows = vec![Milestone {
        title: "Order Placed",
        detail: order.timestamp.format("%Y-%m-%d %H:%M UTC").to_string(),
        completed: true,
    }];

    if rank >= 1 {
        rows.push(Milestone {
            title: "Order Started Preparing",
            detail: "Your order is being prepared by our chefs".to_string(),
            completed: true,
        });
    }

    if rank >= 2 {
        let handoff = if order.order_type == OrderType::Delivery {
            "delivery"
        } else {
            "pickup"
        };
        rows.push(Milestone {
            title: "Order Ready",
            detail: format!("Your order is ready for {handoff}"),
            completed: true,
        });
    }

    if order.status == OrderStatus::Completed {
        rows.push(Milestone {
            title: "Order Completed",
            detail: "Thank you for your order!".to_string(),
            completed: true,
        });
    } else {
        rows.push(Milestone {
            title: "Estimated Time",
            detail: order.order_type.estimated_wait().to_string(),
            completed: false,
        });
    }

    rows
}
