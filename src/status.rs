//! Order status machine.
//!
//! An order moves `new → preparing → ready → completed`, with a direct jump
//! to `completed` allowed from any non-terminal state ("mark done early").
//! Transitions between non-terminal states are otherwise applied as
//! requested — the admin console is trusted — but nothing ever leaves
//! `completed`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The finite set of states an order passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    New,
    Preparing,
    Ready,
    Completed,
}

impl OrderStatus {
    /// Display label for admin cards and the tracking view.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Completed => "Completed",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
        }
    }

    /// `completed` is terminal: no transition leaves it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }

    /// The admin actions exposed at this state, in display order.
    pub fn next_actions(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::New => &[OrderStatus::Preparing, OrderStatus::Completed],
            OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Completed],
            OrderStatus::Ready => &[OrderStatus::Completed],
            OrderStatus::Completed => &[],
        }
    }

    /// Resolve a requested transition against the current state.
    ///
    /// Non-terminal states accept any requested status as given (force-set,
    /// matching the admin panel's historical behavior). Requests to move an
    /// order out of `completed` fail without changing anything.
    pub fn transition_to(&self, requested: OrderStatus) -> Result<OrderStatus> {
        if self.is_terminal() && requested != *self {
            return Err(Error::validation(format!(
                "order is already completed, cannot set status to {requested}"
            )));
        }
        Ok(requested)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(OrderStatus::New),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
