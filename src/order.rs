//! Order data model.
//!
//! Field names serialize in the camelCase shape the ordering site has always
//! persisted, so an existing `orders.json` (or the browser's `bojoOrders`
//! mirror) round-trips unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::status::OrderStatus;

/// Sales tax applied to every order.
pub const TAX_RATE: f64 = 0.10;

/// Prefix for human-facing order numbers (`BOJO-0042`).
pub const ORDER_NUMBER_PREFIX: &str = "BOJO-";

/// Round a money amount to 2 decimal places for display and storage.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// One selected menu item: unit price and quantity.
///
/// Unique by `name` within a cart; adding an existing item increments
/// `quantity` instead of appending a duplicate line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl CartLine {
    /// Extended price for this line (unit price × quantity).
    pub fn line_total(&self) -> f64 {
        round2(self.price * self.quantity as f64)
    }
}

/// Customer contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// How the order will be fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "dine-in")]
    DineIn,
    #[serde(rename = "takeout")]
    Takeout,
    #[serde(rename = "delivery")]
    Delivery,
}

impl OrderType {
    /// Estimated wait shown on the confirmation and tracking views.
    pub fn estimated_wait(&self) -> &'static str {
        match self {
            OrderType::DineIn => "15-25 minutes",
            OrderType::Takeout => "20-30 minutes",
            OrderType::Delivery => "30-45 minutes",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine-in",
            OrderType::Takeout => "takeout",
            OrderType::Delivery => "delivery",
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dine-in" => Ok(OrderType::DineIn),
            "takeout" => Ok(OrderType::Takeout),
            "delivery" => Ok(OrderType::Delivery),
            other => Err(format!("unknown order type: {other}")),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One customer transaction record.
///
/// Immutable once created; `status` is the only field that changes over the
/// order's life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: String,
    pub customer: Customer,
    pub order_type: OrderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_notes: Option<String>,
    pub payment_method: String,
    pub items: Vec<CartLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub timestamp: DateTime<Utc>,
    /// Records written before status tracking existed omit this field.
    #[serde(default)]
    pub status: OrderStatus,
}
