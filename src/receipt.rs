//! Plain-text receipt rendering for a placed order.
//!
//! Pure formatting, 40 columns wide to suit a thermal printer. Content
//! mirrors the printed receipt customers already know: restaurant header,
//! order info, line items with extended prices, totals, thank-you footer.

use crate::order::{Order, OrderType};

const WIDTH: usize = 40;

fn rule() -> String {
    "=".repeat(WIDTH)
}

fn centered(text: &str) -> String {
    if text.len() >= WIDTH {
        return text.to_string();
    }
    let pad = (WIDTH - text.len()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn spread(left: &str, right: &str) -> String {
    let gap = WIDTH.saturating_sub(left.len() + right.len()).max(1);
    format!("{left}{}{right}", " ".repeat(gap))
}

fn type_label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::DineIn => "DINE IN",
        OrderType::Takeout => "TAKEOUT",
        OrderType::Delivery => "DELIVERY",
    }
}

/// Render one order as a printable text receipt.
pub fn render(order: &Order) -> String {
    let mut out = Vec::new();

    out.push(centered("BOJO Restaurant"));
    out.push(centered("123 Gourmet Street"));
    out.push(centered("Culinary District, CD 12345"));
    out.push(rule());

    out.push(format!("Order Number: {}", order.order_number));
    out.push(format!("Date: {}", order.timestamp.format("%Y-%m-%d %H:%M")));
    out.push(format!("Customer: {}", order.customer.name));
    out.push(format!("Phone: {}", order.customer.phone));
    out.push(format!("Type: {}", type_label(order.order_type)));
    if let Some(address) = &order.delivery_address {
        out.push(format!("Address: {address}"));
    }
    out.push(rule());

    for item in &order.items {
        out.push(spread(
            &format!("{} x {}", item.name, item.quantity),
            &format!("${:.2}", item.line_total()),
        ));
    }
    out.push("-".repeat(WIDTH));

    out.push(spread("Subtotal:", &format!("${:.2}", order.subtotal)));
    out.push(spread("Tax (10%):", &format!("${:.2}", order.tax)));
    out.push(spread("Total:", &format!("${:.2}", order.total)));
    out.push(rule());

    out.push(centered("Thank you for dining with us!"));
    out.push(centered("Visit us again soon at BOJO Restaurant"));

    out.join("\n")
}
