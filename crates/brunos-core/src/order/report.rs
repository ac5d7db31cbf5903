//! Text report of the current orders, read out to the kitchen.

use std::collections::HashMap;

use super::model::Order;

const EMPTY_REPORT: &str = "No orders found in the system.\n";

/// Render the report. Articles are listed by count, most ordered first.
pub fn render(orders: &[Order]) -> String {
    if orders.is_empty() {
        return EMPTY_REPORT.to_string();
    }

    let mut report = String::from("Ciao Bruno, oggi ");
    if orders.len() == 1 {
        report.push_str("ci sono solo io");
    } else {
        report.push_str(&format!("siamo in {}", orders.len()));
    }
    report.push_str(":\n");

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for order in orders {
        *counts.entry(order.article.as_str()).or_default() += 1;
    }

    let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    for (article, count) in counts {
        report.push_str(&format!("{} x {}\n", count, article));
    }
    report
}
