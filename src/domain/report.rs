//! Operator message formatting.

use crate::domain::order::Order;
use crate::domain::signal::{Signal, SignalSet};
use crate::domain::sizing::OrderPlan;
use chrono::NaiveDate;
use std::fmt::Write;

fn header(date: NaiveDate) -> String {
    format!("[{}]\n", date.format("%Y-%m-%d"))
}

pub fn startup(date: NaiveDate, symbols: &[String]) -> String {
    format!("{}Trader online, watching {}", header(date), symbols.join(", "))
}

pub fn market_closed(date: NaiveDate) -> String {
    format!("{}Market closed today", header(date))
}

pub fn no_signal(date: NaiveDate) -> String {
    format!("{}No trading signal today", header(date))
}

pub fn signals(date: NaiveDate, set: &SignalSet) -> String {
    let mut msg = header(date);
    section(&mut msg, "Buy signals:", &set.buys, Signal::to_string);
    section(&mut msg, "Sell signals:", &set.sells, Signal::to_string);
    msg
}

pub fn no_orders(date: NaiveDate) -> String {
    format!("{}No orders planned today", header(date))
}

pub fn planned_orders(date: NaiveDate, plan: &OrderPlan) -> String {
    let mut msg = header(date);
    section(&mut msg, "Planned buy orders:", &plan.buys, Order::to_string);
    section(&mut msg, "Planned sell orders:", &plan.sells, Order::to_string);
    msg
}

pub fn orders_placed(date: NaiveDate, count: usize) -> String {
    format!("{}Placed {} orders", header(date), count)
}

pub fn cycle_failed(date: NaiveDate, reason: &str) -> String {
    format!("{}Cycle aborted: {}", header(date), reason)
}

fn section<T>(msg: &mut String, title: &str, items: &[T], line: impl Fn(&T) -> String) {
    let _ = writeln!(msg, "{title}");
    if items.is_empty() {
        msg.push_str("- none\n");
    }
    for item in items {
        let _ = writeln!(msg, "{}", line(item));
    }
}
