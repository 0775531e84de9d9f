//! Order sizing engine.
//!
//! Turns buy/sell signals into concrete orders under a cash budget. Pure: the
//! caller reads balances and inventory from the broker first and submits the
//! resulting plan afterwards.
//!
//! # Buy allocation
//!
//! Signals are funded in the order given, from one running balance:
//!
//! 1. `balance >= price * lot_size`: round order of `floor(balance / (price * lot_size))` lots
//! 2. else `balance / price > min_odd_lot_shares`: odd order of `floor(balance / price)` shares
//! 3. else: no order
//!
//! # Sell allocation
//!
//! Each sell signal liquidates the whole holding: a round order for the full
//! lots and an odd order for the remainder.

use crate::domain::order::{LotKind, Order, Side};
use crate::domain::signal::{Signal, SignalSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingPolicy {
    /// Shares per round lot. Must be positive.
    pub lot_size: u64,
    /// An odd-lot buy needs strictly more than this many affordable shares.
    pub min_odd_lot_shares: u64,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            lot_size: 1000,
            min_odd_lot_shares: 50,
        }
    }
}

/// Brokerage figures read fresh at the start of order computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    pub balance: f64,
    /// Net amount of pending settlements; negative when payables dominate.
    pub settlements: f64,
    pub reserved: f64,
    pub trade_limit: f64,
}

impl Budget {
    /// `balance + settlements - reserved`, clamped to `[0, trade_limit]`.
    pub fn available(&self) -> f64 {
        (self.balance + self.settlements - self.reserved)
            .min(self.trade_limit)
            .max(0.0)
    }
}

/// Shares of one symbol currently owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub symbol: String,
    pub shares: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPlan {
    pub buys: Vec<Order>,
    pub sells: Vec<Order>,
    /// Balance left after funding the buys.
    pub remaining_balance: f64,
}

impl OrderPlan {
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Buys first, then sells: the submission order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.buys.iter().chain(self.sells.iter())
    }

    pub fn len(&self) -> usize {
        self.buys.len() + self.sells.len()
    }
}

pub fn allocate_orders(
    signals: &SignalSet,
    available_balance: f64,
    inventory: &[Holding],
    policy: &SizingPolicy,
) -> OrderPlan {
    let (buys, remaining_balance) = allocate_buys(&signals.buys, available_balance, policy);
    let sells = allocate_sells(&signals.sells, inventory, policy);
    OrderPlan {
        buys,
        sells,
        remaining_balance,
    }
}

pub fn allocate_buys(
    signals: &[Signal],
    available_balance: f64,
    policy: &SizingPolicy,
) -> (Vec<Order>, f64) {
    let start = available_balance.max(0.0);
    signals
        .iter()
        .fold((Vec::new(), start), |(mut orders, balance), signal| {
            match size_buy(signal, balance, policy) {
                Some(order) => {
                    let left = (balance - order.notional()).max(0.0);
                    orders.push(order);
                    (orders, left)
                }
                None => (orders, balance),
            }
        })
}

fn size_buy(signal: &Signal, balance: f64, policy: &SizingPolicy) -> Option<Order> {
    let price = signal.reference_price;
    if !price.is_finite() || price <= 0.0 || balance <= 0.0 || policy.lot_size == 0 {
        return None;
    }

    let lot_cost = price * policy.lot_size as f64;
    if balance >= lot_cost {
        let lots = affordable(balance, lot_cost);
        if lots > 0 {
            return Some(buy_order(signal, lots * policy.lot_size, LotKind::Round));
        }
    }

    if balance / price > policy.min_odd_lot_shares as f64 {
        let shares = affordable(balance, price).min(policy.lot_size - 1);
        if shares > 0 {
            return Some(buy_order(signal, shares, LotKind::Odd));
        }
    }

    None
}

/// `floor(balance / unit_cost)`, stepped down if float rounding overshoots.
fn affordable(balance: f64, unit_cost: f64) -> u64 {
    let mut units = (balance / unit_cost).floor() as u64;
    while units > 0 && units as f64 * unit_cost > balance {
        units -= 1;
    }
    units
}

fn buy_order(signal: &Signal, quantity: u64, lot_kind: LotKind) -> Order {
    Order {
        symbol: signal.symbol.clone(),
        side: Side::Buy,
        price: signal.reference_price,
        quantity,
        lot_kind,
    }
}

pub fn allocate_sells(signals: &[Signal], inventory: &[Holding], policy: &SizingPolicy) -> Vec<Order> {
    let mut orders = Vec::new();

    for signal in signals {
        let price = signal.reference_price;
        if !price.is_finite() || price <= 0.0 {
            continue;
        }
        let Some(holding) = inventory.iter().find(|h| h.symbol == signal.symbol) else {
            continue;
        };
        let Some(lots) = holding.shares.checked_div(policy.lot_size) else {
            continue;
        };
        let remainder = holding.shares - lots * policy.lot_size;

        if lots > 0 {
            orders.push(sell_order(signal, lots * policy.lot_size, LotKind::Round));
        }
        if remainder > 0 {
            orders.push(sell_order(signal, remainder, LotKind::Odd));
        }
    }

    orders
}

fn sell_order(signal: &Signal, quantity: u64, lot_kind: LotKind) -> Order {
    Order {
        symbol: signal.symbol.clone(),
        side: Side::Sell,
        price: signal.reference_price,
        quantity,
        lot_kind,
    }
}
