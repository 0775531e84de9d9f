//! Limit orders produced by the sizing engine.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

/// Round lots trade in multiples of the lot size on the regular session;
/// odd lots are fewer shares than one lot on the intraday odd-lot session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotKind {
    Round,
    Odd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    /// Always in shares, also for round lots.
    pub quantity: u64,
    pub lot_kind: LotKind,
}

impl Order {
    pub fn notional(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

impl fmt::Display for LotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotKind::Round => write!(f, "round lot"),
            LotKind::Odd => write!(f, "odd lot"),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- Symbol: {} | Price: {} | Quantity: {} | {}",
            self.symbol, self.price, self.quantity, self.lot_kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notional_is_shares_times_price() {
        let order = Order {
            symbol: "2330".into(),
            side: Side::Buy,
            price: 500.0,
            quantity: 2000,
            lot_kind: LotKind::Round,
        };
        assert_eq!(order.notional(), 1_000_000.0);
    }

    #[test]
    fn display_order_line() {
        let order = Order {
            symbol: "1234".into(),
            side: Side::Sell,
            price: 45.5,
            quantity: 80,
            lot_kind: LotKind::Odd,
        };
        assert_eq!(
            order.to_string(),
            "- Symbol: 1234 | Price: 45.5 | Quantity: 80 | odd lot"
        );
    }
}
