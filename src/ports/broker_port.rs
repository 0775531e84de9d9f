//! Brokerage session port trait.
//!
//! Every query and `place_order` requires a prior `login`; callers bracket
//! each use with [`crate::domain::session::BrokerSession`].

use crate::domain::error::TraderError;
use crate::domain::order::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketStatus {
    pub is_trading_day: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balance {
    pub available_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeStatus {
    pub trade_limit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryLot {
    pub quantity: u64,
}

/// One held symbol, as separate purchase lots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub symbol: String,
    pub lots: Vec<InventoryLot>,
}

impl Inventory {
    pub fn total_shares(&self) -> u64 {
        self.lots.iter().map(|l| l.quantity).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub amount: f64,
}

pub trait BrokerPort {
    fn login(&mut self) -> Result<(), TraderError>;
    fn logout(&mut self) -> Result<(), TraderError>;
    fn market_status(&self) -> Result<MarketStatus, TraderError>;
    fn balance(&self) -> Result<Balance, TraderError>;
    fn trade_status(&self) -> Result<TradeStatus, TraderError>;
    fn inventories(&self) -> Result<Vec<Inventory>, TraderError>;
    fn settlements(&self) -> Result<Vec<Settlement>, TraderError>;
    fn place_order(&mut self, order: &Order) -> Result<(), TraderError>;
}
