//! In-process paper brokerage.
//!
//! Stands in for a live brokerage: account figures come from config, fills
//! are immediate at the limit price, and each placed order is appended to an
//! optional CSV journal.

use crate::domain::config::PaperBrokerSettings;
use crate::domain::error::TraderError;
use crate::domain::order::{Order, Side};
use crate::domain::schedule::Schedule;
use crate::domain::sizing::Holding;
use crate::ports::broker_port::{
    Balance, BrokerPort, Inventory, InventoryLot, MarketStatus, Settlement, TradeStatus,
};
use crate::ports::clock_port::Clock;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeMap, HashSet};
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::info;

pub struct PaperBroker<C: Clock> {
    clock: C,
    schedule: Schedule,
    cash: f64,
    trade_limit: f64,
    holdings: BTreeMap<String, u64>,
    holidays: HashSet<NaiveDate>,
    journal: Option<PathBuf>,
    logged_in: bool,
}

impl<C: Clock> PaperBroker<C> {
    pub fn new(settings: &PaperBrokerSettings, schedule: Schedule, clock: C) -> Self {
        Self {
            clock,
            schedule,
            cash: settings.cash,
            trade_limit: settings.trade_limit,
            holdings: settings
                .holdings
                .iter()
                .map(|h| (h.symbol.clone(), h.shares))
                .collect(),
            holidays: settings.holidays.iter().copied().collect(),
            journal: settings.journal.clone(),
            logged_in: false,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn holdings(&self) -> Vec<Holding> {
        self.holdings
            .iter()
            .map(|(symbol, &shares)| Holding {
                symbol: symbol.clone(),
                shares,
            })
            .collect()
    }

    fn ensure_session(&self, operation: &str) -> Result<(), TraderError> {
        if self.logged_in {
            Ok(())
        } else {
            Err(TraderError::broker(operation, "not logged in"))
        }
    }

    fn record(&self, order: &Order) -> Result<(), TraderError> {
        let Some(path) = &self.journal else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let write_header = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        let journal_err = |e: csv::Error| TraderError::broker("journal", e);
        if write_header {
            wtr.write_record(["timestamp", "symbol", "side", "lot_kind", "price", "quantity"])
                .map_err(journal_err)?;
        }
        wtr.write_record([
            self.clock.now().to_rfc3339(),
            order.symbol.clone(),
            order.side.to_string(),
            order.lot_kind.to_string(),
            order.price.to_string(),
            order.quantity.to_string(),
        ])
        .map_err(journal_err)?;
        wtr.flush()?;
        Ok(())
    }
}

impl<C: Clock> BrokerPort for PaperBroker<C> {
    fn login(&mut self) -> Result<(), TraderError> {
        self.logged_in = true;
        Ok(())
    }

    fn logout(&mut self) -> Result<(), TraderError> {
        self.logged_in = false;
        Ok(())
    }

    fn market_status(&self) -> Result<MarketStatus, TraderError> {
        self.ensure_session("market status")?;
        let today = self.schedule.local_date(self.clock.now());
        let weekend = matches!(today.weekday(), Weekday::Sat | Weekday::Sun);
        Ok(MarketStatus {
            is_trading_day: !weekend && !self.holidays.contains(&today),
        })
    }

    fn balance(&self) -> Result<Balance, TraderError> {
        self.ensure_session("balance")?;
        Ok(Balance {
            available_balance: self.cash,
        })
    }

    fn trade_status(&self) -> Result<TradeStatus, TraderError> {
        self.ensure_session("trade status")?;
        Ok(TradeStatus {
            trade_limit: self.trade_limit,
        })
    }

    fn inventories(&self) -> Result<Vec<Inventory>, TraderError> {
        self.ensure_session("inventories")?;
        Ok(self
            .holdings
            .iter()
            .filter(|(_, shares)| **shares > 0)
            .map(|(symbol, &quantity)| Inventory {
                symbol: symbol.clone(),
                lots: vec![InventoryLot { quantity }],
            })
            .collect())
    }

    fn settlements(&self) -> Result<Vec<Settlement>, TraderError> {
        self.ensure_session("settlements")?;
        Ok(Vec::new())
    }

    fn place_order(&mut self, order: &Order) -> Result<(), TraderError> {
        self.ensure_session("place order")?;
        match order.side {
            Side::Buy => {
                if order.notional() > self.cash {
                    return Err(TraderError::broker(
                        "place order",
                        format!("insufficient cash for {} {}", order.quantity, order.symbol),
                    ));
                }
                self.cash -= order.notional();
                *self.holdings.entry(order.symbol.clone()).or_default() += order.quantity;
            }
            Side::Sell => {
                let held = self.holdings.get_mut(&order.symbol).filter(|s| **s >= order.quantity);
                let Some(held) = held else {
                    return Err(TraderError::broker(
                        "place order",
                        format!("not enough {} shares to sell {}", order.symbol, order.quantity),
                    ));
                };
                *held -= order.quantity;
                self.cash += order.notional();
            }
        }
        self.record(order)?;
        info!(
            "paper fill: {} {} {} @ {} ({})",
            order.side, order.quantity, order.symbol, order.price, order.lot_kind
        );
        Ok(())
    }
}
