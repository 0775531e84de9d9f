#![allow(dead_code)]

use chrono::{DateTime, Days, NaiveDate, TimeDelta, TimeZone, Utc};
use crosstrader::domain::config::{
    HistorySettings, HistorySource, NotifySettings, PaperBrokerSettings, TraderConfig,
};
use crosstrader::domain::error::TraderError;
pub use crosstrader::domain::ohlcv::OhlcvBar;
use crosstrader::domain::order::Order;
use crosstrader::domain::schedule::Schedule;
use crosstrader::domain::signal::SignalWindows;
use crosstrader::domain::sizing::SizingPolicy;
use crosstrader::ports::broker_port::{
    Balance, BrokerPort, Inventory, InventoryLot, MarketStatus, Settlement, TradeStatus,
};
use crosstrader::ports::clock_port::Clock;
use crosstrader::ports::history_port::HistoryPort;
use crosstrader::ports::notify_port::NotifyPort;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;

// --- history ---

pub struct MockHistory {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockHistory {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn requested_symbols(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.0.clone()).collect()
    }
}

impl HistoryPort for MockHistory {
    fn fetch_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TraderError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), from, to));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TraderError::history(symbol, reason));
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= from && b.date <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let date = start.checked_add_days(Days::new(i as u64)).unwrap();
            OhlcvBar::new(date, c, c, c, c)
        })
        .collect()
}

/// Seven closes whose SMA(3) crosses above SMA(5) on the last bar, which
/// closes at `price`.
pub fn buy_cross_bars(price: f64) -> Vec<OhlcvBar> {
    let k = price / 20.0;
    bars_from_closes(&[10.0 * k, 9.0 * k, 8.0 * k, 7.0 * k, 6.0 * k, 5.0 * k, price])
}

/// Seven closes whose SMA(3) crosses below SMA(5) on the last bar, which
/// closes at `price`.
pub fn sell_cross_bars(price: f64) -> Vec<OhlcvBar> {
    let k = price;
    bars_from_closes(&[2.5 * k, 3.0 * k, 3.5 * k, 4.0 * k, 4.5 * k, 5.0 * k, price])
}

pub fn flat_bars(price: f64) -> Vec<OhlcvBar> {
    bars_from_closes(&[price; 7])
}

// --- broker ---

/// Broker with fixed account figures that records every call, queries
/// included, so tests can assert the full session sequence.
pub struct ScriptedBroker {
    pub trading_day: bool,
    pub balance: f64,
    pub trade_limit: f64,
    pub inventory: Vec<Inventory>,
    pub settlements: Vec<Settlement>,
    /// Operation name that fails when called.
    pub fail_on: Option<&'static str>,
    pub placed: Vec<Order>,
    logged_in: bool,
    log: RefCell<Vec<&'static str>>,
}

impl ScriptedBroker {
    pub fn new(balance: f64) -> Self {
        Self {
            trading_day: true,
            balance,
            trade_limit: f64::MAX,
            inventory: Vec::new(),
            settlements: Vec::new(),
            fail_on: None,
            placed: Vec::new(),
            logged_in: false,
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn closed(mut self) -> Self {
        self.trading_day = false;
        self
    }

    pub fn holding(mut self, symbol: &str, lots: &[u64]) -> Self {
        self.inventory.push(Inventory {
            symbol: symbol.to_string(),
            lots: lots.iter().map(|&quantity| InventoryLot { quantity }).collect(),
        });
        self
    }

    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.log.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    fn call(&self, operation: &'static str) -> Result<(), TraderError> {
        self.log.borrow_mut().push(operation);
        if operation != "login" && operation != "logout" && !self.logged_in {
            return Err(TraderError::broker(operation, "not logged in"));
        }
        if self.fail_on == Some(operation) {
            return Err(TraderError::broker(operation, "scripted failure"));
        }
        Ok(())
    }
}

impl BrokerPort for ScriptedBroker {
    fn login(&mut self) -> Result<(), TraderError> {
        self.call("login")?;
        self.logged_in = true;
        Ok(())
    }

    fn logout(&mut self) -> Result<(), TraderError> {
        self.logged_in = false;
        self.call("logout")
    }

    fn market_status(&self) -> Result<MarketStatus, TraderError> {
        self.call("market_status")?;
        Ok(MarketStatus {
            is_trading_day: self.trading_day,
        })
    }

    fn balance(&self) -> Result<Balance, TraderError> {
        self.call("balance")?;
        Ok(Balance {
            available_balance: self.balance,
        })
    }

    fn trade_status(&self) -> Result<TradeStatus, TraderError> {
        self.call("trade_status")?;
        Ok(TradeStatus {
            trade_limit: self.trade_limit,
        })
    }

    fn inventories(&self) -> Result<Vec<Inventory>, TraderError> {
        self.call("inventories")?;
        Ok(self.inventory.clone())
    }

    fn settlements(&self) -> Result<Vec<Settlement>, TraderError> {
        self.call("settlements")?;
        Ok(self.settlements.clone())
    }

    fn place_order(&mut self, order: &Order) -> Result<(), TraderError> {
        self.call("place_order")?;
        self.placed.push(order.clone());
        Ok(())
    }
}

// --- notifier ---

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            messages: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl NotifyPort for RecordingNotifier {
    fn send(&self, text: &str) -> Result<(), TraderError> {
        self.messages.borrow_mut().push(text.to_string());
        if self.fail {
            return Err(TraderError::Notify {
                reason: "webhook unreachable".into(),
            });
        }
        Ok(())
    }
}

// --- clock ---

/// Clock that jumps straight to each deadline and remembers it.
pub struct FakeClock {
    now: Cell<DateTime<Utc>>,
    pub sleeps: RefCell<Vec<DateTime<Utc>>>,
}

impl FakeClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<DateTime<Utc>> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn sleep_until(&self, deadline: DateTime<Utc>) {
        self.sleeps.borrow_mut().push(deadline);
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}

/// A Taipei wall-clock reading as a UTC instant.
pub fn taipei(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    chrono_tz::Asia::Taipei
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// --- config ---

/// SMA(3)/SMA(5), Taipei schedule, 1.2 s cooldown, default sizing.
pub fn test_config(symbols: &[&str]) -> TraderConfig {
    TraderConfig {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        windows: SignalWindows { short: 3, long: 5 },
        reserved_balance: 0.0,
        sizing: SizingPolicy::default(),
        schedule: Schedule::default(),
        fetch_cooldown: TimeDelta::milliseconds(1200),
        history: HistorySettings {
            source: HistorySource::Csv,
            data_dir: PathBuf::from("data/history"),
        },
        broker: PaperBrokerSettings {
            cash: 0.0,
            trade_limit: 0.0,
            holdings: Vec::new(),
            holidays: Vec::new(),
            journal: None,
        },
        notify: NotifySettings::Log,
    }
}
