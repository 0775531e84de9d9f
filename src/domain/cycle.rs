//! Daily trading cycle state machine.
//!
//! One call to [`DailyCycle::run_cycle`] drives a calendar day from
//! `AwaitingWindow` to `Reporting`, then suspends until the next local
//! midnight. The phases:
//!
//! ```text
//! AwaitingWindow -> CheckingTradingDay -> ComputingSignals -> ComputingOrders
//!     -> AwaitingOpen -> Placing -> Reporting
//! ```
//!
//! Any phase may short-circuit to `Reporting` (outside the window, market
//! closed, no signal, no orders). A failing phase is logged, reported to the
//! operator and also ends in `Reporting`; the process never stops on a bad
//! day. Broker sessions are opened per phase and never span a suspension.

use crate::domain::config::TraderConfig;
use crate::domain::error::TraderError;
use crate::domain::report;
use crate::domain::session::BrokerSession;
use crate::domain::signal::{SignalSet, compute_signal};
use crate::domain::sizing::{Budget, Holding, OrderPlan, allocate_orders};
use crate::ports::broker_port::BrokerPort;
use crate::ports::clock_port::Clock;
use crate::ports::history_port::HistoryPort;
use crate::ports::notify_port::NotifyPort;
use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    AwaitingWindow,
    CheckingTradingDay,
    ComputingSignals,
    ComputingOrders(SignalSet),
    AwaitingOpen(OrderPlan),
    Placing(OrderPlan),
    Reporting(CycleOutcome),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::AwaitingWindow => "awaiting window",
            Phase::CheckingTradingDay => "checking trading day",
            Phase::ComputingSignals => "computing signals",
            Phase::ComputingOrders(_) => "computing orders",
            Phase::AwaitingOpen(_) => "awaiting open",
            Phase::Placing(_) => "placing",
            Phase::Reporting(_) => "reporting",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Started after the pre-open cutoff; nothing was attempted today.
    OutsideWindow,
    MarketClosed,
    NoSignal,
    NoOrders,
    Placed { buys: usize, sells: usize },
    Failed { reason: String },
}

/// Where the machine is within one calendar day. Never persisted; a restart
/// re-derives it from the wall clock.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleState {
    pub date: NaiveDate,
    pub phase: Phase,
}

pub struct DailyCycle<'a> {
    config: &'a TraderConfig,
    history: &'a dyn HistoryPort,
    broker: &'a mut dyn BrokerPort,
    notifier: &'a dyn NotifyPort,
    clock: &'a dyn Clock,
}

impl<'a> DailyCycle<'a> {
    pub fn new(
        config: &'a TraderConfig,
        history: &'a dyn HistoryPort,
        broker: &'a mut dyn BrokerPort,
        notifier: &'a dyn NotifyPort,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            config,
            history,
            broker,
            notifier,
            clock,
        }
    }

    pub fn run_forever(&mut self) -> ! {
        loop {
            self.run_cycle();
        }
    }

    pub fn announce_startup(&self) {
        let date = self.today();
        self.notify(&report::startup(date, &self.config.symbols));
    }

    /// Drive one calendar day to `Reporting`, then sleep to the next local
    /// midnight.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let mut state = CycleState {
            date: self.today(),
            phase: Phase::AwaitingWindow,
        };

        let outcome = loop {
            if let Phase::Reporting(outcome) = state.phase {
                break outcome;
            }
            let name = state.phase.name();
            debug!("[{}] {}", state.date, name);
            state.phase = match self.advance(state.date, state.phase) {
                Ok(next) => next,
                Err(e) => {
                    error!("[{}] {} failed: {}", state.date, name, e);
                    self.notify(&report::cycle_failed(state.date, &e.to_string()));
                    Phase::Reporting(CycleOutcome::Failed {
                        reason: e.to_string(),
                    })
                }
            };
        };

        let wake = self.config.schedule.next_day_boundary(self.clock.now());
        info!("[{}] cycle finished: {:?}; next wake at {}", state.date, outcome, wake);
        self.clock.sleep_until(wake);
        outcome
    }

    fn advance(&mut self, date: NaiveDate, phase: Phase) -> Result<Phase, TraderError> {
        match phase {
            Phase::AwaitingWindow => {
                if self.config.schedule.is_within_window(self.clock.now()) {
                    Ok(Phase::CheckingTradingDay)
                } else {
                    debug!("[{date}] past pre-open cutoff, skipping today");
                    Ok(Phase::Reporting(CycleOutcome::OutsideWindow))
                }
            }
            Phase::CheckingTradingDay => {
                if self.is_trading_day()? {
                    Ok(Phase::ComputingSignals)
                } else {
                    info!("[{date}] market closed");
                    self.notify(&report::market_closed(date));
                    Ok(Phase::Reporting(CycleOutcome::MarketClosed))
                }
            }
            Phase::ComputingSignals => {
                let signals = self.compute_signals(date)?;
                if signals.is_empty() {
                    self.notify(&report::no_signal(date));
                    Ok(Phase::Reporting(CycleOutcome::NoSignal))
                } else {
                    self.notify(&report::signals(date, &signals));
                    Ok(Phase::ComputingOrders(signals))
                }
            }
            Phase::ComputingOrders(signals) => {
                let plan = self.compute_orders(&signals)?;
                if plan.is_empty() {
                    self.notify(&report::no_orders(date));
                    Ok(Phase::Reporting(CycleOutcome::NoOrders))
                } else {
                    self.notify(&report::planned_orders(date, &plan));
                    Ok(Phase::AwaitingOpen(plan))
                }
            }
            Phase::AwaitingOpen(plan) => {
                self.await_open(date)?;
                Ok(Phase::Placing(plan))
            }
            Phase::Placing(plan) => {
                self.place_orders(&plan)?;
                self.notify(&report::orders_placed(date, plan.len()));
                Ok(Phase::Reporting(CycleOutcome::Placed {
                    buys: plan.buys.len(),
                    sells: plan.sells.len(),
                }))
            }
            Phase::Reporting(outcome) => Ok(Phase::Reporting(outcome)),
        }
    }

    fn today(&self) -> NaiveDate {
        self.config.schedule.local_date(self.clock.now())
    }

    fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send(text) {
            warn!("operator notification dropped: {e}");
        }
    }

    pub fn is_trading_day(&mut self) -> Result<bool, TraderError> {
        let session = BrokerSession::open(&mut *self.broker)?;
        let status = session.market_status()?;
        session.close()?;
        Ok(status.is_trading_day)
    }

    /// Evaluate every configured symbol over its trailing window ending on
    /// `date`. Symbols with too little history are skipped.
    pub fn compute_signals(&self, date: NaiveDate) -> Result<SignalSet, TraderError> {
        let (from, to) = self.config.schedule.history_window(date);
        let windows = self.config.windows;
        let mut set = SignalSet::default();

        for (i, symbol) in self.config.symbols.iter().enumerate() {
            if i > 0 {
                self.clock.sleep(self.config.fetch_cooldown);
            }
            let history = self.history.fetch_history(symbol, from, to)?;
            if history.len() < windows.min_bars() {
                warn!(
                    "skipping {}: {} bars in [{}, {}], need {}",
                    symbol,
                    history.len(),
                    from,
                    to,
                    windows.min_bars()
                );
                continue;
            }
            let signal = compute_signal(symbol, &history, windows);
            debug!("{}: {:?} @ {}", symbol, signal.intention, signal.reference_price);
            set.push(signal);
        }

        info!(
            "[{date}] {} buy / {} sell signals",
            set.buys.len(),
            set.sells.len()
        );
        Ok(set)
    }

    /// Read the account fresh and size orders for `signals`. Nothing is
    /// submitted.
    pub fn compute_orders(&mut self, signals: &SignalSet) -> Result<OrderPlan, TraderError> {
        let session = BrokerSession::open(&mut *self.broker)?;
        let balance = session.balance()?;
        let trade_status = session.trade_status()?;
        let inventory = session.inventories()?;
        let settlements = session.settlements()?;

        let budget = Budget {
            balance: balance.available_balance,
            settlements: settlements.iter().map(|s| s.amount).sum(),
            reserved: self.config.reserved_balance,
            trade_limit: trade_status.trade_limit,
        };
        let holdings: Vec<Holding> = inventory
            .iter()
            .map(|inv| Holding {
                symbol: inv.symbol.clone(),
                shares: inv.total_shares(),
            })
            .collect();

        let available = budget.available();
        let plan = allocate_orders(signals, available, &holdings, &self.config.sizing);
        session.close()?;

        info!(
            "budget {:.0} available, {} buy / {} sell orders, {:.0} left",
            available,
            plan.buys.len(),
            plan.sells.len(),
            plan.remaining_balance
        );
        Ok(plan)
    }

    fn await_open(&self, date: NaiveDate) -> Result<(), TraderError> {
        let open = self.config.schedule.market_open_at(date);
        let now = self.clock.now();
        if now > open {
            return Err(TraderError::MissedMarketOpen { now, open });
        }
        info!("[{date}] waiting for market open at {open}");
        self.clock.sleep_until(open);
        Ok(())
    }

    fn place_orders(&mut self, plan: &OrderPlan) -> Result<(), TraderError> {
        let mut session = BrokerSession::open(&mut *self.broker)?;
        for order in plan.orders() {
            info!(
                "placing {} {} {} @ {} ({})",
                order.side, order.quantity, order.symbol, order.price, order.lot_kind
            );
            session.place_order(order)?;
        }
        session.close()
    }
}
