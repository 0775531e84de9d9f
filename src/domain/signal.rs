//! Dual simple-moving-average crossover signal.
//!
//! lineA = SMA(short_window) of closes, lineB = SMA(long_window).
//! Only the latest bar is evaluated:
//!
//! - Buy: lineA[prev] <= lineB[prev] and lineA[last] > lineB[last]
//! - Sell: lineA[prev] >= lineB[prev] and lineA[last] < lineB[last]
//! - None otherwise, or when either line is still in warmup at `prev`.

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::OhlcvBar;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intention {
    Buy,
    Sell,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub intention: Intention,
    /// Latest close when the intention is Buy or Sell, NaN otherwise.
    pub reference_price: f64,
}

impl Signal {
    fn none(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            intention: Intention::None,
            reference_price: f64::NAN,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- Symbol: {} | Price: {}", self.symbol, self.reference_price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalWindows {
    pub short: usize,
    pub long: usize,
}

impl Default for SignalWindows {
    fn default() -> Self {
        Self { short: 15, long: 60 }
    }
}

impl SignalWindows {
    /// Bars needed before a cross can be observed at the latest bar.
    pub fn min_bars(&self) -> usize {
        self.short.max(self.long) + 1
    }
}

pub fn compute_signal(symbol: &str, history: &[OhlcvBar], windows: SignalWindows) -> Signal {
    if history.len() < windows.min_bars() || windows.short == 0 || windows.long == 0 {
        return Signal::none(symbol);
    }

    let line_a = calculate_sma(history, windows.short);
    let line_b = calculate_sma(history, windows.long);
    let last = history.len() - 1;
    let prev = last - 1;

    let (Some(a_prev), Some(b_prev), Some(a_last), Some(b_last)) = (
        line_a.value_at(prev),
        line_b.value_at(prev),
        line_a.value_at(last),
        line_b.value_at(last),
    ) else {
        return Signal::none(symbol);
    };

    let intention = if a_prev <= b_prev && a_last > b_last {
        Intention::Buy
    } else if a_prev >= b_prev && a_last < b_last {
        Intention::Sell
    } else {
        return Signal::none(symbol);
    };

    Signal {
        symbol: symbol.to_string(),
        intention,
        reference_price: history[last].close,
    }
}

/// Signals that produced an intention, in symbol-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSet {
    pub buys: Vec<Signal>,
    pub sells: Vec<Signal>,
}

impl SignalSet {
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Route a signal into the buy or sell list; `None` intentions are dropped.
    pub fn push(&mut self, signal: Signal) {
        match signal.intention {
            Intention::Buy => self.buys.push(signal),
            Intention::Sell => self.sells.push(signal),
            Intention::None => {}
        }
    }
}

impl FromIterator<Signal> for SignalSet {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        let mut set = SignalSet::default();
        for signal in iter {
            set.push(signal);
        }
        set
    }
}
