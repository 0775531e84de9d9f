//! Fetch-or-load history cache.
//!
//! Requests for the default multi-year window are served from the CSV store
//! when it already holds the symbol, and saved there after a live fetch.
//! Any other range always goes to the upstream source.

use crate::adapters::csv_adapter::CsvAdapter;
use crate::domain::error::TraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::history_port::HistoryPort;
use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

pub const DEFAULT_WINDOW_START_YEAR: i32 = 2019;

/// `[2019-01-01, Dec 31 of the year before today]`.
pub fn default_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from = NaiveDate::from_ymd_opt(DEFAULT_WINDOW_START_YEAR, 1, 1).unwrap_or(NaiveDate::MIN);
    let to = NaiveDate::from_ymd_opt(today.year() - 1, 12, 31).unwrap_or(today);
    (from, to)
}

pub struct CachedHistoryAdapter<H: HistoryPort> {
    upstream: H,
    store: CsvAdapter,
    default_window: (NaiveDate, NaiveDate),
}

impl<H: HistoryPort> CachedHistoryAdapter<H> {
    pub fn new(upstream: H, store: CsvAdapter, default_window: (NaiveDate, NaiveDate)) -> Self {
        Self {
            upstream,
            store,
            default_window,
        }
    }

    pub fn default_window(&self) -> (NaiveDate, NaiveDate) {
        self.default_window
    }
}

impl<H: HistoryPort> HistoryPort for CachedHistoryAdapter<H> {
    fn fetch_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TraderError> {
        let is_default = (from, to) == self.default_window;

        if is_default && self.store.exists(symbol) {
            debug!("{symbol}: serving default window from cache");
            return self.store.load(symbol);
        }

        let bars = self.upstream.fetch_history(symbol, from, to)?;
        if is_default {
            info!("{symbol}: caching {} bars", bars.len());
            self.store.save(symbol, &bars)?;
        }
        Ok(bars)
    }
}
