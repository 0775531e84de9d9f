//! Fugle market-data REST history source.
//!
//! `GET {base_url}/stock/historical/candles/{symbol}?from=..&to=..&fields=..`
//! authenticated with the `X-API-KEY` header. The endpoint serves at most one
//! year per request, so longer ranges are split and the requests spaced by a
//! cooldown to stay inside the provider quota.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::{OhlcvBar, normalize};
use crate::ports::clock_port::Clock;
use crate::ports::history_port::HistoryPort;
use chrono::{Days, Months, NaiveDate, TimeDelta};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, error};

const FIELDS: &str = "open,high,low,close,volume,turnover,change";

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    #[serde(default)]
    data: Vec<Candle>,
}

#[derive(Debug, Deserialize)]
struct Candle {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<i64>,
    turnover: Option<f64>,
    change: Option<f64>,
}

pub struct FugleAdapter<C: Clock> {
    client: Client,
    base_url: String,
    api_key: String,
    cooldown: TimeDelta,
    clock: C,
}

impl<C: Clock> FugleAdapter<C> {
    pub fn new(base_url: &str, api_key: &str, cooldown: TimeDelta, clock: C) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cooldown,
            clock,
        }
    }

    fn fetch_chunk(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TraderError> {
        let url = format!("{}/stock/historical/candles/{}", self.base_url, symbol);
        debug!("fetching {symbol} candles [{from}, {to}]");

        let resp = self
            .client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .query(&[
                ("from", from.format("%Y-%m-%d").to_string()),
                ("to", to.format("%Y-%m-%d").to_string()),
                ("fields", FIELDS.to_string()),
            ])
            .send()
            .map_err(|e| TraderError::history(symbol, e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            error!("candle request for {symbol} failed: {status} {body}");
            return Err(TraderError::history(symbol, format!("HTTP {status}")));
        }

        let payload: CandlesResponse = resp.json().map_err(|e| TraderError::history(symbol, e))?;
        payload
            .data
            .into_iter()
            .map(|c| {
                let date = NaiveDate::parse_from_str(&c.date, "%Y-%m-%d")
                    .map_err(|e| TraderError::history(symbol, format!("invalid date '{}': {}", c.date, e)))?;
                Ok(OhlcvBar {
                    date,
                    open: c.open,
                    high: c.high,
                    low: c.low,
                    close: c.close,
                    volume: c.volume,
                    turnover: c.turnover,
                    change: c.change,
                })
            })
            .collect()
    }
}

/// Split `[from, to]` into consecutive ranges of at most one year.
pub fn yearly_chunks(from: NaiveDate, to: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut chunks = Vec::new();
    let mut start = from;
    while start <= to {
        let end = start
            .checked_add_months(Months::new(12))
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .map_or(to, |d| d.min(to));
        chunks.push((start, end));
        match end.checked_add_days(Days::new(1)) {
            Some(next) => start = next,
            None => break,
        }
    }
    chunks
}

impl<C: Clock> HistoryPort for FugleAdapter<C> {
    fn fetch_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TraderError> {
        let mut bars = Vec::new();
        for (i, (start, end)) in yearly_chunks(from, to).into_iter().enumerate() {
            if i > 0 {
                self.clock.sleep(self.cooldown);
            }
            bars.extend(self.fetch_chunk(symbol, start, end)?);
        }
        Ok(normalize(bars))
    }
}
