//! CSV file history store.
//!
//! One file per symbol, `{data_dir}/{SYMBOL}.csv`, with header
//! `date,open,high,low,close,volume,turnover,change`. The last three columns
//! may be empty.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::{OhlcvBar, normalize};
use crate::ports::history_port::HistoryPort;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<i64>,
    turnover: Option<f64>,
    change: Option<f64>,
}

impl CsvRow {
    fn into_bar(self) -> Result<OhlcvBar, String> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{}': {}", self.date, e))?;
        Ok(OhlcvBar {
            date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            turnover: self.turnover,
            change: self.change,
        })
    }
}

impl From<&OhlcvBar> for CsvRow {
    fn from(bar: &OhlcvBar) -> Self {
        Self {
            date: bar.date.format("%Y-%m-%d").to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            turnover: bar.turnover,
            change: bar.change,
        }
    }
}

pub struct CsvAdapter {
    data_dir: PathBuf,
}

impl CsvAdapter {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn csv_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }

    pub fn exists(&self, symbol: &str) -> bool {
        self.csv_path(symbol).is_file()
    }

    /// Every stored bar for `symbol`, ascending.
    pub fn load(&self, symbol: &str) -> Result<Vec<OhlcvBar>, TraderError> {
        let path = self.csv_path(symbol);
        let mut rdr = csv::Reader::from_path(&path)
            .map_err(|e| TraderError::history(symbol, format!("failed to read {}: {}", path.display(), e)))?;

        let mut bars = Vec::new();
        for row in rdr.deserialize::<CsvRow>() {
            let row = row.map_err(|e| TraderError::history(symbol, format!("CSV parse error: {}", e)))?;
            bars.push(row.into_bar().map_err(|reason| TraderError::history(symbol, reason))?);
        }
        Ok(normalize(bars))
    }

    /// Replace the stored series for `symbol`.
    pub fn save(&self, symbol: &str, bars: &[OhlcvBar]) -> Result<(), TraderError> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.csv_path(symbol);
        let mut wtr = csv::Writer::from_path(&path)
            .map_err(|e| TraderError::history(symbol, format!("failed to write {}: {}", path.display(), e)))?;
        for bar in bars {
            wtr.serialize(CsvRow::from(bar))
                .map_err(|e| TraderError::history(symbol, format!("CSV write error: {}", e)))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl HistoryPort for CsvAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TraderError> {
        if !self.exists(symbol) {
            return Ok(Vec::new());
        }
        let bars = self
            .load(symbol)?
            .into_iter()
            .filter(|b| b.date >= from && b.date <= to)
            .collect();
        Ok(bars)
    }
}
