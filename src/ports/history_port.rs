//! Price history port trait.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait HistoryPort {
    /// Daily bars for `symbol` in `[from, to]`, ascending by date with no
    /// repeated dates. An unknown symbol may return an empty series.
    fn fetch_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TraderError>;
}
