//! OHLCV bar representation.

use chrono::NaiveDate;

/// One daily candle. Volume, turnover and change are optional because not
/// every history source reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
    pub turnover: Option<f64>,
    pub change: Option<f64>,
}

impl OhlcvBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume: None,
            turnover: None,
            change: None,
        }
    }
}

/// Sort ascending by date and drop repeated dates, keeping the last bar seen
/// for a date.
pub fn normalize(mut bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    bars.reverse();
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            close,
            close,
            close,
        )
    }

    #[test]
    fn new_leaves_optional_fields_empty() {
        let b = bar(15, 100.0);
        assert_eq!(b.volume, None);
        assert_eq!(b.turnover, None);
        assert_eq!(b.change, None);
    }

    #[test]
    fn normalize_sorts_ascending() {
        let bars = normalize(vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0)]);
        let days: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(days, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn normalize_keeps_last_duplicate() {
        let bars = normalize(vec![bar(1, 1.0), bar(2, 2.0), bar(2, 20.0)]);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 20.0);
    }
}
