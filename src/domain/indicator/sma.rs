//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are invalid.
//!
//! Each window is summed from scratch rather than slid, so two series over
//! the same closes compare exactly at a cross.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            period,
            values: Vec::new(),
        };
    }

    let values = (0..bars.len())
        .map(|i| {
            (i + 1 >= period).then(|| {
                let window = &bars[i + 1 - period..=i];
                window.iter().map(|b| b.close).sum::<f64>() / period as f64
            })
        })
        .collect();

    IndicatorSeries { period, values }
}
