//! Indicator series aligned to a bar history.

pub mod sma;

/// One value per bar; `None` during warmup.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub period: usize,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Value at `index` if that point is past warmup.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }
}
