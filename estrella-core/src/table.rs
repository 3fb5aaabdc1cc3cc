//! Indicator table: candles plus the indicator columns the scorers read.
//!
//! The table is columnar, like the precomputed indicator series of a
//! backtest: bars in one vector, one `Vec<Option<f64>>` per indicator. It is
//! built once per evaluation and only read afterwards.
//!
//! Two ways in:
//! - [`IndicatorTable::build`] computes every column from raw bars;
//! - [`IndicatorTable::from_rows`] accepts a table precomputed by the data
//!   collaborator. Non-finite indicator values are mapped to absent at this
//!   boundary.
//!
//! Both enforce the caller contract: non-empty, every bar a sane candle
//! (finite, high/low bracketing open/close), strictly increasing timestamps.
//! `build` also rejects an indicator config with a zero period.

use crate::config::IndicatorConfig;
use crate::domain::Bar;
use crate::indicators::{Bollinger, Ema, Indicator, Rsi};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the table, as exchanged with the data collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub bar: Bar,
    #[serde(default)]
    pub ema_fast: Option<f64>,
    #[serde(default)]
    pub ema_mid: Option<f64>,
    #[serde(default)]
    pub ema_slow: Option<f64>,
    #[serde(default)]
    pub momentum: Option<f64>,
    #[serde(default)]
    pub band_lower: Option<f64>,
    #[serde(default)]
    pub band_mid: Option<f64>,
    #[serde(default)]
    pub band_upper: Option<f64>,
}

impl IndicatorRow {
    /// A row with no indicator values yet.
    pub fn from_bar(bar: Bar) -> Self {
        Self {
            bar,
            ema_fast: None,
            ema_mid: None,
            ema_slow: None,
            momentum: None,
            band_lower: None,
            band_mid: None,
            band_upper: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable {
    bars: Vec<Bar>,
    ema_fast: Vec<Option<f64>>,
    ema_mid: Vec<Option<f64>>,
    ema_slow: Vec<Option<f64>>,
    momentum: Vec<Option<f64>>,
    band_lower: Vec<Option<f64>>,
    band_mid: Vec<Option<f64>>,
    band_upper: Vec<Option<f64>>,
}

impl IndicatorTable {
    /// Compute every indicator column over `bars`.
    pub fn build(bars: &[Bar], config: &IndicatorConfig) -> Result<Self, TableError> {
        config
            .validate()
            .map_err(|err| TableError::Config(err.to_string()))?;
        validate_bars(bars)?;

        let table = Self {
            bars: bars.to_vec(),
            ema_fast: Ema::new(config.ema_fast).compute(bars),
            ema_mid: Ema::new(config.ema_mid).compute(bars),
            ema_slow: Ema::new(config.ema_slow).compute(bars),
            momentum: Rsi::new(config.rsi_period).compute(bars),
            band_lower: Bollinger::lower(config.band_period, config.band_multiplier).compute(bars),
            band_mid: Bollinger::middle(config.band_period, config.band_multiplier).compute(bars),
            band_upper: Bollinger::upper(config.band_period, config.band_multiplier).compute(bars),
        };
        tracing::trace!(rows = table.len(), "indicator table built");
        Ok(table)
    }

    /// Accept a precomputed table.
    pub fn from_rows(rows: Vec<IndicatorRow>) -> Result<Self, TableError> {
        let bars: Vec<Bar> = rows.iter().map(|r| r.bar).collect();
        validate_bars(&bars)?;

        for (index, row) in rows.iter().enumerate() {
            if let Some(m) = row.momentum.filter(|m| m.is_finite()) {
                if !(0.0..=100.0).contains(&m) {
                    return Err(TableError::MomentumOutOfRange { index, value: m });
                }
            }
        }

        let column = |f: fn(&IndicatorRow) -> Option<f64>| -> Vec<Option<f64>> {
            rows.iter().map(|r| f(r).filter(|v| v.is_finite())).collect()
        };

        Ok(Self {
            ema_fast: column(|r| r.ema_fast),
            ema_mid: column(|r| r.ema_mid),
            ema_slow: column(|r| r.ema_slow),
            momentum: column(|r| r.momentum),
            band_lower: column(|r| r.band_lower),
            band_mid: column(|r| r.band_mid),
            band_upper: column(|r| r.band_upper),
            bars,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last_index(&self) -> usize {
        self.bars.len().saturating_sub(1)
    }

    pub fn last_bar(&self) -> &Bar {
        &self.bars[self.last_index()]
    }

    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.last_bar().timestamp
    }

    /// Row view at `index`.
    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        let bar = *self.bars.get(index)?;
        Some(IndicatorRow {
            bar,
            ema_fast: self.ema_fast[index],
            ema_mid: self.ema_mid[index],
            ema_slow: self.ema_slow[index],
            momentum: self.momentum[index],
            band_lower: self.band_lower[index],
            band_mid: self.band_mid[index],
            band_upper: self.band_upper[index],
        })
    }

    pub fn last_row(&self) -> IndicatorRow {
        // A validated table has at least one row.
        self.row(self.last_index())
            .unwrap_or_else(|| IndicatorRow::from_bar(self.bars[0]))
    }

    /// All rows, in timestamp order.
    pub fn rows(&self) -> Vec<IndicatorRow> {
        (0..self.len()).filter_map(|i| self.row(i)).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn momentum_series(&self) -> &[Option<f64>] {
        &self.momentum
    }
}

fn validate_bars(bars: &[Bar]) -> Result<(), TableError> {
    if bars.is_empty() {
        return Err(TableError::Empty);
    }
    for (index, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(TableError::InvalidBar { index });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(TableError::NonIncreasingTimestamp {
                index,
                timestamp: bar.timestamp,
            });
        }
    }
    Ok(())
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TableError {
    #[error("Indicator table has no rows")]
    Empty,

    #[error("Bar {index} is not a valid candle (non-finite price, or high/low not bracketing open/close)")]
    InvalidBar { index: usize },

    #[error("Timestamp at row {index} ({timestamp}) is not after the previous row")]
    NonIncreasingTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("Momentum at row {index} is {value}, outside [0, 100]")]
    MomentumOutOfRange { index: usize, value: f64 },

    #[error("{0}")]
    Config(String),
}
