//! The three scoring stages and the market measures they share.
//!
//! - [`directional`] ("Blue"): structural/trend bias and volatility regime.
//! - [`advantage`] ("Gold"): bounded opportunity score, only for a bias.
//! - [`risk`] ("Red"): accumulated risk factors, only with an advantage.
//!
//! All distances the Gold and Red stages compare are expressed in ATR units,
//! measured from the last close.

pub mod advantage;
pub mod directional;
pub mod risk;

pub use advantage::{score_advantage, AdvantageScore};
pub use directional::{score_direction, DirectionalScore};
pub use risk::{score_risk, RiskScore};

use crate::config::ScoringConfig;
use crate::indicators::{rolling_mean, window_max, window_min, Atr, Indicator};
use crate::table::IndicatorTable;

/// Floor applied to ATR before it is used as a divisor.
pub const ATR_EPSILON: f64 = 1e-9;

/// Per-evaluation measures read by the Gold and Red stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketMeasures {
    pub close: f64,
    /// ATR at the last bar, floored at [`ATR_EPSILON`].
    pub atr: f64,
    /// ATR over its own rolling mean; `None` while history is too short.
    pub volatility_ratio: Option<f64>,
    /// Lowest low of the level lookback.
    pub support: f64,
    /// Highest high of the level lookback.
    pub resistance: f64,
}

impl MarketMeasures {
    pub fn from_table(table: &IndicatorTable, config: &ScoringConfig) -> Self {
        let last = table.last_index();
        let atr_series = Atr::new(config.atr_period).compute(table.bars());
        let atr = atr_series[last].unwrap_or(0.0).max(ATR_EPSILON);

        // The lookback shrinks to whatever history exists.
        let lookback = config.level_lookback.min(table.len());
        let support = window_min(&table.lows(), last, lookback).unwrap_or(table.last_bar().low);
        let resistance =
            window_max(&table.highs(), last, lookback).unwrap_or(table.last_bar().high);

        Self {
            close: table.last_bar().close,
            atr,
            volatility_ratio: volatility_ratio_from_atr(&atr_series, config.volatility_window),
            support,
            resistance,
        }
    }

    /// Absolute distance from the last close to `level`, in ATR units.
    pub fn distance_in_atr(&self, level: f64) -> f64 {
        (self.close - level).abs() / self.atr
    }
}

/// Current ATR divided by the rolling mean of ATR over `window` bars.
pub fn volatility_ratio(table: &IndicatorTable, config: &ScoringConfig) -> Option<f64> {
    let atr_series = Atr::new(config.atr_period).compute(table.bars());
    volatility_ratio_from_atr(&atr_series, config.volatility_window)
}

fn volatility_ratio_from_atr(atr_series: &[Option<f64>], window: usize) -> Option<f64> {
    let current = (*atr_series.last()?)?;
    let mean = (*rolling_mean(atr_series, window).last()?)?;
    if mean <= 0.0 {
        // A perfectly flat market has no regime to speak of.
        return Some(1.0);
    }
    Some(current / mean)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Hand-built tables shared by the scorer tests.

    use crate::domain::Bar;
    use crate::table::{IndicatorRow, IndicatorTable};
    use chrono::TimeZone;

    /// `n` flat bars around `price` (high = price + 1, low = price - 1), so
    /// true range and ATR are exactly 2.0 once warmed up.
    pub fn flat_rows(n: usize, price: f64) -> Vec<IndicatorRow> {
        let base = chrono::Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                IndicatorRow::from_bar(Bar {
                    timestamp: base + chrono::Duration::hours(4 * i as i64),
                    open: price,
                    high: price + 1.0,
                    low: price - 1.0,
                    close: price,
                    volume: None,
                })
            })
            .collect()
    }

    /// Flat table at 100 with a single spike bar 30 bars before the end,
    /// putting resistance at 108 (4 ATR above the close) while leaving the
    /// last ATR at 2.0. Fast and mid EMAs sit on the close, momentum at 60.
    pub fn bullish_pullback_table() -> IndicatorTable {
        let mut rows = flat_rows(80, 100.0);
        rows[50].bar.high = 108.0;
        for row in rows.iter_mut() {
            row.ema_fast = Some(100.0);
            row.ema_mid = Some(100.0);
            row.momentum = Some(60.0);
        }
        IndicatorTable::from_rows(rows).unwrap()
    }

    /// Stacked EMAs plus momentum give a bullish bias of exactly 3; the close
    /// sits on the EMAs with resistance 4 ATR above.
    pub fn bullish_setup_table() -> IndicatorTable {
        let mut rows = flat_rows(80, 100.0);
        rows[50].bar.high = 108.0;
        for row in rows.iter_mut() {
            row.ema_fast = Some(100.5);
            row.ema_mid = Some(100.0);
            row.ema_slow = Some(99.0);
            row.momentum = Some(60.0);
        }
        IndicatorTable::from_rows(rows).unwrap()
    }

    /// Mirror image of [`bullish_pullback_table`]: support 4 ATR below.
    pub fn bearish_pullback_table() -> IndicatorTable {
        let mut rows = flat_rows(80, 100.0);
        rows[50].bar.low = 92.0;
        for row in rows.iter_mut() {
            row.ema_fast = Some(100.0);
            row.ema_mid = Some(100.0);
            row.momentum = Some(40.0);
        }
        IndicatorTable::from_rows(rows).unwrap()
    }
}
