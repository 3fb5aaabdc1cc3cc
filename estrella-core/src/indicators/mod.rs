//! Concrete indicator implementations.
//!
//! Indicators are pure functions: bar history in, one value per bar out.
//! A value is `None` until the indicator's lookback window is satisfied, so a
//! warm-up value can never be mistaken for a real zero or take part in a
//! comparison by accident.
//!
//! Multi-series indicators (Bollinger) are exposed as separate named
//! instances per band, keeping the single-series `Indicator` trait unchanged.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod rolling;
pub mod rsi;

pub use atr::{true_range, Atr};
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::Ema;
pub use rolling::{rolling_mean, window_max, window_min};
pub use rsi::Rsi;

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce an output series of the
/// same length. The first `lookback()` values are `None` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or
/// later. Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces a value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLC: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, one bar per hour.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: Some(1000.0),
            }
        })
        .collect()
}

/// Assert an indicator value is present and approximately equal to `expected`.
#[cfg(test)]
pub fn assert_approx(actual: Option<f64>, expected: f64, epsilon: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {expected}, got an absent value"));
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
