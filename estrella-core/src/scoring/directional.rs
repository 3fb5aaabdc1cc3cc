//! Directional scorer ("Blue").
//!
//! Four independent signals each add a fixed weight to exactly one side:
//!
//! | signal    | weight | bullish                     | bearish                     |
//! |-----------|--------|-----------------------------|-----------------------------|
//! | structure | 3      | rolling high and low rising | rolling high and low falling|
//! | EMA stack | 2      | fast > mid > slow           | fast < mid < slow           |
//! | momentum  | 1      | oscillator > 55             | oscillator < 45             |
//!
//! The volatility regime does not vote; it sets how large the edge must be
//! before it counts as a direction (Alta 4, Normal 3, Baja 2).

use super::volatility_ratio;
use crate::config::ScoringConfig;
use crate::domain::{Direction, VolatilityLevel};
use crate::indicators::{window_max, window_min};
use crate::table::{IndicatorRow, IndicatorTable};
use serde::{Deserialize, Serialize};

pub const STRUCTURE_WEIGHT: u32 = 3;
pub const EMA_STACK_WEIGHT: u32 = 2;
pub const MOMENTUM_WEIGHT: u32 = 1;

const MOMENTUM_BULLISH_ABOVE: f64 = 55.0;
const MOMENTUM_BEARISH_BELOW: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalScore {
    #[serde(rename = "alcista")]
    pub bullish: u32,
    #[serde(rename = "bajista")]
    pub bearish: u32,
    #[serde(rename = "umbral")]
    pub threshold: u32,
    #[serde(rename = "direccion")]
    pub direction: Direction,
    #[serde(rename = "volatilidad_nivel")]
    pub volatility: VolatilityLevel,
}

impl DirectionalScore {
    /// Score reported when the table is too short to be trusted.
    pub fn neutral() -> Self {
        Self {
            bullish: 0,
            bearish: 0,
            threshold: 3,
            direction: Direction::Neutral,
            volatility: VolatilityLevel::Normal,
        }
    }
}

/// Score the dominant direction at the last row of `table`.
pub fn score_direction(table: &IndicatorTable, config: &ScoringConfig) -> DirectionalScore {
    if table.len() < config.min_rows {
        tracing::debug!(
            rows = table.len(),
            min_rows = config.min_rows,
            "directional: not enough history, neutral default"
        );
        return DirectionalScore::neutral();
    }

    let mut bullish = 0;
    let mut bearish = 0;
    let mut vote = |side: Option<Direction>, weight: u32, signal: &str| {
        match side {
            Some(Direction::Bullish) => bullish += weight,
            Some(Direction::Bearish) => bearish += weight,
            _ => {}
        }
        tracing::trace!(signal, side = ?side, weight, "directional signal");
    };

    let last = table.last_row();
    vote(structure_signal(table, config.structure_window), STRUCTURE_WEIGHT, "structure");
    vote(ema_stack_signal(&last), EMA_STACK_WEIGHT, "ema_stack");
    vote(momentum_signal(&last), MOMENTUM_WEIGHT, "momentum");

    let (volatility, threshold) = volatility_regime(volatility_ratio(table, config));

    let edge = i64::from(bullish) - i64::from(bearish);
    let direction = if edge >= i64::from(threshold) {
        Direction::Bullish
    } else if -edge >= i64::from(threshold) {
        Direction::Bearish
    } else {
        Direction::Neutral
    };

    tracing::debug!(
        bullish,
        bearish,
        threshold,
        direction = %direction,
        volatility = volatility.label(),
        "directional score"
    );

    DirectionalScore {
        bullish,
        bearish,
        threshold,
        direction,
        volatility,
    }
}

/// Compare the rolling high/low at the last row against the previous row.
pub fn structure_signal(table: &IndicatorTable, window: usize) -> Option<Direction> {
    let last = table.last_index();
    if last < 1 {
        return None;
    }
    let highs = table.highs();
    let lows = table.lows();

    let high_now = window_max(&highs, last, window)?;
    let high_prev = window_max(&highs, last - 1, window)?;
    let low_now = window_min(&lows, last, window)?;
    let low_prev = window_min(&lows, last - 1, window)?;

    if high_now > high_prev && low_now > low_prev {
        Some(Direction::Bullish)
    } else if high_now < high_prev && low_now < low_prev {
        Some(Direction::Bearish)
    } else {
        None
    }
}

/// Strict EMA ordering. Any absent EMA skips the signal.
pub fn ema_stack_signal(row: &IndicatorRow) -> Option<Direction> {
    let (fast, mid, slow) = (row.ema_fast?, row.ema_mid?, row.ema_slow?);
    if fast > mid && mid > slow {
        Some(Direction::Bullish)
    } else if fast < mid && mid < slow {
        Some(Direction::Bearish)
    } else {
        None
    }
}

pub fn momentum_signal(row: &IndicatorRow) -> Option<Direction> {
    let momentum = row.momentum?;
    if momentum > MOMENTUM_BULLISH_ABOVE {
        Some(Direction::Bullish)
    } else if momentum < MOMENTUM_BEARISH_BELOW {
        Some(Direction::Bearish)
    } else {
        None
    }
}

/// Regime and direction threshold for a volatility ratio. Absent ⇒ Normal.
pub fn volatility_regime(ratio: Option<f64>) -> (VolatilityLevel, u32) {
    match ratio {
        Some(r) if r > 1.3 => (VolatilityLevel::High, 4),
        Some(r) if r < 0.7 => (VolatilityLevel::Low, 2),
        _ => (VolatilityLevel::Normal, 3),
    }
}
