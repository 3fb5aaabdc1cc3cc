//! Risk scorer ("Red").
//!
//! Runs only behind an active advantage, which the signature enforces.
//! Independent factors accumulate into one micro-score that maps onto a
//! verbal level; it never blocks on its own, the composer decides that.

use super::{AdvantageScore, MarketMeasures};
use crate::config::ScoringConfig;
use crate::domain::{Direction, RiskLevel};
use crate::table::IndicatorTable;
use serde::{Deserialize, Serialize};

const MAX_REASONS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub micro_score: u32,
    #[serde(rename = "nivel")]
    pub level: RiskLevel,
    #[serde(rename = "razones")]
    pub reasons: Vec<String>,
}

impl RiskScore {
    pub(crate) fn new(micro_score: u32, reasons: Vec<String>) -> Self {
        Self {
            micro_score,
            level: RiskLevel::from_score(micro_score),
            reasons,
        }
    }
}

/// Accumulate risk for a trade in `direction` at the last row of `table`.
///
/// `memory_impact` is the caller's reading of similar past outcomes:
/// 0 is neutral, negative values mean bad history.
pub fn score_risk(
    table: &IndicatorTable,
    direction: Direction,
    advantage: &AdvantageScore,
    memory_impact: i32,
    config: &ScoringConfig,
) -> RiskScore {
    let m = MarketMeasures::from_table(table, config);
    let row = table.last_row();

    let mut score = 0;
    let mut reasons: Vec<String> = Vec::new();
    let mut add = |points: u32, reason: &str| {
        score += points;
        reasons.push(reason.to_string());
        tracing::trace!(points, reason, "risk factor");
    };

    // 1) Volatility expansion
    match m.volatility_ratio {
        Some(r) if r > 1.8 => add(3, "Volatilidad extrema (ATR muy elevado)."),
        Some(r) if r > 1.3 => add(2, "Volatilidad alta (ATR elevado)."),
        _ => {}
    }

    // 2) Extension from the fast EMA
    if let Some(ema) = row.ema_fast {
        let extension = m.distance_in_atr(ema);
        if extension > 2.2 {
            add(3, "Precio muy extendido respecto a EMA20.");
        } else if extension > 1.8 {
            add(2, "Precio extendido respecto a EMA20.");
        }
    }

    // 3) Adverse structural level close by
    match direction {
        Direction::Bullish if m.distance_in_atr(m.resistance) <= 0.8 => {
            add(2, "Cercanía a resistencia fuerte (posible rechazo).")
        }
        Direction::Bearish if m.distance_in_atr(m.support) <= 0.8 => {
            add(2, "Cercanía a soporte fuerte (posible rebote).")
        }
        _ => {}
    }

    // 4) Memory of similar contexts
    if memory_impact <= -2 {
        add(3, "Memoria histórica muy negativa en contexto similar.");
    } else if memory_impact == -1 {
        add(2, "Memoria negativa en contexto similar.");
    }

    // 5) Momentum divergence
    if let Some((price, momentum)) = divergence(table, config.divergence_window) {
        if direction == Direction::Bullish && price > 0.0 && momentum < 0.0 {
            add(2, "Divergencia RSI (precio sube, RSI cae).");
        }
        if direction == Direction::Bearish && price < 0.0 && momentum > 0.0 {
            add(2, "Divergencia RSI (precio cae, RSI sube).");
        }
    }

    reasons.truncate(MAX_REASONS);
    let risk = RiskScore::new(score, reasons);

    tracing::debug!(
        score = risk.micro_score,
        level = risk.level.label(),
        advantage = advantage.micro_score,
        memory_impact,
        "risk score"
    );
    risk
}

/// Price and momentum slopes (last minus first) over the trailing `window`
/// rows. `None` when the table is shorter than the window or the
/// oscillator is absent at either end.
fn divergence(table: &IndicatorTable, window: usize) -> Option<(f64, f64)> {
    if window < 2 || table.len() < window {
        return None;
    }
    let first = table.len() - window;
    let last = table.last_index();
    let momentum = table.momentum_series();
    let bars = table.bars();

    let momentum_slope = momentum[last]? - momentum[first]?;
    let price_slope = bars[last].close - bars[first].close;
    Some((price_slope, momentum_slope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::fixtures::{bullish_pullback_table, flat_rows};

    fn advantage(direction: Direction) -> AdvantageScore {
        AdvantageScore {
            direction,
            micro_score: 6,
            threshold: 4,
            action: String::new(),
            summary: String::new(),
            reasons: Vec::new(),
            estimated_rr: 2.0,
        }
    }

    fn risk_for(table: &IndicatorTable, direction: Direction, impact: i32) -> RiskScore {
        score_risk(
            table,
            direction,
            &advantage(direction),
            impact,
            &ScoringConfig::default(),
        )
    }

    #[test]
    fn clean_setup_is_low_risk() {
        let risk = risk_for(&bullish_pullback_table(), Direction::Bullish, 0);
        assert_eq!(risk.micro_score, 0);
        assert_eq!(risk.level, RiskLevel::Low);
        assert!(risk.reasons.is_empty());
    }

    #[test]
    fn very_negative_memory_adds_three() {
        let risk = risk_for(&bullish_pullback_table(), Direction::Bullish, -2);
        assert_eq!(risk.micro_score, 3);
        assert_eq!(risk.level, RiskLevel::Moderate);
        assert_eq!(
            risk.reasons,
            vec!["Memoria histórica muy negativa en contexto similar.".to_string()]
        );

        let worse = risk_for(&bullish_pullback_table(), Direction::Bullish, -7);
        assert_eq!(worse.micro_score, 3);
    }

    #[test]
    fn mildly_negative_memory_adds_two() {
        let risk = risk_for(&bullish_pullback_table(), Direction::Bullish, -1);
        assert_eq!(risk.micro_score, 2);
        assert_eq!(risk.reasons[0], "Memoria negativa en contexto similar.");
        assert_eq!(risk_for(&bullish_pullback_table(), Direction::Bullish, 1).micro_score, 0);
    }

    #[test]
    fn extension_and_adverse_level_escalate_to_high() {
        let mut rows = flat_rows(80, 100.0);
        rows[79].ema_fast = Some(95.5); // 2.25 ATR below the close
        let table = IndicatorTable::from_rows(rows).unwrap();

        // extension +3, resistance 0.5 ATR away +2, memory +3
        let risk = risk_for(&table, Direction::Bullish, -2);
        assert_eq!(risk.micro_score, 8);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.reasons[0], "Precio muy extendido respecto a EMA20.");
        assert_eq!(risk.reasons[1], "Cercanía a resistencia fuerte (posible rechazo).");
    }

    #[test]
    fn adverse_level_is_direction_specific() {
        let mut rows = flat_rows(80, 100.0);
        rows[50].bar.high = 108.0;
        let table = IndicatorTable::from_rows(rows).unwrap();
        // Resistance is far, support is 0.5 ATR away.
        assert_eq!(risk_for(&table, Direction::Bullish, 0).micro_score, 0);
        let bearish = risk_for(&table, Direction::Bearish, 0);
        assert_eq!(bearish.micro_score, 2);
        assert_eq!(bearish.reasons[0], "Cercanía a soporte fuerte (posible rebote).");
    }

    #[test]
    fn bullish_divergence_is_detected() {
        let mut rows = flat_rows(80, 100.0);
        for (k, row) in rows[74..].iter_mut().enumerate() {
            row.bar.close = 100.0 + 0.1 * k as f64;
            row.momentum = Some(60.0 - k as f64);
        }
        let table = IndicatorTable::from_rows(rows).unwrap();
        let risk = risk_for(&table, Direction::Bullish, 0);
        // adverse resistance +2, divergence +2
        assert_eq!(risk.micro_score, 4);
        assert_eq!(risk.reasons[1], "Divergencia RSI (precio sube, RSI cae).");
    }

    #[test]
    fn divergence_skipped_when_oscillator_absent() {
        let mut rows = flat_rows(80, 100.0);
        for (k, row) in rows[74..].iter_mut().enumerate() {
            row.bar.close = 100.0 + 0.1 * k as f64;
            row.momentum = Some(60.0 - k as f64);
        }
        rows[74].momentum = None;
        let table = IndicatorTable::from_rows(rows).unwrap();
        assert_eq!(risk_for(&table, Direction::Bullish, 0).micro_score, 2);
    }

    #[test]
    fn extreme_volatility_adds_three() {
        let mut rows = flat_rows(80, 100.0);
        for row in rows[66..].iter_mut() {
            row.bar.high = 105.0;
            row.bar.low = 95.0;
        }
        let table = IndicatorTable::from_rows(rows).unwrap();
        let risk = risk_for(&table, Direction::Bullish, 0);
        assert_eq!(risk.reasons[0], "Volatilidad extrema (ATR muy elevado).");
        // volatility +3, resistance at 0.5 ATR +2
        assert_eq!(risk.micro_score, 5);
        assert_eq!(risk.level, RiskLevel::Moderate);
    }
}
