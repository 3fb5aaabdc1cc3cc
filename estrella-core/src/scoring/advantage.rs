//! Advantage scorer ("Gold").
//!
//! Only evaluated once a direction exists. Points come from three places:
//! a pullback toward the fast/mid EMA, price sitting near the structurally
//! favorable level (support when bullish, resistance when bearish), and the
//! estimated reward:risk toward the opposite level over a 1-ATR stop.
//!
//! The activation threshold adapts to the volatility regime and relaxes by
//! one point when reward:risk is at least 2. Missing the threshold returns
//! `None`, which is the common outcome.
//!
//! After the gate a second, looser favorable-level proximity bonus is added.
//! It overlaps the zone check above and so counts the same proximity twice;
//! the published micro-scores include it, so it stays.

use super::{volatility_ratio, MarketMeasures};
use crate::config::ScoringConfig;
use crate::domain::Direction;
use crate::table::IndicatorTable;
use serde::{Deserialize, Serialize};

const MAX_REASONS: usize = 5;
const STOP_ATR: f64 = 1.0;
const MIN_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvantageScore {
    #[serde(rename = "direccion")]
    pub direction: Direction,
    pub micro_score: u32,
    /// Base threshold from the volatility regime, before any relaxation.
    #[serde(rename = "umbral")]
    pub threshold: u32,
    #[serde(rename = "accion")]
    pub action: String,
    #[serde(rename = "resumen")]
    pub summary: String,
    #[serde(rename = "razones")]
    pub reasons: Vec<String>,
    #[serde(rename = "rr_estimado")]
    pub estimated_rr: f64,
}

/// Score the opportunity in `direction`. `None` when neutral or below threshold.
pub fn score_advantage(
    table: &IndicatorTable,
    direction: Direction,
    config: &ScoringConfig,
) -> Option<AdvantageScore> {
    if !direction.is_directional() {
        return None;
    }

    let m = MarketMeasures::from_table(table, config);
    let row = table.last_row();
    let bullish = direction == Direction::Bullish;

    let mut score = 0;
    let mut reasons: Vec<String> = Vec::new();

    // 1) Pullback toward the fast/mid EMA
    let pullback = [row.ema_fast, row.ema_mid]
        .into_iter()
        .flatten()
        .map(|ema| m.distance_in_atr(ema))
        .reduce(f64::min);
    match pullback {
        Some(d) if d <= 0.8 => {
            score += 2;
            reasons.push("Retroceso saludable cerca de EMA20/EMA50 (no extendido).".into());
        }
        Some(d) if d <= 1.2 => {
            score += 1;
            reasons.push("Precio razonablemente cerca de EMAs (retroceso aceptable).".into());
        }
        _ => {}
    }

    // 2) Favorable structural zone
    let dist_support = m.distance_in_atr(m.support);
    let dist_resistance = m.distance_in_atr(m.resistance);
    let (favorable, opposite) = if bullish {
        (dist_support, dist_resistance)
    } else {
        (dist_resistance, dist_support)
    };
    if favorable <= 1.2 && opposite >= 1.2 {
        score += 2;
        reasons.push(if bullish {
            "Precio en zona favorable (más cerca de soporte que de resistencia).".into()
        } else {
            "Precio en zona favorable (más cerca de resistencia que de soporte).".into()
        });
    } else if favorable <= 1.2 {
        score += 1;
        reasons.push(if bullish {
            "Precio cerca de soporte reciente (zona interesante).".into()
        } else {
            "Precio cerca de resistencia reciente (zona interesante).".into()
        });
    }

    // 3) Reward:risk toward the opposite level
    let target_atr = if bullish {
        ((m.resistance - m.close) / m.atr).max(0.0)
    } else {
        ((m.close - m.support) / m.atr).max(0.0)
    };
    let rr = target_atr / STOP_ATR;
    if rr >= 2.0 {
        score += 2;
        reasons.push("RR estimado >= 1:2 (ventaja de ejecución).".into());
    } else if rr >= 1.5 {
        score += 1;
        reasons.push("RR estimado aceptable (~1:1.5).".into());
    }

    let threshold = base_threshold(volatility_ratio(table, config));
    let effective = effective_threshold(threshold, rr);

    if score < effective {
        tracing::debug!(
            score,
            threshold,
            effective,
            rr,
            direction = %direction,
            "advantage: below threshold"
        );
        return None;
    }

    // Looser proximity bonus, applied once the gate has passed.
    if favorable <= 1.5 {
        score += 2;
        reasons.push(if bullish {
            "Precio en zona interesante (cerca de soporte reciente).".into()
        } else {
            "Precio en zona interesante (cerca de resistencia reciente).".into()
        });
    } else if favorable <= 2.2 {
        score += 1;
        reasons.push(if bullish {
            "Precio relativamente cercano a soporte (zona posible).".into()
        } else {
            "Precio relativamente cercano a resistencia (zona posible).".into()
        });
    }

    let (action, summary) = if bullish {
        (
            "Posible preparación alcista".to_string(),
            format!("Ventaja alcista detectada (micro-score {score}/{effective})"),
        )
    } else {
        (
            "Posible preparación bajista".to_string(),
            format!("Ventaja bajista detectada (micro-score {score}/{effective})"),
        )
    };

    reasons.truncate(MAX_REASONS);
    let estimated_rr = (rr * 100.0).round() / 100.0;

    tracing::debug!(
        score,
        threshold,
        effective,
        rr = estimated_rr,
        direction = %direction,
        "advantage: active"
    );

    Some(AdvantageScore {
        direction,
        micro_score: score,
        threshold,
        action,
        summary,
        reasons,
        estimated_rr,
    })
}

/// Base activation threshold for a volatility ratio. Absent ⇒ standard.
pub fn base_threshold(ratio: Option<f64>) -> u32 {
    match ratio {
        Some(r) if r > 1.3 => 5,
        Some(r) if r < 0.8 => 3,
        _ => 4,
    }
}

/// Relax the base threshold by one when reward:risk reaches 2, never below 2.
pub fn effective_threshold(base: u32, rr: f64) -> u32 {
    let relax = u32::from(rr >= 2.0);
    base.saturating_sub(relax).max(MIN_THRESHOLD)
}
