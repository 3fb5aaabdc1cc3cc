//! Structural mode: a macro table sets the bias, an execution table times it.
//!
//! The directional scorer runs on both tables and their relation becomes an
//! [`Alignment`]. A conflict blocks before Gold and Red are consulted;
//! otherwise they run on the execution table with the macro direction.

use super::{
    advantage_and_risk, rounded_momentum, verdict_texts, ComposedState, DebugScores, ReadingMode,
    Verdict,
};
use crate::config::ScoringConfig;
use crate::domain::{Direction, RiskLevel};
use crate::scoring::{score_direction, RiskScore};
use crate::table::IndicatorTable;
use serde::{Deserialize, Serialize};

/// Micro-score reported for the synthetic conflict risk block.
pub const CONFLICT_RISK_SCORE: u32 = 9;

const CONFLICT_MESSAGE: &str = "Conflicto entre marco macro y de ejecución. No operar hasta nueva alineación.";
const PAUSE_MESSAGE: &str = "Macro definida, pero el marco de ejecución aún está en pausa/retroceso. \
                             Mantente en OBSERVAR hasta ventaja clara.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    #[serde(rename = "ALINEADO")]
    Aligned,
    #[serde(rename = "RETROCESO_O_PAUSA")]
    PullbackOrPause,
    #[serde(rename = "CONFLICTO")]
    Conflict,
    #[serde(rename = "SIN_SESGO_MACRO")]
    NoMacroBias,
}

impl Alignment {
    pub fn classify(macro_direction: Direction, execution_direction: Direction) -> Self {
        if !macro_direction.is_directional() {
            Alignment::NoMacroBias
        } else if execution_direction == macro_direction {
            Alignment::Aligned
        } else if !execution_direction.is_directional() {
            Alignment::PullbackOrPause
        } else {
            Alignment::Conflict
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Alignment::Aligned => "ALINEADO",
            Alignment::PullbackOrPause => "RETROCESO_O_PAUSA",
            Alignment::Conflict => "CONFLICTO",
            Alignment::NoMacroBias => "SIN_SESGO_MACRO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralAlignment {
    #[serde(rename = "direccion_macro")]
    pub macro_direction: Direction,
    #[serde(rename = "direccion_ejecucion")]
    pub execution_direction: Direction,
    #[serde(rename = "alineacion")]
    pub alignment: Alignment,
}

fn conflict_risk(macro_direction: Direction, execution_direction: Direction) -> RiskScore {
    RiskScore {
        micro_score: CONFLICT_RISK_SCORE,
        level: RiskLevel::High,
        reasons: vec![
            format!("Conflicto de marcos: macro {macro_direction} vs ejecución {execution_direction}."),
            "Espera alineación antes de ejecutar.".to_string(),
        ],
    }
}

fn direction_message(direction: Direction) -> &'static str {
    match direction {
        Direction::Bullish => "Dirección alcista dominante (marco macro).",
        Direction::Bearish => "Dirección bajista dominante (marco macro).",
        Direction::Neutral => "Dirección neutral en el marco macro: sin sesgo estructural.",
    }
}

/// Compose the state from a macro table and an execution table.
pub fn compose_structural(
    macro_table: &IndicatorTable,
    execution_table: &IndicatorTable,
    memory_impact: i32,
    config: &ScoringConfig,
) -> ComposedState {
    let blue_macro = score_direction(macro_table, config);
    let blue_execution = score_direction(execution_table, config);
    let alignment = Alignment::classify(blue_macro.direction, blue_execution.direction);

    let (advantage, risk, verdict) = match alignment {
        Alignment::Conflict => {
            let risk = conflict_risk(blue_macro.direction, blue_execution.direction);
            let verdict = Verdict::Block { risk: risk.level };
            (None, Some(risk), verdict)
        }
        Alignment::NoMacroBias => (None, None, Verdict::Observe),
        Alignment::Aligned | Alignment::PullbackOrPause => {
            let (advantage, risk) =
                advantage_and_risk(execution_table, blue_macro.direction, memory_impact, config);
            let verdict = Verdict::from_scores(advantage.as_ref(), risk.as_ref());
            (advantage, risk, verdict)
        }
    };

    let (action, mut message) = verdict_texts(verdict, advantage.as_ref());
    match alignment {
        Alignment::Conflict => message = CONFLICT_MESSAGE.to_string(),
        Alignment::PullbackOrPause if advantage.is_none() => message = PAUSE_MESSAGE.to_string(),
        _ => {}
    }

    tracing::debug!(
        macro_direction = %blue_macro.direction,
        execution_direction = %blue_execution.direction,
        alignment = alignment.label(),
        sphere = %verdict.sphere(),
        "composed structural state"
    );

    ComposedState {
        mode: ReadingMode::Structural,
        direction: blue_macro.direction,
        volatility: blue_execution.volatility,
        bullish_score: blue_macro.bullish,
        bearish_score: blue_macro.bearish,
        threshold: blue_macro.threshold,
        debug: DebugScores {
            azul: blue_macro,
            azul_ejecucion: Some(blue_execution),
            dorado_activo: advantage.is_some(),
            micro_score_dorado: advantage.as_ref().map(|a| a.micro_score),
            rojo: risk.clone(),
        },
        advantage,
        risk,
        verdict,
        action,
        message,
        direction_message: direction_message(blue_macro.direction).to_string(),
        momentum: rounded_momentum(execution_table),
        structure: Some(StructuralAlignment {
            macro_direction: blue_macro.direction,
            execution_direction: blue_execution.direction,
            alignment,
        }),
    }
}
