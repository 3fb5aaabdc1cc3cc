//! Decision composer. Merges Blue, Gold and Red into one canonical state.
//!
//! The outcome is a single [`Verdict`]; sphere, decision and risk label are
//! all read off it, so they can never disagree:
//!
//! | verdict   | sphere | decision              | risk                      |
//! |-----------|--------|-----------------------|---------------------------|
//! | `Observe` | Azul   | OBSERVAR              | Bajo                      |
//! | `Execute` | Dorada | OPERAR CON DISCIPLINA | Red level (Moderado if absent) |
//! | `Block`   | Roja   | NO OPERAR             | Alto or Muy alto          |
//!
//! [`compose`] reads a single table; [`structural::compose_structural`]
//! splits direction (macro table) from execution (execution table).

pub mod structural;

pub use structural::{compose_structural, Alignment, StructuralAlignment};

use crate::config::ScoringConfig;
use crate::domain::{Decision, Direction, RiskLevel, Sphere, VolatilityLevel};
use crate::scoring::{
    score_advantage, score_direction, score_risk, AdvantageScore, DirectionalScore, RiskScore,
};
use crate::table::IndicatorTable;
use serde::{Serialize, Serializer};

const OBSERVE_MESSAGE: &str = "No hay ventaja suficiente ahora. Mantente en OBSERVAR.";
const BLOCK_MESSAGE: &str = "Riesgo alto detectado. No operar hasta nueva lectura.";
const EXECUTE_FALLBACK_MESSAGE: &str = "Ventaja detectada. Ejecuta con disciplina.";

/// The one decision every evaluation ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Observe,
    Execute { risk: RiskLevel },
    Block { risk: RiskLevel },
}

impl Verdict {
    /// Apply the precedence rules: default observe, advantage executes,
    /// elevated risk blocks.
    pub fn from_scores(advantage: Option<&AdvantageScore>, risk: Option<&RiskScore>) -> Self {
        match (advantage, risk) {
            (_, Some(r)) if r.level.is_elevated() => Verdict::Block { risk: r.level },
            (Some(_), Some(r)) => Verdict::Execute { risk: r.level },
            (Some(_), None) => Verdict::Execute {
                risk: RiskLevel::Moderate,
            },
            (None, _) => Verdict::Observe,
        }
    }

    pub fn sphere(&self) -> Sphere {
        match self {
            Verdict::Observe => Sphere::Blue,
            Verdict::Execute { .. } => Sphere::Gold,
            Verdict::Block { .. } => Sphere::Red,
        }
    }

    pub fn decision(&self) -> Decision {
        match self {
            Verdict::Observe => Decision::Observe,
            Verdict::Execute { .. } => Decision::TradeWithDiscipline,
            Verdict::Block { .. } => Decision::DoNotTrade,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Verdict::Observe => RiskLevel::Low,
            Verdict::Execute { risk } | Verdict::Block { risk } => *risk,
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Labels {
            esfera: Sphere,
            decision: Decision,
            riesgo: RiskLevel,
        }
        Labels {
            esfera: self.sphere(),
            decision: self.decision(),
            riesgo: self.risk_level(),
        }
        .serialize(serializer)
    }
}

/// How the state was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadingMode {
    #[serde(rename = "simple")]
    Single,
    #[serde(rename = "estructural")]
    Structural,
}

/// Raw sub-scores kept for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugScores {
    pub azul: DirectionalScore,
    /// Execution-frame directional score, structural mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azul_ejecucion: Option<DirectionalScore>,
    pub dorado_activo: bool,
    pub micro_score_dorado: Option<u32>,
    pub rojo: Option<RiskScore>,
}

/// Canonical output of one evaluation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedState {
    #[serde(rename = "modo_lectura")]
    mode: ReadingMode,
    #[serde(rename = "direccion")]
    direction: Direction,
    #[serde(rename = "volatilidad")]
    volatility: VolatilityLevel,
    #[serde(rename = "score_alcista")]
    bullish_score: u32,
    #[serde(rename = "score_bajista")]
    bearish_score: u32,
    #[serde(rename = "umbral")]
    threshold: u32,
    #[serde(rename = "dorado")]
    advantage: Option<AdvantageScore>,
    #[serde(rename = "rojo")]
    risk: Option<RiskScore>,
    #[serde(flatten)]
    verdict: Verdict,
    #[serde(rename = "accion")]
    action: String,
    #[serde(rename = "mensaje")]
    message: String,
    #[serde(rename = "mensaje_direccion")]
    direction_message: String,
    #[serde(rename = "rsi")]
    momentum: Option<f64>,
    #[serde(rename = "estructura", skip_serializing_if = "Option::is_none")]
    structure: Option<StructuralAlignment>,
    debug: DebugScores,
}

impl ComposedState {
    pub fn mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn volatility(&self) -> VolatilityLevel {
        self.volatility
    }

    pub fn bullish_score(&self) -> u32 {
        self.bullish_score
    }

    pub fn bearish_score(&self) -> u32 {
        self.bearish_score
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn advantage(&self) -> Option<&AdvantageScore> {
        self.advantage.as_ref()
    }

    pub fn risk(&self) -> Option<&RiskScore> {
        self.risk.as_ref()
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn sphere(&self) -> Sphere {
        self.verdict.sphere()
    }

    pub fn decision(&self) -> Decision {
        self.verdict.decision()
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.verdict.risk_level()
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn direction_message(&self) -> &str {
        &self.direction_message
    }

    /// Last oscillator reading, rounded to two decimals.
    pub fn momentum(&self) -> Option<f64> {
        self.momentum
    }

    pub fn structure(&self) -> Option<&StructuralAlignment> {
        self.structure.as_ref()
    }

    pub fn debug(&self) -> &DebugScores {
        &self.debug
    }
}

/// Run Gold then Red for `direction` on `table`.
pub(crate) fn advantage_and_risk(
    table: &IndicatorTable,
    direction: Direction,
    memory_impact: i32,
    config: &ScoringConfig,
) -> (Option<AdvantageScore>, Option<RiskScore>) {
    let advantage = score_advantage(table, direction, config);
    let risk = advantage
        .as_ref()
        .map(|adv| score_risk(table, direction, adv, memory_impact, config));
    (advantage, risk)
}

/// Action and message that follow from the verdict.
fn verdict_texts(verdict: Verdict, advantage: Option<&AdvantageScore>) -> (String, String) {
    match verdict {
        Verdict::Observe => ("OBSERVAR".to_string(), OBSERVE_MESSAGE.to_string()),
        Verdict::Execute { .. } => match advantage {
            Some(adv) => (adv.action.clone(), adv.summary.clone()),
            None => ("Posible ventaja".to_string(), EXECUTE_FALLBACK_MESSAGE.to_string()),
        },
        Verdict::Block { .. } => ("NO OPERAR".to_string(), BLOCK_MESSAGE.to_string()),
    }
}

fn direction_message(direction: Direction) -> &'static str {
    match direction {
        Direction::Bullish => "Dirección alcista dominante.",
        Direction::Bearish => "Dirección bajista dominante.",
        Direction::Neutral => "Dirección neutral: sin ventaja estructural.",
    }
}

fn rounded_momentum(table: &IndicatorTable) -> Option<f64> {
    table.last_row().momentum.map(|m| (m * 100.0).round() / 100.0)
}

/// Compose the state for a single table.
///
/// `memory_impact` feeds the Red stage; pass 0 when there is no history.
///
/// # Panics
/// If `config.atr_period` is 0. [`ScoringConfig::validate`] rejects such a
/// config, and [`crate::pipeline::evaluate`] runs it first.
pub fn compose(table: &IndicatorTable, memory_impact: i32, config: &ScoringConfig) -> ComposedState {
    let blue = score_direction(table, config);
    let (advantage, risk) = advantage_and_risk(table, blue.direction, memory_impact, config);
    let verdict = Verdict::from_scores(advantage.as_ref(), risk.as_ref());
    let (action, message) = verdict_texts(verdict, advantage.as_ref());

    tracing::debug!(
        direction = %blue.direction,
        sphere = %verdict.sphere(),
        decision = %verdict.decision(),
        risk = %verdict.risk_level(),
        "composed state"
    );

    ComposedState {
        mode: ReadingMode::Single,
        direction: blue.direction,
        volatility: blue.volatility,
        bullish_score: blue.bullish,
        bearish_score: blue.bearish,
        threshold: blue.threshold,
        debug: DebugScores {
            azul: blue,
            azul_ejecucion: None,
            dorado_activo: advantage.is_some(),
            micro_score_dorado: advantage.as_ref().map(|a| a.micro_score),
            rojo: risk.clone(),
        },
        advantage,
        risk,
        verdict,
        action,
        message,
        direction_message: direction_message(blue.direction).to_string(),
        momentum: rounded_momentum(table),
        structure: None,
    }
}
