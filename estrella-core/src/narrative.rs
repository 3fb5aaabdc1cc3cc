//! The voice of the verdict and a short human summary of a composed state.
//!
//! Presentation only: nothing here feeds back into scoring.

use crate::advisory::AdvisoryCandidate;
use crate::composer::ComposedState;
use crate::domain::{Direction, RiskLevel, Sphere};
use crate::memory::InfluenceLevel;
use serde::Serialize;

const SIGNATURE: &str = "Estrella:";

/// Base voice for the sphere of `state`.
pub fn voice(state: &ComposedState) -> String {
    match state.sphere() {
        Sphere::Blue => format!(
            "{SIGNATURE}\nObserva con atención.\n\n{}\n\nEl análisis paciente es una ventaja que pocos usan.",
            state.message()
        ),
        Sphere::Gold => format!(
            "{SIGNATURE}\nEste es un buen contexto.\n\n{}\n\nRecuerda: una buena entrada empieza con una buena decisión.",
            state.message()
        ),
        Sphere::Red => format!(
            "{SIGNATURE}\nPrefiero que hoy no arriesgues. El mercado no está claro.\n\n{}",
            state.message()
        ),
    }
}

/// Voice modulated by how strongly memory weighs on the context.
///
/// Protection replaces the voice entirely.
pub fn voice_with_memory(state: &ComposedState, level: InfluenceLevel) -> String {
    let base = voice(state);
    match level {
        InfluenceLevel::Absent => base,
        InfluenceLevel::Mild => format!(
            "{base}\n\nLa Estrella recuerda experiencias previas similares. Observa con atención."
        ),
        InfluenceLevel::Warning => format!(
            "{base}\n\nAdvertencia de memoria: este contexto ha generado errores antes. \
             Reduce riesgo y confirma más de lo normal."
        ),
        InfluenceLevel::Protection => "Memoria de protección activa.\n\n\
             La Estrella ha visto pérdidas repetidas en este contexto.\n\
             No es recomendable operar ahora."
            .to_string(),
    }
}

/// Verbal strength of the directional lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strength {
    #[serde(rename = "fuerte")]
    Strong,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "debil")]
    Weak,
}

impl Strength {
    /// Strong two points past the threshold, medium at the threshold.
    pub fn of(bullish: u32, bearish: u32, threshold: u32) -> Self {
        let diff = bullish.abs_diff(bearish);
        if diff >= threshold + 2 {
            Strength::Strong
        } else if diff >= threshold {
            Strength::Medium
        } else {
            Strength::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionSummary {
    #[serde(rename = "valor")]
    pub value: Direction,
    #[serde(rename = "fortaleza")]
    pub strength: Strength,
    pub score_alcista: u32,
    pub score_bajista: u32,
    #[serde(rename = "umbral")]
    pub threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvantageSummary {
    #[serde(rename = "activo")]
    pub active: bool,
    pub micro_score: Option<u32>,
    #[serde(rename = "umbral")]
    pub threshold: Option<u32>,
    #[serde(rename = "razones")]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    #[serde(rename = "nivel")]
    pub level: Option<RiskLevel>,
    pub micro_score: Option<u32>,
    #[serde(rename = "razones")]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisorySummary {
    #[serde(rename = "activo")]
    pub active: bool,
    pub premium: bool,
    #[serde(rename = "titulo")]
    pub title: Option<String>,
}

/// Condensed view of a state for a debug panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HumanSummary {
    #[serde(rename = "direccion")]
    pub direction: DirectionSummary,
    #[serde(rename = "dorado")]
    pub advantage: AdvantageSummary,
    #[serde(rename = "rojo")]
    pub risk: RiskSummary,
    #[serde(rename = "ensenar")]
    pub advisory: AdvisorySummary,
}

const SUMMARY_REASONS: usize = 2;

fn first_reasons(reasons: &[String]) -> Vec<String> {
    reasons
        .iter()
        .filter(|r| !r.trim().is_empty())
        .take(SUMMARY_REASONS)
        .cloned()
        .collect()
}

pub fn human_summary(
    state: &ComposedState,
    advisory: Option<&AdvisoryCandidate>,
    premium: bool,
) -> HumanSummary {
    let advantage = state.advantage();
    let risk = state.risk();

    HumanSummary {
        direction: DirectionSummary {
            value: state.direction(),
            strength: Strength::of(state.bullish_score(), state.bearish_score(), state.threshold()),
            score_alcista: state.bullish_score(),
            score_bajista: state.bearish_score(),
            threshold: state.threshold(),
        },
        advantage: AdvantageSummary {
            active: advantage.is_some(),
            micro_score: advantage.map(|a| a.micro_score),
            threshold: advantage.map(|a| a.threshold),
            reasons: advantage.map(|a| first_reasons(&a.reasons)).unwrap_or_default(),
        },
        risk: RiskSummary {
            level: risk.map(|r| r.level),
            micro_score: risk.map(|r| r.micro_score),
            reasons: risk.map(|r| first_reasons(&r.reasons)).unwrap_or_default(),
        },
        advisory: AdvisorySummary {
            active: premium && advisory.is_some(),
            premium,
            title: advisory.map(|a| a.title.clone()),
        },
    }
}
