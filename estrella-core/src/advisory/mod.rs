//! Advisory content selector ("Teach").
//!
//! Premium users get at most one short guidance message per evaluation.
//! Every rule in [`RULES`] whose guard matches produces a candidate; the
//! candidates are stably sorted by priority (lower wins) and the first is
//! returned. No match means no guidance.

pub mod rules;

pub use rules::{GuideTemplate, Rule, RULES};

use crate::composer::ComposedState;
use crate::context::IndicatorFlags;
use crate::domain::{Decision, RiskLevel};
use crate::memory::MemoryFlags;
use crate::session::Session;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub es_premium: bool,
}

impl UserProfile {
    pub fn premium() -> Self {
        Self { es_premium: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuideKind {
    #[serde(rename = "lectura")]
    Reading,
    #[serde(rename = "proteccion")]
    Protection,
    #[serde(rename = "disciplina")]
    Discipline,
    #[serde(rename = "correccion")]
    Correction,
    #[serde(rename = "ejecucion")]
    Execution,
}

/// Everything the rule guards look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisoryContext {
    pub decision: Decision,
    pub risk: RiskLevel,
    pub session: Option<Session>,
    /// Last oscillator reading.
    pub momentum: Option<f64>,
    pub memory: MemoryFlags,
    pub indicators: IndicatorFlags,
}

impl AdvisoryContext {
    pub fn from_state(
        state: &ComposedState,
        session: Option<Session>,
        memory: MemoryFlags,
        indicators: IndicatorFlags,
    ) -> Self {
        Self {
            decision: state.decision(),
            risk: state.risk_level(),
            session,
            momentum: state.momentum(),
            memory,
            indicators,
        }
    }
}

/// The single piece of guidance shown to the user. Built per evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryCandidate {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "ahora")]
    pub now: String,
    #[serde(rename = "porque")]
    pub because: String,
    #[serde(rename = "proximo")]
    pub next: String,
    #[serde(rename = "tipo")]
    pub kind: GuideKind,
    #[serde(rename = "prioridad")]
    pub priority: u8,
    #[serde(rename = "etiqueta")]
    pub tag: String,
}

impl From<&Rule> for AdvisoryCandidate {
    fn from(rule: &Rule) -> Self {
        let t = &rule.template;
        Self {
            title: t.title.to_string(),
            now: t.now.to_string(),
            because: t.because.to_string(),
            next: t.next.to_string(),
            kind: t.kind,
            priority: rule.priority,
            tag: rule.tag.to_string(),
        }
    }
}

/// Pick the guidance for `profile` in `ctx`, if any.
pub fn select_advisory(profile: &UserProfile, ctx: &AdvisoryContext) -> Option<AdvisoryCandidate> {
    if !profile.es_premium {
        return None;
    }

    let mut matches: Vec<&Rule> = RULES.iter().filter(|rule| (rule.applies)(ctx)).collect();
    matches.sort_by_key(|rule| rule.priority);

    let chosen = matches.first()?;
    tracing::debug!(
        tag = chosen.tag,
        priority = chosen.priority,
        candidates = matches.len(),
        "advisory selected"
    );
    Some(AdvisoryCandidate::from(*chosen))
}
