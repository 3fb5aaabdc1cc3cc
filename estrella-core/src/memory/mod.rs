//! Recall / memory influence.
//!
//! Reads the caller's recall log for the sphere of the current state and
//! reduces it to a discrete influence level, a warning text and, for callers
//! that want the log to feed the Red stage, a memory-impact term.

pub mod record;

pub use record::{ErrorCategory, MemoryFlags, RecallKind, RecallLog, RecallRecord};

use crate::domain::Sphere;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How strongly past outcomes weigh on the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum InfluenceLevel {
    Absent = 0,
    Mild = 1,
    Warning = 2,
    Protection = 3,
}

impl InfluenceLevel {
    /// Memory-impact term for the risk scorer.
    pub fn impact(&self) -> i32 {
        match self {
            InfluenceLevel::Protection => -2,
            InfluenceLevel::Warning => -1,
            InfluenceLevel::Mild | InfluenceLevel::Absent => 0,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            InfluenceLevel::Protection => "Memoria de protección activa.",
            InfluenceLevel::Warning => "Memoria de advertencia.",
            InfluenceLevel::Mild => "Memoria leve de aprendizaje/observación.",
            InfluenceLevel::Absent => "Sin memoria relevante para este contexto.",
        }
    }
}

impl From<InfluenceLevel> for u8 {
    fn from(level: InfluenceLevel) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for InfluenceLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InfluenceLevel::Absent),
            1 => Ok(InfluenceLevel::Mild),
            2 => Ok(InfluenceLevel::Warning),
            3 => Ok(InfluenceLevel::Protection),
            other => Err(format!("influence level out of range: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfluence {
    #[serde(rename = "nivel")]
    pub level: InfluenceLevel,
    #[serde(rename = "errores")]
    pub errors: usize,
    #[serde(rename = "aprendizajes")]
    pub learnings: usize,
    #[serde(rename = "observaciones")]
    pub observations: usize,
    #[serde(rename = "mensaje")]
    pub message: String,
}

/// Influence of the records matching `sphere`.
///
/// Three or more errors protect, any error warns, any other record is mild.
pub fn memory_influence(log: &RecallLog, sphere: Sphere) -> MemoryInfluence {
    let (mut errors, mut learnings, mut observations) = (0, 0, 0);
    for record in log.relevant(sphere) {
        match record.kind {
            RecallKind::Error => errors += 1,
            RecallKind::Learning => learnings += 1,
            RecallKind::Observation => observations += 1,
        }
    }

    let level = if errors >= 3 {
        InfluenceLevel::Protection
    } else if errors >= 1 {
        InfluenceLevel::Warning
    } else if learnings + observations > 0 {
        InfluenceLevel::Mild
    } else {
        InfluenceLevel::Absent
    };

    tracing::debug!(
        sphere = %sphere,
        errors,
        learnings,
        observations,
        level = u8::from(level),
        "memory influence"
    );

    MemoryInfluence {
        level,
        errors,
        learnings,
        observations,
        message: level.message().to_string(),
    }
}

/// Group error records by category. Non-error records are ignored.
pub fn classify_errors<'a>(
    records: impl IntoIterator<Item = &'a RecallRecord>,
) -> BTreeMap<ErrorCategory, Vec<&'a RecallRecord>> {
    let mut groups: BTreeMap<ErrorCategory, Vec<&'a RecallRecord>> = BTreeMap::new();
    for record in records {
        if record.kind == RecallKind::Error {
            groups.entry(record.error_category()).or_default().push(record);
        }
    }
    groups
}

/// Category-specific warning for `sphere`, or `None` without errors.
pub fn memory_warning(log: &RecallLog, sphere: Sphere) -> Option<String> {
    let groups = classify_errors(log.relevant(sphere));
    if groups.is_empty() {
        return None;
    }

    let lines: Vec<&str> = groups
        .keys()
        .map(|category| match category {
            ErrorCategory::Impulsivity => {
                "La Estrella recuerda errores por impulsividad en situaciones similares."
            }
            ErrorCategory::Technical => "Hay recuerdos de fallos técnicos no confirmados previamente.",
            ErrorCategory::Context => "El contexto del mercado ya ha causado errores en el pasado.",
            ErrorCategory::Unknown => "Existen errores previos sin causa claramente identificada.",
        })
        .collect();

    Some(format!("{}\n\nAvanza con extrema cautela.", lines.join("\n")))
}
