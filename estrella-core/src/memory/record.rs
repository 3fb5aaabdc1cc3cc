//! Recall records and the append-only log that holds them.

use crate::domain::Sphere;
use serde::{Deserialize, Serialize};

/// What kind of past outcome a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecallKind {
    #[serde(rename = "observacion", alias = "observación")]
    Observation,
    #[serde(rename = "aprendizaje")]
    Learning,
    #[serde(rename = "error")]
    Error,
}

/// Cause attached to an error record. Anything unrecognized is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ErrorCategory {
    #[serde(rename = "impulsividad")]
    Impulsivity,
    #[serde(rename = "tecnico")]
    Technical,
    #[serde(rename = "contexto")]
    Context,
    #[serde(rename = "desconocido")]
    Unknown,
}

impl From<String> for ErrorCategory {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "impulsividad" => ErrorCategory::Impulsivity,
            "tecnico" | "técnico" => ErrorCategory::Technical,
            "contexto" => ErrorCategory::Context,
            _ => ErrorCategory::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallRecord {
    #[serde(rename = "esfera")]
    pub sphere: Sphere,
    #[serde(rename = "tipo")]
    pub kind: RecallKind,
    #[serde(rename = "nota", default)]
    pub note: String,
    #[serde(rename = "sesion", default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
}

impl RecallRecord {
    pub fn new(sphere: Sphere, kind: RecallKind, note: impl Into<String>) -> Self {
        Self {
            sphere,
            kind,
            note: note.into(),
            session: None,
            category: None,
        }
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Category for classification; unset counts as unknown.
    pub fn error_category(&self) -> ErrorCategory {
        self.category.unwrap_or(ErrorCategory::Unknown)
    }
}

/// Append-only history of recall records, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecallLog {
    records: Vec<RecallRecord>,
}

impl RecallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of records.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn push(&mut self, record: RecallRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[RecallRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching `sphere`, in insertion order.
    pub fn relevant(&self, sphere: Sphere) -> impl Iterator<Item = &RecallRecord> + '_ {
        self.records.iter().filter(move |r| r.sphere == sphere)
    }
}

impl From<Vec<RecallRecord>> for RecallLog {
    fn from(records: Vec<RecallRecord>) -> Self {
        Self { records }
    }
}

/// Behavioral flags about the user, filled in by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryFlags {
    #[serde(rename = "indica_impulsividad")]
    pub impulsive: bool,
    #[serde(rename = "sobreoperar_sesion_baja")]
    pub overtrades_low_session: bool,
    #[serde(rename = "entrar_sin_confirmacion")]
    pub enters_without_confirmation: bool,
}
