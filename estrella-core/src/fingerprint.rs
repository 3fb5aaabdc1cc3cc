//! Content fingerprints for caching evaluations.
//!
//! Identical inputs serialize to identical JSON, so a BLAKE3 digest of that
//! JSON identifies an input or an output across runs and platforms.

use crate::config::EstrellaConfig;
use crate::table::IndicatorTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex-encoded BLAKE3 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// Digest of the canonical JSON of `value`.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(value)?;
        Ok(Self::from_bytes(json.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest of every row of the table, indicators included.
pub fn table_fingerprint(table: &IndicatorTable) -> Result<Fingerprint, serde_json::Error> {
    Fingerprint::of(&table.rows())
}

/// Identity of an evaluation input: execution table, optional macro table,
/// configuration and the caller's memory-impact term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputId {
    pub table: Fingerprint,
    pub macro_table: Option<Fingerprint>,
    pub config: Fingerprint,
    pub memory_impact: i32,
}

impl InputId {
    pub fn new(
        table: &IndicatorTable,
        macro_table: Option<&IndicatorTable>,
        config: &EstrellaConfig,
        memory_impact: i32,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            table: table_fingerprint(table)?,
            macro_table: macro_table.map(table_fingerprint).transpose()?,
            config: Fingerprint::of(config)?,
            memory_impact,
        })
    }

    /// Single digest over all parts.
    pub fn hash(&self) -> Fingerprint {
        let canonical = serde_json::json!({
            "config": self.config.as_str(),
            "macro_table": self.macro_table.as_ref().map(Fingerprint::as_str),
            "memory_impact": self.memory_impact,
            "table": self.table.as_str(),
        });
        Fingerprint::from_bytes(canonical.to_string().as_bytes())
    }
}
