//! Closed label sets shared by every pipeline stage.
//!
//! The serialized spellings are the ones the presentation layer renders
//! (`ALCISTA`, `Dorada`, `Muy alto`, ...). Parsing from free text goes through
//! `from_label`, which normalizes case and whitespace. An unrecognized
//! direction is `Neutral`; an unrecognized sphere is `None`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dominant directional bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "ALCISTA")]
    Bullish,
    #[serde(rename = "BAJISTA")]
    Bearish,
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

impl Direction {
    /// Lenient parse: trims and uppercases, anything unknown is `Neutral`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "ALCISTA" => Direction::Bullish,
            "BAJISTA" => Direction::Bearish,
            _ => Direction::Neutral,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Bullish => "ALCISTA",
            Direction::Bearish => "BAJISTA",
            Direction::Neutral => "NEUTRAL",
        }
    }

    pub fn is_directional(&self) -> bool {
        !matches!(self, Direction::Neutral)
    }

    /// Mirror image: bullish <-> bearish, neutral stays neutral.
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Bullish => Direction::Bearish,
            Direction::Bearish => Direction::Bullish,
            Direction::Neutral => Direction::Neutral,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Volatility regime from the ATR ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolatilityLevel {
    #[serde(rename = "Alta")]
    High,
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Baja")]
    Low,
}

impl VolatilityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            VolatilityLevel::High => "Alta",
            VolatilityLevel::Normal => "Normal",
            VolatilityLevel::Low => "Baja",
        }
    }
}

/// Three-way classification of the market context.
///
/// Deserialization accepts legacy spellings found in older recall logs
/// ("ROJO", "dorado", "🔴 Roja (riesgo)", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Sphere {
    #[serde(rename = "Azul")]
    Blue,
    #[serde(rename = "Dorada")]
    Gold,
    #[serde(rename = "Roja")]
    Red,
}

impl Sphere {
    /// Lenient parse used at the recall-log boundary.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        if lower.contains("azul") {
            Some(Sphere::Blue)
        } else if lower.contains("dorad") {
            Some(Sphere::Gold)
        } else if lower.contains("roj") {
            Some(Sphere::Red)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sphere::Blue => "Azul",
            Sphere::Gold => "Dorada",
            Sphere::Red => "Roja",
        }
    }
}

impl TryFrom<String> for Sphere {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Sphere::from_label(&value).ok_or_else(|| format!("unknown sphere label: {value:?}"))
    }
}

impl fmt::Display for Sphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decision label shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "OBSERVAR")]
    Observe,
    #[serde(rename = "OPERAR CON DISCIPLINA")]
    TradeWithDiscipline,
    #[serde(rename = "NO OPERAR")]
    DoNotTrade,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Observe => "OBSERVAR",
            Decision::TradeWithDiscipline => "OPERAR CON DISCIPLINA",
            Decision::DoNotTrade => "NO OPERAR",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verbal risk level. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Bajo")]
    Low,
    #[serde(rename = "Moderado")]
    Moderate,
    #[serde(rename = "Alto")]
    High,
    #[serde(rename = "Muy alto")]
    VeryHigh,
}

impl RiskLevel {
    /// Map an accumulated risk micro-score onto its verbal level.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=2 => RiskLevel::Low,
            3..=5 => RiskLevel::Moderate,
            6..=8 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }

    /// Alto and Muy alto block execution.
    pub fn is_elevated(&self) -> bool {
        *self >= RiskLevel::High
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Bajo",
            RiskLevel::Moderate => "Moderado",
            RiskLevel::High => "Alto",
            RiskLevel::VeryHigh => "Muy alto",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
