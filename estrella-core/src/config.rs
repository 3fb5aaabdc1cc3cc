//! Serializable pipeline configuration.
//!
//! Every field defaults to the canonical constant, so an empty TOML document
//! (or no file at all) reproduces the reference behavior exactly.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration: indicator periods plus scoring windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstrellaConfig {
    pub indicators: IndicatorConfig,
    pub scoring: ScoringConfig,
}

/// Periods used by the indicator table builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ema_fast: usize,
    pub ema_mid: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub band_period: usize,
    pub band_multiplier: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_fast: 20,
            ema_mid: 50,
            ema_slow: 200,
            rsi_period: 14,
            band_period: 20,
            band_multiplier: 2.0,
        }
    }
}

/// Windows shared by the three scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Rows required before the directional scorer trusts the table.
    pub min_rows: usize,
    /// Rolling high/low window of the structure signal.
    pub structure_window: usize,
    /// ATR averaging period.
    pub atr_period: usize,
    /// Window of the ATR mean the volatility ratio divides by.
    pub volatility_window: usize,
    /// Bars scanned for nearest support and resistance.
    pub level_lookback: usize,
    /// Bars over which price and momentum slopes are compared.
    pub divergence_window: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_rows: 50,
            structure_window: 5,
            atr_period: 14,
            volatility_window: 50,
            level_lookback: 50,
            divergence_window: 6,
        }
    }
}

impl EstrellaConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EstrellaConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;
        self.scoring.validate()
    }
}

impl IndicatorConfig {
    /// Every period must be at least 1 and the band multiplier positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_periods(&[
            ("indicators.ema_fast", self.ema_fast),
            ("indicators.ema_mid", self.ema_mid),
            ("indicators.ema_slow", self.ema_slow),
            ("indicators.rsi_period", self.rsi_period),
            ("indicators.band_period", self.band_period),
        ])?;
        if !(self.band_multiplier.is_finite() && self.band_multiplier > 0.0) {
            return Err(ConfigError::Invalid(
                "indicators.band_multiplier must be a positive number".into(),
            ));
        }
        Ok(())
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_periods(&[
            ("scoring.structure_window", self.structure_window),
            ("scoring.atr_period", self.atr_period),
            ("scoring.volatility_window", self.volatility_window),
            ("scoring.level_lookback", self.level_lookback),
        ])?;
        if self.divergence_window < 2 {
            return Err(ConfigError::Invalid(
                "scoring.divergence_window must be >= 2".into(),
            ));
        }
        Ok(())
    }
}

fn check_periods(periods: &[(&str, usize)]) -> Result<(), ConfigError> {
    match periods.iter().find(|(_, value)| *value == 0) {
        Some((field, _)) => Err(ConfigError::Invalid(format!("{field} must be >= 1"))),
        None => Ok(()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
