//! Evaluation pipeline: wires the scorers, the composer, memory and advisory.
//!
//! Entry points:
//! - [`evaluate`]: takes prepared indicator tables. Fails only on an invalid
//!   config.
//! - [`evaluate_bars`]: builds the tables from candles first, so candles
//!   breaking the caller contract fail too.
//! - [`score_stages`]: Gold and Red alone, for a direction the caller names.

use crate::advisory::{select_advisory, AdvisoryCandidate, AdvisoryContext, UserProfile};
use crate::composer::{advantage_and_risk, compose, compose_structural, ComposedState};
use crate::config::{ConfigError, EstrellaConfig};
use crate::context::{IndicatorFlags, MarketContext};
use crate::domain::{Bar, Direction, Sphere};
use crate::fingerprint::{Fingerprint, InputId};
use crate::memory::{memory_influence, memory_warning, MemoryFlags, MemoryInfluence, RecallLog};
use crate::narrative::{human_summary, voice_with_memory, HumanSummary};
use crate::scoring::{AdvantageScore, RiskScore};
use crate::session::{Session, SessionQuality};
use crate::table::{IndicatorTable, TableError};
use serde::Serialize;

/// Current schema version of the serialized annotated state.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything one evaluation reads.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    /// Execution table (the only table in single mode).
    pub table: &'a IndicatorTable,
    /// Macro table; switches to structural mode when present.
    pub macro_table: Option<&'a IndicatorTable>,
    pub recall: &'a RecallLog,
    pub flags: MemoryFlags,
    pub profile: UserProfile,
    /// Session override. Derived from the last candle's UTC hour when absent.
    pub session: Option<Session>,
    /// Memory-impact term for the risk scorer.
    pub memory_impact: i32,
}

impl<'a> EvaluationInput<'a> {
    pub fn new(table: &'a IndicatorTable, recall: &'a RecallLog) -> Self {
        Self {
            table,
            macro_table: None,
            recall,
            flags: MemoryFlags::default(),
            profile: UserProfile::default(),
            session: None,
            memory_impact: 0,
        }
    }

    pub fn with_macro(mut self, macro_table: &'a IndicatorTable) -> Self {
        self.macro_table = Some(macro_table);
        self
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_flags(mut self, flags: MemoryFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_memory_impact(mut self, impact: i32) -> Self {
        self.memory_impact = impact;
        self
    }

    /// Take the memory impact from the recall log.
    ///
    /// The risk scorer only runs once an advantage exists, so the records
    /// that matter are the ones filed under the Dorada sphere.
    pub fn with_recall_impact(mut self) -> Self {
        self.memory_impact = memory_influence(self.recall, Sphere::Gold).level.impact();
        self
    }
}

/// Plain-language readings shown next to the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Readings {
    #[serde(rename = "rsi")]
    pub momentum: &'static str,
    #[serde(rename = "sesion")]
    pub session: &'static str,
    #[serde(rename = "calidad_sesion")]
    pub session_quality: SessionQuality,
    #[serde(rename = "advertencia_trade")]
    pub trade_warning: &'static str,
}

impl Readings {
    pub fn new(context: &MarketContext, session: Session) -> Self {
        Self {
            momentum: context.momentum_message(),
            session: session.explanation(),
            session_quality: session.quality(),
            trade_warning: context.trade_warning(),
        }
    }
}

/// Composed state plus everything derived from it for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedState {
    pub schema_version: u32,
    /// Digest of the tables, config and memory impact; a cache key.
    #[serde(rename = "huella_entrada")]
    pub input_id: Fingerprint,
    #[serde(flatten)]
    pub state: ComposedState,
    #[serde(rename = "sesion")]
    pub session: Session,
    #[serde(rename = "contexto")]
    pub context: MarketContext,
    #[serde(rename = "lectura")]
    pub readings: Readings,
    #[serde(rename = "indicadores")]
    pub indicators: IndicatorFlags,
    #[serde(rename = "ensenar")]
    pub advisory: Option<AdvisoryCandidate>,
    #[serde(rename = "memoria")]
    pub memory: MemoryInfluence,
    #[serde(rename = "advertencia_memoria", skip_serializing_if = "Option::is_none")]
    pub memory_warning: Option<String>,
    #[serde(rename = "voz")]
    pub voice: String,
    #[serde(rename = "resumen")]
    pub summary: HumanSummary,
}

impl AnnotatedState {
    /// Digest of the serialized state, stable for identical inputs.
    pub fn fingerprint(&self) -> Result<Fingerprint, serde_json::Error> {
        Fingerprint::of(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Failed to fingerprint the input: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Run the whole pipeline over prepared tables.
pub fn evaluate(
    input: &EvaluationInput<'_>,
    config: &EstrellaConfig,
) -> Result<AnnotatedState, EvaluateError> {
    config.validate()?;
    let input_id =
        InputId::new(input.table, input.macro_table, config, input.memory_impact)?.hash();

    let state = match input.macro_table {
        Some(macro_table) => {
            compose_structural(macro_table, input.table, input.memory_impact, &config.scoring)
        }
        None => compose(input.table, input.memory_impact, &config.scoring),
    };

    let session = input
        .session
        .unwrap_or_else(|| Session::at(input.table.last_timestamp()));
    let context = MarketContext::read(input.table);
    let readings = Readings::new(&context, session);
    let indicators = IndicatorFlags::derive(input.table, &context, state.direction());

    let advisory_ctx = AdvisoryContext::from_state(&state, Some(session), input.flags, indicators);
    let advisory = select_advisory(&input.profile, &advisory_ctx);

    let memory = memory_influence(input.recall, state.sphere());
    let warning = memory_warning(input.recall, state.sphere());
    let voice = voice_with_memory(&state, memory.level);
    let summary = human_summary(&state, advisory.as_ref(), input.profile.es_premium);

    tracing::debug!(
        sphere = %state.sphere(),
        session = %session,
        advisory = advisory.as_ref().map(|a| a.tag.as_str()),
        memory_level = u8::from(memory.level),
        "evaluation complete"
    );

    Ok(AnnotatedState {
        schema_version: SCHEMA_VERSION,
        input_id,
        state,
        session,
        context,
        readings,
        indicators,
        advisory,
        memory,
        memory_warning: warning,
        voice,
        summary,
    })
}

/// Candle-level inputs for [`evaluate_bars`].
#[derive(Debug, Clone, Copy)]
pub struct CandleInput<'a> {
    pub bars: &'a [Bar],
    pub macro_bars: Option<&'a [Bar]>,
}

/// Build the indicator tables, then run [`evaluate`].
///
/// `prepare` finishes the input once the tables exist, e.g. to attach the
/// profile or a session override.
pub fn evaluate_bars(
    candles: CandleInput<'_>,
    recall: &RecallLog,
    config: &EstrellaConfig,
    prepare: impl FnOnce(EvaluationInput<'_>) -> EvaluationInput<'_>,
) -> Result<AnnotatedState, EvaluateError> {
    config.validate()?;
    let table = IndicatorTable::build(candles.bars, &config.indicators)?;
    let macro_table = candles
        .macro_bars
        .map(|bars| IndicatorTable::build(bars, &config.indicators))
        .transpose()?;

    let mut input = EvaluationInput::new(&table, recall);
    if let Some(macro_table) = macro_table.as_ref() {
        input = input.with_macro(macro_table);
    }
    evaluate(&prepare(input), config)
}

/// Gold, then Red when Gold is active, for a caller-chosen direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageScores {
    #[serde(rename = "direccion")]
    pub direction: Direction,
    #[serde(rename = "dorado")]
    pub advantage: Option<AdvantageScore>,
    #[serde(rename = "rojo")]
    pub risk: Option<RiskScore>,
}

/// Score the advantage and risk stages for `direction` without the
/// directional stage or the composer.
pub fn score_stages(
    table: &IndicatorTable,
    direction: Direction,
    memory_impact: i32,
    config: &EstrellaConfig,
) -> Result<StageScores, ConfigError> {
    config.scoring.validate()?;
    let (advantage, risk) = advantage_and_risk(table, direction, memory_impact, &config.scoring);
    Ok(StageScores {
        direction,
        advantage,
        risk,
    })
}
