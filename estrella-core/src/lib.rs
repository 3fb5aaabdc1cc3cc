//! Estrella Core: trading-context scoring pipeline.
//!
//! Turns a candle series into one reproducible verdict:
//! - Indicator table builder (EMA 20/50/200, RSI 14, Bollinger 20×2)
//! - Directional scorer (Azul), advantage scorer (Dorado), risk scorer (Rojo)
//! - Decision composer, single-table and structural (macro + execution)
//! - Recall/memory influence and the memory-modulated voice
//! - Priority-ranked advisory selector for premium users
//!
//! Everything past [`table::IndicatorTable`] is a pure function of its
//! inputs; the only fallible steps are candle ingestion, table building and
//! config validation.

pub mod advisory;
pub mod composer;
pub mod config;
pub mod context;
pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod memory;
pub mod narrative;
pub mod pipeline;
pub mod scoring;
pub mod session;
pub mod table;

pub use config::EstrellaConfig;
pub use pipeline::{
    evaluate, evaluate_bars, score_stages, AnnotatedState, CandleInput, EvaluateError,
    EvaluationInput, StageScores,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the public pipeline types are Send + Sync, so a
    /// caller can evaluate on a worker thread and share results.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Inputs
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<table::IndicatorTable>();
        require_sync::<table::IndicatorTable>();
        require_send::<memory::RecallLog>();
        require_sync::<memory::RecallLog>();
        require_send::<config::EstrellaConfig>();
        require_sync::<config::EstrellaConfig>();
        require_send::<EvaluationInput<'static>>();
        require_sync::<EvaluationInput<'static>>();

        // Stage outputs
        require_send::<scoring::DirectionalScore>();
        require_sync::<scoring::DirectionalScore>();
        require_send::<scoring::AdvantageScore>();
        require_sync::<scoring::AdvantageScore>();
        require_send::<scoring::RiskScore>();
        require_sync::<scoring::RiskScore>();
        require_send::<composer::ComposedState>();
        require_sync::<composer::ComposedState>();
        require_send::<AnnotatedState>();
        require_sync::<AnnotatedState>();
        require_send::<StageScores>();
        require_sync::<StageScores>();

        // Advisory
        require_send::<advisory::Rule>();
        require_sync::<advisory::Rule>();
        require_send::<advisory::AdvisoryCandidate>();
        require_sync::<advisory::AdvisoryCandidate>();

        // Errors
        require_send::<table::TableError>();
        require_sync::<table::TableError>();
        require_send::<data::IngestError>();
        require_sync::<data::IngestError>();
        require_send::<config::ConfigError>();
        require_sync::<config::ConfigError>();
        require_send::<EvaluateError>();
        require_sync::<EvaluateError>();
    }

    /// Architecture contract: scorers see only the table and the config.
    ///
    /// Memory reaches the risk scorer as a single integer; the recall log
    /// itself never enters scoring.
    #[test]
    fn scorers_take_no_recall_log() {
        fn _check_signatures(table: &table::IndicatorTable, cfg: &config::ScoringConfig) {
            let blue = scoring::score_direction(table, cfg);
            if let Some(gold) = scoring::score_advantage(table, blue.direction, cfg) {
                let _red: scoring::RiskScore =
                    scoring::score_risk(table, blue.direction, &gold, 0, cfg);
            }
        }
    }
}
