//! Property tests for scoring and composition invariants.
//!
//! Uses proptest to verify:
//! 1. Antisymmetry: mirroring the price series flips the directional bias
//! 2. The EMA stack contributes nothing while any EMA is absent
//! 3. Gold never activates for a neutral bias, and mirrors with the bias
//! 4. Red always scores, with a level consistent with its micro-score
//! 5. Roja always means NO OPERAR, and only elevated risk reaches it
//! 6. A macro/execution conflict always blocks
//! 7. Advisory selection is deterministic and premium-only

use chrono::{Duration, TimeZone, Utc};
use estrella_core::advisory::{select_advisory, AdvisoryContext, UserProfile};
use estrella_core::composer::{compose, compose_structural, Alignment};
use estrella_core::config::ScoringConfig;
use estrella_core::context::IndicatorFlags;
use estrella_core::domain::{Bar, Decision, Direction, RiskLevel, Sphere};
use estrella_core::memory::MemoryFlags;
use estrella_core::scoring::directional::ema_stack_signal;
use estrella_core::scoring::{score_advantage, score_direction, score_risk};
use estrella_core::session::Session;
use estrella_core::table::{IndicatorRow, IndicatorTable};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Shape of a synthetic table. Every value sits on an integer grid so that
/// mirroring the prices is exact.
#[derive(Debug, Clone)]
struct TableSpec {
    /// (close step, wick above, wick below, momentum / 5) per row.
    steps: Vec<(i32, u8, u8, Option<u8>)>,
    /// EMAs at the last row, as offsets from the last close.
    emas: (Option<i32>, Option<i32>, Option<i32>),
}

fn arb_table_spec() -> impl Strategy<Value = TableSpec> {
    let row = (-3i32..=3, 0u8..=3, 0u8..=3, prop::option::of(0u8..=20));
    let ema = || prop::option::of(-6i32..=6);
    (prop::collection::vec(row, 55..90), (ema(), ema(), ema()))
        .prop_map(|(steps, emas)| TableSpec { steps, emas })
}

fn rows_from(spec: &TableSpec) -> Vec<IndicatorRow> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut close = 1000.0;
    let mut rows: Vec<IndicatorRow> = spec
        .steps
        .iter()
        .enumerate()
        .map(|(i, &(step, up, down, momentum))| {
            let open = close;
            close += f64::from(step);
            let mut row = IndicatorRow::from_bar(Bar {
                timestamp: base + Duration::hours(i as i64),
                open,
                high: open.max(close) + f64::from(up),
                low: open.min(close) - f64::from(down),
                close,
                volume: None,
            });
            row.momentum = momentum.map(|m| f64::from(m) * 5.0);
            row
        })
        .collect();

    if let Some(last) = rows.last_mut() {
        let at = |offset: Option<i32>| offset.map(|o| close + f64::from(o));
        last.ema_fast = at(spec.emas.0);
        last.ema_mid = at(spec.emas.1);
        last.ema_slow = at(spec.emas.2);
    }
    rows
}

/// Price-mirrored copy: every price negated, oscillator reflected around 50.
fn mirror(rows: &[IndicatorRow]) -> Vec<IndicatorRow> {
    rows.iter()
        .map(|r| {
            let mut m = *r;
            m.bar.open = -r.bar.open;
            m.bar.close = -r.bar.close;
            m.bar.high = -r.bar.low;
            m.bar.low = -r.bar.high;
            m.ema_fast = r.ema_fast.map(|v| -v);
            m.ema_mid = r.ema_mid.map(|v| -v);
            m.ema_slow = r.ema_slow.map(|v| -v);
            m.momentum = r.momentum.map(|v| 100.0 - v);
            m.band_lower = r.band_upper.map(|v| -v);
            m.band_mid = r.band_mid.map(|v| -v);
            m.band_upper = r.band_lower.map(|v| -v);
            m
        })
        .collect()
}

fn table(rows: Vec<IndicatorRow>) -> IndicatorTable {
    IndicatorTable::from_rows(rows).expect("synthetic rows are valid")
}

fn arb_context() -> impl Strategy<Value = AdvisoryContext> {
    let decision = prop::sample::select(vec![
        Decision::Observe,
        Decision::TradeWithDiscipline,
        Decision::DoNotTrade,
    ]);
    let risk = prop::sample::select(vec![
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ]);
    let session = prop::option::of(prop::sample::select(vec![
        Session::Tokyo,
        Session::London,
        Session::NewYork,
        Session::OffHours,
    ]));
    let momentum = prop::option::of(0.0..=100.0_f64);
    let flags = prop::array::uniform8(any::<bool>());

    (decision, risk, session, momentum, flags).prop_map(|(decision, risk, session, momentum, f)| {
        AdvisoryContext {
            decision,
            risk,
            session,
            momentum,
            memory: MemoryFlags {
                impulsive: f[0],
                overtrades_low_session: f[1],
                enters_without_confirmation: f[2],
            },
            indicators: IndicatorFlags {
                near_slow_ema: f[3],
                near_band: f[4],
                structure_valid: f[5],
                intent_unclear: f[6],
                structure_confirmed: f[7],
            },
        }
    })
}

// ── 1. Directional antisymmetry ──────────────────────────────────────

proptest! {
    #[test]
    fn mirrored_prices_flip_the_bias(spec in arb_table_spec()) {
        let cfg = ScoringConfig::default();
        let rows = rows_from(&spec);
        let original = score_direction(&table(rows.clone()), &cfg);
        let mirrored = score_direction(&table(mirror(&rows)), &cfg);

        prop_assert_eq!(mirrored.direction, original.direction.opposite());
        prop_assert_eq!(mirrored.bullish, original.bearish);
        prop_assert_eq!(mirrored.bearish, original.bullish);
        prop_assert_eq!(mirrored.threshold, original.threshold);
        prop_assert_eq!(mirrored.volatility, original.volatility);
    }
}

// ── 2. EMA stack needs all three EMAs ────────────────────────────────

proptest! {
    #[test]
    fn ema_stack_skips_when_any_ema_is_absent(
        fast in prop::option::of(90.0..110.0_f64),
        mid in prop::option::of(90.0..110.0_f64),
        slow in prop::option::of(90.0..110.0_f64),
    ) {
        let mut row = IndicatorRow::from_bar(Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
            volume: None,
        });
        row.ema_fast = fast;
        row.ema_mid = mid;
        row.ema_slow = slow;
        if fast.is_none() || mid.is_none() || slow.is_none() {
            prop_assert_eq!(ema_stack_signal(&row), None);
        }
    }
}

// ── 3. Gold ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn advantage_never_activates_for_neutral(spec in arb_table_spec()) {
        let t = table(rows_from(&spec));
        prop_assert!(score_advantage(&t, Direction::Neutral, &ScoringConfig::default()).is_none());
    }

    #[test]
    fn advantage_mirrors_with_the_bias(spec in arb_table_spec()) {
        let cfg = ScoringConfig::default();
        let rows = rows_from(&spec);
        let original = table(rows.clone());
        let mirrored = table(mirror(&rows));
        for direction in [Direction::Bullish, Direction::Bearish] {
            let a = score_advantage(&original, direction, &cfg).map(|s| s.micro_score);
            let b = score_advantage(&mirrored, direction.opposite(), &cfg).map(|s| s.micro_score);
            prop_assert_eq!(a, b);
        }
    }
}

// ── 4. Red ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn risk_always_scores_consistently(spec in arb_table_spec(), impact in -3i32..=1) {
        let cfg = ScoringConfig::default();
        let t = table(rows_from(&spec));
        for direction in [Direction::Bullish, Direction::Bearish] {
            if let Some(adv) = score_advantage(&t, direction, &cfg) {
                let risk = score_risk(&t, direction, &adv, impact, &cfg);
                prop_assert_eq!(risk.level, RiskLevel::from_score(risk.micro_score));
                prop_assert!(risk.reasons.len() <= 6);
                if impact <= -2 {
                    prop_assert!(risk.micro_score >= 3);
                }
            }
        }
    }
}

// ── 5. Composer ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn red_sphere_always_means_do_not_trade(spec in arb_table_spec(), impact in -3i32..=1) {
        let state = compose(&table(rows_from(&spec)), impact, &ScoringConfig::default());
        let red = state.sphere() == Sphere::Red;
        prop_assert_eq!(red, state.decision() == Decision::DoNotTrade);
        if red {
            prop_assert!(state.risk_level().is_elevated());
        } else {
            prop_assert!(!state.risk_level().is_elevated());
        }
        if state.sphere() == Sphere::Blue {
            prop_assert!(state.advantage().is_none());
        }
    }

    #[test]
    fn macro_execution_conflict_blocks(spec in arb_table_spec()) {
        let cfg = ScoringConfig::default();
        let rows = rows_from(&spec);
        let macro_table = table(rows.clone());
        let execution_table = table(mirror(&rows));
        let state = compose_structural(&macro_table, &execution_table, 0, &cfg);

        let structure = state.structure().expect("structural block");
        if structure.macro_direction.is_directional() {
            prop_assert_eq!(structure.alignment, Alignment::Conflict);
            prop_assert_eq!(state.sphere(), Sphere::Red);
            prop_assert_eq!(state.decision(), Decision::DoNotTrade);
            prop_assert_eq!(state.risk_level(), RiskLevel::High);
        } else {
            prop_assert_eq!(structure.alignment, Alignment::NoMacroBias);
        }
    }
}

// ── 6. Advisory ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn advisory_is_deterministic(ctx in arb_context()) {
        let profile = UserProfile::premium();
        prop_assert_eq!(select_advisory(&profile, &ctx), select_advisory(&profile, &ctx));
    }

    #[test]
    fn advisory_is_premium_only(ctx in arb_context()) {
        prop_assert_eq!(select_advisory(&UserProfile::default(), &ctx), None);
    }

    #[test]
    fn chosen_advisory_has_the_best_priority(ctx in arb_context()) {
        if let Some(chosen) = select_advisory(&UserProfile::premium(), &ctx) {
            let best = estrella_core::advisory::RULES
                .iter()
                .filter(|rule| (rule.applies)(&ctx))
                .map(|rule| rule.priority)
                .min();
            prop_assert_eq!(Some(chosen.priority), best);
        }
    }
}
