//! Estrella CLI: evaluate candle files and inspect indicator tables.
//!
//! Commands:
//! - `evaluate`: run the full pipeline over a CSV of candles and print the
//!   annotated state as JSON
//! - `stages`: score advantage and risk for a given direction
//! - `table`: print the last rows of the computed indicator table

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use estrella_core::advisory::UserProfile;
use estrella_core::config::EstrellaConfig;
use estrella_core::data::load_bars;
use estrella_core::domain::Direction;
use estrella_core::memory::{MemoryFlags, RecallLog};
use estrella_core::session::Session;
use estrella_core::table::IndicatorTable;
use estrella_core::{evaluate_bars, score_stages, CandleInput};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "estrella",
    about = "Estrella CLI: trading-context scoring from OHLC candles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a candle file and print the annotated state.
    Evaluate {
        /// CSV with timestamp,open,high,low,close[,volume] (execution frame).
        #[arg(long)]
        data: PathBuf,

        /// Optional CSV for the macro frame; enables structural mode.
        #[arg(long)]
        macro_data: Option<PathBuf>,

        /// TOML configuration. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON array of recall records.
        #[arg(long)]
        recall: Option<PathBuf>,

        /// JSON object with memory flags.
        #[arg(long)]
        flags: Option<PathBuf>,

        /// Evaluate as a premium user (enables guidance).
        #[arg(long, default_value_t = false)]
        premium: bool,

        /// Session override (Tokio, Londres, New York, Fuera de sesión).
        /// Derived from the last candle's UTC hour when omitted.
        #[arg(long)]
        session: Option<String>,

        /// Memory-impact term for the risk scorer.
        #[arg(long, allow_negative_numbers = true, conflicts_with = "impact_from_recall")]
        memory_impact: Option<i32>,

        /// Derive the memory impact from the recall log instead.
        #[arg(long, default_value_t = false)]
        impact_from_recall: bool,

        /// Pretty-print the JSON output.
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Score advantage and risk for a given direction, skipping the
    /// directional stage.
    Stages {
        /// CSV with timestamp,open,high,low,close[,volume].
        #[arg(long)]
        data: PathBuf,

        /// ALCISTA or BAJISTA (case-insensitive). Anything else is NEUTRAL.
        #[arg(long)]
        direction: String,

        /// TOML configuration. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Memory-impact term for the risk scorer.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        memory_impact: i32,
    },
    /// Print the last rows of the indicator table as JSON.
    Table {
        /// CSV with timestamp,open,high,low,close[,volume].
        #[arg(long)]
        data: PathBuf,

        /// TOML configuration. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 5)]
        last: usize,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            data,
            macro_data,
            config,
            recall,
            flags,
            premium,
            session,
            memory_impact,
            impact_from_recall,
            pretty,
        } => run_evaluate(EvaluateArgs {
            data,
            macro_data,
            config,
            recall,
            flags,
            premium,
            session,
            memory_impact,
            impact_from_recall,
            pretty,
        }),
        Commands::Stages {
            data,
            direction,
            config,
            memory_impact,
        } => run_stages(&data, &direction, config.as_deref(), memory_impact),
        Commands::Table { data, config, last } => run_table(&data, config.as_deref(), last),
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

struct EvaluateArgs {
    data: PathBuf,
    macro_data: Option<PathBuf>,
    config: Option<PathBuf>,
    recall: Option<PathBuf>,
    flags: Option<PathBuf>,
    premium: bool,
    session: Option<String>,
    memory_impact: Option<i32>,
    impact_from_recall: bool,
    pretty: bool,
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    let bars = load_bars(&args.data)
        .with_context(|| format!("failed to read candles from {}", args.data.display()))?;
    let macro_bars = args
        .macro_data
        .as_deref()
        .map(|path| {
            load_bars(path)
                .with_context(|| format!("failed to read macro candles from {}", path.display()))
        })
        .transpose()?;

    let recall = match args.recall.as_deref() {
        Some(path) => {
            let text = read_text(path)?;
            RecallLog::from_json(&text)
                .with_context(|| format!("invalid recall log in {}", path.display()))?
        }
        None => RecallLog::new(),
    };

    let flags: MemoryFlags = match args.flags.as_deref() {
        Some(path) => serde_json::from_str(&read_text(path)?)
            .with_context(|| format!("invalid memory flags in {}", path.display()))?,
        None => MemoryFlags::default(),
    };

    let session = match args.session.as_deref() {
        Some(label) => match Session::from_label(label) {
            Some(session) => Some(session),
            None => bail!(
                "unknown session '{label}'. Valid: Tokio, Londres, New York, Fuera de sesión"
            ),
        },
        None => None,
    };

    let profile = UserProfile {
        es_premium: args.premium,
    };

    let annotated = evaluate_bars(
        CandleInput {
            bars: &bars,
            macro_bars: macro_bars.as_deref(),
        },
        &recall,
        &config,
        |mut input| {
            input = input.with_profile(profile).with_flags(flags);
            if let Some(session) = session {
                input = input.with_session(session);
            }
            if args.impact_from_recall {
                input = input.with_recall_impact();
            } else if let Some(impact) = args.memory_impact {
                input = input.with_memory_impact(impact);
            }
            input
        },
    )
    .context("evaluation failed")?;

    tracing::info!(input_id = %annotated.input_id, "evaluation input");
    if let Ok(fingerprint) = annotated.fingerprint() {
        tracing::info!(%fingerprint, "evaluation fingerprint");
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&annotated)?
    } else {
        serde_json::to_string(&annotated)?
    };
    println!("{json}");
    Ok(())
}

fn run_stages(data: &Path, direction: &str, config: Option<&Path>, impact: i32) -> Result<()> {
    let config = load_config(config)?;
    let bars = load_bars(data)
        .with_context(|| format!("failed to read candles from {}", data.display()))?;
    let table = IndicatorTable::build(&bars, &config.indicators)
        .context("candles violate the input contract")?;

    let direction = Direction::from_label(direction);
    if !direction.is_directional() {
        tracing::warn!(%direction, "direction is neutral; no advantage can activate");
    }
    let scores = score_stages(&table, direction, impact, &config)?;
    println!("{}", serde_json::to_string_pretty(&scores)?);
    Ok(())
}

fn run_table(data: &Path, config: Option<&Path>, last: usize) -> Result<()> {
    let config = load_config(config)?;
    let bars = load_bars(data)
        .with_context(|| format!("failed to read candles from {}", data.display()))?;
    let table = IndicatorTable::build(&bars, &config.indicators)
        .context("candles violate the input contract")?;

    let rows = table.rows();
    let start = rows.len().saturating_sub(last);
    println!("{}", serde_json::to_string_pretty(&rows[start..])?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EstrellaConfig> {
    match path {
        Some(path) => EstrellaConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(EstrellaConfig::default()),
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
