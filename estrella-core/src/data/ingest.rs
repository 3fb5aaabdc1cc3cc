//! CSV candle reader.
//!
//! Columns `timestamp,open,high,low,close` are required, `volume` is
//! optional, header names are matched case-insensitively and extra columns
//! are ignored. Timestamps must be strictly increasing.

use crate::domain::Bar;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Column layout of a candle file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandleSchema {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl CandleSchema {
    pub const REQUIRED: [&'static str; 5] = ["timestamp", "open", "high", "low", "close"];

    /// Locate the columns in a header row.
    pub fn from_headers(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &'static str| find(name).ok_or(IngestError::MissingColumn(name));

        Ok(Self {
            timestamp: require("timestamp")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }

    fn bar(&self, record: &csv::StringRecord, line: u64) -> Result<Bar, IngestError> {
        let field = |index: usize| record.get(index).unwrap_or("").trim();

        let raw_ts = field(self.timestamp);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| IngestError::BadTimestamp {
            line,
            value: raw_ts.to_string(),
        })?;

        let price = |index: usize, column: &'static str| -> Result<f64, IngestError> {
            let raw = field(index);
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| IngestError::BadNumber {
                    line,
                    column,
                    value: raw.to_string(),
                })
        };

        let volume = match self.volume {
            Some(index) if !field(index).is_empty() => Some(price(index, "volume")?),
            _ => None,
        };

        Ok(Bar {
            timestamp,
            open: price(self.open, "open")?,
            high: price(self.high, "high")?,
            low: price(self.low, "low")?,
            close: price(self.close, "close")?,
            volume,
        })
    }
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Read candles from any CSV source.
pub fn read_bars<R: Read>(source: R) -> Result<Vec<Bar>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);

    let schema = CandleSchema::from_headers(reader.headers()?)?;

    let mut bars: Vec<Bar> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let bar = schema.bar(&record, line)?;

        if let Some(prev) = bars.last() {
            if bar.timestamp <= prev.timestamp {
                return Err(IngestError::NonIncreasingTimestamp {
                    line,
                    timestamp: bar.timestamp,
                });
            }
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(IngestError::Empty);
    }
    tracing::debug!(bars = bars.len(), "candles ingested");
    Ok(bars)
}

/// Read candles from a file.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, IngestError> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_bars(file)
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("line {line}: unparseable timestamp {value:?}")]
    BadTimestamp { line: u64, value: String },

    #[error("line {line}: invalid {column} value {value:?}")]
    BadNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: timestamp {timestamp} is not after the previous row")]
    NonIncreasingTimestamp { line: u64, timestamp: DateTime<Utc> },

    #[error("no candles in input")]
    Empty,
}
