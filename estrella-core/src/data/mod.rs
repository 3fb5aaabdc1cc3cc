//! Candle ingestion at the crate boundary.

pub mod ingest;

pub use ingest::{load_bars, parse_timestamp, read_bars, CandleSchema, IngestError};
