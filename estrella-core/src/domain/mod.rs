//! Domain types for Estrella

pub mod bar;
pub mod labels;

pub use bar::Bar;
pub use labels::{Decision, Direction, RiskLevel, Sphere, VolatilityLevel};
