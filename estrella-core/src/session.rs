//! Trading sessions by UTC hour.
//!
//! Timezone conversion is the caller's job; everything here takes UTC.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    #[serde(rename = "Tokio")]
    Tokyo,
    #[serde(rename = "Londres")]
    London,
    #[serde(rename = "New York")]
    NewYork,
    #[serde(rename = "Fuera de sesión")]
    OffHours,
}

/// How tradeable a session usually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionQuality {
    #[serde(rename = "alta")]
    High,
    #[serde(rename = "baja")]
    Low,
    #[serde(rename = "muy baja")]
    VeryLow,
}

impl Session {
    /// Tokio 0-6, Londres 7-12, New York 13-19, otherwise off hours.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=6 => Session::Tokyo,
            7..=12 => Session::London,
            13..=19 => Session::NewYork,
            _ => Session::OffHours,
        }
    }

    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self::from_hour(timestamp.hour())
    }

    /// Lenient parse of a session name. Anything starting with "fuera" is off hours.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        match lower.as_str() {
            "tokio" | "tokyo" => Some(Session::Tokyo),
            "londres" | "london" => Some(Session::London),
            "new york" | "ny" | "nueva york" => Some(Session::NewYork),
            _ if lower.starts_with("fuera") => Some(Session::OffHours),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Session::Tokyo => "Tokio",
            Session::London => "Londres",
            Session::NewYork => "New York",
            Session::OffHours => "Fuera de sesión",
        }
    }

    pub fn quality(&self) -> SessionQuality {
        match self {
            Session::London | Session::NewYork => SessionQuality::High,
            Session::Tokyo => SessionQuality::Low,
            Session::OffHours => SessionQuality::VeryLow,
        }
    }

    /// London and New York are the main sessions.
    pub fn is_main(&self) -> bool {
        matches!(self, Session::London | Session::NewYork)
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            Session::Tokyo => {
                "Sesión de Tokio: mercado más lento. Mejor para rangos que para tendencias."
            }
            Session::London => {
                "Sesión de Londres: alta volatilidad. Ideal para rupturas y tendencias."
            }
            Session::NewYork => {
                "Sesión de New York: movimientos fuertes, cuidado con sobreoperar."
            }
            Session::OffHours => "Fuera de sesión principal. Riesgo elevado.",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hour_boundaries() {
        assert_eq!(Session::from_hour(0), Session::Tokyo);
        assert_eq!(Session::from_hour(6), Session::Tokyo);
        assert_eq!(Session::from_hour(7), Session::London);
        assert_eq!(Session::from_hour(12), Session::London);
        assert_eq!(Session::from_hour(13), Session::NewYork);
        assert_eq!(Session::from_hour(19), Session::NewYork);
        assert_eq!(Session::from_hour(20), Session::OffHours);
        assert_eq!(Session::from_hour(23), Session::OffHours);
    }

    #[test]
    fn session_from_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 14, 59, 0).unwrap();
        assert_eq!(Session::at(ts), Session::NewYork);
    }

    #[test]
    fn quality_by_session() {
        assert_eq!(Session::Tokyo.quality(), SessionQuality::Low);
        assert_eq!(Session::London.quality(), SessionQuality::High);
        assert_eq!(Session::OffHours.quality(), SessionQuality::VeryLow);
        assert!(!Session::Tokyo.is_main());
        assert!(Session::NewYork.is_main());
    }

    #[test]
    fn labels_parse_leniently() {
        assert_eq!(Session::from_label(" Londres "), Some(Session::London));
        assert_eq!(Session::from_label("NY"), Some(Session::NewYork));
        assert_eq!(Session::from_label("Fuera de sesión"), Some(Session::OffHours));
        assert_eq!(Session::from_label("fuera"), Some(Session::OffHours));
        assert_eq!(Session::from_label("Sídney"), None);
        assert_eq!(
            serde_json::to_string(&Session::OffHours).unwrap(),
            "\"Fuera de sesión\""
        );
    }
}
