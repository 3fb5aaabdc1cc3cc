//! Market context readings at the last row, and the indicator flags the
//! advisory rules consume.

use crate::domain::Direction;
use crate::indicators::{window_max, window_min};
use crate::table::IndicatorTable;
use serde::{Deserialize, Serialize};

/// Relative distance to EMA200 that still counts as "at" the average.
const NEAR_EMA_SLOW: f64 = 0.01;
/// Band width over price below which the bands read as compressed.
const BAND_COMPRESSION: f64 = 0.01;
const STRUCTURE_LOOKBACK: usize = 20;
const ORDERLY_MOMENTUM: (f64, f64) = (42.0, 58.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendReading {
    #[serde(rename = "alcista")]
    Bullish,
    #[serde(rename = "bajista")]
    Bearish,
    #[serde(rename = "neutral")]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MomentumZone {
    #[serde(rename = "sobrecompra")]
    Overbought,
    #[serde(rename = "sobreventa")]
    Oversold,
    #[serde(rename = "neutral")]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandReading {
    #[serde(rename = "compresion")]
    Compression,
    #[serde(rename = "ruptura_alcista")]
    BreakoutUp,
    #[serde(rename = "ruptura_bajista")]
    BreakoutDown,
    #[serde(rename = "normal")]
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureReading {
    #[serde(rename = "ruptura_alcista")]
    BreakoutUp,
    #[serde(rename = "ruptura_bajista")]
    BreakoutDown,
    #[serde(rename = "rango")]
    Range,
    #[serde(rename = "no_disponible")]
    Unavailable,
}

/// Plain readings of where the last bar sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    #[serde(rename = "tendencia")]
    pub trend: TrendReading,
    #[serde(rename = "rsi_zona")]
    pub momentum: MomentumZone,
    #[serde(rename = "bollinger")]
    pub bands: BandReading,
    #[serde(rename = "estructura")]
    pub structure: StructureReading,
    /// |close - EMA200| / EMA200, when EMA200 exists and is non-zero.
    #[serde(rename = "distancia_ema200")]
    pub slow_ema_distance: Option<f64>,
}

impl MarketContext {
    pub fn read(table: &IndicatorTable) -> Self {
        let row = table.last_row();
        let close = row.bar.close;

        let trend = match row.ema_slow {
            Some(ema) if close > ema => TrendReading::Bullish,
            Some(_) => TrendReading::Bearish,
            None => TrendReading::Neutral,
        };

        let momentum = match row.momentum {
            Some(m) if m > 70.0 => MomentumZone::Overbought,
            Some(m) if m < 30.0 => MomentumZone::Oversold,
            _ => MomentumZone::Neutral,
        };

        let bands = match (row.band_lower, row.band_upper) {
            (Some(lower), Some(upper)) if close != 0.0 => {
                if (upper - lower) / close < BAND_COMPRESSION {
                    BandReading::Compression
                } else if close > upper {
                    BandReading::BreakoutUp
                } else if close < lower {
                    BandReading::BreakoutDown
                } else {
                    BandReading::Normal
                }
            }
            _ => BandReading::Normal,
        };

        let slow_ema_distance = row
            .ema_slow
            .filter(|ema| *ema != 0.0)
            .map(|ema| (close - ema).abs() / ema.abs());

        Self {
            trend,
            momentum,
            bands,
            structure: structure_reading(table),
            slow_ema_distance,
        }
    }

    pub fn momentum_message(&self) -> &'static str {
        match self.momentum {
            MomentumZone::Overbought => "El RSI está en sobrecompra. Entrar aquí suele ser riesgoso.",
            MomentumZone::Oversold => "El RSI está en sobreventa. Puede haber rebote, pero confirma.",
            MomentumZone::Neutral => "El RSI está en zona neutral. Espera estructura o confirmación.",
        }
    }

    pub fn trade_warning(&self) -> &'static str {
        match (self.momentum, self.trend) {
            (MomentumZone::Overbought, TrendReading::Bullish) => "Precio extendido. Espera retroceso.",
            (MomentumZone::Oversold, TrendReading::Bearish) => "Presión bajista fuerte. No anticipes.",
            _ => "Contexto sano. Observa estructura antes de entrar.",
        }
    }
}

/// Close against the range of the previous 20 bars.
fn structure_reading(table: &IndicatorTable) -> StructureReading {
    let last = table.last_index();
    if last < STRUCTURE_LOOKBACK {
        return StructureReading::Unavailable;
    }
    let close = table.last_bar().close;
    let (Some(high), Some(low)) = (
        window_max(&table.highs(), last - 1, STRUCTURE_LOOKBACK),
        window_min(&table.lows(), last - 1, STRUCTURE_LOOKBACK),
    ) else {
        return StructureReading::Unavailable;
    };

    if close > high {
        StructureReading::BreakoutUp
    } else if close < low {
        StructureReading::BreakoutDown
    } else {
        StructureReading::Range
    }
}

/// Indicator-derived predicates for the advisory rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorFlags {
    #[serde(rename = "cerca_ema200")]
    pub near_slow_ema: bool,
    #[serde(rename = "cerca_bollinger")]
    pub near_band: bool,
    #[serde(rename = "estructura_valida")]
    pub structure_valid: bool,
    #[serde(rename = "intencion_no_clara")]
    pub intent_unclear: bool,
    #[serde(rename = "estructura_confirmada")]
    pub structure_confirmed: bool,
}

impl IndicatorFlags {
    /// Derive the flags from the readings and the dominant direction.
    ///
    /// - near EMA200: within 1% of it;
    /// - near a band: close outside the Bollinger envelope;
    /// - structure valid: near EMA200 with momentum in 42..=58;
    /// - intent unclear: no dominant direction;
    /// - structure confirmed: a 20-bar breakout in the dominant direction.
    pub fn derive(table: &IndicatorTable, context: &MarketContext, direction: Direction) -> Self {
        let near_slow_ema = context
            .slow_ema_distance
            .is_some_and(|d| d <= NEAR_EMA_SLOW);
        let near_band = matches!(
            context.bands,
            BandReading::BreakoutUp | BandReading::BreakoutDown
        );
        let orderly_momentum = table
            .last_row()
            .momentum
            .is_some_and(|m| (ORDERLY_MOMENTUM.0..=ORDERLY_MOMENTUM.1).contains(&m));
        let structure_confirmed = matches!(
            (direction, context.structure),
            (Direction::Bullish, StructureReading::BreakoutUp)
                | (Direction::Bearish, StructureReading::BreakoutDown)
        );

        Self {
            near_slow_ema,
            near_band,
            structure_valid: near_slow_ema && orderly_momentum,
            intent_unclear: !direction.is_directional(),
            structure_confirmed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::fixtures::flat_rows;
    use crate::table::IndicatorRow;

    fn table_with(f: impl Fn(&mut IndicatorRow)) -> IndicatorTable {
        let mut rows = flat_rows(30, 100.0);
        if let Some(last) = rows.last_mut() {
            f(last);
        }
        IndicatorTable::from_rows(rows).unwrap()
    }

    #[test]
    fn absent_indicators_read_neutral() {
        let table = table_with(|_| {});
        let ctx = MarketContext::read(&table);
        assert_eq!(ctx.trend, TrendReading::Neutral);
        assert_eq!(ctx.momentum, MomentumZone::Neutral);
        assert_eq!(ctx.bands, BandReading::Normal);
        assert_eq!(ctx.structure, StructureReading::Range);
        assert_eq!(ctx.slow_ema_distance, None);
    }

    #[test]
    fn trend_and_momentum_zones() {
        let table = table_with(|r| {
            r.ema_slow = Some(90.0);
            r.momentum = Some(75.0);
        });
        let ctx = MarketContext::read(&table);
        assert_eq!(ctx.trend, TrendReading::Bullish);
        assert_eq!(ctx.momentum, MomentumZone::Overbought);
        assert_eq!(ctx.trade_warning(), "Precio extendido. Espera retroceso.");
    }

    #[test]
    fn band_readings() {
        let squeeze = table_with(|r| {
            r.band_lower = Some(99.8);
            r.band_upper = Some(100.2);
        });
        assert_eq!(MarketContext::read(&squeeze).bands, BandReading::Compression);

        let above = table_with(|r| {
            r.band_lower = Some(95.0);
            r.band_upper = Some(99.0);
        });
        assert_eq!(MarketContext::read(&above).bands, BandReading::BreakoutUp);
    }

    #[test]
    fn structure_breakout_uses_previous_bars() {
        let table = table_with(|r| {
            r.bar.high = 103.0;
            r.bar.close = 102.5;
        });
        assert_eq!(MarketContext::read(&table).structure, StructureReading::BreakoutUp);

        let short = IndicatorTable::from_rows(flat_rows(10, 100.0)).unwrap();
        assert_eq!(MarketContext::read(&short).structure, StructureReading::Unavailable);
    }

    #[test]
    fn orderly_market_near_ema200_is_valid_structure() {
        let table = table_with(|r| {
            r.ema_slow = Some(100.5);
            r.momentum = Some(50.0);
        });
        let ctx = MarketContext::read(&table);
        let flags = IndicatorFlags::derive(&table, &ctx, Direction::Neutral);
        assert!(flags.near_slow_ema);
        assert!(flags.structure_valid);
        assert!(flags.intent_unclear);
        assert!(!flags.near_band);
        assert!(!flags.structure_confirmed);
    }

    #[test]
    fn breakout_confirms_only_its_own_direction() {
        let table = table_with(|r| {
            r.bar.high = 103.0;
            r.bar.close = 102.5;
        });
        let ctx = MarketContext::read(&table);
        assert!(IndicatorFlags::derive(&table, &ctx, Direction::Bullish).structure_confirmed);
        assert!(!IndicatorFlags::derive(&table, &ctx, Direction::Bearish).structure_confirmed);
    }
}
