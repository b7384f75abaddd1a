//! Percentage <-> value mapping for console parameters.
//!
//! Widgets work in a normalised percentage (0.0-1.0); the console and the
//! templates work in real-world values. Each [`ParamType`] picks the law used
//! to move between the two.

mod levels;
mod units;

use std::sync::Arc;

pub use levels::{db_to_float, float_to_db, Level161Table, LEVEL_MAX_DB, LEVEL_MIN_DB};
pub use units::{round_to, Unit, ROUND_TO_WHEN_IN_DOUBT};

use crate::template::ParamType;

/// Caller contract violations. None of these are recoverable by retrying
/// with the same inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("percentage {0} is outside 0.0..=1.0")]
    PercentageOutOfRange(f64),

    #[error("value {value} is outside {min}..={max}")]
    ValueOutOfRange { value: f64, min: f64, max: f64 },

    #[error("invalid bounds {min}..={max} for {param_type:?}")]
    InvalidBounds {
        min: f64,
        max: f64,
        param_type: ParamType,
    },

    #[error("{param_type:?} is only defined for -90..=10, got {min}..={max}")]
    FixedRangeMismatch {
        min: f64,
        max: f64,
        param_type: ParamType,
    },

    #[error("value {0} not found in the level table")]
    NotInTable(f64),

    #[error("{0:?} values cannot be mapped to a percentage")]
    UnsupportedType(ParamType),
}

/// Maps between percentages and values, holding the shared level tables.
///
/// Cloning is cheap; every clone shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct ValueMapper {
    level_161: Arc<Level161Table>,
}

impl ValueMapper {
    pub fn new() -> Self {
        Self::with_table(Arc::new(Level161Table::new()))
    }

    pub fn with_table(level_161: Arc<Level161Table>) -> Self {
        Self { level_161 }
    }

    pub fn level_161(&self) -> &Level161Table {
        &self.level_161
    }

    /// Value at `pct` of the way from `min` to `max` under `param_type`'s law.
    pub fn value_from_percentage(
        &self,
        min: f64,
        max: f64,
        pct: f64,
        param_type: ParamType,
    ) -> Result<f64, MappingError> {
        if !(0.0..=1.0).contains(&pct) {
            return Err(MappingError::PercentageOutOfRange(pct));
        }
        check_domain(min, max, param_type)?;
        if pct == 0.0 {
            return Ok(min);
        }
        if pct == 1.0 {
            return Ok(max);
        }

        let value = match param_type {
            ParamType::LinF => min + pct * (max - min),
            ParamType::Int => (min + pct * (max - min)).round(),
            ParamType::LogF => {
                let log_min = min.log10();
                let log_max = max.log10();
                10f64.powf(log_min + pct * (log_max - log_min))
            }
            ParamType::Level161 => self.level_161.nearest(min + pct * (max - min)),
            ParamType::Level1024 => float_to_db(pct),
            ParamType::String | ParamType::Bitset => {
                return Err(MappingError::UnsupportedType(param_type))
            }
        };
        Ok(value.clamp(min, max))
    }

    /// Normalised position (0.0-1.0) of `value` within `min..=max` under
    /// `param_type`'s law.
    pub fn percentage_from_value(
        &self,
        min: f64,
        max: f64,
        value: f64,
        param_type: ParamType,
    ) -> Result<f64, MappingError> {
        check_domain(min, max, param_type)?;
        if !(min..=max).contains(&value) {
            return Err(MappingError::ValueOutOfRange { value, min, max });
        }
        if value == min {
            return Ok(0.0);
        }
        if value == max {
            return Ok(1.0);
        }

        let pct = match param_type {
            ParamType::LinF => (value - min) / (max - min),
            ParamType::Int => (value.round() - min) / (max - min),
            ParamType::LogF => {
                let log_min = min.log10();
                (value.log10() - log_min) / (max.log10() - log_min)
            }
            ParamType::Level161 => {
                if self.level_161.index_of(value).is_none() {
                    return Err(MappingError::NotInTable(value));
                }
                (value - min) / (max - min)
            }
            ParamType::Level1024 => db_to_float(value),
            ParamType::String | ParamType::Bitset => {
                return Err(MappingError::UnsupportedType(param_type))
            }
        };
        Ok(pct.clamp(0.0, 1.0))
    }

    /// Position the console expects on the wire. Same as
    /// [`percentage_from_value`](Self::percentage_from_value) except for
    /// Level161, which travels as its table index over 160.
    pub fn wire_position(
        &self,
        min: f64,
        max: f64,
        value: f64,
        param_type: ParamType,
    ) -> Result<f64, MappingError> {
        let pct = self.percentage_from_value(min, max, value, param_type)?;
        match param_type {
            ParamType::Level161 => self
                .level_161
                .position_of(value)
                .ok_or(MappingError::NotInTable(value)),
            _ => Ok(pct),
        }
    }
}

/// Validate the bounds a law is asked to work over.
fn check_domain(min: f64, max: f64, param_type: ParamType) -> Result<(), MappingError> {
    match param_type {
        ParamType::String | ParamType::Bitset => Err(MappingError::UnsupportedType(param_type)),
        ParamType::Level161 | ParamType::Level1024 => {
            if min == LEVEL_MIN_DB && max == LEVEL_MAX_DB {
                Ok(())
            } else {
                Err(MappingError::FixedRangeMismatch {
                    min,
                    max,
                    param_type,
                })
            }
        }
        ParamType::LogF if min <= 0.0 || !(min < max) => Err(MappingError::InvalidBounds {
            min,
            max,
            param_type,
        }),
        ParamType::LinF | ParamType::LogF | ParamType::Int => {
            if min < max {
                Ok(())
            } else {
                Err(MappingError::InvalidBounds {
                    min,
                    max,
                    param_type,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEPS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

    fn mapper() -> ValueMapper {
        ValueMapper::new()
    }

    #[test]
    fn test_endpoints_for_every_law() {
        let m = mapper();
        let cases = [
            (ParamType::LinF, -18.0, 18.0),
            (ParamType::LogF, 20.0, 20000.0),
            (ParamType::Int, 1.0, 32.0),
            (ParamType::Level161, -90.0, 10.0),
            (ParamType::Level1024, -90.0, 10.0),
        ];
        for (param_type, min, max) in cases {
            assert_eq!(m.value_from_percentage(min, max, 0.0, param_type), Ok(min));
            assert_eq!(m.value_from_percentage(min, max, 1.0, param_type), Ok(max));
            assert_eq!(m.percentage_from_value(min, max, min, param_type), Ok(0.0));
            assert_eq!(m.percentage_from_value(min, max, max, param_type), Ok(1.0));
        }
    }

    #[test]
    fn test_linear_round_trip() {
        let m = mapper();
        for p in STEPS {
            let v = m.value_from_percentage(0.3, 500.0, p, ParamType::LinF).unwrap();
            let back = m.percentage_from_value(0.3, 500.0, v, ParamType::LinF).unwrap();
            assert!((back - p).abs() < 1e-9, "{} -> {} -> {}", p, v, back);
        }
    }

    #[test]
    fn test_log_round_trip() {
        let m = mapper();
        for p in STEPS {
            let v = m.value_from_percentage(20.0, 20000.0, p, ParamType::LogF).unwrap();
            let back = m.percentage_from_value(20.0, 20000.0, v, ParamType::LogF).unwrap();
            assert!((back - p).abs() < 1e-9, "{} -> {} -> {}", p, v, back);
        }
    }

    #[test]
    fn test_log_midpoint_is_geometric_mean() {
        let m = mapper();
        let v = m.value_from_percentage(20.0, 20000.0, 0.5, ParamType::LogF).unwrap();
        assert!((v - (20.0f64 * 20000.0).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_int_round_trip_within_rounding() {
        let m = mapper();
        for p in STEPS {
            let v = m.value_from_percentage(0.0, 100.0, p, ParamType::Int).unwrap();
            assert_eq!(v, v.round());
            let back = m.percentage_from_value(0.0, 100.0, v, ParamType::Int).unwrap();
            assert!((back - p).abs() <= 0.5 / 100.0);
        }
    }

    #[test]
    fn test_int_rounds_half_away_from_zero() {
        let m = mapper();
        // 0 + 0.5 * 5 = 2.5 -> 3
        assert_eq!(m.value_from_percentage(0.0, 5.0, 0.5, ParamType::Int), Ok(3.0));
        // -5 + 0.5 * 5 = -2.5 -> -3
        assert_eq!(m.value_from_percentage(-5.0, 0.0, 0.5, ParamType::Int), Ok(-3.0));
    }

    #[test]
    fn test_level_161_entries_at_linear_position() {
        let m = mapper();
        for &level in m.level_161().levels() {
            let pct = (level - LEVEL_MIN_DB) / (LEVEL_MAX_DB - LEVEL_MIN_DB);
            let v = m
                .value_from_percentage(LEVEL_MIN_DB, LEVEL_MAX_DB, pct, ParamType::Level161)
                .unwrap();
            assert_eq!(v, level);
        }
    }

    #[test]
    fn test_level_161_lookup_miss() {
        let m = mapper();
        assert_eq!(
            m.percentage_from_value(-90.0, 10.0, -10.1, ParamType::Level161),
            Err(MappingError::NotInTable(-10.1))
        );
        assert_eq!(
            m.percentage_from_value(-90.0, 10.0, -10.0, ParamType::Level161),
            Ok(0.8)
        );
    }

    #[test]
    fn test_level_161_round_trip_every_entry() {
        let m = mapper();
        for &level in m.level_161().levels() {
            let pct = m
                .percentage_from_value(LEVEL_MIN_DB, LEVEL_MAX_DB, level, ParamType::Level161)
                .unwrap();
            let back = m
                .value_from_percentage(LEVEL_MIN_DB, LEVEL_MAX_DB, pct, ParamType::Level161)
                .unwrap();
            assert_eq!(back, level, "{} -> {} -> {}", level, pct, back);
        }
    }

    #[test]
    fn test_level_161_wire_position_is_table_index() {
        let m = mapper();
        assert_eq!(
            m.wire_position(-90.0, 10.0, -10.0, ParamType::Level161),
            Ok(0.5)
        );
        assert_eq!(
            m.wire_position(-90.0, 10.0, -30.0, ParamType::Level161),
            Ok(0.25)
        );
        assert_eq!(
            m.wire_position(-90.0, 10.0, -10.1, ParamType::Level161),
            Err(MappingError::NotInTable(-10.1))
        );
        // Other laws send their plain percentage
        assert_eq!(
            m.wire_position(-18.0, 18.0, 0.0, ParamType::LinF),
            m.percentage_from_value(-18.0, 18.0, 0.0, ParamType::LinF)
        );
    }

    #[test]
    fn test_level_1024_uses_fader_law() {
        let m = mapper();
        let v = m
            .value_from_percentage(-90.0, 10.0, 0.75, ParamType::Level1024)
            .unwrap();
        assert_eq!(v, 0.0);
        let pct = m
            .percentage_from_value(-90.0, 10.0, -10.0, ParamType::Level1024)
            .unwrap();
        assert!((pct - 0.5).abs() <= 0.5 / 1023.0);
    }

    #[test]
    fn test_level_laws_reject_other_ranges() {
        let m = mapper();
        assert!(matches!(
            m.value_from_percentage(-80.0, 10.0, 0.5, ParamType::Level1024),
            Err(MappingError::FixedRangeMismatch { .. })
        ));
        assert!(matches!(
            m.percentage_from_value(-90.0, 0.0, -3.0, ParamType::Level161),
            Err(MappingError::FixedRangeMismatch { .. })
        ));
    }

    #[test]
    fn test_preconditions() {
        let m = mapper();
        assert_eq!(
            m.value_from_percentage(0.0, 1.0, 1.5, ParamType::LinF),
            Err(MappingError::PercentageOutOfRange(1.5))
        );
        assert!(matches!(
            m.value_from_percentage(0.0, 1.0, f64::NAN, ParamType::LinF),
            Err(MappingError::PercentageOutOfRange(_))
        ));
        assert!(matches!(
            m.percentage_from_value(0.0, 1.0, 2.0, ParamType::LinF),
            Err(MappingError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            m.value_from_percentage(0.0, 100.0, 0.5, ParamType::LogF),
            Err(MappingError::InvalidBounds { .. })
        ));
        assert!(matches!(
            m.value_from_percentage(5.0, 5.0, 0.5, ParamType::LinF),
            Err(MappingError::InvalidBounds { .. })
        ));
        assert_eq!(
            m.value_from_percentage(0.0, 12.0, 0.5, ParamType::String),
            Err(MappingError::UnsupportedType(ParamType::String))
        );
    }
}
