use crate::mapping::Unit;

/// Kind of value a parameter carries; selects its interpolation law and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Int,
    String,
    /// String of '0'/'1' characters sent as an int
    Bitset,
    /// Linear float
    LinF,
    /// Logarithmic (base 10) float
    LogF,
    /// Level snapped to the 161-entry table
    Level161,
    /// Level on the 1024-step fader law
    Level1024,
}

impl ParamType {
    /// Types a fade can interpolate
    pub fn is_fadeable(self) -> bool {
        matches!(
            self,
            ParamType::Int
                | ParamType::LinF
                | ParamType::LogF
                | ParamType::Level161
                | ParamType::Level1024
        )
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            ParamType::LinF | ParamType::LogF | ParamType::Level161 | ParamType::Level1024
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Int(i32),
    Float(f32),
    Text(String),
}

/// A concrete value for one slot, tagged with the ParamType it was made for.
///
/// Only the typed constructors can build one, so the stored field always
/// agrees with the tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueStorer {
    param_type: ParamType,
    value: StoredValue,
}

impl ValueStorer {
    /// Integer value, also used for enum indices
    pub fn int(value: i32) -> Self {
        Self {
            param_type: ParamType::Int,
            value: StoredValue::Int(value),
        }
    }

    /// Text value, also used for option labels
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            param_type: ParamType::String,
            value: StoredValue::Text(value.into()),
        }
    }

    pub fn bitset(bits: impl Into<String>) -> Self {
        Self {
            param_type: ParamType::Bitset,
            value: StoredValue::Text(bits.into()),
        }
    }

    pub fn linf(value: f32) -> Self {
        Self::float_of(ParamType::LinF, value)
    }

    pub fn logf(value: f32) -> Self {
        Self::float_of(ParamType::LogF, value)
    }

    pub fn level_161(db: f32) -> Self {
        Self::float_of(ParamType::Level161, db)
    }

    pub fn level_1024(db: f32) -> Self {
        Self::float_of(ParamType::Level1024, db)
    }

    /// Build the value a slot of `param_type` expects from a mapped number.
    /// Returns `None` for string-like types.
    pub fn from_number(param_type: ParamType, value: f64) -> Option<Self> {
        match param_type {
            ParamType::Int => Some(Self::int(value.round() as i32)),
            ParamType::LinF | ParamType::LogF | ParamType::Level161 | ParamType::Level1024 => {
                Some(Self::float_of(param_type, value as f32))
            }
            ParamType::String | ParamType::Bitset => None,
        }
    }

    fn float_of(param_type: ParamType, value: f32) -> Self {
        Self {
            param_type,
            value: StoredValue::Float(value),
        }
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn value(&self) -> &StoredValue {
        &self.value
    }

    pub fn as_int(&self) -> Option<i32> {
        match self.value {
            StoredValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self.value {
            StoredValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            StoredValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used by the mapper (ints widen, text has none)
    pub fn as_number(&self) -> Option<f64> {
        match self.value {
            StoredValue::Int(v) => Some(v as f64),
            StoredValue::Float(v) => Some(v as f64),
            StoredValue::Text(_) => None,
        }
    }
}

/// A string chosen from a closed set of labels
#[derive(Debug, Clone, PartialEq)]
pub struct OptionParam {
    pub name: String,
    pub verbose_name: String,
    pub description: String,
    pub options: Vec<String>,
}

impl OptionParam {
    pub fn new(name: &str, verbose_name: &str, description: &str, options: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            verbose_name: verbose_name.to_string(),
            description: description.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn contains(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// An index into an ordered set of labels. The index travels, not the label.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumParam {
    pub name: String,
    pub verbose_name: String,
    pub description: String,
    pub labels: Vec<String>,
}

impl EnumParam {
    pub fn new(name: &str, verbose_name: &str, description: &str, labels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            verbose_name: verbose_name.to_string(),
            description: description.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}

/// Limits a NonIter value must respect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Int { min: i32, max: i32 },
    Float { min: f32, max: f32 },
    /// String or bitset length, in characters
    Length { min: usize, max: usize },
}

/// How a float NonIter travels on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// The value itself
    #[default]
    Native,
    /// Its 0.0-1.0 position under the parameter's law
    Normalised,
    /// `1 - position`, for controls the console runs backwards
    NormalisedInverted,
}

/// A numeric or string leaf with explicit bounds
#[derive(Debug, Clone, PartialEq)]
pub struct NonIter {
    pub name: String,
    pub verbose_name: String,
    pub description: String,
    pub param_type: ParamType,
    pub bounds: Bounds,
    pub default: ValueStorer,
    pub unit: Unit,
    pub wire: WireFormat,
    /// Minimum digits when the value is written into a path (`/ch/01`)
    pub path_width: usize,
}

impl NonIter {
    pub fn int(
        name: &str,
        verbose_name: &str,
        description: &str,
        default: i32,
        min: i32,
        max: i32,
    ) -> Self {
        Self {
            name: name.to_string(),
            verbose_name: verbose_name.to_string(),
            description: description.to_string(),
            param_type: ParamType::Int,
            bounds: Bounds::Int { min, max },
            default: ValueStorer::int(default),
            unit: Unit::None,
            wire: WireFormat::Native,
            path_width: 0,
        }
    }

    /// Float leaf for any float law. Sent normalised, the way the console expects.
    #[allow(clippy::too_many_arguments)]
    pub fn float(
        name: &str,
        verbose_name: &str,
        description: &str,
        default: f32,
        param_type: ParamType,
        min: f32,
        max: f32,
        unit: Unit,
    ) -> Self {
        debug_assert!(param_type.is_float(), "{:?} is not a float type", param_type);
        Self {
            name: name.to_string(),
            verbose_name: verbose_name.to_string(),
            description: description.to_string(),
            param_type,
            bounds: Bounds::Float { min, max },
            default: ValueStorer::float_of(param_type, default),
            unit,
            wire: WireFormat::Normalised,
            path_width: 0,
        }
    }

    pub fn string(
        name: &str,
        verbose_name: &str,
        description: &str,
        default: &str,
        min_len: usize,
        max_len: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            verbose_name: verbose_name.to_string(),
            description: description.to_string(),
            param_type: ParamType::String,
            bounds: Bounds::Length {
                min: min_len,
                max: max_len,
            },
            default: ValueStorer::string(default),
            unit: Unit::None,
            wire: WireFormat::Native,
            path_width: 0,
        }
    }

    /// Fixed-width bitset, e.g. 6 bits for mute-group membership
    pub fn bitset(name: &str, verbose_name: &str, description: &str, bits: usize) -> Self {
        // Sent as one OSC int
        debug_assert!(bits <= 32, "bitset {} is {} bits wide", name, bits);
        Self {
            name: name.to_string(),
            verbose_name: verbose_name.to_string(),
            description: description.to_string(),
            param_type: ParamType::Bitset,
            bounds: Bounds::Length {
                min: bits,
                max: bits,
            },
            default: ValueStorer::bitset("0".repeat(bits)),
            unit: Unit::None,
            wire: WireFormat::Native,
            path_width: 0,
        }
    }

    pub fn with_wire(mut self, wire: WireFormat) -> Self {
        self.wire = wire;
        self
    }

    pub fn with_path_width(mut self, width: usize) -> Self {
        self.path_width = width;
        self
    }

    /// Numeric range as f64, for the mapper. `None` for string-like leaves.
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        match self.bounds {
            Bounds::Int { min, max } => Some((min as f64, max as f64)),
            Bounds::Float { min, max } => Some((min as f64, max as f64)),
            Bounds::Length { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_storer_tags() {
        assert_eq!(ValueStorer::int(3).param_type(), ParamType::Int);
        assert_eq!(ValueStorer::level_1024(-10.0).param_type(), ParamType::Level1024);
        assert_eq!(ValueStorer::bitset("0101").as_str(), Some("0101"));
        assert_eq!(ValueStorer::linf(1.5).as_int(), None);
    }

    #[test]
    fn test_from_number() {
        assert_eq!(ValueStorer::from_number(ParamType::Int, 4.5), Some(ValueStorer::int(5)));
        assert_eq!(
            ValueStorer::from_number(ParamType::LogF, 440.0),
            Some(ValueStorer::logf(440.0))
        );
        assert_eq!(ValueStorer::from_number(ParamType::String, 1.0), None);
    }

    #[test]
    fn test_fadeable_types() {
        assert!(ParamType::Level161.is_fadeable());
        assert!(ParamType::Int.is_fadeable());
        assert!(!ParamType::String.is_fadeable());
        assert!(!ParamType::Bitset.is_fadeable());
    }

    #[test]
    fn test_non_iter_ranges() {
        let trim = NonIter::float("trim", "Trim", "", 0.0, ParamType::LinF, -18.0, 18.0, Unit::Db);
        assert_eq!(trim.numeric_range(), Some((-18.0, 18.0)));
        assert_eq!(trim.wire, WireFormat::Normalised);

        let name = NonIter::string("name", "Name", "", "", 0, 12);
        assert_eq!(name.numeric_range(), None);

        let mutes = NonIter::bitset("mutes", "Mute Groups", "", 6);
        assert_eq!(mutes.default.as_str(), Some("000000"));
    }
}
