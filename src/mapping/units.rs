/// Decimal places used when no unit says otherwise
pub const ROUND_TO_WHEN_IN_DOUBT: u32 = 2;

/// Display unit of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    Hertz,
    Db,
    Ms,
    #[default]
    None,
}

impl Unit {
    pub fn decimal_places(self) -> u32 {
        match self {
            Unit::Hertz => 2,
            Unit::Db => 2,
            Unit::Ms => 2,
            Unit::None => ROUND_TO_WHEN_IN_DOUBT,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Hertz => "Hz",
            Unit::Db => "dB",
            Unit::Ms => "ms",
            Unit::None => "",
        }
    }

    /// Render a value rounded to this unit's precision, e.g. `"-12.50 dB"`
    pub fn format(self, value: f64) -> String {
        let digits = self.decimal_places();
        let rounded = round_to(value, digits);
        match self.suffix() {
            "" => format!("{:.*}", digits as usize, rounded),
            suffix => format!("{:.*} {}", digits as usize, rounded, suffix),
        }
    }
}

/// Round half away from zero at `digits` decimal places.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let shift = 10f64.powi(digits as i32);
    (value * shift).round() / shift
}
