//! Console level encodings.
//!
//! The console approximates `20 * log10(v)` with a four-segment piecewise-linear
//! law over [-90 dB, +10 dB]. Faders travel as a float quantised to 1024 steps;
//! sends and a few other levels use a coarser 161-step table derived from the
//! same law.

/// Lowest representable level (treated as -inf by the console)
pub const LEVEL_MIN_DB: f64 = -90.0;
/// Highest representable level
pub const LEVEL_MAX_DB: f64 = 10.0;

/// Number of quantisation steps for 1024-level parameters (0..=1023)
const LEVEL_1024_STEPS: f64 = 1023.0;
/// Number of intervals in the 161-entry table (0..=160)
const LEVEL_161_STEPS: u32 = 160;

/// Convert a normalised fader float (0.0-1.0) to dB.
pub fn float_to_db(f: f64) -> f64 {
    if f >= 0.5 {
        f * 40.0 - 30.0
    } else if f >= 0.25 {
        f * 80.0 - 50.0
    } else if f >= 0.0625 {
        f * 160.0 - 70.0
    } else {
        f * 480.0 - 90.0
    }
}

/// Convert dB to a normalised fader float, snapped to the nearest of 1024 steps.
pub fn db_to_float(db: f64) -> f64 {
    let f = if db >= -10.0 {
        (db + 30.0) / 40.0
    } else if db >= -30.0 {
        (db + 50.0) / 80.0
    } else if db >= -60.0 {
        (db + 70.0) / 160.0
    } else {
        (db + 90.0) / 480.0
    };
    (f * LEVEL_1024_STEPS).round() / LEVEL_1024_STEPS
}

/// The 161-entry level table, ascending.
///
/// Entry `i` is the level at wire position `i / 160`. Every entry is a
/// multiple of 0.25 dB, so it is exact in both f32 and f64.
#[derive(Debug, Clone, PartialEq)]
pub struct Level161Table {
    levels: Vec<f64>,
}

impl Level161Table {
    pub fn new() -> Self {
        let levels = (0..=LEVEL_161_STEPS)
            .map(|i| {
                let i = i as f64;
                match i {
                    i if i < 10.0 => 3.0 * i - 90.0,
                    i if i < 40.0 => i - 70.0,
                    i if i < 80.0 => i * 0.5 - 50.0,
                    i => i * 0.25 - 30.0,
                }
            })
            .collect();
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Snap a level to the nearest table entry. Ties go to the lower entry.
    pub fn nearest(&self, level: f64) -> f64 {
        let upper = self.levels.partition_point(|&l| l < level);
        if upper == 0 {
            return self.levels[0];
        }
        if upper == self.levels.len() {
            return self.levels[upper - 1];
        }
        let lower_value = self.levels[upper - 1];
        let upper_value = self.levels[upper];
        if (lower_value - level).abs() <= (upper_value - level).abs() {
            lower_value
        } else {
            upper_value
        }
    }

    /// Exact reverse lookup: the table index holding `level`.
    pub fn index_of(&self, level: f64) -> Option<usize> {
        // -0.0 + 0.0 == +0.0, so a negative zero still finds the 0 dB entry
        let level = level + 0.0;
        self.levels.binary_search_by(|l| l.total_cmp(&level)).ok()
    }

    /// Wire position (0.0-1.0) of a table member.
    pub fn position_of(&self, level: f64) -> Option<f64> {
        self.index_of(level)
            .map(|i| i as f64 / LEVEL_161_STEPS as f64)
    }
}

impl Default for Level161Table {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_to_db_breakpoints() {
        assert_eq!(float_to_db(0.0), -90.0);
        assert_eq!(float_to_db(0.0625), -60.0);
        assert_eq!(float_to_db(0.25), -30.0);
        assert_eq!(float_to_db(0.5), -10.0);
        assert_eq!(float_to_db(1.0), 10.0);
    }

    #[test]
    fn test_db_to_float_breakpoints() {
        assert_eq!(db_to_float(-90.0), 0.0);
        assert_eq!(db_to_float(10.0), 1.0);
        // 0 dB sits at 0.75 before quantisation
        assert!((db_to_float(0.0) - 0.75).abs() <= 0.5 / 1023.0);
    }

    #[test]
    fn test_db_round_trip_within_quantum() {
        let quantum_db = 480.0 / 1023.0;
        let mut v = LEVEL_MIN_DB;
        while v <= LEVEL_MAX_DB {
            let back = float_to_db(db_to_float(v));
            assert!((back - v).abs() <= quantum_db, "{} -> {}", v, back);
            v += 0.37;
        }
    }

    #[test]
    fn test_table_shape() {
        let table = Level161Table::new();
        assert_eq!(table.len(), 161);
        assert_eq!(table.levels()[0], -90.0);
        assert_eq!(table.levels()[10], -60.0);
        assert_eq!(table.levels()[40], -30.0);
        assert_eq!(table.levels()[80], -10.0);
        assert_eq!(table.levels()[160], 10.0);
        assert!(table.levels().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_table_matches_level_law() {
        let table = Level161Table::new();
        for (i, level) in table.levels().iter().enumerate() {
            let law = float_to_db(i as f64 / 160.0);
            assert!((law - level).abs() < 1e-9, "entry {}: {} vs {}", i, level, law);
        }
    }

    #[test]
    fn test_nearest_snaps_and_breaks_ties_low() {
        let table = Level161Table::new();
        assert_eq!(table.nearest(-88.0), -87.0);
        assert_eq!(table.nearest(-88.5), -90.0);
        assert_eq!(table.nearest(0.1), 0.0);
        assert_eq!(table.nearest(-200.0), -90.0);
        assert_eq!(table.nearest(50.0), 10.0);
    }

    #[test]
    fn test_position_lookup() {
        let table = Level161Table::new();
        assert_eq!(table.position_of(-90.0), Some(0.0));
        assert_eq!(table.position_of(10.0), Some(1.0));
        assert_eq!(table.position_of(-10.0), Some(0.5));
        assert_eq!(table.position_of(-10.1), None);
    }
}
