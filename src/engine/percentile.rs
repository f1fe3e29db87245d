//! Percentile normalizer.
//!
//! Maps a raw metric into [0, 1] by its position between the 5th and 95th
//! percentile of its cohort (every row of the current query). Percentiles
//! use linear interpolation between order statistics. All math here is f64;
//! these values feed the display-level composite score, not the ledger.

/// Fraction for the lower percentile band edge.
pub const LOWER_BAND: f64 = 0.05;
/// Fraction for the upper percentile band edge.
pub const UPPER_BAND: f64 = 0.95;

/// The `p`-th percentile (p in [0, 1]) of `sorted`, which must be sorted
/// ascending. Linear interpolation between the neighboring order
/// statistics: index = (n - 1) * p.
///
/// Returns 0.0 for an empty slice; callers gate on emptiness upstream.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let index = (sorted.len() - 1) as f64 * p;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }

    let weight = index - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// The 5th/95th percentile band of one scored metric across the cohort.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub p05: f64,
    pub p95: f64,
}

impl Band {
    /// Compute the band from the cohort's raw values (any order).
    pub fn from_values(values: &mut [f64]) -> Self {
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Band {
            p05: percentile(values, LOWER_BAND),
            p95: percentile(values, UPPER_BAND),
        }
    }

    /// Map a raw value into [0, 1] relative to the band.
    ///
    /// A flat band (p95 == p05) normalizes everything to 0.5 rather than
    /// dividing by zero; otherwise the value is clamped into the band.
    pub fn normalize(&self, value: f64) -> f64 {
        let spread = self.p95 - self.p05;
        if spread == 0.0 {
            return 0.5;
        }
        ((value - self.p05) / spread).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        // index = 0.2 * 4 = 0.8 -> between 10 and 20, weighted 0.8 toward 20.
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        let p = percentile(&values, 0.2);
        assert!((p - 18.0).abs() < 1e-9, "got {}", p);
    }

    #[test]
    fn percentile_exact_index_returns_element() {
        let values = [10.0, 20.0, 30.0];
        assert_eq!(percentile(&values, 0.5), 20.0);
        assert_eq!(percentile(&values, 0.0), 10.0);
        assert_eq!(percentile(&values, 1.0), 30.0);
    }

    #[test]
    fn percentile_single_value() {
        assert_eq!(percentile(&[7.5], 0.95), 7.5);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn band_normalizes_into_unit_interval() {
        let mut values = vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let band = Band::from_values(&mut values);
        for v in [-1000.0, 0.0, 10.0, 55.0, 100.0, 1e9] {
            let n = band.normalize(v);
            assert!((0.0..=1.0).contains(&n), "normalize({}) = {}", v, n);
        }
    }

    #[test]
    fn flat_band_normalizes_to_half() {
        let mut values = vec![42.0; 8];
        let band = Band::from_values(&mut values);
        assert_eq!(band.p05, band.p95);
        assert_eq!(band.normalize(42.0), 0.5);
        assert_eq!(band.normalize(0.0), 0.5);
    }

    #[test]
    fn values_outside_the_band_clamp() {
        let band = Band { p05: 10.0, p95: 20.0 };
        assert_eq!(band.normalize(5.0), 0.0);
        assert_eq!(band.normalize(25.0), 1.0);
        assert!((band.normalize(15.0) - 0.5).abs() < 1e-12);
    }
}
