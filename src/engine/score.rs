//! Composite vendor scorer.
//!
//! Nine percentile-normalized metrics are combined with fixed business
//! weights, then dampened by registration volume. The weight table and the
//! saturation constant are encoded business constants carried over exactly;
//! they have no documented derivation and must not be re-tuned here.

use crate::domain::{RetentionBucket, ScoreInputRow};
use crate::engine::percentile::Band;

/// Registrations per day at which the dampening factor saturates at 1.
pub const REGISTRATION_SATURATION: f64 = 50.0;

/// Fixed metric weights. `Default` is the production weight table; the
/// fields sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub revenue: f64,
    pub conversion_rate: f64,
    pub ftd_cost: f64,
    pub nfd: f64,
    pub d1: f64,
    pub d3: f64,
    pub d7: f64,
    pub d15: f64,
    pub d30: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            revenue: 0.25,
            conversion_rate: 0.15,
            ftd_cost: 0.20,
            nfd: 0.10,
            d1: 0.05,
            d3: 0.07,
            d7: 0.08,
            d15: 0.05,
            d30: 0.05,
        }
    }
}

impl ScoreWeights {
    /// Sum of all weights; 1.0 for the production table.
    pub fn total(&self) -> f64 {
        self.revenue
            + self.conversion_rate
            + self.ftd_cost
            + self.nfd
            + self.d1
            + self.d3
            + self.d7
            + self.d15
            + self.d30
    }
}

/// The nine metrics that participate in the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoredMetric {
    Revenue,
    ConversionRate,
    FtdCost,
    Retention(RetentionBucket),
}

impl ScoredMetric {
    /// All scored metrics, in weight-table order.
    pub const ALL: [ScoredMetric; 9] = [
        ScoredMetric::Revenue,
        ScoredMetric::ConversionRate,
        ScoredMetric::FtdCost,
        ScoredMetric::Retention(RetentionBucket::Nfd),
        ScoredMetric::Retention(RetentionBucket::D1),
        ScoredMetric::Retention(RetentionBucket::D3),
        ScoredMetric::Retention(RetentionBucket::D7),
        ScoredMetric::Retention(RetentionBucket::D15),
        ScoredMetric::Retention(RetentionBucket::D30),
    ];

    /// Extract this metric's raw value from a row.
    pub fn raw_value(&self, row: &ScoreInputRow) -> f64 {
        match self {
            ScoredMetric::Revenue => row.metrics.revenue.to_f64(),
            ScoredMetric::ConversionRate => row.metrics.conversion_rate.to_f64(),
            ScoredMetric::FtdCost => row.metrics.ftd_cost.to_f64(),
            ScoredMetric::Retention(bucket) => row.retention.get(*bucket),
        }
    }

    /// This metric's weight in the table.
    pub fn weight(&self, weights: &ScoreWeights) -> f64 {
        match self {
            ScoredMetric::Revenue => weights.revenue,
            ScoredMetric::ConversionRate => weights.conversion_rate,
            ScoredMetric::FtdCost => weights.ftd_cost,
            ScoredMetric::Retention(RetentionBucket::Nfd) => weights.nfd,
            ScoredMetric::Retention(RetentionBucket::D1) => weights.d1,
            ScoredMetric::Retention(RetentionBucket::D3) => weights.d3,
            ScoredMetric::Retention(RetentionBucket::D7) => weights.d7,
            ScoredMetric::Retention(RetentionBucket::D15) => weights.d15,
            ScoredMetric::Retention(RetentionBucket::D30) => weights.d30,
        }
    }

    /// True for metrics where a lower raw value is better (acquisition cost).
    pub fn lower_is_better(&self) -> bool {
        matches!(self, ScoredMetric::FtdCost)
    }
}

/// Dampening factor for low registration volume:
/// `min(1, sqrt(registrations / 50))`.
pub fn registration_factor(registration_count: f64) -> f64 {
    if registration_count <= 0.0 {
        return 0.0;
    }
    (registration_count / REGISTRATION_SATURATION).sqrt().min(1.0)
}

/// Score every row of one query's candidate set in place.
///
/// The percentile bands are computed over the full set first (this is the
/// synchronization barrier: no row can be scored until all rows are
/// derived), then each row is normalized, weighted, and dampened. An empty
/// set is a no-op.
pub fn score_rows(rows: &mut [ScoreInputRow], weights: &ScoreWeights) {
    if rows.is_empty() {
        return;
    }
    debug_assert!((weights.total() - 1.0).abs() < 1e-9);

    let bands: Vec<Band> = ScoredMetric::ALL
        .iter()
        .map(|metric| {
            let mut values: Vec<f64> = rows.iter().map(|row| metric.raw_value(row)).collect();
            Band::from_values(&mut values)
        })
        .collect();

    for row in rows.iter_mut() {
        let mut weighted_sum = 0.0;
        for (metric, band) in ScoredMetric::ALL.iter().zip(&bands) {
            let mut normalized = band.normalize(metric.raw_value(row));
            if metric.lower_is_better() {
                normalized = 1.0 - normalized;
            }
            weighted_sum += metric.weight(weights) * normalized;
        }

        let factor = registration_factor(row.metrics.registration_count as f64);
        row.score = 100.0 * weighted_sum * factor;
    }
}
