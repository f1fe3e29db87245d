//! Computed row shapes: derived daily metrics and score-input rows.
//!
//! These are built fresh per query and never persisted.

use crate::domain::{Decimal, RetentionBuckets, VendorId};
use chrono::NaiveDate;
use serde::Serialize;

/// Financial ratios derived from one `DailyVendorRecord`, plus the
/// running balance carried in from the ledger fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedDailyMetrics {
    pub vendor_id: VendorId,
    pub date: NaiveDate,
    /// deposit − withdraw.
    pub revenue: Decimal,
    /// expense + chargeback + commission share.
    pub total_ad_cost: Decimal,
    /// revenue / totalAdCost × 100, 0 if no ad cost.
    pub roi: Decimal,
    /// revenue / ftdCount, 0 if no FTDs.
    pub ltv: Decimal,
    /// ftdCount / registrationCount × 100, 0 if no registrations.
    pub conversion_rate: Decimal,
    /// totalAdCost / ftdCount, 0 if no FTDs.
    pub ftd_cost: Decimal,
    pub ads_views: i64,
    pub ads_clicks: i64,
    pub registration_count: i64,
    pub ftd_count: i64,
    pub running_balance: Decimal,
    pub top_up_amount: Decimal,
}

/// A derived-metrics row extended with retention inputs and its
/// composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInputRow {
    #[serde(flatten)]
    pub metrics: DerivedDailyMetrics,
    #[serde(flatten)]
    pub retention: RetentionBuckets,
    /// Composite score, nominally 0-100.
    pub score: f64,
}

impl ScoreInputRow {
    /// Build an unscored row; the scorer fills in `score` once the full
    /// candidate set is known.
    pub fn unscored(metrics: DerivedDailyMetrics, retention: RetentionBuckets) -> Self {
        Self {
            metrics,
            retention,
            score: 0.0,
        }
    }
}
