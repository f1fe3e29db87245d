//! The consolidated report pipeline.
//!
//! One pipeline feeds all three report shapes: the ledger fold and metric
//! derivation run once per vendor leg, and the scoring pass bolts on only
//! for score reports. Earlier incarnations of this system computed these
//! metrics independently per report and drifted; everything derives from
//! the same leg here.

use crate::db::{OperatorScope, Repository};
use crate::domain::{
    BrandId, DailyVendorRecord, Decimal, DerivedDailyMetrics, RetentionBuckets, ScoreInputRow,
    VendorId,
};
use crate::engine::{self, ScoreWeights};
use crate::error::AppError;
use crate::report::access;
use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// A validated report query: mandatory inclusive date range plus optional
/// vendor/brand equality filters.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub vendor: Option<VendorId>,
    pub brand: Option<BrandId>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportRequest {
    /// Reject malformed ranges before any ledger read.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.from > self.to {
            return Err(AppError::BadRequest("from must be <= to".to_string()));
        }
        Ok(())
    }
}

/// One day's balance point in a balance series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub vendor_id: VendorId,
    pub date: NaiveDate,
    pub running_balance: Decimal,
}

/// Per-vendor rollup attached to a score report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorScoreSummary {
    pub vendor_id: VendorId,
    pub row_count: usize,
    /// Arithmetic mean of the per-row scores in the period.
    pub average_score: f64,
}

/// A full score report: scored rows plus per-vendor summaries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub rows: Vec<ScoreInputRow>,
    pub summaries: Vec<VendorScoreSummary>,
}

/// One vendor's ledger leg: each in-range record paired with its carried
/// balance.
struct VendorLeg {
    vendor_id: VendorId,
    rows: Vec<(DailyVendorRecord, Decimal)>,
}

/// Orchestrates repository reads and the pure engine into report rows.
pub struct ReportPipeline {
    repo: Arc<Repository>,
    weights: ScoreWeights,
}

impl ReportPipeline {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self {
            repo,
            weights: ScoreWeights::default(),
        }
    }

    /// Running balance per vendor-day over the requested range.
    pub async fn balance_series(
        &self,
        scope: &OperatorScope,
        request: &ReportRequest,
    ) -> Result<Vec<BalancePoint>, AppError> {
        let legs = self.run_legs(scope, request).await?;
        Ok(legs
            .into_iter()
            .flat_map(|leg| {
                let VendorLeg { vendor_id, rows } = leg;
                rows.into_iter().map(move |(record, balance)| BalancePoint {
                    vendor_id,
                    date: record.day,
                    running_balance: balance,
                })
            })
            .collect())
    }

    /// Derived financial metrics per vendor-day (`computeMetricsReport`).
    pub async fn metrics_report(
        &self,
        scope: &OperatorScope,
        request: &ReportRequest,
    ) -> Result<Vec<DerivedDailyMetrics>, AppError> {
        let legs = self.run_legs(scope, request).await?;
        Ok(legs
            .into_iter()
            .flat_map(|leg| {
                leg.rows
                    .into_iter()
                    .map(|(record, balance)| engine::derive(&record, balance))
            })
            .collect())
    }

    /// Scored rows plus per-vendor summaries (`computeScoreReport`).
    ///
    /// The percentile pass is a barrier: every candidate row across every
    /// vendor must be derived before any row can be normalized.
    pub async fn score_report(
        &self,
        scope: &OperatorScope,
        request: &ReportRequest,
    ) -> Result<ScoreReport, AppError> {
        let legs = self.run_legs(scope, request).await?;

        let retention_futures = legs.iter().map(|leg| {
            let repo = self.repo.clone();
            let vendor_id = leg.vendor_id;
            let (from, to) = (request.from, request.to);
            async move {
                let rows = repo.query_retention(vendor_id, from, to).await?;
                Ok::<_, AppError>((vendor_id, rows))
            }
        });
        let retention_by_vendor: HashMap<VendorId, HashMap<NaiveDate, RetentionBuckets>> =
            try_join_all(retention_futures)
                .await?
                .into_iter()
                .map(|(vendor_id, rows)| {
                    let mut by_day: HashMap<NaiveDate, RetentionBuckets> = HashMap::new();
                    for row in rows {
                        by_day
                            .entry(row.day)
                            .or_default()
                            .set(row.bucket, row.percentage.to_f64());
                    }
                    (vendor_id, by_day)
                })
                .collect();

        let mut rows: Vec<ScoreInputRow> = legs
            .into_iter()
            .flat_map(|leg| {
                let VendorLeg { vendor_id, rows } = leg;
                let retention_days = retention_by_vendor.get(&vendor_id).cloned();
                rows.into_iter().map(move |(record, balance)| {
                    let retention = retention_days
                        .as_ref()
                        .and_then(|days| days.get(&record.day).copied())
                        .unwrap_or_default();
                    ScoreInputRow::unscored(engine::derive(&record, balance), retention)
                })
            })
            .collect();

        engine::score_rows(&mut rows, &self.weights);

        let summaries = summarize(&rows);
        Ok(ScoreReport { rows, summaries })
    }

    /// Validate, resolve the vendor set, and run each vendor's ledger leg
    /// concurrently.
    async fn run_legs(
        &self,
        scope: &OperatorScope,
        request: &ReportRequest,
    ) -> Result<Vec<VendorLeg>, AppError> {
        request.validate()?;
        let vendor_ids = self.resolve_vendors(scope, request).await?;

        let leg_futures = vendor_ids.into_iter().map(|vendor_id| {
            let repo = self.repo.clone();
            let (from, to) = (request.from, request.to);
            async move { vendor_leg(&repo, vendor_id, from, to).await }
        });

        try_join_all(leg_futures).await
    }

    /// The vendor set for this query: filters intersected with the
    /// caller's scope. A vendor filter outside the scope is rejected; an
    /// unknown vendor id is a validation failure.
    async fn resolve_vendors(
        &self,
        scope: &OperatorScope,
        request: &ReportRequest,
    ) -> Result<Vec<VendorId>, AppError> {
        if let Some(vendor_id) = request.vendor {
            let vendor = self
                .repo
                .query_vendor(vendor_id)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("unknown vendor: {}", vendor_id)))?;

            if !access::vendor_visible(scope, vendor_id) {
                return Err(AppError::Forbidden(format!(
                    "vendor {} is outside the caller's scope",
                    vendor_id
                )));
            }
            if let Some(brand_id) = request.brand {
                if vendor.brand_id != brand_id {
                    return Ok(Vec::new());
                }
            }
            return Ok(vec![vendor_id]);
        }

        let vendors = match request.brand {
            Some(brand_id) => self.repo.query_vendors_by_brand(brand_id).await?,
            None => self.repo.query_vendors().await?,
        };

        Ok(access::restrict_vendors(
            scope,
            vendors.into_iter().map(|v| v.vendor_id).collect(),
        ))
    }
}

/// Per-vendor rollups, ordered by vendor id for stable output.
fn summarize(rows: &[ScoreInputRow]) -> Vec<VendorScoreSummary> {
    let mut totals: HashMap<VendorId, (usize, f64)> = HashMap::new();
    for row in rows {
        let entry = totals.entry(row.metrics.vendor_id).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += row.score;
    }

    let mut summaries: Vec<VendorScoreSummary> = totals
        .into_iter()
        .map(|(vendor_id, (count, sum))| VendorScoreSummary {
            vendor_id,
            row_count: count,
            average_score: sum / count as f64,
        })
        .collect();
    summaries.sort_by_key(|s| s.vendor_id);
    summaries
}

/// One vendor's ledger leg: opening balance from the prior-month
/// checkpoint plus any same-month prefix, then the in-range fold.
async fn vendor_leg(
    repo: &Repository,
    vendor_id: VendorId,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<VendorLeg, AppError> {
    let (prior_year, prior_month) = engine::balance::prior_month(from);
    let checkpoint = repo
        .query_closing_balance(vendor_id, prior_year, prior_month)
        .await?
        .unwrap_or_else(Decimal::zero);

    let month_start = engine::balance::first_of_month(from);
    let prefix = if from > month_start {
        repo.query_daily_records_before(vendor_id, month_start, from)
            .await?
    } else {
        Vec::new()
    };
    let opening = engine::opening_balance(checkpoint, &prefix);

    let records = repo.query_daily_records(vendor_id, from, to).await?;
    let balances = engine::fold_running_balances(&records, opening);

    let rows = records
        .into_iter()
        .zip(balances)
        .map(|(record, balance)| (record, balance.running_balance))
        .collect();

    Ok(VendorLeg { vendor_id, rows })
}
