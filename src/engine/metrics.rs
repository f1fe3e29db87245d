//! Derived metrics calculator.
//!
//! Pure, stateless conversion of one raw daily record into its financial
//! ratios. Every zero-denominator ratio is defined as zero, so this layer
//! never raises and never produces infinity or NaN.

use crate::domain::{DailyVendorRecord, Decimal, DerivedDailyMetrics};

/// Derive the financial ratios for one record, attaching the running
/// balance computed by the ledger fold.
pub fn derive(record: &DailyVendorRecord, running_balance: Decimal) -> DerivedDailyMetrics {
    let revenue = record.deposit - record.withdraw;
    let total_ad_cost = record.total_ad_cost();
    let ftd_count = Decimal::from_count(record.ftd_count);
    let registration_count = Decimal::from_count(record.registration_count);

    DerivedDailyMetrics {
        vendor_id: record.vendor_id,
        date: record.day,
        revenue,
        total_ad_cost,
        roi: revenue.percent_of(total_ad_cost),
        ltv: revenue.ratio(ftd_count),
        conversion_rate: ftd_count.percent_of(registration_count),
        ftd_cost: total_ad_cost.ratio(ftd_count),
        ads_views: record.ads_views,
        ads_clicks: record.ads_clicks,
        registration_count: record.registration_count,
        ftd_count: record.ftd_count,
        running_balance,
        top_up_amount: record.top_up_amount,
    }
}
