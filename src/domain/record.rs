//! Raw ledger rows: daily vendor activity, monthly checkpoints, retention.

use crate::domain::{BrandId, Decimal, RetentionBucket, VendorId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of raw advertising and payment activity for a vendor.
///
/// At most one record exists per (vendor, day). Written by the external
/// entry/import collaborators; read-only to the analytics core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVendorRecord {
    pub vendor_id: VendorId,
    pub day: NaiveDate,
    /// Gross deposits received that day.
    pub deposit: Decimal,
    /// Gross withdrawals paid out that day.
    pub withdraw: Decimal,
    pub registration_count: i64,
    /// First-time-deposit count.
    pub ftd_count: i64,
    pub ad_expense: Decimal,
    /// Commission on ad spend, in percentage points (12.5 means 12.5%).
    pub ads_commission_rate: Decimal,
    pub ads_chargeback: Decimal,
    pub ads_views: i64,
    pub ads_clicks: i64,
    /// Account top-up credited that day.
    pub top_up_amount: Decimal,
}

impl DailyVendorRecord {
    /// A zeroed record for a vendor/day, useful as a builder base.
    pub fn empty(vendor_id: VendorId, day: NaiveDate) -> Self {
        Self {
            vendor_id,
            day,
            deposit: Decimal::zero(),
            withdraw: Decimal::zero(),
            registration_count: 0,
            ftd_count: 0,
            ad_expense: Decimal::zero(),
            ads_commission_rate: Decimal::zero(),
            ads_chargeback: Decimal::zero(),
            ads_views: 0,
            ads_clicks: 0,
            top_up_amount: Decimal::zero(),
        }
    }

    /// Total advertising cost for the day:
    /// expense + chargeback + expense × commission-rate / 100.
    ///
    /// Shared by the balance fold and the metrics derivation so the two
    /// can never disagree on what a day cost.
    pub fn total_ad_cost(&self) -> Decimal {
        self.ad_expense
            + self.ads_chargeback
            + self.ad_expense * self.ads_commission_rate.ratio(Decimal::hundred())
    }
}

/// Month-end balance checkpoint for a vendor.
///
/// Lets the ledger calculator open a range without replaying from epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyClosingBalance {
    pub vendor_id: VendorId,
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    pub closing_balance: Decimal,
}

/// Deposit return-rate at one retention horizon for a vendor/day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPercentage {
    pub vendor_id: VendorId,
    pub day: NaiveDate,
    pub bucket: RetentionBucket,
    /// Percentage in [0, 100].
    pub percentage: Decimal,
}

/// The six retention-bucket values for one vendor/day, defaulting to 0
/// for any bucket with no stored row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionBuckets {
    pub nfd: f64,
    pub d1: f64,
    pub d3: f64,
    pub d7: f64,
    pub d15: f64,
    pub d30: f64,
}

impl RetentionBuckets {
    /// Set the value for one bucket.
    pub fn set(&mut self, bucket: RetentionBucket, value: f64) {
        match bucket {
            RetentionBucket::Nfd => self.nfd = value,
            RetentionBucket::D1 => self.d1 = value,
            RetentionBucket::D3 => self.d3 = value,
            RetentionBucket::D7 => self.d7 = value,
            RetentionBucket::D15 => self.d15 = value,
            RetentionBucket::D30 => self.d30 = value,
        }
    }

    /// Get the value for one bucket.
    pub fn get(&self, bucket: RetentionBucket) -> f64 {
        match bucket {
            RetentionBucket::Nfd => self.nfd,
            RetentionBucket::D1 => self.d1,
            RetentionBucket::D3 => self.d3,
            RetentionBucket::D7 => self.d7,
            RetentionBucket::D15 => self.d15,
            RetentionBucket::D30 => self.d30,
        }
    }
}

/// A vendor directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub vendor_id: VendorId,
    pub name: String,
    pub brand_id: BrandId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    #[test]
    fn total_ad_cost_includes_commission() {
        let mut record = DailyVendorRecord::empty(VendorId::new(1), day("2024-03-01"));
        record.ad_expense = dec("100");
        record.ads_chargeback = dec("10");
        record.ads_commission_rate = dec("10");
        assert_eq!(record.total_ad_cost(), dec("120"));
    }

    #[test]
    fn total_ad_cost_zero_for_empty_record() {
        let record = DailyVendorRecord::empty(VendorId::new(1), day("2024-03-01"));
        assert_eq!(record.total_ad_cost(), Decimal::zero());
    }

    #[test]
    fn retention_buckets_default_to_zero_and_set() {
        let mut buckets = RetentionBuckets::default();
        for bucket in RetentionBucket::ALL {
            assert_eq!(buckets.get(bucket), 0.0);
        }
        buckets.set(RetentionBucket::D7, 42.5);
        assert_eq!(buckets.get(RetentionBucket::D7), 42.5);
        assert_eq!(buckets.d7, 42.5);
    }
}
