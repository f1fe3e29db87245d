//! Domain types for the vendor ledger analytics core.
//!
//! This module provides:
//! - Lossless numeric handling via a Decimal wrapper with guarded ratios
//! - Domain primitives: VendorId, BrandId, RetentionBucket
//! - Raw ledger rows (daily records, monthly checkpoints, retention)
//! - Computed row shapes (derived metrics, score-input rows)

pub mod decimal;
pub mod metrics;
pub mod primitives;
pub mod record;

pub use decimal::Decimal;
pub use metrics::{DerivedDailyMetrics, ScoreInputRow};
pub use primitives::{BrandId, BucketParseError, RetentionBucket, VendorId};
pub use record::{
    DailyVendorRecord, MonthlyClosingBalance, RetentionBuckets, RetentionPercentage, Vendor,
};
