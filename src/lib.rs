pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod report;

pub use config::Config;
pub use db::{init_db, Operator, OperatorScope, Repository};
pub use domain::{
    BrandId, DailyVendorRecord, Decimal, DerivedDailyMetrics, MonthlyClosingBalance,
    RetentionBucket, RetentionBuckets, RetentionPercentage, ScoreInputRow, Vendor, VendorId,
};
pub use error::AppError;
pub use report::{ReportPipeline, ReportRequest};
