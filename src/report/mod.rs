//! Report orchestration: access-control resolution and the consolidated
//! pipeline behind the three query operations.

pub mod access;
pub mod pipeline;

pub use access::resolve_scope;
pub use pipeline::{
    BalancePoint, ReportPipeline, ReportRequest, ScoreReport, VendorScoreSummary,
};
