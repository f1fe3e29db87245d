//! Pure computation engine for deterministic ledger analytics.
//!
//! Everything in here is synchronous, stateless, and free of I/O: the
//! balance fold, metric derivation, percentile normalization, and the
//! composite scorer. The report layer wires these to the repository.

pub mod balance;
pub mod metrics;
pub mod percentile;
pub mod score;

pub use balance::{fold_running_balances, opening_balance, DailyBalance};
pub use metrics::derive;
pub use percentile::{percentile, Band};
pub use score::{registration_factor, score_rows, ScoreWeights, ScoredMetric};
