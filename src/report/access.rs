//! Access-control boundary for report queries.
//!
//! The external permission system is modeled as an operator table: every
//! caller presents an api key that resolves to a view scope, either "all
//! vendors" or an explicit vendor list. Resolution happens before any
//! ledger read and fails closed.

use crate::db::{OperatorScope, Repository};
use crate::domain::VendorId;
use crate::error::AppError;

/// Resolve the caller's view scope from its api key.
///
/// A missing or unknown key is an authorization failure, surfaced before
/// the pipeline touches the ledger.
pub async fn resolve_scope(
    repo: &Repository,
    api_key: Option<&str>,
) -> Result<OperatorScope, AppError> {
    let api_key = api_key
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Forbidden("missing x-api-key header".to_string()))?;

    let operator = repo
        .query_operator(api_key)
        .await?
        .ok_or_else(|| AppError::Forbidden("unknown api key".to_string()))?;

    Ok(operator.scope)
}

/// True if the scope permits viewing this vendor's records.
pub fn vendor_visible(scope: &OperatorScope, vendor_id: VendorId) -> bool {
    match scope {
        OperatorScope::All => true,
        OperatorScope::Vendors(ids) => ids.contains(&vendor_id),
    }
}

/// Restrict a candidate vendor set to what the scope permits.
pub fn restrict_vendors(scope: &OperatorScope, vendors: Vec<VendorId>) -> Vec<VendorId> {
    match scope {
        OperatorScope::All => vendors,
        OperatorScope::Vendors(_) => vendors
            .into_iter()
            .filter(|v| vendor_visible(scope, *v))
            .collect(),
    }
}
