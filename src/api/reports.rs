//! Report query endpoints: query parsing shared by all three reports,
//! plus the metrics and score handlers.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{BrandId, DerivedDailyMetrics, VendorId};
use crate::error::AppError;
use crate::report::{self, ReportRequest, ScoreReport};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub vendor: Option<String>,
    pub brand: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// The caller's api key, from the `x-api-key` header.
pub fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-api-key").and_then(|v| v.to_str().ok())
}

/// Parse the shared query parameters into a validated `ReportRequest`.
///
/// The date range is mandatory; each rejection names the offending field.
pub fn parse_request(params: &ReportQuery) -> Result<ReportRequest, AppError> {
    let from = parse_date("from", params.from.as_deref())?;
    let to = parse_date("to", params.to.as_deref())?;

    let vendor = params
        .vendor
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(VendorId::from_str)
        .transpose()
        .map_err(|_| AppError::BadRequest("vendor must be a numeric id".to_string()))?;

    let brand = params
        .brand
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(BrandId::from_str)
        .transpose()
        .map_err(|_| AppError::BadRequest("brand must be a numeric id".to_string()))?;

    let request = ReportRequest {
        vendor,
        brand,
        from,
        to,
    };
    request.validate()?;
    Ok(request)
}

fn parse_date(field: &str, value: Option<&str>) -> Result<NaiveDate, AppError> {
    let value = value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))?;

    NaiveDate::from_str(value)
        .map_err(|_| AppError::BadRequest(format!("{} must be an ISO date (YYYY-MM-DD)", field)))
}

pub async fn get_metrics_report(
    Query(params): Query<ReportQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Vec<DerivedDailyMetrics>>, AppError> {
    let request = parse_request(&params)?;
    let scope = report::resolve_scope(&state.repo, api_key(&headers)).await?;

    let rows = state.pipeline.metrics_report(&scope, &request).await?;
    Ok(Json(rows))
}

pub async fn get_score_report(
    Query(params): Query<ReportQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<ScoreReport>, AppError> {
    let request = parse_request(&params)?;
    let scope = report::resolve_scope(&state.repo, api_key(&headers)).await?;

    let report = state.pipeline.score_report(&scope, &request).await?;
    Ok(Json(report))
}
