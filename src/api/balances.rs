use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::api::reports::{api_key, parse_request, ReportQuery};
use crate::api::AppState;
use crate::error::AppError;
use crate::report::{self, BalancePoint};

pub async fn get_balances(
    Query(params): Query<ReportQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Vec<BalancePoint>>, AppError> {
    let request = parse_request(&params)?;
    let scope = report::resolve_scope(&state.repo, api_key(&headers)).await?;

    let points = state.pipeline.balance_series(&scope, &request).await?;
    Ok(Json(points))
}
