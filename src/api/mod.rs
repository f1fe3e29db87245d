pub mod balances;
pub mod health;
pub mod reports;

use crate::db::Repository;
use crate::report::ReportPipeline;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub pipeline: Arc<ReportPipeline>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>) -> Self {
        let pipeline = Arc::new(ReportPipeline::new(repo.clone()));
        Self { repo, pipeline }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/balances", get(balances::get_balances))
        .route("/v1/reports/metrics", get(reports::get_metrics_report))
        .route("/v1/reports/scores", get(reports::get_score_report))
        .layer(cors)
        .with_state(state)
}
