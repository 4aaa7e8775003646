pub mod health;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::engine::AnalysisInput;
use crate::errors::EngineError;
use crate::models::report::AnalysisReport;
use crate::models::resume::ResumeDocument;
use crate::models::target::JobTarget;
use crate::state::AppState;

/// POST /api/v1/analyze request body. `now` defaults to the server's current
/// date; clients wanting reproducible output pin it explicitly.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub raw_text: Option<String>,
    pub document: Option<ResumeDocument>,
    pub target: Option<JobTarget>,
    pub now: Option<NaiveDate>,
}

pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, EngineError> {
    let input = AnalysisInput {
        raw_text: request.raw_text,
        document: request.document,
        target: request.target,
        now: request.now.unwrap_or_else(|| Utc::now().date_naive()),
    };
    let report = state.engine.analyze_report(&input)?;
    Ok(Json(report))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyze", post(handle_analyze))
        .with_state(state)
}
