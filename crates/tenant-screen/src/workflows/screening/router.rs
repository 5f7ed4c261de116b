use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::ScoredTenantRecord;
use super::export::{to_csv_string, to_exportable};
use super::normalizer::RowErrorView;
use super::query::FilterCriteria;
use super::report::{DashboardSummary, ScreeningInsights};
use super::scoring::ScoringConfig;
use super::{screen, ScreenError, ScreeningRun};

/// One stateless screening request: the CSV travels with the criteria.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScreeningRequest {
    pub csv: String,
    #[serde(default)]
    pub criteria: FilterCriteria,
    /// Reference date for ongoing tenancies; today when omitted.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResponse {
    pub as_of: NaiveDate,
    pub records: Vec<ScoredTenantRecord>,
    pub row_errors: Vec<RowErrorView>,
    pub summary: DashboardSummary,
    pub insights: ScreeningInsights,
}

/// Router builder exposing the scoring and export endpoints.
pub fn screening_router(config: Arc<ScoringConfig>) -> Router {
    Router::new()
        .route("/api/v1/tenants/score", post(score_handler))
        .route("/api/v1/tenants/export", post(export_handler))
        .with_state(config)
}

pub(crate) async fn score_handler(
    State(config): State<Arc<ScoringConfig>>,
    Json(request): Json<ScreeningRequest>,
) -> Response {
    let as_of = request.as_of.unwrap_or_else(|| Local::now().date_naive());
    let mut run = match run_screening(&config, &request.csv, as_of) {
        Ok(run) => run,
        Err(response) => return response,
    };

    let outcome = run.session.apply(request.criteria);
    if let Some(error) = outcome.rejected {
        return error_response(StatusCode::BAD_REQUEST, error.to_string());
    }

    let response = ScreeningResponse {
        as_of,
        summary: DashboardSummary::compare(&outcome.records, run.session.scored()),
        insights: ScreeningInsights::from_records(&outcome.records),
        row_errors: run.row_errors.iter().map(|error| error.to_view()).collect(),
        records: outcome.records,
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn export_handler(
    State(config): State<Arc<ScoringConfig>>,
    Json(request): Json<ScreeningRequest>,
) -> Response {
    let as_of = request.as_of.unwrap_or_else(|| Local::now().date_naive());
    let mut run = match run_screening(&config, &request.csv, as_of) {
        Ok(run) => run,
        Err(response) => return response,
    };

    let outcome = run.session.apply(request.criteria);
    if let Some(error) = outcome.rejected {
        return error_response(StatusCode::BAD_REQUEST, error.to_string());
    }

    match to_csv_string(&to_exportable(&outcome.records)) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
    }
}

fn run_screening(
    config: &ScoringConfig,
    csv: &str,
    as_of: NaiveDate,
) -> Result<ScreeningRun, Response> {
    screen(Cursor::new(csv.as_bytes()), config.clone(), as_of).map_err(|error| match error {
        ScreenError::Import(error) => error_response(StatusCode::BAD_REQUEST, error.to_string()),
        ScreenError::Scoring(error) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    })
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
