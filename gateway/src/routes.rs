use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fiber_standards::{Catalog, FiberStandard};
use loss_budget::{
    analyze_link, budget_for, ErrorKind, ErrorReport, LinkAnalysis, LinkRequest,
    LossBudgetError, LossBudgetResult, RawField, RawLossBudgetRequest,
};

#[derive(Clone, Default)]
pub struct AppState {
    pub catalog: Catalog,
}

pub type ApiError = (StatusCode, Json<ErrorReport>);

/// Calculator output stamped with the time the gateway produced it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Computed<T> {
    #[serde(flatten)]
    pub result: T,
    pub computed_at: DateTime<Utc>,
}

impl<T> Computed<T> {
    fn now(result: T) -> Self {
        Self {
            result,
            computed_at: Utc::now(),
        }
    }
}

/// Form-style query string; every value arrives as text
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LossBudgetQuery {
    #[serde(default)]
    pub standard_code: String,
    pub distance_meters: Option<String>,
    pub splice_count: Option<String>,
    pub connector_count: Option<String>,
}

impl From<LossBudgetQuery> for RawLossBudgetRequest {
    fn from(query: LossBudgetQuery) -> Self {
        Self {
            standard_code: query.standard_code,
            distance_meters: query.distance_meters.map(RawField::from),
            splice_count: query.splice_count.map(RawField::from),
            connector_count: query.connector_count.map(RawField::from),
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::DistanceExceeded => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InvalidInput
        | ErrorKind::UnknownStandard
        | ErrorKind::UnknownWavelength
        | ErrorKind::UnknownApplication => StatusCode::BAD_REQUEST,
    }
}

fn reject(err: LossBudgetError) -> ApiError {
    let report = err.report();
    tracing::debug!(kind = ?report.error_kind, "{}", report.message);
    (status_for(report.error_kind), Json(report))
}

fn malformed(body_text: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorReport {
            error_kind: ErrorKind::InvalidInput,
            message: format!("Malformed request: {body_text}"),
            details: None,
        }),
    )
}

// ========== Route Handlers ==========

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "loss-gateway",
        "standards": state.catalog.len(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Full reference table
pub async fn list_standards(State(state): State<AppState>) -> Json<Vec<&'static FiberStandard>> {
    Json(state.catalog.iter().collect())
}

pub async fn get_standard(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<&'static FiberStandard>, ApiError> {
    state.catalog.get(&code).map(Json).map_err(|e| {
        let report = LossBudgetError::from(e).report();
        (StatusCode::NOT_FOUND, Json(report))
    })
}

fn compute(state: &AppState, raw: &RawLossBudgetRequest) -> Result<LossBudgetResult, ApiError> {
    let request = raw.parse().map_err(reject)?;
    let standard = state
        .catalog
        .get(&request.standard_code)
        .map_err(|e| reject(e.into()))?;
    budget_for(
        standard,
        request.distance_meters,
        request.splice_count,
        request.connector_count,
    )
    .map_err(reject)
}

pub async fn loss_budget(
    State(state): State<AppState>,
    payload: Result<Json<RawLossBudgetRequest>, JsonRejection>,
) -> Result<Json<Computed<LossBudgetResult>>, ApiError> {
    let Json(raw) = payload.map_err(|e| malformed(e.body_text()))?;
    let result = compute(&state, &raw)?;
    Ok(Json(Computed::now(result)))
}

pub async fn loss_budget_query(
    State(state): State<AppState>,
    query: Result<Query<LossBudgetQuery>, QueryRejection>,
) -> Result<Json<Computed<LossBudgetResult>>, ApiError> {
    let Query(query) = query.map_err(|e| malformed(e.body_text()))?;
    let result = compute(&state, &query.into())?;
    Ok(Json(Computed::now(result)))
}

pub async fn link_budget(
    payload: Result<Json<LinkRequest>, JsonRejection>,
) -> Result<Json<Computed<LinkAnalysis>>, ApiError> {
    let Json(request) = payload.map_err(|e| malformed(e.body_text()))?;
    let analysis = analyze_link(&request).map_err(reject)?;
    tracing::info!(
        segments = analysis.segments.len(),
        total_loss_db = analysis.total_loss_db,
        status = ?analysis.status,
        "link analyzed"
    );
    Ok(Json(Computed::now(analysis)))
}

// ========== Router ==========

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/standards", get(list_standards))
        .route("/standards/:code", get(get_standard))
        .route("/loss-budget", get(loss_budget_query).post(loss_budget))
        .route("/link-budget", post(link_budget))
        .with_state(state)
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .nest("/api/v1", api_routes(state))
}
