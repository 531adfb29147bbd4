use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use deal_engine::listing::Listing;
use deal_engine::mandate::Mandate;
use deal_engine::matching::{generate_report, DealRecommendation};
use deal_engine::planning::{planning_assessment, PlanningAssessment, PlanningContext};
use deal_engine::storage::{MandateStore, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::infra::AppState;

pub(crate) fn deal_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/mandates",
            axum::routing::get(list_mandates_endpoint).post(create_mandate_endpoint),
        )
        .route(
            "/api/v1/mandates/:id",
            axum::routing::get(get_mandate_endpoint)
                .put(update_mandate_endpoint)
                .delete(delete_mandate_endpoint),
        )
        .route(
            "/api/v1/mandates/:id/report",
            axum::routing::post(report_endpoint),
        )
        .route(
            "/api/v1/planning/assess",
            axum::routing::post(planning_assess_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_mandates_endpoint(
    Extension(store): Extension<Arc<dyn MandateStore>>,
) -> Result<Json<Vec<Mandate>>, AppError> {
    Ok(Json(store.get_all()?))
}

pub(crate) async fn create_mandate_endpoint(
    Extension(store): Extension<Arc<dyn MandateStore>>,
    Json(mandate): Json<Mandate>,
) -> Result<(StatusCode, Json<Mandate>), AppError> {
    let created = store.create(mandate)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(crate) async fn get_mandate_endpoint(
    Extension(store): Extension<Arc<dyn MandateStore>>,
    Path(mandate_id): Path<String>,
) -> Result<Json<Mandate>, AppError> {
    let mandate = store
        .get(&mandate_id)?
        .ok_or(StorageError::NotFound(mandate_id))?;
    Ok(Json(mandate))
}

pub(crate) async fn update_mandate_endpoint(
    Extension(store): Extension<Arc<dyn MandateStore>>,
    Path(mandate_id): Path<String>,
    Json(mandate): Json<Mandate>,
) -> Result<Json<Mandate>, AppError> {
    if mandate.mandate_id != mandate_id {
        return Err(AppError::InvalidInput(format!(
            "body mandate_id '{}' does not match path '{}'",
            mandate.mandate_id, mandate_id
        )));
    }
    Ok(Json(store.update(mandate)?))
}

pub(crate) async fn delete_mandate_endpoint(
    Extension(store): Extension<Arc<dyn MandateStore>>,
    Path(mandate_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if store.delete(&mandate_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StorageError::NotFound(mandate_id).into())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRequest {
    pub(crate) listings: Vec<Listing>,
    #[serde(default)]
    pub(crate) planning_contexts: Option<HashMap<String, PlanningContext>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(default)]
    pub(crate) detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationSummary {
    pub(crate) listing_id: String,
    pub(crate) action: &'static str,
    pub(crate) priority_rank: u32,
    pub(crate) headline: String,
    pub(crate) total_score: f64,
    pub(crate) conviction: &'static str,
    pub(crate) has_planning_upside: bool,
}

impl From<&DealRecommendation> for RecommendationSummary {
    fn from(rec: &DealRecommendation) -> Self {
        RecommendationSummary {
            listing_id: rec.listing_id.clone(),
            action: rec.action.label(),
            priority_rank: rec.priority_rank,
            headline: rec.headline.clone(),
            total_score: rec.scoring.total_score,
            conviction: rec.conviction.level.label(),
            has_planning_upside: rec.has_planning_upside(),
        }
    }
}

pub(crate) async fn report_endpoint(
    Extension(store): Extension<Arc<dyn MandateStore>>,
    Path(mandate_id): Path<String>,
    Query(query): Query<ReportQuery>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mandate = store
        .get(&mandate_id)?
        .ok_or(StorageError::NotFound(mandate_id))?;

    let report = generate_report(
        &request.listings,
        &mandate,
        request.planning_contexts.as_ref(),
    );

    let counts = json!({
        "pursue": report.pursue_count(),
        "consider": report.consider_count(),
        "watch": report.watch_count(),
        "pass": report.pass_count(),
        "actionable": report.actionable_count(),
    });

    let full_detail = query.detail.as_deref() == Some("full");
    let body = if full_detail {
        json!({
            "mandate_id": report.mandate_id,
            "mandate_name": report.mandate_name,
            "generated_at": report.generated_at,
            "total_listings": report.total_listings,
            "counts": counts,
            "recommendations": report.recommendations,
        })
    } else {
        let summaries: Vec<RecommendationSummary> = report
            .recommendations
            .iter()
            .map(RecommendationSummary::from)
            .collect();
        json!({
            "mandate_id": report.mandate_id,
            "mandate_name": report.mandate_name,
            "generated_at": report.generated_at,
            "total_listings": report.total_listings,
            "counts": counts,
            "recommendations": summaries,
        })
    };

    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlanningAssessRequest {
    pub(crate) context: PlanningContext,
    pub(crate) current_value: u64,
}

pub(crate) async fn planning_assess_endpoint(
    Json(request): Json<PlanningAssessRequest>,
) -> Result<Json<PlanningAssessment>, AppError> {
    let assessment = planning_assessment(&request.context, request.current_value)?;
    Ok(Json(assessment))
}
