use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::get,
    Json, Router,
};
use risk_core::FactorView;
use risk_manager::{CategoryWeights, RadarScore, WeightUpdateResult};
use serde::Deserialize;

use crate::{parse_date, ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

pub fn factor_routes() -> Router<AppState> {
    Router::new()
        .route("/api/factors/radar", get(get_radar))
        .route("/api/factors/explain", get(explain_factors))
        .route("/api/factors/weights", get(get_weights).put(update_weights))
}

async fn get_radar(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<RadarScore>>>, AppError> {
    let Query(query) = query?;
    let date = parse_date("date", query.date.as_deref())?;
    let scores = state.risk_manager.radar_scores(date).await?;
    Ok(Json(ApiResponse::success(scores)))
}

async fn explain_factors(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<FactorView>>>, AppError> {
    let Query(query) = query?;
    let date = parse_date("date", query.date.as_deref())?
        .ok_or_else(|| AppError::bad_request("date is required"))?;
    let factors = state.risk_manager.explain(date).await?;
    Ok(Json(ApiResponse::success(factors)))
}

async fn get_weights(State(state): State<AppState>) -> Json<ApiResponse<CategoryWeights>> {
    Json(ApiResponse::success(state.risk_manager.weights()))
}

async fn update_weights(
    State(state): State<AppState>,
    payload: Result<Json<CategoryWeights>, JsonRejection>,
) -> Result<Json<ApiResponse<WeightUpdateResult>>, AppError> {
    let Json(weights) = payload?;
    let result = state.risk_manager.update_weights(weights).await?;
    Ok(Json(ApiResponse::success(result)))
}
