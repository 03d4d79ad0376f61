use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use risk_core::RiskLevel;
use risk_manager::CurrentRisk;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct LevelQuery {
    pub index: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelLookup {
    pub index: Decimal,
    pub level: RiskLevel,
    pub color: &'static str,
}

pub fn risk_routes() -> Router<AppState> {
    Router::new()
        .route("/api/risk/current", get(get_current_risk))
        .route("/api/risk/level", get(classify_index))
}

async fn get_current_risk(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CurrentRisk>>, AppError> {
    let current = state.risk_manager.current_risk().await?;
    Ok(Json(ApiResponse::success(current)))
}

async fn classify_index(
    query: Result<Query<LevelQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<LevelLookup>>, AppError> {
    let Query(query) = query?;
    let index: Decimal = query
        .index
        .as_deref()
        .map(str::trim)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::bad_request("index must be a number"))?;

    let level = RiskLevel::from_index(index);
    Ok(Json(ApiResponse::success(LevelLookup {
        index,
        level,
        color: level.color(),
    })))
}
