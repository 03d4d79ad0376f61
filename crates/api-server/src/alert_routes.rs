use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use risk_core::{Alert, Page};
use risk_manager::{AlertDetail, AlertQuery};

use crate::{ApiResponse, AppError, AppState};

pub fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/:id", get(get_alert))
}

async fn list_alerts(
    State(state): State<AppState>,
    query: Result<Query<AlertQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Page<Alert>>>, AppError> {
    let Query(query) = query?;
    let page = state.alerts.list(&query).await?;
    Ok(Json(ApiResponse::success(page)))
}

async fn get_alert(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<AlertDetail>>, AppError> {
    let Path(id) = id?;
    let detail = state.alerts.detail(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}
