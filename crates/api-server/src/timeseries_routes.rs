use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use timeseries::{Point, TimeseriesView};

use crate::{parse_date, ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Deserialize)]
pub struct DownsampleRequest {
    pub points: Vec<Point>,
    pub threshold: usize,
}

pub fn timeseries_routes() -> Router<AppState> {
    Router::new()
        .route("/api/risk/timeseries", get(get_timeseries))
        .route("/api/timeseries/downsample", post(downsample_points))
}

async fn get_timeseries(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TimeseriesView>>, AppError> {
    let Query(query) = query?;
    let start = parse_date("start", query.start.as_deref())?;
    let end = parse_date("end", query.end.as_deref())?;
    let today = chrono::Local::now().date_naive();

    let view = state.risk_manager.timeseries(start, end, today).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn downsample_points(
    payload: Result<Json<DownsampleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<Point>>>, AppError> {
    let Json(req) = payload?;
    tracing::debug!(points = req.points.len(), threshold = req.threshold, "Downsampling points");
    Ok(Json(ApiResponse::success(timeseries::downsample(&req.points, req.threshold))))
}
