use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use backtest_engine::{BacktestRequest, BacktestResult};

use crate::{ApiResponse, AppError, AppState};

pub fn backtest_routes() -> Router<AppState> {
    Router::new().route("/api/backtest/run", post(run_backtest))
}

async fn run_backtest(
    State(state): State<AppState>,
    payload: Result<Json<BacktestRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BacktestResult>>, AppError> {
    let Json(request) = payload?;
    let result = state.backtest.run(&request).await?;
    Ok(Json(ApiResponse::success(result)))
}
