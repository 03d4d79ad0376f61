pub mod alert_routes;
pub mod backtest_routes;
pub mod config;
pub mod factor_routes;
pub mod request_id;
pub mod risk_routes;
pub mod timeseries_routes;


use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use backtest_engine::BacktestService;
use chrono::NaiveDate;
use risk_core::{RiskError, RiskStore};
use risk_manager::{AlertService, RiskManager, WeightConfig};
use risk_store::RiskDb;
use serde::Serialize;
use timeseries::TimeseriesAssembler;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub risk_manager: Arc<RiskManager>,
    pub alerts: Arc<AlertService>,
    pub backtest: Arc<BacktestService>,
}

impl AppState {
    pub fn new(store: Arc<dyn RiskStore>, weights: Arc<WeightConfig>, lttb_threshold: usize) -> Self {
        let risk_manager = RiskManager::new(store.clone(), weights)
            .with_assembler(TimeseriesAssembler::new(lttb_threshold));
        Self {
            risk_manager: Arc::new(risk_manager),
            alerts: Arc::new(AlertService::new(store.clone())),
            backtest: Arc::new(BacktestService::new(store)),
        }
    }
}

/// Envelope for every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error carrying the HTTP status to answer with.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<RiskError> for AppError {
    fn from(e: RiskError) -> Self {
        let status = match e {
            RiskError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RiskError::NotFound(_) => StatusCode::NOT_FOUND,
            RiskError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::with_status(status, e)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %format!("{:#}", self.error), "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(status = %self.status, error = %self.error, "Request rejected");
            self.error.to_string()
        };
        (self.status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

/// Parse an optional `YYYY-MM-DD` query parameter.
pub(crate) fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::bad_request(format!("{field} must be a date in YYYY-MM-DD format"))),
    }
}

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        Some(list) => {
            let allowed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}

/// Full application router.
pub fn build_router(state: AppState, cors_origins: Option<&[String]>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(risk_routes::risk_routes())
        .merge(timeseries_routes::timeseries_routes())
        .merge(factor_routes::factor_routes())
        .merge(backtest_routes::backtest_routes())
        .merge(alert_routes::alert_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .layer(middleware::from_fn(request_id::request_id_middleware))
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(env_filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter()).init();
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        database_url = %config.database_url,
        lttb_threshold = config.lttb_threshold,
        "Starting oil risk API server"
    );

    let db = RiskDb::new(&config.database_url, config.db_max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let weights = Arc::new(WeightConfig::with_weights(config.initial_weights)?);

    let state = AppState::new(Arc::new(db), weights, config.lttb_threshold);
    let app = build_router(state, config.cors_origins.as_deref());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    tracing::info!("Shutting down");
}
