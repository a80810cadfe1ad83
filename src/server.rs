//! HTTP surface: `GET /search` over the aggregator.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{debug, error, info};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::aggregator::RecipeAggregator;
use crate::config::SearchConfig;
use crate::model::SearchResponse;
use crate::query::{translate, PageLimits, SearchParams, UiFilterState};

/// Shared state handed to every request
pub struct AppState {
    pub aggregator: Arc<RecipeAggregator>,
    pub limits: PageLimits,
}

impl AppState {
    pub fn new(aggregator: RecipeAggregator, limits: PageLimits) -> Arc<Self> {
        Arc::new(AppState {
            aggregator: Arc::new(aggregator),
            limits,
        })
    }

    pub fn from_config(config: &SearchConfig) -> Arc<Self> {
        Self::new(
            RecipeAggregator::from_config(config),
            PageLimits::from(&config.search),
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Aggregation itself broke; provider failures never end up here
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("{}", self);
        (status, self.to_string()).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(search_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let filters: UiFilterState = params.into();
    let query = translate(&filters, &state.limits);
    debug!("search request: {:?}", query);

    // Run on its own task so a panic while merging becomes a 500
    let aggregator = state.aggregator.clone();
    let response = tokio::spawn(async move { aggregator.search_recipes(&query).await }).await?;

    debug!(
        "search answered {} of {} results",
        response.results.len(),
        response.total
    );
    Ok(Json(response))
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Bind the configured address and serve until Ctrl+C
pub async fn serve(state: Arc<AppState>, config: &SearchConfig) -> std::io::Result<()> {
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
