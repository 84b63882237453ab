//! HTTP server mode for REST access to the transaction grid

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::driver::PageDriver;
use crate::error::{Error, Result};
use crate::pagination::PaginationModel;
use crate::types::FetchStatus;
use crate::view::GridView;

/// App state shared across handlers
#[derive(Debug)]
pub struct AppState {
    driver: PageDriver,
    settle_timeout: Duration,
    /// Held from moving the driver until its page is read back
    turn: Mutex<()>,
}

impl AppState {
    /// Serve pages from a running driver
    pub fn new(driver: PageDriver, settle_timeout: Duration) -> Self {
        Self {
            driver,
            settle_timeout,
            turn: Mutex::new(()),
        }
    }
}

/// Query string for the transactions endpoint
#[derive(Debug, Deserialize)]
struct TransactionsQuery {
    /// Zero-based page; keeps the current page when absent
    page: Option<u32>,
    /// Rows per page; keeps the current size when absent
    page_size: Option<u32>,
}

/// Body of a transactions response
#[derive(Debug, Serialize)]
struct TransactionsPage {
    /// Page asked for; `page` and `page_size` describe the rows returned
    requested: PaginationModel,
    #[serde(flatten)]
    view: GridView,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    // Allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/transactions", get(transactions))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve(state: Arc<AppState>, port: u16) -> Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::server(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::server(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Move the shared grid to the requested page and return it once settled
///
/// Requests take turns, since they all steer the one driver.
async fn transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransactionsQuery>,
) -> impl IntoResponse {
    let _turn = state.turn.lock().await;
    let current = state.driver.model();
    let model = PaginationModel {
        page: query.page.unwrap_or(current.page),
        page_size: query.page_size.unwrap_or(current.page_size),
    };

    if let Err(e) = state.driver.set_model(model) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(e.to_string())),
        )
            .into_response();
    }

    let snapshot = state.driver.wait_settled(model, state.settle_timeout).await;

    // Rows belong to the request that produced them, which is not the
    // requested page when the guard refused to fetch it
    let shown = match (snapshot.status, snapshot.last_request) {
        (FetchStatus::Finished, Some(request)) => request.model(),
        _ => model,
    };
    if shown != model {
        debug!(requested = ?model, ?shown, "Serving a different page than requested");
    }

    let page = TransactionsPage {
        requested: model,
        view: GridView::new(&shown, &snapshot),
    };
    (StatusCode::OK, Json(ApiResponse::success(page))).into_response()
}
