use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lostfound_core::{NotificationRecord, NotificationRequest, FUNCTION_PATH};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{SharedStore, StoreError};

/// Runtime configuration for the notification function server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// When set, every non-preflight request must present it as a bearer token
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 54321,
            api_key: None,
        }
    }
}

impl ServerConfig {
    /// Build runtime configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);
        let api_key = std::env::var("LOSTFOUND_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        Self { port, api_key }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: SharedStore, api_key: Option<String>) -> Self {
        Self {
            store,
            api_key: api_key.map(Arc::from),
        }
    }
}

/// Build the in-process router for the notification function.
pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .route(FUNCTION_PATH, post(send_notification))
        .route("/v1/users/{user_id}/notifications", get(list_notifications))
        .route(
            "/v1/users/{user_id}/notifications/read-all",
            post(mark_all_read),
        )
        .route(
            "/v1/users/{user_id}/notifications/{id}/read",
            post(mark_read),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on `addr` in a background task and return the bound address.
pub async fn spawn_server(
    addr: SocketAddr,
    state: AppState,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let app = build_app(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Notification function stopped: {}", e);
        }
    });

    Ok((local_addr, handle))
}

/// Run the server with explicit configuration until a shutdown signal arrives.
pub async fn run_with_config(config: ServerConfig, store: SharedStore) -> anyhow::Result<()> {
    if config.api_key.is_none() {
        warn!("No API key configured; the notification function accepts anonymous calls");
    }

    let app = build_app(AppState::new(store, config.api_key));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Notification function listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Notification function shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM where the platform has it.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = wait_for_ctrl_c() => {}
                    _ = sigterm.recv() => info!("SIGTERM received"),
                }
            }
            Err(err) => {
                warn!("SIGTERM unavailable ({}); stopping on Ctrl+C only", err);
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;

    info!("Draining in-flight requests");
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received"),
        Err(err) => {
            // Without a handler we can only run until killed
            error!("Cannot listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(_) => api_error(StatusCode::NOT_FOUND, err.to_string()),
        StoreError::Unavailable(_) => {
            error!("Notification store failure: {}", err);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(expected) = &state.api_key {
        let presented = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        if presented != Some(&**expected) {
            return api_error(StatusCode::UNAUTHORIZED, "Missing or invalid API key")
                .into_response();
        }
    }

    next.run(request).await
}

async fn health() -> &'static str {
    "OK"
}

async fn send_notification(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<NotificationRecord>, ApiError> {
    let request: NotificationRequest = serde_json::from_slice(&body)
        .map_err(|e| bad_request(format!("Invalid JSON body: {}", e)))?;

    let event = request.into_event().map_err(|e| bad_request(e.to_string()))?;

    let record = state.store.insert(event).await.map_err(store_error)?;
    info!(
        "Stored {} notification {} for {}",
        record.kind, record.id, record.user_id
    );

    Ok(Json(record))
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(default)]
    unread: bool,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    notifications: Vec<NotificationRecord>,
    unread_count: usize,
}

async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let notifications = state
        .store
        .list(&user_id, params.unread)
        .await
        .map_err(store_error)?;
    let unread_count = state
        .store
        .unread_count(&user_id)
        .await
        .map_err(store_error)?;

    Ok(Json(ListResponse {
        notifications,
        unread_count,
    }))
}

async fn mark_read(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<NotificationRecord>, ApiError> {
    let id: Uuid = id
        .parse()
        .map_err(|_| bad_request(format!("Invalid notification id: {}", id)))?;

    let record = state
        .store
        .mark_read(&user_id, id)
        .await
        .map_err(store_error)?;
    Ok(Json(record))
}

#[derive(Debug, Serialize)]
struct MarkAllResponse {
    updated: usize,
}

async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MarkAllResponse>, ApiError> {
    let updated = state
        .store
        .mark_all_read(&user_id)
        .await
        .map_err(store_error)?;
    Ok(Json(MarkAllResponse { updated }))
}
