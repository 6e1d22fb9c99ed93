//! HTTP routes for the note service.
//!
//! Each operation is a `POST` under the configured endpoint taking and
//! returning JSON. Snapshots stream over a WebSocket at `GET <endpoint>/stream`,
//! which the server pings every keepalive period.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use super::error::ApiError;
use super::extract::JsonBody;
use crate::api::NoteApi;
use crate::config::ServerConfig;
use crate::note::{CreateNoteRequest, Note, UpdateNoteRequest};
use crate::service::NoteService;

/// Create a note.
pub const ROUTE_CREATE: &str = "/create";
/// Look up a note by id.
pub const ROUTE_GET: &str = "/get";
/// List every note.
pub const ROUTE_LIST: &str = "/list";
/// Update a note.
pub const ROUTE_UPDATE: &str = "/update";
/// Delete a note.
pub const ROUTE_DELETE: &str = "/delete";
/// Search notes.
pub const ROUTE_SEARCH: &str = "/search";
/// Snapshot WebSocket.
pub const ROUTE_STREAM: &str = "/stream";
/// Liveness check, outside the endpoint prefix.
pub const ROUTE_HEALTH: &str = "/health";

/// Body for operations addressed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdParams {
    /// The note id.
    pub id: String,
}

/// Body for `update`: the id plus the partial fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateParams {
    /// The note id.
    pub id: String,
    /// Fields to change.
    #[serde(flatten)]
    pub request: UpdateNoteRequest,
}

/// Body for `search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Text to look for.
    pub query: String,
}

/// Result of `delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Whether a note was removed.
    pub deleted: bool,
}

#[derive(Debug, Clone)]
struct AppState {
    service: Arc<NoteService>,
    keepalive: Duration,
}

/// Build the application router with the note routes nested under the
/// configured endpoint.
pub fn router(service: Arc<NoteService>, config: &ServerConfig) -> Router {
    let state = AppState {
        service,
        keepalive: config.keepalive(),
    };

    let notes = Router::new()
        .route(ROUTE_CREATE, post(create))
        .route(ROUTE_GET, post(get_by_id))
        .route(ROUTE_LIST, post(list))
        .route(ROUTE_UPDATE, post(update))
        .route(ROUTE_DELETE, post(delete))
        .route(ROUTE_SEARCH, post(search))
        .route(ROUTE_STREAM, get(stream));

    Router::new()
        .route(ROUTE_HEALTH, get(health))
        .nest(&config.endpoint, notes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-service"),
            HeaderValue::from_static("notebook"),
        ))
}

async fn health() -> &'static str {
    "ok"
}

async fn create(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.service.create_note(request).await?))
}

async fn get_by_id(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<IdParams>,
) -> Result<Json<Option<Note>>, ApiError> {
    Ok(Json(state.service.get_note_by_id(&params.id).await?))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.service.get_all_notes().await?))
}

async fn update(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<UpdateParams>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.service.update_note(&params.id, params.request).await?))
}

async fn delete(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<IdParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.service.delete_note(&params.id).await?;
    Ok(Json(DeleteResponse { deleted }))
}

async fn search(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<SearchParams>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.service.search_notes(&params.query).await?))
}

async fn stream(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| forward_snapshots(state, socket))
}

/// Push every snapshot to the socket until either side goes away.
///
/// A ping goes out every keepalive period. A peer that sends nothing back,
/// not even a pong, for two periods is dropped.
async fn forward_snapshots(state: AppState, socket: WebSocket) {
    let mut snapshots = match state.service.subscribe().await {
        Ok(snapshots) => snapshots,
        Err(err) => {
            warn!("Could not subscribe to snapshots: {}", err);
            return;
        }
    };
    let (mut sink, mut incoming) = socket.split();
    let keepalive = state.keepalive;
    debug!("Snapshot subscriber connected");

    let write_task = async move {
        let mut ping = tokio::time::interval(keepalive);
        // The first tick completes immediately.
        ping.tick().await;
        loop {
            let message = tokio::select! {
                next = snapshots.next() => {
                    let Some(notes) = next else { break };
                    match serde_json::to_string(&notes) {
                        Ok(payload) => Message::Text(payload),
                        Err(err) => {
                            warn!("Failed to encode snapshot: {}", err);
                            break;
                        }
                    }
                }
                _ = ping.tick() => Message::Ping(Vec::new()),
            };
            if sink.send(message).await.is_err() {
                break;
            }
        }
    };

    let read_task = async move {
        loop {
            match tokio::time::timeout(keepalive * 2, incoming.next()).await {
                Ok(Some(Ok(Message::Close(_)) | Err(_)) | None) => break,
                Ok(Some(Ok(_))) => {}
                Err(_) => {
                    debug!("Snapshot subscriber timed out");
                    break;
                }
            }
        }
    };

    tokio::select! {
        () = write_task => {},
        () = read_task => {},
    }
    debug!("Snapshot subscriber disconnected");
}
