use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::engine::save_io::{load_game, save_game};
use crate::model::message::ConversationHistory;
use crate::model::player_state::PlayerState;
use crate::web::error::ApiError;
use crate::web::session::SessionHandle;
use crate::web::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

#[derive(Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    pub response: String,
    pub player: PlayerState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub player: PlayerState,
    pub history: ConversationHistory,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// Attach the session cookie when the session was created by this request.
fn with_session(handle: &SessionHandle, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    if let Some((name, value)) = handle.cookie_header() {
        response.headers_mut().insert(name, value);
    }
    response
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> &'static str {
    "OK"
}

/// Read-only: a client without a session sees a fresh game and gets no cookie.
pub async fn get_state(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(shared) = state.sessions.find(&headers) else {
        let fresh = state.engine.new_session();
        return Json(StateResponse {
            player: fresh.player,
            history: fresh.history,
        })
        .into_response();
    };

    let session = shared.lock().await;
    Json(StateResponse {
        player: session.player.clone(),
        history: session.history.clone(),
    })
    .into_response()
}

pub async fn start(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = state.sessions.resolve(&headers);
    let mut session = handle.session.lock().await;
    let opening = state.engine.start(&mut session, &mut rand::thread_rng());
    let body = Json(TurnResponse {
        response: opening,
        player: session.player.clone(),
    });
    with_session(&handle, body)
}

pub async fn message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<MessageRequest>,
) -> Result<Response, ApiError> {
    let handle = state.sessions.resolve(&headers);
    let mut session = handle.session.lock().await;

    let outcome = state.engine.take_turn(&mut session, &req.message).await?;

    let body = Json(TurnResponse {
        response: outcome.narration,
        player: outcome.player,
    });
    Ok(with_session(&handle, body))
}

pub async fn reset(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = state.sessions.resolve(&headers);
    let mut session = handle.session.lock().await;
    state.engine.reset(&mut session);
    with_session(&handle, Json(StatusResponse::new("reset")))
}

pub async fn save(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let handle = state.sessions.resolve(&headers);
    let snapshot = handle.session.lock().await.to_save();

    let path = state.save_path.clone();
    tokio::task::spawn_blocking(move || save_game(&path, &snapshot))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(format!("{:#}", e)))?;

    tracing::info!(session_id = %handle.id, path = %state.save_path.display(), "Game saved");
    Ok(with_session(&handle, Json(StatusResponse::new("saved"))))
}

pub async fn load(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let path = state.save_path.clone();
    let loaded = tokio::task::spawn_blocking(move || load_game(&path))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(load_error)?;

    let handle = state.sessions.resolve(&headers);
    let mut session = handle.session.lock().await;
    state.engine.restore(&mut session, loaded)?;
    tracing::info!(session_id = %handle.id, "Game loaded");

    let body = Json(StateResponse {
        player: session.player.clone(),
        history: session.history.clone(),
    });
    Ok(with_session(&handle, body))
}

/// A missing save file is the only load failure the client can do anything about.
fn load_error(e: anyhow::Error) -> ApiError {
    match e.downcast_ref::<std::io::Error>() {
        Some(io) if io.kind() == std::io::ErrorKind::NotFound => ApiError::NotFound,
        _ => ApiError::Internal(format!("{:#}", e)),
    }
}

pub async fn speak(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeakRequest>,
) -> Result<Response, ApiError> {
    let Some(speech) = &state.speech else {
        return Err(ApiError::NotFound);
    };

    let audio = speech.synthesize(&req.text).await?;
    let content_type = HeaderValue::from_str(&audio.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("audio/mpeg"));

    Ok(([(CONTENT_TYPE, content_type)], audio.bytes).into_response())
}
