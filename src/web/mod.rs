//! HTTP surface: a single-page client plus a small JSON API.

pub mod error;
pub mod handlers;
pub mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::engine::engine::Engine;
use crate::engine::speech_client::SpeechService;
use crate::web::session::SessionStore;

pub struct AppState {
    pub engine: Engine,
    pub sessions: SessionStore,
    pub speech: Option<Arc<dyn SpeechService>>,
    pub save_path: PathBuf,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route("/api/state", get(handlers::get_state))
        .route("/api/start", post(handlers::start))
        .route("/api/message", post(handlers::message))
        .route("/api/reset", post(handlers::reset))
        .route("/api/save", post(handlers::save))
        .route("/api/load", post(handlers::load))
        .route("/api/speak", post(handlers::speak))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop idle sessions so cookieless traffic cannot grow the
/// store without bound.
pub fn spawn_session_sweeper(state: Arc<AppState>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = state.sessions.evict_idle();
            if evicted > 0 {
                tracing::debug!(evicted, remaining = state.sessions.len(), "Evicted idle sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::llm_client::{LlmError, MockNarrativeService};
    use crate::engine::speech_client::{MockSpeechService, SpeechAudio};
    use crate::model::player_state::PlayerState;
    use crate::web::handlers::{StateResponse, TurnResponse};
    use crate::web::session::SESSION_COOKIE;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    fn state_with(
        narrator: MockNarrativeService,
        speech: Option<MockSpeechService>,
        save_path: PathBuf,
    ) -> Arc<AppState> {
        Arc::new(AppState {
            engine: Engine::new(Arc::new(narrator), 5, 10),
            sessions: SessionStore::new(10, Duration::from_secs(3600)),
            speech: speech.map(|s| Arc::new(s) as Arc<dyn SpeechService>),
            save_path,
        })
    }

    fn narrator_replying(reply: &'static str) -> MockNarrativeService {
        let mut mock = MockNarrativeService::new();
        mock.expect_narrate()
            .returning(move |_| Ok(reply.to_string()));
        mock
    }

    fn post_json(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        let pair = set_cookie.split(';').next().unwrap().to_string();
        assert!(pair.starts_with(SESSION_COOKIE));
        pair
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn message_returns_stripped_narration_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_with(
            narrator_replying("The trap springs! [STATE_UPDATE: HP=-4, INVENTORY_ADD=Bent Nail]"),
            None,
            dir.path().join("save.json"),
        ));

        let response = app
            .oneshot(post_json("/api/message", None, r#"{"message":"open the door"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        let body: TurnResponse = json_body(response).await;
        assert_eq!(body.response, "The trap springs!");
        assert_eq!(body.player.hp, 6);
        assert_eq!(body.player.inventory, vec!["Bent Nail"]);
    }

    #[tokio::test]
    async fn cookie_keeps_state_between_turns() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_with(
            narrator_replying("Ouch. [STATE_UPDATE: HP=-1]"),
            None,
            dir.path().join("save.json"),
        ));

        let first = app
            .clone()
            .oneshot(post_json("/api/message", None, r#"{"message":"punch wall"}"#))
            .await
            .unwrap();
        let cookie = session_cookie(&first);

        let second = app
            .clone()
            .oneshot(post_json("/api/message", Some(&cookie), r#"{"message":"again"}"#))
            .await
            .unwrap();
        assert!(!second.headers().contains_key(header::SET_COOKIE));
        let body: TurnResponse = json_body(second).await;
        assert_eq!(body.player.hp, 8);

        let state = app
            .oneshot(
                Request::builder()
                    .uri("/api/state")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body: StateResponse = json_body(state).await;
        assert_eq!(body.history.len(), 4);
        assert!(body
            .history
            .messages()
            .iter()
            .all(|m| !m.content.contains("[STATE_UPDATE:")));
    }

    #[tokio::test]
    async fn empty_message_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_with(
            MockNarrativeService::new(),
            None,
            dir.path().join("save.json"),
        ));

        let response = app
            .oneshot(post_json("/api/message", None, r#"{"message":"  "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn narrator_failure_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let mut narrator = MockNarrativeService::new();
        narrator
            .expect_narrate()
            .returning(|_| Err(LlmError::RequestFailed("401 Unauthorized".into())));
        let app = router(state_with(narrator, None, dir.path().join("save.json")));

        let response = app
            .oneshot(post_json("/api/message", None, r#"{"message":"look"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn start_then_reset() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_with(
            MockNarrativeService::new(),
            None,
            dir.path().join("save.json"),
        ));

        let started = app
            .clone()
            .oneshot(post_json("/api/start", None, ""))
            .await
            .unwrap();
        let cookie = session_cookie(&started);
        let body: TurnResponse = json_body(started).await;
        assert!(!body.response.is_empty());
        assert_eq!(body.player, PlayerState::new(10));

        let reset = app
            .clone()
            .oneshot(post_json("/api/reset", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(reset.status(), StatusCode::OK);

        let state = app
            .oneshot(
                Request::builder()
                    .uri("/api/state")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body: StateResponse = json_body(state).await;
        assert!(body.history.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_with(
            narrator_replying("You find a key. [STATE_UPDATE: INVENTORY_ADD=Iron Key]"),
            None,
            dir.path().join("save.json"),
        ));

        let turn = app
            .clone()
            .oneshot(post_json("/api/message", None, r#"{"message":"search"}"#))
            .await
            .unwrap();
        let cookie = session_cookie(&turn);

        let saved = app
            .clone()
            .oneshot(post_json("/api/save", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(saved.status(), StatusCode::OK);

        app.clone()
            .oneshot(post_json("/api/reset", Some(&cookie), ""))
            .await
            .unwrap();

        let loaded = app
            .oneshot(post_json("/api/load", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(loaded.status(), StatusCode::OK);
        let body: StateResponse = json_body(loaded).await;
        assert_eq!(body.player.inventory, vec!["Iron Key"]);
        assert_eq!(body.history.len(), 2);
    }

    #[tokio::test]
    async fn load_without_save_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_with(
            MockNarrativeService::new(),
            None,
            dir.path().join("missing.json"),
        ));

        let response = app
            .oneshot(post_json("/api/load", None, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn speak_without_voice_service_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_with(
            MockNarrativeService::new(),
            None,
            dir.path().join("save.json"),
        ));

        let response = app
            .oneshot(post_json("/api/speak", None, r#"{"text":"Hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn speak_passes_audio_through() {
        let dir = tempfile::tempdir().unwrap();
        let mut speech = MockSpeechService::new();
        speech
            .expect_synthesize()
            .withf(|text| text.to_string() == "The door opens.")
            .returning(|_| {
                Ok(SpeechAudio {
                    content_type: "audio/mpeg".into(),
                    bytes: vec![0xFF, 0xFB, 0x90],
                })
            });
        let app = router(state_with(
            MockNarrativeService::new(),
            Some(speech),
            dir.path().join("save.json"),
        ));

        let response = app
            .oneshot(post_json("/api/speak", None, r#"{"text":"The door opens."}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], &[0xFF, 0xFB, 0x90]);
    }

    #[tokio::test]
    async fn index_serves_html() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_with(
            MockNarrativeService::new(),
            None,
            dir.path().join("save.json"),
        ));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn state_without_cookie_creates_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(
            MockNarrativeService::new(),
            None,
            dir.path().join("save.json"),
        );
        let app = router(state.clone());

        for _ in 0..50 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/api/state").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(!response.headers().contains_key(header::SET_COOKIE));
            let body: StateResponse = json_body(response).await;
            assert_eq!(body.player, PlayerState::new(10));
            assert!(body.history.is_empty());
        }

        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn failed_load_creates_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(
            MockNarrativeService::new(),
            None,
            dir.path().join("missing.json"),
        );

        let response = router(state.clone())
            .oneshot(post_json("/api/load", None, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn corrupt_save_file_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        std::fs::write(&path, "{ not json").unwrap();
        let app = router(state_with(MockNarrativeService::new(), None, path));

        let response = app
            .oneshot(post_json("/api/load", None, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn sweeper_evicts_idle_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState {
            engine: Engine::new(Arc::new(MockNarrativeService::new()), 5, 10),
            sessions: SessionStore::new(10, Duration::ZERO),
            speech: None,
            save_path: dir.path().join("save.json"),
        });
        state.sessions.resolve(&axum::http::HeaderMap::new());
        assert_eq!(state.sessions.len(), 1);

        let sweeper = spawn_session_sweeper(state.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweeper.abort();

        assert!(state.sessions.is_empty());
    }
}
