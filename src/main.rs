use std::sync::Arc;
use std::time::Duration;

use dungeon_narrator::config::{load_dotenv, AppConfig};
use dungeon_narrator::engine::engine::Engine;
use dungeon_narrator::engine::llm_client::ChatCompletionsClient;
use dungeon_narrator::engine::speech_client::{ElevenLabsClient, SpeechService};
use dungeon_narrator::web::session::SessionStore;
use dungeon_narrator::web::{router, spawn_session_sweeper, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    dungeon_narrator::init_tracing();

    let config = AppConfig::from_env()?;
    if config.llm.api_key.is_none() {
        tracing::warn!("No LLM API key configured; requests are sent unauthenticated");
    }
    tracing::info!(
        model = %config.llm.model,
        base_url = %config.llm.base_url,
        speech = config.speech.is_some(),
        save_path = %config.save_path.display(),
        "Starting dungeon narrator"
    );

    let narrator = Arc::new(ChatCompletionsClient::new(&config.llm));
    let speech = config
        .speech
        .as_ref()
        .map(|s| Arc::new(ElevenLabsClient::new(s)) as Arc<dyn SpeechService>);

    let state = Arc::new(AppState {
        engine: Engine::new(narrator, config.history_window, config.starting_hp),
        sessions: SessionStore::new(config.starting_hp, config.session_idle_ttl),
        speech,
        save_path: config.save_path.clone(),
    });

    let sweep_every = (config.session_idle_ttl / 4).max(Duration::from_secs(1));
    spawn_session_sweeper(state.clone(), sweep_every);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}
