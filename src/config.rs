//! Environment-driven configuration.
//!
//! `.env` is loaded first (if present); real environment variables win.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::llm_client::LlmSettings;
use crate::engine::save_io::default_save_path;
use crate::engine::speech_client::SpeechSettings;
use crate::model::player_state::DEFAULT_STARTING_HP;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_SPEECH_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_SPEECH_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_SPEECH_MODEL_ID: &str = "eleven_multilingual_v2";
pub const DEFAULT_HISTORY_WINDOW: usize = 5;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub llm: LlmSettings,
    /// `None` disables the speech endpoint.
    pub speech: Option<SpeechSettings>,
    pub history_window: usize,
    pub starting_hp: i32,
    pub save_path: PathBuf,
    /// Sessions unseen for this long are dropped.
    pub session_idle_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or("SERVER_PORT", get("SERVER_PORT").or_else(|| get("PORT")), 3000)?;
        let bind_addr = SocketAddr::from_str(&format!("{}:{}", host, port)).map_err(|_| {
            ConfigError::Invalid {
                name: "SERVER_HOST",
                value: host.clone(),
            }
        })?;

        let timeout_secs: u64 = parse_or("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), 120)?;
        let llm = LlmSettings {
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.into()),
            api_key: get("LLM_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
            temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), 0.8)?,
            timeout: Duration::from_secs(timeout_secs),
        };

        let speech = get("SPEECH_API_KEY")
            .or_else(|| get("ELEVENLABS_API_KEY"))
            .map(|api_key| SpeechSettings {
                base_url: get("SPEECH_BASE_URL").unwrap_or_else(|| DEFAULT_SPEECH_BASE_URL.into()),
                api_key,
                voice_id: get("SPEECH_VOICE_ID").unwrap_or_else(|| DEFAULT_SPEECH_VOICE_ID.into()),
                model_id: get("SPEECH_MODEL_ID").unwrap_or_else(|| DEFAULT_SPEECH_MODEL_ID.into()),
                timeout: Duration::from_secs(timeout_secs),
            });

        let history_window: usize =
            parse_or("HISTORY_WINDOW", get("HISTORY_WINDOW"), DEFAULT_HISTORY_WINDOW)?;
        if history_window == 0 {
            return Err(ConfigError::Invalid {
                name: "HISTORY_WINDOW",
                value: "0".into(),
            });
        }

        let idle_secs: u64 = parse_or(
            "SESSION_IDLE_SECS",
            get("SESSION_IDLE_SECS"),
            DEFAULT_SESSION_IDLE_SECS,
        )?;
        if idle_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_IDLE_SECS",
                value: "0".into(),
            });
        }

        Ok(Self {
            bind_addr,
            llm,
            speech,
            history_window,
            starting_hp: parse_or("STARTING_HP", get("STARTING_HP"), DEFAULT_STARTING_HP)?,
            save_path: get("SAVE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_save_path),
            session_idle_ttl: Duration::from_secs(idle_secs),
        })
    }
}

fn parse_or<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Load `.env` from the working directory, ignoring a missing file.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to load .env"),
    }
}
