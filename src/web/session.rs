//! In-memory, cookie-keyed game sessions.
//!
//! Each session sits behind its own async mutex. Handlers hold the lock for
//! a whole turn, so two requests on one session are applied one after the
//! other and never lose an update.
//!
//! Sessions idle for longer than the configured TTL are dropped by
//! `evict_idle`, which the server runs on an interval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::engine::engine::GameSession;

pub const SESSION_COOKIE: &str = "dm_session";

pub type SharedSession = Arc<Mutex<GameSession>>;

pub struct SessionStore {
    sessions: DashMap<Uuid, SessionEntry>,
    starting_hp: i32,
    idle_ttl: Duration,
}

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// A session looked up for one request. `is_new` means the client has not
/// seen the id yet and needs a cookie.
pub struct SessionHandle {
    pub id: Uuid,
    pub session: SharedSession,
    pub is_new: bool,
}

impl SessionHandle {
    pub fn cookie_header(&self) -> Option<(axum::http::HeaderName, HeaderValue)> {
        if !self.is_new {
            return None;
        }
        let value = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.id
        );
        HeaderValue::from_str(&value).ok().map(|v| (SET_COOKIE, v))
    }
}

impl SessionStore {
    pub fn new(starting_hp: i32, idle_ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            starting_hp,
            idle_ttl,
        }
    }

    /// Look up the session named by the request cookie without creating one.
    pub fn find(&self, headers: &HeaderMap) -> Option<SharedSession> {
        let id = session_id_from_headers(headers)?;
        let mut entry = self.sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Find the session named by the request cookie, creating one if the
    /// cookie is missing or unknown.
    pub fn resolve(&self, headers: &HeaderMap) -> SessionHandle {
        if let Some(id) = session_id_from_headers(headers) {
            if let Some(mut existing) = self.sessions.get_mut(&id) {
                existing.last_seen = Instant::now();
                return SessionHandle {
                    id,
                    session: existing.session.clone(),
                    is_new: false,
                };
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(GameSession::new(self.starting_hp)));
        self.sessions.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!(session_id = %id, "Created session");

        SessionHandle {
            id,
            session,
            is_new: true,
        }
    }

    /// Drop sessions not seen within the idle TTL. Sessions a request is
    /// still holding are kept. Returns how many were removed.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| {
            Arc::strong_count(&entry.session) > 1
                || now.saturating_duration_since(entry.last_seen) < self.idle_ttl
        });
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
