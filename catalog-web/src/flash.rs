//! Flash messages
//!
//! One-shot user messages that survive a redirect. Each browser gets an
//! opaque id in the `catalog_flash` cookie; pending messages live in memory
//! under that id and are removed when the next page renders them, or when
//! they expire.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderValue};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const FLASH_COOKIE: &str = "catalog_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Error,
    Success,
    Info,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Error => "error",
            FlashCategory::Success => "success",
            FlashCategory::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn new(category: FlashCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// How long undelivered flashes are kept
pub const DEFAULT_FLASH_TTL: Duration = Duration::from_secs(10 * 60);

/// Most browser sessions holding undelivered flashes at once
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

struct Pending {
    flashes: Vec<Flash>,
    updated: Instant,
    /// Push order, oldest evicted first when the store is full
    seq: u64,
}

#[derive(Default)]
struct Sessions {
    pending: HashMap<Uuid, Pending>,
    next_seq: u64,
}

/// Pending flashes keyed by browser session id.
///
/// Bounded: entries expire after `ttl`, and at most `max_sessions` sessions
/// are held. Clients that never return the cookie leave entries that are
/// never taken, so both limits apply on every push.
#[derive(Clone)]
pub struct FlashStore {
    sessions: Arc<RwLock<Sessions>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for FlashStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_FLASH_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl FlashStore {
    pub fn with_limits(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(Sessions::default())),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn push(&self, session: Uuid, flash: Flash) {
        let mut sessions = self.sessions.write().await;
        let ttl = self.ttl;
        sessions
            .pending
            .retain(|_, pending| pending.updated.elapsed() < ttl);

        if !sessions.pending.contains_key(&session) {
            while sessions.pending.len() >= self.max_sessions {
                let oldest = sessions
                    .pending
                    .iter()
                    .min_by_key(|(_, pending)| pending.seq)
                    .map(|(id, _)| *id);
                match oldest {
                    Some(id) => {
                        debug!("Evicting undelivered flashes for session {}", id);
                        sessions.pending.remove(&id);
                    }
                    None => break,
                }
            }
        }

        let seq = sessions.next_seq;
        sessions.next_seq += 1;
        let entry = sessions.pending.entry(session).or_insert_with(|| Pending {
            flashes: Vec::new(),
            updated: Instant::now(),
            seq,
        });
        entry.flashes.push(flash);
        entry.updated = Instant::now();
        entry.seq = seq;
    }

    /// Remove and return every pending flash for `session`
    pub async fn take(&self, session: Uuid) -> Vec<Flash> {
        match self.sessions.write().await.pending.remove(&session) {
            Some(pending) if pending.updated.elapsed() < self.ttl => pending.flashes,
            _ => Vec::new(),
        }
    }

    /// Number of sessions with undelivered flashes
    pub async fn pending_sessions(&self) -> usize {
        self.sessions.read().await.pending.len()
    }
}

/// Browser session carried by the flash cookie
#[derive(Debug, Clone, Copy)]
pub struct FlashSession {
    pub id: Uuid,
    /// True when the request had no valid cookie and one must be set
    pub is_new: bool,
}

impl FlashSession {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match session_id(headers) {
            Some(id) => Self { id, is_new: false },
            None => Self {
                id: Uuid::new_v4(),
                is_new: true,
            },
        }
    }

    /// `Set-Cookie` header to attach when the session is new
    pub fn set_cookie(&self) -> Option<(header::HeaderName, HeaderValue)> {
        if !self.is_new {
            return None;
        }
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", FLASH_COOKIE, self.id);
        HeaderValue::from_str(&cookie)
            .ok()
            .map(|value| (header::SET_COOKIE, value))
    }
}

/// Extract the session id from the request's `Cookie` headers
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
