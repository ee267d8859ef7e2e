//! The session slot: one token plus an optional identity label.
//!
//! The token is persisted to a single file so a later invocation can pick
//! the session back up. The label only exists while the process that
//! logged in is alive; a rehydrated session has a token but no label.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// File name of the session slot inside the config directory.
pub const SESSION_FILE: &str = "session.v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    /// Label for who this token belongs to, normally the login email.
    pub identity: Option<String>,
}

/// On-disk form of the slot: JSON wrapped in base64 so the file stays a
/// single opaque line.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    #[serde(with = "time::serde::rfc3339")]
    saved_at: OffsetDateTime,
}

/// Shared handle to the current session. Cheap to clone; all clones see
/// the same state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    session: Mutex<Option<Session>>,
}

impl SessionStore {
    /// Opens the store, rehydrating a previously persisted token. A slot
    /// that cannot be decoded is removed and treated as no session; it
    /// never surfaces as an error.
    pub fn open(path: PathBuf) -> Self {
        let session = Self::rehydrate(&path);
        Self {
            inner: Arc::new(Inner {
                path,
                session: Mutex::new(session),
            }),
        }
    }

    fn rehydrate(path: &Path) -> Option<Session> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "could not read session slot");
                return None;
            }
        };
        match decode_slot(raw.trim()) {
            Ok(stored) => Some(Session {
                token: stored.token,
                identity: None,
            }),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "discarding corrupt session slot");
                let _ = fs::remove_file(path);
                None
            }
        }
    }

    /// Stores the token and label, persisting the token to the slot. A
    /// slot that cannot be written leaves the in-memory session intact.
    pub fn set(&self, token: impl Into<String>, identity: Option<String>) {
        let token = token.into();
        let stored = StoredSession {
            token: token.clone(),
            saved_at: OffsetDateTime::now_utc(),
        };
        match serde_json::to_vec(&stored) {
            Ok(bytes) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                if let Err(err) = fs::write(&self.inner.path, encoded) {
                    tracing::warn!(path = %self.inner.path.display(), %err, "could not persist session slot");
                }
            }
            Err(err) => {
                tracing::warn!(%err, "could not encode session slot");
            }
        }
        *self.inner.session.lock() = Some(Session { token, identity });
    }

    /// Forgets the session and removes the persisted slot.
    pub fn clear(&self) {
        *self.inner.session.lock() = None;
        if let Err(err) = fs::remove_file(&self.inner.path) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.inner.path.display(), %err, "could not remove session slot");
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner.session.lock().as_ref().map(|s| s.token.clone())
    }

    pub fn identity(&self) -> Option<String> {
        self.inner.session.lock().as_ref().and_then(|s| s.identity.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.session.lock().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.session.lock().is_some()
    }
}

fn decode_slot(raw: &str) -> Result<StoredSession, SlotError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(raw)?;
    let stored = serde_json::from_slice(&bytes)?;
    Ok(stored)
}

#[derive(Debug, thiserror::Error)]
enum SlotError {
    #[error("invalid encoding: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}
