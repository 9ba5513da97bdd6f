// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voice conversation sessions.
//!
//! A session is one JSON document in the key-value store holding the most
//! recent turns of a conversation. Every access rewrites the document,
//! which slides its TTL forward; a session left idle for the TTL is gone.
//! Updates are whole-document read-modify-write and can lose turns when
//! two requests for the same session interleave.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vocalis_config::model::SessionConfig;
use vocalis_core::{ChatMessage, Clock, KvStore, KvStoreExt, PutOptions, Role, VocalisError};

/// Longest accepted session id.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Stored conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSession {
    pub session_id: String,
    /// Oldest first, never longer than the configured history cap.
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

impl VoiceSession {
    fn new(session_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.to_string(),
            messages: Vec::new(),
            created_at: now,
            last_accessed_at: now,
        }
    }
}

/// Reject ids that are empty, longer than 128 characters, or contain
/// anything other than ASCII letters, digits, `_` and `-`.
pub fn validate_session_id(id: &str) -> Result<(), VocalisError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        debug!(len = id.len(), "rejected session id");
        Err(VocalisError::Validation(format!(
            "session id must be 1-{MAX_SESSION_ID_LEN} characters of [A-Za-z0-9_-]"
        )))
    }
}

/// Store key for a session.
pub fn session_key(id: &str) -> String {
    format!("session:{id}")
}

/// Session persistence over a [`KvStore`].
pub struct SessionStore {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    ttl_secs: u64,
    max_history: usize,
}

impl SessionStore {
    pub fn new(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        ttl_secs: u64,
        max_history: usize,
    ) -> Self {
        Self {
            store,
            clock,
            ttl_secs,
            max_history,
        }
    }

    pub fn from_config(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        config: &SessionConfig,
    ) -> Self {
        Self::new(store, clock, config.ttl_secs, config.max_history)
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Load a session and refresh its access time and TTL.
    pub async fn get_session(&self, id: &str) -> Result<Option<VoiceSession>, VocalisError> {
        validate_session_id(id)?;
        let Some(mut session) = self.load(id).await? else {
            return Ok(None);
        };
        session.last_accessed_at = self.clock.now();
        self.save(&session).await?;
        Ok(Some(session))
    }

    /// Start an empty session, replacing any existing one with the same id.
    pub async fn create_session(&self, id: &str) -> Result<VoiceSession, VocalisError> {
        validate_session_id(id)?;
        let session = VoiceSession::new(id, self.clock.now());
        self.save(&session).await?;
        debug!(session_id = id, "session created");
        Ok(session)
    }

    /// Append one turn, creating the session if needed, and keep only the
    /// most recent turns.
    pub async fn add_message(
        &self,
        id: &str,
        role: Role,
        content: &str,
    ) -> Result<VoiceSession, VocalisError> {
        validate_session_id(id)?;
        let now = self.clock.now();
        let mut session = self
            .load(id)
            .await?
            .unwrap_or_else(|| VoiceSession::new(id, now));

        session.messages.push(ChatMessage::new(role, content));
        if session.messages.len() > self.max_history {
            let excess = session.messages.len() - self.max_history;
            session.messages.drain(..excess);
        }
        session.last_accessed_at = now;
        self.save(&session).await?;
        Ok(session)
    }

    pub async fn delete_session(&self, id: &str) -> Result<(), VocalisError> {
        validate_session_id(id)?;
        self.store.delete(&session_key(id)).await?;
        debug!(session_id = id, "session deleted");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<VoiceSession>, VocalisError> {
        self.store.get_json(&session_key(id)).await
    }

    async fn save(&self, session: &VoiceSession) -> Result<(), VocalisError> {
        self.store
            .put_json(
                &session_key(&session.session_id),
                session,
                PutOptions::ttl(self.ttl_secs),
            )
            .await
    }
}
