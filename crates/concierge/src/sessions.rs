use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use safari_core::ResponseTable;
use uuid::Uuid;

use crate::chat::ChatSession;

struct SessionEntry {
    session: Arc<ChatSession>,
    expires_at: DateTime<Utc>,
}

/// In-memory chat sessions keyed by id. Nothing outlives the process.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    table: Arc<ResponseTable>,
    reply_delay: Duration,
    ttl: chrono::Duration,
}

impl SessionRegistry {
    pub fn new(table: Arc<ResponseTable>, reply_delay: Duration, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            table,
            reply_delay,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(1)),
        }
    }

    /// Returns the session for `id`, starting a fresh one when `id` is absent
    /// or unknown. Either way the session's expiry is pushed out by the TTL.
    ///
    /// Fresh sessions always get a server-minted id; an unknown id sent by a
    /// client is never adopted.
    pub fn resume_or_start(&self, id: Option<Uuid>) -> (Uuid, Arc<ChatSession>) {
        let expires_at = Utc::now() + self.ttl;
        let mut sessions = self.sessions.write();

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.expires_at = expires_at;
                return (id, entry.session.clone());
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(ChatSession::new(self.table.clone(), self.reply_delay));
        sessions.insert(
            id,
            SessionEntry {
                session: session.clone(),
                expires_at,
            },
        );
        (id, session)
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<ChatSession>> {
        self.sessions
            .read()
            .get(id)
            .map(|entry| entry.session.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Closes and removes one session. Returns the number of replies it
    /// cancelled, or `None` if the id was unknown.
    pub fn close(&self, id: &Uuid) -> Option<usize> {
        let entry = self.sessions.write().remove(id)?;
        Some(entry.session.close())
    }

    /// Drops sessions idle past their TTL, returning `(removed, cancelled)`.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> (u64, usize) {
        let mut expired = Vec::new();
        self.sessions.write().retain(|_, entry| {
            let keep = entry.expires_at > now;
            if !keep {
                expired.push(entry.session.clone());
            }
            keep
        });

        let cancelled = expired.iter().map(|session| session.close()).sum();
        (expired.len() as u64, cancelled)
    }
}
