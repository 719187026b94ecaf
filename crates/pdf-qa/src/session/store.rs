//! Concurrent map of live sessions

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::{Error, Result};

use super::state::Session;

/// Shared handle to one session; the mutex serializes requests within it
pub type SessionHandle = Arc<Mutex<Session>>;

/// All live sessions, keyed by id
///
/// Sessions share nothing; the map is the only cross-session structure.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session and return its id
    pub fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id();
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        tracing::debug!("Created session {}", id);
        id
    }

    pub fn get(&self, id: &Uuid) -> Result<SessionHandle> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::SessionNotFound(*id))
    }

    /// Wait for exclusive access to a session that is still live
    ///
    /// The session may be removed or evicted while the caller waits, in which
    /// case the lock is released and `SessionNotFound` is returned.
    pub async fn lock(&self, id: &Uuid) -> Result<OwnedMutexGuard<Session>> {
        let handle = self.get(id)?;
        let guard = Arc::clone(&handle).lock_owned().await;
        let live = self
            .sessions
            .get(id)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), &handle));
        if live {
            Ok(guard)
        } else {
            Err(Error::SessionNotFound(*id))
        }
    }

    pub fn remove(&self, id: &Uuid) -> Result<SessionHandle> {
        self.sessions
            .remove(id)
            .map(|(_, handle)| handle)
            .ok_or(Error::SessionNotFound(*id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove sessions idle for longer than `max_idle`; returns how many were removed
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        self.evict_idle_at(Utc::now(), max_idle)
    }

    fn evict_idle_at(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|id, handle| {
            // A locked session is serving a request, so it is not idle
            match handle.try_lock() {
                Ok(mut session) if session.idle_for(now) > max_idle => {
                    session.end();
                    tracing::debug!("Evicting idle session {}", id);
                    false
                }
                _ => true,
            }
        });
        before - self.sessions.len()
    }
}
