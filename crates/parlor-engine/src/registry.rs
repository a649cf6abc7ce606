//! Session registry: the only cross-session shared state.
//!
//! Everything else in the engine belongs to exactly one session actor,
//! so this map is the single place where concurrent callers can race —
//! specifically on the *first* join for a still-unregistered id. The
//! mutex is held across the lookup-and-insert, so two simultaneous
//! first-joins always observe the same actor, never two.

use std::collections::HashMap;
use std::marker::PhantomData;

use parlor_protocol::SessionId;
use tokio::sync::Mutex;

use crate::session::spawn_session;
use crate::{SessionConfig, SessionHandle, TurnGame};

/// Creates, tracks, and evicts session actors, keyed by session id.
///
/// Ids come from the external room directory; the registry accepts any
/// id it is handed and lazily creates the session on first lookup-miss.
pub struct SessionRegistry<G: TurnGame> {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    config: SessionConfig,
    _game: PhantomData<fn() -> G>,
}

impl<G: TurnGame> SessionRegistry<G> {
    /// Creates an empty registry; every session it spawns shares
    /// `config`.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            config,
            _game: PhantomData,
        }
    }

    /// Returns the session for `id`, creating it on first lookup-miss.
    ///
    /// Atomic under concurrency: the lock spans lookup and insert.
    pub async fn get_or_create(&self, id: &SessionId) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        if let Some(handle) = sessions.get(id) {
            return handle.clone();
        }
        let handle = spawn_session::<G>(id.clone(), self.config.clone());
        sessions.insert(id.clone(), handle.clone());
        tracing::info!(session_id = %id, "session created");
        handle
    }

    /// Returns the session for `id` if one exists.
    pub async fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Removes a session and shuts its actor down.
    pub async fn remove(&self, id: &SessionId) {
        let handle = self.sessions.lock().await.remove(id);
        if let Some(handle) = handle {
            handle.shutdown().await;
            tracing::info!(session_id = %id, "session evicted");
        }
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Ids of all live sessions.
    pub async fn ids(&self) -> Vec<SessionId> {
        self.sessions.lock().await.keys().cloned().collect()
    }
}
