//! Action router: resolves a session and dispatches client actions
//! onto it.
//!
//! The router is the engine's front door for the gateway layer. All
//! per-session validation happens inside the session actor; the router
//! only decides *which* session — creating one on join, requiring an
//! existing one for actions — and drives eviction when a departure
//! leaves a session abandoned.

use std::sync::Arc;

use parlor_protocol::{
    ActionKind, ActorId, AiDifficulty, Seat, SessionId, Snapshot,
};

use crate::{ActionError, EventSender, SessionRegistry, TurnGame};

/// Validates and routes client-originated events to session actors.
pub struct ActionRouter<G: TurnGame> {
    registry: Arc<SessionRegistry<G>>,
}

impl<G: TurnGame> Clone for ActionRouter<G> {
    fn clone(&self) -> Self {
        Self { registry: Arc::clone(&self.registry) }
    }
}

impl<G: TurnGame> ActionRouter<G> {
    /// Creates a router over the given registry.
    pub fn new(registry: Arc<SessionRegistry<G>>) -> Self {
        Self { registry }
    }

    /// The registry this router serves.
    pub fn registry(&self) -> &Arc<SessionRegistry<G>> {
        &self.registry
    }

    /// Joins `actor` to the session, creating the session if this is
    /// the first join for its id.
    pub async fn join(
        &self,
        session_id: &SessionId,
        actor: ActorId,
        display_name: String,
        ai_opponent: bool,
        ai_difficulty: AiDifficulty,
        sender: EventSender,
    ) -> Result<(Seat, Snapshot), ActionError> {
        let handle = self.registry.get_or_create(session_id).await;
        handle
            .join(actor, display_name, ai_opponent, ai_difficulty, sender)
            .await
    }

    /// Dispatches an in-game action. Unlike join, this never creates a
    /// session — acting on an unknown id is an error.
    pub async fn dispatch(
        &self,
        session_id: &SessionId,
        actor: ActorId,
        action: ActionKind,
        payload: Option<String>,
    ) -> Result<Snapshot, ActionError> {
        let handle = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| ActionError::SessionNotFound(session_id.clone()))?;
        handle.act(actor, action, payload).await
    }

    /// Records a disconnect and evicts the session once no connected
    /// player and no spectator remains. Eviction is deferred cleanup —
    /// a lone disconnect leaves the session in place for a rejoin.
    pub async fn leave(&self, session_id: &SessionId, actor: ActorId) {
        let Some(handle) = self.registry.get(session_id).await else {
            return;
        };
        if handle.leave(actor).await {
            self.registry.remove(session_id).await;
        }
    }
}
