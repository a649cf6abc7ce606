//! Error types for action dispatch.

use parlor_protocol::SessionId;

/// Why a dispatched action was rejected.
///
/// Every rejection leaves the session untouched — callers can rely on
/// an `Err` meaning "nothing happened".
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// No session exists for the given id.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The session hasn't started yet (still waiting for players).
    #[error("session {0} has not started")]
    SessionNotActive(SessionId),

    /// The session already has a result.
    #[error("session {0} is already finished")]
    SessionFinished(SessionId),

    /// A move from someone other than the turn owner.
    #[error("not your turn")]
    NotYourTurn,

    /// A player-only action (resign, draw offer/accept) from a
    /// spectator or unknown actor.
    #[error("only seated players may do that")]
    NotAPlayer,

    /// The rules engine rejected the move — unparseable notation or an
    /// illegal move in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// `accept_draw` without a pending offer from the other player.
    #[error("no draw offer to accept")]
    NoDrawOffer,

    /// The action type wasn't recognized.
    #[error("unrecognized action type")]
    UnknownAction,

    /// The session's command channel is closed or full — the actor is
    /// shutting down.
    #[error("session {0} is unavailable")]
    SessionUnavailable(SessionId),
}

impl ActionError {
    /// A stable machine-readable tag for the wire `Error` event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "session_not_found",
            Self::SessionNotActive(_) => "session_not_active",
            Self::SessionFinished(_) => "session_finished",
            Self::NotYourTurn => "not_your_turn",
            Self::NotAPlayer => "not_a_player",
            Self::IllegalMove(_) => "illegal_move",
            Self::NoDrawOffer => "no_draw_offer",
            Self::UnknownAction => "unknown_action",
            Self::SessionUnavailable(_) => "session_unavailable",
        }
    }
}
