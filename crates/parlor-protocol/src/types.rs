//! Core wire types for the parlor event contract.
//!
//! Everything in this module is shaped for the browser: internally
//! tagged enums (a `"type"` field JavaScript can switch on), lowercase
//! string enums, and id newtypes that serialize as plain strings.
//!
//! The event contract itself is transport-agnostic — these types don't
//! know whether they travel over WebSocket frames or anything else.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A connected identity: player or spectator.
///
/// Actor ids are assigned by the gateway, one per connection, the way the
/// original stack used socket ids. `#[serde(transparent)]` makes the id
/// serialize as a bare string rather than a one-field object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl ActorId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ActorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one game session (one room).
///
/// Session ids are minted and authorized by the external room directory;
/// the server treats them as opaque strings and accepts whatever id a
/// client presents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Sides and seats
// ---------------------------------------------------------------------------

/// One of the two playing sides of a board game.
///
/// Sides are assigned in canonical order — white first, then black —
/// and serialize as lowercase strings ("white" / "black") to match what
/// the web client renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Both sides, in seat-assignment order.
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    /// The opposing side.
    pub fn other(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Stable index (white = 0, black = 1), used for per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// What a joiner was assigned: a playing side, or the spectator bench
/// once both sides are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    White,
    Black,
    Spectator,
}

impl Seat {
    /// The playing side this seat corresponds to, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Seat::White => Some(Side::White),
            Seat::Black => Some(Side::Black),
            Seat::Spectator => None,
        }
    }
}

impl From<Side> for Seat {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Seat::White,
            Side::Black => Seat::Black,
        }
    }
}

// ---------------------------------------------------------------------------
// AI difficulty
// ---------------------------------------------------------------------------

/// Difficulty tier for an AI-controlled side.
///
/// Each tier maps to a fixed search depth; depth is capped so a single
/// search completes well within the scheduled think delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    /// One ply: pick the move with the best immediate evaluation.
    Shallow,
    /// Three plies.
    #[default]
    Medium,
    /// Five plies.
    Deep,
}

impl AiDifficulty {
    /// The search depth, in plies, for this tier.
    pub fn search_depth(self) -> u8 {
        match self {
            AiDifficulty::Shallow => 1,
            AiDifficulty::Medium => 3,
            AiDifficulty::Deep => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// Transitions are strictly monotonic and never reversed:
///
/// ```text
/// Waiting → Active → Finished
/// ```
///
/// - **Waiting**: created, seats still open, clock not running.
/// - **Active**: both sides seated, clock running, moves accepted.
/// - **Finished**: a result is recorded; nothing mutates the session
///   any more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Waiting,
    Active,
    Finished,
}

impl SessionPhase {
    /// Returns `true` while the game is being played.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` once a result has been recorded.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// The next phase in the strict ordering, if there is one.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Active),
            Self::Active => Some(Self::Finished),
            Self::Finished => None,
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Active => write!(f, "active"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Checkmate,
    Stalemate,
    Repetition,
    InsufficientMaterial,
    Resignation,
    Timeout,
    MutualDraw,
}

/// The terminal result of a session: what happened, and who won (draws
/// carry no winner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub winner: Option<Side>,
}

impl Outcome {
    /// A decisive result with a winner.
    pub fn win(kind: OutcomeKind, winner: Side) -> Self {
        Self { kind, winner: Some(winner) }
    }

    /// A drawn result.
    pub fn draw(kind: OutcomeKind) -> Self {
        Self { kind, winner: None }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One player's public slot data, as it appears in snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: ActorId,
    pub name: String,
    pub side: Side,
    pub connected: bool,
    pub ai: bool,
}

/// One applied move, as it appears in the snapshot history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The move in whatever notation the rules adapter produced.
    pub notation: String,
    /// The side that played it.
    pub side: Side,
    /// That side's remaining clock, in milliseconds, after the move.
    pub remaining_ms: u64,
}

/// Per-side remaining time, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub white_ms: u64,
    pub black_ms: u64,
}

impl ClockSnapshot {
    /// Remaining milliseconds for one side.
    pub fn remaining_for(self, side: Side) -> u64 {
        match side {
            Side::White => self.white_ms,
            Side::Black => self.black_ms,
        }
    }
}

/// The full public state of a session, broadcast after every accepted
/// action so every participant and spectator can render the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SessionId,
    pub players: Vec<PlayerInfo>,
    /// The board serialized by the rules adapter (FEN for chess).
    pub board: String,
    /// Applied moves, oldest first. May be tail-truncated to the
    /// configured history limit.
    pub moves: Vec<MoveRecord>,
    pub clock: ClockSnapshot,
    pub phase: SessionPhase,
    pub result: Option<Outcome>,
    /// The actor with an outstanding draw offer, if any.
    pub draw_offer: Option<ActorId>,
    /// Number of spectators watching.
    pub spectators: usize,
}

impl Snapshot {
    /// The player seated on the given side, if that seat is taken.
    pub fn player_for_side(&self, side: Side) -> Option<&PlayerInfo> {
        self.players.iter().find(|p| p.side == side)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The kinds of in-game action a client can dispatch.
///
/// Deserialization is deliberately total: an action string the server
/// doesn't recognize becomes [`ActionKind::Unknown`] instead of a decode
/// error, so the engine can reject it uniformly (and a newer client
/// talking to an older server gets a clean rejection, not a dropped
/// connection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Resign,
    OfferDraw,
    AcceptDraw,
    Unknown,
}

impl ActionKind {
    fn parse(s: &str) -> Self {
        match s {
            "move" => Self::Move,
            "resign" => Self::Resign,
            "offer_draw" => Self::OfferDraw,
            "accept_draw" => Self::AcceptDraw,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ActionKind::parse(&s))
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Client → server events.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "Join", "session_id": "r1", "display_name": "alice" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Join a session as a player (or spectator once seats are full).
    Join {
        session_id: SessionId,
        display_name: String,
        /// Seat an AI opponent on the first free side.
        #[serde(default)]
        ai_opponent: bool,
        /// Difficulty for the AI opponent, if one was requested.
        #[serde(default)]
        ai_difficulty: AiDifficulty,
    },

    /// Dispatch an in-game action on a session.
    Action {
        session_id: SessionId,
        action: ActionKind,
        /// Action payload; for `move` this is the move notation.
        #[serde(default)]
        payload: Option<String>,
    },
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Reply to the joiner: which seat they got, plus the current state.
    Joined { seat: Seat, snapshot: Snapshot },

    /// Broadcast to existing participants when someone takes a seat.
    PlayerJoined { player: PlayerInfo, snapshot: Snapshot },

    /// Broadcast after an accepted move (human or AI).
    MovePlayed { notation: String, snapshot: Snapshot },

    /// Broadcast when a draw is offered.
    DrawOffered { by: ActorId, snapshot: Snapshot },

    /// Broadcast when the session reaches a terminal result.
    GameOver { snapshot: Snapshot },

    /// Sent to a single client whose event was rejected.
    Error { kind: String, message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire shapes here are load-bearing: the browser client switches
    //! on the `"type"` tag and renders the lowercase side/phase strings
    //! directly, so these tests pin the exact JSON produced by serde.

    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_actor_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ActorId::from("abc123")).unwrap();
        assert_eq!(json, "\"abc123\"");
    }

    #[test]
    fn test_session_id_round_trip() {
        let id = SessionId::from("r1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"r1\"");
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    // =====================================================================
    // Side / Seat
    // =====================================================================

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::White).unwrap(), "\"white\"");
        assert_eq!(serde_json::to_string(&Side::Black).unwrap(), "\"black\"");
    }

    #[test]
    fn test_side_other_flips() {
        assert_eq!(Side::White.other(), Side::Black);
        assert_eq!(Side::Black.other(), Side::White);
    }

    #[test]
    fn test_seat_side_mapping() {
        assert_eq!(Seat::White.side(), Some(Side::White));
        assert_eq!(Seat::Black.side(), Some(Side::Black));
        assert_eq!(Seat::Spectator.side(), None);
        assert_eq!(Seat::from(Side::Black), Seat::Black);
    }

    // =====================================================================
    // AiDifficulty
    // =====================================================================

    #[test]
    fn test_difficulty_depths() {
        assert_eq!(AiDifficulty::Shallow.search_depth(), 1);
        assert_eq!(AiDifficulty::Medium.search_depth(), 3);
        assert_eq!(AiDifficulty::Deep.search_depth(), 5);
    }

    #[test]
    fn test_difficulty_default_is_medium() {
        assert_eq!(AiDifficulty::default(), AiDifficulty::Medium);
    }

    // =====================================================================
    // SessionPhase
    // =====================================================================

    #[test]
    fn test_phase_next_follows_strict_order() {
        assert_eq!(SessionPhase::Waiting.next(), Some(SessionPhase::Active));
        assert_eq!(SessionPhase::Active.next(), Some(SessionPhase::Finished));
        assert_eq!(SessionPhase::Finished.next(), None);
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionPhase::Waiting).unwrap(),
            "\"waiting\""
        );
        assert_eq!(
            serde_json::to_string(&SessionPhase::Finished).unwrap(),
            "\"finished\""
        );
    }

    // =====================================================================
    // ActionKind — total deserialization
    // =====================================================================

    #[test]
    fn test_action_kind_known_values() {
        let kind: ActionKind = serde_json::from_str("\"move\"").unwrap();
        assert_eq!(kind, ActionKind::Move);
        let kind: ActionKind = serde_json::from_str("\"offer_draw\"").unwrap();
        assert_eq!(kind, ActionKind::OfferDraw);
        let kind: ActionKind = serde_json::from_str("\"accept_draw\"").unwrap();
        assert_eq!(kind, ActionKind::AcceptDraw);
        let kind: ActionKind = serde_json::from_str("\"resign\"").unwrap();
        assert_eq!(kind, ActionKind::Resign);
    }

    #[test]
    fn test_action_kind_unrecognized_becomes_unknown() {
        // Anything the server doesn't know folds into Unknown rather
        // than failing the whole envelope.
        let kind: ActionKind = serde_json::from_str("\"teleport\"").unwrap();
        assert_eq!(kind, ActionKind::Unknown);
    }

    // =====================================================================
    // Events — JSON shapes
    // =====================================================================

    #[test]
    fn test_join_event_json_format() {
        let event = ClientEvent::Join {
            session_id: SessionId::from("r1"),
            display_name: "alice".into(),
            ai_opponent: true,
            ai_difficulty: AiDifficulty::Deep,
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "Join");
        assert_eq!(json["session_id"], "r1");
        assert_eq!(json["display_name"], "alice");
        assert_eq!(json["ai_opponent"], true);
        assert_eq!(json["ai_difficulty"], "deep");
    }

    #[test]
    fn test_join_event_defaults_when_ai_fields_missing() {
        let json = r#"{
            "type": "Join",
            "session_id": "r9",
            "display_name": "bob"
        }"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        match event {
            ClientEvent::Join { ai_opponent, ai_difficulty, .. } => {
                assert!(!ai_opponent);
                assert_eq!(ai_difficulty, AiDifficulty::Medium);
            }
            other => panic!("expected Join, got {other:?}"),
        }
    }

    #[test]
    fn test_action_event_json_format() {
        let json = r#"{
            "type": "Action",
            "session_id": "r1",
            "action": "move",
            "payload": "e4"
        }"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        match event {
            ClientEvent::Action { session_id, action, payload } => {
                assert_eq!(session_id, SessionId::from("r1"));
                assert_eq!(action, ActionKind::Move);
                assert_eq!(payload.as_deref(), Some("e4"));
            }
            other => panic!("expected Action, got {other:?}"),
        }
    }

    #[test]
    fn test_server_event_joined_round_trip() {
        let snapshot = Snapshot {
            id: SessionId::from("r1"),
            players: vec![PlayerInfo {
                id: ActorId::from("a1"),
                name: "alice".into(),
                side: Side::White,
                connected: true,
                ai: false,
            }],
            board: "startpos".into(),
            moves: vec![],
            clock: ClockSnapshot { white_ms: 600_000, black_ms: 600_000 },
            phase: SessionPhase::Waiting,
            result: None,
            draw_offer: None,
            spectators: 0,
        };
        let event = ServerEvent::Joined { seat: Seat::White, snapshot };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_outcome_json_format() {
        let outcome = Outcome::win(OutcomeKind::Timeout, Side::Black);
        let json: serde_json::Value = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["winner"], "black");

        let draw = Outcome::draw(OutcomeKind::MutualDraw);
        let json: serde_json::Value = serde_json::to_value(draw).unwrap();
        assert_eq!(json["kind"], "mutual_draw");
        assert!(json["winner"].is_null());
    }

    #[test]
    fn test_decode_unknown_event_type_returns_error() {
        let unknown = r#"{"type": "FlyToMoon", "speed": 9000}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }
}
