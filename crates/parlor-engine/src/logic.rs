//! The `TurnGame` trait — the seam between the lifecycle engine and a
//! concrete board game.
//!
//! The engine owns orchestration: seats, phases, the clock, turn
//! alternation, and translating a terminal board into an [`Outcome`].
//! Everything rules-shaped — move legality, check detection, terminal
//! positions, the AI's search — lives behind this trait. The engine
//! never inspects a board; it only threads `Board` values through the
//! trait's functions.
//!
//! Moves cross the seam as strings in whatever notation the game's
//! adapter accepts (SAN or coordinate notation for chess). That keeps
//! the engine, the wire protocol, and the move history all agnostic to
//! any particular game's move structure.

use parlor_protocol::{AiDifficulty, Outcome, OutcomeKind, Side};

/// Terminal states a board position can reach on its own, without a
/// meta-action like resignation or a clock flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// The side to move has no legal moves and is in check.
    Checkmate { winner: Side },
    /// The side to move has no legal moves and is not in check.
    Stalemate,
    /// A drawn position by repetition (or an equivalent rule the rules
    /// engine folds into the same query).
    Repetition,
    /// Neither side retains mating material.
    InsufficientMaterial,
}

impl Terminal {
    /// Translates the terminal board state into a session outcome.
    pub fn to_outcome(self) -> Outcome {
        match self {
            Terminal::Checkmate { winner } => {
                Outcome::win(OutcomeKind::Checkmate, winner)
            }
            Terminal::Stalemate => Outcome::draw(OutcomeKind::Stalemate),
            Terminal::Repetition => Outcome::draw(OutcomeKind::Repetition),
            Terminal::InsufficientMaterial => {
                Outcome::draw(OutcomeKind::InsufficientMaterial)
            }
        }
    }
}

/// A two-player turn-based board game, as consumed by the engine.
///
/// All methods are associated functions over an immutable board —
/// applying a move produces a *new* board rather than mutating in
/// place, which is what lets the AI search positions without undo
/// bookkeeping and lets the engine keep the one true board private to
/// the session actor.
pub trait TurnGame: Send + Sync + 'static {
    /// The full game position. Cloned for snapshots and AI search.
    type Board: Clone + Send + Sync + 'static;

    /// The starting position.
    fn initial_board() -> Self::Board;

    /// Which side moves next in this position.
    fn side_to_move(board: &Self::Board) -> Side;

    /// Parses `notation`, checks legality, and returns the resulting
    /// board.
    ///
    /// # Errors
    /// A human-readable reason when the notation is unparseable or the
    /// move is illegal here. The engine folds either case into
    /// [`ActionError::IllegalMove`](crate::ActionError::IllegalMove).
    fn apply_move(board: &Self::Board, notation: &str) -> Result<Self::Board, String>;

    /// Every legal move in this position, in the rules engine's
    /// generation order.
    fn legal_moves(board: &Self::Board) -> Vec<String>;

    /// `Some` if the position itself ends the game.
    ///
    /// Called after every applied move; the engine translates the
    /// result via [`Terminal::to_outcome`].
    fn terminal_status(board: &Self::Board) -> Option<Terminal>;

    /// Computes a move for the side to move at the given difficulty.
    ///
    /// Must return a member of [`legal_moves`](Self::legal_moves), or
    /// `None` when no legal move exists. Implementations are expected
    /// to fall back to *some* legal move rather than fail — if this
    /// still returns `None` in a non-terminal position, the engine
    /// forfeits the AI's game rather than stall the turn owner forever.
    fn compute_ai_move(board: &Self::Board, difficulty: AiDifficulty) -> Option<String>;

    /// Serializes the board for snapshots (FEN for chess).
    fn encode_board(board: &Self::Board) -> String;
}
