//! Rules adapter: `TurnGame` on top of the external `chess` crate.
//!
//! The adapter owns only orchestration concerns — notation parsing,
//! terminal-status translation, and the one terminal test the external
//! engine doesn't expose (insufficient material). Move legality and
//! check detection stay inside the `chess` crate.

use std::str::FromStr;

use chess::{BitBoard, Board, BoardStatus, ChessMove, Color, Game, MoveGen, Piece, EMPTY};
use parlor_engine::{Terminal, TurnGame};
use parlor_protocol::{AiDifficulty, Side};

use crate::search;

/// Light squares (a2, b1, ...); used for the same-colored-bishops case
/// of the insufficient-material test.
const LIGHT_SQUARES: BitBoard = BitBoard(0x55AA_55AA_55AA_55AA);

/// A chess position with enough history to detect repetition draws.
///
/// Wraps `chess::Game` rather than `chess::Board`: the bare board is a
/// pure position and cannot answer "has this position occurred three
/// times", which the terminal check needs.
#[derive(Clone, Debug)]
pub struct ChessBoard {
    game: Game,
}

impl ChessBoard {
    /// The standard starting position.
    pub fn new() -> Self {
        Self { game: Game::new() }
    }

    /// A position from FEN, with empty history.
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        let board = Board::from_str(fen).map_err(|e| e.to_string())?;
        Ok(Self { game: Game::new_with_board(board) })
    }

    /// The current position, without history.
    pub fn position(&self) -> Board {
        self.game.current_position()
    }

    /// Parses `notation` (SAN, falling back to coordinate notation like
    /// `e2e4`) against the current position.
    fn parse_move(&self, notation: &str) -> Result<ChessMove, String> {
        let position = self.position();
        ChessMove::from_san(&position, notation)
            .or_else(|_| ChessMove::from_str(notation))
            .map_err(|_| format!("unparseable move: {notation}"))
    }
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::new()
    }
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

/// Neither side can possibly deliver mate: bare kings, a lone minor
/// piece, or bishops all on one square color.
fn insufficient_material(board: &Board) -> bool {
    let heavy = *board.pieces(Piece::Pawn)
        | *board.pieces(Piece::Rook)
        | *board.pieces(Piece::Queen);
    if heavy != EMPTY {
        return false;
    }

    let knights = board.pieces(Piece::Knight).popcnt();
    let bishops = *board.pieces(Piece::Bishop);
    let minors = knights + bishops.popcnt();
    if minors <= 1 {
        return true;
    }
    if knights == 0 {
        let light = bishops & LIGHT_SQUARES;
        return light == bishops || light == EMPTY;
    }
    false
}

/// The chess instantiation of the session engine's game seam.
pub struct ChessGame;

impl TurnGame for ChessGame {
    type Board = ChessBoard;

    fn initial_board() -> ChessBoard {
        ChessBoard::new()
    }

    fn side_to_move(board: &ChessBoard) -> Side {
        side_of(board.game.side_to_move())
    }

    fn apply_move(board: &ChessBoard, notation: &str) -> Result<ChessBoard, String> {
        let mv = board.parse_move(notation)?;
        if !board.position().legal(mv) {
            return Err(format!("illegal move: {notation}"));
        }
        let mut next = board.clone();
        if !next.game.make_move(mv) {
            return Err(format!("illegal move: {notation}"));
        }
        Ok(next)
    }

    fn legal_moves(board: &ChessBoard) -> Vec<String> {
        MoveGen::new_legal(&board.position())
            .map(|mv| mv.to_string())
            .collect()
    }

    fn terminal_status(board: &ChessBoard) -> Option<Terminal> {
        let position = board.position();
        match position.status() {
            BoardStatus::Checkmate => {
                // The side to move is the one mated.
                let winner = side_of(position.side_to_move()).other();
                Some(Terminal::Checkmate { winner })
            }
            BoardStatus::Stalemate => Some(Terminal::Stalemate),
            BoardStatus::Ongoing => {
                // The rules engine folds threefold repetition and the
                // fifty-move rule into one declarable-draw query.
                if board.game.can_declare_draw() {
                    Some(Terminal::Repetition)
                } else if insufficient_material(&position) {
                    Some(Terminal::InsufficientMaterial)
                } else {
                    None
                }
            }
        }
    }

    fn compute_ai_move(board: &ChessBoard, difficulty: AiDifficulty) -> Option<String> {
        search::find_best_move(&board.position(), difficulty).map(|mv| mv.to_string())
    }

    fn encode_board(board: &ChessBoard) -> String {
        board.position().to_string()
    }
}
