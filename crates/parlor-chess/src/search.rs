//! Minimax search with alpha-beta pruning.
//!
//! The side to move maximizes the static evaluation when it is the
//! AI's own side and minimizes otherwise. Pruning only discards
//! subtrees that cannot affect the result, so the value at the root is
//! exactly what plain minimax would return at the same depth; between
//! equal-valued root moves the first in generation order wins.
//!
//! Depth comes from the difficulty tier and is capped low enough that
//! one search finishes comfortably inside the scheduled think delay.
//! Interior nodes try captures first (an iterator-mask trick the move
//! generator supports), which tightens the alpha-beta window early
//! without touching root move ordering.

use chess::{Board, ChessMove, Color, MoveGen, EMPTY};
use parlor_protocol::AiDifficulty;
use rand::Rng;

use crate::eval;

/// Score for the fastest possible mate; longer mates score slightly
/// less, so the search prefers the short way in.
const MATE_SCORE: i32 = 100_000;

/// Sentinel beyond any reachable score.
const SCORE_INF: i32 = 1_000_000;

/// Picks a move for the side to move at the given difficulty.
///
/// Falls back to a uniformly random legal move if the search comes up
/// empty; returns `None` only when the position has no legal moves at
/// all.
pub fn find_best_move(board: &Board, difficulty: AiDifficulty) -> Option<ChessMove> {
    let depth = difficulty.search_depth();
    match search_root(board, depth) {
        Some((mv, score)) => {
            tracing::debug!(%mv, score, depth, "search picked a move");
            Some(mv)
        }
        None => {
            let fallback = random_legal_move(board);
            if let Some(mv) = fallback {
                tracing::warn!(%mv, "search found nothing, playing a random legal move");
            }
            fallback
        }
    }
}

/// Full-width search from the root: returns the best move and its
/// minimax value for the side to move, or `None` if the position has
/// no legal moves (or `depth` is zero).
pub fn search_root(board: &Board, depth: u8) -> Option<(ChessMove, i32)> {
    if depth == 0 {
        return None;
    }
    let ai_side = board.side_to_move();
    let mut best: Option<(ChessMove, i32)> = None;

    for mv in MoveGen::new_legal(board) {
        let child = board.make_move_new(mv);
        let score = alpha_beta(&child, depth - 1, -SCORE_INF, SCORE_INF, ai_side, 1);
        // Strict comparison: ties keep the earliest-generated move.
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((mv, score));
        }
    }

    best
}

fn alpha_beta(
    board: &Board,
    depth: u8,
    mut alpha: i32,
    mut beta: i32,
    ai_side: Color,
    ply: i32,
) -> i32 {
    let mut moves = MoveGen::new_legal(board);
    if moves.len() == 0 {
        return if *board.checkers() != EMPTY {
            // The side to move is mated; shade by ply so nearer mates
            // dominate.
            if board.side_to_move() == ai_side {
                -(MATE_SCORE - ply)
            } else {
                MATE_SCORE - ply
            }
        } else {
            // Stalemate.
            0
        };
    }
    if depth == 0 {
        return eval::evaluate_for(board, ai_side);
    }

    let maximizing = board.side_to_move() == ai_side;
    let mut best = if maximizing { -SCORE_INF } else { SCORE_INF };

    // Captures first, then the quiet moves.
    let targets = *board.color_combined(!board.side_to_move());
    for mask in [targets, !EMPTY] {
        moves.set_iterator_mask(mask);
        for mv in &mut moves {
            let child = board.make_move_new(mv);
            let score = alpha_beta(&child, depth - 1, alpha, beta, ai_side, ply + 1);
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if beta <= alpha {
                return best;
            }
        }
    }

    best
}

fn random_legal_move(board: &Board) -> Option<ChessMove> {
    let moves: Vec<ChessMove> = MoveGen::new_legal(board).collect();
    if moves.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..moves.len());
    Some(moves[index])
}
