//! Chess for the parlor engine.
//!
//! This crate plugs chess into the generic session lifecycle:
//!
//! - [`ChessGame`] implements [`TurnGame`](parlor_engine::TurnGame) on
//!   top of the external `chess` crate, which owns board
//!   representation, legal-move generation, and check/mate detection —
//!   none of that is reimplemented here.
//! - [`search`] provides the AI opponent: minimax with alpha-beta
//!   pruning over the rules engine's moves.
//! - [`eval`] is the static evaluator the search leans on: material,
//!   piece-square tables, and a small mobility term.

pub mod eval;
pub mod search;

mod rules;

pub use rules::{ChessBoard, ChessGame};
