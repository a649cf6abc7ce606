//! Turn-based session lifecycle engine.
//!
//! Each game session runs as an isolated Tokio task (actor model) with
//! its own board, seats, clock, and move history. The outside world —
//! and the deferred AI turn — reaches a session only through its command
//! channel, so every mutation of one session is serialized while
//! different sessions run fully independently.
//!
//! # Key types
//!
//! - [`TurnGame`] — the trait a board game implements: rules-engine
//!   seam plus AI move computation
//! - [`SessionRegistry`] — atomic get-or-create lookup of sessions
//! - [`ActionRouter`] — validates and dispatches client actions
//! - [`SessionHandle`] — send commands to a running session actor
//! - [`TurnClock`] — per-side wall-clock time control
//! - [`SessionConfig`] — time budget, AI think delay, history limit

mod clock;
mod config;
mod error;
mod logic;
mod registry;
mod router;
mod session;

pub use clock::TurnClock;
pub use config::SessionConfig;
pub use error::ActionError;
pub use logic::{Terminal, TurnGame};
pub use registry::SessionRegistry;
pub use router::ActionRouter;
pub use session::{EventSender, SessionHandle};
