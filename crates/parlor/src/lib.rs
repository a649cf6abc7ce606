//! # Parlor
//!
//! A server for realtime multiplayer board games in the browser.
//!
//! Parlor is server-authoritative: a game implements the
//! [`TurnGame`](parlor_engine::TurnGame) trait (rules seam + AI move
//! computation) and the framework handles sessions, seats, per-side
//! clocks, deferred AI turns, and snapshot broadcasts over WebSockets.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//! use parlor_chess::ChessGame;
//!
//! # async fn run() -> Result<(), ParlorError> {
//! let server = ParlorServer::<ChessGame>::builder()
//!     .bind("0.0.0.0:8080")
//!     .build::<ChessGame>()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ParlorError;
pub use server::{ParlorServer, ParlorServerBuilder};

/// The common imports for building and running a server.
pub mod prelude {
    pub use crate::{ParlorError, ParlorServer, ParlorServerBuilder};
    pub use parlor_engine::{
        ActionRouter, SessionConfig, SessionRegistry, Terminal, TurnGame,
    };
    pub use parlor_protocol::{
        ActionKind, ActorId, AiDifficulty, ClientEvent, Seat, ServerEvent,
        SessionId, SessionPhase, Side, Snapshot,
    };
}
