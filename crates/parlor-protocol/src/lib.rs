//! Wire protocol for the parlor game server.
//!
//! This crate defines the "language" that browser clients and the server
//! speak over the realtime channel:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Snapshot`], the id
//!   newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures
//!   are converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! The protocol layer sits between transport (raw frames) and the game
//! engine (sessions, seats, clocks). It doesn't know about connections
//! or game rules — it only knows how events are shaped.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ActionKind, ActorId, AiDifficulty, ClientEvent, ClockSnapshot,
    MoveRecord, Outcome, OutcomeKind, PlayerInfo, Seat, ServerEvent,
    SessionId, SessionPhase, Side, Snapshot,
};
