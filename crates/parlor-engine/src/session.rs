//! Session actor: an isolated Tokio task that owns one game room.
//!
//! Each session runs in its own task and is only reachable through its
//! command channel. That gives every session a single logical execution
//! path — a dispatched action runs to completion without interleaving
//! with any other mutation of the same session — while different
//! sessions run concurrently without sharing state.
//!
//! The deferred AI turn follows the same rule: the scheduled task
//! sleeps *outside* the actor and re-enters through the command
//! channel, carrying the turn owner and move sequence number it was
//! scheduled for. A stale callback (the game ended or the turn moved
//! on while it slept) detects the mismatch and no-ops.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

use parlor_protocol::{
    ActionKind, ActorId, AiDifficulty, MoveRecord, Outcome, OutcomeKind,
    PlayerInfo, Seat, ServerEvent, SessionId, SessionPhase, Side, Snapshot,
};
use rand::Rng;
use tokio::sync::{mpsc, oneshot};

use crate::{ActionError, SessionConfig, TurnClock, TurnGame};

/// Command channel depth per session actor.
const CHANNEL_SIZE: usize = 64;

/// Channel sender for delivering server events to one actor's
/// connection handler. The engine broadcasts through these; delivery to
/// the socket is the gateway's problem.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands processed by a session actor.
enum SessionCommand {
    /// Seat an actor (or return their existing seat — joins are
    /// idempotent per actor id).
    Join {
        actor: ActorId,
        name: String,
        ai_opponent: bool,
        ai_difficulty: AiDifficulty,
        sender: EventSender,
        reply: oneshot::Sender<Result<(Seat, Snapshot), ActionError>>,
    },

    /// Dispatch an in-game action.
    Act {
        actor: ActorId,
        kind: ActionKind,
        payload: Option<String>,
        reply: oneshot::Sender<Result<Snapshot, ActionError>>,
    },

    /// A scheduled AI turn fired. Carries the validity key it was
    /// scheduled under; mismatches are silently dropped.
    AiTurn {
        expected_owner: ActorId,
        expected_seq: u64,
    },

    /// An actor's connection went away. Replies `true` if the session
    /// is now abandoned (no connected player, no spectator) and should
    /// be evicted.
    Leave {
        actor: ActorId,
        reply: oneshot::Sender<bool>,
    },

    /// Request a current snapshot.
    GetSnapshot { reply: oneshot::Sender<Snapshot> },

    /// Stop the actor.
    Shutdown,
}

/// Handle to a running session actor. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// The session's id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Seats an actor in the session (idempotent per actor id).
    pub async fn join(
        &self,
        actor: ActorId,
        name: String,
        ai_opponent: bool,
        ai_difficulty: AiDifficulty,
        sender: EventSender,
    ) -> Result<(Seat, Snapshot), ActionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Join {
                actor,
                name,
                ai_opponent,
                ai_difficulty,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ActionError::SessionUnavailable(self.id.clone()))?;
        reply_rx
            .await
            .map_err(|_| ActionError::SessionUnavailable(self.id.clone()))?
    }

    /// Dispatches an in-game action and returns the resulting snapshot.
    pub async fn act(
        &self,
        actor: ActorId,
        kind: ActionKind,
        payload: Option<String>,
    ) -> Result<Snapshot, ActionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Act {
                actor,
                kind,
                payload,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ActionError::SessionUnavailable(self.id.clone()))?;
        reply_rx
            .await
            .map_err(|_| ActionError::SessionUnavailable(self.id.clone()))?
    }

    /// Records a disconnect. Returns `true` when the session is
    /// abandoned and should be removed from the registry. A dead actor
    /// also counts as abandoned.
    pub async fn leave(&self, actor: ActorId) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .sender
            .send(SessionCommand::Leave { actor, reply: reply_tx })
            .await
            .is_err()
        {
            return true;
        }
        reply_rx.await.unwrap_or(true)
    }

    /// Fetches the current snapshot.
    pub async fn snapshot(&self) -> Result<Snapshot, ActionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::GetSnapshot { reply: reply_tx })
            .await
            .map_err(|_| ActionError::SessionUnavailable(self.id.clone()))?;
        reply_rx
            .await
            .map_err(|_| ActionError::SessionUnavailable(self.id.clone()))
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(SessionCommand::Shutdown).await;
    }
}

/// One seated player.
struct PlayerSlot {
    actor_id: ActorId,
    name: String,
    side: Side,
    connected: bool,
    is_ai: bool,
    /// Search tier for AI-controlled slots.
    difficulty: Option<AiDifficulty>,
}

impl PlayerSlot {
    fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.actor_id.clone(),
            name: self.name.clone(),
            side: self.side,
            connected: self.connected,
            ai: self.is_ai,
        }
    }
}

/// The session actor state. Runs inside a Tokio task.
struct SessionActor<G: TurnGame> {
    id: SessionId,
    config: SessionConfig,
    phase: SessionPhase,
    board: G::Board,
    players: HashMap<ActorId, PlayerSlot>,
    spectators: HashSet<ActorId>,
    /// Per-actor outbound event channels (players and spectators).
    senders: HashMap<ActorId, EventSender>,
    /// Running iff the session is Active.
    clock: Option<TurnClock>,
    moves: Vec<MoveRecord>,
    result: Option<Outcome>,
    draw_offer: Option<ActorId>,
    /// Count of applied moves; keys scheduled AI turns so a stale
    /// callback can detect that the game moved on without it.
    move_seq: u64,
    /// Used by scheduled AI tasks to re-enter the command loop.
    self_sender: mpsc::Sender<SessionCommand>,
    receiver: mpsc::Receiver<SessionCommand>,
    _game: PhantomData<G>,
}

impl<G: TurnGame> SessionActor<G> {
    async fn run(mut self) {
        tracing::info!(session_id = %self.id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Join {
                    actor,
                    name,
                    ai_opponent,
                    ai_difficulty,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(
                        actor,
                        name,
                        ai_opponent,
                        ai_difficulty,
                        sender,
                    );
                    let _ = reply.send(result);
                }
                SessionCommand::Act { actor, kind, payload, reply } => {
                    let result = self.handle_act(actor, kind, payload);
                    let _ = reply.send(result);
                }
                SessionCommand::AiTurn { expected_owner, expected_seq } => {
                    self.handle_ai_turn(expected_owner, expected_seq);
                }
                SessionCommand::Leave { actor, reply } => {
                    let _ = reply.send(self.handle_leave(actor));
                }
                SessionCommand::GetSnapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                SessionCommand::Shutdown => {
                    tracing::info!(session_id = %self.id, "session shutting down");
                    break;
                }
            }
        }

        tracing::info!(session_id = %self.id, "session actor stopped");
    }

    // -----------------------------------------------------------------
    // Join / seats
    // -----------------------------------------------------------------

    fn handle_join(
        &mut self,
        actor: ActorId,
        name: String,
        ai_opponent: bool,
        ai_difficulty: AiDifficulty,
        sender: EventSender,
    ) -> Result<(Seat, Snapshot), ActionError> {
        // Rejoin: same actor id gets their existing seat back.
        if let Some(slot) = self.players.get_mut(&actor) {
            slot.connected = true;
            let seat = Seat::from(slot.side);
            self.senders.insert(actor.clone(), sender);
            tracing::info!(session_id = %self.id, %actor, "player reconnected");
            return Ok((seat, self.snapshot()));
        }
        if self.spectators.contains(&actor) {
            self.senders.insert(actor, sender);
            return Ok((Seat::Spectator, self.snapshot()));
        }

        let Some(side) = self.free_side() else {
            // Both sides taken: the bench.
            self.spectators.insert(actor.clone());
            self.senders.insert(actor, sender);
            tracing::info!(
                session_id = %self.id,
                spectators = self.spectators.len(),
                "spectator joined"
            );
            return Ok((Seat::Spectator, self.snapshot()));
        };

        self.players.insert(
            actor.clone(),
            PlayerSlot {
                actor_id: actor.clone(),
                name,
                side,
                connected: true,
                is_ai: false,
                difficulty: None,
            },
        );
        self.senders.insert(actor.clone(), sender);
        tracing::info!(
            session_id = %self.id,
            %actor,
            %side,
            "player seated"
        );

        if ai_opponent {
            self.seat_ai(ai_difficulty);
        }

        if self.free_side().is_none() && self.phase == SessionPhase::Waiting {
            self.start();
        }

        let snapshot = self.snapshot();
        // Existing participants learn about the new player; the joiner
        // gets the seat in the reply instead.
        let slot = &self.players[&actor];
        self.broadcast_except(
            &actor,
            ServerEvent::PlayerJoined {
                player: slot.info(),
                snapshot: snapshot.clone(),
            },
        );

        Ok((Seat::from(side), snapshot))
    }

    /// Fills the first free side with a synthetic AI player.
    fn seat_ai(&mut self, difficulty: AiDifficulty) {
        let Some(side) = self.free_side() else { return };
        let actor = ActorId(format!("ai:{}", self.id));
        tracing::info!(
            session_id = %self.id,
            %side,
            ?difficulty,
            "seating AI opponent"
        );
        self.players.insert(
            actor.clone(),
            PlayerSlot {
                actor_id: actor,
                name: "Computer".to_string(),
                side,
                connected: true,
                is_ai: true,
                difficulty: Some(difficulty),
            },
        );
    }

    /// The lowest unseated side in canonical order (white before black).
    fn free_side(&self) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.players.values().all(|p| p.side != *side))
    }

    /// Both sides are seated: Waiting → Active, start the clock, and
    /// hand the first turn to the AI if it owns it.
    fn start(&mut self) {
        self.phase = SessionPhase::Active;
        self.clock = Some(TurnClock::start(self.config.initial_time));
        tracing::info!(
            session_id = %self.id,
            budget_secs = self.config.initial_time.as_secs(),
            "session started"
        );
        self.maybe_schedule_ai();
    }

    // -----------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------

    fn handle_act(
        &mut self,
        actor: ActorId,
        kind: ActionKind,
        payload: Option<String>,
    ) -> Result<Snapshot, ActionError> {
        match self.phase {
            SessionPhase::Waiting => {
                return Err(ActionError::SessionNotActive(self.id.clone()));
            }
            SessionPhase::Finished => {
                return Err(ActionError::SessionFinished(self.id.clone()));
            }
            SessionPhase::Active => {}
        }

        match kind {
            ActionKind::Move => {
                let side = G::side_to_move(&self.board);
                let owner_is_actor = self
                    .player_for_side(side)
                    .is_some_and(|slot| slot.actor_id == actor);
                if !owner_is_actor {
                    return Err(ActionError::NotYourTurn);
                }
                let notation = payload.ok_or_else(|| {
                    ActionError::IllegalMove("missing move payload".into())
                })?;
                self.play_move(side, &notation)?;
                Ok(self.snapshot())
            }

            ActionKind::Resign => {
                let side = self.side_of(&actor).ok_or(ActionError::NotAPlayer)?;
                // Valid regardless of whose turn it is.
                self.finish(Outcome::win(OutcomeKind::Resignation, side.other()));
                let snapshot = self.snapshot();
                self.broadcast(ServerEvent::GameOver { snapshot: snapshot.clone() });
                Ok(snapshot)
            }

            ActionKind::OfferDraw => {
                self.side_of(&actor).ok_or(ActionError::NotAPlayer)?;
                // A newer offer replaces any outstanding one.
                self.draw_offer = Some(actor.clone());
                let snapshot = self.snapshot();
                self.broadcast(ServerEvent::DrawOffered {
                    by: actor,
                    snapshot: snapshot.clone(),
                });
                Ok(snapshot)
            }

            ActionKind::AcceptDraw => {
                self.side_of(&actor).ok_or(ActionError::NotAPlayer)?;
                // Needs an outstanding offer from someone else; the
                // offerer can't accept their own.
                let accepted =
                    matches!(&self.draw_offer, Some(by) if *by != actor);
                if !accepted {
                    return Err(ActionError::NoDrawOffer);
                }
                self.finish(Outcome::draw(OutcomeKind::MutualDraw));
                let snapshot = self.snapshot();
                self.broadcast(ServerEvent::GameOver { snapshot: snapshot.clone() });
                Ok(snapshot)
            }

            ActionKind::Unknown => Err(ActionError::UnknownAction),
        }
    }

    /// Applies a validated move for `side`: board, clock, history,
    /// terminal detection, broadcasts, and AI scheduling.
    ///
    /// Shared by player dispatch and the AI turn so both go through
    /// exactly the same accounting.
    fn play_move(&mut self, side: Side, notation: &str) -> Result<(), ActionError> {
        let next = G::apply_move(&self.board, notation)
            .map_err(ActionError::IllegalMove)?;
        self.board = next;

        // Invariant: the clock exists iff the session is Active, and
        // this is only reachable while Active.
        let clock = self.clock.as_mut().expect("clock runs while active");
        let left = clock.record_move(side);

        self.moves.push(MoveRecord {
            notation: notation.to_string(),
            side,
            remaining_ms: left.as_millis() as u64,
        });
        self.move_seq += 1;
        // A move changes the position the offer was made on.
        self.draw_offer = None;

        if left.is_zero() {
            // Flag fall observed at move time: the move stands, the
            // mover loses on time.
            self.finish(Outcome::win(OutcomeKind::Timeout, side.other()));
        } else if let Some(terminal) = G::terminal_status(&self.board) {
            self.finish(terminal.to_outcome());
        }

        let snapshot = self.snapshot();
        self.broadcast(ServerEvent::MovePlayed {
            notation: notation.to_string(),
            snapshot: snapshot.clone(),
        });
        if self.phase.is_finished() {
            self.broadcast(ServerEvent::GameOver { snapshot });
        } else {
            self.maybe_schedule_ai();
        }
        Ok(())
    }

    /// Records the result and moves to Finished. Idempotent so the
    /// result can never be overwritten once set.
    fn finish(&mut self, outcome: Outcome) {
        if self.phase.is_finished() {
            return;
        }
        self.phase = SessionPhase::Finished;
        self.result = Some(outcome);
        self.draw_offer = None;
        tracing::info!(
            session_id = %self.id,
            kind = ?outcome.kind,
            winner = ?outcome.winner,
            moves = self.moves.len(),
            "session finished"
        );
    }

    // -----------------------------------------------------------------
    // Deferred AI turn
    // -----------------------------------------------------------------

    /// If the side to move is AI-controlled, schedules its turn after
    /// the configured think delay (plus jitter). Never runs the search
    /// inline.
    fn maybe_schedule_ai(&self) {
        if !self.phase.is_active() {
            return;
        }
        let side = G::side_to_move(&self.board);
        let Some(slot) = self.player_for_side(side) else { return };
        if !slot.is_ai {
            return;
        }

        let expected_owner = slot.actor_id.clone();
        let expected_seq = self.move_seq;
        let jitter_ms = self.config.ai_move_jitter.as_millis() as u64;
        let delay = self.config.ai_move_delay
            + std::time::Duration::from_millis(
                rand::rng().random_range(0..=jitter_ms),
            );
        tracing::debug!(
            session_id = %self.id,
            %side,
            seq = expected_seq,
            delay_ms = delay.as_millis() as u64,
            "scheduling AI turn"
        );

        let tx = self.self_sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx
                .send(SessionCommand::AiTurn { expected_owner, expected_seq })
                .await;
        });
    }

    /// A scheduled AI turn fired. Re-validates phase, turn owner, and
    /// sequence number; anything stale is a safe no-op.
    fn handle_ai_turn(&mut self, expected_owner: ActorId, expected_seq: u64) {
        if !self.phase.is_active() || self.move_seq != expected_seq {
            tracing::debug!(
                session_id = %self.id,
                seq = expected_seq,
                "dropping stale AI turn"
            );
            return;
        }
        let side = G::side_to_move(&self.board);
        let Some(slot) = self.player_for_side(side) else { return };
        if slot.actor_id != expected_owner || !slot.is_ai {
            tracing::debug!(
                session_id = %self.id,
                "dropping AI turn for a different owner"
            );
            return;
        }
        let difficulty = slot.difficulty.unwrap_or_default();

        match G::compute_ai_move(&self.board, difficulty) {
            Some(notation) => {
                if let Err(e) = self.play_move(side, &notation) {
                    // The search returned something the rules reject;
                    // don't stall the game on it.
                    tracing::warn!(
                        session_id = %self.id,
                        error = %e,
                        "AI produced an unplayable move, forfeiting"
                    );
                    self.forfeit_ai(side);
                }
            }
            None => {
                tracing::warn!(
                    session_id = %self.id,
                    %side,
                    "AI found no move in a live position, forfeiting"
                );
                self.forfeit_ai(side);
            }
        }
    }

    fn forfeit_ai(&mut self, side: Side) {
        self.finish(Outcome::win(OutcomeKind::Resignation, side.other()));
        let snapshot = self.snapshot();
        self.broadcast(ServerEvent::GameOver { snapshot });
    }

    // -----------------------------------------------------------------
    // Disconnects / eviction
    // -----------------------------------------------------------------

    /// Marks a player disconnected (or removes a spectator) and reports
    /// whether the session is now abandoned. Disconnection never ends
    /// the game — the slot stays seated for a rejoin, and the clock
    /// keeps running.
    fn handle_leave(&mut self, actor: ActorId) -> bool {
        if let Some(slot) = self.players.get_mut(&actor) {
            slot.connected = false;
            tracing::info!(session_id = %self.id, %actor, "player disconnected");
        }
        self.spectators.remove(&actor);
        self.senders.remove(&actor);

        // AI seats don't hold a session open.
        let abandoned = self
            .players
            .values()
            .all(|slot| slot.is_ai || !slot.connected)
            && self.spectators.is_empty();
        if abandoned {
            tracing::info!(session_id = %self.id, "session abandoned");
        }
        abandoned
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    fn player_for_side(&self, side: Side) -> Option<&PlayerSlot> {
        self.players.values().find(|slot| slot.side == side)
    }

    fn side_of(&self, actor: &ActorId) -> Option<Side> {
        self.players.get(actor).map(|slot| slot.side)
    }

    fn snapshot(&self) -> Snapshot {
        let mut players: Vec<PlayerInfo> =
            self.players.values().map(PlayerSlot::info).collect();
        players.sort_by_key(|p| p.side.index());

        let moves = if self.config.history_limit > 0
            && self.moves.len() > self.config.history_limit
        {
            self.moves[self.moves.len() - self.config.history_limit..].to_vec()
        } else {
            self.moves.clone()
        };

        let clock = match &self.clock {
            Some(clock) => clock.snapshot(),
            None => {
                let budget = self.config.initial_time.as_millis() as u64;
                parlor_protocol::ClockSnapshot {
                    white_ms: budget,
                    black_ms: budget,
                }
            }
        };

        Snapshot {
            id: self.id.clone(),
            players,
            board: G::encode_board(&self.board),
            moves,
            clock,
            phase: self.phase,
            result: self.result,
            draw_offer: self.draw_offer.clone(),
            spectators: self.spectators.len(),
        }
    }

    fn broadcast(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    fn broadcast_except(&self, skip: &ActorId, event: ServerEvent) {
        for (actor, sender) in &self.senders {
            if actor != skip {
                let _ = sender.send(event.clone());
            }
        }
    }
}

/// Spawns a new session actor task and returns its handle.
pub(crate) fn spawn_session<G: TurnGame>(
    id: SessionId,
    config: SessionConfig,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(CHANNEL_SIZE);

    let actor = SessionActor::<G> {
        id: id.clone(),
        config,
        phase: SessionPhase::Waiting,
        board: G::initial_board(),
        players: HashMap::new(),
        spectators: HashSet::new(),
        senders: HashMap::new(),
        clock: None,
        moves: Vec::new(),
        result: None,
        draw_offer: None,
        move_seq: 0,
        self_sender: tx.clone(),
        receiver: rx,
        _game: PhantomData,
    };

    tokio::spawn(actor.run());

    SessionHandle { id, sender: tx }
}
