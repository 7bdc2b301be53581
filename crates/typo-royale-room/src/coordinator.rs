//! The session coordinator: game rules as state transitions.
//!
//! [`Coordinator`] owns the room store and the prompt source. Every
//! inbound [`ClientAction`] goes through [`Coordinator::dispatch`], which
//! mutates at most one room and returns the [`Effect`]s the server must
//! carry out: broadcasts to a room's members, broadcast-group membership
//! changes, and scheduling or cancelling the delayed round advance.
//!
//! The coordinator does no I/O and never sleeps, so every rule can be
//! tested by feeding it actions and inspecting the returned effects.
//!
//! # Round settling
//!
//! A round is *settled* once the number of submissions (plus readiness
//! acknowledgements) reaches the player count. Settling by score
//! submission schedules one delayed advance per round
//! ([`Effect::ScheduleAdvance`]); when that timer fires the server calls
//! [`Coordinator::advance_due`], which re-validates the room before
//! acting. Settling by readiness advances immediately and cancels any
//! pending timer.

use std::time::Duration;

use tracing::{debug, info};
use typo_royale_protocol::{ClientAction, LooseNumber, PlayerId, RoomId, ServerEvent};

use crate::config::{Advance, CoordinatorConfig};
use crate::error::RoomError;
use crate::registry::{RoomRegistry, RoomStore};
use crate::room::Room;
use crate::sentences::{SentenceCorpus, SentenceProvider};

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

/// Something the server must do as a result of an action.
///
/// Effects are returned in the order they must be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send `event` to every connection subscribed to `room_id`.
    Broadcast { room_id: RoomId, event: ServerEvent },

    /// Add a connection to a room's broadcast group.
    Subscribe { room_id: RoomId, player_id: PlayerId },

    /// Remove a connection from a room's broadcast group.
    Unsubscribe { room_id: RoomId, player_id: PlayerId },

    /// Call [`Coordinator::advance_due`] for `(room_id, round)` after
    /// `delay`, unless cancelled first.
    ScheduleAdvance {
        room_id: RoomId,
        round: u32,
        delay: Duration,
    },

    /// Cancel every pending advance for `room_id`.
    CancelAdvance { room_id: RoomId },
}

impl Effect {
    fn broadcast(room_id: &RoomId, event: ServerEvent) -> Self {
        Self::Broadcast {
            room_id: room_id.clone(),
            event,
        }
    }

    fn cancel(room_id: &RoomId) -> Self {
        Self::CancelAdvance {
            room_id: room_id.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Game rules for every room on the server.
pub struct Coordinator<S = RoomRegistry, P = SentenceCorpus> {
    store: S,
    sentences: P,
    config: CoordinatorConfig,
}

impl Coordinator {
    /// A coordinator over an empty in-memory registry and the default
    /// prompt corpus.
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_parts(RoomRegistry::new(), SentenceCorpus::default(), config)
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl<S, P> Coordinator<S, P>
where
    S: RoomStore,
    P: SentenceProvider,
{
    pub fn with_parts(store: S, sentences: P, config: CoordinatorConfig) -> Self {
        Self {
            store,
            sentences,
            config,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Looks up a room without side effects.
    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.store.get(id)
    }

    /// Applies one client action and returns its effects.
    ///
    /// Rejected actions are logged at `debug` and produce no effects;
    /// nothing is ever reported back to the sender.
    pub fn dispatch(&mut self, sender: PlayerId, action: ClientAction) -> Vec<Effect> {
        let name = action.name();
        match self.handle(sender, action) {
            Ok(effects) => effects,
            Err(e) => {
                debug!(player_id = %sender, action = name, reason = %e, "action ignored");
                Vec::new()
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch), but returns why an action was
    /// ignored.
    pub fn handle(
        &mut self,
        sender: PlayerId,
        action: ClientAction,
    ) -> Result<Vec<Effect>, RoomError> {
        match action {
            ClientAction::CreateRoom { room_id } => self.create_room(sender, room_id),
            ClientAction::JoinRoom { room_id, name } => {
                self.join_room(sender, room_id, &name)
            }
            ClientAction::StartGame {
                room_id,
                total_rounds,
            } => self.start_game(sender, room_id, &total_rounds),
            ClientAction::SubmitScore { room_id, score } => {
                self.submit_score(sender, room_id, &score)
            }
            ClientAction::ReadyForNextRound { room_id } => {
                self.ready_for_next_round(room_id)
            }
            ClientAction::EndGame { room_id } => self.end_game(room_id),
            ClientAction::LeaveRoom { room_id } => self.leave_room(sender, room_id),
        }
    }

    // -----------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------

    /// Creates the room if unseen and makes `sender` its host.
    ///
    /// An existing room's host is replaced: the last creator wins.
    pub fn create_room(
        &mut self,
        sender: PlayerId,
        room_id: RoomId,
    ) -> Result<Vec<Effect>, RoomError> {
        require_room_id(&room_id)?;
        let room = self.store.ensure_room(&room_id);
        room.set_host(sender);
        info!(room_id = %room_id, host = %sender, "room host set");
        Ok(Vec::new())
    }

    /// Subscribes `sender` to the room, adds them as a player, and
    /// broadcasts the roster.
    ///
    /// A room first seen here has no host.
    pub fn join_room(
        &mut self,
        sender: PlayerId,
        room_id: RoomId,
        name: &str,
    ) -> Result<Vec<Effect>, RoomError> {
        require_room_id(&room_id)?;
        if name.is_empty() {
            return Err(RoomError::MissingName);
        }

        let room = self.store.ensure_room(&room_id);
        if room.add_player(sender, name) {
            info!(room_id = %room_id, player_id = %sender, name, "player joined");
        }
        let roster = room.scoreboard();

        Ok(vec![
            Effect::Subscribe {
                room_id: room_id.clone(),
                player_id: sender,
            },
            Effect::broadcast(&room_id, ServerEvent::RoomUpdate(roster)),
        ])
    }

    /// Starts (or restarts) the game.
    ///
    /// Only the host may start when a host is set. Cancels any pending
    /// advance from a previous game.
    pub fn start_game(
        &mut self,
        sender: PlayerId,
        room_id: RoomId,
        total_rounds: &LooseNumber,
    ) -> Result<Vec<Effect>, RoomError> {
        let room = self
            .store
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        if !room.may_start(sender) {
            return Err(RoomError::NotHost {
                player: sender,
                room: room_id,
            });
        }

        let total = total_rounds.round_count();
        room.start_game(total, self.sentences.next_sentence());
        info!(
            room_id = %room_id,
            total_rounds = total,
            players = room.players().len(),
            "game started"
        );

        Ok(vec![
            Effect::cancel(&room_id),
            Effect::broadcast(&room_id, ServerEvent::GameStarted(room.round_info())),
            Effect::broadcast(&room_id, ServerEvent::ScoreUpdate(room.scoreboard())),
        ])
    }

    /// Adds a round score for `sender` and broadcasts the scoreboard.
    ///
    /// Schedules the delayed advance once the round settles.
    pub fn submit_score(
        &mut self,
        sender: PlayerId,
        room_id: RoomId,
        score: &LooseNumber,
    ) -> Result<Vec<Effect>, RoomError> {
        let room = self
            .store
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let delta = score.finite_score();
        if !room.record_score(sender, delta) {
            return Err(RoomError::NotInRoom(sender, room_id));
        }
        debug!(
            room_id = %room_id,
            player_id = %sender,
            delta,
            round = room.round(),
            submitted = room.submitted_count(),
            "score submitted"
        );

        let mut effects = vec![Effect::broadcast(
            &room_id,
            ServerEvent::ScoreUpdate(room.scoreboard()),
        )];
        if room.is_settled() && room.mark_advance_scheduled() {
            effects.push(Effect::ScheduleAdvance {
                room_id: room_id.clone(),
                round: room.round(),
                delay: self.config.round_advance_delay,
            });
        }
        Ok(effects)
    }

    /// Counts one readiness acknowledgement.
    ///
    /// Advances immediately once the round settles, otherwise broadcasts
    /// the roster. Acknowledgements are not deduplicated by sender.
    pub fn ready_for_next_round(
        &mut self,
        room_id: RoomId,
    ) -> Result<Vec<Effect>, RoomError> {
        let room = self
            .store
            .get_mut(&room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        room.record_ready();

        if room.is_settled() {
            let mut effects = vec![Effect::cancel(&room_id)];
            effects.extend(self.advance(&room_id)?);
            Ok(effects)
        } else {
            Ok(vec![Effect::broadcast(
                &room_id,
                ServerEvent::RoomUpdate(room.scoreboard()),
            )])
        }
    }

    /// Broadcasts game over with the current scoreboard.
    ///
    /// Round state is left untouched; a pending advance is cancelled.
    pub fn end_game(&mut self, room_id: RoomId) -> Result<Vec<Effect>, RoomError> {
        let room = self
            .store
            .get(&room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        info!(room_id = %room_id, round = room.round(), "game ended by request");
        Ok(vec![
            Effect::cancel(&room_id),
            Effect::broadcast(&room_id, ServerEvent::GameOver(room.scoreboard())),
        ])
    }

    /// Removes `sender` from one room, keeping the connection open.
    pub fn leave_room(
        &mut self,
        sender: PlayerId,
        room_id: RoomId,
    ) -> Result<Vec<Effect>, RoomError> {
        require_room_id(&room_id)?;
        if !self.store.contains(&room_id) {
            return Err(RoomError::NotFound(room_id));
        }
        self.remove_from(&room_id, sender)
            .ok_or(RoomError::NotInRoom(sender, room_id))
    }

    /// Removes a closed connection from every room it was in.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Vec<Effect> {
        let mut effects = Vec::new();
        for room_id in self.store.room_ids() {
            if let Some(removed) = self.remove_from(&room_id, player_id) {
                effects.extend(removed);
            }
        }
        effects
    }

    /// Runs the delayed advance scheduled for `(room_id, round)`.
    ///
    /// Rejected as stale if the room has moved on since scheduling: it
    /// was deleted, restarted, or advanced by readiness.
    pub fn advance_due(
        &mut self,
        room_id: &RoomId,
        round: u32,
    ) -> Result<Vec<Effect>, RoomError> {
        let room = self
            .store
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        if room.round() != round || !room.advance_scheduled() {
            return Err(RoomError::StaleAdvance {
                room: room_id.clone(),
                round,
            });
        }
        self.advance(room_id)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// The round-advance transition plus its broadcast.
    fn advance(&mut self, room_id: &RoomId) -> Result<Vec<Effect>, RoomError> {
        let room = self
            .store
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let sentences = &mut self.sentences;

        match room.advance(|| sentences.next_sentence()) {
            Advance::NextRound {
                round,
                total_rounds,
            } => {
                info!(room_id = %room_id, round, total_rounds, "round advanced");
                Ok(vec![Effect::broadcast(
                    room_id,
                    ServerEvent::NextRound(room.round_info()),
                )])
            }
            Advance::GameOver => {
                info!(room_id = %room_id, players = room.players().len(), "game over");
                Ok(vec![Effect::broadcast(
                    room_id,
                    ServerEvent::GameOver(room.scoreboard()),
                )])
            }
        }
    }

    /// Takes a player out of one room: drops them from the roster and
    /// releases the host if they held it, joined or not. A room whose
    /// roster ends up empty is deleted.
    ///
    /// If the departure settles a round in progress, the delayed advance
    /// is scheduled as if the last submission had just arrived.
    ///
    /// Returns `None` if the player neither played in nor hosted the room.
    fn remove_from(&mut self, room_id: &RoomId, player_id: PlayerId) -> Option<Vec<Effect>> {
        let room = self.store.get_mut(room_id)?;
        let was_host = room.release_host(player_id);
        let removed = room.remove_player(player_id);

        let mut effects = Vec::new();
        match &removed {
            Some(player) => {
                info!(room_id = %room_id, player_id = %player_id, name = %player.name, "player left");
                effects.push(Effect::Unsubscribe {
                    room_id: room_id.clone(),
                    player_id,
                });
            }
            None if was_host => info!(room_id = %room_id, host = %player_id, "host released"),
            None => return None,
        }

        if room.is_empty() {
            self.store.delete(room_id);
            effects.push(Effect::cancel(room_id));
        } else if removed.is_some() {
            effects.push(Effect::broadcast(
                room_id,
                ServerEvent::RoomUpdate(room.scoreboard()),
            ));
            if room.phase().is_active()
                && room.submitted_count() > 0
                && room.is_settled()
                && room.mark_advance_scheduled()
            {
                effects.push(Effect::ScheduleAdvance {
                    room_id: room_id.clone(),
                    round: room.round(),
                    delay: self.config.round_advance_delay,
                });
            }
        }
        Some(effects)
    }
}

fn require_room_id(room_id: &RoomId) -> Result<(), RoomError> {
    if room_id.is_empty() {
        Err(RoomError::MissingRoomId)
    } else {
        Ok(())
    }
}
