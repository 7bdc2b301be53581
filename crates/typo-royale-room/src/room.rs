//! Room and player records.
//!
//! A [`Room`] is plain data: its players in join order, the host, the
//! round phase, the active prompt, and the submission counter. All
//! mutation goes through methods here so the membership invariants (no
//! duplicate identities, host cleared on departure) hold in one place.

use typo_royale_protocol::{PlayerId, RoomId, RoundInfo, ScoreEntry};

use crate::config::{Advance, RoundPhase};

/// One player in a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// The player's connection identity.
    pub id: PlayerId,
    /// Display name, as given at join time.
    pub name: String,
    /// Accumulated score since the last game start.
    pub score: f64,
}

impl Player {
    fn entry(&self) -> ScoreEntry {
        ScoreEntry {
            id: self.id,
            name: self.name.clone(),
            score: self.score,
        }
    }
}

/// A game session.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    players: Vec<Player>,
    host_id: Option<PlayerId>,
    phase: RoundPhase,
    current_sentence: String,
    submitted_count: usize,
    /// Set once the delayed advance for the current round is scheduled,
    /// so further submissions in the same round cannot schedule another.
    advance_scheduled: bool,
}

impl Room {
    /// A fresh, empty room in the lobby.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            players: Vec::new(),
            host_id: None,
            phase: RoundPhase::Lobby,
            current_sentence: String::new(),
            submitted_count: 0,
            advance_scheduled: false,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn host_id(&self) -> Option<PlayerId> {
        self.host_id
    }

    pub fn set_host(&mut self, id: PlayerId) {
        self.host_id = Some(id);
    }

    /// Whether `caller` may start the game: anyone when no host is set,
    /// otherwise only the host.
    pub fn may_start(&self, caller: PlayerId) -> bool {
        self.host_id.is_none_or(|host| host == caller)
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// 0 before the first start, otherwise the 1-based round.
    pub fn round(&self) -> u32 {
        self.phase.round()
    }

    pub fn total_rounds(&self) -> u32 {
        self.phase.total_rounds()
    }

    pub fn current_sentence(&self) -> &str {
        &self.current_sentence
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted_count
    }

    pub fn advance_scheduled(&self) -> bool {
        self.advance_scheduled
    }

    /// Every player has submitted or acknowledged the current round.
    pub fn is_settled(&self) -> bool {
        self.submitted_count >= self.players.len()
    }

    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    /// Appends a player with score 0 unless `id` is already present.
    ///
    /// An empty `name` falls back to the identity string. Returns `true`
    /// if the player was added.
    pub fn add_player(&mut self, id: PlayerId, name: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        let name = if name.is_empty() {
            id.to_string()
        } else {
            name.to_string()
        };
        self.players.push(Player {
            id,
            name,
            score: 0.0,
        });
        true
    }

    /// Removes a player by identity, keeping the others in order.
    ///
    /// Clears the host if the departing player held it. The submission
    /// counter never exceeds the remaining player count.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        let removed = self.players.remove(idx);
        self.release_host(id);
        self.submitted_count = self.submitted_count.min(self.players.len());
        Some(removed)
    }

    /// Clears the host if `id` holds it, whether or not `id` ever joined.
    ///
    /// Returns `true` if the host was cleared.
    pub fn release_host(&mut self, id: PlayerId) -> bool {
        if self.host_id == Some(id) {
            self.host_id = None;
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------
    // Game progression
    // -----------------------------------------------------------------

    /// Starts (or restarts) a game: round 1, every score zeroed, counter
    /// reset, fresh prompt.
    pub fn start_game(&mut self, total_rounds: u32, sentence: String) {
        self.phase = RoundPhase::started(total_rounds);
        for player in &mut self.players {
            player.score = 0.0;
        }
        self.submitted_count = 0;
        self.advance_scheduled = false;
        self.current_sentence = sentence;
    }

    /// Adds `delta` to a player's score and counts the submission.
    ///
    /// A delta that would push the total out of finite range is dropped;
    /// the submission still counts. Returns `false` (and counts nothing)
    /// if `id` is not in the room.
    pub fn record_score(&mut self, id: PlayerId, delta: f64) -> bool {
        let Some(player) = self.player_mut(id) else {
            return false;
        };
        let total = player.score + delta;
        if total.is_finite() {
            player.score = total;
        }
        self.submitted_count += 1;
        true
    }

    /// Counts one readiness acknowledgement. No identity check.
    pub fn record_ready(&mut self) {
        self.submitted_count += 1;
    }

    /// Marks the delayed advance as scheduled for this round.
    ///
    /// Returns `false` if it already was.
    pub fn mark_advance_scheduled(&mut self) -> bool {
        !std::mem::replace(&mut self.advance_scheduled, true)
    }

    /// Applies the round-advance transition.
    ///
    /// On a new round, `next_sentence` is called for the prompt and the
    /// counter resets. On game over (including an advance straight from
    /// the lobby) the prompt and counter are left as they are. Any
    /// scheduled advance is consumed either way.
    pub fn advance(
        &mut self,
        next_sentence: impl FnOnce() -> String,
    ) -> Advance {
        let (phase, outcome) = self.phase.advance();
        self.phase = phase;
        self.advance_scheduled = false;
        match outcome {
            Advance::NextRound { .. } => {
                self.current_sentence = next_sentence();
                self.submitted_count = 0;
            }
            Advance::GameOver => {}
        }
        outcome
    }

    // -----------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------

    /// Players as `{id, name, score}` in join order.
    pub fn scoreboard(&self) -> Vec<ScoreEntry> {
        self.players.iter().map(Player::entry).collect()
    }

    /// The prompt and position of the current round.
    pub fn round_info(&self) -> RoundInfo {
        RoundInfo {
            sentence: self.current_sentence.clone(),
            round: self.round(),
            total: self.total_rounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn room() -> Room {
        Room::new(RoomId::from("R1"))
    }

    #[test]
    fn test_new_room_is_empty_lobby() {
        let room = room();
        assert!(room.is_empty());
        assert_eq!(room.host_id(), None);
        assert_eq!(room.round(), 0);
        assert_eq!(room.total_rounds(), 1);
        assert_eq!(room.current_sentence(), "");
        assert_eq!(room.submitted_count(), 0);
    }

    #[test]
    fn test_add_player_ignores_duplicate_identity() {
        let mut room = room();
        assert!(room.add_player(pid(1), "Alice"));
        assert!(!room.add_player(pid(1), "Alice again"));
        assert_eq!(room.players().len(), 1);
        assert_eq!(room.players()[0].name, "Alice");
    }

    #[test]
    fn test_add_player_defaults_name_to_identity() {
        let mut room = room();
        room.add_player(pid(9), "");
        assert_eq!(room.players()[0].name, "P-9");
    }

    #[test]
    fn test_remove_player_preserves_order() {
        let mut room = room();
        room.add_player(pid(1), "a");
        room.add_player(pid(2), "b");
        room.add_player(pid(3), "c");

        let removed = room.remove_player(pid(2)).unwrap();
        assert_eq!(removed.name, "b");
        let ids: Vec<_> = room.players().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![pid(1), pid(3)]);
        assert!(room.remove_player(pid(2)).is_none());
    }

    #[test]
    fn test_remove_host_clears_host() {
        let mut room = room();
        room.add_player(pid(1), "a");
        room.add_player(pid(2), "b");
        room.set_host(pid(1));

        room.remove_player(pid(2));
        assert_eq!(room.host_id(), Some(pid(1)));
        room.remove_player(pid(1));
        assert_eq!(room.host_id(), None);
    }

    #[test]
    fn test_release_host_without_membership() {
        let mut room = room();
        room.set_host(pid(1));
        assert!(!room.release_host(pid(2)));
        assert!(room.release_host(pid(1)));
        assert_eq!(room.host_id(), None);
        assert!(room.may_start(pid(2)));
    }

    #[test]
    fn test_remove_player_clamps_submission_count() {
        let mut room = room();
        room.add_player(pid(1), "a");
        room.add_player(pid(2), "b");
        room.start_game(2, "s1".into());
        room.record_score(pid(1), 1.0);
        room.record_score(pid(2), 1.0);
        assert_eq!(room.submitted_count(), 2);

        room.remove_player(pid(2));
        assert_eq!(room.submitted_count(), 1);
        assert!(room.is_settled());
    }

    #[test]
    fn test_record_score_keeps_total_finite() {
        let mut room = room();
        room.add_player(pid(1), "a");
        room.start_game(1, "s1".into());
        assert!(room.record_score(pid(1), 1.0e308));
        assert!(room.record_score(pid(1), 1.0e308));
        assert_eq!(room.players()[0].score, 1.0e308);
        assert_eq!(room.submitted_count(), 2);

        room.record_score(pid(1), -1.0e308);
        assert_eq!(room.players()[0].score, 0.0);
    }

    #[test]
    fn test_advance_from_lobby_is_game_over() {
        let mut room = room();
        room.add_player(pid(1), "a");
        room.record_ready();

        let outcome = room.advance(|| panic!("no prompt drawn from the lobby"));
        assert_eq!(outcome, Advance::GameOver);
        assert_eq!(room.round(), 0);
        assert_eq!(room.submitted_count(), 1);
    }

    #[test]
    fn test_may_start_without_host() {
        let mut room = room();
        assert!(room.may_start(pid(5)));
        room.set_host(pid(1));
        assert!(room.may_start(pid(1)));
        assert!(!room.may_start(pid(5)));
    }

    #[test]
    fn test_start_game_resets_scores_and_counter() {
        let mut room = room();
        room.add_player(pid(1), "a");
        room.start_game(2, "first".into());
        room.record_score(pid(1), 12.0);
        assert_eq!(room.submitted_count(), 1);

        room.start_game(3, "again".into());
        assert_eq!(room.players()[0].score, 0.0);
        assert_eq!(room.submitted_count(), 0);
        assert_eq!(room.round(), 1);
        assert_eq!(room.total_rounds(), 3);
        assert_eq!(room.current_sentence(), "again");
    }

    #[test]
    fn test_record_score_unknown_player() {
        let mut room = room();
        assert!(!room.record_score(pid(1), 5.0));
        assert_eq!(room.submitted_count(), 0);
    }

    #[test]
    fn test_mark_advance_scheduled_once_per_round() {
        let mut room = room();
        room.add_player(pid(1), "a");
        room.start_game(2, "s1".into());
        assert!(room.mark_advance_scheduled());
        assert!(!room.mark_advance_scheduled());

        room.advance(|| "s2".into());
        assert!(!room.advance_scheduled());
        assert!(room.mark_advance_scheduled());
    }

    #[test]
    fn test_advance_to_next_round_draws_prompt() {
        let mut room = room();
        room.add_player(pid(1), "a");
        room.start_game(2, "s1".into());
        room.record_score(pid(1), 1.0);

        let outcome = room.advance(|| "s2".into());
        assert_eq!(
            outcome,
            Advance::NextRound {
                round: 2,
                total_rounds: 2
            }
        );
        assert_eq!(room.current_sentence(), "s2");
        assert_eq!(room.submitted_count(), 0);
        assert_eq!(room.round_info().round, 2);
    }

    #[test]
    fn test_advance_on_last_round_keeps_prompt() {
        let mut room = room();
        room.add_player(pid(1), "a");
        room.start_game(1, "only".into());
        room.record_score(pid(1), 4.0);

        let outcome = room.advance(|| panic!("no prompt needed at game over"));
        assert_eq!(outcome, Advance::GameOver);
        assert_eq!(room.current_sentence(), "only");
        assert_eq!(room.submitted_count(), 1);
        assert_eq!(room.round(), 1);
    }

    #[test]
    fn test_scoreboard_in_join_order() {
        let mut room = room();
        room.add_player(pid(2), "Bob");
        room.add_player(pid(1), "Alice");
        let board = room.scoreboard();
        assert_eq!(board[0].name, "Bob");
        assert_eq!(board[1].name, "Alice");
    }
}
