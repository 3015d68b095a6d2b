//! The game-state machine.
//!
//! Single authoritative record of roster, turn pointer, phase, and the last
//! host reply for one game session. All transitions are synchronous; callers
//! wrap the state in whatever synchronization the runtime needs.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::player::Player;

/// Mutable state of one party game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Players in join order; join order is turn order.
    pub players: Vec<Player>,
    /// Index into `players`. Meaningful only once `game_started` is true.
    pub current_player_index: usize,
    /// Monotonic: flips false -> true at most once per session.
    pub game_started: bool,
    /// Last full reply produced by the text-generation backend, embedded in
    /// the next prompt so the host never repeats itself.
    pub last_ai_message: String,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new, not-yet-introduced player.
    ///
    /// Names are unique under case-insensitive comparison; re-adding an
    /// existing name is rejected rather than silently ignored so the caller
    /// can tell the two situations apart.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        if self.players.iter().any(|p| p.is_named(&name)) {
            return Err(DomainError::duplicate_name(name));
        }
        self.players.push(Player::new(name));
        Ok(())
    }

    /// Mark the most recently added player as introduced.
    ///
    /// The host introduces the game one player at a time, so a readiness
    /// utterance always addresses the newest joiner. No-op on an empty
    /// roster.
    pub fn mark_last_joined_ready(&mut self) {
        if let Some(last) = self.players.last_mut() {
            last.introduced = true;
        }
    }

    /// Flip `game_started` if the start invariant holds: at least two
    /// players, every one of them introduced. Returns the (possibly new)
    /// started flag. Never reverts a started game.
    pub fn try_start(&mut self) -> bool {
        if !self.game_started
            && self.players.len() >= 2
            && self.players.iter().all(|p| p.introduced)
        {
            self.game_started = true;
        }
        self.game_started
    }

    /// Move the turn pointer to the next player, wrapping around.
    ///
    /// No-op before the game starts or on an empty roster.
    pub fn advance_turn(&mut self) {
        if self.game_started && !self.players.is_empty() {
            self.current_player_index = (self.current_player_index + 1) % self.players.len();
        }
    }

    /// Record the backend's latest full reply.
    pub fn record_ai_message(&mut self, text: impl Into<String>) {
        self.last_ai_message = text.into();
    }

    /// The player whose turn it is, or None before the game starts.
    pub fn current_player(&self) -> Option<&Player> {
        if self.game_started {
            self.players.get(self.current_player_index)
        } else {
            None
        }
    }

    /// Player names in turn order.
    pub fn roster(&self) -> Vec<&str> {
        self.players.iter().map(|p| p.name.as_str()).collect()
    }
}
