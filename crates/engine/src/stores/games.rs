//! Session-keyed game state.
//!
//! Each session id maps to its own [`GameSession`]; callers that send no
//! session id all share [`DEFAULT_SESSION`]. A session also tracks the one
//! in-flight backend call made on its behalf, so a newer turn can cancel a
//! stale one.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use emcee_domain::GameState;

/// Session id used when the caller does not supply one.
pub const DEFAULT_SESSION: &str = "default";

/// Directory of live game sessions.
#[derive(Default)]
pub struct GameDirectory {
    sessions: DashMap<String, Arc<GameSession>>,
}

impl GameDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the session for the given id.
    pub fn session(&self, id: &str) -> Arc<GameSession> {
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(GameSession::new()))
            .clone()
    }
}

/// One game's state plus its in-flight turn registration.
pub struct GameSession {
    state: Mutex<GameState>,
    in_flight: Mutex<Option<InFlightTurn>>,
}

struct InFlightTurn {
    id: Uuid,
    token: CancellationToken,
}

impl GameSession {
    fn new() -> Self {
        Self {
            state: Mutex::new(GameState::new()),
            in_flight: Mutex::new(None),
        }
    }

    /// Run `f` against the game state under the session lock.
    ///
    /// The lock is held only for the duration of `f`; never await inside.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> GameState {
        self.with_state(|state| state.clone())
    }

    /// Register a new turn, cancelling any prior in-flight backend call for
    /// this session. Returns the turn id and its fresh cancellation token.
    pub fn begin_turn(&self) -> (Uuid, CancellationToken) {
        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        let mut guard = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(prior) = guard.replace(InFlightTurn {
            id,
            token: token.clone(),
        }) {
            prior.token.cancel();
        }
        (id, token)
    }

    /// Deregister a finished turn.
    ///
    /// A stale turn (already replaced by a newer one) leaves the newer
    /// registration untouched.
    pub fn finish_turn(&self, turn_id: Uuid) {
        let mut guard = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref().is_some_and(|t| t.id == turn_id) {
            *guard = None;
        }
    }

    #[cfg(test)]
    pub fn in_flight_turn(&self) -> Option<Uuid> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_do_not_share_state() {
        let directory = GameDirectory::new();
        directory
            .session("living-room")
            .with_state(|state| state.add_player("Alice"))
            .expect("add");

        assert_eq!(directory.session("kitchen").snapshot().players.len(), 0);
        assert_eq!(directory.session("living-room").snapshot().players.len(), 1);
    }

    #[test]
    fn test_same_id_returns_same_session() {
        let directory = GameDirectory::new();
        directory
            .session(DEFAULT_SESSION)
            .with_state(|state| state.add_player("Alice"))
            .expect("add");

        let roster = directory.session(DEFAULT_SESSION).snapshot();
        assert_eq!(roster.players[0].name, "Alice");
    }

    #[test]
    fn test_begin_turn_cancels_prior_in_flight_call() {
        let directory = GameDirectory::new();
        let session = directory.session(DEFAULT_SESSION);

        let (_first_id, first_token) = session.begin_turn();
        assert!(!first_token.is_cancelled());

        let (_second_id, second_token) = session.begin_turn();
        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());
    }

    #[test]
    fn test_stale_finish_leaves_newer_registration() {
        let directory = GameDirectory::new();
        let session = directory.session(DEFAULT_SESSION);

        let (first_id, _first_token) = session.begin_turn();
        let (second_id, _second_token) = session.begin_turn();

        session.finish_turn(first_id);
        assert_eq!(session.in_flight_turn(), Some(second_id));

        session.finish_turn(second_id);
        assert_eq!(session.in_flight_turn(), None);
    }
}
