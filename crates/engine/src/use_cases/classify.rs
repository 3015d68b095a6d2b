//! Message classification: free text to at most one state mutation.
//!
//! Runs once per inbound request, before the backend call. Malformed or
//! ambiguous input is never an error - it classifies to
//! [`Classification::None`].

use emcee_domain::GameState;

/// The single mutation (if any) implied by one human message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Pre-game: the message introduced a new player name.
    AddPlayer(String),
    /// Pre-game: the newest joiner confirmed readiness.
    MarkReady,
    /// Post-start: any human message consumes the current turn.
    AdvanceTurn,
    /// No mutation.
    None,
}

/// Classifier seam. Implementations inspect the newest human message against
/// the current state and must be pure; [`apply`] performs the mutation.
pub trait TurnClassifier: Send + Sync {
    fn classify(&self, state: &GameState, message: &str) -> Classification;
}

const READY_KEYWORD: &str = "ready";

/// The shipped heuristic: last-token name extraction plus a "ready" keyword.
///
/// Deliberately naive - the last token of an arbitrary sentence is a weak
/// name signal, and this is not a named-entity recognizer. It lives behind
/// [`TurnClassifier`] so a better classifier can replace it without touching
/// the state machine.
pub struct HeuristicClassifier;

impl TurnClassifier for HeuristicClassifier {
    fn classify(&self, state: &GameState, message: &str) -> Classification {
        if state.game_started {
            return Classification::AdvanceTurn;
        }

        // Candidate name: the last whitespace-delimited token. The readiness
        // keyword never counts as a name, so "ready" falls through to the
        // readiness branch instead of enrolling a player called "ready".
        let candidate = message.split_whitespace().last().unwrap_or("");
        if candidate.len() > 1
            && !candidate.to_lowercase().contains(READY_KEYWORD)
            && !state.players.iter().any(|p| p.is_named(candidate))
        {
            return Classification::AddPlayer(candidate.to_string());
        }

        if message.to_lowercase().contains(READY_KEYWORD) {
            return Classification::MarkReady;
        }

        Classification::None
    }
}

/// Apply a classification to the state.
///
/// `AddPlayer` swallows the duplicate-name rejection (two raced turns can
/// classify the same name); `MarkReady` also evaluates the start invariant.
pub fn apply(classification: &Classification, state: &mut GameState) {
    match classification {
        Classification::AddPlayer(name) => {
            if let Err(err) = state.add_player(name.clone()) {
                tracing::debug!(error = %err, "ignoring repeated player introduction");
            }
        }
        Classification::MarkReady => {
            state.mark_last_joined_ready();
            state.try_start();
        }
        Classification::AdvanceTurn => state.advance_turn(),
        Classification::None => {}
    }
}
