//! Player roster entry.

use serde::{Deserialize, Serialize};

/// A player in the current game.
///
/// Created when the inference engine recognizes a new name in a pre-game
/// message. `introduced` flips once the player confirms readiness; players
/// are never removed within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name. Unique under case-insensitive comparison.
    pub name: String,
    /// Whether the player has confirmed they are ready.
    pub introduced: bool,
}

impl Player {
    /// Create a new, not-yet-introduced player.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            introduced: false,
        }
    }

    /// Case-insensitive name match.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
