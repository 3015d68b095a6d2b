//! Emcee Domain - Core types and invariants for the party-game host.
//!
//! This crate holds the game-state machine (roster, turn pointer, phase,
//! last host reply) and the static modifier catalog. Pure data and
//! transitions only - no I/O, no async.

pub mod error;
pub mod game;
pub mod modifier;
pub mod player;

pub use error::DomainError;
pub use game::GameState;
pub use modifier::{catalog, default_enabled_ids, Modifier};
pub use player::Player;
