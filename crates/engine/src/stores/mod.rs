//! In-memory session state.

mod games;

pub use games::{GameDirectory, GameSession, DEFAULT_SESSION};
