//! Emcee Shared - Wire types exchanged between the engine and its clients.
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - serde plus the domain vocabulary
//! 2. **No business logic** - data types, serialization, and wire-format
//!    parsing only
//! 3. **Stable shapes** - new fields are additive; renames are breaking

pub mod messages;
pub mod responses;

pub use messages::{
    latest_enabled_mods, latest_user_message, ChatRequest, ChatRole, ChatTurn, MODS_UPDATED_PREFIX,
};
pub use responses::ModifierInfo;
