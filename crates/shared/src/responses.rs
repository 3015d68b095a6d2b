//! Response DTOs.

use serde::{Deserialize, Serialize};

use emcee_domain::Modifier;

/// Catalog entry as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierInfo {
    pub id: String,
    pub name: String,
    /// Default-enabled flag; the client owns the live toggle state.
    pub enabled: bool,
}

impl From<&Modifier> for ModifierInfo {
    fn from(m: &Modifier) -> Self {
        Self {
            id: m.id.to_string(),
            name: m.name.to_string(),
            enabled: m.default_enabled,
        }
    }
}
