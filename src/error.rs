//! Simulation error type
//!
//! Only construction, configuration and state restoration can fail. Per-tick
//! code absorbs its own problems and never returns these.

use thiserror::Error;

/// Which controller a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Target,
}

#[derive(Debug, Error)]
pub enum SimError {
    /// Targets need a threat to flee from; a world without a player cannot run.
    #[error("no player registered: targets require a player to flee from")]
    MissingPlayer,

    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// A raw state code outside the controller's enum.
    #[error("{actor:?} state code {code} is out of range")]
    InvalidState { actor: ActorKind, code: u8 },

    #[error("failed to parse settings: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
