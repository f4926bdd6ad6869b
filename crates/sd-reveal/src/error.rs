//! Reveal-game error surface

use chrono::{DateTime, Utc};
use thiserror::Error;

use sd_backend::BackendError;

/// Errors the reveal game surfaces to its caller
#[derive(Error, Debug)]
pub enum RevealError {
    /// A new session may not start before the cooldown expires
    #[error("session cooldown active until {0}")]
    CooldownActive(DateTime<Utc>),

    /// A session is already in progress
    #[error("a session is already active")]
    SessionActive,

    /// The operation needs an active session
    #[error("no active session")]
    NoSession,

    /// Cash-out guard tripped
    #[error("cash-out unavailable: {0}")]
    CashOutUnavailable(&'static str),

    /// A backend call failed; no local state was committed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result alias for reveal-game operations
pub type RevealResult<T> = Result<T, RevealError>;
