//! crates/creator_studio_core/src/error.rs
//!
//! The typed failure taxonomy for the creation pipeline. Every request ends
//! in exactly one of these (or a creation), and the web layer maps each
//! variant onto the uniform response envelope.

use crate::ports::PortError;

/// The ways a generation or interaction request can fail.
///
/// Display strings double as the user-visible messages for the variants that
/// are safe to show; `Provider` and `Persistence` carry internal detail that
/// the web layer logs but never forwards verbatim.
#[derive(Debug, thiserror::Error)]
pub enum CreationError {
    /// A plan-gated operation was attempted by a non-premium caller.
    #[error("This feature is only available for premium subscription.")]
    PremiumRequired,

    /// The free-tier standing limit has been reached.
    #[error("Limit reached. Upgrade to continue.")]
    QuotaExceeded,

    /// Missing, malformed, or oversized input, rejected before any provider
    /// call.
    #[error("{0}")]
    Validation(String),

    /// A generation or edit backend failed or returned an unusable result.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The creation could not be durably stored.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The referenced creation does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl CreationError {
    /// Conversion used at the store boundary, where `NotFound` keeps its
    /// meaning and everything else is a persistence failure.
    pub fn from_store(err: PortError) -> Self {
        match err {
            PortError::NotFound(msg) => Self::NotFound(msg),
            PortError::Provider(msg) | PortError::Unexpected(msg) => Self::Persistence(msg),
        }
    }

    /// Conversion used at the provider boundary; every failure there is a
    /// provider failure no matter how the adapter classified it.
    pub fn from_provider(err: PortError) -> Self {
        match err {
            PortError::NotFound(msg)
            | PortError::Provider(msg)
            | PortError::Unexpected(msg) => Self::Provider(msg),
        }
    }
}
