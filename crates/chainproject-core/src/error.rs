//! Error types for the projection pipeline.

use thiserror::Error;

/// Errors that can occur while registering or applying projections.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Projection already registered for {contract}.{event}")]
    DuplicateRegistration { contract: String, event: String },

    #[error("No projection registered for {contract}.{event}")]
    UnhandledEvent { contract: String, event: String },

    #[error("Malformed envelope for {contract}.{event}: {reason}")]
    MalformedEnvelope {
        contract: String,
        event: String,
        reason: String,
    },

    #[error("Projection for {contract}.{event} wrote {entity_type} '{written}', expected id '{expected}'")]
    ForeignEntityId {
        contract: String,
        event: String,
        entity_type: String,
        expected: String,
        written: String,
    },

    #[error("Event at {next:?} arrived after {previous:?} (block, log index)")]
    OutOfOrder {
        previous: (u64, u32),
        next: (u64, u32),
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectionError {
    /// Build a `MalformedEnvelope` error.
    pub fn malformed(
        contract: impl Into<String>,
        event: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedEnvelope {
            contract: contract.into(),
            event: event.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the caller may skip the event and continue.
    ///
    /// Only `UnhandledEvent` is recoverable; everything else is either a
    /// configuration defect or an upstream decode defect.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnhandledEvent { .. })
    }
}
