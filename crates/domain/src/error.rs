//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`IrrigoError`]
//! via `From`, so port boundaries only ever see this one enum.

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum IrrigoError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The program store failed (connection, query, decoding).
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The notification transport failed to accept a message.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A value failed a domain or wire-format invariant.
///
/// The `Display` output is the user-facing message sent back on the
/// notification topic, so it is kept short and stable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid action.")]
    InvalidAction,

    #[error("Missing id.")]
    MissingId,

    #[error("Invalid id.")]
    InvalidId,

    #[error("Missing program data.")]
    MissingProgram,

    #[error("Invalid or missing name.")]
    InvalidName,

    #[error("Invalid or missing zone.")]
    InvalidZone,

    #[error("Invalid active_day format.")]
    InvalidActiveDay,

    #[error("Invalid start_time format.")]
    InvalidStartTime,

    #[error("Invalid or missing duration.")]
    InvalidDuration,

    #[error("Invalid or missing is_active.")]
    InvalidIsActive,

    #[error("Invalid or missing is_running.")]
    InvalidIsRunning,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
