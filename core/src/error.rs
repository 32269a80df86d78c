//! Error types shared by the core value types.

/// Errors raised while constructing or parsing core values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Bounds or parameters passed to a constructor are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A direction token outside north, south, east, west and center.
    #[error("unknown direction: {0:?}")]
    UnknownDirection(String),

    /// A dispatcher action string that does not name a known command.
    #[error("unrecognized action: {0:?}")]
    UnrecognizedAction(String),
}
