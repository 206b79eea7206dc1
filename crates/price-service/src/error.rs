use thiserror::Error;

/// The stable error taxonomy shared by every coordinator operation.
///
/// Callers match on a single enum rather than a different error type per method; new
/// variants should only be added if a new *kind* of failure mode is needed, not a new
/// operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    // CALLER INPUT ERRORS
    // ---------------------------------------------------------------------------------------------
    /// A required parameter was missing, or an id/list that must be non-empty was empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // CALLER-OBSERVABLE STATE ERRORS
    // ---------------------------------------------------------------------------------------------
    /// The targeted batch does not exist, is not in the required state, or the service
    /// detected an internal id collision.
    #[error("illegal state: {0}")]
    IllegalState(String),

    // RESERVED
    // ---------------------------------------------------------------------------------------------
    /// Reserved for symmetry with the wider error taxonomy; no lookup in this crate raises
    /// it today (absent instruments are returned as missing entries, not errors), but it is
    /// kept as a variant so an embedding layer that does have a "not found" concept (e.g. a
    /// wire adapter resolving a 404) can share this enum instead of inventing a second one.
    #[error("not found: {0}")]
    NotFound(String),

    // INVARIANT VIOLATIONS
    // ---------------------------------------------------------------------------------------------
    /// An invariant the state machine is supposed to guarantee did not hold at runtime.
    /// Should be unreachable; treated as a bug if it ever surfaces.
    #[error("internal invariant violation: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
