//! Error type for strict option access.
//!
//! The permissive accessors never fail. [`ArgError`] is only produced by
//! [`ArgTable::try_get_arg`](crate::ArgTable::try_get_arg), for hosts that
//! want to reject malformed values instead of coercing them.

use thiserror::Error;

/// Errors raised by strict option access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// The stored value could not be converted to the requested type.
    #[error("invalid value '{value}' for option {name}: {reason}")]
    InvalidValue {
        /// Normalized option name (e.g. `-port`).
        name: String,
        /// Raw stored value.
        value: String,
        /// Message from the target type's parser.
        reason: String,
    },
}

/// Convenience alias for results with [`ArgError`].
pub type Result<T> = std::result::Result<T, ArgError>;
