//! Error types of the crate.
use thiserror::Error;

/// Errors raised by the core components.
///
/// All variants are local, recoverable conditions. In particular, a training
/// loop receiving [`FringeError::InsufficientData`] is expected to skip the
/// optimization step and keep collecting transitions.
#[derive(Debug, Error)]
pub enum FringeError {
    /// A non-positive capacity, history length or batch size was given.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// More samples were requested than the buffer currently holds.
    #[error("insufficient data: requested {requested} transitions, {len} sampleable")]
    InsufficientData {
        /// The number of transitions that can currently be sampled.
        len: usize,
        /// The requested minibatch size.
        requested: usize,
    },

    /// A key was not found in a [`Record`](crate::record::Record).
    #[error("record key '{0}' was not found")]
    RecordKeyNotFound(String),

    /// A record value was accessed with a mismatched type.
    #[error("record value for key '{0}' has a mismatched type")]
    MismatchedRecordValue(String),
}
