use thiserror::Error;

/// Error type spanning the whole pipeline, build and search alike.
///
/// `QueueClosed` and `NoState` are internal signalling variants: a
/// well-behaved driver never lets either escape to a caller, but they are
/// part of the public enum because the cart queue (§4.2) is a public API
/// surface and must be able to report them.
#[derive(Debug, Error)]
pub enum FpgAlignError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("consistency error: {0}")]
    ConsistencyError(String),

    #[error("queue closed")]
    QueueClosed,

    #[error("no state available from queue")]
    NoState,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("alignment produced no traceback")]
    AlignmentEmpty,
}

pub type Result<T> = std::result::Result<T, FpgAlignError>;
