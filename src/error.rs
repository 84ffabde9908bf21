//! Error kinds surfaced by the core to its embedder.

use thiserror::Error;

/// Errors produced by the coordination core.
///
/// Construction failures leave no residual state; a `publish_with_future`
/// failure rolls back any future registration (see
/// [`crate::node::Node::publish_with_future`]).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("capacity exhausted: {0}")]
    Capacity(String),

    #[error("invalid or non-unique name: {0}")]
    Name(String),

    #[error("operation requires a node-ID, which this node does not have")]
    Anonymous,

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for fallible core operations.
pub type CoreResult<T> = Result<T, CoreError>;
