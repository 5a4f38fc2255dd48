//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// Username too long error
    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// Password validation error
    #[error("Password cannot be empty")]
    PasswordEmpty,

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors raised by persistence adapters and user backends
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No entity with the given id in the collection
    #[error("{collection} with id {id} not found")]
    NotFound { collection: &'static str, id: u64 },

    /// Backend answered with a non-success HTTP status
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Network failure before a response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// Embedded store failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Entity could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Username and password did not match a known user
    #[error("invalid credentials for user '{0}'")]
    InvalidCredentials(String),
}

/// Errors raised by the realtime channel
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Server URL cannot be turned into a WebSocket URL
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    /// WebSocket handshake failed
    #[error("failed to connect realtime channel: {0}")]
    Connect(String),

    /// Outbound queue is gone because the transport closed
    #[error("realtime channel is closed")]
    Closed,
}
