//! UseCase layer error definitions.

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// Errors surfaced to the session controller and the CLI
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation needs a logged-in user
    #[error("not logged in")]
    NotAuthenticated,

    /// User input failed validation
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValueObjectError),

    /// Credentials were rejected or the backend could not check them
    #[error("authentication failed: {0}")]
    Authentication(RepositoryError),

    /// Registration with a name that is already in use
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// A persistence adapter call failed
    #[error("persistence failed: {0}")]
    Persistence(RepositoryError),
}
