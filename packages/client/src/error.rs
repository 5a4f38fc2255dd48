//! Top-level client errors.

use thiserror::Error;

use crate::{
    config::ConfigError,
    domain::{ChannelError, RepositoryError},
    ui::template::TemplateError,
    usecase::SessionError,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open persistence backend: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("terminal input failed: {0}")]
    Input(String),
}
