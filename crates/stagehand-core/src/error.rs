//! Error types for Stagehand

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("duplicate resource name: {0}")]
    DuplicateResource(String),

    #[error("duplicate command `{command}` on resource `{resource}`")]
    DuplicateCommand { resource: String, command: String },

    #[error("endpoint `{endpoint}` on resource `{resource}` is already allocated")]
    AlreadyAllocated { resource: String, endpoint: String },

    #[error("unknown endpoint `{endpoint}` on resource `{resource}`")]
    UnknownEndpoint { resource: String, endpoint: String },

    #[error("connection string `{0}` is missing")]
    MissingConnectionString(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("command `{command}` not found on resource `{resource}`")]
    CommandNotFound { resource: String, command: String },

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("executor error: {0}")]
    Executor(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn duplicate_command(resource: impl Into<String>, command: impl Into<String>) -> Self {
        Self::DuplicateCommand {
            resource: resource.into(),
            command: command.into(),
        }
    }

    pub fn executor(message: impl Into<String>) -> Self {
        Self::Executor(message.into())
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled(message.into())
    }
}
