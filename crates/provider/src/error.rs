//! Error types for the Bitbucket provider

use thiserror::Error;

/// Result type alias using the provider Error
pub type Result<T> = std::result::Result<T, Error>;

/// Provider error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected format of ID ({0:?}), expected WORKSPACE-ID/GROUP-SLUG-ID")]
    InvalidIdentity(String),

    #[error("{method} {path} failed with status {status}: {body}")]
    Remote {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("error reading {0}: empty response")]
    EmptyResponse(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot import non-existent remote object: {0}")]
    ImportNotFound(String),

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("State encoding error: {0}")]
    StateEncoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::StateEncoding(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::StateEncoding(e.to_string())
    }
}

impl Error {
    /// True when the remote API answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Remote { status: 404, .. })
    }
}
