//! Error handling module

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TurboError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resolution failed: {0}")]
    Resolution(String),

    #[error("Update failed: {0}")]
    Update(String),

    #[error("Listing failed: {0}")]
    Listing(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TurboError {
    /// Short tag used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            TurboError::Auth(_) => "auth",
            TurboError::Resolution(_) => "resolution",
            TurboError::Update(_) => "update",
            TurboError::Listing(_) => "listing",
            TurboError::Transport(_) => "transport",
            TurboError::Config(_) => "config",
        }
    }
}

pub type TurboResult<T> = Result<T, TurboError>;
