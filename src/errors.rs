//! Typed error hierarchy for the pipeline board.
//!
//! - `PersistenceError`: failures of the remote stage gateway
//! - `BoardError`: configuration and session failures at the host level
//!
//! Drop rejections are not errors; see `board::drag::DropRejection`.

use thiserror::Error;

use crate::board::models::PipelineStage;

/// Errors from a `StageGateway` call.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Opportunity {id} not found")]
    NotFound { id: String },

    #[error("Opportunity id '{id}' is not a persistence identifier")]
    InvalidId { id: String },

    #[error("Invalid pipeline stage: {0}")]
    InvalidStage(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Injected failure for {id} -> {stage}")]
    Injected { id: String, stage: PipelineStage },
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

/// Host-level errors: loading configuration and session tokens.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Session error at {path}: {message}")]
    Session {
        path: std::path::PathBuf,
        message: String,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
