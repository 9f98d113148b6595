//! Viewer error types.
//!
//! Everything that can go wrong while bringing a model on screen folds into
//! [`ViewerError`]. All variants are recoverable: the shell reports them
//! through its status output and keeps running, so a missing or broken model
//! never takes the host application down.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    /// The host collaborator could not deliver the model bytes. Covers I/O
    /// failures, missing files and the configured load timeout.
    #[error("failed to fetch model `{name}`: {reason}")]
    Fetch { name: String, reason: String },

    /// The bytes arrived but were not a usable GLB payload. The viewer falls
    /// back to a placeholder scene when it sees this.
    #[error("failed to decode model `{name}`: {reason}")]
    Decode { name: String, reason: String },

    /// The GPU or window context could not be created.
    #[error("failed to initialize the render context: {0}")]
    Init(String),
}

impl ViewerError {
    pub fn fetch(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// True for decode failures, which degrade the scene instead of leaving
    /// it empty.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
