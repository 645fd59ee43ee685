//! Error taxonomy for the picsweep session

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PicsweepError {
    /// The terminal reported dimensions the layout engine cannot work with:
    /// zero columns/rows, or no pixel-size report at all. Recoverable by
    /// retrying once the terminal reports usable metrics.
    #[error("terminal metrics unusable: {detail}")]
    DegenerateMetrics { detail: String },

    /// A decision was applied to a member that is not Pending, or to a path
    /// that is not part of the batch. This is a contract violation and is
    /// never silently ignored.
    #[error("invalid decision transition for {path}: {detail}")]
    InvalidTransition { path: PathBuf, detail: String },

    /// The trash collaborator could not move the file. The member's decision
    /// state is left unchanged so the user can retry or choose differently.
    #[error("failed to move {path} to trash: {source}")]
    TrashFailed {
        path: PathBuf,
        #[source]
        source: trash::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PicsweepError>;

impl PicsweepError {
    pub fn degenerate(detail: impl Into<String>) -> Self {
        PicsweepError::DegenerateMetrics {
            detail: detail.into(),
        }
    }

    pub fn invalid_transition(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        PicsweepError::InvalidTransition {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
