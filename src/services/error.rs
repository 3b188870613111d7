//! Errors surfaced by publication processing.

use std::path::PathBuf;

use thiserror::Error;

use super::metadata::MetadataError;
use crate::ocr::ToolError;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Failed to remove {path}: {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize artifact: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProcessError {
    /// Whether an external tool caused the failure.
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, ProcessError::Tool(_))
    }
}
