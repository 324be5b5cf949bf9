//! Error types for the document kernel and configuration

use thiserror::Error;

/// An edit the document kernel refused to apply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("position {position} is outside the document (size {size})")]
    OutOfRange { position: usize, size: usize },

    #[error("position {position} is not inside a text block")]
    NotInTextBlock { position: usize },

    #[error("position {position} is not a top-level block boundary")]
    NotABoundary { position: usize },

    #[error("cannot delete {start}..{end}: the range must stay inside one text block or cover whole top-level blocks")]
    UnsupportedRange { start: usize, end: usize },

    #[error("block at {position} cannot be turned into a {kind}")]
    KindMismatch { position: usize, kind: &'static str },
}

/// Invalid or unparsable session configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be a positive finite number, got {value}")]
    InvalidDimension { field: &'static str, value: f32 },

    #[error("margins of {margin}px leave no content area on a {width}x{height}px page")]
    NoContentArea { margin: f32, width: f32, height: f32 },
}
