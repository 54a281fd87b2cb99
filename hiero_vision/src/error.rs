// THEORY:
// Every failure the engine can report lives in this one enum. Segmentation is
// deterministic, so none of these are retried internally: a malformed grid is
// rejected before any scan begins, and a rejected configuration is rejected
// before a pipeline exists. Finding zero glyphs is a valid outcome and is
// deliberately absent from this list.

use thiserror::Error;

/// Result type alias for hiero_vision operations.
pub type Result<T> = std::result::Result<T, SegmentationError>;

#[derive(Error, Debug)]
pub enum SegmentationError {
    /// The grid has no rows or no columns.
    #[error("Invalid grid: {rows} rows x {cols} columns")]
    EmptyGrid { rows: usize, cols: usize },

    /// A row does not have the same length as the first row.
    #[error("Invalid grid: row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A dimension does not fit the `u32` coordinates used by images.
    #[error("Invalid grid: {rows} rows x {cols} columns exceeds the supported size")]
    GridTooLarge { rows: usize, cols: usize },

    /// A flat buffer does not hold exactly `rows * cols` intensities.
    #[error("Invalid grid: buffer holds {found} values, expected {expected}")]
    BufferSizeMismatch { expected: usize, found: usize },

    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidConfig { parameter: String, value: String },

    #[error("Failed to parse configuration")]
    ConfigFormat(#[from] serde_json::Error),

    /// A batch worker was cancelled or panicked before producing a result.
    #[error("Batch worker failed: {message}")]
    Worker { message: String },
}

impl SegmentationError {
    pub fn invalid_config(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidConfig {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// True for every error that means the input grid itself was unusable.
    pub fn is_invalid_grid(&self) -> bool {
        matches!(
            self,
            SegmentationError::EmptyGrid { .. }
                | SegmentationError::GridTooLarge { .. }
                | SegmentationError::RaggedRow { .. }
                | SegmentationError::BufferSizeMismatch { .. }
        )
    }
}
