//! Error types for the cut engine.

use std::path::PathBuf;

use crate::cut::axes::{AxisRef, LineId};

/// Result type for cut operations.
pub type CutResult<T> = Result<T, CutError>;

/// Errors raised when constructing a [`Wave`](crate::wave::Wave).
#[derive(Debug, thiserror::Error)]
pub enum WaveError {
    /// The number of coordinate vectors does not match the array rank.
    #[error("expected {expected} axis vectors for a {expected}-dimensional array, got {got}")]
    AxisCountMismatch { expected: usize, got: usize },

    /// A coordinate vector has the wrong length for its dimension.
    #[error("axis {axis} has {got} coordinates but the dimension has length {expected}")]
    AxisLengthMismatch {
        axis: usize,
        expected: usize,
        got: usize,
    },
}

/// Errors raised by the registry and by `make_wave`.
///
/// Geometric edge cases (out-of-range positions, zero-length lines) are
/// clamped, never reported; only malformed requests and wrong-variant
/// accesses surface here.
#[derive(Debug, thiserror::Error)]
pub enum CutError {
    /// A cut request must name one or two axes.
    #[error("cut request must name 1 or 2 axes, got {0}")]
    InvalidAxisCount(usize),

    /// The same axis reference appears twice in one request.
    #[error("duplicate axis reference in cut request: {0}")]
    DuplicateAxis(AxisRef),

    /// A literal axis index is outside the source array's rank.
    #[error("axis {axis} out of range for {ndim}-dimensional data")]
    AxisOutOfRange { axis: usize, ndim: usize },

    /// A cut request referenced a free line that is not in the registry.
    #[error("no free-line executor with id {0}")]
    DanglingFreeLine(LineId),

    /// A geometry setter was called on the wrong executor variant.
    #[error("executor at index {index} is {found}, expected {expected}")]
    ExecutorMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// A registry entry index is out of range.
    #[error("registry index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised while saving or loading executor parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported parameter file extension: .{0}")]
    UnsupportedExtension(String),
}
