//! Error types shared by the analysis, rendering and task layers.

use thiserror::Error;

/// Top-level error type for the spectroscope-core public API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// FFT input length is not a power of two. Caller error, never recovered.
    #[error("FFT input length {len} is not a power of two")]
    InvalidInputSize { len: usize },

    /// Malformed audio or configuration handed to the engine.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// One slice could not be analysed. The analyzer recovers from this by
    /// substituting a zero frame.
    #[error("slice {index} failed: {reason}")]
    SliceAnalysisFailure { index: usize, reason: String },

    /// No background runtime is available to host a task.
    #[error("background task unsupported: {0}")]
    TaskSetupFailure(String),

    /// The drawable surface or its pixel buffer could not be created.
    #[error("draw surface unavailable: {0}")]
    DrawSurfaceUnavailable(String),

    /// Encoding or writing rendered pixels failed.
    #[error("export failed: {0}")]
    Export(String),

    /// A background task reported an error or died.
    #[error("task failed: {0}")]
    TaskFailed(String),
}

/// Convenience alias so callers can write `Result<T>` instead of `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;
