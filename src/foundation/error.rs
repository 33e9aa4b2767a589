/// Convenience result type used across filmgrid.
pub type FilmResult<T> = Result<T, FilmError>;

/// Top-level error taxonomy used by every pipeline stage.
///
/// Stages fail whole: a returned error means no partial artifact was produced.
#[derive(thiserror::Error, Debug)]
pub enum FilmError {
    /// Caller-provided input has the wrong shape (e.g. a burst without exactly 4 frames).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An encoded image or payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An internal pixel, layout or rasterization step failed.
    #[error("processing error: {0}")]
    Processing(String),

    /// The requested output container or codec is not available on this host.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration values.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation observed a cancellation request at a stage boundary.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FilmError {
    /// Build a [`FilmError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`FilmError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FilmError::Processing`] value.
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// Build a [`FilmError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`FilmError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FilmError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
