/// Result alias used throughout the crate.
pub type LaminaResult<T> = Result<T, LaminaError>;

/// Errors surfaced at the compositing core's boundary.
///
/// Most degraded states inside a frame (empty coverage, zero-size targets, missing render
/// context) are *not* errors; they resolve to a skipped draw. This type covers caller mistakes
/// and startup-fatal conditions.
#[derive(thiserror::Error, Debug)]
pub enum LaminaError {
    /// Caller-provided input is invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// A render operation could not produce output.
    #[error("render error: {0}")]
    Render(String),

    /// Required device capabilities are missing. There is no degraded path below this.
    #[error("capability error: {0}")]
    Capability(String),

    /// Scene or options (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LaminaError {
    /// Build a [`LaminaError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LaminaError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`LaminaError::Capability`].
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    /// Build a [`LaminaError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for LaminaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
