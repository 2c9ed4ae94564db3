/// Convenience result type used across cinescroll.
pub type CineResult<T> = Result<T, CineError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only construction-time problems surface here. Runtime degradations (a frame
/// that failed to load, a media element without a finite duration, an update
/// racing a teardown) are handled inside the driver and logged instead.
#[derive(thiserror::Error, Debug)]
pub enum CineError {
    /// Invalid experience, scene or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An asset could not be located, read or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// A playback surface was wired up incorrectly.
    #[error("playback error: {0}")]
    Playback(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CineError {
    /// Build a [`CineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CineError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`CineError::Playback`] value.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`CineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Prefix the message with `ctx`, keeping the variant.
    pub fn context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            Self::Validation(msg) => Self::Validation(format!("{ctx}: {msg}")),
            Self::Asset(msg) => Self::Asset(format!("{ctx}: {msg}")),
            Self::Playback(msg) => Self::Playback(format!("{ctx}: {msg}")),
            Self::Serde(msg) => Self::Serde(format!("{ctx}: {msg}")),
            Self::Other(err) => Self::Other(err.context(ctx.to_string())),
        }
    }
}

impl From<serde_json::Error> for CineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
