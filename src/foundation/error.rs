/// Convenience result type used across Auramatic.
pub type StudioResult<T> = Result<T, StudioError>;

/// Top-level error taxonomy used by studio APIs.
///
/// Every failure is scoped to one action site; nothing here is fatal to the process.
#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    /// A required input is missing or malformed. The action is not dispatched.
    #[error("validation error: {0}")]
    Validation(String),

    /// The action site already has a request in flight.
    #[error("busy: {0}")]
    Busy(String),

    /// The media-generation collaborator could not be reached or reported a failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The collaborator answered with a payload that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The request was abandoned before it completed.
    #[error("cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stable machine-readable classification of a [`StudioError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// See [`StudioError::Validation`].
    Validation,
    /// See [`StudioError::Busy`].
    Busy,
    /// See [`StudioError::Transport`].
    Transport,
    /// See [`StudioError::Decode`].
    Decode,
    /// See [`StudioError::Serde`].
    Serde,
    /// See [`StudioError::Cancelled`].
    Cancelled,
    /// See [`StudioError::Other`].
    Internal,
}

impl StudioError {
    /// Build a [`StudioError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StudioError::Busy`] value.
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    /// Build a [`StudioError::Transport`] value.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Build a [`StudioError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StudioError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Classify this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::Busy(_) => ErrorCode::Busy,
            Self::Transport(_) => ErrorCode::Transport,
            Self::Decode(_) => ErrorCode::Decode,
            Self::Serde(_) => ErrorCode::Serde,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Other(_) => ErrorCode::Internal,
        }
    }

    /// Message suitable for showing to the user, without the taxonomy prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(m)
            | Self::Busy(m)
            | Self::Transport(m)
            | Self::Decode(m)
            | Self::Serde(m) => m.clone(),
            Self::Cancelled => "cancelled".to_string(),
            Self::Other(e) => e.to_string(),
        }
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
