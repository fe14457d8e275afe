use std::sync::Arc;

use crate::foundation::error::{ErrorCode, StudioError};
use crate::generate::history::GenerationResult;

/// User-visible failure attached to [`LifecycleState::Failed`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Failure {
    /// Classification of the underlying error.
    pub code: ErrorCode,
    /// Plain-text message for display.
    pub message: String,
}

impl Failure {
    /// Failure carrying the error's own user message.
    pub fn from_error(err: &StudioError) -> Self {
        Self {
            code: err.code(),
            message: err.user_message(),
        }
    }

    /// Failure with a fixed display message in place of the error's text.
    pub fn with_message(err: &StudioError, message: impl Into<String>) -> Self {
        Self {
            code: err.code(),
            message: message.into(),
        }
    }
}

/// State of one action site.
///
/// `Idle -> Pending -> Succeeded | Failed`, and every non-pending state accepts a new submit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LifecycleState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The last request produced a result.
    Succeeded(Arc<GenerationResult>),
    /// The last request failed.
    Failed(Failure),
}

impl LifecycleState {
    /// Whether a request is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, LifecycleState::Pending)
    }

    /// Result of the last successful request, if that is the current state.
    pub fn result(&self) -> Option<&Arc<GenerationResult>> {
        match self {
            LifecycleState::Succeeded(r) => Some(r),
            _ => None,
        }
    }

    /// Failure of the last request, if that is the current state.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            LifecycleState::Failed(f) => Some(f),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Pending => "pending",
            LifecycleState::Succeeded(_) => "succeeded",
            LifecycleState::Failed(_) => "failed",
        }
    }
}
