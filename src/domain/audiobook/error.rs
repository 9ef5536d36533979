use super::model::FailureReason;
use crate::domain::article::ArticleError;
use crate::domain::speech::SpeechError;
use crate::error::AppError;
use crate::infrastructure::workers::WorkerError;

/// Failure of one audiobook production attempt.
///
/// Every failure carries a reason that ends up in the FAILED status entry,
/// plus a retryable flag deciding whether the queue message is re-raised for
/// redelivery or acknowledged. Anything not explicitly classified is a
/// non-retryable INTERNAL_ERROR; that coarseness is deliberate (see
/// DESIGN.md).
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("{message}")]
    Classified {
        reason: FailureReason,
        retryable: bool,
        message: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProcessorError {
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Classified { retryable: true, .. })
    }

    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Classified { reason, .. } => *reason,
            Self::Other(_) => FailureReason::InternalError,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Classified {
            reason: FailureReason::InternalError,
            retryable: false,
            message: message.into(),
        }
    }

    fn internal_retryable(message: impl Into<String>) -> Self {
        Self::Classified {
            reason: FailureReason::InternalError,
            retryable: true,
            message: message.into(),
        }
    }
}

impl From<ArticleError> for ProcessorError {
    fn from(err: ArticleError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<SpeechError> for ProcessorError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Transient(_) => Self::internal_retryable(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<WorkerError> for ProcessorError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::Transient(_) => Self::internal_retryable(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<AppError> for ProcessorError {
    fn from(err: AppError) -> Self {
        Self::internal(err.to_string())
    }
}
