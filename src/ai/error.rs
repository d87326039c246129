use thiserror::Error;

/// Errors from the completion endpoint, classified where the response is
/// received.
#[derive(Debug, Error)]
pub enum AiError {
    /// Connection failed, timed out, or the body could not be read.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The service answered with a 5xx status.
    #[error("Service unavailable ({status}): {message}")]
    Overloaded { status: u16, message: String },

    /// The API key was rejected.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Rate limit or quota exhausted.
    #[error("Quota exceeded")]
    QuotaExceeded,

    /// A successful response carried no text.
    #[error("Empty response from model")]
    EmptyResponse,

    /// The request could not be built, e.g. no API key configured.
    #[error("Invalid request: {message}")]
    Validation { message: String },

    /// Any other status or an unreadable payload.
    #[error("Unexpected error: {message}")]
    Unknown { message: String },
}

/// Coarse category of an [`AiError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AiErrorKind {
    Network,
    Api,
    Validation,
    Unknown,
}

impl AiErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiErrorKind::Network => "network",
            AiErrorKind::Api => "api",
            AiErrorKind::Validation => "validation",
            AiErrorKind::Unknown => "unknown",
        }
    }
}

impl AiError {
    pub fn kind(&self) -> AiErrorKind {
        match self {
            AiError::Network { .. } => AiErrorKind::Network,
            AiError::Overloaded { .. }
            | AiError::InvalidApiKey
            | AiError::QuotaExceeded
            | AiError::EmptyResponse => AiErrorKind::Api,
            AiError::Validation { .. } => AiErrorKind::Validation,
            AiError::Unknown { .. } => AiErrorKind::Unknown,
        }
    }

    /// Returns true if this error is transient and the request may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AiError::Network { .. } | AiError::Overloaded { .. })
    }

    /// Text shown to the user in place of a model answer.
    pub fn user_message(&self) -> String {
        match self {
            AiError::Network { .. } => {
                "Could not reach the AI service. Check your connection and try again.".to_string()
            }
            AiError::Overloaded { .. } => {
                "The AI service is overloaded right now. Please try again in a moment.".to_string()
            }
            AiError::InvalidApiKey => {
                "Your API key was rejected. Update it in settings.".to_string()
            }
            AiError::QuotaExceeded => {
                "API quota exceeded. Wait a little or check your plan limits.".to_string()
            }
            AiError::EmptyResponse => {
                "The model returned an empty answer. Try rephrasing the question.".to_string()
            }
            AiError::Validation { message } => message.clone(),
            AiError::Unknown { .. } => "Something went wrong. Please try again.".to_string(),
        }
    }
}

pub type AiResult<T> = std::result::Result<T, AiError>;
