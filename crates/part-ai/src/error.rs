use part_core::KernelError;
use part_dsl::ExecutionError;
use part_library::BuildError;
use serde::Serialize;
use thiserror::Error;

use crate::sanitize::SanitizeError;

/// The single tagged outcome of a failed request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartError {
    #[error("request needs more detail: {message}")]
    Ambiguous { message: String },
    #[error("part is not supported: {message}")]
    Unsupported { message: String },
    #[error("generator produced no usable helper call: {detail}")]
    NoValidCall { raw: String, detail: String },
    #[error("invalid parameters: {0}")]
    InvalidParameters(BuildError),
    #[error("geometry kernel failed: {0}")]
    ExecutionFailure(KernelError),
    #[error("generator request failed: {0}")]
    Generator(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AmbiguousRequest,
    UnsupportedRequest,
    NoValidCall,
    InvalidParameters,
    ExecutionFailure,
    Generator,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AmbiguousRequest => "ambiguous_request",
            Self::UnsupportedRequest => "unsupported_request",
            Self::NoValidCall => "no_valid_call",
            Self::InvalidParameters => "invalid_parameters",
            Self::ExecutionFailure => "execution_failure",
            Self::Generator => "generator",
        }
    }
}

/// What a caller should do next about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// Show the message and ask the user for a different description.
    RepromptUser,
    /// Run generation again, passing the failure back to the generator.
    RetryGeneration,
    Abort,
}

impl PartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ambiguous { .. } => ErrorKind::AmbiguousRequest,
            Self::Unsupported { .. } => ErrorKind::UnsupportedRequest,
            Self::NoValidCall { .. } => ErrorKind::NoValidCall,
            Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::ExecutionFailure(_) => ErrorKind::ExecutionFailure,
            Self::Generator(_) => ErrorKind::Generator,
        }
    }

    pub fn recovery(&self) -> Recovery {
        match self.kind() {
            ErrorKind::AmbiguousRequest | ErrorKind::UnsupportedRequest => Recovery::RepromptUser,
            ErrorKind::NoValidCall | ErrorKind::InvalidParameters => Recovery::RetryGeneration,
            ErrorKind::ExecutionFailure | ErrorKind::Generator => Recovery::Abort,
        }
    }

    /// Text shown to the user for outcomes that need their input.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Ambiguous { message } | Self::Unsupported { message } => Some(message),
            _ => None,
        }
    }

    pub(crate) fn from_sanitize(raw: &str, error: SanitizeError) -> Self {
        match error {
            SanitizeError::InvalidParameters(build) => Self::InvalidParameters(build),
            other => Self::NoValidCall {
                raw: raw.to_string(),
                detail: other.to_string(),
            },
        }
    }
}

impl From<ExecutionError> for PartError {
    fn from(error: ExecutionError) -> Self {
        match error {
            ExecutionError::InvalidParameters(build) => Self::InvalidParameters(build),
            ExecutionError::Kernel(kernel) => Self::ExecutionFailure(kernel),
            other => Self::NoValidCall {
                raw: String::new(),
                detail: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use part_core::KernelError;
    use part_dsl::ExecutionError;
    use part_library::BuildError;

    use super::{ErrorKind, PartError, Recovery};
    use crate::sanitize::SanitizeError;

    #[test]
    fn recovery_follows_the_failure_kind() {
        let ambiguous = PartError::Ambiguous {
            message: "which gear?".to_string(),
        };
        assert_eq!(ambiguous.recovery(), Recovery::RepromptUser);
        assert_eq!(ambiguous.user_message(), Some("which gear?"));

        let invalid = PartError::InvalidParameters(BuildError::invalid("make_box", "L must be > 0"));
        assert_eq!(invalid.kind(), ErrorKind::InvalidParameters);
        assert_eq!(invalid.recovery(), Recovery::RetryGeneration);

        let kernel = PartError::from(ExecutionError::Kernel(KernelError::Boolean {
            operation: "cut",
            detail: "empty result".into(),
        }));
        assert_eq!(kernel.kind(), ErrorKind::ExecutionFailure);
        assert_eq!(kernel.recovery(), Recovery::Abort);
        assert_eq!(kernel.user_message(), None);
    }

    #[test]
    fn sanitize_failures_keep_raw_text() {
        let error = PartError::from_sanitize(
            "hello",
            SanitizeError::NoValidCall {
                raw: "hello".to_string(),
            },
        );
        let PartError::NoValidCall { raw, .. } = &error else {
            panic!("expected no valid call");
        };
        assert_eq!(raw, "hello");
        assert_eq!(error.recovery(), Recovery::RetryGeneration);
    }

    #[test]
    fn kinds_serialize_in_snake_case() {
        let json = serde_json::to_string(&ErrorKind::UnsupportedRequest).expect("serialize");
        assert_eq!(json, "\"unsupported_request\"");
        assert_eq!(ErrorKind::NoValidCall.as_str(), "no_valid_call");
    }
}
