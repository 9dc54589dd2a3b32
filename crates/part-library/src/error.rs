use thiserror::Error;

/// Rejection of a parameter vector before any geometry is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("{primitive}: {message}")]
    InvalidParameters {
        primitive: &'static str,
        message: String,
    },
    #[error("{primitive}: missing required parameter '{param}'")]
    MissingArgument {
        primitive: &'static str,
        param: &'static str,
    },
    #[error("{primitive}: too many arguments, expected at most {expected}, got {got}")]
    TooManyArguments {
        primitive: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{primitive}: unknown parameter '{param}'")]
    UnknownParameter { primitive: &'static str, param: String },
    #[error("{primitive}: parameter '{param}' given more than once")]
    DuplicateArgument {
        primitive: &'static str,
        param: &'static str,
    },
    #[error("{primitive}: parameter '{param}' expects {expected}")]
    WrongType {
        primitive: &'static str,
        param: &'static str,
        expected: &'static str,
    },
}

impl BuildError {
    pub fn invalid(primitive: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            primitive,
            message: message.into(),
        }
    }

    /// Name of the primitive that rejected its parameters.
    pub fn primitive(&self) -> &'static str {
        match self {
            Self::InvalidParameters { primitive, .. }
            | Self::MissingArgument { primitive, .. }
            | Self::TooManyArguments { primitive, .. }
            | Self::UnknownParameter { primitive, .. }
            | Self::DuplicateArgument { primitive, .. }
            | Self::WrongType { primitive, .. } => primitive,
        }
    }
}
