use std::error::Error;
use std::fmt;

/// Syntax or shape error in program text, with a source position when known.
#[derive(Debug, Clone, PartialEq)]
pub struct DslError {
    message: String,
    line: Option<usize>,
    column: Option<usize>,
}

impl DslError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub(crate) fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Option<(usize, usize)> {
        self.line.zip(self.column)
    }
}

impl fmt::Display for DslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "{} at line {}, column {}", self.message, line, column)
            }
            _ => f.write_str(&self.message),
        }
    }
}

impl Error for DslError {}
