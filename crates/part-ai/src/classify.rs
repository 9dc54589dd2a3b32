use std::sync::LazyLock;

use part_library::Registry;
use regex::Regex;
use tracing::debug;

use crate::prompt::{CLARIFICATION_MARKER, UNSUPPORTED_MARKER};
use crate::sanitize::{SanitizeError, sanitize};

static CALL_OPENING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid call opening pattern")
});

const DEFAULT_CLARIFICATION: &str = "Please add more detail about the part you need.";
const DEFAULT_UNSUPPORTED: &str = "This part is not available in the primitive library.";

/// What one generator response amounts to. Exactly one outcome per response.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    /// Normalized two-statement program, ready for the executor.
    Ready { code: String },
    Ambiguous { message: String },
    Unsupported { message: String },
    /// An allowed helper name appeared but no usable program came out of it.
    Malformed { raw_text: String, error: SanitizeError },
}

impl GenerationResult {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::Ambiguous { .. } => "ambiguous",
            Self::Unsupported { .. } => "unsupported",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Classifies one raw generator response.
///
/// Reserved markers on the first line win, then any allow-listed call
/// anywhere in the text; text with neither is treated as a request for more
/// detail.
pub fn classify(raw: &str, registry: &Registry) -> GenerationResult {
    let text = raw.trim();
    let first_line = text.lines().next().unwrap_or_default().trim_start();

    let result = if let Some(rest) = first_line.strip_prefix(CLARIFICATION_MARKER) {
        GenerationResult::Ambiguous {
            message: marker_message(rest, DEFAULT_CLARIFICATION),
        }
    } else if let Some(rest) = first_line.strip_prefix(UNSUPPORTED_MARKER) {
        GenerationResult::Unsupported {
            message: marker_message(rest, DEFAULT_UNSUPPORTED),
        }
    } else if mentions_allowed_call(text, registry) {
        match sanitize(text, registry) {
            Ok(program) => GenerationResult::Ready {
                code: program.to_source(),
            },
            Err(error) => GenerationResult::Malformed {
                raw_text: raw.to_string(),
                error,
            },
        }
    } else {
        GenerationResult::Ambiguous {
            message: text.to_string(),
        }
    };

    debug!(outcome = result.label(), "classified generator output");
    result
}

fn marker_message(rest: &str, fallback: &str) -> String {
    let message = rest.trim();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

fn mentions_allowed_call(text: &str, registry: &Registry) -> bool {
    CALL_OPENING
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .any(|name| registry.contains(name.as_str()))
}
