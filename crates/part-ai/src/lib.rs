//! From a free-text part description to a displayed solid.
//!
//! A [`LanguageModel`] answers with text; [`classify`] decides what that text
//! is, [`sanitize`] reduces it to the normalized two-statement program and the
//! [`Pipeline`] executes it in the closed namespace. [`PartAssistant`] re-runs
//! generation for failures the model can fix.

pub mod assistant;
pub mod classify;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod sanitize;

pub use assistant::{AssistError, AssistedBuild, PartAssistant};
pub use classify::{GenerationResult, classify};
pub use error::{ErrorKind, PartError, Recovery};
pub use generator::{
    DEFAULT_ENDPOINT, DEFAULT_MODEL, GenerationConfig, GenerationRequest, GeneratorError,
    LanguageModel, OllamaClient,
};
pub use pipeline::{PartBuild, Pipeline};
pub use prompt::{CLARIFICATION_MARKER, UNSUPPORTED_MARKER, system_prompt, user_prompt};
pub use report::{BuildReport, DEFAULT_VOLUME_RESOLUTION, build_with_sdf};
pub use sanitize::{SanitizeError, code_stream, extract_call, sanitize};
