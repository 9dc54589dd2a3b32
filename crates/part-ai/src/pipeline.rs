use part_core::GeometryKernel;
use part_dsl::{Execution, Executor, Namespace};
use part_library::Registry;
use tracing::{info, warn};

use crate::classify::{GenerationResult, classify};
use crate::error::PartError;
use crate::generator::{GenerationRequest, LanguageModel};
use crate::prompt::{system_prompt, user_prompt};

/// A request that made it all the way to the display hook.
#[derive(Debug, Clone, PartialEq)]
pub struct PartBuild {
    /// Normalized program that was executed.
    pub code: String,
    pub execution: Execution,
}

/// Classify, sanitize and execute, in that order, stopping at the first
/// failure.
#[derive(Debug, Clone)]
pub struct Pipeline {
    executor: Executor,
    system_prompt: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Registry::standard())
    }
}

impl Pipeline {
    pub fn new(registry: Registry) -> Self {
        Self {
            executor: Executor::new(Namespace::new(registry)),
            system_prompt: system_prompt(&registry),
        }
    }

    pub fn registry(&self) -> Registry {
        self.executor.namespace().registry()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn classify(&self, raw: &str) -> GenerationResult {
        classify(raw, &self.registry())
    }

    /// Runs one generator response. The display hook sees the solid only if
    /// every stage succeeded.
    pub fn run_raw<K, F>(&self, raw: &str, kernel: &mut K, display: F) -> Result<PartBuild, PartError>
    where
        K: GeometryKernel + ?Sized,
        F: FnOnce(K::Solid),
    {
        let code = match self.classify(raw) {
            GenerationResult::Ready { code } => code,
            GenerationResult::Ambiguous { message } => {
                info!(%message, "request is ambiguous");
                return Err(PartError::Ambiguous { message });
            }
            GenerationResult::Unsupported { message } => {
                info!(%message, "request is unsupported");
                return Err(PartError::Unsupported { message });
            }
            GenerationResult::Malformed { raw_text, error } => {
                let error = PartError::from_sanitize(&raw_text, error);
                warn!(raw = %raw_text, %error, "generator output rejected");
                return Err(error);
            }
        };

        let execution = self
            .executor
            .run_source(&code, kernel, display)
            .map_err(|err| match PartError::from(err) {
                PartError::NoValidCall { detail, .. } => PartError::NoValidCall {
                    raw: raw.to_string(),
                    detail,
                },
                other => other,
            })
            .inspect_err(|error| warn!(%code, %error, "execution failed"))?;

        info!(primitive = execution.primitive, "part built");
        Ok(PartBuild { code, execution })
    }

    /// Asks `model` for one response to `description` and runs it.
    pub fn run<M, K, F>(
        &self,
        description: &str,
        model: &mut M,
        kernel: &mut K,
        display: F,
    ) -> Result<PartBuild, PartError>
    where
        M: LanguageModel + ?Sized,
        K: GeometryKernel + ?Sized,
        F: FnOnce(K::Solid),
    {
        let raw = self.generate(description, model, None, &[], 1)?;
        self.run_raw(&raw, kernel, display)
    }

    pub(crate) fn generate<M>(
        &self,
        description: &str,
        model: &mut M,
        previous_output: Option<&str>,
        feedback: &[String],
        attempt: usize,
    ) -> Result<String, PartError>
    where
        M: LanguageModel + ?Sized,
    {
        let user_prompt = user_prompt(description);
        model
            .generate(GenerationRequest {
                system_prompt: &self.system_prompt,
                user_prompt: &user_prompt,
                previous_output,
                feedback,
                attempt,
            })
            .map_err(PartError::Generator)
    }
}
