use part_core::GeometryKernel;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::{PartError, Recovery};
use crate::generator::{GenerationConfig, LanguageModel};
use crate::pipeline::{PartBuild, Pipeline};

/// Successful request together with how many generations it took.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistedBuild {
    pub build: PartBuild,
    pub attempts: usize,
}

/// Failed request: the last outcome and how many generations were tried.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error} (after {attempts} attempt(s))")]
pub struct AssistError {
    #[source]
    pub error: PartError,
    pub attempts: usize,
}

/// Drives a [`Pipeline`] against a model, re-running generation for failures
/// the generator can fix and stopping on everything else.
pub struct PartAssistant<M: LanguageModel> {
    model: M,
    pipeline: Pipeline,
    max_attempts: usize,
}

impl<M: LanguageModel> PartAssistant<M> {
    pub fn new(model: M, config: &GenerationConfig) -> Self {
        Self {
            model,
            pipeline: Pipeline::default(),
            max_attempts: config.max_attempts,
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn request<K, F>(
        &mut self,
        description: &str,
        kernel: &mut K,
        display: F,
    ) -> Result<AssistedBuild, AssistError>
    where
        K: GeometryKernel + ?Sized,
        F: FnOnce(K::Solid),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut display = Some(display);
        let mut previous: Option<String> = None;
        let mut feedback: Vec<String> = Vec::new();

        let mut attempt = 1;

        loop {
            let outcome = self
                .pipeline
                .generate(
                    description,
                    &mut self.model,
                    previous.as_deref(),
                    &feedback,
                    attempt,
                )
                .and_then(|raw| {
                    let result = self.pipeline.run_raw(&raw, &mut *kernel, |solid| {
                        if let Some(hook) = display.take() {
                            hook(solid);
                        }
                    });
                    previous = Some(raw);
                    result
                });

            let error = match outcome {
                Ok(build) => {
                    info!(attempt, primitive = build.execution.primitive, "request fulfilled");
                    return Ok(AssistedBuild {
                        build,
                        attempts: attempt,
                    });
                }
                Err(error) => error,
            };

            if error.recovery() != Recovery::RetryGeneration || attempt >= max_attempts {
                return Err(AssistError {
                    error,
                    attempts: attempt,
                });
            }
            warn!(attempt, %error, "retrying generation");
            feedback = vec![error.to_string()];
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use part_core::RecordingKernel;

    use super::PartAssistant;
    use crate::error::ErrorKind;
    use crate::generator::GenerationConfig;
    use crate::pipeline::tests::ScriptedModel;

    fn config(max_attempts: usize) -> GenerationConfig {
        GenerationConfig {
            max_attempts,
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn invalid_parameters_are_fed_back_and_retried() {
        let model = ScriptedModel::default().with_response(
            "a square tube",
            vec![
                "shape = make_rect_tube(100, 10, 10, 6)\nPart.show(shape)",
                "shape = make_rect_tube(100, 10, 10, 2)\nPart.show(shape)",
            ],
        );
        let mut assistant = PartAssistant::new(model, &config(3));
        let mut kernel = RecordingKernel::default();
        let mut shown = 0;

        let built = assistant
            .request("a square tube", &mut kernel, |_| shown += 1)
            .expect("second attempt builds");

        assert_eq!(built.attempts, 2);
        assert_eq!(shown, 1);
        let model = assistant.into_model();
        assert_eq!(model.logs.len(), 2);
        assert_eq!(model.logs[1].attempt, 2);
        assert_eq!(
            model.logs[1].previous_output.as_deref(),
            Some("shape = make_rect_tube(100, 10, 10, 6)\nPart.show(shape)")
        );
        assert!(model.logs[1].feedback[0].contains("make_rect_tube"));
    }

    #[test]
    fn unsupported_requests_are_not_retried() {
        let model = ScriptedModel::default().with_response(
            "a banana",
            vec!["UNSUPPORTED_PART: banana shape", "make_box(1, 1, 1)"],
        );
        let mut assistant = PartAssistant::new(model, &config(3));
        let mut kernel = RecordingKernel::default();

        let err = assistant
            .request("a banana", &mut kernel, |_| panic!("nothing to display"))
            .expect_err("unsupported");

        assert_eq!(err.attempts, 1);
        assert_eq!(err.error.kind(), ErrorKind::UnsupportedRequest);
        assert!(kernel.calls.is_empty());
    }

    #[test]
    fn retries_stop_at_the_configured_limit() {
        let model = ScriptedModel::default().with_response(
            "a sphere",
            vec!["Part.makeSphere(5)", "sphere(5)", "never asked"],
        );
        let mut assistant = PartAssistant::new(model, &config(2));
        let mut kernel = RecordingKernel::default();

        let err = assistant
            .request("a sphere", &mut kernel, |_| {})
            .expect_err("no helper ever produced");

        assert_eq!(err.attempts, 1);
        assert_eq!(err.error.kind(), ErrorKind::AmbiguousRequest);

        let model = ScriptedModel::default().with_response(
            "a block",
            vec!["make_box(10, 20)", "make_box(10)", "make_box(1, 2, 3)"],
        );
        let mut assistant = PartAssistant::new(model, &config(2));
        let err = assistant
            .request("a block", &mut kernel, |_| {})
            .expect_err("limit reached first");
        assert_eq!(err.attempts, 2);
        assert_eq!(err.error.kind(), ErrorKind::InvalidParameters);
        assert!(err.to_string().contains("after 2 attempt(s)"));
        let source = std::error::Error::source(&err).expect("last failure is the source");
        assert_eq!(source.to_string(), err.error.to_string());
    }
}
