use crate::config::Config;
use crate::error::PipelineError;
use crate::llm::ModelGateway;
use crate::models::{AnalysisResult, ApiRequest, ApiResponse, CandidateSignals, RawDocument};
use crate::pipeline::env_template::EnvTemplate;
use crate::pipeline::params::normalize_all;
use crate::pipeline::prompts::{analysis_prompt, integration_prompt, wrapper_prompt};
use crate::pipeline::response_parser::parse_analysis;
use crate::scraper::{DocumentFetcher, FetchedPage, extract_candidates, parse_document};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Used when the integration-suggestion call fails.
pub const DEFAULT_INTEGRATION_SUGGESTION: &str =
    "For this API, a direct REST client approach using standard libraries would be most appropriate.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetching,
    Extracting,
    Analyzing,
    Parsing,
    Normalizing,
    IntegrationSuggestion,
    WrapperGeneration,
    TemplateSynthesis,
    Done,
}

/// What happens when a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Surface the error and stop.
    Abort,
    /// Continue with the given value.
    Substitute(&'static str),
}

impl Stage {
    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            Stage::IntegrationSuggestion => FailurePolicy::Substitute(DEFAULT_INTEGRATION_SUGGESTION),
            _ => FailurePolicy::Abort,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Analyzing => "analyzing",
            Stage::Parsing => "parsing",
            Stage::Normalizing => "normalizing",
            Stage::IntegrationSuggestion => "integration suggestion",
            Stage::WrapperGeneration => "wrapper generation",
            Stage::TemplateSynthesis => "template synthesis",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A run in flight; each state holds exactly what its stage consumes.
enum Progress {
    Fetching,
    Extracting {
        page: FetchedPage,
    },
    Analyzing {
        document: RawDocument,
        signals: CandidateSignals,
    },
    Parsing {
        completion: String,
    },
    Normalizing {
        analysis: AnalysisResult,
    },
    IntegrationSuggestion {
        analysis: AnalysisResult,
    },
    WrapperGeneration {
        analysis: AnalysisResult,
        suggestion: String,
    },
    TemplateSynthesis {
        analysis: AnalysisResult,
        suggestion: String,
        wrapper_code: String,
    },
    Done(ApiResponse),
}

impl Progress {
    fn stage(&self) -> Stage {
        match self {
            Progress::Fetching => Stage::Fetching,
            Progress::Extracting { .. } => Stage::Extracting,
            Progress::Analyzing { .. } => Stage::Analyzing,
            Progress::Parsing { .. } => Stage::Parsing,
            Progress::Normalizing { .. } => Stage::Normalizing,
            Progress::IntegrationSuggestion { .. } => Stage::IntegrationSuggestion,
            Progress::WrapperGeneration { .. } => Stage::WrapperGeneration,
            Progress::TemplateSynthesis { .. } => Stage::TemplateSynthesis,
            Progress::Done(_) => Stage::Done,
        }
    }
}

/// Runs documentation URL -> structured API description + wrapper code.
///
/// Holds only read-only collaborators, so one instance serves any number
/// of concurrent invocations.
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<Config>,
    fetcher: Arc<dyn DocumentFetcher>,
    gateway: Arc<dyn ModelGateway>,
}

impl Orchestrator {
    pub fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn DocumentFetcher>,
        gateway: Arc<dyn ModelGateway>,
    ) -> Self {
        Self {
            config,
            fetcher,
            gateway,
        }
    }

    pub async fn analyze(&self, request: &ApiRequest) -> Result<ApiResponse, PipelineError> {
        let mut progress = Progress::Fetching;
        loop {
            let stage = progress.stage();
            tracing::debug!(%stage, url = %request.documentation_url, "entering stage");
            progress = match self.advance(progress, request).await {
                Ok(Progress::Done(response)) => {
                    tracing::info!(
                        url = %request.documentation_url,
                        endpoints = response.endpoints.len(),
                        auth_methods = response.auth_methods.len(),
                        "analysis complete"
                    );
                    return Ok(response);
                }
                Ok(next) => next,
                Err(err) => {
                    tracing::error!(%stage, error = %err, "pipeline aborted");
                    return Err(err);
                }
            };
        }
    }

    async fn advance(&self, progress: Progress, request: &ApiRequest) -> Result<Progress, PipelineError> {
        let next = match progress {
            Progress::Fetching => Progress::Extracting {
                page: self.fetcher.fetch(&request.documentation_url).await?,
            },
            Progress::Extracting { page } => {
                let document = parse_document(&page);
                if document.full_text.is_empty() {
                    return Err(PipelineError::Extract(format!(
                        "no readable text at {}",
                        page.url
                    )));
                }
                let signals = extract_candidates(&document);
                Progress::Analyzing { document, signals }
            }
            Progress::Analyzing { document, signals } => {
                let prompt = analysis_prompt(&document, &signals, &request.use_case);
                Progress::Parsing {
                    completion: self.model_stage(Stage::Analyzing, &prompt).await?,
                }
            }
            Progress::Parsing { completion } => Progress::Normalizing {
                analysis: parse_analysis(&completion),
            },
            Progress::Normalizing { mut analysis } => {
                normalize_all(&mut analysis.endpoints);
                Progress::IntegrationSuggestion { analysis }
            }
            Progress::IntegrationSuggestion { analysis } => {
                let prompt = integration_prompt(
                    &analysis.endpoints,
                    &analysis.auth_methods,
                    &request.use_case,
                    &request.preferred_language,
                );
                let suggestion = self
                    .model_stage(Stage::IntegrationSuggestion, &prompt)
                    .await?;
                Progress::WrapperGeneration {
                    analysis,
                    suggestion,
                }
            }
            Progress::WrapperGeneration {
                analysis,
                suggestion,
            } => {
                let prompt = wrapper_prompt(
                    &analysis.endpoints,
                    &analysis.auth_methods,
                    &request.preferred_language,
                    &request.use_case,
                );
                let wrapper_code = self.model_stage(Stage::WrapperGeneration, &prompt).await?;
                Progress::TemplateSynthesis {
                    analysis,
                    suggestion,
                    wrapper_code,
                }
            }
            Progress::TemplateSynthesis {
                analysis,
                suggestion,
                wrapper_code,
            } => {
                let env_template = EnvTemplate::from_auth_methods(&analysis.auth_methods).render();
                Progress::Done(ApiResponse {
                    endpoints: analysis.endpoints,
                    auth_methods: analysis.auth_methods,
                    suggested_integration: suggestion,
                    wrapper_code,
                    env_template,
                })
            }
            done @ Progress::Done(_) => done,
        };
        Ok(next)
    }

    /// One model call, with the stage's failure policy applied.
    async fn model_stage(&self, stage: Stage, prompt: &str) -> Result<String, PipelineError> {
        let result = self
            .gateway
            .complete(prompt, &self.config.generation, &self.config.safety_settings)
            .await;
        match result {
            Ok(text) => Ok(text),
            Err(source) => match stage.failure_policy() {
                FailurePolicy::Abort => Err(PipelineError::ModelCall { stage, source }),
                FailurePolicy::Substitute(default) => {
                    tracing::warn!(%stage, error = %source, "model call failed, using default");
                    Ok(default.to_string())
                }
            },
        }
    }
}
