//! Error types for the documentation pipeline

use crate::pipeline::Stage;
use thiserror::Error;

/// Errors retrieving the documentation page
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed or is not http(s)
    #[error("Invalid documentation URL: {0}")]
    InvalidUrl(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Page did not arrive within the configured timeout
    #[error("Timed out fetching documentation")]
    Timeout,

    /// Server answered with a non-success status
    #[error("Documentation server returned status {0}")]
    Status(u16),

    /// Any other transport failure
    #[error("Request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Classify a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

/// Errors from the text-completion model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Prompt blocked by the model: {0}")]
    Blocked(String),

    #[error("Model returned no text")]
    EmptyCompletion,
}

/// Errors building process-wide configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Fatal failures that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch documentation: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to extract documentation: {0}")]
    Extract(String),

    #[error("Model call failed during {stage}: {source}")]
    ModelCall {
        stage: Stage,
        #[source]
        source: ModelError,
    },
}

impl PipelineError {
    /// Stage that aborted the run
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Fetch(_) => Stage::Fetching,
            PipelineError::Extract(_) => Stage::Extracting,
            PipelineError::ModelCall { stage, .. } => *stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::Timeout.to_string(),
            "Timed out fetching documentation"
        );
        assert_eq!(
            FetchError::Status(404).to_string(),
            "Documentation server returned status 404"
        );
        assert_eq!(
            ConfigError::MissingApiKey.to_string(),
            "GEMINI_API_KEY environment variable not set"
        );
    }

    #[test]
    fn test_pipeline_error_stage() {
        let err = PipelineError::from(FetchError::Timeout);
        assert_eq!(err.stage(), Stage::Fetching);

        let err = PipelineError::ModelCall {
            stage: Stage::WrapperGeneration,
            source: ModelError::EmptyCompletion,
        };
        assert_eq!(err.stage(), Stage::WrapperGeneration);
        assert_eq!(
            err.to_string(),
            "Model call failed during wrapper generation: Model returned no text"
        );
    }
}
