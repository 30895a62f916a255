use crate::error::ModelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// A harm category and the threshold at which the model should block it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// Text-completion capability of a generative model.
///
/// The returned text is arbitrary; callers must not assume any structure.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        generation: &GenerationConfig,
        safety_settings: &[SafetySetting],
    ) -> Result<String, ModelError>;
}
