use crate::config::Config;
use crate::error::ModelError;
use crate::llm::{GenerationConfig, ModelGateway, SafetySetting};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

/// Gemini `generateContent` client.
pub struct GeminiClient {
    api_key: String,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        api_base: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            api_base,
            model,
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ModelError> {
        Self::new(
            config.gemini_api_key.clone(),
            config.api_base.clone(),
            config.model.clone(),
            config.model_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl ModelGateway for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        generation: &GenerationConfig,
        safety_settings: &[SafetySetting],
    ) -> Result<String, ModelError> {
        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "calling Gemini"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .header("Content-Type", "application/json")
            .json(&json!({
                "contents": [
                    {
                        "role": "user",
                        "parts": [{ "text": prompt }]
                    }
                ],
                "generationConfig": generation,
                "safetySettings": safety_settings,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response.json().await?;
        completion_text(&response_json)
    }
}

/// Concatenate the text parts of the first candidate.
fn completion_text(response: &Value) -> Result<String, ModelError> {
    if let Some(reason) = response["promptFeedback"]["blockReason"].as_str() {
        return Err(ModelError::Blocked(reason.to_string()));
    }

    let text: String = response["candidates"][0]["content"]["parts"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.trim().is_empty() {
        return Err(ModelError::EmptyCompletion);
    }
    Ok(text)
}
