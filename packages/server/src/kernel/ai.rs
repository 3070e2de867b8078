// AI implementation using Gemini
//
// This is the infrastructure implementation of BaseAI.
// Business logic (what to prompt for) lives in domain layers.

use anyhow::Result;
use async_trait::async_trait;
use gemini_client::{GeminiClient, GeminiError, GenerateContentRequest};

use super::{BaseAI, EmptyCompletion};

const JSON_MIME_TYPE: &str = "application/json";

/// Gemini implementation of AI capabilities
#[derive(Clone)]
pub struct GeminiAI {
    client: GeminiClient,
    default_model: String,
}

impl GeminiAI {
    pub fn new(client: GeminiClient, default_model: impl Into<String>) -> Self {
        Self {
            client,
            default_model: default_model.into(),
        }
    }

    /// Build from an API key, with an optional base URL override
    pub fn from_config(api_key: &str, model: &str, base_url: Option<&str>) -> Self {
        let client = match base_url {
            Some(url) => GeminiClient::new(api_key).with_base_url(url),
            None => GeminiClient::new(api_key),
        };
        Self::new(client, model)
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}

/// Request for one completion. Gemini is asked for a JSON body directly.
fn json_request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest::from_prompt(prompt).response_mime_type(JSON_MIME_TYPE)
}

#[async_trait]
impl BaseAI for GeminiAI {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let model_id = self.default_model.as_str();

        tracing::info!(
            model = model_id,
            prompt_length = prompt.len(),
            "Calling Gemini API"
        );

        let response = self
            .client
            .generate_text(model_id, &json_request(prompt))
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    model = model_id,
                    prompt_preview = %prompt.chars().take(200).collect::<String>(),
                    "Gemini API call failed"
                );
                match e {
                    GeminiError::EmptyResponse(reason) => EmptyCompletion(reason).into(),
                    other => anyhow::Error::new(other).context("Failed to call Gemini API"),
                }
            })?;

        tracing::info!(
            model = model_id,
            response_length = response.text.len(),
            total_tokens = response.usage.as_ref().map(|u| u.total_token_count),
            "Gemini API response received"
        );

        Ok(response.text)
    }
}
