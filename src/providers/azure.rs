// Azure OpenAI chat completions provider
//
// POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...
// authenticated with the `api-key` header.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::CompletionRequest;
use super::CompletionProvider;
use crate::chat::ChatMessage;
use crate::config::constants::COMPLETION_API_VERSION;
use crate::config::CompletionConfig;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Azure OpenAI provider bound to one deployment
#[derive(Clone)]
pub struct AzureOpenAIProvider {
    client: Client,
    endpoint: String,
    deployment: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl AzureOpenAIProvider {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            deployment: config.deployment.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, COMPLETION_API_VERSION
        )
    }

    fn to_azure_request<'a>(&self, request: &'a CompletionRequest) -> AzureRequest<'a> {
        AzureRequest {
            messages: &request.messages,
            temperature: self.temperature,
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
        }
    }
}

#[async_trait]
impl CompletionProvider for AzureOpenAIProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.to_azure_request(request);
        let url = self.completions_url();

        tracing::debug!(
            messages = body.messages.len(),
            max_tokens = body.max_tokens,
            "Sending request to Azure OpenAI"
        );

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Azure OpenAI")?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Azure OpenAI request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let azure_response: AzureResponse = response
            .json()
            .await
            .context("Failed to parse Azure OpenAI response")?;

        tracing::debug!("Received response: {:?}", azure_response);

        azure_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Azure OpenAI returned no message content")
    }

    fn name(&self) -> &str {
        "azure-openai"
    }
}

// Azure OpenAI API types

#[derive(Debug, Serialize)]
struct AzureRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AzureResponse {
    choices: Vec<AzureChoice>,
}

#[derive(Debug, Deserialize)]
struct AzureChoice {
    message: AzureResponseMessage,
}

#[derive(Debug, Deserialize)]
struct AzureResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

    fn provider(endpoint: &str) -> AzureOpenAIProvider {
        AzureOpenAIProvider::new(&CompletionConfig {
            endpoint: endpoint.to_string(),
            deployment: "gpt-4o".to_string(),
            api_key: "test-key".to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
        .unwrap()
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            provider("https://res.openai.azure.com/").completions_url(),
            "https://res.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2023-05-15"
        );
    }

    #[test]
    fn test_request_body_defaults_and_overrides() {
        let p = provider("https://res.openai.azure.com");
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")]);
        let body = serde_json::to_value(p.to_azure_request(&request)).unwrap();
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["messages"][0]["role"], "user");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);

        let request = request.with_max_tokens(50);
        let body = serde_json::to_value(p.to_azure_request(&request)).unwrap();
        assert_eq!(body["max_tokens"], 50);
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider("https://x").name(), "azure-openai");
    }
}
