// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::constants::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// Azure OpenAI chat completions deployment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,

    /// Deployment name
    pub deployment: String,

    /// Sent as the `api-key` header
    pub api_key: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Azure Blob Storage container for uploads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Account URL including the trailing slash
    pub url: String,

    pub container: String,

    /// SAS token including the leading `?`
    pub sas_token: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub completion: CompletionConfig,

    /// Uploads are refused with an error message when unset
    pub storage: Option<StorageConfig>,

    /// JSONL file receiving conversation summaries ("send via email")
    pub outbox_path: PathBuf,

    /// Documents the model's knowledge base already holds
    pub known_documents: Vec<String>,
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        let completion = &self.completion;
        let mut missing = Vec::new();
        if completion.endpoint.trim().is_empty() {
            missing.push("completion.endpoint (AZURE_AI_ENDPOINT)");
        }
        if completion.deployment.trim().is_empty() {
            missing.push("completion.deployment (AZURE_DEPLOYMENT_NAME)");
        }
        if completion.api_key.trim().is_empty() {
            missing.push("completion.api_key (AZURE_AI_KEY)");
        }
        if !missing.is_empty() {
            anyhow::bail!("Missing completion settings: {}", missing.join(", "));
        }

        if !(0.0..=2.0).contains(&completion.temperature) {
            anyhow::bail!(
                "completion.temperature must be between 0.0 and 2.0 (got {})",
                completion.temperature
            );
        }
        if completion.max_tokens == 0 {
            anyhow::bail!("completion.max_tokens must be greater than zero");
        }

        if let Some(storage) = &self.storage {
            if storage.url.trim().is_empty() || storage.container.trim().is_empty() {
                anyhow::bail!("storage.url and storage.container must both be set");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            completion: CompletionConfig {
                endpoint: "https://example.openai.azure.com".to_string(),
                deployment: "gpt-4o".to_string(),
                api_key: "key".to_string(),
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: DEFAULT_MAX_TOKENS,
            },
            storage: None,
            outbox_path: PathBuf::from("/tmp/outbox.jsonl"),
            known_documents: vec![],
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_missing_key_is_reported() {
        let mut cfg = config();
        cfg.completion.api_key = String::new();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("AZURE_AI_KEY"));
    }

    #[test]
    fn test_temperature_range() {
        let mut cfg = config();
        cfg.completion.temperature = 3.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_incomplete_storage() {
        let mut cfg = config();
        cfg.storage = Some(StorageConfig {
            url: "https://acct.blob.core.windows.net/".to_string(),
            container: String::new(),
            sas_token: "?sv=1".to_string(),
        });
        assert!(cfg.validate().is_err());
    }
}
