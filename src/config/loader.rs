// Configuration loader
// Loads settings from ~/.skillable/config.toml, then applies environment overrides

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{CONFIG_DIR_NAME, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use super::settings::{CompletionConfig, Config, StorageConfig};

/// Environment variables that override file settings
pub const ENV_ENDPOINT: &str = "AZURE_AI_ENDPOINT";
pub const ENV_DEPLOYMENT: &str = "AZURE_DEPLOYMENT_NAME";
pub const ENV_API_KEY: &str = "AZURE_AI_KEY";
pub const ENV_STORAGE_URL: &str = "AZURE_STORAGE_URL";
pub const ENV_CONTAINER: &str = "AZURE_CONTAINER_NAME";
pub const ENV_SAS_TOKEN: &str = "AZURE_SAS_TOKEN";

// Every field is optional here so that the environment can fill the gaps.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    completion: TomlCompletion,
    #[serde(default)]
    storage: TomlStorage,
    #[serde(default)]
    outbox: TomlOutbox,
    #[serde(default)]
    knowledge: TomlKnowledge,
}

#[derive(Debug, Default, Deserialize)]
struct TomlCompletion {
    endpoint: Option<String>,
    deployment: Option<String>,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlStorage {
    url: Option<String>,
    container: Option<String>,
    sas_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlOutbox {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlKnowledge {
    #[serde(default)]
    documents: Vec<String>,
}

/// Default config file location (`~/.skillable/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join("config.toml"))
}

/// Load configuration from `path` (or the default location) and the
/// process environment.
///
/// An explicit `path` must exist; the default location is optional when
/// the environment provides the completion settings.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let contents = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?,
        ),
        None => match default_config_path() {
            Some(default) if default.exists() => Some(
                fs::read_to_string(&default)
                    .with_context(|| format!("Failed to read config file {}", default.display()))?,
            ),
            _ => None,
        },
    };

    let config = build_config(contents.as_deref(), |name| std::env::var(name).ok())?;
    tracing::debug!(
        deployment = %config.completion.deployment,
        uploads = config.storage.is_some(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Combine optional TOML contents with environment lookups.
///
/// Split out from [`load_config`] so tests can inject both.
pub fn build_config<F>(contents: Option<&str>, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let toml_config: TomlConfig = match contents {
        Some(text) => toml::from_str(text).context("Failed to parse config file")?,
        None => TomlConfig::default(),
    };

    let pick = |name: &str, file_value: Option<String>| -> Option<String> {
        env(name)
            .filter(|v| !v.trim().is_empty())
            .or(file_value)
            .filter(|v| !v.trim().is_empty())
    };

    let completion = CompletionConfig {
        endpoint: pick(ENV_ENDPOINT, toml_config.completion.endpoint).unwrap_or_default(),
        deployment: pick(ENV_DEPLOYMENT, toml_config.completion.deployment).unwrap_or_default(),
        api_key: pick(ENV_API_KEY, toml_config.completion.api_key).unwrap_or_default(),
        temperature: toml_config
            .completion
            .temperature
            .unwrap_or(DEFAULT_TEMPERATURE),
        max_tokens: toml_config.completion.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    };

    let storage = match (
        pick(ENV_STORAGE_URL, toml_config.storage.url),
        pick(ENV_CONTAINER, toml_config.storage.container),
    ) {
        (Some(url), Some(container)) => Some(StorageConfig {
            url,
            container,
            sas_token: pick(ENV_SAS_TOKEN, toml_config.storage.sas_token).unwrap_or_default(),
        }),
        (None, None) => None,
        _ => bail!("Blob storage needs both a URL ({}) and a container ({})", ENV_STORAGE_URL, ENV_CONTAINER),
    };

    let outbox_path = match toml_config.outbox.path {
        Some(path) => path,
        None => dirs::home_dir()
            .context("Could not determine home directory for the outbox")?
            .join(CONFIG_DIR_NAME)
            .join("outbox.jsonl"),
    };

    let config = Config {
        completion,
        storage,
        outbox_path,
        known_documents: toml_config.knowledge.documents,
    };

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FILE: &str = r#"
[completion]
endpoint = "https://file.openai.azure.com"
deployment = "gpt-file"
api_key = "file-key"
max_tokens = 900

[storage]
url = "https://acct.blob.core.windows.net/"
container = "uploads"
sas_token = "?sv=1"

[outbox]
path = "/tmp/skillable-outbox.jsonl"

[knowledge]
documents = ["inclusive-hiring.pdf"]
"#;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_file_only() {
        let config = build_config(Some(FILE), env(&[])).unwrap();
        assert_eq!(config.completion.deployment, "gpt-file");
        assert_eq!(config.completion.max_tokens, 900);
        assert_eq!(config.completion.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.storage.as_ref().unwrap().container, "uploads");
        assert_eq!(config.outbox_path, PathBuf::from("/tmp/skillable-outbox.jsonl"));
        assert_eq!(config.known_documents, vec!["inclusive-hiring.pdf".to_string()]);
    }

    #[test]
    fn test_env_overrides_file() {
        let config = build_config(
            Some(FILE),
            env(&[(ENV_API_KEY, "env-key"), (ENV_DEPLOYMENT, "")]),
        )
        .unwrap();
        assert_eq!(config.completion.api_key, "env-key");
        // Blank environment values do not clobber the file
        assert_eq!(config.completion.deployment, "gpt-file");
    }

    #[test]
    fn test_env_only() {
        let config = build_config(
            None,
            env(&[
                (ENV_ENDPOINT, "https://env.openai.azure.com"),
                (ENV_DEPLOYMENT, "gpt-env"),
                (ENV_API_KEY, "k"),
            ]),
        )
        .unwrap();
        assert!(config.storage.is_none());
        assert_eq!(config.completion.endpoint, "https://env.openai.azure.com");
    }

    #[test]
    fn test_missing_everything_fails() {
        assert!(build_config(None, env(&[])).is_err());
    }

    #[test]
    fn test_half_storage_fails() {
        let result = build_config(
            None,
            env(&[
                (ENV_ENDPOINT, "https://env.openai.azure.com"),
                (ENV_DEPLOYMENT, "gpt-env"),
                (ENV_API_KEY, "k"),
                (ENV_STORAGE_URL, "https://acct.blob.core.windows.net/"),
            ]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(build_config(Some("[completion"), env(&[])).is_err());
    }
}
