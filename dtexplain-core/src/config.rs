//! Configuration system for dtexplain.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/dtexplain/config.toml` and/or
//! `.dtexplain/config.toml` in the workspace directory.

use crate::tree::DEFAULT_EXPORT_DEPTH;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Provider names accepted in `llm.provider`.
pub const SUPPORTED_PROVIDERS: &[&str] =
    &["openai", "openai-compatible", "azure", "ollama", "vllm"];

/// Top-level configuration for dtexplain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplainConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub questions: QuestionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration for the chat-completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name, one of [`SUPPORTED_PROVIDERS`]. All of them speak the
    /// OpenAI chat-completions protocol; "openai" defaults to the public
    /// endpoint, the others expect `base_url`.
    pub provider: String,
    /// Model identifier (e.g., "gpt-4", "gpt-4o-mini").
    pub model: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Optional base URL override for the API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// API key supplied directly. Takes precedence over `api_key_env`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Sampling temperature. The provider default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate. The provider default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    /// System message sent ahead of every prompt.
    pub system_prompt: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: None,
            api_key: None,
            temperature: None,
            max_tokens: None,
            system_prompt: "You are a helpful assistant.".to_string(),
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Validate this LLM config and return any warnings.
    ///
    /// Returns an empty Vec if the config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.is_supported_provider() {
            warnings.push(format!(
                "llm.provider '{}' is not one of: {}",
                self.provider,
                SUPPORTED_PROVIDERS.join(", ")
            ));
        } else if self.provider != "openai" && self.base_url.is_none() {
            warnings.push(format!(
                "llm.provider '{}' has no llm.base_url; requests go to the OpenAI API",
                self.provider
            ));
        }
        if self.model.trim().is_empty() {
            warnings.push("llm.model is empty".to_string());
        }
        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            warnings.push(format!("llm.temperature ({t}) is outside 0.0..=2.0"));
        }
        if self.timeout_secs == 0 {
            warnings.push("llm.timeout_secs is 0; requests will time out immediately".to_string());
        }
        warnings
    }

    /// Whether `provider` names a supported provider.
    pub fn is_supported_provider(&self) -> bool {
        SUPPORTED_PROVIDERS.contains(&self.provider.as_str())
    }
}

/// Wording of the generated explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// What the dataset is about, as in "a dataset for {dataset}".
    pub dataset: String,
    /// Background the LLM should draw on, as in "knowledge of the features and {domain}".
    pub domain: String,
    /// Depth at which the tree text handed to the LLM is truncated.
    pub tree_max_depth: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            dataset: "network intrusion detection".to_string(),
            domain: "network traffic".to_string(),
            tree_max_depth: DEFAULT_EXPORT_DEPTH,
        }
    }
}

/// Probing question generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionConfig {
    /// Append the "was this feature considered" pair.
    pub sanity_questions: bool,
    /// Seed for picking sanity-question features. Random when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            sanity_questions: true,
            seed: None,
        }
    }
}

/// Where explanation reports are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; reports land in `{dir}/{prefix}/example_{index}.txt`.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("exps"),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "dtexplain", "dtexplain")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".dtexplain").join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `DTEXPLAIN_`)
/// 3. Workspace-local config (`.dtexplain/config.toml`)
/// 4. User config (`~/.config/dtexplain/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&ExplainConfig>,
) -> Result<ExplainConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ExplainConfig::default()));

    if let Some(user_config) = user_config_path()
        && user_config.exists()
    {
        figment = figment.merge(Toml::file(&user_config));
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // DTEXPLAIN_LLM__MODEL, DTEXPLAIN_PROMPT__DATASET, etc.
    figment = figment.merge(Env::prefixed("DTEXPLAIN_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// Write the default configuration to `.dtexplain/config.toml` under
/// `workspace`, refusing to overwrite an existing file.
pub fn write_default_config(workspace: &Path) -> Result<PathBuf, crate::error::ExplainError> {
    let path = workspace_config_path(workspace);
    if path.exists() {
        return Err(crate::error::ConfigError::Invalid {
            message: format!("{} already exists", path.display()),
        }
        .into());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(&ExplainConfig::default()).map_err(|e| {
        crate::error::ConfigError::ParseError {
            message: e.to_string(),
        }
    })?;
    std::fs::write(&path, content)?;
    Ok(path)
}
