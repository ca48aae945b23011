//! YAML application settings. Only `vault.path` is mandatory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use vaultqa_core::PlanningConfig;
use vaultqa_llm::OllamaOptions;
use vaultqa_tools::VaultLimits;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0} (copy config.yaml.example to config.yaml and edit it)")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub vault: VaultSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub modules: ModulesSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub tools: ToolsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub provider: String,
    pub ollama: OllamaSettings,
    pub temperature: f32,
    pub num_ctx: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            ollama: OllamaSettings::default(),
            temperature: 0.0,
            num_ctx: 4096,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub model: String,
    pub base_url: String,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            model: "qwen2.5:3b".into(),
            base_url: "http://localhost:11434".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Model request timeout in seconds.
    pub timeout: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { timeout: 120 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModulesSettings {
    pub planning: PlanningSettings,
    pub retrieval: RetrievalSettings,
}

/// `modules.planning`: the on/off switch plus the planner limits.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanningSettings {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(flatten)]
    pub config: PlanningConfig,
}

impl Default for PlanningSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            config: PlanningConfig::default(),
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub max_file_lines: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { max_file_lines: 80 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "INFO".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsSettings {
    pub filesystem: FilesystemSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesystemSettings {
    pub max_folder_items: usize,
    pub max_search_results: usize,
    pub max_grep_results: usize,
}

impl Default for FilesystemSettings {
    fn default() -> Self {
        let limits = VaultLimits::default();
        Self {
            max_folder_items: limits.max_folder_items,
            max_search_results: limits.max_search_results,
            max_grep_results: limits.max_grep_results,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = serde_yaml::from_str(text)?;
        settings.vault.path = expand_home(&settings.vault.path);
        Ok(settings)
    }

    /// Check the provider is supported and the vault holds at least one
    /// markdown note. Returns the number of notes found.
    pub fn validate(&self) -> Result<usize, ConfigError> {
        if self.model.provider != "ollama" {
            return Err(ConfigError::Invalid(format!(
                "unsupported model provider: {}",
                self.model.provider
            )));
        }
        let root = &self.vault.path;
        if !root.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "vault path does not exist: {}",
                root.display()
            )));
        }
        let notes = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|x| x == "md"))
            .count();
        if notes == 0 {
            return Err(ConfigError::Invalid(format!(
                "no markdown files found in: {}",
                root.display()
            )));
        }
        Ok(notes)
    }

    pub fn vault_limits(&self) -> VaultLimits {
        let fs = &self.tools.filesystem;
        VaultLimits {
            max_folder_items: fs.max_folder_items,
            max_search_results: fs.max_search_results,
            max_grep_results: fs.max_grep_results,
            max_file_lines: self.modules.retrieval.max_file_lines,
        }
    }

    pub fn ollama_options(&self) -> OllamaOptions {
        OllamaOptions {
            temperature: self.model.temperature,
            num_ctx: self.model.num_ctx,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.agent.timeout)
    }

    /// `tracing` filter directive for the configured level.
    pub fn log_filter(&self) -> String {
        match self.logging.level.to_ascii_lowercase().as_str() {
            "warning" => "warn".to_string(),
            "critical" => "error".to_string(),
            other => other.to_string(),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}
