//! Configuration management for the admin backend.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Admin API listener.
    #[serde(default)]
    pub server: ServerConfig,
    /// Local multi-tenant site host.
    #[serde(default)]
    pub local_server: LocalServerConfig,
    /// Deployment output settings.
    #[serde(default)]
    pub deployment: DeploymentSettings,
    /// Data layer settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmSettings,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Admin API listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Local development site host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalServerConfig {
    /// Host name used when building deployment URLs (`{subdomain}.{host}:{port}`).
    pub host: String,
    /// Address the listener binds to.
    pub bind_address: String,
    pub port: u16,
}

impl Default for LocalServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

/// Where deployments are written and which domain production URLs use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSettings {
    /// Defaults to `~/.leadsite/deployments` when unset.
    #[serde(default)]
    pub base_path: Option<PathBuf>,
    pub domain: String,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            base_path: None,
            domain: "leadsite.app".to_string(),
        }
    }
}

/// Data layer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Data layer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Load the sample data set into an empty store on startup.
    #[serde(default = "default_true")]
    pub seed_on_start: bool,
    /// Delay every store call the way a remote backend would.
    #[serde(default)]
    pub simulated_latency: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            seed_on_start: true,
            simulated_latency: false,
        }
    }
}

/// Per-provider request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    /// Override for the provider's API origin (tests, proxies).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Read from the environment only; never persisted.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl ProviderSettings {
    fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            site_url: None,
            site_name: None,
            base_url: None,
            api_key: None,
        }
    }
}

fn default_openai() -> ProviderSettings {
    ProviderSettings::with_model("gpt-4-turbo")
}

fn default_openrouter() -> ProviderSettings {
    ProviderSettings::with_model("claude-3-opus")
}

fn default_google() -> ProviderSettings {
    ProviderSettings::with_model("gemini-pro")
}

fn default_provider() -> String {
    "openai".to_string()
}

/// LLM provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_openai")]
    pub openai: ProviderSettings,
    #[serde(default = "default_openrouter")]
    pub openrouter: ProviderSettings,
    #[serde(default = "default_google")]
    pub google: ProviderSettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            openai: default_openai(),
            openrouter: default_openrouter(),
            google: default_google(),
        }
    }
}

impl LlmSettings {
    /// Environment variable holding the API key for a provider.
    pub fn api_key_env(provider: &str) -> Option<&'static str> {
        match provider.to_ascii_lowercase().as_str() {
            "openai" => Some("OPENAI_API_KEY"),
            "openrouter" => Some("OPENROUTER_API_KEY"),
            "google" => Some("GOOGLE_AI_API_KEY"),
            _ => None,
        }
    }

    /// Settings for a provider by name.
    pub fn provider(&self, provider: &str) -> Option<&ProviderSettings> {
        match provider.to_ascii_lowercase().as_str() {
            "openai" => Some(&self.openai),
            "openrouter" => Some(&self.openrouter),
            "google" => Some(&self.google),
            _ => None,
        }
    }

    fn load_api_keys_from_env(&mut self) {
        for (name, settings) in [
            ("openai", &mut self.openai),
            ("openrouter", &mut self.openrouter),
            ("google", &mut self.google),
        ] {
            settings.api_key = Self::api_key_env(name)
                .and_then(|var| std::env::var(var).ok())
                .and_then(non_empty);
        }
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            server: ServerConfig::default(),
            local_server: LocalServerConfig::default(),
            deployment: DeploymentSettings::default(),
            storage: StorageConfig::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file. API keys are never written.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("LEADSITE_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(port) = std::env::var("LEADSITE_PORT")
            .ok()
            .and_then(|raw| raw.trim().parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Some(provider) = std::env::var("LEADSITE_LLM_PROVIDER").ok().and_then(non_empty) {
            self.llm.default_provider = provider.to_ascii_lowercase();
        }
        if let Some(backend) = std::env::var("LEADSITE_STORAGE")
            .ok()
            .and_then(|raw| StorageBackend::parse(&raw))
        {
            self.storage.backend = backend;
        }
        self.llm.load_api_keys_from_env();
    }

    /// Reject values that would only fail later at request time.
    pub fn validate(&self) -> CoreResult<()> {
        if self.llm.provider(&self.llm.default_provider).is_none() {
            return Err(CoreError::Config(format!(
                "unknown default LLM provider: {}",
                self.llm.default_provider
            )));
        }
        if self.deployment.domain.trim().is_empty() {
            return Err(CoreError::Config("deployment.domain must not be empty".into()));
        }
        for settings in [&self.llm.openai, &self.llm.openrouter, &self.llm.google] {
            if let Some(base_url) = &settings.base_url {
                Url::parse(base_url)?;
            }
        }
        Ok(())
    }

    /// Directory deployments are written to.
    pub fn deployment_base_path(&self, paths: &Paths) -> PathBuf {
        self.deployment
            .base_path
            .clone()
            .unwrap_or_else(|| paths.deployments_dir())
    }
}
