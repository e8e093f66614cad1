//! Provider identity and per-request configuration.

use crate::{LlmError, LlmResult};
use admin_config::{LlmSettings, ProviderSettings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A supported content-generation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    OpenRouter,
    Google,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 3] = [Self::OpenAi, Self::OpenRouter, Self::Google];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
            Self::Google => "google",
        }
    }

    /// Environment variable the API key is read from.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Google => "GOOGLE_AI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4-turbo",
            Self::OpenRouter => "claude-3-opus",
            Self::Google => "gemini-pro",
        }
    }

    /// Public API origin, without a trailing slash.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com",
            Self::OpenRouter => "https://openrouter.ai",
            Self::Google => "https://generativelanguage.googleapis.com",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "openrouter" => Ok(Self::OpenRouter),
            "google" => Ok(Self::Google),
            other => Err(LlmError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Everything needed to issue one request to a provider.
#[derive(Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
    pub base_url: Option<String>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmConfig {
    /// Provider defaults without an API key.
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            site_url: None,
            site_name: None,
            base_url: None,
        }
    }

    /// Provider defaults with the API key from the provider's environment variable.
    pub fn from_env(provider: LlmProvider) -> Self {
        let api_key = std::env::var(provider.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self {
            api_key,
            ..Self::new(provider)
        }
    }

    /// Build from persisted settings. The key comes from `settings.api_key`,
    /// which the config layer only ever fills from the environment.
    pub fn from_settings(provider: LlmProvider, settings: &ProviderSettings) -> Self {
        Self {
            provider,
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            site_url: settings.site_url.clone(),
            site_name: settings.site_name.clone(),
            base_url: settings.base_url.clone(),
        }
    }

    /// Look the provider up by name in the `llm` config section.
    pub fn resolve(settings: &LlmSettings, provider: &str) -> LlmResult<Self> {
        let provider: LlmProvider = provider.parse()?;
        let section = settings
            .provider(provider.as_str())
            .ok_or_else(|| LlmError::UnsupportedProvider(provider.to_string()))?;
        Ok(Self::from_settings(provider, section))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Effective API origin.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
