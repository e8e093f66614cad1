//! HTTP clients for the content-generation providers.
//!
//! OpenAI and OpenRouter share the chat-completions wire format. Google's
//! Generative Language API takes `contents[].parts[]` and answers with
//! `candidates`.

use crate::{LlmConfig, LlmError, LlmProvider, LlmResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const SYSTEM_PROMPT: &str = include_str!("system_prompt.txt");

fn system_prompt() -> &'static str {
    SYSTEM_PROMPT.trim()
}

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(alias = "prompt_tokens")]
    pub prompt_tokens: u32,
    #[serde(alias = "completion_tokens")]
    pub completion_tokens: u32,
    #[serde(alias = "total_tokens")]
    pub total_tokens: u32,
}

/// One completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub prompt: String,
    pub completion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
}

/// A model a provider offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: LlmProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<ModelPricing>,
}

/// The completion seam the generators depend on.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    fn provider(&self) -> LlmProvider;

    fn model(&self) -> &str;

    async fn complete(&self, prompt: &str) -> LlmResult<LlmResponse>;
}

// ==========================================
// Wire formats
// ==========================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiModelList {
    #[serde(default)]
    data: Vec<OpenAiModel>,
}

#[derive(Debug, Deserialize)]
struct OpenAiModel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OpenRouterModelList {
    #[serde(default)]
    data: Vec<OpenRouterModel>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterModel {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    context_length: Option<u64>,
    #[serde(default)]
    pricing: Option<ModelPricing>,
}

#[derive(Debug, Deserialize)]
struct GoogleModelList {
    #[serde(default)]
    models: Vec<GoogleModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleModel {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    input_token_limit: Option<u64>,
}

// ==========================================
// Client
// ==========================================

/// Client for one configured provider.
#[derive(Clone, Debug)]
pub struct LlmClient {
    http_client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }

    /// Client for `provider` with its API key taken from the environment.
    pub fn from_env(provider: LlmProvider) -> Self {
        Self::new(LlmConfig::from_env(provider))
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn api_key(&self) -> LlmResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingApiKey(self.config.provider))
    }

    /// Run one completion against the configured provider.
    pub async fn complete(&self, prompt: &str) -> LlmResult<LlmResponse> {
        let api_key = self.api_key()?;
        tracing::debug!(
            provider = %self.config.provider,
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending completion request"
        );

        let response = match self.config.provider {
            LlmProvider::OpenAi => self.call_openai(api_key, prompt).await?,
            LlmProvider::OpenRouter => self.call_openrouter(api_key, prompt).await?,
            LlmProvider::Google => self.call_google(api_key, prompt).await?,
        };

        tracing::info!(
            provider = %self.config.provider,
            total_tokens = response.usage.map(|u| u.total_tokens).unwrap_or(0),
            "Completion received"
        );
        Ok(response)
    }

    fn chat_request<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt(),
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    async fn call_openai(&self, api_key: &str, prompt: &str) -> LlmResult<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let response = self
            .http_client
            .post(url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&self.chat_request(prompt))
            .send()
            .await?;

        let completion: ChatCompletionResponse = self.read_json(response).await?;
        chat_into_response(completion)
    }

    async fn call_openrouter(&self, api_key: &str, prompt: &str) -> LlmResult<LlmResponse> {
        let url = format!("{}/api/v1/chat/completions", self.config.base_url());
        let mut request = self
            .http_client
            .post(url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json");
        if let Some(site_url) = &self.config.site_url {
            request = request.header("HTTP-Referer", site_url);
        }
        if let Some(site_name) = &self.config.site_name {
            request = request.header("X-Title", site_name);
        }

        let response = request.json(&self.chat_request(prompt)).send().await?;
        let completion: ChatCompletionResponse = self.read_json(response).await?;
        chat_into_response(completion)
    }

    async fn call_google(&self, api_key: &str, prompt: &str) -> LlmResult<LlmResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url(),
            self.config.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: system_prompt(),
                    },
                    Part { text: prompt },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let response = self
            .http_client
            .post(url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let generated: GenerateContentResponse = self.read_json(response).await?;
        let candidate = generated
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;
        let text = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        let usage = generated
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            text,
            usage: Some(usage),
        })
    }

    /// List the models the provider exposes for this key.
    pub async fn list_models(&self) -> LlmResult<Vec<ModelInfo>> {
        let api_key = self.api_key()?;
        let provider = self.config.provider;

        let models = match provider {
            LlmProvider::OpenAi => {
                let response = self
                    .http_client
                    .get(format!("{}/v1/models", self.config.base_url()))
                    .header("Authorization", format!("Bearer {api_key}"))
                    .send()
                    .await?;
                let list: OpenAiModelList = self.read_json(response).await?;
                list.data
                    .into_iter()
                    .map(|m| ModelInfo {
                        name: m.id.clone(),
                        id: m.id,
                        provider,
                        context_length: None,
                        pricing: None,
                    })
                    .collect()
            }
            LlmProvider::OpenRouter => {
                let response = self
                    .http_client
                    .get(format!("{}/api/v1/models", self.config.base_url()))
                    .header("Authorization", format!("Bearer {api_key}"))
                    .send()
                    .await?;
                let list: OpenRouterModelList = self.read_json(response).await?;
                list.data
                    .into_iter()
                    .map(|m| ModelInfo {
                        name: m.name.unwrap_or_else(|| m.id.clone()),
                        id: m.id,
                        provider,
                        context_length: m.context_length,
                        pricing: m.pricing,
                    })
                    .collect()
            }
            LlmProvider::Google => {
                let response = self
                    .http_client
                    .get(format!("{}/v1beta/models", self.config.base_url()))
                    .header("x-goog-api-key", api_key)
                    .send()
                    .await?;
                let list: GoogleModelList = self.read_json(response).await?;
                list.models
                    .into_iter()
                    .map(|m| {
                        let id = m
                            .name
                            .strip_prefix("models/")
                            .unwrap_or(&m.name)
                            .to_string();
                        ModelInfo {
                            name: m.display_name.unwrap_or_else(|| id.clone()),
                            id,
                            provider,
                            context_length: m.input_token_limit,
                            pricing: None,
                        }
                    })
                    .collect()
            }
        };

        Ok(models)
    }

    /// `true` iff listing models succeeds with the configured key.
    pub async fn validate_api_key(&self) -> bool {
        if !self.config.has_api_key() {
            return false;
        }
        match self.list_models().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(provider = %self.config.provider, error = %e, "API key validation failed");
                false
            }
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> LlmResult<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(
                provider = %self.config.provider,
                status,
                body_summary = %body_summary,
                "Provider API error"
            );
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("upstream error ({body_summary})"));
            return Err(LlmError::ApiError {
                provider: self.config.provider,
                status,
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn chat_into_response(completion: ChatCompletionResponse) -> LlmResult<LlmResponse> {
    let text = completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

    Ok(LlmResponse {
        text,
        usage: completion.usage,
    })
}

#[async_trait]
impl LlmBackend for LlmClient {
    fn provider(&self) -> LlmProvider {
        self.config.provider
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> LlmResult<LlmResponse> {
        LlmClient::complete(self, prompt).await
    }
}
