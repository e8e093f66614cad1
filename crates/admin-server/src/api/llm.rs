//! Provider diagnostics: `/api/test-llm` and `/api/llm/models`.

use crate::api::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::app::AppState;
use axum::extract::State;
use axum::Json;
use llm_content::{ModelInfo, TokenUsage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestLlmRequest {
    pub provider: Option<String>,
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestLlmResponse {
    pub success: bool,
    pub provider: String,
    pub model: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn test_llm(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TestLlmRequest>,
) -> ApiResult<Json<TestLlmResponse>> {
    let (Some(provider), Some(prompt)) = (non_blank(request.provider), non_blank(request.prompt)) else {
        return Err(ApiError::bad_request("Provider and prompt are required"));
    };

    let mut config = state.llm_config(Some(&provider))?;
    if let Some(model) = non_blank(request.model) {
        config = config.with_model(model);
    }
    if let Some(api_key) = non_blank(request.api_key) {
        config = config.with_api_key(api_key);
    }

    let backend = state.llm.backend(config);
    let reply = backend.complete(&prompt).await?;
    tracing::info!(provider = %backend.provider(), model = backend.model(), "LLM test completed");

    Ok(Json(TestLlmResponse {
        success: true,
        provider: backend.provider().to_string(),
        model: backend.model().to_string(),
        response: reply.text,
        usage: reply.usage,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelsQuery {
    pub provider: Option<String>,
}

pub async fn models(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ModelsQuery>,
) -> ApiResult<Json<Vec<ModelInfo>>> {
    let config = state.llm_config(query.provider.as_deref())?;
    Ok(Json(state.llm.list_models(config).await?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{read_json, send, test_state};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_llm_echoes_reply() {
        let (state, _dir) = test_state().await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/test-llm",
            Some(json!({"provider": "openrouter", "prompt": "Say hi", "model": "meta/llama"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response = read_json(&body);
        assert_eq!(response["success"], true);
        assert_eq!(response["provider"], "openrouter");
        assert_eq!(response["model"], "meta/llama");
        assert!(response["response"].as_str().unwrap().contains("Fresh bread daily"));
        assert_eq!(response["usage"]["totalTokens"], 30);
    }

    #[tokio::test]
    async fn test_llm_requires_provider_and_prompt() {
        let (state, _dir) = test_state().await;

        let (status, body) = send(&state, Method::POST, "/api/test-llm", Some(json!({"provider": "openai"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(read_json(&body)["error"], "Provider and prompt are required");

        let (status, _) = send(
            &state,
            Method::POST,
            "/api/test-llm",
            Some(json!({"provider": "cohere", "prompt": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            Method::POST,
            "/api/test-llm",
            Some(json!({"provider": "openai", "prompt": "hi", "model": "fail"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn lists_models_for_provider() {
        let (state, _dir) = test_state().await;

        let (status, body) = send(&state, Method::GET, "/api/llm/models?provider=google", None).await;
        assert_eq!(status, StatusCode::OK);
        let models = read_json(&body);
        assert_eq!(models[0]["provider"], "google");

        let (status, _) = send(&state, Method::GET, "/api/llm/models?provider=nope", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
