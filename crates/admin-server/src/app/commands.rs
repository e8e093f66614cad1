//! One-shot CLI commands.

use admin_config::{Config, Paths};
use admin_store::{seed, SqliteStore};
use anyhow::Context;
use llm_content::{LlmClient, LlmConfig};
use tracing::info;

fn resolve_llm(config: &Config, provider: Option<&str>) -> anyhow::Result<LlmConfig> {
    let name = provider.unwrap_or(&config.llm.default_provider);
    Ok(LlmConfig::resolve(&config.llm, name)?)
}

/// Populate the SQLite database with the sample data set.
pub async fn seed_database(paths: &Paths) -> anyhow::Result<()> {
    paths.ensure_dirs()?;
    let path = paths.database_file();
    let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    if !store.is_empty().await? {
        println!("Database at {} already has data; nothing to do", path.display());
        return Ok(());
    }

    let summary = seed::populate(&store).await?;
    info!(path = %path.display(), leads = summary.leads, "Database seeded");
    println!("Seeded {}:", path.display());
    println!("  leads:             {}", summary.leads);
    println!("  website templates: {}", summary.website_templates);
    println!("  email templates:   {}", summary.email_templates);
    println!("  orders:            {}", summary.orders);
    Ok(())
}

/// Create the runtime directories and write a default config if none exists.
pub fn setup(config: &Config, paths: &Paths) -> anyhow::Result<()> {
    paths.ensure_dirs()?;
    std::fs::create_dir_all(config.deployment_base_path(paths))?;

    let config_file = paths.config_file();
    if config_file.exists() {
        println!("Config already exists: {}", config_file.display());
    } else {
        Config::default().save(paths)?;
        println!("Wrote default config: {}", config_file.display());
    }
    println!("Database:    {}", paths.database_file().display());
    println!("Logs:        {}", paths.log_file().display());
    println!("Deployments: {}", config.deployment_base_path(paths).display());
    Ok(())
}

/// Send one prompt and print the reply with its token usage.
pub async fn test_llm(
    config: &Config,
    provider: Option<&str>,
    prompt: &str,
    model: Option<String>,
) -> anyhow::Result<()> {
    let mut llm = resolve_llm(config, provider)?;
    if let Some(model) = model {
        llm = llm.with_model(model);
    }
    let provider = llm.provider;
    let model = llm.model.clone();

    let response = LlmClient::new(llm)
        .complete(prompt)
        .await
        .with_context(|| format!("{provider} request failed"))?;

    println!("Provider: {provider} ({model})");
    println!();
    println!("{}", response.text);
    if let Some(usage) = response.usage {
        println!();
        println!(
            "Tokens: prompt {}, completion {}, total {}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
    Ok(())
}

/// Print the models a provider offers.
pub async fn list_models(config: &Config, provider: Option<&str>) -> anyhow::Result<()> {
    let llm = resolve_llm(config, provider)?;
    let provider = llm.provider;
    let models = LlmClient::new(llm)
        .list_models()
        .await
        .with_context(|| format!("failed to list {provider} models"))?;

    if models.is_empty() {
        println!("No models reported by {provider}");
        return Ok(());
    }
    for model in models {
        match model.context_length {
            Some(context) => println!("{:<50} {} ({} tokens)", model.id, model.name, context),
            None => println!("{:<50} {}", model.id, model.name),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_store::Store;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tempfile::tempdir;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn openai_config(base_url: &str) -> Config {
        let mut config = Config::default();
        config.llm.default_provider = "openai".to_string();
        config.llm.openai.api_key = Some("sk-test".to_string());
        config.llm.openai.base_url = Some(base_url.to_string());
        config
    }

    #[tokio::test]
    async fn seed_populates_once() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("leadsite"));

        seed_database(&paths).await.unwrap();
        seed_database(&paths).await.unwrap();

        let store = SqliteStore::open(&paths.database_file()).await.unwrap();
        assert_eq!(store.list_leads().await.unwrap().len(), 5);
        assert_eq!(store.list_website_templates().await.unwrap().len(), 3);
        assert_eq!(store.list_orders().await.unwrap().len(), 3);
    }

    #[test]
    fn setup_creates_layout_and_keeps_existing_config() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("leadsite"));
        let config = Config::default();

        setup(&config, &paths).unwrap();
        assert!(paths.config_file().exists());
        assert!(paths.logs_dir().is_dir());
        assert!(config.deployment_base_path(&paths).is_dir());
        assert_eq!(Config::load_from_file(&paths.config_file()).unwrap().server.port, 3000);

        let custom = r#"{ "log_level": "debug", "server": { "host": "0.0.0.0", "port": 9000 } }"#;
        std::fs::write(paths.config_file(), custom).unwrap();
        setup(&config, &paths).unwrap();
        assert_eq!(std::fs::read_to_string(paths.config_file()).unwrap(), custom);
    }

    #[tokio::test]
    async fn test_llm_prints_completion() {
        async fn chat() -> Json<Value> {
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "pong" } }],
                "usage": { "prompt_tokens": 4, "completion_tokens": 1, "total_tokens": 5 }
            }))
        }
        let base = spawn(Router::new().route("/v1/chat/completions", post(chat))).await;

        test_llm(&openai_config(&base), None, "ping", Some("gpt-4o-mini".to_string()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_llm_reports_provider_errors() {
        async fn chat() -> (StatusCode, Json<Value>) {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": { "message": "quota exceeded" } })),
            )
        }
        let base = spawn(Router::new().route("/v1/chat/completions", post(chat))).await;

        let err = test_llm(&openai_config(&base), Some("openai"), "ping", None)
            .await
            .unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("openai request failed"));
        assert!(rendered.contains("429"));
        assert!(rendered.contains("quota exceeded"));

        let err = test_llm(&openai_config(&base), Some("cohere"), "ping", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cohere"));
    }

    #[tokio::test]
    async fn list_models_reads_provider_catalog() {
        async fn models() -> Json<Value> {
            Json(json!({ "data": [{ "id": "gpt-4o" }, { "id": "gpt-4o-mini" }] }))
        }
        let base = spawn(Router::new().route("/v1/models", get(models))).await;
        list_models(&openai_config(&base), None).await.unwrap();

        let err = list_models(&openai_config("http://127.0.0.1:9"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to list openai models"));
    }
}
