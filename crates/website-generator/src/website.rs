//! Per-lead website generation.

use crate::render::{assemble_document, is_full_document, render_template, replace_title, tagline, template_data};
use crate::{GeneratorError, GeneratorResult};
use admin_store::{Id, Lead, WebsiteTemplate};
use chrono::{DateTime, Utc};
use llm_content::{generate_website_content, GenerationMode, LlmBackend, LlmProvider, WebsiteContent};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a generated site came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub template_id: Id,
    pub template_name: String,
    pub lead_id: Id,
    pub provider: LlmProvider,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

/// A rendered website ready to deploy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWebsite {
    pub html: String,
    pub css: String,
    pub content: WebsiteContent,
    pub metadata: GenerationMetadata,
}

/// Renders website templates with LLM-written copy.
#[derive(Clone)]
pub struct WebsiteGenerator {
    backend: Arc<dyn LlmBackend>,
}

impl WebsiteGenerator {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn LlmBackend> {
        &self.backend
    }

    async fn content(
        &self,
        template: &WebsiteTemplate,
        lead: &Lead,
        mode: GenerationMode,
    ) -> GeneratorResult<WebsiteContent> {
        generate_website_content(&*self.backend, lead, template, mode)
            .await
            .map_err(|e| {
                warn!(lead_id = lead.id, template_id = template.id, error = %e, "Unusable website content");
                GeneratorError::from_content(e)
            })
    }

    /// Generate copy for `lead` and render it into `template`.
    pub async fn generate_website(
        &self,
        template: &WebsiteTemplate,
        lead: &Lead,
    ) -> GeneratorResult<GeneratedWebsite> {
        let content = self.content(template, lead, GenerationMode::Full).await?;
        let data = template_data(lead, &content);
        let rendered = render_template(&template.html, &data)?;

        let css = template.css.clone().unwrap_or_default();
        let title = page_title(lead.display_company(), tagline(&content));
        let html = assemble_document(&rendered, &css, &title);

        info!(
            lead_id = lead.id,
            template_id = template.id,
            provider = %self.backend.provider(),
            bytes = html.len(),
            "Website generated"
        );

        Ok(GeneratedWebsite {
            html,
            css,
            content,
            metadata: GenerationMetadata {
                template_id: template.id,
                template_name: template.name.clone(),
                lead_id: lead.id,
                provider: self.backend.provider(),
                model: self.backend.model().to_string(),
                generated_at: Utc::now(),
            },
        })
    }

    /// Render a quick preview page titled `"{company} - Preview"`.
    pub async fn generate_preview(&self, template: &WebsiteTemplate, lead: &Lead) -> GeneratorResult<String> {
        let content = self.content(template, lead, GenerationMode::Preview).await?;
        let data = template_data(lead, &content);
        let rendered = render_template(&template.html, &data)?;

        let css = template.css.as_deref().unwrap_or("");
        let title = format!("{} - Preview", lead.display_company());
        let html = if is_full_document(&rendered) {
            replace_title(&assemble_document(&rendered, css, &title), &title)
        } else {
            assemble_document(&rendered, css, &title)
        };
        debug!(lead_id = lead.id, template_id = template.id, "Preview rendered");
        Ok(html)
    }
}

fn page_title(company: &str, tagline: &str) -> String {
    if tagline.is_empty() {
        company.to_string()
    } else {
        format!("{company} - {tagline}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{lead, ScriptedBackend};
    use admin_store::{Entity, NewWebsiteTemplate};

    const REPLY: &str = r#"Sure! ```json
{
  "headline": "Fresh Bread Daily",
  "subheadline": "Baked before sunrise",
  "description": "A neighborhood bakery.",
  "services": [{"title": "Sourdough", "description": "Slow fermented"}],
  "callToAction": {"text": "Visit us", "buttonText": "Order <now>"},
  "aboutUs": "Three generations of bakers."
}
```"#;

    fn template(html: &str, css: Option<&str>) -> WebsiteTemplate {
        WebsiteTemplate::from_new(
            7,
            NewWebsiteTemplate {
                name: "Storefront".to_string(),
                html: html.to_string(),
                css: css.map(str::to_string),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn renders_fragment_into_document() {
        let backend = Arc::new(ScriptedBackend::replying(REPLY));
        let generator = WebsiteGenerator::new(backend.clone());
        let template = template(
            "<h1>{{headline}}</h1><p>{company}</p><a>{{callToAction.buttonText}}</a>{{#each services}}<li>{{this.title}}</li>{{/each}}",
            Some(".hero { color: #333; }"),
        );

        let site = generator.generate_website(&template, &lead()).await.unwrap();
        assert!(site.html.starts_with("<!DOCTYPE html>"));
        assert!(site.html.contains("<title>Doe Bakery - Baked before sunrise</title>"));
        assert!(site.html.contains("<h1>Fresh Bread Daily</h1>"));
        assert!(site.html.contains("<p>Doe Bakery</p>"));
        assert!(site.html.contains("<a>Order &lt;now&gt;</a>"));
        assert!(site.html.contains("<li>Sourdough</li>"));
        assert!(site.html.contains(".hero { color: #333; }"));
        assert_eq!(site.css, ".hero { color: #333; }");
        assert_eq!(site.content.about_us, "Three generations of bakers.");
        assert_eq!(site.metadata.template_id, 7);
        assert_eq!(site.metadata.lead_id, 2);
        assert_eq!(site.metadata.model, "scripted");
        assert!(backend.last_prompt().contains("- Name: Doe Bakery"));
    }

    #[tokio::test]
    async fn full_document_keeps_single_skeleton() {
        let generator = WebsiteGenerator::new(Arc::new(ScriptedBackend::replying(REPLY)));
        let template = template(
            "<!DOCTYPE html><html><head><title>{{companyName}}</title></head><body>{{about}}</body></html>",
            Some("body { margin: 0; }"),
        );

        let site = generator.generate_website(&template, &lead()).await.unwrap();
        assert_eq!(site.html.matches("<html").count(), 1);
        assert!(site.html.contains("<title>Doe Bakery</title><style>"));
        assert!(site.html.contains("<body>Three generations of bakers.</body>"));
    }

    #[tokio::test]
    async fn preview_uses_preview_title_and_prompt() {
        let backend = Arc::new(ScriptedBackend::replying(REPLY));
        let generator = WebsiteGenerator::new(backend.clone());

        let fragment = generator
            .generate_preview(&template("<h1>{{headline}}</h1>", None), &lead())
            .await
            .unwrap();
        assert!(fragment.contains("<title>Doe Bakery - Preview</title>"));
        assert!(backend.last_prompt().contains("quick preview"));

        let document = generator
            .generate_preview(
                &template("<html><head><title>Old</title></head><body></body></html>", None),
                &lead(),
            )
            .await
            .unwrap();
        assert!(document.contains("<title>Doe Bakery - Preview</title>"));
        assert!(!document.contains("Old"));
    }

    #[tokio::test]
    async fn llm_failure_is_reported() {
        let generator = WebsiteGenerator::new(Arc::new(ScriptedBackend::failing()));
        let result = generator.generate_website(&template("<p></p>", None), &lead()).await;
        assert!(matches!(result, Err(GeneratorError::Llm(_))));
    }

    #[tokio::test]
    async fn unparseable_content_is_reported() {
        let generator = WebsiteGenerator::new(Arc::new(ScriptedBackend::replying("no json here")));
        let result = generator.generate_website(&template("<p></p>", None), &lead()).await;
        assert!(matches!(result, Err(GeneratorError::Content(_))));
    }

    #[tokio::test]
    async fn broken_template_is_reported() {
        let generator = WebsiteGenerator::new(Arc::new(ScriptedBackend::replying(REPLY)));
        let result = generator
            .generate_website(&template("{{#if headline}}<p>", None), &lead())
            .await;
        assert!(matches!(result, Err(GeneratorError::TemplateCompile(_))));
    }
}
