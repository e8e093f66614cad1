//! Outreach email generation.

use crate::render::substitute_tokens;
use crate::{GeneratorError, GeneratorResult};
use admin_store::{EmailTemplate, Lead};
use llm_content::{generate_email_content, LlmBackend};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
}

/// Writes personalized emails from stored email templates.
#[derive(Clone)]
pub struct EmailGenerator {
    backend: Arc<dyn LlmBackend>,
}

impl EmailGenerator {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Ask the backend to personalize `template` for `lead`.
    ///
    /// A blank subject in the reply falls back to the template subject with
    /// its tokens filled in.
    pub async fn generate_email(&self, lead: &Lead, template: &EmailTemplate) -> GeneratorResult<GeneratedEmail> {
        let content = generate_email_content(&*self.backend, lead, &template.body)
            .await
            .map_err(GeneratorError::from_content)?;

        let subject = if content.subject.trim().is_empty() {
            fill(&template.subject, lead, None)
        } else {
            content.subject
        };
        tracing::info!(lead_id = lead.id, template_id = template.id, "Email generated");
        Ok(GeneratedEmail {
            subject,
            body: content.body,
        })
    }
}

fn fill(text: &str, lead: &Lead, website_url: Option<&str>) -> String {
    substitute_tokens(text, |key| match key {
        "name" => Some(lead.name.clone()),
        "company" => Some(lead.display_company().to_string()),
        "website" => website_url.map(str::to_string),
        _ => None,
    })
}

/// Fill `{name}`, `{company}` and `{website}` without calling a provider.
///
/// `{website}` stays as-is when no URL is known yet.
pub fn render_email_template(template: &EmailTemplate, lead: &Lead, website_url: Option<&str>) -> GeneratedEmail {
    GeneratedEmail {
        subject: fill(&template.subject, lead, website_url),
        body: fill(&template.body, lead, website_url),
    }
}
