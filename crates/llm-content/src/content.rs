//! Structured copy returned by the providers.

use crate::prompts::{build_email_prompt, build_website_prompt, GenerationMode};
use crate::{LlmBackend, LlmError, LlmResult};
use admin_store::{Lead, WebsiteTemplate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceItem {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallToAction {
    pub text: String,
    pub button_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Website copy. Missing fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebsiteContent {
    pub headline: String,
    pub subheadline: String,
    pub description: String,
    pub services: Vec<ServiceItem>,
    pub call_to_action: CallToAction,
    pub about_us: String,
    pub contact: ContactInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

/// Extract and decode the JSON object in a model reply.
///
/// Replies often wrap the object in prose or a Markdown code fence; the
/// outermost `{ ... }` span is what gets decoded.
pub fn parse_json_payload<T: DeserializeOwned>(text: &str) -> LlmResult<T> {
    let start = text.find('{');
    let end = text.rfind('}');
    let candidate = match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(LlmError::InvalidResponse(
                "No JSON object in model output".to_string(),
            ))
        }
    };
    Ok(serde_json::from_str(candidate)?)
}

/// Ask the backend for website copy and decode it.
pub async fn generate_website_content(
    backend: &dyn LlmBackend,
    lead: &Lead,
    template: &WebsiteTemplate,
    mode: GenerationMode,
) -> LlmResult<WebsiteContent> {
    let prompt = build_website_prompt(lead, template, mode);
    let response = backend.complete(&prompt).await?;
    let content: WebsiteContent = parse_json_payload(&response.text)?;
    tracing::debug!(
        lead_id = lead.id,
        template_id = template.id,
        services = content.services.len(),
        "Website content generated"
    );
    Ok(content)
}

/// Ask the backend for a personalized email and decode it.
pub async fn generate_email_content(
    backend: &dyn LlmBackend,
    lead: &Lead,
    template_body: &str,
) -> LlmResult<EmailContent> {
    let prompt = build_email_prompt(lead, template_body);
    let response = backend.complete(&prompt).await?;
    parse_json_payload(&response.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LlmProvider, LlmResponse};
    use admin_store::{Entity, NewLead, NewWebsiteTemplate};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    struct CannedBackend {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        fn provider(&self) -> LlmProvider {
            LlmProvider::OpenAi
        }

        fn model(&self) -> &str {
            "canned"
        }

        async fn complete(&self, prompt: &str) -> LlmResult<LlmResponse> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(LlmResponse {
                text: self.reply.clone(),
                usage: None,
            })
        }
    }

    fn backend(reply: &str) -> CannedBackend {
        CannedBackend {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn lead() -> Lead {
        Lead::from_new(
            5,
            NewLead {
                name: "Charlie Wilson".to_string(),
                email: "charlie.wilson@example.com".to_string(),
                company: Some("Wilson Fitness".to_string()),
                industry: Some("Health & Fitness".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn parses_fenced_json() {
        let text = "Here you go:\n```json\n{\"subject\": \"Hi\", \"body\": \"Hello {name}\"}\n```\nEnjoy!";
        let email: EmailContent = parse_json_payload(text).unwrap();
        assert_eq!(email.subject, "Hi");
        assert_eq!(email.body, "Hello {name}");
    }

    #[test]
    fn rejects_output_without_object() {
        let result: LlmResult<EmailContent> = parse_json_payload("I cannot help with that.");
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));

        let broken: LlmResult<EmailContent> = parse_json_payload("{\"subject\": }");
        assert!(matches!(broken, Err(LlmError::Json(_))));
    }

    #[test]
    fn website_content_tolerates_missing_fields() {
        let content: WebsiteContent = parse_json_payload(
            r#"{"headline": "Get Fit", "callToAction": {"buttonText": "Join"}, "services": [{"title": "Yoga"}]}"#,
        )
        .unwrap();
        assert_eq!(content.headline, "Get Fit");
        assert_eq!(content.call_to_action.button_text, "Join");
        assert_eq!(content.services[0].title, "Yoga");
        assert!(content.about_us.is_empty());
    }

    #[tokio::test]
    async fn generate_website_content_uses_prompt_builder() {
        let backend = backend(r#"{"headline": "Stronger Every Day", "aboutUs": "Family gym."}"#);
        let template = WebsiteTemplate::from_new(
            2,
            NewWebsiteTemplate {
                name: "Portfolio".to_string(),
                html: "<h1>{{headline}}</h1>".to_string(),
                ..Default::default()
            },
            Utc::now(),
        );

        let content = generate_website_content(&backend, &lead(), &template, GenerationMode::Preview)
            .await
            .unwrap();
        assert_eq!(content.headline, "Stronger Every Day");

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("- Name: Wilson Fitness"));
        assert!(prompts[0].contains("quick preview"));
    }

    #[tokio::test]
    async fn generate_email_content_decodes_reply() {
        let backend = backend(r#"{"subject": "Your new site, Charlie", "body": "Dear Charlie"}"#);
        let email = generate_email_content(&backend, &lead(), "Dear {name}")
            .await
            .unwrap();
        assert_eq!(email.subject, "Your new site, Charlie");
    }
}
