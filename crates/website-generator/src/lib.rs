//! Website and email generation for leads.
//!
//! [`WebsiteGenerator`] asks an [`llm_content::LlmBackend`] for structured
//! copy, renders it into a stored template with Handlebars and assembles a
//! standalone HTML page. [`EmailGenerator`] does the same for outreach
//! emails; [`render_email_template`] fills the plain `{token}` placeholders
//! without a provider.

mod email;
mod error;
pub mod render;
mod website;

pub use email::{render_email_template, EmailGenerator, GeneratedEmail};
pub use error::{GeneratorError, GeneratorResult};
pub use website::{GeneratedWebsite, GenerationMetadata, WebsiteGenerator};

#[cfg(test)]
pub(crate) mod testing {
    use admin_store::{Entity, Lead, NewLead};
    use async_trait::async_trait;
    use chrono::Utc;
    use llm_content::{LlmBackend, LlmError, LlmProvider, LlmResponse, LlmResult};
    use std::sync::Mutex;

    /// Backend that answers every prompt with the same reply, or fails.
    pub struct ScriptedBackend {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        fn provider(&self) -> LlmProvider {
            LlmProvider::OpenRouter
        }

        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> LlmResult<LlmResponse> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Some(text) => Ok(LlmResponse {
                    text: text.clone(),
                    usage: None,
                }),
                None => Err(LlmError::MissingApiKey(LlmProvider::OpenRouter)),
            }
        }
    }

    pub fn lead() -> Lead {
        Lead::from_new(
            2,
            NewLead {
                name: "Jane Doe".to_string(),
                email: "jane.doe@example.com".to_string(),
                phone: Some("555-987-6543".to_string()),
                company: Some("Doe Bakery".to_string()),
                industry: Some("Food & Beverage".to_string()),
                description: Some("Artisan breads and pastries.".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
    }
}
