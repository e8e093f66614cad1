//! LLM content generation for lead websites and emails.
//!
//! This crate provides:
//! - [`LlmClient`]: HTTP clients for OpenAI, OpenRouter and Google
//! - [`LlmBackend`]: the completion seam generators depend on
//! - Prompt builders and tolerant JSON decoding of model replies
//!
//! # Example
//!
//! ```ignore
//! let client = LlmClient::from_env(LlmProvider::OpenAi);
//! let content = generate_website_content(&client, &lead, &template, GenerationMode::Full).await?;
//! println!("{}", content.headline);
//! ```

mod client;
mod content;
mod error;
pub mod prompts;
mod provider;

pub use client::{LlmBackend, LlmClient, LlmResponse, ModelInfo, ModelPricing, TokenUsage};
pub use content::{
    generate_email_content, generate_website_content, parse_json_payload, CallToAction,
    ContactInfo, EmailContent, ServiceItem, WebsiteContent,
};
pub use error::{LlmError, LlmResult};
pub use prompts::GenerationMode;
pub use provider::{LlmConfig, LlmProvider, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
