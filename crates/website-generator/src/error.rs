//! Generator error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The provider call failed
    #[error("LLM error: {0}")]
    Llm(#[from] llm_content::LlmError),

    /// The provider answered, but not with decodable content
    #[error("Unparseable generated content: {0}")]
    Content(String),

    /// The template HTML is not valid Handlebars
    #[error("Template compile error: {0}")]
    TemplateCompile(#[from] handlebars::TemplateError),

    /// Rendering the compiled template failed
    #[error("Template render error: {0}")]
    TemplateRender(#[from] handlebars::RenderError),
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;

impl GeneratorError {
    /// Split a content-pipeline failure into provider and decoding errors.
    pub(crate) fn from_content(err: llm_content::LlmError) -> Self {
        use llm_content::LlmError;
        match err {
            LlmError::Json(_) | LlmError::InvalidResponse(_) => Self::Content(err.to_string()),
            other => Self::Llm(other),
        }
    }
}
