//! Prompt builders for website and email copy.

use admin_store::{Lead, WebsiteTemplate};

const NO_DESCRIPTION: &str = "No description provided";
const UNKNOWN_INDUSTRY: &str = "local";

/// How much copy to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Complete site copy.
    #[default]
    Full,
    /// Shorter copy for a quick preview render.
    Preview,
}

const WEBSITE_JSON_SHAPE: &str = r#"{
  "headline": "string",
  "subheadline": "string",
  "description": "string",
  "services": [
    {
      "title": "string",
      "description": "string"
    }
  ],
  "callToAction": {
    "text": "string",
    "buttonText": "string"
  },
  "aboutUs": "string",
  "contact": {
    "email": "string",
    "phone": "string",
    "address": "string"
  }
}"#;

const EMAIL_JSON_SHAPE: &str = r#"{
  "subject": "string",
  "body": "string"
}"#;

fn industry(lead: &Lead) -> &str {
    lead.industry
        .as_deref()
        .filter(|i| !i.trim().is_empty())
        .unwrap_or(UNKNOWN_INDUSTRY)
}

fn description(lead: &Lead) -> &str {
    lead.description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(NO_DESCRIPTION)
}

/// Prompt asking for structured website copy for `lead`, shaped for `template`.
pub fn build_website_prompt(lead: &Lead, template: &WebsiteTemplate, mode: GenerationMode) -> String {
    let industry = industry(lead);
    let asks = match mode {
        GenerationMode::Full => {
            "1. A compelling homepage headline and subheadline\n\
             2. A brief company description (2-3 sentences)\n\
             3. 3-4 key service/product offerings with descriptions\n\
             4. A call-to-action section\n\
             5. A brief \"About Us\" section\n\
             6. Contact information section"
        }
        GenerationMode::Preview => {
            "1. A short homepage headline and subheadline\n\
             2. A one-sentence company description\n\
             3. 2-3 key service/product offerings with one-line descriptions\n\
             4. A one-line call-to-action\n\
             5. A one-sentence \"About Us\" section\n\
             6. Contact information section\n\
             Keep every field brief; this copy is for a quick preview."
        }
    };

    format!(
        "Generate a professional website content for a {industry} business.\n\
         \n\
         Company Information:\n\
         - Name: {company}\n\
         - Industry: {industry}\n\
         - Description: {description}\n\
         \n\
         Template Information:\n\
         - Template Name: {template_name}\n\
         - Template Description: {template_description}\n\
         \n\
         Please generate:\n\
         {asks}\n\
         \n\
         Format the response as JSON with the following structure:\n\
         {shape}\n",
        company = lead.display_company(),
        description = description(lead),
        template_name = template.name,
        template_description = template.description.as_deref().unwrap_or(""),
        shape = WEBSITE_JSON_SHAPE,
    )
}

/// Prompt asking for a personalized email built from `template_body`.
pub fn build_email_prompt(lead: &Lead, template_body: &str) -> String {
    let industry = industry(lead);
    format!(
        "Generate a personalized email for a {industry} business lead.\n\
         \n\
         Lead Information:\n\
         - Name: {name}\n\
         - Company: {company}\n\
         - Industry: {industry}\n\
         - Description: {description}\n\
         \n\
         Template:\n\
         {template_body}\n\
         \n\
         Please generate a personalized email that:\n\
         1. Addresses the lead by name\n\
         2. References their company and industry\n\
         3. Mentions specific details from their description\n\
         4. Includes a clear call-to-action\n\
         5. Maintains a professional tone\n\
         \n\
         Format the response as JSON with the following structure:\n\
         {shape}\n",
        name = lead.name,
        company = lead.display_company(),
        description = description(lead),
        shape = EMAIL_JSON_SHAPE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_store::{Entity, NewLead, NewWebsiteTemplate};
    use chrono::Utc;

    fn lead(description: Option<&str>) -> Lead {
        Lead::from_new(
            1,
            NewLead {
                name: "Bob Johnson".to_string(),
                email: "bob.johnson@example.com".to_string(),
                company: Some("Johnson Plumbing".to_string()),
                industry: Some("Home Services".to_string()),
                description: description.map(str::to_string),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    fn template() -> WebsiteTemplate {
        WebsiteTemplate::from_new(
            1,
            NewWebsiteTemplate {
                name: "Professional Business".to_string(),
                description: Some("A clean, professional template".to_string()),
                html: "<h1>{{headline}}</h1>".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn website_prompt_includes_lead_and_template() {
        let prompt = build_website_prompt(&lead(Some("24/7 emergency repairs")), &template(), GenerationMode::Full);
        assert!(prompt.starts_with("Generate a professional website content for a Home Services business."));
        assert!(prompt.contains("- Name: Johnson Plumbing"));
        assert!(prompt.contains("- Description: 24/7 emergency repairs"));
        assert!(prompt.contains("- Template Name: Professional Business"));
        assert!(prompt.contains("\"callToAction\""));
        assert!(prompt.contains("3-4 key service/product offerings"));
    }

    #[test]
    fn website_prompt_defaults_missing_description() {
        let prompt = build_website_prompt(&lead(None), &template(), GenerationMode::Full);
        assert!(prompt.contains("- Description: No description provided"));
    }

    #[test]
    fn preview_prompt_asks_for_shorter_copy() {
        let prompt = build_website_prompt(&lead(None), &template(), GenerationMode::Preview);
        assert!(prompt.contains("quick preview"));
        assert!(!prompt.contains("3-4 key service/product offerings"));
    }

    #[test]
    fn email_prompt_embeds_template_text() {
        let prompt = build_email_prompt(&lead(None), "Dear {name}, your site is at {website}");
        assert!(prompt.contains("- Name: Bob Johnson"));
        assert!(prompt.contains("- Company: Johnson Plumbing"));
        assert!(prompt.contains("Dear {name}, your site is at {website}"));
        assert!(prompt.contains("\"subject\": \"string\""));
    }
}
