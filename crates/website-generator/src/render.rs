//! Template rendering and final document assembly.

use crate::GeneratorResult;
use admin_store::Lead;
use chrono::{Datelike, Utc};
use handlebars::{html_escape, Handlebars};
use llm_content::WebsiteContent;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

const TEMPLATE_NAME: &str = "site";

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Brace runs are captured so `{{handlebars}}` spans can be told apart from `{legacy}` ones.
    PATTERN.get_or_init(|| {
        Regex::new(r"(\{+)([A-Za-z_][A-Za-z0-9_]*)(\}+)").expect("token pattern is valid")
    })
}

/// Replace single-brace `{key}` tokens for which `lookup` has a value.
///
/// Unknown keys and multi-brace spans are left untouched.
pub fn substitute_tokens(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    token_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps[0].to_string();
            if caps[1].len() != 1 || caps[3].len() != 1 {
                return whole;
            }
            lookup(&caps[2]).unwrap_or(whole)
        })
        .into_owned()
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Tagline shown in the page title: subheadline, else headline.
pub fn tagline(content: &WebsiteContent) -> &str {
    non_empty(&content.subheadline)
        .or_else(|| non_empty(&content.headline))
        .unwrap_or("")
}

/// Data handed to Handlebars: generated content plus lead fields.
pub fn template_data(lead: &Lead, content: &WebsiteContent) -> Value {
    let mut data = match serde_json::to_value(content) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let company = lead.display_company().to_string();
    let about = non_empty(&content.about_us)
        .or_else(|| non_empty(&content.description))
        .or(lead.description.as_deref())
        .unwrap_or("")
        .to_string();
    if non_empty(&content.description).is_none() {
        if let Some(description) = lead.description.as_deref() {
            data.insert("description".into(), Value::String(description.to_string()));
        }
    }

    let string = |s: &str| Value::String(s.to_string());
    data.insert("companyName".into(), string(&company));
    data.insert("company".into(), string(&company));
    data.insert("business_name".into(), string(&company));
    data.insert("name".into(), string(&lead.name));
    data.insert("email".into(), string(&lead.email));
    data.insert("phone".into(), string(lead.phone.as_deref().unwrap_or("")));
    data.insert("industry".into(), string(lead.industry.as_deref().unwrap_or("")));
    data.insert("tagline".into(), string(tagline(content)));
    data.insert("about".into(), Value::String(about));
    data.insert("currentYear".into(), Value::from(Utc::now().year()));

    Value::Object(data)
}

/// Render template HTML with Handlebars (HTML-escaping on), then fill legacy `{key}` tokens.
pub fn render_template(html: &str, data: &Value) -> GeneratorResult<String> {
    let mut registry = Handlebars::new();
    registry.register_template_string(TEMPLATE_NAME, html)?;
    let rendered = registry.render(TEMPLATE_NAME, data)?;

    Ok(substitute_tokens(&rendered, |key| {
        data.get(key).and_then(|value| match value {
            Value::String(s) => Some(html_escape(s)),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }))
}

fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(needle)
}

/// True when the markup already carries its own document skeleton.
pub fn is_full_document(html: &str) -> bool {
    let lowered = html.trim_start().to_ascii_lowercase();
    lowered.starts_with("<!doctype") || lowered.starts_with("<html")
}

fn style_block(css: &str) -> String {
    format!("<style>\n{css}\n</style>\n")
}

/// Produce the final page.
///
/// A fragment is wrapped in a complete document titled `title`; a full
/// document gets the stylesheet injected before `</head>`.
pub fn assemble_document(rendered: &str, css: &str, title: &str) -> String {
    if is_full_document(rendered) {
        return inject_style(rendered, css);
    }

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n\
         {style}\
         </head>\n\
         <body>\n\
         {rendered}\n\
         </body>\n\
         </html>\n",
        title = html_escape(title),
        style = style_block(css),
    )
}

fn inject_style(document: &str, css: &str) -> String {
    if css.trim().is_empty() {
        return document.to_string();
    }
    if let Some(pos) = find_ci(document, "</head>") {
        let mut out = String::with_capacity(document.len() + css.len() + 20);
        out.push_str(&document[..pos]);
        out.push_str(&style_block(css));
        out.push_str(&document[pos..]);
        return out;
    }
    // No head at all: open one right after the <html ...> tag.
    if let Some(start) = find_ci(document, "<html") {
        if let Some(offset) = document[start..].find('>') {
            let pos = start + offset + 1;
            return format!(
                "{}<head>{}</head>{}",
                &document[..pos],
                style_block(css),
                &document[pos..]
            );
        }
    }
    format!("{}{}", style_block(css), document)
}

/// Set the `<title>` of a full document, adding one to `<head>` when missing.
pub fn replace_title(document: &str, title: &str) -> String {
    let escaped = html_escape(title);
    if let (Some(start), Some(end)) = (find_ci(document, "<title"), find_ci(document, "</title>")) {
        if let Some(open_end) = document[start..].find('>').map(|o| start + o + 1) {
            if open_end <= end {
                return format!("{}{}{}", &document[..open_end], escaped, &document[end..]);
            }
        }
    }
    if let Some(pos) = find_ci(document, "</head>") {
        return format!("{}<title>{}</title>\n{}", &document[..pos], escaped, &document[pos..]);
    }
    document.to_string()
}
