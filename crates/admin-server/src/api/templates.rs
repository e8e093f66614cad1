//! `/api/templates/website` and `/api/templates/email`

use crate::api::{ApiError, ApiJson, ApiQuery, ApiResult, IdPath};
use crate::app::AppState;
use admin_store::{
    EmailTemplate, EmailTemplateUpdate, NewEmailTemplate, NewWebsiteTemplate, WebsiteTemplate,
    WebsiteTemplateUpdate,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    /// Only templates whose test status is `passed`.
    #[serde(default)]
    pub passed: bool,
}

/// Reject a name or HTML body that is present but blank.
fn require_name_and_html(name: Option<&str>, html: Option<&str>) -> ApiResult<()> {
    let blank = |v: Option<&str>| v.is_some_and(|v| v.trim().is_empty());
    if blank(name) || blank(html) {
        return Err(ApiError::bad_request("Name and HTML are required"));
    }
    Ok(())
}

pub async fn list_website(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TemplateQuery>,
) -> ApiResult<Json<Vec<WebsiteTemplate>>> {
    let templates = if query.passed {
        state.store.list_passed_website_templates().await?
    } else {
        state.store.list_website_templates().await?
    };
    Ok(Json(templates))
}

pub async fn get_website(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<WebsiteTemplate>> {
    state
        .store
        .get_website_template(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Template not found"))
}

pub async fn create_website(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewWebsiteTemplate>,
) -> ApiResult<(StatusCode, Json<WebsiteTemplate>)> {
    require_name_and_html(Some(&input.name), Some(&input.html))?;
    let template = state.store.create_website_template(input).await?;
    tracing::info!(template_id = template.id, name = %template.name, "Website template created");
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn update_website(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(update): ApiJson<WebsiteTemplateUpdate>,
) -> ApiResult<Json<WebsiteTemplate>> {
    require_name_and_html(update.name.as_deref(), update.html.as_deref())?;
    state
        .store
        .update_website_template(id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Template not found"))
}

pub async fn delete_website(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<StatusCode> {
    if state.store.delete_website_template(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Template not found"))
    }
}

pub async fn list_email(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TemplateQuery>,
) -> ApiResult<Json<Vec<EmailTemplate>>> {
    let templates = if query.passed {
        state.store.list_passed_email_templates().await?
    } else {
        state.store.list_email_templates().await?
    };
    Ok(Json(templates))
}

pub async fn get_email(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<Json<EmailTemplate>> {
    state
        .store
        .get_email_template(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Email template not found"))
}

pub async fn create_email(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewEmailTemplate>,
) -> ApiResult<(StatusCode, Json<EmailTemplate>)> {
    if input.name.trim().is_empty() || input.subject.trim().is_empty() {
        return Err(ApiError::bad_request("Name and subject are required"));
    }
    let template = state.store.create_email_template(input).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn update_email(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(update): ApiJson<EmailTemplateUpdate>,
) -> ApiResult<Json<EmailTemplate>> {
    state
        .store
        .update_email_template(id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Email template not found"))
}

pub async fn delete_email(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<StatusCode> {
    if state.store.delete_email_template(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Email template not found"))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{read_json, send, test_state};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn passed_filter() {
        let (state, _dir) = test_state().await;

        let (_, body) = send(&state, Method::GET, "/api/templates/website", None).await;
        assert_eq!(read_json(&body).as_array().unwrap().len(), 3);

        let (_, body) = send(&state, Method::GET, "/api/templates/website?passed=true", None).await;
        let passed = read_json(&body);
        assert_eq!(passed.as_array().unwrap().len(), 2);
        assert!(passed.as_array().unwrap().iter().all(|t| t["testStatus"] == "passed"));

        let (_, body) = send(&state, Method::GET, "/api/templates/email?passed=true", None).await;
        assert_eq!(read_json(&body).as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn website_template_requires_name_and_html() {
        let (state, _dir) = test_state().await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/templates/website",
            Some(json!({"name": "Landing", "html": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(read_json(&body)["error"], "Name and HTML are required");

        let (status, _) = send(
            &state,
            Method::POST,
            "/api/templates/website",
            Some(json!({"name": "Landing"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/templates/website",
            Some(json!({"name": "Landing", "html": "<h1>{{headline}}</h1>", "category": "Marketing"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created = read_json(&body);
        assert_eq!(created["testStatus"], "pending");

        let path = format!("/api/templates/website/{}", created["id"]);
        let (status, _) = send(&state, Method::PUT, &path, Some(json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&state, Method::PUT, &path, Some(json!({"testStatus": "passed"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read_json(&body)["testStatus"], "passed");
        assert_eq!(read_json(&body)["name"], "Landing");

        let (status, _) = send(&state, Method::DELETE, &path, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&state, Method::DELETE, &path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn email_template_crud() {
        let (state, _dir) = test_state().await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/templates/email",
            Some(json!({"name": "Check-in", "subject": "Hi {name}", "body": "How is {company}?"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = read_json(&body)["id"].clone();

        let (status, body) = send(
            &state,
            Method::PUT,
            &format!("/api/templates/email/{id}"),
            Some(json!({"subject": "Hello {name}"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read_json(&body)["subject"], "Hello {name}");
        assert_eq!(read_json(&body)["body"], "How is {company}?");
    }
}
