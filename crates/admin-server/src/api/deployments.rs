//! `/api/deployments`

use crate::api::{ApiError, ApiJson, ApiQuery, ApiResult, IdPath};
use crate::app::state::PublishGuard;
use crate::app::AppState;
use admin_store::{
    Deployment, DeploymentFilter, DeploymentStatus, DeploymentUpdate, Environment, Id,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use deployment_host::{slugify_subdomain, validate_subdomain, DeployOptions, DeploymentResult, SiteBundle};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentQuery {
    pub lead_id: Option<Id>,
    pub status: Option<String>,
    pub environment: Option<String>,
}

impl DeploymentQuery {
    fn into_filter(self) -> ApiResult<DeploymentFilter> {
        let status = match self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(
                DeploymentStatus::parse(raw)
                    .ok_or_else(|| ApiError::bad_request(format!("Unknown deployment status: {raw}")))?,
            ),
            None => None,
        };
        let environment = match self.environment.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(parse_environment(raw)?),
            None => None,
        };
        Ok(DeploymentFilter {
            lead_id: self.lead_id,
            status,
            environment,
        })
    }
}

fn parse_environment(raw: &str) -> ApiResult<Environment> {
    Environment::parse(raw).ok_or_else(|| ApiError::bad_request(format!("Unknown environment: {raw}")))
}

/// Subdomain for a lead's site: the slugified company name.
pub(crate) async fn default_subdomain(state: &AppState, lead_id: Id) -> ApiResult<String> {
    let company = state
        .store
        .get_lead(lead_id)
        .await?
        .map(|lead| lead.display_company().to_string())
        .unwrap_or_default();
    Ok(slugify_subdomain(&company))
}

/// Drop the hosted copy of a deployment record, if it has one.
async fn unpublish(state: &AppState, id: Id) {
    let hosted = state.published.lock().remove(&id);
    if let Some(hosted) = hosted {
        if let Err(err) = state.deployments.remove_deployment(&hosted).await {
            warn!(deployment_id = id, hosted = %hosted, error = %err, "Failed to remove hosted site");
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DeploymentQuery>,
) -> ApiResult<Json<Vec<Deployment>>> {
    let filter = query.into_filter()?;
    Ok(Json(state.store.list_deployments(&filter).await?))
}

pub async fn get(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<Json<Deployment>> {
    state
        .store
        .get_deployment(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Deployment not found"))
}

pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(update): ApiJson<DeploymentUpdate>,
) -> ApiResult<Json<Deployment>> {
    if let Some(subdomain) = update.subdomain.as_deref() {
        validate_subdomain(subdomain)?;
    }
    state
        .store
        .update_deployment(id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Deployment not found"))
}

fn claim(state: &AppState, id: Id) -> ApiResult<PublishGuard> {
    state
        .begin_publish(id)
        .ok_or_else(|| ApiError::conflict("Deployment is already being published"))
}

pub async fn remove(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<StatusCode> {
    let _busy = claim(&state, id)?;
    if !state.store.delete_deployment(id).await? {
        return Err(ApiError::not_found("Deployment not found"));
    }
    unpublish(&state, id).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PublishRequest {
    pub subdomain: Option<String>,
    pub environment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub deployment: Deployment,
    pub result: DeploymentResult,
}

/// Write a deployment record's HTML to disk and host it.
pub async fn publish(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(request): ApiJson<PublishRequest>,
) -> ApiResult<Json<PublishResponse>> {
    let _busy = claim(&state, id)?;
    let deployment = state
        .store
        .get_deployment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Deployment not found"))?;

    let environment = match request.environment.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => parse_environment(raw)?,
        None => deployment.environment,
    };
    let subdomain = match request.subdomain.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(requested) => requested.to_lowercase(),
        None => match deployment.subdomain.clone() {
            Some(stored) => stored,
            None => default_subdomain(&state, deployment.lead_id).await?,
        },
    };
    validate_subdomain(&subdomain)?;
    if environment == Environment::Development {
        let own = state
            .published
            .lock()
            .get(&id)
            .map(|hosted| state.deployments.deployment_dir(hosted).join("public"));
        let holder = state.deployments.server().registry().site_path(&subdomain);
        if holder.is_some() && holder != own {
            return Err(ApiError::conflict(format!("Subdomain {subdomain} is already in use")));
        }
    }

    let css = state
        .store
        .get_website_template(deployment.template_id)
        .await?
        .and_then(|template| template.css)
        .unwrap_or_default();

    state
        .store
        .update_deployment(
            id,
            DeploymentUpdate {
                status: Some(DeploymentStatus::Processing),
                ..Default::default()
            },
        )
        .await?;
    unpublish(&state, id).await;

    let result = state
        .deployments
        .deploy_website(
            &SiteBundle {
                html: deployment.html.clone(),
                css,
            },
            &DeployOptions {
                subdomain: subdomain.clone(),
                environment,
                base_url: None,
                lead_id: Some(deployment.lead_id),
                template_id: Some(deployment.template_id),
            },
        )
        .await;

    let update = if result.success {
        state.published.lock().insert(id, result.deployment_id.clone());
        DeploymentUpdate {
            status: Some(DeploymentStatus::Completed),
            environment: Some(environment),
            subdomain: Some(subdomain),
            url: Some(result.url.clone()),
            ..Default::default()
        }
    } else {
        DeploymentUpdate {
            status: Some(DeploymentStatus::Failed),
            ..Default::default()
        }
    };
    let deployment = state
        .store
        .update_deployment(id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Deployment not found"))?;

    info!(
        deployment_id = id,
        success = result.success,
        url = %result.url,
        "Deployment published"
    );
    Ok(Json(PublishResponse {
        success: result.success,
        deployment,
        result,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{read_json, send, test_state};
    use admin_store::{DeploymentStatus, Environment, NewDeployment};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    async fn record(state: &crate::app::AppState, lead_id: i64, environment: Environment) -> i64 {
        state
            .store
            .create_deployment(NewDeployment {
                lead_id,
                template_id: 1,
                html: "<!DOCTYPE html><html><head></head><body>Hello</body></html>".to_string(),
                status: DeploymentStatus::Pending,
                environment,
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn list_filters() {
        let (state, _dir) = test_state().await;
        record(&state, 1, Environment::Development).await;
        record(&state, 2, Environment::Production).await;
        let newest = record(&state, 2, Environment::Development).await;

        let (_, body) = send(&state, Method::GET, "/api/deployments", None).await;
        let all = read_json(&body);
        assert_eq!(all.as_array().unwrap().len(), 3);
        assert_eq!(all[0]["id"], newest);

        let (_, body) = send(&state, Method::GET, "/api/deployments?leadId=2&environment=production", None).await;
        let filtered = read_json(&body);
        assert_eq!(filtered.as_array().unwrap().len(), 1);
        assert_eq!(filtered[0]["environment"], "production");

        let (status, _) = send(&state, Method::GET, "/api/deployments?status=shipped", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn publish_hosts_site_and_updates_record() {
        let (state, dir) = test_state().await;
        let id = record(&state, 2, Environment::Development).await;

        let (status, body) = send(&state, Method::POST, &format!("/api/deployments/{id}/publish"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let response = read_json(&body);
        assert_eq!(response["success"], true);
        assert_eq!(response["deployment"]["status"], "completed");
        assert_eq!(response["deployment"]["subdomain"], "doebakery");
        assert_eq!(response["deployment"]["url"], "http://doebakery.localhost:3001");

        let hosted = response["result"]["deploymentId"].as_str().unwrap().to_string();
        let index = dir.path().join("deployments").join(&hosted).join("public/index.html");
        assert!(std::fs::read_to_string(index).unwrap().contains("Hello"));
        assert!(state.deployments.server().registry().site_path("doebakery").is_some());

        let (status, _) = send(&state, Method::DELETE, &format!("/api/deployments/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!dir.path().join("deployments").join(&hosted).exists());
        assert!(state.deployments.server().registry().site_path("doebakery").is_none());
    }

    #[tokio::test]
    async fn busy_record_cannot_be_published_or_deleted() {
        let (state, _dir) = test_state().await;
        let id = record(&state, 2, Environment::Development).await;
        let path = format!("/api/deployments/{id}/publish");

        let busy = state.begin_publish(id).unwrap();
        assert!(state.begin_publish(id).is_none());

        let (status, body) = send(&state, Method::POST, &path, Some(json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(read_json(&body)["error"], "Deployment is already being published");
        let (status, _) = send(&state, Method::DELETE, &format!("/api/deployments/{id}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(state.deployments.server().registry().site_path("doebakery").is_none());

        drop(busy);
        let (status, body) = send(&state, Method::POST, &path, Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read_json(&body)["success"], true);
        assert!(state.publishing.lock().is_empty());
    }

    #[tokio::test]
    async fn subdomain_held_by_another_record_is_a_conflict() {
        let (state, dir) = test_state().await;
        let first = record(&state, 2, Environment::Development).await;
        let second = record(&state, 2, Environment::Development).await;

        let (status, body) = send(&state, Method::POST, &format!("/api/deployments/{first}/publish"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let hosted = read_json(&body)["result"]["deploymentId"].as_str().unwrap().to_string();
        let public = dir.path().join("deployments").join(&hosted).join("public");

        let (status, body) = send(&state, Method::POST, &format!("/api/deployments/{second}/publish"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(read_json(&body)["error"], "Subdomain doebakery is already in use");
        let untouched = state.store.get_deployment(second).await.unwrap().unwrap();
        assert_eq!(untouched.status, DeploymentStatus::Pending);
        assert_eq!(state.deployments.server().registry().site_path("doebakery"), Some(public));

        let (status, body) = send(&state, Method::POST, &format!("/api/deployments/{first}/publish"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read_json(&body)["success"], true);
    }

    #[tokio::test]
    async fn publish_to_production_with_custom_subdomain() {
        let (state, _dir) = test_state().await;
        let id = record(&state, 1, Environment::Development).await;

        let (status, body) = send(
            &state,
            Method::POST,
            &format!("/api/deployments/{id}/publish"),
            Some(json!({"subdomain": "SmithCo", "environment": "production"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response = read_json(&body);
        assert_eq!(response["deployment"]["url"], "https://smithco.leadsite.app");
        assert_eq!(response["deployment"]["environment"], "production");

        let (status, body) = send(
            &state,
            Method::POST,
            &format!("/api/deployments/{id}/publish"),
            Some(json!({"subdomain": "bad_name"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(read_json(&body)["error"].as_str().unwrap().contains("Invalid subdomain"));

        let (status, _) = send(&state, Method::POST, "/api/deployments/999/publish", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let metrics = state.monitoring.get_metrics();
        assert_eq!(metrics.deployments_by_environment.production, 1);
    }
}
