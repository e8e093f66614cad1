//! Website and email generation endpoints.

use crate::api::deployments::default_subdomain;
use crate::api::{ApiError, ApiJson, ApiResult};
use crate::app::AppState;
use admin_store::{
    Deployment, DeploymentStatus, EmailTemplate, Environment, Id, Lead, LeadStatus, LeadUpdate,
    NewDeployment, WebsiteTemplate,
};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use website_generator::{EmailGenerator, GeneratedEmail, GenerationMetadata, WebsiteGenerator};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub template_id: Option<Id>,
    pub lead_id: Option<Id>,
    pub llm_provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub deployment: Deployment,
    pub metadata: GenerationMetadata,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub html: String,
}

async fn load_inputs(state: &AppState, request: &GenerateRequest) -> ApiResult<(WebsiteTemplate, Lead)> {
    let (Some(template_id), Some(lead_id)) = (request.template_id, request.lead_id) else {
        return Err(ApiError::bad_request("Template ID and Lead ID are required"));
    };
    let template = state
        .store
        .get_website_template(template_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;
    let lead = state
        .store
        .get_lead(lead_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lead not found"))?;
    Ok((template, lead))
}

/// Generate a lead's site and store it as a pending development deployment.
pub async fn generate_website(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let (template, lead) = load_inputs(&state, &request).await?;
    let generator = WebsiteGenerator::new(state.llm_backend(request.llm_provider.as_deref())?);
    let website = generator.generate_website(&template, &lead).await?;

    let deployment = state
        .store
        .create_deployment(NewDeployment {
            lead_id: lead.id,
            template_id: template.id,
            html: website.html,
            status: DeploymentStatus::Pending,
            environment: Environment::Development,
            subdomain: Some(default_subdomain(&state, lead.id).await?),
            url: None,
        })
        .await?;

    state
        .store
        .update_lead(
            lead.id,
            LeadUpdate {
                status: Some(LeadStatus::WebsiteGenerated),
                ..Default::default()
            },
        )
        .await?;

    info!(
        deployment_id = deployment.id,
        lead_id = lead.id,
        template_id = template.id,
        "Website generation stored"
    );
    Ok(Json(GenerateResponse {
        success: true,
        deployment,
        metadata: website.metadata,
    }))
}

pub async fn preview_website(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> ApiResult<Json<PreviewResponse>> {
    let (template, lead) = load_inputs(&state, &request).await?;
    let generator = WebsiteGenerator::new(state.llm_backend(request.llm_provider.as_deref())?);
    let html = generator.generate_preview(&template, &lead).await?;
    Ok(Json(PreviewResponse { success: true, html }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailRequest {
    pub lead_id: Option<Id>,
    pub email_template_id: Option<Id>,
    pub llm_provider: Option<String>,
}

pub async fn generate_email(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EmailRequest>,
) -> ApiResult<Json<GeneratedEmail>> {
    let (Some(lead_id), Some(template_id)) = (request.lead_id, request.email_template_id) else {
        return Err(ApiError::bad_request("Lead ID and Email Template ID are required"));
    };
    let lead = state
        .store
        .get_lead(lead_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lead not found"))?;
    let template: EmailTemplate = state
        .store
        .get_email_template(template_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Email template not found"))?;

    let generator = EmailGenerator::new(state.llm_backend(request.llm_provider.as_deref())?);
    Ok(Json(generator.generate_email(&lead, &template).await?))
}
