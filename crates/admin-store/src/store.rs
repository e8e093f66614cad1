//! The repository trait every backend implements.

use crate::{
    Deployment, DeploymentFilter, DeploymentUpdate, EmailTemplate, EmailTemplateUpdate, Id, Lead,
    LeadFilter, LeadUpdate, NewDeployment, NewEmailTemplate, NewLead, NewOrder,
    NewWebsiteTemplate, Order, OrderUpdate, StoreResult, TestStatus, WebsiteTemplate,
    WebsiteTemplateUpdate,
};
use async_trait::async_trait;

/// Async CRUD over the five admin tables.
///
/// `update_*` returns `None` for an unknown id and `delete_*` returns `false`.
/// Lists are ordered by id, except deployments which are newest first.
#[async_trait]
pub trait Store: Send + Sync {
    // Leads
    async fn list_leads(&self) -> StoreResult<Vec<Lead>>;
    async fn get_lead(&self, id: Id) -> StoreResult<Option<Lead>>;
    async fn create_lead(&self, input: NewLead) -> StoreResult<Lead>;
    async fn update_lead(&self, id: Id, update: LeadUpdate) -> StoreResult<Option<Lead>>;
    async fn delete_lead(&self, id: Id) -> StoreResult<bool>;

    async fn filter_leads(&self, filter: &LeadFilter) -> StoreResult<Vec<Lead>> {
        let leads = self.list_leads().await?;
        Ok(leads.into_iter().filter(|l| filter.matches(l)).collect())
    }

    // Website templates
    async fn list_website_templates(&self) -> StoreResult<Vec<WebsiteTemplate>>;
    async fn get_website_template(&self, id: Id) -> StoreResult<Option<WebsiteTemplate>>;
    async fn create_website_template(
        &self,
        input: NewWebsiteTemplate,
    ) -> StoreResult<WebsiteTemplate>;
    async fn update_website_template(
        &self,
        id: Id,
        update: WebsiteTemplateUpdate,
    ) -> StoreResult<Option<WebsiteTemplate>>;
    async fn delete_website_template(&self, id: Id) -> StoreResult<bool>;

    async fn list_passed_website_templates(&self) -> StoreResult<Vec<WebsiteTemplate>> {
        let templates = self.list_website_templates().await?;
        Ok(templates
            .into_iter()
            .filter(|t| t.test_status == TestStatus::Passed)
            .collect())
    }

    // Email templates
    async fn list_email_templates(&self) -> StoreResult<Vec<EmailTemplate>>;
    async fn get_email_template(&self, id: Id) -> StoreResult<Option<EmailTemplate>>;
    async fn create_email_template(&self, input: NewEmailTemplate) -> StoreResult<EmailTemplate>;
    async fn update_email_template(
        &self,
        id: Id,
        update: EmailTemplateUpdate,
    ) -> StoreResult<Option<EmailTemplate>>;
    async fn delete_email_template(&self, id: Id) -> StoreResult<bool>;

    async fn list_passed_email_templates(&self) -> StoreResult<Vec<EmailTemplate>> {
        let templates = self.list_email_templates().await?;
        Ok(templates
            .into_iter()
            .filter(|t| t.test_status == TestStatus::Passed)
            .collect())
    }

    // Orders
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;
    async fn get_order(&self, id: Id) -> StoreResult<Option<Order>>;
    async fn create_order(&self, input: NewOrder) -> StoreResult<Order>;
    async fn update_order(&self, id: Id, update: OrderUpdate) -> StoreResult<Option<Order>>;
    async fn delete_order(&self, id: Id) -> StoreResult<bool>;

    async fn list_orders_for_lead(&self, lead_id: Id) -> StoreResult<Vec<Order>> {
        let orders = self.list_orders().await?;
        Ok(orders.into_iter().filter(|o| o.lead_id == lead_id).collect())
    }

    // Deployments
    async fn list_deployments(&self, filter: &DeploymentFilter) -> StoreResult<Vec<Deployment>>;
    async fn get_deployment(&self, id: Id) -> StoreResult<Option<Deployment>>;
    async fn create_deployment(&self, input: NewDeployment) -> StoreResult<Deployment>;
    async fn update_deployment(
        &self,
        id: Id,
        update: DeploymentUpdate,
    ) -> StoreResult<Option<Deployment>>;
    async fn delete_deployment(&self, id: Id) -> StoreResult<bool>;
}
