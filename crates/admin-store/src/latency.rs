//! API facade that simulates network latency in front of any store.

use crate::{
    Deployment, DeploymentFilter, DeploymentUpdate, EmailTemplate, EmailTemplateUpdate, Id, Lead,
    LeadFilter, LeadUpdate, NewDeployment, NewEmailTemplate, NewLead, NewOrder,
    NewWebsiteTemplate, Order, OrderUpdate, Store, StoreResult, WebsiteTemplate,
    WebsiteTemplateUpdate,
};
use async_trait::async_trait;
use std::time::Duration;

/// Per-operation delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub list: Duration,
    pub get: Duration,
    pub filtered: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(500),
            get: Duration::from_millis(300),
            filtered: Duration::from_millis(400),
            create: Duration::from_millis(700),
            update: Duration::from_millis(600),
            delete: Duration::from_millis(500),
        }
    }
}

impl Latency {
    /// No delay at all.
    pub fn none() -> Self {
        Self::default().scaled(0.0)
    }

    /// Multiply every delay by `factor` (negative factors clamp to zero).
    pub fn scaled(self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        let scale = |d: Duration| d.mul_f64(factor);
        Self {
            list: scale(self.list),
            get: scale(self.get),
            filtered: scale(self.filtered),
            create: scale(self.create),
            update: scale(self.update),
            delete: scale(self.delete),
        }
    }
}

/// Wraps a store and sleeps before delegating each call.
#[derive(Debug, Clone)]
pub struct LatentStore<S> {
    inner: S,
    latency: Latency,
}

impl<S: Store> LatentStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_latency(inner, Latency::default())
    }

    pub fn with_latency(inner: S, latency: Latency) -> Self {
        Self { inner, latency }
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<S: Store> Store for LatentStore<S> {
    async fn list_leads(&self) -> StoreResult<Vec<Lead>> {
        self.pause(self.latency.list).await;
        self.inner.list_leads().await
    }

    async fn get_lead(&self, id: Id) -> StoreResult<Option<Lead>> {
        self.pause(self.latency.get).await;
        self.inner.get_lead(id).await
    }

    async fn create_lead(&self, input: NewLead) -> StoreResult<Lead> {
        self.pause(self.latency.create).await;
        self.inner.create_lead(input).await
    }

    async fn update_lead(&self, id: Id, update: LeadUpdate) -> StoreResult<Option<Lead>> {
        self.pause(self.latency.update).await;
        self.inner.update_lead(id, update).await
    }

    async fn delete_lead(&self, id: Id) -> StoreResult<bool> {
        self.pause(self.latency.delete).await;
        self.inner.delete_lead(id).await
    }

    async fn filter_leads(&self, filter: &LeadFilter) -> StoreResult<Vec<Lead>> {
        self.pause(self.latency.filtered).await;
        self.inner.filter_leads(filter).await
    }

    async fn list_website_templates(&self) -> StoreResult<Vec<WebsiteTemplate>> {
        self.pause(self.latency.list).await;
        self.inner.list_website_templates().await
    }

    async fn get_website_template(&self, id: Id) -> StoreResult<Option<WebsiteTemplate>> {
        self.pause(self.latency.get).await;
        self.inner.get_website_template(id).await
    }

    async fn create_website_template(
        &self,
        input: NewWebsiteTemplate,
    ) -> StoreResult<WebsiteTemplate> {
        self.pause(self.latency.create).await;
        self.inner.create_website_template(input).await
    }

    async fn update_website_template(
        &self,
        id: Id,
        update: WebsiteTemplateUpdate,
    ) -> StoreResult<Option<WebsiteTemplate>> {
        self.pause(self.latency.update).await;
        self.inner.update_website_template(id, update).await
    }

    async fn delete_website_template(&self, id: Id) -> StoreResult<bool> {
        self.pause(self.latency.delete).await;
        self.inner.delete_website_template(id).await
    }

    async fn list_passed_website_templates(&self) -> StoreResult<Vec<WebsiteTemplate>> {
        self.pause(self.latency.filtered).await;
        self.inner.list_passed_website_templates().await
    }

    async fn list_email_templates(&self) -> StoreResult<Vec<EmailTemplate>> {
        self.pause(self.latency.list).await;
        self.inner.list_email_templates().await
    }

    async fn get_email_template(&self, id: Id) -> StoreResult<Option<EmailTemplate>> {
        self.pause(self.latency.get).await;
        self.inner.get_email_template(id).await
    }

    async fn create_email_template(&self, input: NewEmailTemplate) -> StoreResult<EmailTemplate> {
        self.pause(self.latency.create).await;
        self.inner.create_email_template(input).await
    }

    async fn update_email_template(
        &self,
        id: Id,
        update: EmailTemplateUpdate,
    ) -> StoreResult<Option<EmailTemplate>> {
        self.pause(self.latency.update).await;
        self.inner.update_email_template(id, update).await
    }

    async fn delete_email_template(&self, id: Id) -> StoreResult<bool> {
        self.pause(self.latency.delete).await;
        self.inner.delete_email_template(id).await
    }

    async fn list_passed_email_templates(&self) -> StoreResult<Vec<EmailTemplate>> {
        self.pause(self.latency.filtered).await;
        self.inner.list_passed_email_templates().await
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        self.pause(self.latency.list).await;
        self.inner.list_orders().await
    }

    async fn get_order(&self, id: Id) -> StoreResult<Option<Order>> {
        self.pause(self.latency.get).await;
        self.inner.get_order(id).await
    }

    async fn create_order(&self, input: NewOrder) -> StoreResult<Order> {
        self.pause(self.latency.create).await;
        self.inner.create_order(input).await
    }

    async fn update_order(&self, id: Id, update: OrderUpdate) -> StoreResult<Option<Order>> {
        self.pause(self.latency.update).await;
        self.inner.update_order(id, update).await
    }

    async fn delete_order(&self, id: Id) -> StoreResult<bool> {
        self.pause(self.latency.delete).await;
        self.inner.delete_order(id).await
    }

    async fn list_orders_for_lead(&self, lead_id: Id) -> StoreResult<Vec<Order>> {
        self.pause(self.latency.filtered).await;
        self.inner.list_orders_for_lead(lead_id).await
    }

    async fn list_deployments(&self, filter: &DeploymentFilter) -> StoreResult<Vec<Deployment>> {
        let delay = if filter.is_empty() {
            self.latency.list
        } else {
            self.latency.filtered
        };
        self.pause(delay).await;
        self.inner.list_deployments(filter).await
    }

    async fn get_deployment(&self, id: Id) -> StoreResult<Option<Deployment>> {
        self.pause(self.latency.get).await;
        self.inner.get_deployment(id).await
    }

    async fn create_deployment(&self, input: NewDeployment) -> StoreResult<Deployment> {
        self.pause(self.latency.create).await;
        self.inner.create_deployment(input).await
    }

    async fn update_deployment(
        &self,
        id: Id,
        update: DeploymentUpdate,
    ) -> StoreResult<Option<Deployment>> {
        self.pause(self.latency.update).await;
        self.inner.update_deployment(id, update).await
    }

    async fn delete_deployment(&self, id: Id) -> StoreResult<bool> {
        self.pause(self.latency.delete).await;
        self.inner.delete_deployment(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use tokio::time::Instant;

    #[test]
    fn default_latencies() {
        let latency = Latency::default();
        assert_eq!(latency.list, Duration::from_millis(500));
        assert_eq!(latency.get, Duration::from_millis(300));
        assert_eq!(latency.filtered, Duration::from_millis(400));
        assert_eq!(latency.create, Duration::from_millis(700));
        assert_eq!(latency.update, Duration::from_millis(600));
        assert_eq!(latency.delete, Duration::from_millis(500));
    }

    #[test]
    fn scaled_and_none() {
        let half = Latency::default().scaled(0.5);
        assert_eq!(half.create, Duration::from_millis(350));
        assert!(Latency::none().list.is_zero());
        assert!(Latency::default().scaled(-1.0).update.is_zero());
    }

    #[tokio::test(start_paused = true)]
    async fn calls_wait_for_configured_delay() {
        let store = LatentStore::new(MemoryStore::seeded().await.unwrap());

        let start = Instant::now();
        let leads = store.list_leads().await.unwrap();
        assert_eq!(leads.len(), 5);
        assert!(start.elapsed() >= Duration::from_millis(500));

        let start = Instant::now();
        store.get_lead(1).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn zero_latency_delegates() {
        let store = LatentStore::with_latency(MemoryStore::new(), Latency::none());
        let lead = store
            .create_lead(NewLead {
                name: "Eve".to_string(),
                email: "eve@example.com".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(store.inner().get_lead(lead.id).await.unwrap(), Some(lead));
    }
}
