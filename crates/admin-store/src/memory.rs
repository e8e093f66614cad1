//! In-memory tables behind a single lock.

use crate::models::sort_newest_first;
use crate::{
    seed, Deployment, DeploymentFilter, DeploymentUpdate, EmailTemplate, EmailTemplateUpdate,
    Entity, Id, Lead, LeadUpdate, NewDeployment, NewEmailTemplate, NewLead, NewOrder,
    NewWebsiteTemplate, Order, OrderUpdate, Store, StoreResult, WebsiteTemplate,
    WebsiteTemplateUpdate,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

/// One table: rows ordered by id plus the next id to hand out.
///
/// `next_id` only ever grows, so a deleted id is never handed out again.
#[derive(Debug, Clone)]
struct MemoryTable<T> {
    rows: BTreeMap<Id, T>,
    next_id: Id,
}

impl<T> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Entity> MemoryTable<T> {
    fn list(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn get(&self, id: Id) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn insert(&mut self, input: T::New) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let record = T::from_new(id, input, Utc::now());
        self.rows.insert(id, record.clone());
        debug!(table = T::TABLE, id, "row inserted");
        record
    }

    fn update(&mut self, id: Id, update: T::Update) -> Option<T> {
        let record = self.rows.get_mut(&id)?;
        record.apply(update, Utc::now());
        Some(record.clone())
    }

    fn delete(&mut self, id: Id) -> bool {
        self.rows.remove(&id).is_some()
    }
}

#[derive(Debug, Default)]
struct Tables {
    leads: MemoryTable<Lead>,
    website_templates: MemoryTable<WebsiteTemplate>,
    email_templates: MemoryTable<EmailTemplate>,
    orders: MemoryTable<Order>,
    deployments: MemoryTable<Deployment>,
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store loaded with the sample data set.
    pub async fn seeded() -> StoreResult<Self> {
        let store = Self::new();
        seed::populate(&store).await?;
        Ok(store)
    }

    /// Drop every row and reload the sample data.
    ///
    /// Id counters restart, since the tables are rebuilt from scratch.
    pub async fn reset(&self) -> StoreResult<()> {
        *self.tables.write() = Tables::default();
        seed::populate(self).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_leads(&self) -> StoreResult<Vec<Lead>> {
        Ok(self.tables.read().leads.list())
    }

    async fn get_lead(&self, id: Id) -> StoreResult<Option<Lead>> {
        Ok(self.tables.read().leads.get(id))
    }

    async fn create_lead(&self, input: NewLead) -> StoreResult<Lead> {
        Ok(self.tables.write().leads.insert(input))
    }

    async fn update_lead(&self, id: Id, update: LeadUpdate) -> StoreResult<Option<Lead>> {
        Ok(self.tables.write().leads.update(id, update))
    }

    async fn delete_lead(&self, id: Id) -> StoreResult<bool> {
        Ok(self.tables.write().leads.delete(id))
    }

    async fn list_website_templates(&self) -> StoreResult<Vec<WebsiteTemplate>> {
        Ok(self.tables.read().website_templates.list())
    }

    async fn get_website_template(&self, id: Id) -> StoreResult<Option<WebsiteTemplate>> {
        Ok(self.tables.read().website_templates.get(id))
    }

    async fn create_website_template(
        &self,
        input: NewWebsiteTemplate,
    ) -> StoreResult<WebsiteTemplate> {
        Ok(self.tables.write().website_templates.insert(input))
    }

    async fn update_website_template(
        &self,
        id: Id,
        update: WebsiteTemplateUpdate,
    ) -> StoreResult<Option<WebsiteTemplate>> {
        Ok(self.tables.write().website_templates.update(id, update))
    }

    async fn delete_website_template(&self, id: Id) -> StoreResult<bool> {
        Ok(self.tables.write().website_templates.delete(id))
    }

    async fn list_email_templates(&self) -> StoreResult<Vec<EmailTemplate>> {
        Ok(self.tables.read().email_templates.list())
    }

    async fn get_email_template(&self, id: Id) -> StoreResult<Option<EmailTemplate>> {
        Ok(self.tables.read().email_templates.get(id))
    }

    async fn create_email_template(&self, input: NewEmailTemplate) -> StoreResult<EmailTemplate> {
        Ok(self.tables.write().email_templates.insert(input))
    }

    async fn update_email_template(
        &self,
        id: Id,
        update: EmailTemplateUpdate,
    ) -> StoreResult<Option<EmailTemplate>> {
        Ok(self.tables.write().email_templates.update(id, update))
    }

    async fn delete_email_template(&self, id: Id) -> StoreResult<bool> {
        Ok(self.tables.write().email_templates.delete(id))
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        Ok(self.tables.read().orders.list())
    }

    async fn get_order(&self, id: Id) -> StoreResult<Option<Order>> {
        Ok(self.tables.read().orders.get(id))
    }

    async fn create_order(&self, input: NewOrder) -> StoreResult<Order> {
        Ok(self.tables.write().orders.insert(input))
    }

    async fn update_order(&self, id: Id, update: OrderUpdate) -> StoreResult<Option<Order>> {
        Ok(self.tables.write().orders.update(id, update))
    }

    async fn delete_order(&self, id: Id) -> StoreResult<bool> {
        Ok(self.tables.write().orders.delete(id))
    }

    async fn list_deployments(&self, filter: &DeploymentFilter) -> StoreResult<Vec<Deployment>> {
        let mut deployments: Vec<Deployment> = self
            .tables
            .read()
            .deployments
            .rows
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        sort_newest_first(&mut deployments);
        Ok(deployments)
    }

    async fn get_deployment(&self, id: Id) -> StoreResult<Option<Deployment>> {
        Ok(self.tables.read().deployments.get(id))
    }

    async fn create_deployment(&self, input: NewDeployment) -> StoreResult<Deployment> {
        Ok(self.tables.write().deployments.insert(input))
    }

    async fn update_deployment(
        &self,
        id: Id,
        update: DeploymentUpdate,
    ) -> StoreResult<Option<Deployment>> {
        Ok(self.tables.write().deployments.update(id, update))
    }

    async fn delete_deployment(&self, id: Id) -> StoreResult<bool> {
        Ok(self.tables.write().deployments.delete(id))
    }
}
