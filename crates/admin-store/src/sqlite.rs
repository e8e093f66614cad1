//! SQLite-backed store on a dedicated executor thread.
//!
//! All statements run on the single `tokio_rusqlite` thread. Only SQL and
//! row mapping happen inside `call()`.

use crate::{
    migrations, Deployment, DeploymentFilter, DeploymentStatus, DeploymentUpdate, EmailTemplate,
    EmailTemplateUpdate, Entity, Environment, Id, Lead, LeadStatus, LeadUpdate, NewDeployment,
    NewEmailTemplate, NewLead, NewOrder, NewWebsiteTemplate, Order, OrderStatus, OrderUpdate,
    Store, StoreError, StoreResult, SubscriptionStatus, TestStatus, WebsiteTemplate,
    WebsiteTemplateUpdate,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

/// Convert a tokio_rusqlite::Error to StoreError.
fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> StoreError {
    match e {
        tokio_rusqlite::Error::Rusqlite(e) => StoreError::Sqlite(e),
        tokio_rusqlite::Error::Close(_) => StoreError::Connection("Connection closed".to_string()),
        other => StoreError::Connection(other.to_string()),
    }
}

/// Fixed-width timestamps so `ORDER BY created_at` sorts chronologically.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn timestamp() -> DateTime<Utc> {
    // Round-trip through the stored format so returned records equal what a later read yields.
    parse_datetime(format_datetime(&Utc::now()))
}

/// Relational store over the schema in `migrations`.
#[derive(Clone)]
pub struct SqliteStore {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run pending migrations.
    pub async fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let path_str = path.to_string_lossy().to_string();
        info!(path = %path_str, "Opening database");

        let conn = tokio_rusqlite::Connection::open(&path_str)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self {
            conn,
            path: path_str,
        };
        store.initialize().await?;
        Ok(store)
    }

    /// Open a private in-memory database.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self {
            conn,
            path: ":memory:".to_string(),
        };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> StoreResult<()> {
        self.call(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA busy_timeout = 5000;
                ",
            )?;
            migrations::run_migrations(conn)
        })
        .await?;
        info!(path = %self.path, "Database initialized");
        Ok(())
    }

    /// Execute a closure on the executor thread.
    pub async fn call<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        match self.conn.call(move |conn| Ok(f(conn))).await {
            Ok(inner) => inner,
            Err(e) => Err(from_tokio_rusqlite(e)),
        }
    }

    /// Get the database file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when the database holds no leads yet.
    pub async fn is_empty(&self) -> StoreResult<bool> {
        self.call(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))?;
            Ok(count == 0)
        })
        .await
    }

    /// Check the database is healthy by executing a simple query.
    pub async fn health_check(&self) -> StoreResult<()> {
        self.call(|conn| {
            conn.execute_batch("SELECT 1")?;
            Ok(())
        })
        .await?;
        debug!("Database health check passed");
        Ok(())
    }
}

// ==========================================
// Row mapping
// ==========================================

const LEAD_COLUMNS: &str = "id, name, email, phone, company, industry, status, description, scraped_data, created_at, updated_at";
const WEBSITE_TEMPLATE_COLUMNS: &str = "id, name, description, html, css, thumbnail, category, test_status, created_at, updated_at";
const EMAIL_TEMPLATE_COLUMNS: &str = "id, name, subject, body, test_status, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, lead_id, website_template_id, email_template_id, status, purchase_date, subscription_status, created_at, updated_at";
const DEPLOYMENT_COLUMNS: &str = "id, lead_id, template_id, html, status, environment, subdomain, url, created_at, updated_at";

fn lead_from_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        company: row.get(4)?,
        industry: row.get(5)?,
        status: LeadStatus::parse(&row.get::<_, String>(6)?).unwrap_or_default(),
        description: row.get(7)?,
        scraped_data: row
            .get::<_, Option<String>>(8)?
            .and_then(|raw| serde_json::from_str(&raw).ok()),
        created_at: parse_datetime(row.get::<_, String>(9)?),
        updated_at: parse_datetime(row.get::<_, String>(10)?),
    })
}

fn website_template_from_row(row: &Row<'_>) -> rusqlite::Result<WebsiteTemplate> {
    Ok(WebsiteTemplate {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        html: row.get(3)?,
        css: row.get(4)?,
        thumbnail: row.get(5)?,
        category: row.get(6)?,
        test_status: TestStatus::from_str(&row.get::<_, String>(7)?),
        created_at: parse_datetime(row.get::<_, String>(8)?),
        updated_at: parse_datetime(row.get::<_, String>(9)?),
    })
}

fn email_template_from_row(row: &Row<'_>) -> rusqlite::Result<EmailTemplate> {
    Ok(EmailTemplate {
        id: row.get(0)?,
        name: row.get(1)?,
        subject: row.get(2)?,
        body: row.get(3)?,
        test_status: TestStatus::from_str(&row.get::<_, String>(4)?),
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        website_template_id: row.get(2)?,
        email_template_id: row.get(3)?,
        status: OrderStatus::from_str(&row.get::<_, String>(4)?),
        purchase_date: row.get::<_, Option<String>>(5)?.map(parse_datetime),
        subscription_status: SubscriptionStatus::from_str(&row.get::<_, String>(6)?),
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn deployment_from_row(row: &Row<'_>) -> rusqlite::Result<Deployment> {
    Ok(Deployment {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        template_id: row.get(2)?,
        html: row.get(3)?,
        status: DeploymentStatus::parse(&row.get::<_, String>(4)?).unwrap_or_default(),
        environment: Environment::parse(&row.get::<_, String>(5)?).unwrap_or_default(),
        subdomain: row.get(6)?,
        url: row.get(7)?,
        created_at: parse_datetime(row.get::<_, String>(8)?),
        updated_at: parse_datetime(row.get::<_, String>(9)?),
    })
}

fn select_one<T>(
    conn: &Connection,
    sql: &str,
    id: Id,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> StoreResult<Option<T>> {
    let mut stmt = conn.prepare_cached(sql)?;
    Ok(stmt.query_row(params![id], map).optional()?)
}

fn select_all<T>(
    conn: &Connection,
    sql: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn delete_by_id(conn: &Connection, table: &str, id: Id) -> StoreResult<bool> {
    let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
    Ok(changed > 0)
}

fn fetch_inserted<T>(conn: &Connection, table: &str, found: Option<T>) -> StoreResult<T> {
    found.ok_or_else(|| {
        StoreError::NotFound(format!(
            "{table} row {} missing after insert",
            conn.last_insert_rowid()
        ))
    })
}

// ==========================================
// Leads
// ==========================================

fn get_lead(conn: &Connection, id: Id) -> StoreResult<Option<Lead>> {
    let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1");
    select_one(conn, &sql, id, lead_from_row)
}

fn write_lead(conn: &Connection, lead: &Lead) -> StoreResult<()> {
    let scraped = lead
        .scraped_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    conn.execute(
        "UPDATE leads SET name = ?2, email = ?3, phone = ?4, company = ?5, industry = ?6, status = ?7,
            description = ?8, scraped_data = ?9, updated_at = ?10
         WHERE id = ?1",
        params![
            lead.id,
            lead.name,
            lead.email,
            lead.phone,
            lead.company,
            lead.industry,
            lead.status.as_str(),
            lead.description,
            scraped,
            format_datetime(&lead.updated_at),
        ],
    )?;
    Ok(())
}

fn insert_lead(conn: &Connection, input: NewLead) -> StoreResult<Lead> {
    let now = format_datetime(&timestamp());
    let scraped = input
        .scraped_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    conn.execute(
        "INSERT INTO leads (name, email, phone, company, industry, status, description, scraped_data, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            input.name,
            input.email,
            input.phone,
            input.company,
            input.industry,
            input.status.as_str(),
            input.description,
            scraped,
            now,
        ],
    )?;
    let found = get_lead(conn, conn.last_insert_rowid())?;
    fetch_inserted(conn, Lead::TABLE, found)
}

// ==========================================
// Templates
// ==========================================

fn get_website_template(conn: &Connection, id: Id) -> StoreResult<Option<WebsiteTemplate>> {
    let sql = format!("SELECT {WEBSITE_TEMPLATE_COLUMNS} FROM website_templates WHERE id = ?1");
    select_one(conn, &sql, id, website_template_from_row)
}

fn insert_website_template(
    conn: &Connection,
    input: NewWebsiteTemplate,
) -> StoreResult<WebsiteTemplate> {
    let now = format_datetime(&timestamp());
    conn.execute(
        "INSERT INTO website_templates (name, description, html, css, thumbnail, category, test_status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            input.name,
            input.description,
            input.html,
            input.css,
            input.thumbnail,
            input.category,
            input.test_status.as_str(),
            now,
        ],
    )?;
    let found = get_website_template(conn, conn.last_insert_rowid())?;
    fetch_inserted(conn, WebsiteTemplate::TABLE, found)
}

fn write_website_template(conn: &Connection, t: &WebsiteTemplate) -> StoreResult<()> {
    conn.execute(
        "UPDATE website_templates SET name = ?2, description = ?3, html = ?4, css = ?5, thumbnail = ?6,
            category = ?7, test_status = ?8, updated_at = ?9
         WHERE id = ?1",
        params![
            t.id,
            t.name,
            t.description,
            t.html,
            t.css,
            t.thumbnail,
            t.category,
            t.test_status.as_str(),
            format_datetime(&t.updated_at),
        ],
    )?;
    Ok(())
}

fn get_email_template(conn: &Connection, id: Id) -> StoreResult<Option<EmailTemplate>> {
    let sql = format!("SELECT {EMAIL_TEMPLATE_COLUMNS} FROM email_templates WHERE id = ?1");
    select_one(conn, &sql, id, email_template_from_row)
}

fn insert_email_template(conn: &Connection, input: NewEmailTemplate) -> StoreResult<EmailTemplate> {
    let now = format_datetime(&timestamp());
    conn.execute(
        "INSERT INTO email_templates (name, subject, body, test_status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            input.name,
            input.subject,
            input.body,
            input.test_status.as_str(),
            now
        ],
    )?;
    let found = get_email_template(conn, conn.last_insert_rowid())?;
    fetch_inserted(conn, EmailTemplate::TABLE, found)
}

fn write_email_template(conn: &Connection, t: &EmailTemplate) -> StoreResult<()> {
    conn.execute(
        "UPDATE email_templates SET name = ?2, subject = ?3, body = ?4, test_status = ?5, updated_at = ?6
         WHERE id = ?1",
        params![
            t.id,
            t.name,
            t.subject,
            t.body,
            t.test_status.as_str(),
            format_datetime(&t.updated_at),
        ],
    )?;
    Ok(())
}

// ==========================================
// Orders
// ==========================================

fn get_order(conn: &Connection, id: Id) -> StoreResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
    select_one(conn, &sql, id, order_from_row)
}

fn insert_order(conn: &Connection, input: NewOrder) -> StoreResult<Order> {
    let now = format_datetime(&timestamp());
    conn.execute(
        "INSERT INTO orders (lead_id, website_template_id, email_template_id, status, purchase_date, subscription_status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            input.lead_id,
            input.website_template_id,
            input.email_template_id,
            input.status.as_str(),
            input.purchase_date.as_ref().map(format_datetime),
            input.subscription_status.as_str(),
            now,
        ],
    )?;
    let found = get_order(conn, conn.last_insert_rowid())?;
    fetch_inserted(conn, Order::TABLE, found)
}

fn write_order(conn: &Connection, o: &Order) -> StoreResult<()> {
    conn.execute(
        "UPDATE orders SET lead_id = ?2, website_template_id = ?3, email_template_id = ?4, status = ?5,
            purchase_date = ?6, subscription_status = ?7, updated_at = ?8
         WHERE id = ?1",
        params![
            o.id,
            o.lead_id,
            o.website_template_id,
            o.email_template_id,
            o.status.as_str(),
            o.purchase_date.as_ref().map(format_datetime),
            o.subscription_status.as_str(),
            format_datetime(&o.updated_at),
        ],
    )?;
    Ok(())
}

// ==========================================
// Deployments
// ==========================================

fn get_deployment(conn: &Connection, id: Id) -> StoreResult<Option<Deployment>> {
    let sql = format!("SELECT {DEPLOYMENT_COLUMNS} FROM deployments WHERE id = ?1");
    select_one(conn, &sql, id, deployment_from_row)
}

fn insert_deployment(conn: &Connection, input: NewDeployment) -> StoreResult<Deployment> {
    let now = format_datetime(&timestamp());
    conn.execute(
        "INSERT INTO deployments (lead_id, template_id, html, status, environment, subdomain, url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            input.lead_id,
            input.template_id,
            input.html,
            input.status.as_str(),
            input.environment.as_str(),
            input.subdomain,
            input.url,
            now,
        ],
    )?;
    let found = get_deployment(conn, conn.last_insert_rowid())?;
    fetch_inserted(conn, Deployment::TABLE, found)
}

fn write_deployment(conn: &Connection, d: &Deployment) -> StoreResult<()> {
    conn.execute(
        "UPDATE deployments SET lead_id = ?2, template_id = ?3, html = ?4, status = ?5, environment = ?6,
         subdomain = ?7, url = ?8, updated_at = ?9
         WHERE id = ?1",
        params![
            d.id,
            d.lead_id,
            d.template_id,
            d.html,
            d.status.as_str(),
            d.environment.as_str(),
            d.subdomain,
            d.url,
            format_datetime(&d.updated_at),
        ],
    )?;
    Ok(())
}

/// Read-modify-write so patch semantics match the in-memory store exactly.
fn patch_row<T: Entity>(
    conn: &Connection,
    id: Id,
    update: T::Update,
    get: fn(&Connection, Id) -> StoreResult<Option<T>>,
    write: fn(&Connection, &T) -> StoreResult<()>,
) -> StoreResult<Option<T>> {
    let Some(mut record) = get(conn, id)? else {
        return Ok(None);
    };
    record.apply(update, timestamp());
    write(conn, &record)?;
    get(conn, id)
}

#[async_trait]
impl Store for SqliteStore {
    async fn list_leads(&self) -> StoreResult<Vec<Lead>> {
        self.call(|conn| {
            let sql = format!("SELECT {LEAD_COLUMNS} FROM leads ORDER BY id");
            select_all(conn, &sql, lead_from_row)
        })
        .await
    }

    async fn get_lead(&self, id: Id) -> StoreResult<Option<Lead>> {
        self.call(move |conn| get_lead(conn, id)).await
    }

    async fn create_lead(&self, input: NewLead) -> StoreResult<Lead> {
        self.call(move |conn| insert_lead(conn, input)).await
    }

    async fn update_lead(&self, id: Id, update: LeadUpdate) -> StoreResult<Option<Lead>> {
        self.call(move |conn| patch_row(conn, id, update, get_lead, write_lead))
            .await
    }

    async fn delete_lead(&self, id: Id) -> StoreResult<bool> {
        self.call(move |conn| delete_by_id(conn, Lead::TABLE, id)).await
    }

    async fn list_website_templates(&self) -> StoreResult<Vec<WebsiteTemplate>> {
        self.call(|conn| {
            let sql = format!("SELECT {WEBSITE_TEMPLATE_COLUMNS} FROM website_templates ORDER BY id");
            select_all(conn, &sql, website_template_from_row)
        })
        .await
    }

    async fn get_website_template(&self, id: Id) -> StoreResult<Option<WebsiteTemplate>> {
        self.call(move |conn| get_website_template(conn, id)).await
    }

    async fn create_website_template(
        &self,
        input: NewWebsiteTemplate,
    ) -> StoreResult<WebsiteTemplate> {
        self.call(move |conn| insert_website_template(conn, input))
            .await
    }

    async fn update_website_template(
        &self,
        id: Id,
        update: WebsiteTemplateUpdate,
    ) -> StoreResult<Option<WebsiteTemplate>> {
        self.call(move |conn| {
            patch_row(conn, id, update, get_website_template, write_website_template)
        })
        .await
    }

    async fn delete_website_template(&self, id: Id) -> StoreResult<bool> {
        self.call(move |conn| delete_by_id(conn, WebsiteTemplate::TABLE, id))
            .await
    }

    async fn list_passed_website_templates(&self) -> StoreResult<Vec<WebsiteTemplate>> {
        self.call(|conn| {
            let sql = format!(
                "SELECT {WEBSITE_TEMPLATE_COLUMNS} FROM website_templates WHERE test_status = 'passed' ORDER BY id"
            );
            select_all(conn, &sql, website_template_from_row)
        })
        .await
    }

    async fn list_email_templates(&self) -> StoreResult<Vec<EmailTemplate>> {
        self.call(|conn| {
            let sql = format!("SELECT {EMAIL_TEMPLATE_COLUMNS} FROM email_templates ORDER BY id");
            select_all(conn, &sql, email_template_from_row)
        })
        .await
    }

    async fn get_email_template(&self, id: Id) -> StoreResult<Option<EmailTemplate>> {
        self.call(move |conn| get_email_template(conn, id)).await
    }

    async fn create_email_template(&self, input: NewEmailTemplate) -> StoreResult<EmailTemplate> {
        self.call(move |conn| insert_email_template(conn, input))
            .await
    }

    async fn update_email_template(
        &self,
        id: Id,
        update: EmailTemplateUpdate,
    ) -> StoreResult<Option<EmailTemplate>> {
        self.call(move |conn| {
            patch_row(conn, id, update, get_email_template, write_email_template)
        })
        .await
    }

    async fn delete_email_template(&self, id: Id) -> StoreResult<bool> {
        self.call(move |conn| delete_by_id(conn, EmailTemplate::TABLE, id))
            .await
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        self.call(|conn| {
            let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id");
            select_all(conn, &sql, order_from_row)
        })
        .await
    }

    async fn get_order(&self, id: Id) -> StoreResult<Option<Order>> {
        self.call(move |conn| get_order(conn, id)).await
    }

    async fn create_order(&self, input: NewOrder) -> StoreResult<Order> {
        self.call(move |conn| insert_order(conn, input)).await
    }

    async fn update_order(&self, id: Id, update: OrderUpdate) -> StoreResult<Option<Order>> {
        self.call(move |conn| patch_row(conn, id, update, get_order, write_order))
            .await
    }

    async fn delete_order(&self, id: Id) -> StoreResult<bool> {
        self.call(move |conn| delete_by_id(conn, Order::TABLE, id))
            .await
    }

    async fn list_orders_for_lead(&self, lead_id: Id) -> StoreResult<Vec<Order>> {
        self.call(move |conn| {
            let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE lead_id = ?1 ORDER BY id");
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt
                .query_map(params![lead_id], order_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    async fn list_deployments(&self, filter: &DeploymentFilter) -> StoreResult<Vec<Deployment>> {
        let filter = filter.clone();
        self.call(move |conn| {
                let sql = format!(
                    "SELECT {DEPLOYMENT_COLUMNS} FROM deployments
                     WHERE (?1 IS NULL OR lead_id = ?1)
                       AND (?2 IS NULL OR status = ?2)
                       AND (?3 IS NULL OR environment = ?3)
                     ORDER BY created_at DESC, id DESC"
                );
                let mut stmt = conn.prepare_cached(&sql)?;
                let rows = stmt
                    .query_map(
                        params![
                            filter.lead_id,
                            filter.status.map(|s| s.as_str()),
                            filter.environment.map(|e| e.as_str()),
                        ],
                        deployment_from_row,
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

    async fn get_deployment(&self, id: Id) -> StoreResult<Option<Deployment>> {
        self.call(move |conn| get_deployment(conn, id)).await
    }

    async fn create_deployment(&self, input: NewDeployment) -> StoreResult<Deployment> {
        self.call(move |conn| insert_deployment(conn, input)).await
    }

    async fn update_deployment(
        &self,
        id: Id,
        update: DeploymentUpdate,
    ) -> StoreResult<Option<Deployment>> {
        self.call(move |conn| patch_row(conn, id, update, get_deployment, write_deployment))
            .await
    }

    async fn delete_deployment(&self, id: Id) -> StoreResult<bool> {
        self.call(move |conn| delete_by_id(conn, Deployment::TABLE, id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{seed, LeadFilter, ScrapedData};
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_runs_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("leadsite.sqlite");

        let store = SqliteStore::open(&db_path).await.unwrap();
        assert!(db_path.exists());
        assert!(store.health_check().await.is_ok());
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn lead_crud_round_trip() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        let created = store
            .create_lead(NewLead {
                name: "Jane Doe".to_string(),
                email: "jane.doe@example.com".to_string(),
                company: Some("Doe Bakery".to_string()),
                scraped_data: Some(ScrapedData {
                    description: "Bakery".to_string(),
                    services: vec!["Cakes".to_string()],
                    location: "Boston, MA".to_string(),
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, 1);

        let fetched = store.get_lead(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = store
            .update_lead(
                created.id,
                LeadUpdate {
                    status: Some(LeadStatus::WebsiteGenerated),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, LeadStatus::WebsiteGenerated);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.scraped_data, created.scraped_data);

        assert!(store.delete_lead(created.id).await.unwrap());
        assert!(store.get_lead(created.id).await.unwrap().is_none());
        assert!(!store.delete_lead(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let input = NewEmailTemplate {
            name: "Welcome".to_string(),
            subject: "Hi {name}".to_string(),
            body: "Body".to_string(),
            ..Default::default()
        };

        let first = store.create_email_template(input.clone()).await.unwrap();
        store.delete_email_template(first.id).await.unwrap();
        let second = store.create_email_template(input).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn update_unknown_returns_none() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let result = store
            .update_order(99, OrderUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn seeded_queries_match_memory_semantics() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        seed::populate(&store).await.unwrap();

        assert_eq!(store.list_passed_website_templates().await.unwrap().len(), 2);
        assert_eq!(store.list_passed_email_templates().await.unwrap().len(), 2);
        assert_eq!(store.list_orders_for_lead(3).await.unwrap().len(), 1);

        let plumbing = store
            .filter_leads(&LeadFilter {
                search: Some("plumb".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(plumbing.len(), 1);
        assert_eq!(plumbing[0].name, "Bob Johnson");

        let purchased = store.get_order(1).await.unwrap().unwrap();
        assert_eq!(purchased.status, OrderStatus::Purchased);
        assert!(purchased.purchase_date.is_some());
    }

    #[tokio::test]
    async fn deployment_filters_apply_in_sql() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        for (lead_id, environment) in [
            (1, Environment::Development),
            (1, Environment::Production),
            (2, Environment::Development),
        ] {
            store
                .create_deployment(NewDeployment {
                    lead_id,
                    template_id: 1,
                    html: "<h1>hi</h1>".to_string(),
                    environment,
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let dev = store
            .list_deployments(&DeploymentFilter {
                environment: Some(Environment::Development),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(dev.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3, 1]);

        let lead_one_prod = store
            .list_deployments(&DeploymentFilter {
                lead_id: Some(1),
                environment: Some(Environment::Production),
                status: Some(DeploymentStatus::Pending),
            })
            .await
            .unwrap();
        assert_eq!(lead_one_prod.len(), 1);
        assert_eq!(lead_one_prod[0].id, 2);
    }

    #[tokio::test]
    async fn deployment_patch_round_trips_every_column() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let created = store
            .create_deployment(NewDeployment {
                lead_id: 1,
                template_id: 1,
                html: "<p>v1</p>".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        store
            .update_deployment(
                created.id,
                DeploymentUpdate {
                    lead_id: Some(2),
                    template_id: Some(3),
                    status: Some(DeploymentStatus::Completed),
                    subdomain: Some("doebakery".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        let stored = store.get_deployment(created.id).await.unwrap().unwrap();
        assert_eq!(stored.lead_id, 2);
        assert_eq!(stored.template_id, 3);
        assert_eq!(stored.html, "<p>v1</p>");
        assert_eq!(stored.status, DeploymentStatus::Completed);
        assert_eq!(stored.subdomain.as_deref(), Some("doebakery"));
        assert_eq!(stored.created_at, created.created_at);
    }
}
