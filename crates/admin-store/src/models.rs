//! Model types for every table.
//!
//! Records serialize with camelCase field names, which is the shape the
//! admin API exchanges with its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row identifier. Positive, auto-incrementing per table.
pub type Id = i64;

/// A stored record that can be created from a `New` input and patched by an `Update`.
pub trait Entity: Clone + Send + Sync + 'static {
    type New: Send + 'static;
    type Update: Send + 'static;

    /// Table name, used in logs and error messages.
    const TABLE: &'static str;

    fn id(&self) -> Id;
    fn created_at(&self) -> DateTime<Utc>;
    fn from_new(id: Id, input: Self::New, now: DateTime<Utc>) -> Self;
    /// Merge a patch into the record and bump `updated_at`.
    fn apply(&mut self, update: Self::Update, now: DateTime<Utc>);
}

macro_rules! patch {
    ($target:expr, $update:expr; $($field:ident),* $(,)?) => {
        $(if let Some(value) = $update.$field {
            $target.$field = value;
        })*
    };
}

macro_rules! patch_optional {
    ($target:expr, $update:expr; $($field:ident),* $(,)?) => {
        $(if let Some(value) = $update.$field {
            $target.$field = Some(value);
        })*
    };
}

// ==========================================
// Leads
// ==========================================

/// Lead pipeline stage. Wire strings are the human-readable labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    #[serde(rename = "Pending Enrichment")]
    PendingEnrichment,
    #[serde(rename = "Ready for Website Gen")]
    ReadyForWebsiteGen,
    #[serde(rename = "Website Generated")]
    WebsiteGenerated,
    #[serde(rename = "Emailed")]
    Emailed,
    #[serde(rename = "Purchased")]
    Purchased,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        Self::PendingEnrichment,
        Self::ReadyForWebsiteGen,
        Self::WebsiteGenerated,
        Self::Emailed,
        Self::Purchased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingEnrichment => "Pending Enrichment",
            Self::ReadyForWebsiteGen => "Ready for Website Gen",
            Self::WebsiteGenerated => "Website Generated",
            Self::Emailed => "Emailed",
            Self::Purchased => "Purchased",
        }
    }

    /// Parse a wire label, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
    }
}

/// Enrichment data scraped from a lead's existing web presence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedData {
    pub description: String,
    pub services: Vec<String>,
    pub location: String,
}

/// Lead record - a prospective customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub status: LeadStatus,
    pub description: Option<String>,
    pub scraped_data: Option<ScrapedData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Company name, falling back to the contact name.
    pub fn display_company(&self) -> &str {
        self.company
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// Input for creating a lead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scraped_data: Option<ScrapedData>,
}

/// Partial lead patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub status: Option<LeadStatus>,
    pub description: Option<String>,
    pub scraped_data: Option<ScrapedData>,
}

impl Entity for Lead {
    type New = NewLead;
    type Update = LeadUpdate;
    const TABLE: &'static str = "leads";

    fn id(&self) -> Id {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_new(id: Id, input: NewLead, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            company: input.company,
            industry: input.industry,
            status: input.status,
            description: input.description,
            scraped_data: input.scraped_data,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, update: LeadUpdate, now: DateTime<Utc>) {
        patch!(self, update; name, email, status);
        patch_optional!(self, update; phone, company, industry, description, scraped_data);
        self.updated_at = now;
    }
}

/// Lead list filter. Empty lists match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadFilter {
    /// Case-insensitive substring over name, email, phone and company.
    pub search: Option<String>,
    pub industries: Vec<String>,
    pub statuses: Vec<LeadStatus>,
}

impl LeadFilter {
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.industries.is_empty()
            && self.statuses.is_empty()
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [
                    Some(lead.name.as_str()),
                    Some(lead.email.as_str()),
                    lead.phone.as_deref(),
                    lead.company.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|value| value.to_lowercase().contains(&term))
            }
        };

        let matches_industry = self.industries.is_empty()
            || lead.industry.as_deref().is_some_and(|industry| {
                self.industries
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(industry))
            });

        let matches_status = self.statuses.is_empty() || self.statuses.contains(&lead.status);

        matches_search && matches_industry && matches_status
    }
}

// ==========================================
// Templates
// ==========================================

/// Template QA status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// Website template - an HTML/CSS pair with placeholder tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteTemplate {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub html: String,
    pub css: Option<String>,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub test_status: TestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebsiteTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html: String,
    #[serde(default)]
    pub css: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub test_status: TestStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebsiteTemplateUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub html: Option<String>,
    pub css: Option<String>,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub test_status: Option<TestStatus>,
}

impl Entity for WebsiteTemplate {
    type New = NewWebsiteTemplate;
    type Update = WebsiteTemplateUpdate;
    const TABLE: &'static str = "website_templates";

    fn id(&self) -> Id {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_new(id: Id, input: NewWebsiteTemplate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            html: input.html,
            css: input.css,
            thumbnail: input.thumbnail,
            category: input.category,
            test_status: input.test_status,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, update: WebsiteTemplateUpdate, now: DateTime<Utc>) {
        patch!(self, update; name, html, test_status);
        patch_optional!(self, update; description, css, thumbnail, category);
        self.updated_at = now;
    }
}

/// Email template - subject and body with `{token}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub id: Id,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub test_status: TestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmailTemplate {
    pub name: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub test_status: TestStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailTemplateUpdate {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub test_status: Option<TestStatus>,
}

impl Entity for EmailTemplate {
    type New = NewEmailTemplate;
    type Update = EmailTemplateUpdate;
    const TABLE: &'static str = "email_templates";

    fn id(&self) -> Id {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_new(id: Id, input: NewEmailTemplate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            subject: input.subject,
            body: input.body,
            test_status: input.test_status,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, update: EmailTemplateUpdate, now: DateTime<Utc>) {
        patch!(self, update; name, subject, body, test_status);
        self.updated_at = now;
    }
}

// ==========================================
// Orders
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Purchased,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Purchased => "Purchased",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "purchased" => Self::Purchased,
            "cancelled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    Active,
    #[default]
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => Self::Active,
            _ => Self::Inactive,
        }
    }
}

/// Order record - a lead's purchase of a generated site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Id,
    pub lead_id: Id,
    pub website_template_id: Id,
    pub email_template_id: Id,
    pub status: OrderStatus,
    pub purchase_date: Option<DateTime<Utc>>,
    pub subscription_status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub lead_id: Id,
    pub website_template_id: Id,
    pub email_template_id: Id,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderUpdate {
    pub lead_id: Option<Id>,
    pub website_template_id: Option<Id>,
    pub email_template_id: Option<Id>,
    pub status: Option<OrderStatus>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub subscription_status: Option<SubscriptionStatus>,
}

impl Entity for Order {
    type New = NewOrder;
    type Update = OrderUpdate;
    const TABLE: &'static str = "orders";

    fn id(&self) -> Id {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_new(id: Id, input: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            lead_id: input.lead_id,
            website_template_id: input.website_template_id,
            email_template_id: input.email_template_id,
            status: input.status,
            purchase_date: input.purchase_date,
            subscription_status: input.subscription_status,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, update: OrderUpdate, now: DateTime<Utc>) {
        patch!(self, update; lead_id, website_template_id, email_template_id, status, subscription_status);
        patch_optional!(self, update; purchase_date);
        self.updated_at = now;
    }
}

// ==========================================
// Deployments
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Deployment target environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }
}

/// Deployment record - generated HTML for a lead, with status and target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: Id,
    pub lead_id: Id,
    pub template_id: Id,
    pub html: String,
    pub status: DeploymentStatus,
    pub environment: Environment,
    pub subdomain: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeployment {
    pub lead_id: Id,
    pub template_id: Id,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub status: DeploymentStatus,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentUpdate {
    pub lead_id: Option<Id>,
    pub template_id: Option<Id>,
    pub html: Option<String>,
    pub status: Option<DeploymentStatus>,
    pub environment: Option<Environment>,
    pub subdomain: Option<String>,
    pub url: Option<String>,
}

impl Entity for Deployment {
    type New = NewDeployment;
    type Update = DeploymentUpdate;
    const TABLE: &'static str = "deployments";

    fn id(&self) -> Id {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_new(id: Id, input: NewDeployment, now: DateTime<Utc>) -> Self {
        Self {
            id,
            lead_id: input.lead_id,
            template_id: input.template_id,
            html: input.html,
            status: input.status,
            environment: input.environment,
            subdomain: input.subdomain,
            url: input.url,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, update: DeploymentUpdate, now: DateTime<Utc>) {
        patch!(self, update; lead_id, template_id, html, status, environment);
        patch_optional!(self, update; subdomain, url);
        self.updated_at = now;
    }
}

/// Deployment list filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentFilter {
    pub lead_id: Option<Id>,
    pub status: Option<DeploymentStatus>,
    pub environment: Option<Environment>,
}

impl DeploymentFilter {
    pub fn is_empty(&self) -> bool {
        self.lead_id.is_none() && self.status.is_none() && self.environment.is_none()
    }

    pub fn matches(&self, deployment: &Deployment) -> bool {
        self.lead_id.map_or(true, |id| deployment.lead_id == id)
            && self.status.map_or(true, |s| deployment.status == s)
            && self.environment.map_or(true, |e| deployment.environment == e)
    }
}

/// Newest first; ties broken by id so equal timestamps stay deterministic.
pub fn sort_newest_first(deployments: &mut [Deployment]) {
    deployments.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(name: &str, company: Option<&str>, industry: Option<&str>) -> Lead {
        Lead::from_new(
            1,
            NewLead {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                phone: Some("555-123-4567".to_string()),
                company: company.map(str::to_string),
                industry: industry.map(str::to_string),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn lead_status_wire_strings() {
        let json = serde_json::to_string(&LeadStatus::ReadyForWebsiteGen).unwrap();
        assert_eq!(json, "\"Ready for Website Gen\"");

        let parsed: LeadStatus = serde_json::from_str("\"Website Generated\"").unwrap();
        assert_eq!(parsed, LeadStatus::WebsiteGenerated);

        assert_eq!(LeadStatus::parse("pending enrichment"), Some(LeadStatus::PendingEnrichment));
        assert_eq!(LeadStatus::parse("Archived"), None);
    }

    #[test]
    fn lead_serializes_camel_case() {
        let value = serde_json::to_value(lead("Jane Doe", Some("Doe Bakery"), None)).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("scrapedData").is_some());
        assert_eq!(value["status"], "Pending Enrichment");
    }

    #[test]
    fn filter_search_is_case_insensitive_across_fields() {
        let l = lead("Jane Doe", Some("Doe Bakery"), Some("Food & Beverage"));

        let by_company = LeadFilter {
            search: Some("BAKERY".to_string()),
            ..Default::default()
        };
        assert!(by_company.matches(&l));

        let by_phone = LeadFilter {
            search: Some("123-45".to_string()),
            ..Default::default()
        };
        assert!(by_phone.matches(&l));

        let miss = LeadFilter {
            search: Some("plumbing".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&l));
    }

    #[test]
    fn filter_lists_combine() {
        let l = lead("Bob Johnson", Some("Johnson Plumbing"), Some("Home Services"));

        let filter = LeadFilter {
            search: None,
            industries: vec!["home services".to_string(), "Legal".to_string()],
            statuses: vec![LeadStatus::PendingEnrichment],
        };
        assert!(filter.matches(&l));

        let wrong_status = LeadFilter {
            statuses: vec![LeadStatus::Purchased],
            ..filter.clone()
        };
        assert!(!wrong_status.matches(&l));

        let no_industry = lead("Nobody", None, None);
        assert!(!filter.matches(&no_industry));
        assert!(LeadFilter::default().matches(&no_industry));
    }

    #[test]
    fn apply_merges_patch_and_keeps_created_at() {
        let mut l = lead("Alice Brown", Some("Brown Law Firm"), Some("Legal"));
        let created = l.created_at;
        let later = created + chrono::Duration::seconds(5);

        l.apply(
            LeadUpdate {
                status: Some(LeadStatus::Emailed),
                phone: Some("555-000-0000".to_string()),
                ..Default::default()
            },
            later,
        );

        assert_eq!(l.status, LeadStatus::Emailed);
        assert_eq!(l.phone.as_deref(), Some("555-000-0000"));
        assert_eq!(l.company.as_deref(), Some("Brown Law Firm"));
        assert_eq!(l.created_at, created);
        assert_eq!(l.updated_at, later);
    }

    #[test]
    fn deployment_filter_matches_each_field() {
        let d = Deployment::from_new(
            7,
            NewDeployment {
                lead_id: 3,
                template_id: 1,
                environment: Environment::Production,
                ..Default::default()
            },
            Utc::now(),
        );

        assert!(DeploymentFilter::default().matches(&d));
        assert!(DeploymentFilter {
            lead_id: Some(3),
            environment: Some(Environment::Production),
            ..Default::default()
        }
        .matches(&d));
        assert!(!DeploymentFilter {
            status: Some(DeploymentStatus::Completed),
            ..Default::default()
        }
        .matches(&d));
    }

    #[test]
    fn display_company_falls_back_to_name() {
        assert_eq!(lead("John Smith", Some("Smith Consulting"), None).display_company(), "Smith Consulting");
        assert_eq!(lead("John Smith", Some("  "), None).display_company(), "John Smith");
    }
}
