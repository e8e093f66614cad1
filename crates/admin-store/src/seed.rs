//! Sample data for development and demos.

use crate::{
    Id, LeadStatus, NewEmailTemplate, NewLead, NewOrder, NewWebsiteTemplate, OrderStatus, Store,
    StoreError, StoreResult, SubscriptionStatus, TestStatus,
};
use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

const PROFESSIONAL_HTML: &str = include_str!("../templates/professional_business.html");
const PROFESSIONAL_CSS: &str = include_str!("../templates/professional_business.css");

/// Order referencing the other seed rows by position (0-based).
#[derive(Debug, Clone)]
pub struct SeedOrder {
    pub lead: usize,
    pub website_template: usize,
    pub email_template: usize,
    pub status: OrderStatus,
    pub purchase_date: Option<DateTime<Utc>>,
    pub subscription_status: SubscriptionStatus,
}

/// The full sample data set.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub leads: Vec<NewLead>,
    pub website_templates: Vec<NewWebsiteTemplate>,
    pub email_templates: Vec<NewEmailTemplate>,
    pub orders: Vec<SeedOrder>,
}

/// Row counts written by [`populate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub leads: usize,
    pub website_templates: usize,
    pub email_templates: usize,
    pub orders: usize,
}

fn lead(
    name: &str,
    email: &str,
    phone: &str,
    company: &str,
    industry: &str,
    status: LeadStatus,
    description: &str,
) -> NewLead {
    NewLead {
        name: name.to_string(),
        email: email.to_string(),
        phone: Some(phone.to_string()),
        company: Some(company.to_string()),
        industry: Some(industry.to_string()),
        status,
        description: Some(description.to_string()),
        scraped_data: None,
    }
}

fn date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

/// Build the sample data set: 5 leads, 3 website templates, 3 email templates and 3 orders.
pub fn sample_data() -> SeedData {
    let leads = vec![
        lead(
            "John Smith",
            "john.smith@example.com",
            "555-123-4567",
            "Smith Consulting",
            "Consulting",
            LeadStatus::PendingEnrichment,
            "Interested in a professional website for their consulting business.",
        ),
        lead(
            "Jane Doe",
            "jane.doe@example.com",
            "555-987-6543",
            "Doe Bakery",
            "Food & Beverage",
            LeadStatus::ReadyForWebsiteGen,
            "Looking for an e-commerce website to sell baked goods online.",
        ),
        lead(
            "Bob Johnson",
            "bob.johnson@example.com",
            "555-456-7890",
            "Johnson Plumbing",
            "Home Services",
            LeadStatus::WebsiteGenerated,
            "Needs a simple website to showcase their plumbing services and contact information.",
        ),
        lead(
            "Alice Brown",
            "alice.brown@example.com",
            "555-789-0123",
            "Brown Law Firm",
            "Legal",
            LeadStatus::PendingEnrichment,
            "Interested in a professional website for their law firm with client testimonials.",
        ),
        lead(
            "Charlie Wilson",
            "charlie.wilson@example.com",
            "555-234-5678",
            "Wilson Fitness",
            "Health & Fitness",
            LeadStatus::ReadyForWebsiteGen,
            "Looking for a website with class schedules and online booking capabilities.",
        ),
    ];

    let website_templates = vec![
        NewWebsiteTemplate {
            name: "Professional Business".to_string(),
            description: Some("A clean, professional template for business websites".to_string()),
            html: PROFESSIONAL_HTML.to_string(),
            css: Some(PROFESSIONAL_CSS.to_string()),
            thumbnail: None,
            category: Some("business".to_string()),
            test_status: TestStatus::Passed,
        },
        NewWebsiteTemplate {
            name: "E-commerce Store".to_string(),
            description: Some("A template for online stores with product listings".to_string()),
            html: "<!DOCTYPE html><html><head><title>{company} - Shop</title></head><body><h1>{company} Store</h1><p>{{description}}</p><div class=\"products\">{{#each services}}<div class=\"product\">{{this.title}}</div>{{/each}}</div></body></html>".to_string(),
            css: Some("body { font-family: Arial, sans-serif; } .products { display: grid; grid-template-columns: repeat(3, 1fr); }".to_string()),
            thumbnail: None,
            category: Some("ecommerce".to_string()),
            test_status: TestStatus::Passed,
        },
        NewWebsiteTemplate {
            name: "Portfolio".to_string(),
            description: Some("A template for showcasing work and projects".to_string()),
            html: "<h1>Our Work</h1><p>{{aboutUs}}</p><div class=\"portfolio\">{{#each services}}<article><h2>{{this.title}}</h2><p>{{this.description}}</p></article>{{/each}}</div>".to_string(),
            css: Some("body { font-family: Arial, sans-serif; } .portfolio { display: grid; grid-template-columns: repeat(2, 1fr); }".to_string()),
            thumbnail: None,
            category: Some("portfolio".to_string()),
            test_status: TestStatus::Pending,
        },
    ];

    let email_templates = vec![
        NewEmailTemplate {
            name: "Welcome Email".to_string(),
            subject: "Welcome to {company}!".to_string(),
            body: "Dear {name},\n\nWelcome to {company}! We're excited to have you on board.\n\nYour website is now live at: {website}\n\nIf you have any questions or need assistance, please don't hesitate to reach out.\n\nBest regards,\nThe {company} Team".to_string(),
            test_status: TestStatus::Passed,
        },
        NewEmailTemplate {
            name: "Website Launch Announcement".to_string(),
            subject: "Your {company} Website is Live!".to_string(),
            body: "Hi {name},\n\nGreat news! Your new website for {company} is now live and ready to go.\n\nYou can visit your website at: {website}\n\nWe've included all the features we discussed:\n- Modern, responsive design\n- SEO optimization\n- Contact form\n- Social media integration\n\nTake a look and let us know if you'd like any adjustments.\n\nBest regards,\nYour Website Team".to_string(),
            test_status: TestStatus::Passed,
        },
        NewEmailTemplate {
            name: "Follow-up Email".to_string(),
            subject: "How's your {company} website working for you?".to_string(),
            body: "Hello {name},\n\nI hope you're enjoying your new website for {company}! It's been a week since the launch, and I wanted to check in to see how things are going.\n\nYour website: {website}\n\nIs there anything specific you'd like to improve or any features you'd like to add?\n\nWe're here to help make your website even better!\n\nBest regards,\nYour Website Team".to_string(),
            test_status: TestStatus::Pending,
        },
    ];

    let orders = vec![
        SeedOrder {
            lead: 0,
            website_template: 0,
            email_template: 0,
            status: OrderStatus::Purchased,
            purchase_date: date(2024, 1, 10),
            subscription_status: SubscriptionStatus::Active,
        },
        SeedOrder {
            lead: 1,
            website_template: 1,
            email_template: 1,
            status: OrderStatus::Pending,
            purchase_date: None,
            subscription_status: SubscriptionStatus::Inactive,
        },
        SeedOrder {
            lead: 2,
            website_template: 2,
            email_template: 2,
            status: OrderStatus::Purchased,
            purchase_date: date(2024, 1, 20),
            subscription_status: SubscriptionStatus::Active,
        },
    ];

    SeedData {
        leads,
        website_templates,
        email_templates,
        orders,
    }
}

fn resolve(ids: &[Id], index: usize, table: &str) -> StoreResult<Id> {
    ids.get(index).copied().ok_or_else(|| {
        StoreError::InvalidData(format!("seed order references missing {table} #{index}"))
    })
}

/// Write the sample data set into `store`.
///
/// Orders are linked to the ids the store actually assigned.
pub async fn populate<S: Store + ?Sized>(store: &S) -> StoreResult<SeedSummary> {
    let data = sample_data();

    let mut lead_ids = Vec::with_capacity(data.leads.len());
    for input in data.leads {
        lead_ids.push(store.create_lead(input).await?.id);
    }

    let mut website_ids = Vec::with_capacity(data.website_templates.len());
    for input in data.website_templates {
        website_ids.push(store.create_website_template(input).await?.id);
    }

    let mut email_ids = Vec::with_capacity(data.email_templates.len());
    for input in data.email_templates {
        email_ids.push(store.create_email_template(input).await?.id);
    }

    let order_count = data.orders.len();
    for order in data.orders {
        store
            .create_order(NewOrder {
                lead_id: resolve(&lead_ids, order.lead, "lead")?,
                website_template_id: resolve(&website_ids, order.website_template, "website template")?,
                email_template_id: resolve(&email_ids, order.email_template, "email template")?,
                status: order.status,
                purchase_date: order.purchase_date,
                subscription_status: order.subscription_status,
            })
            .await?;
    }

    let summary = SeedSummary {
        leads: lead_ids.len(),
        website_templates: website_ids.len(),
        email_templates: email_ids.len(),
        orders: order_count,
    };
    info!(
        leads = summary.leads,
        website_templates = summary.website_templates,
        email_templates = summary.email_templates,
        orders = summary.orders,
        "Sample data loaded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn sample_data_shape() {
        let data = sample_data();
        assert_eq!(data.leads.len(), 5);
        assert_eq!(data.website_templates.len(), 3);
        assert_eq!(data.email_templates.len(), 3);
        assert_eq!(data.orders.len(), 3);
        assert!(data.website_templates[0].html.contains("{{companyName}}"));
        assert!(data
            .email_templates
            .iter()
            .all(|t| t.body.contains("{website}")));
    }

    #[tokio::test]
    async fn populate_links_orders_to_created_rows() {
        let store = MemoryStore::new();
        // Shift lead ids so position and id differ.
        let placeholder = store
            .create_lead(NewLead {
                name: "Placeholder".to_string(),
                email: "p@example.com".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        store.delete_lead(placeholder.id).await.unwrap();

        let summary = populate(&store).await.unwrap();
        assert_eq!(summary.orders, 3);

        let orders = store.list_orders().await.unwrap();
        assert_eq!(orders[0].lead_id, 2);
        let lead = store.get_lead(orders[0].lead_id).await.unwrap().unwrap();
        assert_eq!(lead.name, "John Smith");
    }
}
