//! Data layer for the Leadsite admin backend.
//!
//! This crate provides:
//! - Model types for leads, templates, orders and deployments
//! - The async [`Store`] repository trait
//! - [`MemoryStore`], in-memory tables keyed by auto-incrementing ids
//! - [`SqliteStore`], a simple relational schema on a dedicated SQLite thread
//! - [`LatentStore`], a facade that delays every call like a remote API
//! - Sample data for development (`seed`)
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryStore::seeded().await?;
//! let ready = store
//!     .filter_leads(&LeadFilter {
//!         statuses: vec![LeadStatus::ReadyForWebsiteGen],
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

mod error;
mod latency;
mod memory;
mod migrations;
mod models;
pub mod seed;
mod sqlite;
mod store;

pub use error::{StoreError, StoreResult};
pub use latency::{LatentStore, Latency};
pub use memory::MemoryStore;
pub use migrations::{run_migrations, CURRENT_VERSION};
pub use models::*;
pub use sqlite::SqliteStore;
pub use store::Store;
