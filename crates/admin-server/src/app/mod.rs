//! Application wiring and CLI commands.

mod commands;
mod init;
pub(crate) mod state;

pub use commands::{list_models, seed_database, setup, test_llm};
pub use init::run_server;
pub use state::AppState;
