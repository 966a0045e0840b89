//! CLI command handlers.

pub mod articles;
pub mod auth;
pub mod config;
pub mod tui;

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use stackscroll_core::config::Config;
use stackscroll_core::session::SessionManager;
use stackscroll_core::store::AuthBackend;
use stackscroll_core::store::supabase::SupabaseClient;

/// Store client plus the session manager following it.
pub struct Backend {
    pub client: Arc<SupabaseClient>,
    pub session: SessionManager,
}

impl Backend {
    /// Connects to the configured backend and restores the saved session.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Arc::new(SupabaseClient::from_config(config)?);
        let session = SessionManager::new(Arc::clone(&client) as Arc<dyn AuthBackend>);
        if let Err(err) = session.initialize().await {
            // Continue signed out; commands that need a session say so.
            tracing::warn!(error = %err, "Session restore failed");
            eprintln!("Warning: {err}");
        }
        Ok(Self { client, session })
    }
}

/// Reads a password from stdin, dropping the trailing newline.
fn read_password() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_to_string(&mut input)
        .context("read password from stdin")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
