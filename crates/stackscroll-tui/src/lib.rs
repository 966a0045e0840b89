//! Full-screen TUI for StackScroll.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};
use std::sync::Arc;

use anyhow::Result;
pub use runtime::TuiRuntime;
use stackscroll_core::config::Config;
use stackscroll_core::session::SessionManager;
use stackscroll_core::store::AuthBackend;
use stackscroll_core::store::supabase::SupabaseClient;

/// Opens the interactive UI against the configured backend.
pub async fn run_interactive(config: &Config) -> Result<()> {
    // The UI needs a terminal to render into.
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The interactive UI requires a terminal.\n\
             Use `stackscroll list` or `stackscroll --help` for scripting."
        );
    }

    let client = Arc::new(SupabaseClient::from_config(config)?);
    let session = Arc::new(SessionManager::new(Arc::clone(&client) as Arc<dyn AuthBackend>));

    tracing::info!(backend = %client.settings().url, "Starting TUI");
    let mut runtime = TuiRuntime::new(client, Arc::clone(&session), config.share.origin.clone())?;
    let result = runtime.run();
    drop(runtime);

    session.dispose();
    result
}
