//! Default command: the full-screen UI.

use anyhow::Result;
use stackscroll_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(config: &Config) -> Result<()> {
    stackscroll_tui::run_interactive(config).await
}

#[cfg(not(feature = "tui"))]
pub async fn run(_config: &Config) -> Result<()> {
    anyhow::bail!("This build has no interactive UI. Run `stackscroll --help` for commands.")
}
