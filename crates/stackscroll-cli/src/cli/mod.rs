//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stackscroll_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "stackscroll")]
#[command(version)]
#[command(about = "Read, write and share technical articles from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with email and password (password is read from stdin)
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account (password is read from stdin)
    Signup {
        #[arg(long)]
        email: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,

    /// List articles, newest first
    List {
        /// Print full bodies instead of previews
        #[arg(long)]
        full: bool,
        /// Print the raw rows as JSON
        #[arg(long, conflicts_with = "full")]
        json: bool,
    },
    /// Publish a new article
    Publish {
        #[arg(long)]
        title: String,
        /// Markdown body
        #[arg(long, required_unless_present = "body_file", conflicts_with = "body_file")]
        body: Option<String>,
        /// Read the markdown body from a file
        #[arg(long, value_name = "PATH")]
        body_file: Option<PathBuf>,
    },
    /// Delete one of your articles
    Delete {
        #[arg(value_name = "ID")]
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print the shareable link of an article and copy it to the clipboard
    Share {
        #[arg(value_name = "ID")]
        id: String,
        /// Only print the link
        #[arg(long = "no-copy")]
        no_copy: bool,
        /// Also open the link in the browser
        #[arg(long)]
        open: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands must work even when the config file is broken.
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let config = config::Config::load().context("load config")?;
    let _log_guard = match logging::init(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    // default to the interactive UI
    let Some(command) = cli.command else {
        return commands::tui::run(&config).await;
    };

    match command {
        Commands::Login { email } => commands::auth::login(&config, &email).await,
        Commands::Signup { email } => commands::auth::signup(&config, &email).await,
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Whoami => commands::auth::whoami(&config).await,

        Commands::List { full, json } => commands::articles::list(&config, full, json).await,
        Commands::Publish {
            title,
            body,
            body_file,
        } => {
            let body = match (body, body_file) {
                (Some(body), _) => body,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("read body from {}", path.display()))?,
                (None, None) => anyhow::bail!("Provide --body or --body-file"),
            };
            commands::articles::publish(&config, title, body).await
        }
        Commands::Delete { id, yes } => commands::articles::delete(&config, &id, yes).await,
        Commands::Share { id, no_copy, open } => {
            commands::articles::share(&config, &id, !no_copy, open).await
        }

        Commands::Config { .. } => Ok(()),
    }
}
