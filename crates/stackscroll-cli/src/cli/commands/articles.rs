//! Article command handlers.

use std::io::{BufRead, IsTerminal, Write};

use anyhow::{Context, Result, bail};
use stackscroll_core::config::Config;
use stackscroll_core::error::messages;
use stackscroll_core::models::{Article, ArticleId};
use stackscroll_core::viewmodel::{ComposeViewModel, ListingViewModel, preview};

use super::Backend;

pub async fn list(config: &Config, full: bool, json: bool) -> Result<()> {
    let backend = Backend::connect(config).await?;
    let mut vm = ListingViewModel::new();
    vm.load(&*backend.client).await?;

    if json {
        let out = serde_json::to_string_pretty(vm.articles()).context("serialize articles")?;
        println!("{out}");
        return Ok(());
    }

    if vm.articles().is_empty() {
        println!("{}", messages::EMPTY_LISTING);
        return Ok(());
    }
    for (idx, article) in vm.articles().iter().enumerate() {
        if idx > 0 {
            println!();
        }
        println!(
            "{}  {}  {}",
            article.id,
            article.created_at.format("%Y-%m-%d"),
            article.title
        );
        let body = if full {
            article.body.clone()
        } else {
            preview(&article.body)
        };
        for line in body.lines() {
            println!("    {line}");
        }
    }
    Ok(())
}

pub async fn publish(config: &Config, title: String, body: String) -> Result<()> {
    let backend = Backend::connect(config).await?;
    let user = backend.session.current_user();

    let mut vm = ComposeViewModel::new();
    vm.title = title;
    vm.body = body;
    let article = vm
        .publish(&*backend.client, user.as_ref())
        .await?
        .context("publish did not run")?;
    println!("Published article {}: {}", article.id, article.title);
    Ok(())
}

pub async fn delete(config: &Config, id: &str, yes: bool) -> Result<()> {
    let backend = Backend::connect(config).await?;
    let user = backend.session.current_user();

    let mut vm = ListingViewModel::new();
    vm.load(&*backend.client).await?;
    let article = find(&vm, id)?;

    if !ListingViewModel::can_delete(&article, user.as_ref()) {
        bail!(messages::DELETE_NOT_AUTHOR);
    }
    if !yes && !confirm(&format!("{} \"{}\"", messages::DELETE_CONFIRM, article.title))? {
        println!("Cancelled.");
        return Ok(());
    }

    vm.delete(&*backend.client, &article, user.as_ref()).await?;
    println!("Deleted article {}", article.id);
    Ok(())
}

pub async fn share(config: &Config, id: &str, copy: bool, open: bool) -> Result<()> {
    let backend = Backend::connect(config).await?;
    let mut vm = ListingViewModel::new();
    vm.load(&*backend.client).await?;
    let article = find(&vm, id)?;

    let link = vm.begin_share(&article, &config.share.origin)?;
    println!("{link}");

    if copy {
        match copy_link(&mut vm, &link) {
            Ok(()) => {
                if let Some(notice) = vm.notice() {
                    eprintln!("{notice}");
                }
            }
            Err(e) => eprintln!("Warning: {e}"),
        }
    }
    if open {
        open::that(&link).with_context(|| format!("open {link}"))?;
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn copy_link(vm: &mut ListingViewModel, link: &str) -> Result<()> {
    use stackscroll_core::share::Clipboard;
    use stackscroll_tui::common::TerminalClipboard;

    vm.finish_share(TerminalClipboard.copy_text(link))?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn copy_link(vm: &mut ListingViewModel, _link: &str) -> Result<()> {
    vm.finish_share(Err(anyhow::anyhow!("built without clipboard support")))?;
    Ok(())
}

fn find(vm: &ListingViewModel, id: &str) -> Result<Article> {
    vm.article(&ArticleId::from(id))
        .cloned()
        .with_context(|| format!("No article with id '{id}'"))
}

/// Asks a yes/no question on stderr. Anything but `y`/`yes` is a no.
fn confirm(question: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        bail!("Refusing to delete without confirmation; pass --yes");
    }
    let mut stderr = std::io::stderr();
    write!(stderr, "{question} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
