//! Shareable article links and the clipboard seam.

use std::sync::{Mutex, PoisonError};

use anyhow::{Result, bail};
use url::Url;

use crate::models::ArticleId;

/// Builds the canonical link for an article: `{origin}/blog/{id}`.
///
/// # Errors
/// Returns an error if `origin` is not an absolute http(s) URL.
pub fn share_link(origin: &str, id: &ArticleId) -> Result<Url> {
    let mut url = Url::parse(origin)?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Share origin must be http or https: {origin}");
    }
    url.set_query(None);
    url.set_fragment(None);
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().extend(["blog", id.0.as_str()]);
        }
        Err(()) => bail!("Share origin cannot carry a path: {origin}"),
    }
    Ok(url)
}

/// Write-only access to the system clipboard.
pub trait Clipboard: Send + Sync {
    /// # Errors
    /// Returns an error if no clipboard mechanism accepted the text.
    fn copy_text(&self, text: &str) -> Result<()>;
}

/// Clipboard that keeps the last copied text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    last: Mutex<Option<String>>,
    broken: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every copy fails.
    pub fn broken() -> Self {
        Self {
            last: Mutex::new(None),
            broken: true,
        }
    }

    pub fn last(&self) -> Option<String> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy_text(&self, text: &str) -> Result<()> {
        if self.broken {
            bail!("clipboard unavailable");
        }
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}
