//! Listing screen: load, expand, delete and share articles.

use std::borrow::Cow;

use crate::error::{AppError, AppErrorKind, messages};
use crate::models::{Article, ArticleId, User};
use crate::share::{Clipboard, share_link};
use crate::store::{ArticleStore, ListOrder, StoreResult};
use crate::task::{TaskId, TaskSeq, TaskState};

/// Characters of body shown while an article is collapsed.
pub const PREVIEW_CHARS: usize = 200;
pub const TRUNCATION_MARKER: &str = "...";

/// Collapsed rendering: the first [`PREVIEW_CHARS`] characters plus the
/// marker. The marker is appended even when nothing was cut.
pub fn preview(body: &str) -> String {
    let mut out: String = body.chars().take(PREVIEW_CHARS).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// A delete the store should carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub task: TaskId,
    pub id: ArticleId,
}

#[derive(Debug, Default)]
pub struct ListingViewModel {
    articles: Vec<Article>,
    expanded: Option<ArticleId>,
    loaded: bool,
    load: TaskState,
    delete: TaskState,
    deleting: Option<ArticleId>,
    seq: TaskSeq,
    error: Option<AppError>,
    notice: Option<String>,
}

impl ListingViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Articles newest first, as last loaded.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn article(&self, id: &ArticleId) -> Option<&Article> {
        self.articles.iter().find(|article| article.id == *id)
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_running()
    }

    /// True once any load has succeeded.
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    /// Success feedback (e.g. link copied).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_feedback(&mut self) {
        self.error = None;
        self.notice = None;
    }

    // ---- load ----

    /// Starts a fetch, superseding any fetch still in flight.
    pub fn begin_load(&mut self) -> TaskId {
        let id = self.seq.next_id();
        self.load.start(id);
        id
    }

    /// Applies a fetch result. Returns false if `task` was superseded.
    ///
    /// On failure the previous articles stay in place.
    pub fn finish_load(&mut self, task: TaskId, result: StoreResult<Vec<Article>>) -> bool {
        if !self.load.finish_if_active(task) {
            tracing::debug!(?task, "Dropping stale listing result");
            return false;
        }
        match result {
            Ok(articles) => {
                tracing::debug!(count = articles.len(), "Listing loaded");
                self.articles = articles;
                self.loaded = true;
                self.error = None;
                if let Some(expanded) = &self.expanded
                    && self.article(expanded).is_none()
                {
                    self.expanded = None;
                }
            }
            Err(err) => {
                self.error = Some(AppError::remote(messages::LOAD_FAILED, &err));
            }
        }
        true
    }

    /// Fetches all articles, newest first.
    pub async fn load(&mut self, store: &dyn ArticleStore) -> Result<(), AppError> {
        let task = self.begin_load();
        let result = store.list_all(ListOrder::NEWEST_FIRST).await;
        self.finish_load(task, result);
        self.error.clone().map_or(Ok(()), Err)
    }

    // ---- expand / render ----

    /// Expands `id`, or collapses it if it is already expanded.
    pub fn toggle_expand(&mut self, id: &ArticleId) {
        if self.expanded.as_ref() == Some(id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id.clone());
        }
    }

    pub fn expanded(&self) -> Option<&ArticleId> {
        self.expanded.as_ref()
    }

    pub fn is_expanded(&self, id: &ArticleId) -> bool {
        self.expanded.as_ref() == Some(id)
    }

    /// Full body when expanded, [`preview`] otherwise.
    pub fn render<'a>(&self, article: &'a Article) -> Cow<'a, str> {
        if self.is_expanded(&article.id) {
            Cow::Borrowed(article.body.as_str())
        } else {
            Cow::Owned(preview(&article.body))
        }
    }

    // ---- delete ----

    /// Whether `user` may delete `article`; the delete control is shown only then.
    pub fn can_delete(article: &Article, user: Option<&User>) -> bool {
        user.is_some_and(|user| article.is_authored_by(user))
    }

    pub fn deleting(&self) -> Option<&ArticleId> {
        self.deleting.as_ref()
    }

    /// Starts deleting `article`. The caller has already confirmed intent.
    ///
    /// Fails without touching any state when `user` is not the author.
    pub fn begin_delete(
        &mut self,
        article: &Article,
        user: Option<&User>,
    ) -> Result<DeleteRequest, AppError> {
        if !Self::can_delete(article, user) {
            tracing::warn!(article = %article.id, "Delete refused: not the author");
            return Err(AppError::denied(messages::DELETE_NOT_AUTHOR));
        }
        let task = self.seq.next_id();
        self.delete.start(task);
        self.deleting = Some(article.id.clone());
        Ok(DeleteRequest {
            task,
            id: article.id.clone(),
        })
    }

    /// Applies a delete result. Returns true when the listing should reload.
    ///
    /// Nothing is removed locally; the article disappears on the next load.
    pub fn finish_delete(&mut self, task: TaskId, result: StoreResult<()>) -> bool {
        if !self.delete.finish_if_active(task) {
            return false;
        }
        let id = self.deleting.take();
        match result {
            Ok(()) => {
                tracing::info!(article = ?id, "Article deleted");
                self.error = None;
                true
            }
            Err(err) => {
                self.error = Some(AppError::remote(messages::DELETE_FAILED, &err));
                false
            }
        }
    }

    /// Deletes `article` and reloads on success.
    pub async fn delete(
        &mut self,
        store: &dyn ArticleStore,
        article: &Article,
        user: Option<&User>,
    ) -> Result<(), AppError> {
        let request = self.begin_delete(article, user)?;
        let result = store.delete_by_id(&request.id).await;
        if self.finish_delete(request.task, result) {
            self.load(store).await
        } else {
            self.error.clone().map_or(Ok(()), Err)
        }
    }

    // ---- share ----

    /// Builds the link for `article` and clears stale feedback. The caller
    /// copies it and reports back through [`Self::finish_share`].
    pub fn begin_share(&mut self, article: &Article, origin: &str) -> Result<String, AppError> {
        self.notice = None;
        match share_link(origin, &article.id) {
            Ok(link) => Ok(link.to_string()),
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "Invalid share origin");
                let err = AppError::new(AppErrorKind::Clipboard, messages::COPY_FAILED);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Records the clipboard result as user feedback.
    pub fn finish_share(&mut self, result: anyhow::Result<()>) -> Result<(), AppError> {
        match result {
            Ok(()) => {
                self.notice = Some(messages::LINK_COPIED.to_string());
                self.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "Failed to copy link");
                let err = AppError::new(AppErrorKind::Clipboard, messages::COPY_FAILED);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Copies the article's link to the clipboard and returns it.
    pub fn share(
        &mut self,
        article: &Article,
        origin: &str,
        clipboard: &dyn Clipboard,
    ) -> Result<String, AppError> {
        let link = self.begin_share(article, origin)?;
        self.finish_share(clipboard.copy_text(&link))?;
        Ok(link)
    }
}
