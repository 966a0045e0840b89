//! Compose screen: draft and publish a new article.

use crate::error::{AppError, messages};
use crate::models::{Article, NewArticle, User};
use crate::store::{ArticleStore, StoreResult};
use crate::task::{TaskId, TaskSeq, TaskState};

/// An insert the store should carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub task: TaskId,
    pub draft: NewArticle,
}

#[derive(Debug, Default)]
pub struct ComposeViewModel {
    pub title: String,
    /// Markdown body.
    pub body: String,
    publish: TaskState,
    seq: TaskSeq,
    error: Option<AppError>,
}

impl ComposeViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_publishing(&self) -> bool {
        self.publish.is_running()
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Validates the draft and marks a publish as in flight.
    ///
    /// Returns `Ok(None)` while another publish is still running. Fails
    /// without a request when no one is signed in or a field is blank.
    pub fn begin_publish(
        &mut self,
        user: Option<&User>,
    ) -> Result<Option<PublishRequest>, AppError> {
        if self.publish.is_running() {
            tracing::debug!("Publish already in flight");
            return Ok(None);
        }

        let Some(user) = user else {
            let err = AppError::denied(messages::SIGN_IN_REQUIRED);
            self.error = Some(err.clone());
            return Err(err);
        };

        if self.title.trim().is_empty() || self.body.trim().is_empty() {
            let err = AppError::validation(messages::ARTICLE_FIELDS_REQUIRED);
            self.error = Some(err.clone());
            return Err(err);
        }

        let task = self.seq.next_id();
        self.publish.start(task);
        self.error = None;
        Ok(Some(PublishRequest {
            task,
            draft: NewArticle {
                title: self.title.clone(),
                body: self.body.clone(),
                author_id: user.id.clone(),
            },
        }))
    }

    /// Applies an insert result. Returns `None` if `task` is not the active
    /// publish.
    ///
    /// Success clears the draft. Failure keeps it so the user can retry.
    pub fn finish_publish(
        &mut self,
        task: TaskId,
        result: StoreResult<Article>,
    ) -> Option<Result<Article, AppError>> {
        if !self.publish.finish_if_active(task) {
            return None;
        }
        Some(match result {
            Ok(article) => {
                tracing::info!(article = %article.id, "Article published");
                self.title.clear();
                self.body.clear();
                self.error = None;
                Ok(article)
            }
            Err(err) => {
                let err = AppError::remote(messages::PUBLISH_FAILED, &err);
                self.error = Some(err.clone());
                Err(err)
            }
        })
    }

    /// Publishes the draft. `Ok(None)` means a publish was already running.
    pub async fn publish(
        &mut self,
        store: &dyn ArticleStore,
        user: Option<&User>,
    ) -> Result<Option<Article>, AppError> {
        let Some(request) = self.begin_publish(user)? else {
            return Ok(None);
        };
        let result = store.insert(&request.draft).await;
        self.finish_publish(request.task, result)
            .transpose()
    }
}
