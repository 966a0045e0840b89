//! Effect handlers for the TUI runtime.
//!
//! Handlers perform I/O and return the `UiEvent` carrying the result. They
//! never touch `AppState`; the runtime spawns them and sends the result to
//! the inbox.

use std::sync::Arc;

use stackscroll_core::session::SessionManager;
use stackscroll_core::share::Clipboard;
use stackscroll_core::store::{ArticleStore, ListOrder};
use stackscroll_core::task::TaskId;
use stackscroll_core::viewmodel::{self, AuthRequest, DeleteRequest, PublishRequest};

use crate::events::UiEvent;

pub async fn initialize_session(session: Arc<SessionManager>) -> UiEvent {
    let result = session.initialize().await;
    UiEvent::SessionReady {
        user: session.current_user(),
        result,
    }
}

pub async fn load_articles(store: Arc<dyn ArticleStore>, task: TaskId) -> UiEvent {
    let result = store.list_all(ListOrder::NEWEST_FIRST).await;
    UiEvent::ListingLoaded { task, result }
}

pub async fn delete_article(store: Arc<dyn ArticleStore>, request: DeleteRequest) -> UiEvent {
    let result = store.delete_by_id(&request.id).await;
    UiEvent::ArticleDeleted {
        task: request.task,
        result,
    }
}

pub async fn publish(store: Arc<dyn ArticleStore>, request: PublishRequest) -> UiEvent {
    let result = store.insert(&request.draft).await;
    UiEvent::Published {
        task: request.task,
        result,
    }
}

pub async fn submit_auth(session: Arc<SessionManager>, request: AuthRequest) -> UiEvent {
    let result = viewmodel::auth::run(&session, &request).await;
    UiEvent::AuthFinished {
        task: request.task,
        mode: request.mode,
        user: session.current_user(),
        result,
    }
}

pub async fn sign_out(session: Arc<SessionManager>) -> UiEvent {
    let result = session.sign_out().await;
    UiEvent::SignedOut { result }
}

/// Runs on the UI thread: OSC 52 must be written to the terminal we own.
pub fn copy_to_clipboard(clipboard: &dyn Clipboard, text: &str) -> UiEvent {
    UiEvent::LinkCopied {
        result: clipboard.copy_text(text),
    }
}

#[cfg(test)]
mod tests {
    use stackscroll_core::models::{NewArticle, UserId};
    use stackscroll_core::share::MemoryClipboard;
    use stackscroll_core::store::AuthBackend;
    use stackscroll_core::store::memory::{MemoryStore, Op, article};
    use stackscroll_core::viewmodel::AuthMode;

    use super::*;

    #[tokio::test]
    async fn test_load_articles_reports_newest_first() {
        let store = Arc::new(MemoryStore::new().with_articles(vec![
            article(1, "Old", "a", "u-1"),
            article(2, "New", "b", "u-1"),
        ]));
        let event = load_articles(store, TaskId(4)).await;
        let UiEvent::ListingLoaded { task, result } = event else {
            panic!("unexpected event: {event:?}");
        };
        assert_eq!(task, TaskId(4));
        let titles: Vec<_> = result.unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn test_submit_auth_reports_identity_after_sign_in() {
        let store = Arc::new(MemoryStore::new().with_user("writer@example.com", "hunter22"));
        let session = Arc::new(SessionManager::new(Arc::clone(&store) as Arc<dyn AuthBackend>));
        let request = AuthRequest {
            task: TaskId(1),
            mode: AuthMode::SignIn,
            email: "writer@example.com".to_string(),
            password: "hunter22".to_string(),
        };

        let event = submit_auth(session, request).await;
        let UiEvent::AuthFinished { user, result, .. } = event else {
            panic!("unexpected event: {event:?}");
        };
        assert!(result.is_ok());
        assert_eq!(user.and_then(|u| u.email).as_deref(), Some("writer@example.com"));
        assert_eq!(store.calls(Op::SignIn), 1);
    }

    #[tokio::test]
    async fn test_publish_without_session_fails_in_store() {
        let store = Arc::new(MemoryStore::new());
        let request = PublishRequest {
            task: TaskId(2),
            draft: NewArticle {
                title: "T".to_string(),
                body: "B".to_string(),
                author_id: UserId::from("u-1"),
            },
        };
        let event = publish(store, request).await;
        assert!(matches!(event, UiEvent::Published { result: Err(_), .. }));
    }

    #[test]
    fn test_copy_reports_clipboard_result() {
        let clipboard = MemoryClipboard::new();
        let event = copy_to_clipboard(&clipboard, "http://x/blog/1");
        assert!(matches!(event, UiEvent::LinkCopied { result: Ok(()) }));
        assert_eq!(clipboard.last().as_deref(), Some("http://x/blog/1"));

        let event = copy_to_clipboard(&MemoryClipboard::broken(), "x");
        assert!(matches!(event, UiEvent::LinkCopied { result: Err(_) }));
    }
}
