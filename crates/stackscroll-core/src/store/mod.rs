//! Remote content store interfaces.
//!
//! Two surfaces, both served by the hosted backend:
//! - [`AuthBackend`]: sessions, sign-in/up/out and change notifications
//! - [`ArticleStore`]: list/insert/delete over the articles table
//!
//! Trait methods return boxed futures so the runtime can hold the store as
//! `Arc<dyn ...>` and move calls into spawned tasks.

pub mod listeners;
pub mod memory;
pub mod supabase;

use std::fmt;

use futures_util::future::BoxFuture;
pub use listeners::{AuthListener, AuthListeners, Subscription};
use serde_json::Value;

use crate::models::{Article, ArticleId, NewArticle, Session, UserId};

/// Categories of store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Request never produced a response (DNS, TLS, connection reset).
    Network,
    /// Non-success HTTP status.
    HttpStatus,
    /// Response body did not match the expected shape.
    Parse,
    /// Operation needs a signed-in session and there is none.
    NoSession,
    /// The store accepted the request but changed nothing (row missing or
    /// filtered out by row-level security).
    NotFound,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErrorKind::Network => write!(f, "network"),
            StoreErrorKind::HttpStatus => write!(f, "http_status"),
            StoreErrorKind::Parse => write!(f, "parse"),
            StoreErrorKind::NoSession => write!(f, "no_session"),
            StoreErrorKind::NotFound => write!(f, "not_found"),
        }
    }
}

/// Structured error returned by the store.
///
/// `message` is the backend's own wording (for classification and logs);
/// it is not meant to be shown to users verbatim.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
    /// Machine-readable error code when the backend provides one.
    pub code: Option<String>,
    pub status: Option<u16>,
    /// Raw response body or transport detail.
    pub details: Option<String>,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            status: None,
            details: None,
        }
    }

    pub fn network(err: &reqwest::Error) -> Self {
        Self {
            details: Some(err.to_string()),
            ..Self::new(StoreErrorKind::Network, "Request failed")
        }
    }

    pub fn parse(what: &str, err: impl fmt::Display) -> Self {
        Self {
            details: Some(err.to_string()),
            ..Self::new(StoreErrorKind::Parse, format!("Unexpected {what} response"))
        }
    }

    pub fn no_session() -> Self {
        Self::new(StoreErrorKind::NoSession, "Not signed in")
    }

    /// Creates an HTTP status error, pulling the message and code out of
    /// the backend's JSON error body when present.
    ///
    /// Handles both auth-style (`msg`/`error_description`/`error_code`) and
    /// table-style (`message`/`code`) bodies.
    pub fn http_status(status: u16, body: &str) -> Self {
        let mut err = Self {
            status: Some(status),
            details: (!body.is_empty()).then(|| body.to_string()),
            ..Self::new(StoreErrorKind::HttpStatus, format!("HTTP {status}"))
        };

        if let Ok(json) = serde_json::from_str::<Value>(body) {
            let text = |key: &str| json.get(key).and_then(Value::as_str).map(str::to_string);
            if let Some(msg) = text("msg")
                .or_else(|| text("error_description"))
                .or_else(|| text("message"))
                .or_else(|| text("error"))
            {
                err.message = msg;
            }
            err.code = text("error_code").or_else(|| text("code"));
        }
        err
    }

    /// Returns true if this is a sign-in rejection for an unverified email.
    pub fn is_email_not_confirmed(&self) -> bool {
        self.code.as_deref() == Some("email_not_confirmed")
            || self.message.contains("Email not confirmed")
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Auth state transitions broadcast to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// What a successful sign-up produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user_id: Option<UserId>,
    /// True when the account must be verified by email before sign-in.
    pub confirmation_required: bool,
}

/// Sort direction for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Listing order: always by creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrder {
    pub created_at: SortDirection,
}

impl ListOrder {
    pub const NEWEST_FIRST: Self = Self {
        created_at: SortDirection::Descending,
    };
}

/// Session/identity surface of the hosted backend.
pub trait AuthBackend: Send + Sync {
    /// Returns the current session (restoring or refreshing it as needed).
    fn get_session(&self) -> BoxFuture<'_, StoreResult<Option<Session>>>;

    /// Registers a listener called on every later auth event.
    fn on_session_change(&self, listener: AuthListener) -> Subscription;

    fn sign_in_with_password<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, StoreResult<Session>>;

    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, StoreResult<SignUpOutcome>>;

    /// Ends the session remotely. Implementations drop their local copy even
    /// when the remote call fails.
    fn sign_out(&self) -> BoxFuture<'_, StoreResult<()>>;
}

/// Article collection surface of the hosted backend.
pub trait ArticleStore: Send + Sync {
    fn list_all(&self, order: ListOrder) -> BoxFuture<'_, StoreResult<Vec<Article>>>;

    fn insert<'a>(&'a self, draft: &'a NewArticle) -> BoxFuture<'a, StoreResult<Article>>;

    fn delete_by_id<'a>(&'a self, id: &'a ArticleId) -> BoxFuture<'a, StoreResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_reads_auth_error_body() {
        let err = StoreError::http_status(
            400,
            r#"{"code":400,"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#,
        );
        assert_eq!(err.kind, StoreErrorKind::HttpStatus);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "Email not confirmed");
        assert!(err.is_email_not_confirmed());
    }

    #[test]
    fn test_http_status_reads_legacy_grant_error() {
        let err = StoreError::http_status(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err.message, "Invalid login credentials");
        assert!(!err.is_email_not_confirmed());
    }

    #[test]
    fn test_http_status_non_json_body() {
        let err = StoreError::http_status(502, "Bad Gateway");
        assert_eq!(err.message, "HTTP 502");
        assert_eq!(err.details.as_deref(), Some("Bad Gateway"));
        assert!(err.code.is_none());
    }
}
