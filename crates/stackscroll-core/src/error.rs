//! User-facing failures.
//!
//! Every failure that reaches a screen is an [`AppError`]: a kind plus a short
//! message safe to display. Raw store detail never ends up in `message`; the
//! constructors that wrap a [`StoreError`] log it through `tracing` instead.

use std::fmt;

use crate::store::{StoreError, StoreErrorKind};

/// Message catalog shown to users.
pub mod messages {
    pub const EMAIL_NOT_CONFIRMED: &str =
        "Please check your email to verify your account before signing in.";
    pub const INVALID_CREDENTIALS: &str =
        "Invalid email or password. Please try again or sign up for a new account.";
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long";
    pub const EMAIL_REQUIRED: &str = "Please enter your email address.";
    pub const SIGN_UP_PENDING: &str = "Account created! Please check your email for verification.";
    pub const SIGN_UP_FAILED: &str = "Could not create the account. Please try again.";
    pub const SIGN_IN_UNREACHABLE: &str = "Could not reach the server. Please try again.";
    pub const SIGN_OUT_FAILED: &str = "Signed out locally, but the server could not be reached.";
    pub const ARTICLE_FIELDS_REQUIRED: &str = "Please fill in both the title and the content.";
    pub const SIGN_IN_REQUIRED: &str = "Please sign in to continue.";
    pub const PUBLISH_FAILED: &str = "Could not publish the article. Please try again.";
    pub const LOAD_FAILED: &str = "Could not load articles. Please try again.";
    pub const DELETE_FAILED: &str = "Could not delete the article. Please try again.";
    pub const DELETE_NOT_AUTHOR: &str = "You can only delete your own articles.";
    pub const SESSION_UNAVAILABLE: &str = "Could not restore your session.";
    pub const LINK_COPIED: &str = "Link copied to clipboard!";
    pub const COPY_FAILED: &str = "Could not copy the link to the clipboard.";
    pub const DELETE_CONFIRM: &str = "Are you sure you want to delete this post?";
    pub const EMPTY_LISTING: &str = "No articles yet. Be the first to write one!";
}

const TOO_MANY_REQUESTS: u16 = 429;

/// Why a sign-in was rejected by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// Account exists but the email was never verified.
    EmailNotConfirmed,
    /// Anything else. Deliberately vague to avoid account enumeration.
    InvalidCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppErrorKind {
    /// Detected locally; the store was never called.
    Validation,
    AuthRejected(AuthRejection),
    /// Any other store failure (network, server error).
    RemoteFailure,
    /// Mutation attempted by someone other than the author, or without a session.
    AuthorizationDenied,
    /// Clipboard write failed.
    Clipboard,
}

impl fmt::Display for AppErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppErrorKind::Validation => write!(f, "validation"),
            AppErrorKind::AuthRejected(AuthRejection::EmailNotConfirmed) => {
                write!(f, "auth_rejected(email_not_confirmed)")
            }
            AppErrorKind::AuthRejected(AuthRejection::InvalidCredentials) => {
                write!(f, "auth_rejected(invalid_credentials)")
            }
            AppErrorKind::RemoteFailure => write!(f, "remote_failure"),
            AppErrorKind::AuthorizationDenied => write!(f, "authorization_denied"),
            AppErrorKind::Clipboard => write!(f, "clipboard"),
        }
    }
}

/// A failure with a message fit for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: AppErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Validation, message)
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::AuthorizationDenied, message)
    }

    /// Wraps a store failure behind a generic message, logging the detail.
    pub fn remote(message: &str, err: &StoreError) -> Self {
        tracing::error!(
            kind = %err.kind,
            status = ?err.status,
            code = ?err.code,
            details = ?err.details,
            "{} ({})",
            message,
            err.message
        );
        let kind = if err.kind == StoreErrorKind::NoSession {
            AppErrorKind::AuthorizationDenied
        } else {
            AppErrorKind::RemoteFailure
        };
        let message = if kind == AppErrorKind::AuthorizationDenied {
            messages::SIGN_IN_REQUIRED
        } else {
            message
        };
        Self::new(kind, message)
    }

    /// Classifies a sign-in failure.
    ///
    /// Unverified email gets its own actionable message. Transport errors,
    /// server errors and rate limiting (429) are remote failures. Every other rejection maps to the same
    /// invalid-credentials text, whatever the store said.
    pub fn sign_in_rejected(err: &StoreError) -> Self {
        if err.is_email_not_confirmed() {
            tracing::info!("Sign-in rejected: email not confirmed");
            return Self::new(
                AppErrorKind::AuthRejected(AuthRejection::EmailNotConfirmed),
                messages::EMAIL_NOT_CONFIRMED,
            );
        }

        let not_credentials = err.kind == StoreErrorKind::Network
            || err
                .status
                .is_some_and(|status| status == TOO_MANY_REQUESTS || status >= 500);
        if not_credentials {
            return Self::remote(messages::SIGN_IN_UNREACHABLE, err);
        }

        tracing::info!(status = ?err.status, code = ?err.code, "Sign-in rejected");
        Self::new(
            AppErrorKind::AuthRejected(AuthRejection::InvalidCredentials),
            messages::INVALID_CREDENTIALS,
        )
    }

    pub fn is_validation(&self) -> bool {
        self.kind == AppErrorKind::Validation
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

/// Checks the password policy shared by sign-in and sign-up.
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 6 {
        return Err(AppError::validation(messages::PASSWORD_TOO_SHORT));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_not_confirmed_gets_reminder() {
        let err = StoreError::http_status(400, r#"{"msg":"Email not confirmed"}"#);
        let app = AppError::sign_in_rejected(&err);
        assert_eq!(
            app.kind,
            AppErrorKind::AuthRejected(AuthRejection::EmailNotConfirmed)
        );
        assert_eq!(app.message, messages::EMAIL_NOT_CONFIRMED);
    }

    #[test]
    fn test_other_rejections_hide_store_message() {
        let err = StoreError::http_status(
            400,
            r#"{"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        );
        let app = AppError::sign_in_rejected(&err);
        assert_eq!(app.message, messages::INVALID_CREDENTIALS);
        assert!(!app.message.contains("Invalid login credentials"));
    }

    #[test]
    fn test_server_errors_are_remote_failures() {
        let err = StoreError::http_status(503, "");
        let app = AppError::sign_in_rejected(&err);
        assert_eq!(app.kind, AppErrorKind::RemoteFailure);
    }

    #[test]
    fn test_rate_limit_is_not_reported_as_bad_credentials() {
        let err = StoreError::http_status(
            429,
            r#"{"error_code":"over_request_rate_limit","msg":"Request rate limit reached"}"#,
        );
        let app = AppError::sign_in_rejected(&err);
        assert_eq!(app.kind, AppErrorKind::RemoteFailure);
        assert_eq!(app.message, messages::SIGN_IN_UNREACHABLE);
    }

    #[test]
    fn test_remote_without_session_is_denied() {
        let app = AppError::remote(messages::PUBLISH_FAILED, &StoreError::no_session());
        assert_eq!(app.kind, AppErrorKind::AuthorizationDenied);
        assert_eq!(app.message, messages::SIGN_IN_REQUIRED);
    }

    #[test]
    fn test_password_policy_counts_characters() {
        assert!(validate_password("12345").unwrap_err().is_validation());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("ééééé").is_err());
    }
}
