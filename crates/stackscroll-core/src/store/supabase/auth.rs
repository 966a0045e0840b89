//! GoTrue requests under `/auth/v1`.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use super::read_json;
use crate::config::BackendSettings;
use crate::models::{Session, User, UserId};
use crate::store::{StoreError, StoreResult};

/// Access token lifetime assumed when the response omits both expiry fields.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self.expires_at.unwrap_or_else(|| {
            Utc::now().timestamp() + self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS)
        });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Result of a sign-up call.
#[derive(Debug)]
pub(super) enum SignUpResponse {
    /// Project auto-confirms accounts; the user is signed in.
    SignedIn(Session),
    /// Account created but must be verified by email first.
    Pending(Option<UserId>),
}

fn endpoint(settings: &BackendSettings, path: &str) -> String {
    format!("{}/auth/v1/{path}", settings.url)
}

fn post(
    http: &reqwest::Client,
    settings: &BackendSettings,
    path: &str,
    bearer: &str,
) -> reqwest::RequestBuilder {
    http.post(endpoint(settings, path))
        .header("apikey", &settings.anon_key)
        .bearer_auth(bearer)
}

async fn token_grant(
    http: &reqwest::Client,
    settings: &BackendSettings,
    grant_type: &str,
    body: Value,
) -> StoreResult<Session> {
    let response = post(http, settings, "token", &settings.anon_key)
        .query(&[("grant_type", grant_type)])
        .json(&body)
        .send()
        .await
        .map_err(|e| StoreError::network(&e))?;

    read_json::<TokenResponse>(response, "token")
        .await
        .map(TokenResponse::into_session)
}

pub(super) async fn sign_in_with_password(
    http: &reqwest::Client,
    settings: &BackendSettings,
    email: &str,
    password: &str,
) -> StoreResult<Session> {
    token_grant(
        http,
        settings,
        "password",
        json!({ "email": email, "password": password }),
    )
    .await
}

pub(super) async fn refresh(
    http: &reqwest::Client,
    settings: &BackendSettings,
    refresh_token: &str,
) -> StoreResult<Session> {
    token_grant(
        http,
        settings,
        "refresh_token",
        json!({ "refresh_token": refresh_token }),
    )
    .await
}

pub(super) async fn sign_up(
    http: &reqwest::Client,
    settings: &BackendSettings,
    email: &str,
    password: &str,
) -> StoreResult<SignUpResponse> {
    let response = post(http, settings, "signup", &settings.anon_key)
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .map_err(|e| StoreError::network(&e))?;

    let value: Value = read_json(response, "sign-up").await?;

    // A session comes back only when the project skips email confirmation;
    // otherwise the body is the bare user record.
    if value.get("access_token").is_some() {
        let token: TokenResponse =
            serde_json::from_value(value).map_err(|e| StoreError::parse("sign-up", e))?;
        return Ok(SignUpResponse::SignedIn(token.into_session()));
    }

    let user = value.get("user").unwrap_or(&value);
    let user_id = user
        .get("id")
        .and_then(Value::as_str)
        .map(UserId::from);
    Ok(SignUpResponse::Pending(user_id))
}

/// Revokes the session's refresh token server-side.
pub(super) async fn logout(
    http: &reqwest::Client,
    settings: &BackendSettings,
    access_token: &str,
) -> StoreResult<()> {
    let response = post(http, settings, "logout", access_token)
        .send()
        .await
        .map_err(|e| StoreError::network(&e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::http_status(status.as_u16(), &body))
}
