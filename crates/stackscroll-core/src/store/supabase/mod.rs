//! Hosted backend client (Supabase).
//!
//! Auth goes through GoTrue under `/auth/v1` and rows through PostgREST under
//! `/rest/v1`. Every request carries the project's anon key as `apikey`.
//! `Authorization` carries the user's access token when signed in and the
//! anon key otherwise.
//!
//! The session is restored lazily from [`SessionCache`] on first use and
//! refreshed when it is about to expire.

mod auth;
mod rest;
mod session_cache;

use std::path::PathBuf;

use anyhow::Result;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
pub use session_cache::SessionCache;
use tokio::sync::Mutex;

use self::auth::SignUpResponse;
use super::{
    ArticleStore, AuthBackend, AuthEvent, AuthListener, AuthListeners, ListOrder, SignUpOutcome,
    StoreError, StoreErrorKind, StoreResult, Subscription,
};
use crate::config::{BackendSettings, Config, paths};
use crate::models::{Article, ArticleId, NewArticle, Session};

/// Refresh when the access token expires within this many seconds.
const REFRESH_LEEWAY_SECS: i64 = 60;

#[derive(Debug, Default)]
struct SessionSlot {
    restored: bool,
    session: Option<Session>,
}

/// Client for the hosted auth and article services.
pub struct SupabaseClient {
    settings: BackendSettings,
    http: reqwest::Client,
    cache: SessionCache,
    slot: Mutex<SessionSlot>,
    listeners: AuthListeners,
}

impl SupabaseClient {
    pub fn new(settings: BackendSettings, session_path: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
            cache: SessionCache::new(session_path),
            slot: Mutex::new(SessionSlot::default()),
            listeners: AuthListeners::new(),
        }
    }

    /// Builds a client from loaded config, persisting the session under the
    /// stackscroll home.
    ///
    /// # Errors
    /// Returns an error if the backend URL or anon key is not configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.backend_settings()?, paths::session_path()))
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    async fn current_session(&self) -> StoreResult<Option<Session>> {
        let mut slot = self.slot.lock().await;
        if !slot.restored {
            slot.restored = true;
            slot.session = match self.cache.load() {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!(error = %format!("{e:#}"), "Ignoring unreadable session file");
                    None
                }
            };
        }

        let Some(session) = slot.session.clone() else {
            return Ok(None);
        };
        if !session.expires_within(REFRESH_LEEWAY_SECS) {
            return Ok(Some(session));
        }

        tracing::debug!(user = %session.user.id, "Refreshing session");
        match auth::refresh(&self.http, &self.settings, &session.refresh_token).await {
            Ok(fresh) => {
                slot.session = Some(fresh.clone());
                self.persist(Some(&fresh));
                drop(slot);
                self.listeners
                    .notify(AuthEvent::TokenRefreshed, Some(&fresh));
                Ok(Some(fresh))
            }
            Err(err) if err.kind == StoreErrorKind::HttpStatus => {
                tracing::info!(status = ?err.status, "Session refresh rejected; signing out");
                slot.session = None;
                self.persist(None);
                drop(slot);
                self.listeners.notify(AuthEvent::SignedOut, None);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn store_session(&self, session: &Session) {
        let mut slot = self.slot.lock().await;
        slot.restored = true;
        slot.session = Some(session.clone());
        self.persist(Some(session));
        drop(slot);
        self.listeners.notify(AuthEvent::SignedIn, Some(session));
    }

    fn persist(&self, session: Option<&Session>) {
        let result = match session {
            Some(session) => self.cache.save(session),
            None => self.cache.clear(),
        };
        if let Err(e) = result {
            tracing::warn!(
                error = %format!("{e:#}"),
                path = %self.cache.path().display(),
                "Failed to persist session"
            );
        }
    }

    /// Token for row requests: the user's when signed in, the anon key otherwise.
    async fn bearer(&self) -> String {
        match self.current_session().await {
            Ok(Some(session)) => session.access_token,
            Ok(None) => self.settings.anon_key.clone(),
            Err(err) => {
                tracing::warn!(%err, "Session unavailable; using anonymous access");
                self.settings.anon_key.clone()
            }
        }
    }

    async fn require_access_token(&self) -> StoreResult<String> {
        self.current_session()
            .await?
            .map(|session| session.access_token)
            .ok_or_else(StoreError::no_session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let session = auth::sign_in_with_password(&self.http, &self.settings, email, password)
            .await?;
        tracing::info!(user = %session.user.id, "Signed in");
        self.store_session(&session).await;
        Ok(session)
    }

    async fn register(&self, email: &str, password: &str) -> StoreResult<SignUpOutcome> {
        match auth::sign_up(&self.http, &self.settings, email, password).await? {
            SignUpResponse::SignedIn(session) => {
                tracing::info!(user = %session.user.id, "Signed up and signed in");
                let user_id = Some(session.user.id.clone());
                self.store_session(&session).await;
                Ok(SignUpOutcome {
                    user_id,
                    confirmation_required: false,
                })
            }
            SignUpResponse::Pending(user_id) => {
                tracing::info!("Signed up; email confirmation pending");
                Ok(SignUpOutcome {
                    user_id,
                    confirmation_required: true,
                })
            }
        }
    }

    async fn end_session(&self) -> StoreResult<()> {
        let mut slot = self.slot.lock().await;
        let previous = if slot.restored {
            slot.session.take()
        } else {
            self.cache.load().ok().flatten()
        };
        slot.restored = true;
        slot.session = None;
        self.persist(None);
        drop(slot);

        let result = match &previous {
            Some(session) => auth::logout(&self.http, &self.settings, &session.access_token).await,
            None => Ok(()),
        };
        if let Err(err) = &result {
            tracing::warn!(%err, "Remote sign-out failed; local session cleared");
        }
        self.listeners.notify(AuthEvent::SignedOut, None);
        result
    }
}

/// Reads a response body as JSON, mapping non-success statuses to
/// [`StoreError::http_status`].
async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> StoreResult<T> {
    let status = response.status();
    let body = response.text().await.map_err(|e| StoreError::network(&e))?;
    if !status.is_success() {
        return Err(StoreError::http_status(status.as_u16(), &body));
    }
    serde_json::from_str(&body).map_err(|e| StoreError::parse(what, e))
}

impl AuthBackend for SupabaseClient {
    fn get_session(&self) -> BoxFuture<'_, StoreResult<Option<Session>>> {
        Box::pin(self.current_session())
    }

    fn on_session_change(&self, listener: AuthListener) -> Subscription {
        self.listeners.subscribe(listener)
    }

    fn sign_in_with_password<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, StoreResult<Session>> {
        Box::pin(self.sign_in(email, password))
    }

    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, StoreResult<SignUpOutcome>> {
        Box::pin(self.register(email, password))
    }

    fn sign_out(&self) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(self.end_session())
    }
}

impl ArticleStore for SupabaseClient {
    fn list_all(&self, order: ListOrder) -> BoxFuture<'_, StoreResult<Vec<Article>>> {
        Box::pin(async move {
            let bearer = self.bearer().await;
            rest::select_all(&self.http, &self.settings, &bearer, order).await
        })
    }

    fn insert<'a>(&'a self, draft: &'a NewArticle) -> BoxFuture<'a, StoreResult<Article>> {
        Box::pin(async move {
            let token = self.require_access_token().await?;
            rest::insert(&self.http, &self.settings, &token, draft).await
        })
    }

    fn delete_by_id<'a>(&'a self, id: &'a ArticleId) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let token = self.require_access_token().await?;
            rest::delete(&self.http, &self.settings, &token, id).await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::{User, UserId};

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(server: &MockServer, home: &TempDir) -> SupabaseClient {
        let settings = BackendSettings {
            url: server.uri(),
            anon_key: "anon".to_string(),
            table: "posts".to_string(),
        };
        SupabaseClient::new(settings, home.path().join("session.json"))
    }

    fn token_body(access: &str, expires_in: i64) -> serde_json::Value {
        json!({
            "access_token": access,
            "token_type": "bearer",
            "expires_in": expires_in,
            "refresh_token": "refresh-1",
            "user": { "id": "u-1", "email": "a@b.com", "aud": "authenticated" }
        })
    }

    fn stored_session(home: &TempDir, expires_at: i64) {
        let session = Session {
            access_token: "old-access".to_string(),
            refresh_token: "old-refresh".to_string(),
            expires_at,
            user: User {
                id: UserId::from("u-1"),
                email: Some("a@b.com".to_string()),
            },
        };
        SessionCache::new(home.path().join("session.json"))
            .save(&session)
            .unwrap();
    }

    fn record_events(client: &SupabaseClient) -> (Arc<StdMutex<Vec<AuthEvent>>>, Subscription) {
        let events = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let sub = client.on_session_change(Arc::new(move |event, _| {
            sink.lock().unwrap().push(event);
        }));
        (events, sub)
    }

    #[tokio::test]
    async fn test_sign_in_persists_session_and_notifies() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon"))
            .and(body_json(json!({ "email": "a@b.com", "password": "secret1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-1", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, &home);
        let (events, _sub) = record_events(&client);

        let session = client
            .sign_in_with_password("a@b.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.user.id, UserId::from("u-1"));
        assert_eq!(*events.lock().unwrap(), vec![AuthEvent::SignedIn]);

        let restored = SessionCache::new(home.path().join("session.json"))
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(restored.access_token, "access-1");
    }

    #[tokio::test]
    async fn test_sign_in_rejection_keeps_error_code() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 400,
                "error_code": "email_not_confirmed",
                "msg": "Email not confirmed"
            })))
            .mount(&server)
            .await;

        let err = client(&server, &home)
            .sign_in_with_password("a@b.com", "secret1")
            .await
            .unwrap_err();
        assert!(err.is_email_not_confirmed());
        assert_eq!(err.status, Some(400));
    }

    #[tokio::test]
    async fn test_sign_up_without_session_requires_confirmation() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-9",
                "email": "new@b.com",
                "confirmation_sent_at": "2024-05-01T10:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = client(&server, &home);
        let outcome = client.sign_up("new@b.com", "secret1").await.unwrap();
        assert!(outcome.confirmation_required);
        assert_eq!(outcome.user_id, Some(UserId::from("u-9")));
        assert!(client.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_uses_anon_key_when_signed_out() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .and(query_param("select", "*"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 2,
                    "title": "Second",
                    "content": "b",
                    "user_id": "u-1",
                    "created_at": "2024-05-02T10:00:00+00:00"
                },
                {
                    "id": 1,
                    "title": "First",
                    "content": "a",
                    "user_id": "u-2",
                    "created_at": "2024-05-01T10:00:00+00:00"
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client(&server, &home)
            .list_all(ListOrder::NEWEST_FIRST)
            .await
            .unwrap();
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_insert_sends_user_token_and_returns_row() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();
        stored_session(&home, Utc::now().timestamp() + 3600);

        Mock::given(method("POST"))
            .and(path("/rest/v1/posts"))
            .and(header("authorization", "Bearer old-access"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!([
                { "title": "T", "content": "B", "user_id": "u-1" }
            ])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 7,
                "title": "T",
                "content": "B",
                "user_id": "u-1",
                "created_at": "2024-05-01T10:00:00+00:00"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let draft = NewArticle {
            title: "T".to_string(),
            body: "B".to_string(),
            author_id: UserId::from("u-1"),
        };
        let article = client(&server, &home).insert(&draft).await.unwrap();
        assert_eq!(article.id, ArticleId::from("7"));
    }

    #[tokio::test]
    async fn test_insert_without_session_is_rejected_locally() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();

        let draft = NewArticle {
            title: "T".to_string(),
            body: "B".to_string(),
            author_id: UserId::from("u-1"),
        };
        let err = client(&server, &home).insert(&draft).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NoSession);
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_delete_with_no_affected_rows_is_not_found() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();
        stored_session(&home, Utc::now().timestamp() + 3600);

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/posts"))
            .and(query_param("id", "eq.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = client(&server, &home)
            .delete_by_id(&ArticleId::from("5"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_expired_session_is_refreshed() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();
        stored_session(&home, Utc::now().timestamp() - 10);

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(json!({ "refresh_token": "old-refresh" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("new-access", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, &home);
        let (events, _sub) = record_events(&client);

        let session = client.get_session().await.unwrap().unwrap();
        assert_eq!(session.access_token, "new-access");
        assert_eq!(*events.lock().unwrap(), vec![AuthEvent::TokenRefreshed]);

        // Fresh token is cached; no second refresh.
        client.get_session().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_refresh_signs_out() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();
        stored_session(&home, Utc::now().timestamp() - 10);

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error_code": "refresh_token_not_found",
                "msg": "Invalid Refresh Token: Refresh Token Not Found"
            })))
            .mount(&server)
            .await;

        let client = client(&server, &home);
        let (events, _sub) = record_events(&client);

        assert!(client.get_session().await.unwrap().is_none());
        assert_eq!(*events.lock().unwrap(), vec![AuthEvent::SignedOut]);
        assert!(!home.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn test_sign_out_clears_locally_when_remote_fails() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();
        stored_session(&home, Utc::now().timestamp() + 3600);

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer old-access"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, &home);
        let (events, _sub) = record_events(&client);

        let err = client.sign_out().await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert!(client.get_session().await.unwrap().is_none());
        assert_eq!(*events.lock().unwrap(), vec![AuthEvent::SignedOut]);
        assert!(!home.path().join("session.json").exists());
    }
}
