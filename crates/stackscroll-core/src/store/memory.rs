//! In-memory store.
//!
//! Implements both store surfaces against process-local state, with the same
//! row rules the hosted table enforces (inserts must carry the signed-in
//! user's id, deletes only touch the caller's own rows). Every call is
//! counted and any operation can be told to fail once, which makes it the
//! spy used by view-model and UI tests.

use std::collections::HashMap;
use std::future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures_util::future::BoxFuture;

use super::{
    ArticleStore, AuthBackend, AuthEvent, AuthListener, AuthListeners, ListOrder, SignUpOutcome,
    SortDirection, StoreError, StoreErrorKind, StoreResult, Subscription,
};
use crate::models::{Article, ArticleId, NewArticle, Session, User, UserId};

/// Store operations, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetSession,
    SignIn,
    SignUp,
    SignOut,
    List,
    Insert,
    Delete,
}

const OPS: usize = 7;

impl Op {
    fn index(self) -> usize {
        match self {
            Op::GetSession => 0,
            Op::SignIn => 1,
            Op::SignUp => 2,
            Op::SignOut => 3,
            Op::List => 4,
            Op::Insert => 5,
            Op::Delete => 6,
        }
    }
}

#[derive(Debug, Clone)]
struct Account {
    id: UserId,
    password: String,
    confirmed: bool,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    session: Option<Session>,
    articles: Vec<Article>,
    next_article: u64,
    next_user: u64,
    failures: HashMap<Op, StoreError>,
}

/// Process-local implementation of [`AuthBackend`] and [`ArticleStore`].
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    listeners: AuthListeners,
    calls: [AtomicUsize; OPS],
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a verified account.
    #[must_use]
    pub fn with_user(self, email: &str, password: &str) -> Self {
        {
            let mut state = self.lock();
            let id = next_user_id(&mut state);
            state.accounts.insert(
                email.to_string(),
                Account {
                    id,
                    password: password.to_string(),
                    confirmed: true,
                },
            );
        }
        self
    }

    /// Seeds articles as if they were already in the table.
    #[must_use]
    pub fn with_articles(self, articles: impl IntoIterator<Item = Article>) -> Self {
        {
            let mut state = self.lock();
            for article in articles {
                if let Ok(n) = article.id.0.parse::<u64>() {
                    state.next_article = state.next_article.max(n);
                }
                state.articles.push(article);
            }
        }
        self
    }

    /// Starts with `session` already live, as if restored from disk.
    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        self.lock().session = Some(session);
        self
    }

    /// Marks a pending sign-up as verified.
    pub fn confirm_email(&self, email: &str) {
        if let Some(account) = self.lock().accounts.get_mut(email) {
            account.confirmed = true;
        }
    }

    /// Makes the next call of `op` fail with `err`.
    pub fn fail_next(&self, op: Op, err: StoreError) {
        self.lock().failures.insert(op, err);
    }

    /// Number of times `op` has been invoked.
    pub fn calls(&self, op: Op) -> usize {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    /// Snapshot of stored articles in insertion order.
    pub fn articles(&self) -> Vec<Article> {
        self.lock().articles.clone()
    }

    /// Number of live auth listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Simulates a backend-initiated auth event (e.g. a background refresh).
    pub fn emit(&self, event: AuthEvent) {
        let session = self.lock().session.clone();
        self.listeners.notify(event, session.as_ref());
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts the call and returns an injected failure, if any.
    fn enter(&self, op: Op) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        match state.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }

    fn sign_in_now(&self, email: &str, password: &str) -> StoreResult<Session> {
        let session = {
            let mut state = self.enter(Op::SignIn)?;
            let account = state
                .accounts
                .get(email)
                .filter(|account| account.password == password)
                .cloned()
                .ok_or_else(|| {
                    StoreError::http_status(
                        400,
                        r#"{"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
                    )
                })?;
            if !account.confirmed {
                return Err(StoreError::http_status(
                    400,
                    r#"{"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#,
                ));
            }
            let session = Session {
                access_token: format!("access-{}", uuid::Uuid::new_v4()),
                refresh_token: format!("refresh-{}", uuid::Uuid::new_v4()),
                expires_at: Utc::now().timestamp() + 3600,
                user: User {
                    id: account.id,
                    email: Some(email.to_string()),
                },
            };
            state.session = Some(session.clone());
            session
        };
        self.listeners.notify(AuthEvent::SignedIn, Some(&session));
        Ok(session)
    }

    fn sign_up_now(&self, email: &str, password: &str) -> StoreResult<SignUpOutcome> {
        let mut state = self.enter(Op::SignUp)?;
        if state.accounts.contains_key(email) {
            return Err(StoreError::http_status(
                422,
                r#"{"error_code":"user_already_exists","msg":"User already registered"}"#,
            ));
        }
        let id = next_user_id(&mut state);
        state.accounts.insert(
            email.to_string(),
            Account {
                id: id.clone(),
                password: password.to_string(),
                confirmed: false,
            },
        );
        Ok(SignUpOutcome {
            user_id: Some(id),
            confirmation_required: true,
        })
    }

    fn sign_out_now(&self) -> StoreResult<()> {
        let result = match self.enter(Op::SignOut) {
            Ok(mut state) => {
                state.session = None;
                Ok(())
            }
            Err(err) => {
                self.lock().session = None;
                Err(err)
            }
        };
        self.listeners.notify(AuthEvent::SignedOut, None);
        result
    }

    fn list_now(&self, order: ListOrder) -> StoreResult<Vec<Article>> {
        let state = self.enter(Op::List)?;
        let mut articles = state.articles.clone();
        articles.sort_by(|a, b| match order.created_at {
            SortDirection::Ascending => a.created_at.cmp(&b.created_at),
            SortDirection::Descending => b.created_at.cmp(&a.created_at),
        });
        Ok(articles)
    }

    fn insert_now(&self, draft: &NewArticle) -> StoreResult<Article> {
        let mut state = self.enter(Op::Insert)?;
        let Some(session) = state.session.as_ref() else {
            return Err(StoreError::no_session());
        };
        if session.user.id != draft.author_id {
            return Err(StoreError::http_status(
                403,
                r#"{"code":"42501","message":"new row violates row-level security policy"}"#,
            ));
        }
        state.next_article += 1;
        let article = Article {
            id: ArticleId(state.next_article.to_string()),
            title: draft.title.clone(),
            body: draft.body.clone(),
            author_id: draft.author_id.clone(),
            created_at: clock(state.next_article),
        };
        state.articles.push(article.clone());
        Ok(article)
    }

    fn delete_now(&self, id: &ArticleId) -> StoreResult<()> {
        let mut state = self.enter(Op::Delete)?;
        let Some(user_id) = state.session.as_ref().map(|s| s.user.id.clone()) else {
            return Err(StoreError::no_session());
        };
        let before = state.articles.len();
        state
            .articles
            .retain(|article| !(article.id == *id && article.author_id == user_id));
        if state.articles.len() == before {
            return Err(StoreError::new(
                StoreErrorKind::NotFound,
                format!("No article {id} owned by the current user"),
            ));
        }
        Ok(())
    }
}

/// Deterministic creation timestamps: one minute apart, in insertion order.
pub fn clock(tick: u64) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default();
    base + Duration::minutes(i64::try_from(tick).unwrap_or_default())
}

fn next_user_id(state: &mut MemoryState) -> UserId {
    state.next_user += 1;
    UserId(format!("user-{}", state.next_user))
}

impl AuthBackend for MemoryStore {
    fn get_session(&self) -> BoxFuture<'_, StoreResult<Option<Session>>> {
        let result = self.enter(Op::GetSession).map(|state| state.session.clone());
        Box::pin(future::ready(result))
    }

    fn on_session_change(&self, listener: AuthListener) -> Subscription {
        self.listeners.subscribe(listener)
    }

    fn sign_in_with_password<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, StoreResult<Session>> {
        Box::pin(future::ready(self.sign_in_now(email, password)))
    }

    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, StoreResult<SignUpOutcome>> {
        Box::pin(future::ready(self.sign_up_now(email, password)))
    }

    fn sign_out(&self) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(future::ready(self.sign_out_now()))
    }
}

impl ArticleStore for MemoryStore {
    fn list_all(&self, order: ListOrder) -> BoxFuture<'_, StoreResult<Vec<Article>>> {
        Box::pin(future::ready(self.list_now(order)))
    }

    fn insert<'a>(&'a self, draft: &'a NewArticle) -> BoxFuture<'a, StoreResult<Article>> {
        Box::pin(future::ready(self.insert_now(draft)))
    }

    fn delete_by_id<'a>(&'a self, id: &'a ArticleId) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(future::ready(self.delete_now(id)))
    }
}

/// Builds an article fixture with a deterministic timestamp.
pub fn article(id: u64, title: &str, body: &str, author: &str) -> Article {
    Article {
        id: ArticleId(id.to_string()),
        title: title.to_string(),
        body: body.to_string(),
        author_id: UserId(author.to_string()),
        created_at: clock(id),
    }
}
