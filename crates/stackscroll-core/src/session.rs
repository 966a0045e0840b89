//! Session manager: the single source of "who is signed in".
//!
//! Identity lives in a `tokio::sync::watch` channel. The store's change
//! listener writes into it, and the UI reads from it (synchronously via
//! [`SessionManager::current_user`] or reactively via
//! [`SessionManager::watch_identity`]). The manager holds exactly one store
//! subscription and releases it exactly once, on [`SessionManager::dispose`]
//! or drop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{OnceCell, watch};

use crate::error::{AppError, messages, validate_password};
use crate::models::{Session, User};
use crate::store::{AuthBackend, AuthEvent, Subscription};

/// Result of a sign-up the store accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpStatus {
    /// Account must be verified by email before it can sign in.
    VerificationPending,
}

pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    identity: Arc<watch::Sender<Option<Session>>>,
    initialized: AtomicBool,
    init: OnceCell<()>,
    subscription: Mutex<Option<Subscription>>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            backend,
            identity: Arc::new(identity),
            initialized: AtomicBool::new(false),
            init: OnceCell::new(),
            subscription: Mutex::new(None),
        }
    }

    /// Loads the current session once and starts following auth events.
    ///
    /// Later calls are no-ops; concurrent callers wait for the first one. A
    /// failed lookup still completes initialization with no identity and
    /// returns the error, to the first caller only, for display.
    pub async fn initialize(&self) -> Result<(), AppError> {
        let mut outcome = Ok(());
        let slot = &mut outcome;
        self.init
            .get_or_init(|| async move {
                *slot = self.restore().await;
            })
            .await;
        outcome
    }

    async fn restore(&self) -> Result<(), AppError> {
        let result = match self.backend.get_session().await {
            Ok(session) => {
                tracing::debug!(signed_in = session.is_some(), "Session restored");
                self.identity.send_replace(session);
                Ok(())
            }
            Err(err) => {
                self.identity.send_replace(None);
                Err(AppError::remote(messages::SESSION_UNAVAILABLE, &err))
            }
        };

        {
            let mut slot = self
                .subscription
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                let identity = Arc::clone(&self.identity);
                *slot = Some(self.backend.on_session_change(Arc::new(
                    move |event: AuthEvent, session: Option<&Session>| {
                        tracing::debug!(?event, "Identity updated");
                        identity.send_replace(session.cloned());
                    },
                )));
            }
        }

        self.initialized.store(true, Ordering::SeqCst);
        result
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Latest known identity. Never touches the network.
    pub fn current_user(&self) -> Option<User> {
        self.identity
            .borrow()
            .as_ref()
            .map(|session| session.user.clone())
    }

    pub fn current_session(&self) -> Option<Session> {
        self.identity.borrow().clone()
    }

    /// Receiver that observes every identity change.
    pub fn watch_identity(&self) -> watch::Receiver<Option<Session>> {
        self.identity.subscribe()
    }

    /// Signs in. Identity is only touched on success.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        match self.backend.sign_in_with_password(email, password).await {
            Ok(session) => {
                self.identity.send_replace(Some(session.clone()));
                Ok(session)
            }
            Err(err) => Err(AppError::sign_in_rejected(&err)),
        }
    }

    /// Creates an account. The password policy is checked before the store is
    /// called. Identity is not set here; a project that auto-confirms accounts
    /// reports its session through the change listener.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpStatus, AppError> {
        validate_password(password)?;
        match self.backend.sign_up(email, password).await {
            Ok(outcome) => {
                tracing::info!(
                    confirmation_required = outcome.confirmation_required,
                    "Account created"
                );
                Ok(SignUpStatus::VerificationPending)
            }
            Err(err) => Err(AppError::remote(messages::SIGN_UP_FAILED, &err)),
        }
    }

    /// Signs out. Local identity is cleared even when the store call fails;
    /// the failure is still returned so callers can mention it.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        let result = self.backend.sign_out().await;
        self.identity.send_replace(None);
        result.map_err(|err| AppError::remote(messages::SIGN_OUT_FAILED, &err))
    }

    /// Releases the store subscription. Safe to call more than once; only the
    /// first call releases anything.
    pub fn dispose(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = subscription {
            tracing::debug!("Releasing session subscription");
            subscription.unsubscribe();
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppErrorKind, AuthRejection};
    use futures_util::future::BoxFuture;

    use crate::store::memory::{MemoryStore, Op};
    use crate::store::{AuthListener, SignUpOutcome, StoreError, StoreResult};

    fn manager(store: &Arc<MemoryStore>) -> SessionManager {
        SessionManager::new(Arc::clone(store) as Arc<dyn AuthBackend>)
    }

    #[tokio::test]
    async fn test_initialize_registers_one_listener() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager(&store);

        manager.initialize().await.unwrap();
        manager.initialize().await.unwrap();

        assert!(manager.is_initialized());
        assert!(manager.current_user().is_none());
        assert_eq!(store.calls(Op::GetSession), 1);
        assert_eq!(store.listener_count(), 1);
    }

    /// Auth backend whose session lookup yields before answering, so two
    /// callers can interleave.
    struct YieldingBackend(Arc<MemoryStore>);

    impl AuthBackend for YieldingBackend {
        fn get_session(&self) -> BoxFuture<'_, StoreResult<Option<Session>>> {
            Box::pin(async move {
                tokio::task::yield_now().await;
                self.0.get_session().await
            })
        }

        fn on_session_change(&self, listener: AuthListener) -> Subscription {
            self.0.on_session_change(listener)
        }

        fn sign_in_with_password<'a>(
            &'a self,
            email: &'a str,
            password: &'a str,
        ) -> BoxFuture<'a, StoreResult<Session>> {
            self.0.sign_in_with_password(email, password)
        }

        fn sign_up<'a>(
            &'a self,
            email: &'a str,
            password: &'a str,
        ) -> BoxFuture<'a, StoreResult<SignUpOutcome>> {
            self.0.sign_up(email, password)
        }

        fn sign_out(&self) -> BoxFuture<'_, StoreResult<()>> {
            self.0.sign_out()
        }
    }

    #[tokio::test]
    async fn test_concurrent_initialize_looks_up_session_once() {
        let store = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(Arc::new(YieldingBackend(Arc::clone(&store))));

        let (first, second) = tokio::join!(manager.initialize(), manager.initialize());
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert!(manager.is_initialized());
        assert_eq!(store.calls(Op::GetSession), 1);
        assert_eq!(store.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_initialize_reports_once() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next(Op::GetSession, StoreError::http_status(503, ""));
        let manager = manager(&store);

        assert!(manager.initialize().await.is_err());
        assert!(manager.is_initialized());
        assert!(manager.initialize().await.is_ok());
        assert_eq!(store.calls(Op::GetSession), 1);
    }

    #[tokio::test]
    async fn test_listener_tracks_store_events() {
        let store = Arc::new(MemoryStore::new().with_user("a@b.com", "secret1"));
        let manager = manager(&store);
        manager.initialize().await.unwrap();
        let rx = manager.watch_identity();

        // Sign in behind the manager's back; the listener must pick it up.
        store
            .sign_in_with_password("a@b.com", "secret1")
            .await
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            manager.current_user().and_then(|u| u.email).as_deref(),
            Some("a@b.com")
        );

        store.emit(AuthEvent::TokenRefreshed);
        assert!(manager.current_user().is_some());

        store.sign_out().await.unwrap();
        assert!(manager.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_failure_leaves_identity() {
        let store = Arc::new(MemoryStore::new().with_user("a@b.com", "secret1"));
        let manager = manager(&store);
        manager.initialize().await.unwrap();

        let err = manager.sign_in("a@b.com", "wrong-pw").await.unwrap_err();
        assert_eq!(
            err.kind,
            AppErrorKind::AuthRejected(AuthRejection::InvalidCredentials)
        );
        assert_eq!(err.message, messages::INVALID_CREDENTIALS);
        assert!(manager.current_user().is_none());
    }

    #[tokio::test]
    async fn test_short_password_sign_up_never_calls_store() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager(&store);

        let err = manager.sign_up("a@b.com", "12345").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.message, messages::PASSWORD_TOO_SHORT);
        assert_eq!(store.calls(Op::SignUp), 0);
    }

    #[tokio::test]
    async fn test_sign_up_does_not_sign_in() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager(&store);
        manager.initialize().await.unwrap();

        let status = manager.sign_up("new@b.com", "secret1").await.unwrap();
        assert_eq!(status, SignUpStatus::VerificationPending);
        assert!(manager.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_identity_when_store_fails() {
        let store = Arc::new(MemoryStore::new().with_user("a@b.com", "secret1"));
        let manager = manager(&store);
        manager.initialize().await.unwrap();
        manager.sign_in("a@b.com", "secret1").await.unwrap();

        store.fail_next(Op::SignOut, StoreError::http_status(500, ""));
        let err = manager.sign_out().await.unwrap_err();
        assert_eq!(err.kind, AppErrorKind::RemoteFailure);
        assert!(manager.current_user().is_none());
    }

    #[tokio::test]
    async fn test_dispose_releases_subscription_once() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager(&store);
        manager.initialize().await.unwrap();
        assert_eq!(store.listener_count(), 1);

        manager.dispose();
        manager.dispose();
        assert_eq!(store.listener_count(), 0);

        drop(manager);
        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let store = Arc::new(MemoryStore::new());
        {
            let manager = manager(&store);
            manager.initialize().await.unwrap();
            assert_eq!(store.listener_count(), 1);
        }
        assert_eq!(store.listener_count(), 0);
    }
}
