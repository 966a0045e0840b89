//! Authentication screen: sign in or sign up through the session manager.

use crate::error::{AppError, messages, validate_password};
use crate::session::SessionManager;
use crate::task::{TaskId, TaskSeq, TaskState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

/// A submission the session manager should carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub task: TaskId,
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
}

/// What a completed submission means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Signed in; move on to the post-login destination.
    SignedIn,
    /// Account created; the screen is back in sign-in mode with a reminder.
    VerificationPending,
    /// Rejected; the error is on the screen.
    Failed,
}

#[derive(Debug, Default)]
pub struct AuthViewModel {
    pub email: String,
    pub password: String,
    mode: AuthMode,
    submit: TaskState,
    seq: TaskSeq,
    error: Option<AppError>,
    success: Option<String>,
}

impl AuthViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Switches mode and drops any feedback from the previous mode.
    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
        self.success = None;
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_running()
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Validates the form and marks a submission as in flight.
    ///
    /// Returns `Ok(None)` while another submission is running.
    pub fn begin_submit(&mut self) -> Result<Option<AuthRequest>, AppError> {
        if self.submit.is_running() {
            return Ok(None);
        }

        self.error = None;
        self.success = None;

        let email = self.email.trim();
        let checked = if email.is_empty() {
            Err(AppError::validation(messages::EMAIL_REQUIRED))
        } else {
            validate_password(&self.password)
        };
        if let Err(err) = checked {
            self.error = Some(err.clone());
            return Err(err);
        }

        let task = self.seq.next_id();
        self.submit.start(task);
        Ok(Some(AuthRequest {
            task,
            mode: self.mode,
            email: email.to_string(),
            password: self.password.clone(),
        }))
    }

    /// Applies the session manager's answer. Returns `None` if `task` is not
    /// the active submission.
    pub fn finish_submit(
        &mut self,
        task: TaskId,
        mode: AuthMode,
        result: Result<(), AppError>,
    ) -> Option<AuthOutcome> {
        if !self.submit.finish_if_active(task) {
            return None;
        }
        Some(match result {
            Ok(()) => {
                self.password.clear();
                match mode {
                    AuthMode::SignIn => AuthOutcome::SignedIn,
                    AuthMode::SignUp => {
                        self.mode = AuthMode::SignIn;
                        self.success = Some(messages::SIGN_UP_PENDING.to_string());
                        AuthOutcome::VerificationPending
                    }
                }
            }
            Err(err) => {
                self.error = Some(err);
                AuthOutcome::Failed
            }
        })
    }

    /// Submits the form in the current mode.
    ///
    /// `Ok(None)` means a submission was already running; validation failures
    /// come back as `Err` and are also kept on the screen.
    pub async fn submit(
        &mut self,
        session: &SessionManager,
    ) -> Result<Option<AuthOutcome>, AppError> {
        let Some(request) = self.begin_submit()? else {
            return Ok(None);
        };
        let result = run(session, &request).await;
        Ok(self.finish_submit(request.task, request.mode, result))
    }
}

/// Performs `request` against the session manager.
pub async fn run(session: &SessionManager, request: &AuthRequest) -> Result<(), AppError> {
    match request.mode {
        AuthMode::SignIn => session
            .sign_in(&request.email, &request.password)
            .await
            .map(|_| ()),
        AuthMode::SignUp => session
            .sign_up(&request.email, &request.password)
            .await
            .map(|_| ()),
    }
}
