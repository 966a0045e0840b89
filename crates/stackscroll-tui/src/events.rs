//! Events fed into the reducer.

use crossterm::event::Event;
use stackscroll_core::error::AppError;
use stackscroll_core::models::{Article, User};
use stackscroll_core::store::StoreResult;
use stackscroll_core::task::TaskId;
use stackscroll_core::viewmodel::AuthMode;

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick; drives the spinner and rendering.
    Tick,
    Frame {
        width: u16,
        height: u16,
    },
    Terminal(Event),

    /// Session lookup at startup finished.
    SessionReady {
        user: Option<User>,
        result: Result<(), AppError>,
    },
    /// The session manager published a new identity.
    IdentityChanged(Option<User>),

    ListingLoaded {
        task: TaskId,
        result: StoreResult<Vec<Article>>,
    },
    ArticleDeleted {
        task: TaskId,
        result: StoreResult<()>,
    },
    Published {
        task: TaskId,
        result: StoreResult<Article>,
    },
    AuthFinished {
        task: TaskId,
        mode: AuthMode,
        /// Identity right after the call, so navigation never sees a stale one.
        user: Option<User>,
        result: Result<(), AppError>,
    },
    SignedOut {
        result: Result<(), AppError>,
    },
    LinkCopied {
        result: anyhow::Result<()>,
    },
}
