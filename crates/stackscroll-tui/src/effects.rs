//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only, so the reducer never performs
//! I/O itself.

use stackscroll_core::task::TaskId;
use stackscroll_core::viewmodel::{AuthRequest, DeleteRequest, PublishRequest};

#[derive(Debug, PartialEq, Eq)]
pub enum UiEffect {
    Quit,

    /// Restore the session and start following identity changes.
    InitializeSession,

    /// Fetch all articles, newest first.
    LoadArticles { task: TaskId },

    DeleteArticle { request: DeleteRequest },

    Publish { request: PublishRequest },

    /// Sign in or sign up, depending on the request mode.
    SubmitAuth { request: AuthRequest },

    SignOut,

    CopyToClipboard { text: String },

    /// Open a URL in the system browser.
    OpenBrowser { url: String },
}
