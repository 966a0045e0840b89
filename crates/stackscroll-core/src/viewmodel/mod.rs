//! Per-screen state machines.
//!
//! Every async action is split in two so a reducer can own the state while
//! the store call runs elsewhere:
//! - `begin_*` validates, flips the in-flight field and hands back a request
//!   tagged with a [`TaskId`](crate::task::TaskId)
//! - `finish_*` applies the result, but only if that id is still active
//!
//! The `async fn` wrappers run both halves back to back for callers that
//! simply await (the command line, tests).

pub mod auth;
pub mod compose;
pub mod listing;

pub use auth::{AuthMode, AuthOutcome, AuthRequest, AuthViewModel};
pub use compose::{ComposeViewModel, PublishRequest};
pub use listing::{DeleteRequest, ListingViewModel, PREVIEW_CHARS, TRUNCATION_MARKER, preview};
