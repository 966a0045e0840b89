//! Application state, owned by the runtime and mutated only by the reducer.

use stackscroll_core::models::User;
use stackscroll_core::nav::{Access, Navigator, Screen};

use crate::features::auth::AuthState;
use crate::features::compose::ComposeState;
use crate::features::listing::ListingState;

/// Identity as last published by the session manager.
#[derive(Debug, Default, Clone)]
pub struct Identity {
    pub initialized: bool,
    pub user: Option<User>,
}

impl Identity {
    pub fn access(&self) -> Access {
        match (self.initialized, &self.user) {
            (_, Some(_)) => Access::SignedIn,
            (false, None) => Access::Initializing,
            (true, None) => Access::SignedOut,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Error,
}

/// App-wide message shown under the navigation bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

impl Banner {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub nav: Navigator,
    pub screen: Screen,
    pub identity: Identity,
    pub listing: ListingState,
    pub compose: ComposeState,
    pub auth: AuthState,
    pub banner: Option<Banner>,
    /// Base URL for share links.
    pub share_origin: String,
    pub should_quit: bool,
    pub spinner_frame: usize,
    pub viewport: (u16, u16),
}

impl AppState {
    pub fn new(share_origin: impl Into<String>) -> Self {
        let nav = Navigator::default();
        let screen = Screen::Show(nav.current());
        Self {
            nav,
            screen,
            identity: Identity::default(),
            listing: ListingState::default(),
            compose: ComposeState::default(),
            auth: AuthState::default(),
            banner: None,
            share_origin: share_origin.into(),
            should_quit: false,
            spinner_frame: 0,
            viewport: (0, 0),
        }
    }

    /// True while any store call is in flight.
    pub fn is_busy(&self) -> bool {
        self.listing.vm.is_loading()
            || self.listing.vm.deleting().is_some()
            || self.compose.vm.is_publishing()
            || self.auth.vm.is_submitting()
    }
}
