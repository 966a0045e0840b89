//! Named routes and the sign-in guard on the write screen.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Listing,
    Compose,
    Authenticate,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Listing => "listing",
            Route::Compose => "compose",
            Route::Authenticate => "authenticate",
        }
    }

    /// Routes that need a signed-in user.
    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Compose)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the navigator knows about identity when resolving a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Session lookup has not finished.
    Initializing,
    SignedOut,
    SignedIn,
}

/// What should be on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// A guarded route was requested before identity is known.
    Loading,
    Show(Route),
}

#[derive(Debug, Clone)]
pub struct Navigator {
    current: Route,
    after_login: Option<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator {
    pub const DEFAULT_AFTER_LOGIN: Route = Route::Compose;

    pub fn new(start: Route) -> Self {
        Self {
            current: start,
            after_login: None,
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    /// Destination used after a successful sign-in.
    pub fn after_login(&self) -> Route {
        self.after_login.unwrap_or(Self::DEFAULT_AFTER_LOGIN)
    }

    /// Requests `target` and returns what to show.
    pub fn navigate(&mut self, target: Route, access: Access) -> Screen {
        tracing::debug!(route = %target, ?access, "Navigate");
        self.current = target;
        self.resolve(access)
    }

    /// Re-applies the guard to the current route, e.g. after identity changed.
    ///
    /// A signed-out user on a guarded route is sent to `Authenticate` and the
    /// route is remembered as the post-login destination.
    pub fn resolve(&mut self, access: Access) -> Screen {
        if !self.current.requires_auth() {
            return Screen::Show(self.current);
        }
        match access {
            Access::SignedIn => Screen::Show(self.current),
            Access::Initializing => Screen::Loading,
            Access::SignedOut => {
                self.after_login = Some(self.current);
                self.current = Route::Authenticate;
                Screen::Show(Route::Authenticate)
            }
        }
    }

    /// Moves to the remembered destination after sign-in and forgets it.
    pub fn complete_login(&mut self) -> Route {
        self.current = self.after_login.take().unwrap_or(Self::DEFAULT_AFTER_LOGIN);
        self.current
    }
}
