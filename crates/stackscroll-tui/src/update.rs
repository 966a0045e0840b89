//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use stackscroll_core::nav::{Access, Route, Screen};
use stackscroll_core::viewmodel::AuthOutcome;

use crate::common::FeatureUpdate;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::{auth, compose, listing};
use crate::state::{AppState, Banner};

/// Effects to run once when the runtime starts.
pub fn init(app: &mut AppState) -> Vec<UiEffect> {
    let mut effects = vec![UiEffect::InitializeSession];
    let screen = app.nav.resolve(app.identity.access());
    effects.extend(show(app, screen));
    effects
}

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.viewport = (width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),

        UiEvent::SessionReady { user, result } => {
            app.identity.initialized = true;
            app.identity.user = user;
            if let Err(err) = result {
                app.banner = Some(Banner::error(err.message));
            }
            resolve(app)
        }
        UiEvent::IdentityChanged(user) => {
            if app.identity.user == user {
                return vec![];
            }
            tracing::debug!(signed_in = user.is_some(), "Identity changed");
            app.identity.user = user;
            resolve(app)
        }

        UiEvent::ListingLoaded { task, result } => {
            listing::handle_loaded(&mut app.listing, task, result);
            vec![]
        }
        UiEvent::ArticleDeleted { task, result } => {
            listing::handle_deleted(&mut app.listing, task, result)
        }
        UiEvent::LinkCopied { result } => {
            listing::handle_copied(&mut app.listing, result);
            vec![]
        }
        UiEvent::Published { task, result } => {
            let mut update = compose::handle_published(&mut app.compose, task, result);
            if update.navigate.is_some() && app.screen != Screen::Show(Route::Compose) {
                // The user already left the editor; don't pull them back.
                update.navigate = None;
                if app.screen == Screen::Show(Route::Listing) {
                    // The load issued on entry may predate the insert.
                    update.effects.extend(listing::enter(&mut app.listing));
                }
            }
            apply(app, update)
        }

        UiEvent::AuthFinished {
            task,
            mode,
            user,
            result,
        } => match auth::handle_finished(&mut app.auth, task, mode, result) {
            Some(AuthOutcome::SignedIn) => {
                app.identity.initialized = true;
                if user.is_some() {
                    app.identity.user = user;
                }
                app.banner = None;
                app.nav.complete_login();
                resolve(app)
            }
            Some(AuthOutcome::VerificationPending | AuthOutcome::Failed) | None => vec![],
        },
        UiEvent::SignedOut { result } => {
            app.identity.user = None;
            app.banner = Some(match result {
                Ok(()) => Banner::info("Signed out."),
                Err(err) => Banner::error(err.message),
            });
            resolve(app)
        }
    }
}

/// Re-applies the sign-in guard after identity changed.
fn resolve(app: &mut AppState) -> Vec<UiEffect> {
    let screen = app.nav.resolve(app.identity.access());
    show(app, screen)
}

fn navigate(app: &mut AppState, route: Route) -> Vec<UiEffect> {
    app.banner = None;
    let screen = app.nav.navigate(route, app.identity.access());
    show(app, screen)
}

/// Switches the visible screen; entering the listing starts a load.
fn show(app: &mut AppState, screen: Screen) -> Vec<UiEffect> {
    let previous = std::mem::replace(&mut app.screen, screen);
    if previous == screen {
        return vec![];
    }
    app.listing.confirm_delete = None;
    if screen == Screen::Show(Route::Listing) {
        listing::enter(&mut app.listing)
    } else {
        vec![]
    }
}

fn apply(app: &mut AppState, update: FeatureUpdate) -> Vec<UiEffect> {
    let mut effects = update.effects;
    if let Some(route) = update.navigate {
        effects.extend(navigate(app, route));
    }
    effects
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Paste(text) => {
            match app.screen {
                Screen::Show(Route::Compose) => compose::handle_paste(&mut app.compose, &text),
                Screen::Show(Route::Authenticate) => auth::handle_paste(&mut app.auth, &text),
                _ => {}
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.kind == KeyEventKind::Release {
        return vec![];
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    if app.listing.confirm_delete.is_some() {
        return listing::handle_confirm_key(&mut app.listing, key, app.identity.user());
    }

    match app.screen {
        Screen::Show(Route::Compose) => {
            let update = compose::handle_key(&mut app.compose, key, app.identity.user());
            apply(app, update)
        }
        Screen::Show(Route::Authenticate) => {
            let update = auth::handle_key(&mut app.auth, key);
            apply(app, update)
        }
        Screen::Show(Route::Listing) => match handle_global_key(app, key) {
            Some(effects) => effects,
            None => listing::handle_key(
                &mut app.listing,
                key,
                app.identity.user(),
                &app.share_origin,
            ),
        },
        Screen::Show(Route::Home) | Screen::Loading => {
            handle_global_key(app, key).unwrap_or_default()
        }
    }
}

/// Navigation keys available on screens without text fields.
fn handle_global_key(app: &mut AppState, key: KeyEvent) -> Option<Vec<UiEffect>> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    let signed_in = app.identity.access() == Access::SignedIn;
    let effects = match key.code {
        KeyCode::Char('q') => vec![UiEffect::Quit],
        KeyCode::Char('h') => navigate(app, Route::Home),
        KeyCode::Char('b') => navigate(app, Route::Listing),
        KeyCode::Char('w') => navigate(app, Route::Compose),
        KeyCode::Char('a') if !signed_in => navigate(app, Route::Authenticate),
        KeyCode::Char('x') if signed_in => vec![UiEffect::SignOut],
        _ => return None,
    };
    Some(effects)
}
