//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! Spawned handlers send their result `UiEvent` to `inbox_tx`, and the
//! runtime drains `inbox_rx` each frame. Identity changes published by the
//! session manager are picked up from its watch channel the same way.

mod handlers;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use stackscroll_core::models::Session;
use stackscroll_core::session::SessionManager;
use stackscroll_core::store::ArticleStore;
use tokio::sync::{mpsc, watch};

use crate::common::TerminalClipboard;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Tick cadence while a request is in flight (spinner animation).
pub const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Poll duration when idle. Longer timeout reduces CPU usage.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop and on
/// panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    store: Arc<dyn ArticleStore>,
    session: Arc<SessionManager>,
    identity_rx: watch::Receiver<Option<Session>>,
    clipboard: TerminalClipboard,
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Enters the alternate screen and builds the runtime.
    ///
    /// Must be called from inside a tokio runtime; effects are spawned on it.
    pub fn new(
        store: Arc<dyn ArticleStore>,
        session: Arc<SessionManager>,
        share_origin: String,
    ) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let identity_rx = session.watch_identity();

        Ok(Self {
            terminal,
            state: AppState::new(share_origin),
            store,
            session,
            identity_rx,
            clipboard: TerminalClipboard,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Runs the main event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let effects = update::init(&mut self.state);
        self.execute_effects(effects);
        self.event_loop()
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                // Frame events alone don't need a redraw.
                if !matches!(&event, UiEvent::Frame { .. }) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty && !self.state.should_quit {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    /// Collects events from the inbox, the identity watch and the terminal.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let tick_interval = if self.state.is_busy() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        self.collect_identity_change(&mut events);
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn collect_identity_change(&mut self, events: &mut Vec<UiEvent>) {
        if !self.identity_rx.has_changed().unwrap_or(false) {
            return;
        }
        let user = self
            .identity_rx
            .borrow_and_update()
            .as_ref()
            .map(|session| session.user.clone());
        events.push(UiEvent::IdentityChanged(user));
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        if !effects.is_empty() {
            self.execute_effects(effects);
        }
    }

    /// Spawns an async handler and sends its result event to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::OpenBrowser { url } => {
                if let Err(e) = open::that(&url) {
                    tracing::warn!(%url, error = %e, "Failed to open browser");
                }
            }
            UiEffect::CopyToClipboard { text } => {
                let event = handlers::copy_to_clipboard(&self.clipboard, &text);
                self.dispatch_event(event);
            }

            UiEffect::InitializeSession => {
                let session = Arc::clone(&self.session);
                self.spawn_effect(move || handlers::initialize_session(session));
            }
            UiEffect::SubmitAuth { request } => {
                let session = Arc::clone(&self.session);
                self.spawn_effect(move || handlers::submit_auth(session, request));
            }
            UiEffect::SignOut => {
                let session = Arc::clone(&self.session);
                self.spawn_effect(move || handlers::sign_out(session));
            }

            UiEffect::LoadArticles { task } => {
                let store = Arc::clone(&self.store);
                self.spawn_effect(move || handlers::load_articles(store, task));
            }
            UiEffect::DeleteArticle { request } => {
                let store = Arc::clone(&self.store);
                self.spawn_effect(move || handlers::delete_article(store, request));
            }
            UiEffect::Publish { request } => {
                let store = Arc::clone(&self.store);
                self.spawn_effect(move || handlers::publish(store, request));
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
