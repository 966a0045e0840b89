//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never
//! mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use stackscroll_core::nav::{Access, Route, Screen};

use crate::common::spinner;
use crate::features::{auth, compose, home, listing};
use crate::state::{AppState, BannerKind};

pub const APP_NAME: &str = "StackScroll";

/// Horizontal padding around the screen body.
const BODY_MARGIN: u16 = 2;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let banner_height = u16::from(app.banner.is_some());
    let [nav, banner, body, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(banner_height),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_nav_bar(app, frame, nav);
    if let Some(message) = &app.banner {
        let color = match message.kind {
            BannerKind::Info => Color::Green,
            BannerKind::Error => Color::Red,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message.text.clone(), Style::default().fg(color)))
                .alignment(Alignment::Center),
            banner,
        );
    }

    let body = Rect::new(
        body.x + BODY_MARGIN,
        body.y,
        body.width.saturating_sub(BODY_MARGIN * 2),
        body.height,
    );
    match app.screen {
        Screen::Loading => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("{} Loading...", spinner(app.spinner_frame)),
                    Style::default().fg(Color::Yellow),
                ))
                .alignment(Alignment::Center),
                body,
            );
        }
        Screen::Show(Route::Home) => home::render_home(frame, body),
        Screen::Show(Route::Listing) => listing::render_listing(
            frame,
            body,
            &app.listing,
            app.identity.user(),
            app.spinner_frame,
        ),
        Screen::Show(Route::Compose) => {
            compose::render_compose(frame, body, &app.compose, app.spinner_frame);
        }
        Screen::Show(Route::Authenticate) => {
            auth::render_auth(frame, body, &app.auth, app.spinner_frame);
        }
    }

    frame.render_widget(
        Paragraph::new(footer_hints(app)).alignment(Alignment::Center),
        footer,
    );
}

fn render_nav_bar(app: &AppState, frame: &mut Frame, area: Rect) {
    let active = match app.screen {
        Screen::Show(route) => Some(route),
        Screen::Loading => None,
    };
    let tab = |key: &'static str, label: &'static str, route: Route| -> Vec<Span<'static>> {
        let style = if active == Some(route) {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        vec![
            Span::styled(format!(" {key} "), Style::default().fg(Color::DarkGray)),
            Span::styled(label, style),
        ]
    };

    let mut spans = vec![Span::styled(
        format!(" {APP_NAME} "),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.extend(tab("h", "Home", Route::Home));
    spans.extend(tab("b", "Blog", Route::Listing));
    spans.extend(tab("w", "Write", Route::Compose));

    let account = match app.identity.access() {
        Access::Initializing => vec![Span::styled(
            format!(" {}", spinner(app.spinner_frame)),
            Style::default().fg(Color::DarkGray),
        )],
        Access::SignedOut => tab("a", "Sign in", Route::Authenticate),
        Access::SignedIn => {
            let who = app
                .identity
                .user()
                .and_then(|user| user.email.clone())
                .unwrap_or_default();
            vec![
                Span::styled(format!("  {who}"), Style::default().fg(Color::DarkGray)),
                Span::styled(" x ", Style::default().fg(Color::DarkGray)),
                Span::styled("Sign out", Style::default().fg(Color::Gray)),
            ]
        }
    };
    spans.push(Span::raw("   "));
    spans.extend(account);

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

fn footer_hints(app: &AppState) -> Line<'static> {
    let hints: &[(&str, &str)] = if app.listing.confirm_delete.is_some() {
        &[("y", "delete"), ("n", "cancel")]
    } else {
        match app.screen {
            Screen::Show(Route::Listing) => &[
                ("↑/↓", "select"),
                ("Enter", "expand"),
                ("s", "share"),
                ("o", "open"),
                ("r", "reload"),
                ("q", "quit"),
            ],
            Screen::Show(Route::Compose) => &[
                ("Tab", "switch field"),
                ("Ctrl+S", "publish"),
                ("Esc", "back"),
            ],
            Screen::Show(Route::Authenticate) => &[
                ("Tab", "switch field"),
                ("Enter", "submit"),
                ("Ctrl+T", "toggle mode"),
                ("Esc", "back"),
            ],
            Screen::Show(Route::Home) | Screen::Loading => &[("q", "quit")],
        }
    };

    let mut spans = Vec::new();
    for (idx, (key, label)) in hints.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" · ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(
            format!(" {label}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}
