//! Auth feature view.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use stackscroll_core::error::messages;
use stackscroll_core::viewmodel::AuthMode;

use super::{AuthField, AuthState};
use crate::common::field::render_text_field;
use crate::common::spinner;
use crate::common::text_input::masked;

const FORM_WIDTH: u16 = 48;

pub fn render_auth(frame: &mut Frame, area: Rect, auth: &AuthState, spinner_frame: usize) {
    let width = FORM_WIDTH.min(area.width);
    let form = Rect::new(
        area.x + (area.width - width) / 2,
        area.y,
        width,
        area.height,
    );

    let [heading, email_label, email_box, password_label, password_box, hint, feedback, status, toggle] =
        Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(form);

    let vm = &auth.vm;
    let title = match vm.mode() {
        AuthMode::SignIn => "Sign in to your account",
        AuthMode::SignUp => "Create a new account",
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))),
        heading,
    );

    let editable = !vm.is_submitting();
    frame.render_widget(Paragraph::new(label("Email")), email_label);
    render_text_field(
        frame,
        email_box,
        &vm.email,
        auth.email_cursor,
        editable && auth.focus == AuthField::Email,
    );

    frame.render_widget(Paragraph::new(label("Password")), password_label);
    let before_cursor = vm.password.get(..auth.password_cursor).unwrap_or(&vm.password);
    render_text_field(
        frame,
        password_box,
        &masked(&vm.password),
        masked(before_cursor).len(),
        editable && auth.focus == AuthField::Password,
    );

    if vm.mode() == AuthMode::SignUp {
        frame.render_widget(
            Paragraph::new(Span::styled(
                messages::PASSWORD_TOO_SHORT,
                Style::default().fg(Color::DarkGray),
            )),
            hint,
        );
    }

    let feedback_line = if let Some(err) = vm.error() {
        Some(Span::styled(err.message.clone(), Style::default().fg(Color::Red)))
    } else {
        vm.success()
            .map(|text| Span::styled(text.to_string(), Style::default().fg(Color::Green)))
    };
    if let Some(span) = feedback_line {
        frame.render_widget(
            Paragraph::new(span).wrap(Wrap { trim: true }),
            feedback,
        );
    }

    let status_line = if vm.is_submitting() {
        Line::from(Span::styled(
            format!("{} Processing...", spinner(spinner_frame)),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        let action = match vm.mode() {
            AuthMode::SignIn => "Sign in",
            AuthMode::SignUp => "Sign up",
        };
        Line::from(vec![
            Span::styled("Enter ", Style::default().fg(Color::Yellow)),
            Span::styled(action, Style::default().fg(Color::DarkGray)),
        ])
    };
    frame.render_widget(Paragraph::new(status_line), status);

    let toggle_text = match vm.mode() {
        AuthMode::SignIn => "Don't have an account? Sign up",
        AuthMode::SignUp => "Already have an account? Sign in",
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(toggle_text, Style::default().fg(Color::Blue)),
            Span::styled(" (Ctrl+T)", Style::default().fg(Color::DarkGray)),
        ])),
        toggle,
    );
}

fn label(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(Color::Gray)))
}
