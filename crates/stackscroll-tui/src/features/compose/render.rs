use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{ComposeField, ComposeState};
use crate::common::field::render_text_field;
use crate::common::spinner;

pub fn render_compose(frame: &mut Frame, area: Rect, compose: &ComposeState, spinner_frame: usize) {
    let [heading, title_label, title_box, body_label, body_box, error, status] =
        Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Write an Article",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))),
        heading,
    );
    frame.render_widget(Paragraph::new(label("Title")), title_label);
    frame.render_widget(Paragraph::new(label("Content (Markdown)")), body_label);

    let editable = !compose.vm.is_publishing();
    render_text_field(
        frame,
        title_box,
        &compose.vm.title,
        compose.title_cursor,
        editable && compose.focus == ComposeField::Title,
    );
    render_text_field(
        frame,
        body_box,
        &compose.vm.body,
        compose.body_cursor,
        editable && compose.focus == ComposeField::Body,
    );

    if let Some(err) = compose.vm.error() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                err.message.clone(),
                Style::default().fg(Color::Red),
            )),
            error,
        );
    }

    let status_line = if compose.vm.is_publishing() {
        Line::from(Span::styled(
            format!("{} Publishing...", spinner(spinner_frame)),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from(vec![
            Span::styled("Ctrl+S ", Style::default().fg(Color::Yellow)),
            Span::styled("Publish", Style::default().fg(Color::DarkGray)),
        ])
    };
    frame.render_widget(Paragraph::new(status_line), status);
}

fn label(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(Color::Gray)))
}
