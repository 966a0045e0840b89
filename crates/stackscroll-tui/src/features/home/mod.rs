//! Landing screen.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

pub fn render_home(frame: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let label = Style::default().fg(Color::Gray);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Share Your Technical Knowledge",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Write about what you build and read what others have learned.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("w ", key),
            Span::styled("Start Writing", label),
            Span::raw("    "),
            Span::styled("b ", key),
            Span::styled("Read Articles", label),
        ]),
    ];

    let top = area.height.saturating_sub(6) / 3;
    let area = Rect::new(area.x, area.y + top, area.width, area.height - top);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}
