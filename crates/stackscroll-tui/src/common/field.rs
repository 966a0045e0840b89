//! Bordered single- and multi-line text fields.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::text_input::cursor_row_col;

/// Draws a bordered text field scrolled so the cursor stays visible.
pub fn render_text_field(frame: &mut Frame, area: Rect, text: &str, cursor: usize, focused: bool) {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);

    let (row, col) = cursor_row_col(text, cursor);
    let row = u16::try_from(row).unwrap_or(u16::MAX);
    let col = u16::try_from(col).unwrap_or(u16::MAX);
    let scroll_y = row.saturating_sub(inner.height.saturating_sub(1));
    let scroll_x = col.saturating_sub(inner.width.saturating_sub(1));

    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .scroll((scroll_y, scroll_x)),
        area,
    );

    if focused && inner.width > 0 && inner.height > 0 {
        frame.set_cursor_position((inner.x + col - scroll_x, inner.y + row - scroll_y));
    }
}
