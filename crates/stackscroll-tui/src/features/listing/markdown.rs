//! Markdown to styled terminal lines.
//!
//! Walks pulldown-cmark events, keeps a style stack for inline markup, and
//! word-wraps paragraphs to the card width. Code blocks are indented and not
//! wrapped. Raw HTML is dropped.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Renders `text` into lines no wider than `width` columns.
pub fn render_markdown(text: &str, width: usize) -> Vec<Line<'static>> {
    let width = width.max(8);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = Renderer::new(width);
    for event in Parser::new_ext(text, options) {
        renderer.process_event(event);
    }
    renderer.finish()
}

#[derive(Debug, Clone, Copy)]
struct ListState {
    next_number: Option<u64>,
}

struct Renderer {
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<(String, Style)>,
    styles: Vec<Style>,
    lists: Vec<ListState>,
    /// Prefix for the first wrapped line of the current block (e.g. bullet).
    marker: Option<String>,
    quote_depth: usize,
    in_code_block: bool,
}

impl Renderer {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            styles: vec![Style::default()],
            lists: Vec::new(),
            marker: None,
            quote_depth: 0,
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                let style = self.style();
                self.spans.push((text.into_string(), style));
            }
            Event::Code(code) => {
                self.spans
                    .push((code.into_string(), Style::default().fg(Color::Yellow)));
            }
            Event::SoftBreak => {
                let style = self.style();
                self.spans.push((" ".to_string(), style));
            }
            Event::HardBreak => self.flush_block(),
            Event::Rule => {
                self.flush_block();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(self.width.min(40)),
                    Style::default().fg(Color::DarkGray),
                )));
                self.blank();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.spans.push((marker.to_string(), self.style()));
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_block();
                let style = match level {
                    HeadingLevel::H1 => Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    HeadingLevel::H2 => Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                    _ => Style::default().add_modifier(Modifier::BOLD),
                };
                self.push_style(style);
            }
            Tag::CodeBlock(_) => {
                self.flush_block();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush_block();
                self.lists.push(ListState { next_number: start });
            }
            Tag::Item => {
                self.flush_block();
                let depth = self.lists.len().saturating_sub(1);
                let bullet = match self.lists.last_mut() {
                    Some(ListState {
                        next_number: Some(n),
                    }) => {
                        let label = format!("{n}. ");
                        *n += 1;
                        label
                    }
                    _ => "• ".to_string(),
                };
                self.marker = Some(format!("{}{bullet}", "  ".repeat(depth)));
            }
            Tag::BlockQuote(_) => {
                self.flush_block();
                self.quote_depth += 1;
                self.push_style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT));
            }
            Tag::Link { .. } => self.push_style(
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_block();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_block();
                self.pop_style();
                self.blank();
            }
            TagEnd::CodeBlock => {
                self.flush_code_block();
                self.in_code_block = false;
                self.blank();
            }
            TagEnd::Item => self.flush_block(),
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush_block();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style();
            }
            _ => {}
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn quote_prefix(&self) -> String {
        "│ ".repeat(self.quote_depth)
    }

    fn flush_code_block(&mut self) {
        let text: String = self.spans.drain(..).map(|(text, _)| text).collect();
        let code_style = Style::default().fg(Color::Yellow);
        for line in text.trim_end_matches('\n').split('\n') {
            self.lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(line.to_string(), code_style),
            ]));
        }
    }

    /// Word-wraps the collected spans into lines.
    fn flush_block(&mut self) {
        if self.in_code_block {
            return;
        }
        let marker = self.marker.take();
        if self.spans.is_empty() {
            if let Some(marker) = marker {
                self.lines.push(Line::from(marker));
            }
            return;
        }

        let quote = self.quote_prefix();
        let first_prefix = format!("{quote}{}", marker.as_deref().unwrap_or_default());
        let rest_prefix = format!("{quote}{}", " ".repeat(marker.as_deref().map_or(0, str::width)));

        let spans = std::mem::take(&mut self.spans);
        let mut current: Vec<Span<'static>> = vec![Span::raw(first_prefix.clone())];
        let mut used = first_prefix.width();
        let mut line_has_text = false;

        for (text, style) in spans {
            for word in text.split_word_bounds() {
                let word_width = word.width();
                let is_space = word.trim().is_empty();
                if is_space && !line_has_text {
                    continue;
                }
                if used + word_width > self.width && line_has_text {
                    self.lines.push(Line::from(std::mem::take(&mut current)));
                    current.push(Span::raw(rest_prefix.clone()));
                    used = rest_prefix.width();
                    line_has_text = false;
                    if is_space {
                        continue;
                    }
                }
                current.push(Span::styled(word.to_string(), style));
                used += word_width;
                line_has_text = true;
            }
        }

        if line_has_text {
            self.lines.push(Line::from(current));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_block();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_paragraphs_wrap_to_width() {
        let lines = render_markdown("one two three four five six", 10);
        let text = plain(&lines);
        assert!(text.iter().all(|line| line.width() <= 10), "{text:?}");
        assert_eq!(text.join(" ").split_whitespace().count(), 6);
    }

    #[test]
    fn test_heading_and_emphasis_are_styled() {
        let lines = render_markdown("# Title\n\nsome *soft* words", 40);
        let heading = &lines[0].spans[1];
        assert_eq!(heading.content, "Title");
        assert!(heading.style.add_modifier.contains(Modifier::BOLD));

        let body = &lines[2];
        let soft = body.spans.iter().find(|s| s.content == "soft").unwrap();
        assert!(soft.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_lists_get_markers() {
        let text = plain(&render_markdown("- a\n- b\n\n1. x\n2. y", 40));
        assert_eq!(text, vec!["• a", "• b", "", "1. x", "2. y"]);
    }

    #[test]
    fn test_code_blocks_keep_lines() {
        let text = plain(&render_markdown("```\nfn main() {}\n  x\n```", 40));
        assert_eq!(text, vec!["    fn main() {}", "      x"]);
    }

    #[test]
    fn test_html_is_dropped() {
        let text = plain(&render_markdown("<script>x</script>", 40));
        assert!(text.iter().all(|line| !line.contains("script")));
    }
}
