//! Listing view: article cards and the delete confirmation.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use stackscroll_core::error::messages;
use stackscroll_core::models::{Article, User};
use stackscroll_core::viewmodel::ListingViewModel;

use super::ListingState;
use super::markdown::render_markdown;
use crate::common::overlay::{centered_area, render_overlay_container};
use crate::common::spinner;

const CARD_INDENT: &str = "  ";

pub fn render_listing(
    frame: &mut Frame,
    area: Rect,
    listing: &ListingState,
    user: Option<&User>,
    spinner_frame: usize,
) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Latest Articles",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        feedback_line(listing, spinner_frame),
    ];

    let header_height = lines.len();
    let available = usize::from(area.height).saturating_sub(header_height);
    lines.extend(body_lines(listing, user, area.width, available));

    frame.render_widget(Paragraph::new(lines), area);

    if let Some(id) = &listing.confirm_delete
        && let Some(article) = listing.vm.article(id)
    {
        render_confirm_delete(frame, area, article);
    }
}

fn feedback_line(listing: &ListingState, spinner_frame: usize) -> Line<'static> {
    let vm = &listing.vm;
    if let Some(err) = vm.error() {
        Line::from(Span::styled(
            err.message.clone(),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(notice) = vm.notice() {
        Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Green),
        ))
    } else if vm.is_loading() && vm.has_loaded() {
        Line::from(Span::styled(
            format!("{} Refreshing...", spinner(spinner_frame)),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from("")
    }
}

fn body_lines(
    listing: &ListingState,
    user: Option<&User>,
    width: u16,
    available: usize,
) -> Vec<Line<'static>> {
    let vm = &listing.vm;
    if !vm.has_loaded() {
        if vm.error().is_some() {
            return vec![];
        }
        return vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))];
    }
    if vm.articles().is_empty() {
        return vec![Line::from(Span::styled(
            messages::EMPTY_LISTING,
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let cards: Vec<Vec<Line<'static>>> = vm
        .articles()
        .iter()
        .enumerate()
        .map(|(idx, article)| card_lines(vm, article, idx == listing.selected, user, width))
        .collect();

    let start = first_visible(&cards, listing.selected, available);
    cards.into_iter().skip(start).flatten().collect()
}

/// Earliest card index that still leaves the selected card fully visible.
fn first_visible(cards: &[Vec<Line<'static>>], selected: usize, available: usize) -> usize {
    let Some(selected_card) = cards.get(selected) else {
        return 0;
    };
    let mut start = selected;
    let mut used = selected_card.len();
    while start > 0 {
        let height = cards[start - 1].len();
        if used + height > available {
            break;
        }
        used += height;
        start -= 1;
    }
    start
}

fn card_lines(
    vm: &ListingViewModel,
    article: &Article,
    selected: bool,
    user: Option<&User>,
    width: u16,
) -> Vec<Line<'static>> {
    let (marker, title_style) = if selected {
        (
            "▶ ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ("  ", Style::default().add_modifier(Modifier::BOLD))
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Cyan)),
            Span::styled(article.title.clone(), title_style),
        ]),
        Line::from(Span::styled(
            format!("{CARD_INDENT}{}", article.created_at.format("%Y-%m-%d")),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let body_width = usize::from(width).saturating_sub(CARD_INDENT.len() * 2);
    for line in render_markdown(&vm.render(article), body_width) {
        let mut spans = vec![Span::raw(CARD_INDENT)];
        spans.extend(line.spans);
        lines.push(Line::from(spans));
    }

    lines.push(action_line(vm, article, selected, user));
    lines.push(Line::from(""));
    lines
}

fn action_line(
    vm: &ListingViewModel,
    article: &Article,
    selected: bool,
    user: Option<&User>,
) -> Line<'static> {
    let key_style = if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let label_style = Style::default().fg(Color::DarkGray);

    if vm.deleting() == Some(&article.id) {
        return Line::from(Span::styled(
            format!("{CARD_INDENT}Deleting..."),
            Style::default().fg(Color::Yellow),
        ));
    }

    let toggle = if vm.is_expanded(&article.id) {
        "Show less"
    } else {
        "Read more"
    };
    let mut spans = vec![
        Span::raw(CARD_INDENT),
        Span::styled("Enter ", key_style),
        Span::styled(toggle, label_style),
        Span::styled("  s ", key_style),
        Span::styled("Share", label_style),
        Span::styled("  o ", key_style),
        Span::styled("Open", label_style),
    ];
    if ListingViewModel::can_delete(article, user) {
        spans.push(Span::styled("  d ", key_style));
        spans.push(Span::styled("Delete", Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

fn render_confirm_delete(frame: &mut Frame, area: Rect, article: &Article) {
    let popup = centered_area(area, 52, 7);
    let inner = render_overlay_container(frame, popup, "Delete Article", Color::Red);

    let lines = vec![
        Line::from(messages::DELETE_CONFIRM),
        Line::from(Span::styled(
            article.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y ", Style::default().fg(Color::Red)),
            Span::styled("Delete", Style::default().fg(Color::DarkGray)),
            Span::styled("  n ", Style::default().fg(Color::Yellow)),
            Span::styled("Cancel", Style::default().fg(Color::DarkGray)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
