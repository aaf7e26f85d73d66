//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::borrow::Cow;
use std::time::{Duration, Instant};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::app::{App, IndexState};
use crate::nav::Focus;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    // Left: search + suggestions, right: results
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(frame.area());

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Search input
            Constraint::Length(1), // Spacer
            Constraint::Min(3),    // Suggestions
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Toast line
        ])
        .split(main_chunks[0]);

    render_search_input(frame, app, left_chunks[0]);
    render_suggestions(frame, app, left_chunks[2]);
    render_status_bar(frame, app, left_chunks[3]);
    render_toast_line(frame, app, left_chunks[4]);

    render_results(frame, app, main_chunks[1]);
}

/// Render the search input (minimal, thick bar on left)
fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let cursor_style = Style::default().fg(Color::White).bg(Color::DarkGray);
    let text_style = Style::default().fg(Color::White);
    let bar_color = if app.suggestions.focus() == Focus::Input {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let (before, after) = app.search_input.text.split_at(app.search_input.cursor);
    let cursor_char = after.chars().next();
    let after_cursor = cursor_char.map(|c| &after[c.len_utf8()..]).unwrap_or("");

    let mut spans = vec![Span::styled("▌ ", Style::default().fg(bar_color))];

    if app.search_input.text.is_empty() {
        spans.push(Span::styled("█", Style::default().fg(Color::White)));
        spans.push(Span::styled(
            " search moves",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(before, text_style));
        match cursor_char {
            Some(c) => spans.push(Span::styled(c.to_string(), cursor_style)),
            None => spans.push(Span::styled("█", Style::default().fg(Color::White))),
        }
        spans.push(Span::styled(after_cursor, text_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the suggestion rows, one per line, and remember where they went
fn render_suggestions(frame: &mut Frame, app: &mut App, area: Rect) {
    let selection_bg = Color::Rgb(38, 38, 38);
    let query = app.search_input.text.trim().to_lowercase();
    let query_chars = query.chars().count();
    let selected = app.suggestions.selected();

    let lines: Vec<Line> = app
        .suggestions
        .items()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let is_selected = selected == Some(i);
            let base = if is_selected {
                Style::default().bg(selection_bg)
            } else {
                Style::default()
            };
            let prefix = if is_selected { "▌ " } else { "  " };

            // Highlight the typed prefix when it still matches
            let split = if name.to_lowercase().starts_with(&query) {
                name.char_indices()
                    .nth(query_chars)
                    .map(|(b, _)| b)
                    .unwrap_or(name.len())
            } else {
                0
            };
            let (matched, rest) = name.split_at(split);

            Line::from(vec![
                Span::styled(prefix, base.fg(Color::LightRed)),
                Span::styled(
                    matched.to_string(),
                    base.fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    rest.to_string(),
                    if is_selected {
                        base.fg(Color::White)
                    } else {
                        base.fg(Color::Gray)
                    },
                ),
            ])
        })
        .collect();

    app.suggestions_area = if lines.is_empty() {
        None
    } else {
        Some(Rect {
            height: area.height.min(lines.len() as u16),
            ..area
        })
    };

    frame.render_widget(Paragraph::new(lines), area);
}

/// Render index state + shortcuts
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);

    let line = match &app.index_state {
        IndexState::Loading { started_at } => Line::from(vec![Span::styled(
            format!("  {} Loading moves...", spinner_frame(*started_at)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::DIM),
        )]),
        IndexState::Failed(message) => Line::from(vec![
            Span::styled(
                format!(
                    "  {}",
                    truncate_text(message, (area.width as usize).saturating_sub(16))
                ),
                Style::default().fg(Color::Red),
            ),
            Span::styled("  ctrl-r retry", dim),
        ]),
        IndexState::Ready(index) => Line::from(vec![
            Span::styled(format!("  {} moves", index.len()), dim),
            Span::styled("  ↑↓ select · enter look up · esc quit", dim),
        ]),
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the toast notification line (below status bar)
fn render_toast_line(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(ref toast) = app.toast {
        let bracket = Style::default().fg(Color::DarkGray);
        let toast_style = if toast.is_error {
            Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::Blue).add_modifier(Modifier::DIM)
        };

        let max = (area.width as usize).saturating_sub(3);
        let spans = vec![
            Span::styled("  [", bracket),
            Span::styled(truncate_text(&toast.message, max), toast_style),
            Span::styled("]", bracket),
        ];

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Render the result area: loading, error, or one card per Pokémon
fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let result = app.coordinator.area();
    let title = match result.owner {
        Some(ref name) => format!(" {} ", name),
        None => " movedex ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    if let Some(ref err) = result.error {
        lines.push(Line::from(Span::styled(
            format!(" ✖ {}", err),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::default());
    }

    if result.loading {
        let started = app.session_started.unwrap_or_else(Instant::now);
        lines.push(Line::from(Span::styled(
            format!(" {} Loading...", spinner_frame(started)),
            Style::default().fg(Color::Yellow),
        )));
    } else if !result.cards.is_empty() {
        for card in &result.cards {
            lines.extend(card.to_tui_lines(Style::default()));
            lines.push(Line::default());
        }
    } else if result.error.is_none() {
        lines.push(Line::from(Span::styled(
            " Type a move name and press Enter",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Content may have shrunk since the last scroll
    let max_scroll = wrapped_height(&lines, inner.width).saturating_sub(inner.height);
    let scroll = app.results_scroll.min(max_scroll);

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(para, inner);

    app.results_max_scroll = max_scroll;
    app.results_scroll = scroll;
}

/// Rows `lines` occupy once wrapped to `width` columns
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    rows.min(u16::MAX as usize) as u16
}

/// Fit `text` into `max_width` terminal columns, marking a cut with `…`
fn truncate_text(text: &str, max_width: usize) -> Cow<'_, str> {
    if text.width() <= max_width {
        return Cow::Borrowed(text);
    }

    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let kept: String = text
        .chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    Cow::Owned(kept + "…")
}

/// Quarter-circle spinner, one step per 120ms
fn spinner_frame(started_at: Instant) -> char {
    const FRAMES: [char; 4] = ['◐', '◓', '◑', '◒'];
    let step = started_at.elapsed().as_millis() / 120;
    FRAMES[(step % FRAMES.len() as u128) as usize]
}

pub fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}µs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(format_duration(Duration::from_micros(12_345)), "12.3ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_wrapped_height() {
        let lines = vec![
            Line::from("a".repeat(25)),
            Line::default(),
            Line::from("short"),
        ];
        assert_eq!(wrapped_height(&lines, 10), 5);
        assert_eq!(wrapped_height(&lines, 80), 3);
        assert_eq!(wrapped_height(&[], 80), 0);
    }

    #[test]
    fn test_truncate_text() {
        assert!(matches!(truncate_text("surf", 10), Cow::Borrowed("surf")));
        assert_eq!(truncate_text("thunder-punch", 10), "thunder-p…");
        // Wide chars count as two columns
        assert_eq!(truncate_text("ポケモンずかん", 9), "ポケモン…");
        assert_eq!(truncate_text("surf", 0), "…");
    }
}
