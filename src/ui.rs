//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Focus, Page, ViewModel, queue_row};
use crate::player::TransportState;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("1/2", "browser/queue");
    map.insert("j/k", "up/down");
    map.insert("h/l", "artists/entries");
    map.insert("enter", "open/play now");
    map.insert("a", "add to queue");
    map.insert("d", "remove from queue");
    map.insert("D", "clear queue");
    map.insert("p", "play/pause");
    map.insert("-/=", "volume");
    map.insert("q", "quit");
    map
});

/// Render the controls help text for `page`.
fn controls_text(page: Page) -> String {
    let order: &[&str] = match page {
        Page::Browser => &["1/2", "j/k", "h/l", "enter", "a", "p", "-/=", "D", "q"],
        Page::Queue => &["1/2", "j/k", "d", "p", "-/=", "D", "q"],
    };
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(k).map(|v| format!("[{}] {}", k, v)))
        .collect::<Vec<String>>()
        .join(" | ")
}

fn transport_style(view: &ViewModel) -> Style {
    let color = if !view.playback_available {
        Color::Red
    } else {
        match view.transport {
            TransportState::Stopped => Color::Red,
            TransportState::Playing => Color::Green,
            TransportState::Paused => Color::Yellow,
        }
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Transport label on the left, status line on the right.
fn draw_title_row(frame: &mut Frame, area: Rect, view: &ViewModel) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let label = Paragraph::new(view.transport_label.as_str()).style(transport_style(view));
    frame.render_widget(label, halves[0]);

    let status = Paragraph::new(view.status_line.as_str())
        .bold()
        .alignment(Alignment::Right);
    frame.render_widget(status, halves[1]);
}

/// A bordered list with the usual highlight. `selected` is ignored when
/// `focused` is false so only the active pane shows a cursor.
fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: Vec<String>,
    selected: usize,
    focused: bool,
) {
    let total = rows.len();
    let items: Vec<ListItem> = rows.into_iter().map(ListItem::new).collect();
    let border_style = if focused {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {title} ")),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused && total > 0 {
        state.select(Some(selected.min(total - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_browser(frame: &mut Frame, area: Rect, app: &App) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let artists = app.artists.iter().map(|a| a.name.clone()).collect();
    render_list(
        frame,
        panes[0],
        "artists",
        artists,
        app.artist_selected,
        app.focus == Focus::Artists,
    );

    let title = app
        .directory
        .as_ref()
        .map(|d| d.name.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("entries");
    render_list(
        frame,
        panes[1],
        title,
        app.entity_rows(),
        app.entity_selected,
        app.focus == Focus::Entries,
    );
}

fn draw_queue(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
    let rows = view.queue.iter().map(queue_row).collect();
    render_list(frame, area, "queue", rows, app.queue_selected, true);
}

/// Render the entire UI into the provided `frame` using `app` state and the
/// pushed `view`.
pub fn draw(frame: &mut Frame, app: &App, view: &ViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_title_row(frame, chunks[0], view);

    match app.page {
        Page::Browser => draw_browser(frame, chunks[1], app),
        Page::Queue => draw_queue(frame, chunks[1], app, view),
    }

    let footer_line = match &view.notice {
        Some(notice) => Line::from(notice.as_str()).red(),
        None => Line::from(controls_text(app.page)),
    };
    let footer = Paragraph::new(footer_line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[2]);
}
