//! Rendering
//!
//! A projection of `App` onto the frame. The only thing written back is the
//! scroll bookkeeping that depends on the frame size.

use super::app::App;
use crate::query::Record;
use crate::sanitize::strip_markup;
use crate::state_machine::state::{MessageKind, RequestStatus, Variant};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

const INPUT_PLACEHOLDER: &str = "Enter your query...";
const MAX_RESULT_ROWS: u16 = 12;

pub fn render(app: &mut App, frame: &mut Frame) {
    let results = result_lines(app);
    let results_height = if results.is_empty() {
        0
    } else {
        u16::try_from(results.len())
            .unwrap_or(u16::MAX)
            .min(MAX_RESULT_ROWS)
            + 2
    };

    let previous = previous_query_items(app);
    let previous_height = if previous.is_empty() {
        0
    } else {
        u16::try_from(previous.len()).unwrap_or(u16::MAX) + 2
    };

    let [header_area, messages_area, results_area, previous_area, status_area, input_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(results_height),
            Constraint::Length(previous_height),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    render_header(app, frame, header_area);
    render_messages(app, frame, messages_area);

    if results_height > 0 {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Results ");
        let results = Paragraph::new(Text::from(results))
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(results, results_area);
    }

    if previous_height > 0 {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Previous Queries ");
        frame.render_widget(List::new(previous).block(block), previous_area);
    }

    render_status(app, frame, status_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " NLQ ",
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} · {}", app.variant, app.endpoint)),
    ]);
    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversation ");

    let mut lines: Vec<Line> = Vec::new();
    for message in &app.state.messages {
        match message.kind {
            MessageKind::Query => {
                lines.push(Line::from(vec![
                    Span::styled(
                        "You: ",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(message.content.clone()),
                ]));
            }
            MessageKind::Response => {
                lines.push(Line::from(Span::styled(
                    "Answer:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                for line in strip_markup(&message.content).lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
        }
        lines.push(Line::default());
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No messages yet.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let messages = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

    // Scroll bookkeeping against the rows the wrapped text really takes
    let inner = block.inner(area);
    let total = u16::try_from(messages.line_count(inner.width)).unwrap_or(u16::MAX);
    app.max_scroll = total.saturating_sub(inner.height);
    if app.follow {
        app.scroll = app.max_scroll;
    } else {
        app.scroll = app.scroll.min(app.max_scroll);
    }

    frame.render_widget(messages.block(block).scroll((app.scroll, 0)), area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let line = match &app.state.status {
        RequestStatus::Loading { .. } => {
            let dots = ".".repeat(usize::from(app.animation_frame) + 1);
            Line::from(Span::styled(
                format!(" Loading{dots}"),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        }
        RequestStatus::Error { message } => Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        RequestStatus::Idle => match &app.notice {
            Some(notice) => Line::from(Span::styled(
                format!(" {notice}"),
                Style::default().fg(Color::Yellow),
            )),
            None => Line::default(),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let loading = app.state.status.is_loading();
    let border = if loading { Color::DarkGray } else { Color::Yellow };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Query ");

    let inner_width = usize::from(area.width.saturating_sub(2));
    let cursor = app.input.chars().count();
    // Keep the cursor visible by scrolling the text horizontally
    let offset = if inner_width > 0 && cursor >= inner_width {
        cursor - inner_width + 1
    } else {
        0
    };

    let text = if app.input.is_empty() {
        Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = app.input.chars().skip(offset).take(inner_width).collect();
        Span::styled(visible, Style::default().fg(Color::Cyan))
    };
    frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);

    if !loading {
        let x = u16::try_from(cursor - offset).unwrap_or(0);
        frame.set_cursor_position((area.x + x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let key = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(" Enter", key),
        Span::styled(" send ", label),
    ];
    if app.variant.supports_reset() {
        spans.push(Span::styled(" Ctrl-R", key));
        spans.push(Span::styled(" reset ", label));
    }
    spans.extend([
        Span::styled(" ↑↓/PgUp/PgDn", key),
        Span::styled(" scroll ", label),
        Span::styled(" End", key),
        Span::styled(" latest ", label),
        Span::styled(" Esc", key),
        Span::styled(" quit", label),
    ]);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Record cards for the latest answer, form variant only
fn result_lines(app: &App) -> Vec<Line<'static>> {
    if app.variant != Variant::Form {
        return Vec::new();
    }
    let Some(answer) = &app.state.response else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for (i, record) in answer.records.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.extend(record_lines(record));
    }
    lines
}

fn record_lines(record: &Record) -> impl Iterator<Item = Line<'static>> + '_ {
    record.fields.iter().map(|(key, value)| {
        Line::from(vec![
            Span::styled(
                format!("{key}: "),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
            Span::raw(strip_markup(value).into_owned()),
        ])
    })
}

/// Every query of the session, oldest first, form variant only
fn previous_query_items(app: &App) -> Vec<ListItem<'static>> {
    if app.variant != Variant::Form {
        return Vec::new();
    }
    app.state
        .previous_queries()
        .map(|q| ListItem::new(format!(" {q}")))
        .collect()
}
