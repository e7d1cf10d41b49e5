use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::app::{App, ConnectionStatus};
use crate::message::{Message, Role};

use super::text::wrap_text;
use super::toast::render_toasts;

const USER_COLOR: Color = Color::Rgb(59, 130, 246);
const ASSISTANT_COLOR: Color = Color::Rgb(16, 185, 129);
const BORDER_COLOR: Color = Color::Rgb(80, 80, 100);
const HINT_COLOR: Color = Color::Rgb(110, 110, 130);

/// Indent applied to message bodies under their header line.
const BODY_INDENT: &str = "  ";

/// Main UI rendering function.
pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Transcript
            Constraint::Length(3), // Input box
        ])
        .split(f.size());

    let stamp = chrono::Local::now().format("%H:%M").to_string();
    let body_width = (chunks[0].width as usize).saturating_sub(2 + BODY_INDENT.len());
    let lines = transcript_lines(&app.snapshot.messages, body_width, &stamp);

    // Show the window of lines selected by the scroll offset (from the bottom)
    let visible = chunks[0].height.saturating_sub(2) as usize;
    app.scroll.update(lines.len(), visible);
    let end = lines.len() - app.scroll.offset;
    let start = end.saturating_sub(visible);
    let window: Vec<Line> = lines[start..end].to_vec();

    let status = app.status();
    let status_color = match status {
        ConnectionStatus::Ready => Color::Rgb(100, 255, 100),
        ConnectionStatus::Thinking => Color::Rgb(100, 200, 255),
    };

    let mut transcript_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(" Crypto Chat ")
        .title(
            Title::from(Line::from(Span::styled(
                format!(" {} ", status.label()),
                Style::default().fg(status_color),
            )))
            .alignment(Alignment::Right),
        );
    if app.scroll.offset > 0 {
        transcript_block = transcript_block.title(
            Title::from(" End: jump to latest ")
                .position(Position::Bottom)
                .alignment(Alignment::Right),
        );
    }

    f.render_widget(Paragraph::new(window).block(transcript_block), chunks[0]);

    render_input(f, app, chunks[1]);
    render_toasts(f, &app.toasts);
}

/// Build the styled transcript: a header line per message, its wrapped body
/// and a blank separator.
pub fn transcript_lines(messages: &[Message], width: usize, stamp: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for msg in messages {
        let color = match msg.role {
            Role::User => USER_COLOR,
            Role::System => ASSISTANT_COLOR,
        };

        lines.push(Line::from(vec![
            Span::styled(
                msg.role.label(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", stamp), Style::default().fg(HINT_COLOR)),
        ]));

        for line in wrap_text(&msg.content, width) {
            lines.push(Line::from(Span::raw(format!("{}{}", BODY_INDENT, line))));
        }

        lines.push(Line::from(""));
    }

    lines
}

fn render_input(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let busy = app.snapshot.is_busy;
    let input = app.input();

    let text = if input.is_empty() {
        Line::from(Span::styled(app.input_hint.clone(), Style::default().fg(HINT_COLOR)))
    } else {
        Line::from(input.to_string())
    };

    let border = if busy { HINT_COLOR } else { USER_COLOR };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Send: Enter ");

    f.render_widget(Paragraph::new(text).block(block), area);

    if !busy {
        // Keep the cursor on screen for long inputs
        let max_x = area.width.saturating_sub(2);
        let x = (app.cursor_position as u16).min(max_x);
        f.set_cursor(area.x + 1 + x, area.y + 1);
    }
}
