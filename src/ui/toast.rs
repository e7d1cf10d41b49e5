//! Toast notifications for failures the user should know about.
//!
//! Toasts appear in the top-right corner and auto-dismiss after a duration
//! that depends on their level.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Toast notification level determining color and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    /// Something degraded but the app keeps working (yellow)
    Warning,
    /// A request failed (red)
    Error,
}

impl ToastLevel {
    /// Get the color for this toast level.
    pub fn color(&self) -> Color {
        match self {
            ToastLevel::Warning => Color::Yellow,
            ToastLevel::Error => Color::Red,
        }
    }

    /// Get the prefix icon for this toast level.
    pub fn prefix(&self) -> &'static str {
        match self {
            ToastLevel::Warning => "[!]",
            ToastLevel::Error => "[x]",
        }
    }

    /// Get the default duration for this toast level.
    pub fn default_duration(&self) -> Duration {
        match self {
            ToastLevel::Warning => Duration::from_secs(5),
            ToastLevel::Error => Duration::from_secs(8),
        }
    }
}

/// A single toast notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    /// Create a new toast with the default duration for its level.
    pub fn new(id: u64, message: impl Into<String>, level: ToastLevel) -> Self {
        Self::with_duration(id, message, level, level.default_duration())
    }

    /// Create a new toast with a custom duration.
    pub fn with_duration(id: u64, message: impl Into<String>, level: ToastLevel, duration: Duration) -> Self {
        Self {
            id,
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration,
        }
    }

    /// Check if this toast has expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// State manager for toast notifications.
#[derive(Debug)]
pub struct ToastState {
    /// Queue of active toasts, oldest first.
    pub toasts: VecDeque<Toast>,
    next_id: u64,
    /// Maximum number of toasts to display at once.
    pub max_visible: usize,
}

impl Default for ToastState {
    fn default() -> Self {
        Self {
            toasts: VecDeque::new(),
            next_id: 0,
            max_visible: 3,
        }
    }
}

impl ToastState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new toast notification.
    pub fn push(&mut self, message: impl Into<String>, level: ToastLevel) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push_back(Toast::new(id, message, level));

        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }

        id
    }

    /// Add a warning toast.
    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(message, ToastLevel::Warning)
    }

    /// Add an error toast.
    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(message, ToastLevel::Error)
    }

    /// Remove all expired toasts. Call this on each tick.
    pub fn tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }
}

/// Shorten `message` to at most `max` chars, ending in "..." when cut.
fn truncate(message: &str, max: usize) -> String {
    if message.chars().count() <= max {
        return message.to_string();
    }
    let kept: String = message.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Render toasts in the top-right corner of the frame.
pub fn render_toasts(f: &mut Frame, toast_state: &ToastState) {
    if toast_state.is_empty() {
        return;
    }

    let frame_area = f.size();
    let toast_width = 50u16.min(frame_area.width.saturating_sub(4));
    let toast_height = 3u16;
    let start_x = frame_area.width.saturating_sub(toast_width + 2);
    let start_y = 1u16;

    for (i, toast) in toast_state.toasts.iter().enumerate() {
        let y = start_y + (i as u16) * toast_height;
        if y + toast_height > frame_area.height {
            break;
        }

        let toast_area = Rect::new(start_x, y, toast_width, toast_height);
        f.render_widget(Clear, toast_area);

        let color = toast.level.color();
        let prefix = toast.level.prefix();
        let max_msg_len = (toast_width as usize).saturating_sub(prefix.len() + 5);

        let content = Line::from(vec![
            Span::styled(prefix, Style::default().fg(color)),
            Span::raw(" "),
            Span::styled(truncate(&toast.message, max_msg_len), Style::default().fg(Color::White)),
        ]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(Color::Black));

        f.render_widget(Paragraph::new(content).block(block), toast_area);
    }
}
