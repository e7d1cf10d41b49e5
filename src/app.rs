use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::orchestrator::{ChatOrchestrator, ChatSnapshot, SubmitOutcome};
use crate::ui::text::byte_offset;
use crate::ui::ToastState;

/// Connection status shown in the transcript header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Ready to send messages
    Ready,
    /// Waiting for the backend to answer
    Thinking,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Ready => "● Ready",
            ConnectionStatus::Thinking => "● Thinking...",
        }
    }
}

/// Scroll position of the transcript, counted in lines from the bottom.
///
/// An offset of zero follows the newest message.
#[derive(Debug, Default)]
pub struct ScrollState {
    pub offset: usize,
    /// Largest useful offset, updated on every render
    pub max_offset: usize,
}

impl ScrollState {
    /// Scroll toward older messages.
    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = (self.offset + lines).min(self.max_offset);
    }

    /// Scroll toward newer messages.
    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    /// Jump to the first message.
    pub fn scroll_to_top(&mut self) {
        self.offset = self.max_offset;
    }

    /// Jump back to the newest message.
    pub fn scroll_to_bottom(&mut self) {
        self.offset = 0;
    }

    /// Record how far the transcript can scroll and clamp the offset.
    pub fn update(&mut self, total_lines: usize, visible_lines: usize) {
        self.max_offset = total_lines.saturating_sub(visible_lines);
        self.offset = self.offset.min(self.max_offset);
    }
}

/// Terminal front-end state. Everything chat-related is read from the
/// orchestrator's snapshots; only cursor, scroll and toasts live here.
pub struct App {
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Latest snapshot received from the orchestrator
    pub snapshot: ChatSnapshot,
    /// Cursor position in the input, in chars
    pub cursor_position: usize,
    pub scroll: ScrollState,
    pub toasts: ToastState,
    /// Hint shown while the input is empty
    pub input_hint: String,
    last_notice_id: Option<u64>,
}

impl App {
    /// Create a new App observing the given orchestrator.
    pub fn new(orchestrator: Arc<ChatOrchestrator>, config: &Config) -> Self {
        let snapshot = orchestrator.snapshot();
        Self {
            orchestrator,
            snapshot,
            cursor_position: 0,
            scroll: ScrollState::default(),
            toasts: ToastState::default(),
            input_hint: config.chat.input_hint.clone(),
            last_notice_id: None,
        }
    }

    /// Take in a new snapshot: raise a toast for a new notice and keep the
    /// cursor inside the input.
    pub fn apply_snapshot(&mut self, snapshot: ChatSnapshot) {
        if let Some(notice) = &snapshot.notice {
            if self.last_notice_id != Some(notice.id) {
                self.last_notice_id = Some(notice.id);
                self.toasts.error(notice.message.clone());
            }
        }

        if snapshot.messages.len() != self.snapshot.messages.len() {
            self.scroll.scroll_to_bottom();
        }

        self.cursor_position = self.cursor_position.min(snapshot.input_value.chars().count());
        self.snapshot = snapshot;
    }

    /// Pull the current snapshot straight from the orchestrator.
    pub fn refresh(&mut self) {
        let snapshot = self.orchestrator.snapshot();
        self.apply_snapshot(snapshot);
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.snapshot.is_busy {
            ConnectionStatus::Thinking
        } else {
            ConnectionStatus::Ready
        }
    }

    pub fn input(&self) -> &str {
        &self.snapshot.input_value
    }

    /// Handle a character input.
    pub fn handle_char(&mut self, c: char) {
        let mut input = self.snapshot.input_value.clone();
        input.insert(byte_offset(&input, self.cursor_position), c);
        if self.edit_input(input) {
            self.cursor_position += 1;
        }
    }

    /// Handle backspace key.
    pub fn handle_backspace(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let mut input = self.snapshot.input_value.clone();
        input.remove(byte_offset(&input, self.cursor_position - 1));
        if self.edit_input(input) {
            self.cursor_position -= 1;
        }
    }

    /// Move cursor left.
    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.snapshot.input_value.chars().count() {
            self.cursor_position += 1;
        }
    }

    fn edit_input(&mut self, input: String) -> bool {
        if !self.orchestrator.set_input_value(input.clone()) {
            return false;
        }
        self.snapshot.input_value = input;
        true
    }

    /// Submit the current input in the background.
    ///
    /// Returns `None` when there is nothing to send or a reply is pending.
    pub fn submit(&mut self) -> Option<JoinHandle<SubmitOutcome>> {
        if self.snapshot.is_busy || self.snapshot.input_value.trim().is_empty() {
            return None;
        }

        // Busy is entered here, before the task runs, so the text sent is the
        // text on screen when Enter was pressed.
        let turn = self.orchestrator.start_input_submission();
        self.cursor_position = 0;
        self.scroll.scroll_to_bottom();
        self.refresh();
        Some(tokio::spawn(turn))
    }

    /// Tick the toast system to remove expired toasts.
    pub fn tick_toasts(&mut self) {
        self.toasts.tick()
    }
}
