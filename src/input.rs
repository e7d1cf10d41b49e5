use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{backend::Backend, Terminal};
use tracing::debug;

use crate::app::App;
use crate::config::Config;
use crate::ui;

/// Result of handling a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    /// Continue running the app
    Continue,
    /// Exit the app
    Exit,
}

/// Run the main application loop.
///
/// Redraws after every terminal event, every published snapshot and every
/// tick (so toasts expire even when nothing else happens).
pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &Config,
) -> io::Result<()> {
    let page_size = config.behavior.scroll_page_size;
    let mut events = EventStream::new();
    let mut snapshots = app.orchestrator.subscribe();
    let mut tick = tokio::time::interval(Duration::from_millis(config.behavior.tick_ms.max(1)));

    loop {
        app.tick_toasts();
        terminal.draw(|f| ui::ui(f, app))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(app, key, page_size) == HandleResult::Exit {
                        return Ok(());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    // The orchestrator is gone; nothing more will happen.
                    return Ok(());
                }
                let snapshot = snapshots.borrow_and_update().clone();
                app.apply_snapshot(snapshot);
            }
            _ = tick.tick() => {}
        }
    }
}

/// Handle a key event and return whether to continue or exit.
pub fn handle_key_event(app: &mut App, key: KeyEvent, page_size: usize) -> HandleResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => {
            return HandleResult::Exit;
        }
        KeyCode::Esc => {
            return HandleResult::Exit;
        }
        KeyCode::Enter => {
            if app.submit().is_none() {
                debug!("enter ignored: input blank or reply pending");
            }
        }
        KeyCode::Char(c) => {
            app.handle_char(c);
        }
        KeyCode::Backspace => {
            app.handle_backspace();
        }
        KeyCode::Left => {
            app.move_cursor_left();
        }
        KeyCode::Right => {
            app.move_cursor_right();
        }
        KeyCode::Up => {
            app.scroll.scroll_up(1);
        }
        KeyCode::Down => {
            app.scroll.scroll_down(1);
        }
        KeyCode::PageUp => {
            app.scroll.scroll_up(page_size);
        }
        KeyCode::PageDown => {
            app.scroll.scroll_down(page_size);
        }
        KeyCode::Home => {
            app.scroll.scroll_to_top();
        }
        KeyCode::End => {
            app.scroll.scroll_to_bottom();
        }
        _ => {}
    }
    HandleResult::Continue
}
