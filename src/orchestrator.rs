//! Chat orchestration: submission, enrichment, backend call and resolution.
//!
//! `ChatOrchestrator` owns the conversation and is its only writer. Every
//! state change is published as a `ChatSnapshot` on a watch channel, which is
//! all the presentation layer ever sees.

use std::future::Future;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::{to_wire_format, BackendError, ChatBackend, WireMessage};
use crate::config::{ChatConfig, Config};
use crate::conversation::ConversationWindow;
use crate::market::MarketDataProbe;
use crate::message::Message;

/// A user-visible failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Increases with every notice, so observers can tell new ones apart.
    pub id: u64,
    pub message: String,
}

/// Read-only view of the chat published to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub is_busy: bool,
    pub input_value: String,
    /// Most recent notice, if any has been raised.
    pub notice: Option<Notice>,
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Text was empty or whitespace only
    Blank,
    /// Another submission is still in flight
    Busy,
}

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing changed.
    Rejected(RejectReason),
    /// The placeholder was replaced with the backend's reply.
    Answered,
    /// The backend failed; the placeholder was removed and a notice raised.
    RolledBack(BackendError),
}

/// Mutable state guarded by the orchestrator's lock.
#[derive(Debug)]
struct ChatState {
    conversation: ConversationWindow,
    input: String,
    busy: bool,
    pending_turn: bool,
    notice: Option<Notice>,
    next_notice_id: u64,
}

impl ChatState {
    fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            messages: self.conversation.messages().to_vec(),
            is_busy: self.busy,
            input_value: self.input.clone(),
            notice: self.notice.clone(),
        }
    }
}

/// Coordinates one chat session.
pub struct ChatOrchestrator {
    state: Mutex<ChatState>,
    snapshots: watch::Sender<ChatSnapshot>,
    backend: Arc<dyn ChatBackend>,
    probe: MarketDataProbe,
    settings: ChatConfig,
}

impl ChatOrchestrator {
    /// Create an orchestrator whose conversation starts with the greeting.
    pub fn new(backend: Arc<dyn ChatBackend>, probe: MarketDataProbe, settings: ChatConfig) -> Self {
        let state = ChatState {
            conversation: ConversationWindow::with_greeting(settings.greeting.clone()),
            input: String::new(),
            busy: false,
            pending_turn: false,
            notice: None,
            next_notice_id: 0,
        };
        let (snapshots, _) = watch::channel(state.snapshot());

        Self {
            state: Mutex::new(state),
            snapshots,
            backend,
            probe,
            settings,
        }
    }

    /// Create an orchestrator from application config.
    pub fn from_config(backend: Arc<dyn ChatBackend>, probe: MarketDataProbe, config: &Config) -> Self {
        Self::new(backend, probe, config.chat.clone())
    }

    /// Current view of the chat.
    pub fn snapshot(&self) -> ChatSnapshot {
        self.lock().snapshot()
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn input_value(&self) -> String {
        self.lock().input.clone()
    }

    /// Replace the input buffer while the user edits it.
    ///
    /// Edits are ignored while a submission is in flight. Returns whether the
    /// edit was applied.
    pub fn set_input_value(&self, text: impl Into<String>) -> bool {
        let mut state = self.lock();
        if state.busy {
            return false;
        }
        state.input = text.into();
        self.publish(&state);
        true
    }

    /// Submit whatever is currently in the input buffer.
    ///
    /// The buffer is read and cleared in the same step that enters Busy.
    pub async fn submit_input(&self) -> SubmitOutcome {
        match self.admit(None) {
            Ok((history, text)) => {
                let turn = PendingTurn { orchestrator: self };
                Self::complete(turn, history, &text).await
            }
            Err(reason) => SubmitOutcome::Rejected(reason),
        }
    }

    /// Submit a user message and wait until it is answered or rolled back.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        match self.admit(Some(text)) {
            Ok((history, text)) => {
                let turn = PendingTurn { orchestrator: self };
                Self::complete(turn, history, &text).await
            }
            Err(reason) => SubmitOutcome::Rejected(reason),
        }
    }

    /// Admit the input buffer right away and return the rest of the turn as
    /// an owned future, ready for `tokio::spawn`.
    ///
    /// Busy is entered before this returns, so edits made before the future
    /// is first polled are ignored. Dropping the future unpolled rolls the
    /// turn back.
    pub fn start_input_submission(
        self: &Arc<Self>,
    ) -> impl Future<Output = SubmitOutcome> + Send + 'static {
        let admitted = self.admit(None).map(|(history, text)| {
            let turn = PendingTurn {
                orchestrator: Arc::clone(self),
            };
            (turn, history, text)
        });

        async move {
            match admitted {
                Ok((turn, history, text)) => Self::complete(turn, history, &text).await,
                Err(reason) => SubmitOutcome::Rejected(reason),
            }
        }
    }

    /// Validate a submission and, if accepted, enter Busy: append the user
    /// message and the placeholder, clear the input and publish.
    ///
    /// `None` submits the input buffer. Returns the history taken before the
    /// append together with the submitted text.
    fn admit(&self, text: Option<&str>) -> Result<(Vec<Message>, String), RejectReason> {
        let mut state = self.lock();
        let text = match text {
            Some(text) => text.to_string(),
            None => state.input.clone(),
        };

        if text.trim().is_empty() {
            debug!("ignoring blank submission");
            return Err(RejectReason::Blank);
        }
        if state.busy {
            debug!("ignoring submission while busy");
            return Err(RejectReason::Busy);
        }

        let history = state
            .conversation
            .last_n(self.settings.history_window)
            .to_vec();

        state.busy = true;
        state.conversation.append(Message::user(text.clone()));
        state
            .conversation
            .append(Message::system(self.settings.placeholder.clone()));
        state.pending_turn = true;
        state.input.clear();
        self.publish(&state);

        Ok((history, text))
    }

    /// Drive an admitted turn to its end. Busy is released when `turn` drops.
    async fn complete<O>(turn: PendingTurn<O>, history: Vec<Message>, text: &str) -> SubmitOutcome
    where
        O: Deref<Target = ChatOrchestrator>,
    {
        let this: &ChatOrchestrator = &turn.orchestrator;
        info!(history = history.len(), "submitting message");

        let result = this.exchange(history, text).await;
        match result {
            Ok(reply) => {
                info!(backend = this.backend.name(), "reply received");
                turn.resolve(reply);
                SubmitOutcome::Answered
            }
            Err(e) => {
                warn!(backend = this.backend.name(), error = %e, "chat request failed");
                let notice = this.settings.failure_notice.clone();
                turn.roll_back(notice);
                SubmitOutcome::RolledBack(e)
            }
        }
    }

    /// Enrich the new message, build the outbound request and call the backend.
    async fn exchange(&self, history: Vec<Message>, text: &str) -> Result<String, BackendError> {
        let insight = self.probe.detect_and_quote(text).await;
        let outbound = build_outbound(&history, text, &insight);
        self.backend.chat(outbound).await
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ChatState) {
        self.snapshots.send_replace(state.snapshot());
    }
}

/// Build the wire payload: prior history, then the enriched user message.
///
/// The enriched text is case-folded and only ever exists here; the stored
/// transcript keeps what the user typed.
pub fn build_outbound(history: &[Message], text: &str, insight: &str) -> Vec<WireMessage> {
    let content = if insight.is_empty() {
        text.to_lowercase()
    } else {
        format!("{} {}", text, insight).to_lowercase()
    };

    let mut outbound = to_wire_format(history);
    outbound.push(WireMessage::from(&Message::user(content)));
    outbound
}

/// Scope guard for an in-flight submission.
///
/// Dropping it always clears Busy and publishes. If the turn was neither
/// resolved nor rolled back (a panic, or the submit future being dropped),
/// the placeholder is removed on the way out.
struct PendingTurn<O: Deref<Target = ChatOrchestrator>> {
    orchestrator: O,
}

impl<O: Deref<Target = ChatOrchestrator>> PendingTurn<O> {
    fn resolve(self, reply: String) {
        {
            let mut state = self.orchestrator.lock();
            if state.pending_turn {
                state.conversation.replace_last(Message::system(reply));
                state.pending_turn = false;
            }
        }
        // Busy is released when `self` drops here.
    }

    fn roll_back(self, notice: String) {
        {
            let mut state = self.orchestrator.lock();
            if state.pending_turn {
                state.conversation.drop_last();
                state.pending_turn = false;
            }
            let id = state.next_notice_id;
            state.next_notice_id += 1;
            state.notice = Some(Notice { id, message: notice });
        }
    }
}

impl<O: Deref<Target = ChatOrchestrator>> Drop for PendingTurn<O> {
    fn drop(&mut self) {
        let mut state = self.orchestrator.lock();
        if state.pending_turn {
            warn!("submission ended without resolution, removing placeholder");
            state.conversation.drop_last();
            state.pending_turn = false;
        }
        state.busy = false;
        self.orchestrator.publish(&state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::WireRole;

    #[test]
    fn test_build_outbound_appends_insight() {
        let history = vec![Message::system("greeting")];
        let outbound = build_outbound(&history, "what's btc worth", "Current BITCOIN price: $65000");

        assert_eq!(outbound.len(), 2);
        assert_eq!(outbound[0].role, WireRole::System);
        assert_eq!(outbound[1].role, WireRole::User);
        assert_eq!(outbound[1].content, "what's btc worth current bitcoin price: $65000");
    }

    #[test]
    fn test_build_outbound_without_insight() {
        let outbound = build_outbound(&[], "Hello There", "");
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].content, "hello there");
    }

    #[test]
    fn test_notice_ids_are_distinct() {
        let a = Notice { id: 0, message: "x".to_string() };
        let b = Notice { id: 1, message: "x".to_string() };
        assert_ne!(a, b);
    }
}
