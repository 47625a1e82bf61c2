use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use confab_core::{
    CompositionState, ConversationId, Draft, EnterOutcome, Message, NewMessage, ReplyTicket,
    Transcript, unix_now_ms,
};

use crate::reply::{ASSISTANT_UNAVAILABLE_NOTICE, ReplySource};

/// Notifications for the render boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    MessageAppended(Message),
    CompositionStarted {
        ticket: ReplyTicket,
    },
    CompositionEnded {
        ticket: ReplyTicket,
        outcome: CompositionOutcome,
    },
    TranscriptCleared,
}

/// How a composing period ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionOutcome {
    Replied,
    Failed,
    Cancelled,
}

/// Handle to the one in-flight reply timer.
struct PendingReply {
    ticket: ReplyTicket,
    task: JoinHandle<()>,
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        // Dropping the handle must also stop the timer, otherwise a reply
        // could land in a transcript the user no longer observes.
        self.task.abort();
    }
}

struct SessionState {
    transcript: Transcript,
    composition: CompositionState,
    draft: Draft,
    active_conversation: Option<ConversationId>,
    pending_reply: Option<PendingReply>,
    next_ticket: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            composition: CompositionState::Idle,
            draft: Draft::new(),
            active_conversation: None,
            pending_reply: None,
            next_ticket: 1,
        }
    }
}

/// Wires the transcript, composition indicator, and draft together and owns
/// the delayed-reply task.
///
/// All mutations happen under one lock; the reply timer is the only
/// suspension point. At most one timer is in flight, keyed by a fresh ticket
/// per submission.
pub struct ChatCoordinator {
    state: Arc<Mutex<SessionState>>,
    reply_source: Arc<dyn ReplySource>,
    reply_delay: Duration,
    events_tx: UnboundedSender<ChatEvent>,
}

impl ChatCoordinator {
    pub fn new(
        reply_source: Arc<dyn ReplySource>,
        reply_delay: Duration,
    ) -> (Self, UnboundedReceiver<ChatEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            reply_source,
            reply_delay,
            events_tx,
        };
        (coordinator, events_rx)
    }

    pub fn draft_text(&self) -> String {
        self.lock().draft.text().to_string()
    }

    /// Replaces the draft text, as on every keystroke. No validation.
    pub fn set_draft_text(&self, text: impl Into<String>) {
        self.lock().draft.set_text(text);
    }

    pub fn attachment_panel_open(&self) -> bool {
        self.lock().draft.attachment_panel_open()
    }

    /// Flips the attachment panel and returns the new value. Independent of
    /// text and submission state.
    pub fn toggle_attachment_panel(&self) -> bool {
        self.lock().draft.toggle_attachment_panel()
    }

    pub fn is_composing(&self) -> bool {
        self.lock().composition.is_composing()
    }

    pub fn composition(&self) -> CompositionState {
        self.lock().composition
    }

    pub fn active_conversation(&self) -> Option<ConversationId> {
        self.lock().active_conversation
    }

    /// Snapshot of the transcript for the render boundary.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().transcript.messages().to_vec()
    }

    /// Enter submits, Shift+Enter inserts a newline. While a reply is pending
    /// submissions are serialized: plain Enter is ignored and the draft keeps
    /// its text.
    pub fn handle_enter(&self, shift: bool) {
        let mut state = self.lock();

        if !shift && state.composition.is_composing() {
            tracing::debug!("ignoring submit while a reply is pending");
            return;
        }

        match state.draft.handle_enter(shift) {
            EnterOutcome::Submitted(content) => self.submit_locked(&mut state, content),
            EnterOutcome::NewlineInserted | EnterOutcome::Ignored => {}
        }
    }

    /// Switches the active conversation: cancels any pending reply, clears
    /// the transcript, and resets the conversation-scoped draft.
    pub fn open_conversation(&self, conversation_id: ConversationId) {
        let mut state = self.lock();

        if state.active_conversation == Some(conversation_id) {
            return;
        }

        self.cancel_pending_locked(&mut state);
        state.active_conversation = Some(conversation_id);
        state.transcript.clear();
        state.draft = Draft::new();
        let _ = self.events_tx.send(ChatEvent::TranscriptCleared);
    }

    /// Cancels any in-flight reply, e.g. on shutdown.
    pub fn cancel_pending_reply(&self) {
        let mut state = self.lock();
        self.cancel_pending_locked(&mut state);
    }

    fn submit_locked(&self, state: &mut SessionState, content: String) {
        let user_message = match state.transcript.append(NewMessage::user(content)) {
            Ok(_) => state
                .transcript
                .last()
                .cloned()
                .expect("append just succeeded"),
            Err(error) => {
                // The draft already rejected whitespace-only text, so this is
                // unreachable in practice; recover locally regardless.
                tracing::warn!(%error, "submission rejected by transcript");
                return;
            }
        };

        // Reserve the ticket before spawning so a follow-up submission can
        // never reuse an in-flight target.
        let ticket = ReplyTicket::new(state.next_ticket);
        state.next_ticket = state.next_ticket.saturating_add(1);

        if let Err(rejection) = state.composition.begin(ticket, unix_now_ms()) {
            tracing::warn!(?rejection, "composition begin rejected");
            return;
        }

        let task = self.spawn_reply_timer(ticket, user_message.content.clone());
        state.pending_reply = Some(PendingReply { ticket, task });

        let _ = self
            .events_tx
            .send(ChatEvent::MessageAppended(user_message));
        let _ = self
            .events_tx
            .send(ChatEvent::CompositionStarted { ticket });
    }

    fn spawn_reply_timer(&self, ticket: ReplyTicket, prompt: String) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let reply_source = Arc::clone(&self.reply_source);
        let events_tx = self.events_tx.clone();
        let reply_delay = self.reply_delay;

        tokio::spawn(async move {
            tokio::time::sleep(reply_delay).await;

            let reply = reply_source.reply_to(&prompt);
            let mut state = lock_state(&state);

            if !state.composition.accepts(ticket) {
                // A conversation switch or shutdown already cancelled this
                // reply; the transcript must stay untouched.
                tracing::debug!(%ticket, "dropping stale reply timer");
                return;
            }
            state.pending_reply = None;

            let appended = reply.and_then(|text| {
                state
                    .transcript
                    .append(NewMessage::assistant(text))
                    .map(|_| ())
            });

            let outcome = match appended {
                Ok(()) => {
                    let _ = state.composition.finish(ticket);
                    CompositionOutcome::Replied
                }
                Err(error) => {
                    tracing::error!(%error, "reply generation failed");
                    let _ = state
                        .transcript
                        .append(NewMessage::assistant(ASSISTANT_UNAVAILABLE_NOTICE));
                    let _ = state.composition.fail(ticket);
                    CompositionOutcome::Failed
                }
            };

            if let Some(message) = state.transcript.last().cloned() {
                let _ = events_tx.send(ChatEvent::MessageAppended(message));
            }
            let _ = events_tx.send(ChatEvent::CompositionEnded { ticket, outcome });
        })
    }

    fn cancel_pending_locked(&self, state: &mut SessionState) {
        if let Some(pending) = state.pending_reply.take() {
            let ticket = pending.ticket;
            drop(pending);
            state.composition.cancel();
            let _ = self.events_tx.send(ChatEvent::CompositionEnded {
                ticket,
                outcome: CompositionOutcome::Cancelled,
            });
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }
}

impl Drop for ChatCoordinator {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        if let Some(pending) = state.pending_reply.take() {
            drop(pending);
            state.composition.cancel();
        }
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::{CoreError, CoreResult, Role};

    use crate::reply::{CANNED_REPLY, CannedReplies};

    const DELAY: Duration = Duration::from_millis(1000);

    struct UnavailableReplies;

    impl ReplySource for UnavailableReplies {
        fn reply_to(&self, _prompt: &str) -> CoreResult<String> {
            Err(CoreError::assistant_unavailable("backend offline"))
        }
    }

    fn canned_coordinator() -> (ChatCoordinator, UnboundedReceiver<ChatEvent>) {
        ChatCoordinator::new(Arc::new(CannedReplies), DELAY)
    }

    async fn run_past_delay() {
        tokio::time::sleep(DELAY + Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn submit_appends_user_then_assistant_after_the_delay() {
        let (coordinator, _events) = canned_coordinator();

        coordinator.set_draft_text("Hello");
        coordinator.handle_enter(false);

        let messages = coordinator.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Hello");
        assert!(coordinator.is_composing());
        assert_eq!(coordinator.draft_text(), "");

        run_past_delay().await;

        let messages = coordinator.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, CANNED_REPLY);
        assert!(!coordinator.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn whitespace_submission_mutates_nothing() {
        let (coordinator, _events) = canned_coordinator();

        coordinator.set_draft_text("  ");
        coordinator.handle_enter(false);

        assert!(coordinator.messages().is_empty());
        assert!(!coordinator.is_composing());
        assert_eq!(coordinator.draft_text(), "  ");

        run_past_delay().await;
        assert!(coordinator.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submissions_are_serialized_while_composing() {
        let (coordinator, _events) = canned_coordinator();

        coordinator.set_draft_text("first");
        coordinator.handle_enter(false);
        coordinator.set_draft_text("second");
        coordinator.handle_enter(false);

        // The second submit was ignored and its draft text kept.
        assert_eq!(coordinator.messages().len(), 1);
        assert_eq!(coordinator.draft_text(), "second");

        run_past_delay().await;

        // Exactly one reply arrived, and the draft can submit again now.
        assert_eq!(coordinator.messages().len(), 2);
        coordinator.handle_enter(false);
        assert_eq!(coordinator.messages().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shift_enter_keeps_typing_during_composition() {
        let (coordinator, _events) = canned_coordinator();

        coordinator.set_draft_text("question");
        coordinator.handle_enter(false);
        coordinator.set_draft_text("line");
        coordinator.handle_enter(true);

        assert_eq!(coordinator.draft_text(), "line\n");
        assert_eq!(coordinator.messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_conversations_cancels_the_pending_reply() {
        let (coordinator, _events) = canned_coordinator();
        coordinator.open_conversation(ConversationId::new(1));

        coordinator.set_draft_text("Hello");
        coordinator.handle_enter(false);
        assert!(coordinator.is_composing());

        coordinator.open_conversation(ConversationId::new(2));

        assert!(!coordinator.is_composing());
        assert!(coordinator.messages().is_empty());

        run_past_delay().await;

        // The cancelled timer never touched the fresh transcript.
        assert!(coordinator.messages().is_empty());
        assert_eq!(
            coordinator.active_conversation(),
            Some(ConversationId::new(2))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failing_source_appends_the_unavailable_notice() {
        let (coordinator, _events) =
            ChatCoordinator::new(Arc::new(UnavailableReplies), DELAY);

        coordinator.set_draft_text("Hello");
        coordinator.handle_enter(false);
        run_past_delay().await;

        let messages = coordinator.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, ASSISTANT_UNAVAILABLE_NOTICE);
        assert!(!coordinator.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn events_describe_the_full_submission_cycle() {
        let (coordinator, mut events) = canned_coordinator();

        coordinator.set_draft_text("Hello");
        coordinator.handle_enter(false);
        run_past_delay().await;

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }

        assert_eq!(received.len(), 4);
        assert!(
            matches!(&received[0], ChatEvent::MessageAppended(message) if message.role == Role::User)
        );
        assert!(matches!(received[1], ChatEvent::CompositionStarted { .. }));
        assert!(
            matches!(&received[2], ChatEvent::MessageAppended(message) if message.role == Role::Assistant)
        );
        assert!(matches!(
            received[3],
            ChatEvent::CompositionEnded {
                outcome: CompositionOutcome::Replied,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_coordinator_aborts_the_timer() {
        let (coordinator, mut events) = canned_coordinator();

        coordinator.set_draft_text("Hello");
        coordinator.handle_enter(false);
        drop(coordinator);

        tokio::time::sleep(DELAY * 2).await;
        tokio::task::yield_now().await;

        let mut assistant_replies = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(&event, ChatEvent::MessageAppended(message) if message.role == Role::Assistant)
            {
                assistant_replies += 1;
            }
        }
        assert_eq!(assistant_replies, 0);
    }
}
