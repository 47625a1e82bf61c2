use snafu::ensure;

use crate::error::{CoreResult, EmptyMessageContentSnafu};
use crate::message::{Message, MessageId, NewMessage, unix_now_ms};

/// Append-only log of messages for the active conversation.
///
/// Messages are strictly ordered by insertion; there is no editing, deletion,
/// or reordering of individual entries. Ids are never reused, even across
/// `clear`.
#[derive(Debug)]
pub struct Transcript {
    messages: Vec<Message>,
    next_message_id: u64,
    last_created_at_unix_ms: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_message_id: 1,
            last_created_at_unix_ms: 0,
        }
    }

    /// Inserts at the tail. Content must be non-empty after trimming; a
    /// rejected append leaves the log untouched.
    pub fn append(&mut self, input: NewMessage) -> CoreResult<MessageId> {
        ensure!(
            !input.content.trim().is_empty(),
            EmptyMessageContentSnafu {
                stage: "append-message",
            }
        );

        let id = self.alloc_message_id();
        // Clamp so a wall-clock regression can never reorder the log.
        let created_at_unix_ms = unix_now_ms().max(self.last_created_at_unix_ms);
        self.last_created_at_unix_ms = created_at_unix_ms;

        self.messages.push(Message {
            id,
            role: input.role,
            content: input.content,
            created_at_unix_ms,
        });

        Ok(id)
    }

    /// Empties the log. Irreversible.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Ordered read-only view of every message.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn alloc_message_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_message_id);
        self.next_message_id = self.next_message_id.saturating_add(1);
        id
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
