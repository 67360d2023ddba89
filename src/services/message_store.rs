//! In-memory message board.
//!
//! Messages are kept newest first. Ids are handed out by the store and are
//! strictly increasing until the store is reset.

use std::collections::VecDeque;

use crate::domain::models::{Message, MessageId, MessagePatch};

/// Ordered collection of messages keyed by id.
///
/// Single-writer: the lifecycle controller owns the store and every mutation
/// goes through it.
#[derive(Debug)]
pub struct MessageStore {
    messages: VecDeque<Message>,
    next_id: MessageId,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Insert a message at the front and assign its id.
    pub fn append(&mut self, mut message: Message) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        message.id = id;
        self.messages.push_front(message);
        id
    }

    /// Apply a patch to the message with `id`. Unknown ids are ignored.
    ///
    /// Returns whether a message was updated.
    pub fn update(&mut self, id: MessageId, patch: &MessagePatch) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// First message, newest first, matching the predicate.
    pub fn find<P>(&self, mut predicate: P) -> Option<&Message>
    where
        P: FnMut(&Message) -> bool,
    {
        self.messages.iter().find(|m| predicate(m))
    }

    /// Remove a message by id.
    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let idx = self.messages.iter().position(|m| m.id == id)?;
        self.messages.remove(idx)
    }

    /// All messages, newest first.
    pub fn all(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Owned copy of the board, newest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Whether some message other than `excluding` with exactly this text is
    /// urgent and unresolved.
    pub fn has_unresolved_urgent(&self, text: &str, excluding: MessageId) -> bool {
        self.find(|m| m.id != excluding && m.text == text && m.is_unresolved_urgent())
            .is_some()
    }

    /// Remove every message and restart ids at 1.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.next_id = 1;
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
