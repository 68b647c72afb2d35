//! Message bus - routes published messages to subscribing roles
//!
//! The bus owns every role's inbox and the publish log. A published
//! message is appended to the inbox of each role whose watch set contains
//! the message's kind, in publish order. A message matching no subscriber
//! is simply not delivered; that is not an error.
//!
//! Inboxes are touched from exactly two places: the publish/seed path here
//! and the owning role's observe path (`take_next`/`unconsume`). No other
//! component reads or writes them.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::runtime::message::{Message, MessageId, MessageKind};

/// In-run message router with per-role inboxes
#[derive(Debug, Default)]
pub struct Bus {
    next_id: u64,
    subscriptions: HashMap<String, HashSet<MessageKind>>,
    inboxes: HashMap<String, VecDeque<Message>>,
    log: Vec<Message>,
}

impl Bus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a role and its watch set
    ///
    /// Messages published after registration are delivered to the role's
    /// inbox when their kind is in `watch`.
    pub fn register(&mut self, role_id: impl Into<String>, watch: HashSet<MessageKind>) {
        let role_id = role_id.into();
        self.subscriptions.insert(role_id.clone(), watch);
        self.inboxes.entry(role_id).or_default();
    }

    /// Whether a role is registered
    pub fn is_registered(&self, role_id: &str) -> bool {
        self.subscriptions.contains_key(role_id)
    }

    fn stamp(&mut self, mut message: Message) -> Message {
        self.next_id += 1;
        message.id = MessageId(self.next_id);
        message
    }

    /// Publish a message: stamp it, log it, and fan it out to every
    /// subscribing role's inbox
    ///
    /// Returns the stamped message. Never fails; zero subscribers means
    /// zero deliveries.
    pub fn publish(&mut self, message: Message) -> Message {
        let message = self.stamp(message);

        for (role_id, watch) in &self.subscriptions {
            if watch.contains(&message.kind) {
                if let Some(inbox) = self.inboxes.get_mut(role_id) {
                    inbox.push_back(message.clone());
                }
            }
        }

        self.log.push(message.clone());
        message
    }

    /// Stamp and log a seed message without fanning it out
    ///
    /// Used for the bootstrap case where a driver hands an instruction
    /// directly to one role; the seed still gets an id and appears in the
    /// transcript so outputs can reference it as causal parent.
    pub fn record(&mut self, message: Message) -> Message {
        let message = self.stamp(message);
        self.log.push(message.clone());
        message
    }

    /// Pop the oldest undelivered message for a role (observe path)
    ///
    /// Popping marks the message consumed. Only the owning role calls this.
    pub fn take_next(&mut self, role_id: &str) -> Option<Message> {
        self.inboxes.get_mut(role_id)?.pop_front()
    }

    /// Put a message back at the front of a role's inbox
    ///
    /// Used by the retain-on-failure policy so a failed action's trigger
    /// stays eligible for retry.
    pub fn unconsume(&mut self, role_id: &str, message: Message) {
        if let Some(inbox) = self.inboxes.get_mut(role_id) {
            inbox.push_front(message);
        }
    }

    /// Number of undelivered messages waiting for a role
    pub fn inbox_len(&self, role_id: &str) -> usize {
        self.inboxes.get(role_id).map(|i| i.len()).unwrap_or(0)
    }

    /// Every message stamped this run, in publish order
    pub fn transcript(&self) -> &[Message] {
        &self.log
    }
}
