//! Diagnostic event stream of the store
//!
//! The consumer loop emits one [`StoreEvent`] per processed action on a
//! `tokio::sync::broadcast` channel. State itself is published through the
//! watch channel; events describe what happened, for logs, tooling and tests.
//!
//! Emitting never blocks. Events are dropped when nobody listens, and a
//! lagging subscriber loses the oldest ones.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::action::Action;
use super::policy::HistoryEffect;

pub type EventReceiver = broadcast::Receiver<StoreEvent>;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// `capacity` is the per-subscriber buffer before lagging sets in
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: StoreEvent) {
        // Err only means there are no subscribers
        let _ = self.sender.send(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// One action went through the reducer and the new state was published
    ActionProcessed {
        /// 1-based position in processing order
        seq: u64,
        action: Action,
        history: HistoryEffect,
        past: usize,
        future: usize,
    },

    /// Accepted actions discarded at shutdown without processing
    ActionsDropped { count: usize },

    /// The consumer loop exited
    Stopped { processed: u64 },
}
