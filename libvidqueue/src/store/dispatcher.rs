//! Action queue and the single consumer loop
//!
//! Producers hold cloned [`Dispatcher`]s and push actions onto a bounded
//! `mpsc` channel. Exactly one [`Consumer`] drains it in FIFO order and, for
//! each action, reduces, publishes the new state, emits a [`StoreEvent`] and
//! hands the transition to the effect runner. Nothing else writes state.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::action::Action;
use super::effects::EffectRunner;
use super::events::{EventBus, StoreEvent};
use super::policy;
use super::reducer::reduce;
use super::shutdown::ShutdownHandle;
use super::state::RootState;
use crate::error::DispatchError;

/// Cloneable handle for submitting actions
#[derive(Clone)]
pub struct Dispatcher {
    sender: mpsc::Sender<Action>,
    shutdown: ShutdownHandle,
}

impl Dispatcher {
    pub(crate) fn channel(
        capacity: usize,
        shutdown: ShutdownHandle,
    ) -> (Self, mpsc::Receiver<Action>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender, shutdown }, receiver)
    }

    /// Enqueue an action, waiting only while the queue is full
    ///
    /// # Errors
    ///
    /// `DispatchError::ShuttingDown` once shutdown has started
    pub async fn submit(&self, action: Action) -> Result<(), DispatchError> {
        if self.shutdown.is_triggered() {
            return Err(DispatchError::ShuttingDown);
        }
        self.sender
            .send(action)
            .await
            .map_err(|_| DispatchError::ShuttingDown)
    }

    /// Enqueue without waiting
    ///
    /// # Errors
    ///
    /// - `DispatchError::Full` when the queue is at capacity
    /// - `DispatchError::ShuttingDown` once shutdown has started
    pub fn try_submit(&self, action: Action) -> Result<(), DispatchError> {
        if self.shutdown.is_triggered() {
            return Err(DispatchError::ShuttingDown);
        }
        self.sender.try_send(action).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Full,
            mpsc::error::TrySendError::Closed(_) => DispatchError::ShuttingDown,
        })
    }

    pub fn is_accepting(&self) -> bool {
        !self.shutdown.is_triggered() && !self.sender.is_closed()
    }
}

pub(crate) struct Consumer {
    receiver: mpsc::Receiver<Action>,
    state: Arc<RootState>,
    publisher: watch::Sender<Arc<RootState>>,
    events: EventBus,
    effects: EffectRunner,
    shutdown: ShutdownHandle,
    drain_on_shutdown: bool,
    processed: u64,
}

impl Consumer {
    pub(crate) fn new(
        receiver: mpsc::Receiver<Action>,
        publisher: watch::Sender<Arc<RootState>>,
        events: EventBus,
        effects: EffectRunner,
        shutdown: ShutdownHandle,
        drain_on_shutdown: bool,
    ) -> Self {
        let state = publisher.borrow().clone();
        Self {
            receiver,
            state,
            publisher,
            events,
            effects,
            shutdown,
            drain_on_shutdown,
            processed: 0,
        }
    }

    /// Process actions until shutdown; returns the final state
    pub(crate) async fn run(mut self) -> Arc<RootState> {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.wait() => None,
                action = self.receiver.recv() => action,
            };
            match next {
                Some(action) => self.process(action),
                None => break,
            }
        }

        // No new sends succeed past this point; buffered actions remain
        self.receiver.close();

        if self.drain_on_shutdown {
            while let Some(action) = self.receiver.recv().await {
                self.process(action);
            }
        } else {
            let mut dropped = 0;
            while self.receiver.try_recv().is_ok() {
                dropped += 1;
            }
            if dropped > 0 {
                warn!(count = dropped, "Dropped queued actions at shutdown");
                self.events.emit(StoreEvent::ActionsDropped { count: dropped });
            }
        }

        info!(processed = self.processed, "Store stopped");
        self.events.emit(StoreEvent::Stopped {
            processed: self.processed,
        });
        self.state
    }

    fn process(&mut self, action: Action) {
        let prev = Arc::clone(&self.state);
        let next = Arc::new(reduce(&prev, &action));
        self.processed += 1;

        let history = policy::classify(&action);
        debug!(
            seq = self.processed,
            action = action.name(),
            ?history,
            past = next.queue.past.len(),
            future = next.queue.future.len(),
            "Processed action"
        );

        self.state = Arc::clone(&next);
        self.publisher.send_replace(Arc::clone(&next));
        self.events.emit(StoreEvent::ActionProcessed {
            seq: self.processed,
            action: action.clone(),
            history,
            past: next.queue.past.len(),
            future: next.queue.future.len(),
        });

        self.effects.run(&prev, &action, &next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_try_submit_reports_full() {
        let (dispatcher, _receiver) = Dispatcher::channel(1, ShutdownHandle::new());

        dispatcher.try_submit(Action::Initialize).unwrap();
        assert_eq!(
            dispatcher.try_submit(Action::UndoRequested),
            Err(DispatchError::Full)
        );
    }

    #[tokio::test]
    async fn test_submit_rejected_after_shutdown() {
        let shutdown = ShutdownHandle::new();
        let (dispatcher, mut receiver) = Dispatcher::channel(4, shutdown.clone());

        dispatcher.submit(Action::Initialize).await.unwrap();
        shutdown.trigger();

        assert!(!dispatcher.is_accepting());
        assert_eq!(
            dispatcher.submit(Action::UndoRequested).await,
            Err(DispatchError::ShuttingDown)
        );
        assert_eq!(
            dispatcher.try_submit(Action::UndoRequested),
            Err(DispatchError::ShuttingDown)
        );
        assert_eq!(receiver.recv().await, Some(Action::Initialize));
    }

    #[tokio::test]
    async fn test_submit_rejected_when_receiver_closed() {
        let (dispatcher, mut receiver) = Dispatcher::channel(4, ShutdownHandle::new());
        receiver.close();

        assert_eq!(
            dispatcher.submit(Action::Initialize).await,
            Err(DispatchError::ShuttingDown)
        );
    }
}
