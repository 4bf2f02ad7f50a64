//! Serialized action store
//!
//! # Architecture
//!
//! ```text
//! producers ──submit──▶ mpsc queue ──▶ consumer loop
//!                                        │ reduce(state, action)
//!                                        │ publish (watch)
//!                                        │ emit StoreEvent (broadcast)
//!                                        └ EffectRunner ──▶ Library / PlaybackControl
//!                                                 │
//!                       follow-up actions ◀───────┘
//! ```
//!
//! A single task owns the state. Producers only ever see published
//! snapshots of it, so concurrent submissions are applied one at a time in
//! the order they were accepted.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libvidqueue::library::memory::MemoryLibrary;
//! use libvidqueue::playback::LogPlayback;
//! use libvidqueue::store::{Action, Store, StoreOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::spawn(
//!     StoreOptions::default(),
//!     Arc::new(MemoryLibrary::new()),
//!     Arc::new(LogPlayback),
//! );
//!
//! store.dispatcher().submit(Action::Initialize).await?;
//! let mut states = store.subscribe();
//! states.changed().await?;
//!
//! let final_state = store.shutdown().await;
//! println!("{:?}", final_state.playlists);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::error;

use crate::config::Config;
use crate::library::Library;
use crate::playback::PlaybackControl;

pub mod action;
pub mod dispatcher;
pub mod effects;
pub mod events;
pub mod policy;
pub mod reducer;
pub mod shutdown;
pub mod snapshot;
pub mod state;

pub use action::Action;
pub use dispatcher::Dispatcher;
pub use effects::EffectRunner;
pub use events::{EventBus, EventReceiver, StoreEvent};
pub use policy::HistoryEffect;
pub use reducer::reduce;
pub use shutdown::ShutdownHandle;
pub use snapshot::Snapshot;
pub use state::{PlaylistsState, QueueState, RootState, HISTORY_LIMIT, NOTIFICATION_LIMIT};

use dispatcher::Consumer;

const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Runtime knobs of a store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub queue_capacity: usize,
    pub drain_on_shutdown: bool,
    /// Zero disables automatic dismissal
    pub notification_ttl: Duration,
    pub event_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from(&Config::default_config())
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            queue_capacity: config.dispatcher.queue_capacity,
            drain_on_shutdown: config.dispatcher.drain_on_shutdown,
            notification_ttl: config.notifications.ttl(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

pub struct Store {
    dispatcher: Dispatcher,
    states: watch::Receiver<Arc<RootState>>,
    events: EventBus,
    shutdown: ShutdownHandle,
    consumer: JoinHandle<Arc<RootState>>,
}

impl Store {
    /// Start the consumer loop on the current tokio runtime
    pub fn spawn(
        options: StoreOptions,
        library: Arc<dyn Library>,
        playback: Arc<dyn PlaybackControl>,
    ) -> Self {
        Self::spawn_with_state(options, RootState::new(), library, playback)
    }

    /// Like [`Store::spawn`] but starting from `initial` instead of an empty state
    pub fn spawn_with_state(
        options: StoreOptions,
        initial: RootState,
        library: Arc<dyn Library>,
        playback: Arc<dyn PlaybackControl>,
    ) -> Self {
        let shutdown = ShutdownHandle::new();
        let (dispatcher, receiver) =
            Dispatcher::channel(options.queue_capacity.max(1), shutdown.clone());
        let (publisher, states) = watch::channel(Arc::new(initial));
        let events = EventBus::new(options.event_capacity.max(1));
        let effects = EffectRunner::new(
            library,
            playback,
            dispatcher.clone(),
            options.notification_ttl,
        );

        let consumer = Consumer::new(
            receiver,
            publisher,
            events.clone(),
            effects,
            shutdown.clone(),
            options.drain_on_shutdown,
        );

        Self {
            dispatcher,
            states,
            events,
            shutdown,
            consumer: tokio::spawn(consumer.run()),
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Receiver of every published state; starts at the current one
    pub fn subscribe(&self) -> watch::Receiver<Arc<RootState>> {
        self.states.clone()
    }

    /// Diagnostic events emitted after this call
    pub fn events(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Latest published state
    pub fn state(&self) -> Arc<RootState> {
        self.states.borrow().clone()
    }

    /// Handle that stops the store without consuming it (signal handlers)
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Stop accepting actions, let the consumer finish, return the final state
    pub async fn shutdown(self) -> Arc<RootState> {
        self.shutdown.trigger();
        match self.consumer.await {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "Store consumer task failed");
                self.states.borrow().clone()
            }
        }
    }
}
