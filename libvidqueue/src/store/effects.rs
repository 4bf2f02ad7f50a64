//! Effect runner
//!
//! Called by the consumer loop after a new state has been published. Looks
//! at `(prev, action, next)`, starts the collaborator call on its own task
//! and submits the outcome back to the store as an action. Collaborator
//! errors never escape: they become `OperationFailed` (or
//! `PlaylistsLoadFailed` for the listing) carrying an [`OperationError`].
//!
//! Undo and redo never reach a collaborator.
//!
//! Order writes are the exception to one-task-per-call: they go through a
//! single writer task so storage ends up with the order that was published
//! last, however long each write takes. Writes still waiting when a newer
//! one for the same playlist arrives are skipped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::action::Action;
use super::dispatcher::Dispatcher;
use super::state::RootState;
use crate::error::{EffectError, Operation, OperationError};
use crate::library::Library;
use crate::playback::PlaybackControl;
use crate::types::{PlaybackCommand, PlaylistId, VideoId};

/// Positions to store for one playlist
struct OrderWrite {
    playlist_id: PlaylistId,
    positions: Vec<(VideoId, i64)>,
}

#[derive(Clone)]
pub struct EffectRunner {
    library: Arc<dyn Library>,
    playback: Arc<dyn PlaybackControl>,
    dispatcher: Dispatcher,
    notification_ttl: Duration,
    order_writes: mpsc::UnboundedSender<OrderWrite>,
}

impl EffectRunner {
    /// A zero `notification_ttl` leaves notifications until dismissed.
    ///
    /// Must be called inside a tokio runtime: it starts the order writer.
    pub fn new(
        library: Arc<dyn Library>,
        playback: Arc<dyn PlaybackControl>,
        dispatcher: Dispatcher,
        notification_ttl: Duration,
    ) -> Self {
        let (order_writes, pending) = mpsc::unbounded_channel();
        tokio::spawn(write_orders(
            Arc::clone(&library),
            dispatcher.clone(),
            pending,
        ));

        Self {
            library,
            playback,
            dispatcher,
            notification_ttl,
            order_writes,
        }
    }

    pub fn run(&self, prev: &RootState, action: &Action, next: &RootState) {
        if action.is_history() {
            return;
        }

        self.schedule_dismissals(prev, next);

        match action {
            Action::Initialize => {
                let library = Arc::clone(&self.library);
                self.spawn(async move {
                    Some(match library.load_playlists().await {
                        Ok(playlists) => {
                            info!(count = playlists.len(), "Loaded playlists");
                            Action::PlaylistsLoaded(playlists)
                        }
                        Err(e) => Action::PlaylistsLoadFailed(failed(Operation::LoadPlaylists, e)),
                    })
                });
            }

            Action::SelectPlaylist(playlist_id) => {
                let library = Arc::clone(&self.library);
                let playlist_id = playlist_id.clone();
                self.spawn(async move {
                    Some(match library.load_playlist(&playlist_id).await {
                        Ok(videos) => {
                            info!(playlist = %playlist_id, count = videos.len(), "Loaded playlist");
                            Action::PlaylistLoaded {
                                playlist_id,
                                videos,
                            }
                        }
                        Err(e) => Action::OperationFailed(failed(Operation::LoadPlaylist, e)),
                    })
                });
            }

            Action::CreatePlaylistRequested(new) => {
                let library = Arc::clone(&self.library);
                let new = new.clone();
                self.spawn(async move {
                    Some(match library.create_playlist(&new).await {
                        Ok(playlist) => {
                            info!(
                                playlist = %playlist.id,
                                name = %playlist.name,
                                "Created playlist"
                            );
                            Action::PlaylistCreated(playlist)
                        }
                        Err(e) => Action::OperationFailed(failed(Operation::CreatePlaylist, e)),
                    })
                });
            }

            Action::AddVideoRequested(new) => {
                let library = Arc::clone(&self.library);
                let new = new.clone();
                self.spawn(async move {
                    Some(match library.add_video(&new).await {
                        Ok(item) => {
                            info!(
                                playlist = %item.playlist_id,
                                video = %item.video_ref,
                                "Added video"
                            );
                            Action::VideoAdded(item)
                        }
                        Err(e) => Action::OperationFailed(failed(Operation::AddVideo, e)),
                    })
                });
            }

            Action::SelectVideo { index, autoplay } => {
                if !*autoplay || next.queue.current_index != Some(*index) {
                    return;
                }
                if let Some(video) = next.queue.current_video() {
                    self.control(PlaybackCommand::Play(video.video_ref.clone()));
                }
            }

            Action::ReorderVideo { .. } | Action::ShuffleQueue { .. } => {
                if Arc::ptr_eq(&prev.queue.videos, &next.queue.videos) {
                    return;
                }
                let Some(playlist_id) = next.queue.selected_playlist_id.clone() else {
                    return;
                };
                let positions: Vec<(VideoId, i64)> = next
                    .queue
                    .videos
                    .iter()
                    .map(|v| (v.id.clone(), v.position))
                    .collect();
                let write = OrderWrite {
                    playlist_id,
                    positions,
                };
                if self.order_writes.send(write).is_err() {
                    debug!("Order writer stopped, skipping write");
                }
            }

            Action::PlaybackRequested(command) => self.control(command.clone()),

            Action::PlaylistsLoaded(_)
            | Action::PlaylistsLoadFailed(_)
            | Action::PlaylistLoaded { .. }
            | Action::PlaylistCreated(_)
            | Action::VideoAdded(_)
            | Action::PlayerStateChanged(_)
            | Action::UndoRequested
            | Action::RedoRequested
            | Action::OperationFailed(_)
            | Action::DismissNotification(_) => {}
        }
    }

    fn control(&self, command: PlaybackCommand) {
        let playback = Arc::clone(&self.playback);
        self.spawn(async move {
            match playback.control(&command).await {
                Ok(()) => None,
                Err(e) => Some(Action::OperationFailed(failed(Operation::ControlPlayback, e))),
            }
        });
    }

    /// Start a dismiss timer for every notification added by this transition
    fn schedule_dismissals(&self, prev: &RootState, next: &RootState) {
        if self.notification_ttl.is_zero() {
            return;
        }

        for notification in next
            .notifications
            .iter()
            .filter(|n| n.id.0 >= prev.next_notification_id)
        {
            let id = notification.id;
            let ttl = self.notification_ttl;
            let dispatcher = self.dispatcher.clone();
            tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                submit_follow_up(&dispatcher, Action::DismissNotification(id)).await;
            });
        }
    }

    fn spawn<F>(&self, effect: F)
    where
        F: Future<Output = Option<Action>> + Send + 'static,
    {
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            if let Some(follow_up) = effect.await {
                submit_follow_up(&dispatcher, follow_up).await;
            }
        });
    }
}

/// Store queued orders one at a time, in submission order
async fn write_orders(
    library: Arc<dyn Library>,
    dispatcher: Dispatcher,
    mut pending: mpsc::UnboundedReceiver<OrderWrite>,
) {
    while let Some(first) = pending.recv().await {
        let mut batch = vec![first];
        while let Ok(write) = pending.try_recv() {
            batch.retain(|w| w.playlist_id != write.playlist_id);
            batch.push(write);
        }

        for write in batch {
            match library
                .persist_reorder(&write.playlist_id, &write.positions)
                .await
            {
                Ok(()) => debug!(
                    playlist = %write.playlist_id,
                    count = write.positions.len(),
                    "Persisted order"
                ),
                Err(e) => {
                    let failure = failed(Operation::PersistReorder, e);
                    submit_follow_up(&dispatcher, Action::OperationFailed(failure)).await;
                }
            }
        }
    }
}

fn failed(operation: Operation, error: EffectError) -> OperationError {
    warn!(%operation, category = %error.category(), error = %error, "Effect failed");
    OperationError::new(operation, error)
}

async fn submit_follow_up(dispatcher: &Dispatcher, action: Action) {
    let name = action.name();
    if let Err(e) = dispatcher.submit(action).await {
        debug!(action = name, error = %e, "Dropped follow-up action");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::memory::MemoryLibrary;
    use crate::playback::mock::MockPlayback;
    use crate::store::reducer::reduce;
    use crate::store::shutdown::ShutdownHandle;
    use crate::types::{NewPlaylist, PlaylistId};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    struct Harness {
        library: Arc<MemoryLibrary>,
        playback: MockPlayback,
        runner: EffectRunner,
        receiver: mpsc::Receiver<Action>,
        shutdown: ShutdownHandle,
    }

    fn harness(ttl: Duration) -> Harness {
        let library = Arc::new(MemoryLibrary::new());
        let playback = MockPlayback::new();
        let shutdown = ShutdownHandle::new();
        let (dispatcher, receiver) = Dispatcher::channel(16, shutdown.clone());
        let runner = EffectRunner::new(
            library.clone(),
            Arc::new(playback.clone()),
            dispatcher,
            ttl,
        );
        Harness {
            library,
            playback,
            runner,
            receiver,
            shutdown,
        }
    }

    /// Reduce, run effects, and return the new state
    fn step(h: &Harness, state: &RootState, action: Action) -> RootState {
        let next = reduce(state, &action);
        h.runner.run(state, &action, &next);
        next
    }

    async fn follow_up(h: &mut Harness) -> Action {
        timeout(Duration::from_secs(1), h.receiver.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_loads_playlists() {
        let mut h = harness(Duration::ZERO);
        let playlist = h.library.seed_playlist("Seeded");

        step(&h, &RootState::new(), Action::Initialize);

        assert_eq!(follow_up(&mut h).await, Action::PlaylistsLoaded(vec![playlist]));
    }

    #[tokio::test]
    async fn test_listing_failure_becomes_load_failed() {
        let mut h = harness(Duration::ZERO);
        h.library.fail(
            Operation::LoadPlaylists,
            EffectError::Transient("locked".to_string()),
        );

        step(&h, &RootState::new(), Action::Initialize);

        match follow_up(&mut h).await {
            Action::PlaylistsLoadFailed(e) => {
                assert_eq!(e.operation, Operation::LoadPlaylists);
                assert!(e.error.is_retryable());
            }
            other => panic!("unexpected follow-up: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_validation_failure_becomes_operation_failed() {
        let mut h = harness(Duration::ZERO);

        step(
            &h,
            &RootState::new(),
            Action::CreatePlaylistRequested(NewPlaylist {
                name: " ".to_string(),
                description: None,
            }),
        );

        match follow_up(&mut h).await {
            Action::OperationFailed(e) => assert_eq!(e.operation, Operation::CreatePlaylist),
            other => panic!("unexpected follow-up: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reorder_persists_new_positions() {
        let mut h = harness(Duration::ZERO);
        let playlist = h.library.seed_playlist("Order");
        let a = h.library.seed_video(&playlist.id, "dQw4w9WgXcQ", "a");
        let b = h.library.seed_video(&playlist.id, "dQw4w9WgXcQ", "b");

        let s0 = reduce(&RootState::new(), &Action::SelectPlaylist(playlist.id.clone()));
        let s1 = reduce(
            &s0,
            &Action::PlaylistLoaded {
                playlist_id: playlist.id.clone(),
                videos: vec![a.clone(), b.clone()],
            },
        );
        step(&h, &s1, Action::ReorderVideo { from: 0, to: 1 });

        // Success produces no follow-up; wait for the write to land
        timeout(Duration::from_secs(1), async {
            while h.library.persisted_reorders().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let (id, positions) = h.library.persisted_reorders().remove(0);
        assert_eq!(id, playlist.id);
        assert_eq!(positions, vec![(b.id, 0), (a.id, 1)]);
        assert!(h.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_order_write_becomes_operation_failed() {
        let mut h = harness(Duration::ZERO);
        let playlist = h.library.seed_playlist("Order");
        let a = h.library.seed_video(&playlist.id, "dQw4w9WgXcQ", "a");
        let b = h.library.seed_video(&playlist.id, "dQw4w9WgXcQ", "b");
        h.library.fail(
            Operation::PersistReorder,
            EffectError::Transient("database is locked".to_string()),
        );

        let s0 = reduce(&RootState::new(), &Action::SelectPlaylist(playlist.id.clone()));
        let s1 = reduce(
            &s0,
            &Action::PlaylistLoaded {
                playlist_id: playlist.id.clone(),
                videos: vec![a, b],
            },
        );
        step(&h, &s1, Action::ReorderVideo { from: 1, to: 0 });

        match follow_up(&mut h).await {
            Action::OperationFailed(e) => {
                assert_eq!(e.operation, Operation::PersistReorder);
                assert!(e.error.is_retryable());
            }
            other => panic!("unexpected follow-up: {:?}", other),
        }
        assert_eq!(h.library.call_count(Operation::PersistReorder), 1);
    }

    #[tokio::test]
    async fn test_no_op_reorder_skips_persistence() {
        let h = harness(Duration::ZERO);
        let state = reduce(&RootState::new(), &Action::SelectPlaylist(PlaylistId::from("p")));

        step(&h, &state, Action::ReorderVideo { from: 0, to: 3 });
        tokio::task::yield_now().await;

        assert_eq!(h.library.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_autoplay_sends_play_command() {
        let h = harness(Duration::ZERO);
        let playlist = h.library.seed_playlist("Play");
        let a = h.library.seed_video(&playlist.id, "9bZkp7q19f0", "a");

        let s0 = reduce(&RootState::new(), &Action::SelectPlaylist(playlist.id.clone()));
        let s1 = reduce(
            &s0,
            &Action::PlaylistLoaded {
                playlist_id: playlist.id.clone(),
                videos: vec![a.clone()],
            },
        );
        step(
            &h,
            &s1,
            Action::SelectVideo {
                index: 0,
                autoplay: true,
            },
        );

        timeout(Duration::from_secs(1), async {
            while h.playback.commands().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(h.playback.commands(), vec![PlaybackCommand::Play(a.video_ref)]);
    }

    #[tokio::test]
    async fn test_history_actions_never_reach_collaborators() {
        let h = harness(Duration::from_millis(1));
        let state = RootState::new();

        step(&h, &state, Action::UndoRequested);
        step(&h, &state, Action::RedoRequested);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(h.library.total_calls(), 0);
        assert!(h.playback.commands().is_empty());
    }

    #[tokio::test]
    async fn test_new_notification_is_dismissed_after_ttl() {
        let mut h = harness(Duration::from_millis(10));
        let failure = OperationError::new(
            Operation::AddVideo,
            EffectError::Validation("bad".to_string()),
        );

        let next = step(&h, &RootState::new(), Action::OperationFailed(failure));
        let id = next.notifications[0].id;

        assert_eq!(follow_up(&mut h).await, Action::DismissNotification(id));
    }

    #[tokio::test]
    async fn test_follow_ups_after_shutdown_are_dropped() {
        let mut h = harness(Duration::ZERO);
        h.shutdown.trigger();

        step(&h, &RootState::new(), Action::Initialize);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(h.library.call_count(Operation::LoadPlaylists), 1);
        assert!(h.receiver.try_recv().is_err());
    }
}
