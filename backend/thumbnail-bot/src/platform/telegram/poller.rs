//! Update poller - long-polls Telegram and feeds the command router
//!
//! Each translated event is handled on its own task. Documents sent as an
//! album arrive as separate updates sharing a `media_group_id`; they are held
//! in a [`MediaGroupBuffer`] until the album stops growing and then routed as
//! a single batch.

use super::client::TelegramClient;
use super::types::{Translated, Update};
use crate::handlers::CommandRouter;
use crate::models::{ChatId, IncomingFileTransfer, UserId};
use crate::platform::InboundEvent;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Poller configuration
#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Long-poll timeout passed to `getUpdates`
    pub poll_timeout_secs: u64,
    /// Quiet period after the last album member before the album is routed
    pub media_group_window: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 30,
            media_group_window: Duration::from_millis(1500),
        }
    }
}

struct PendingGroup {
    chat: ChatId,
    user: UserId,
    transfers: Vec<IncomingFileTransfer>,
    last_seen: Instant,
}

/// Collects album members until their group goes quiet
#[derive(Default)]
pub struct MediaGroupBuffer {
    groups: HashMap<String, PendingGroup>,
}

impl MediaGroupBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn push(
        &mut self,
        group_id: String,
        chat: ChatId,
        user: UserId,
        transfer: IncomingFileTransfer,
        now: Instant,
    ) {
        let group = self.groups.entry(group_id).or_insert_with(|| PendingGroup {
            chat,
            user,
            transfers: Vec::new(),
            last_seen: now,
        });
        group.transfers.push(transfer);
        group.last_seen = now;
    }

    /// Remove and return every group that has been quiet for at least `window`
    pub fn drain_ready(&mut self, now: Instant, window: Duration) -> Vec<InboundEvent> {
        let ready: Vec<String> = self
            .groups
            .iter()
            .filter(|(_, group)| now.saturating_duration_since(group.last_seen) >= window)
            .map(|(id, _)| id.clone())
            .collect();

        ready
            .into_iter()
            .filter_map(|id| self.groups.remove(&id))
            .map(Self::into_event)
            .collect()
    }

    /// Remove and return every buffered group regardless of age
    pub fn drain_all(&mut self) -> Vec<InboundEvent> {
        self.groups
            .drain()
            .map(|(_, group)| Self::into_event(group))
            .collect()
    }

    fn into_event(group: PendingGroup) -> InboundEvent {
        InboundEvent::DocumentGroup {
            chat: group.chat,
            user: group.user,
            transfers: group.transfers,
        }
    }
}

/// Long-polling loop over `getUpdates`
pub struct UpdatePoller {
    client: Arc<TelegramClient>,
    router: Arc<CommandRouter>,
    config: PollerConfig,
    shutdown_rx: watch::Receiver<bool>,
    offset: i64,
    groups: MediaGroupBuffer,
}

impl UpdatePoller {
    pub fn new(
        client: Arc<TelegramClient>,
        router: Arc<CommandRouter>,
        config: PollerConfig,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            router,
            config,
            shutdown_rx,
            offset: 0,
            groups: MediaGroupBuffer::new(),
        }
    }

    /// Run until the shutdown signal flips to `true`
    pub async fn run(&mut self) {
        info!(
            poll_timeout_secs = self.config.poll_timeout_secs,
            "Starting update poller loop"
        );

        loop {
            // Poll briefly while an album is pending so it is routed promptly.
            let timeout = if self.groups.is_empty() {
                Duration::from_secs(self.config.poll_timeout_secs)
            } else {
                self.config.media_group_window
            };

            let client = self.client.clone();
            let polled = tokio::select! {
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping poller");
                        break;
                    }
                    None
                }

                result = client.get_updates(self.offset, timeout) => Some(result),
            };

            match polled {
                Some(Ok(updates)) => self.handle_updates(updates),
                Some(Err(e)) => {
                    error!(error = %e, "Failed to fetch updates");
                    if self.backoff_interrupted(ERROR_BACKOFF).await {
                        info!("Shutdown signal received during back-off, stopping poller");
                        break;
                    }
                }
                None => {}
            }

            for event in self
                .groups
                .drain_ready(Instant::now(), self.config.media_group_window)
            {
                self.dispatch(event);
            }
        }

        for event in self.groups.drain_all() {
            warn!("Routing buffered album before shutdown");
            self.dispatch(event);
        }

        info!("Update poller stopped");
    }

    /// Wait out `delay` unless shutdown is signalled first; returns `true` on shutdown
    async fn backoff_interrupted(&mut self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => false,
            changed = self.shutdown_rx.changed() => {
                changed.is_err() || *self.shutdown_rx.borrow()
            }
        }
    }

    fn handle_updates(&mut self, updates: Vec<Update>) {
        let now = Instant::now();
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            match message.translate() {
                Some(Translated::Event(event)) => self.dispatch(event),
                Some(Translated::GroupMember {
                    group_id,
                    chat,
                    user,
                    transfer,
                }) => {
                    debug!(group_id = %group_id, file_name = %transfer.declared_file_name, "Buffered album member");
                    self.groups.push(group_id, chat, user, transfer, now);
                }
                None => debug!(update_id = update.update_id, "Ignoring update"),
            }
        }
    }

    fn dispatch(&self, event: InboundEvent) {
        let router = self.router.clone();
        tokio::spawn(async move {
            router.dispatch(event).await;
        });
    }
}
