/**
 * Broadcast Hub
 *
 * Registry of live subscriber sessions and fan-out of task change events.
 *
 * # Ownership
 *
 * The hub is the only owner of the subscriber registry and of every
 * session's sending half. Transports (WebSocket, SSE) call `register` when a
 * client connects and get back a `Subscription` holding the receiving half;
 * dropping or unregistering it removes the session. The task service only
 * ever calls `broadcast`.
 *
 * # Delivery
 *
 * Each session has its own bounded tokio channel, chosen by `OverflowPolicy`:
 *
 * - `DropOldest` - a `broadcast` channel; a lagging reader skips what was
 *   overwritten and carries on from the oldest message still held
 * - `Disconnect` - an `mpsc` channel fed with `try_send`; a full queue marks
 *   the session closing
 *
 * `broadcast` never waits on a subscriber. Sessions that are not open are
 * skipped, not removed; removal is the transport's job when it sees the close.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::shared::config::{HubConfig, OverflowPolicy};
use crate::shared::event::{ChangeEvent, LiveMessage};

/// Identifier handed to each live connection
pub type SubscriberId = Uuid;

/// Liveness of a subscriber session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Open,
    /// Still registered, no longer accepting messages
    Closing,
    /// Unregistered
    Closed,
}

/// Result of queueing one message for one subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PushOutcome {
    Queued,
    DroppedOldest,
    Overflowed,
    NotOpen,
}

/// Sending half of a session queue, kept in the registry
#[derive(Debug)]
enum Mailbox {
    Lossy(broadcast::Sender<LiveMessage>),
    Strict(mpsc::Sender<LiveMessage>),
}

/// Receiving half, owned by the `Subscription`
#[derive(Debug)]
enum Inbox {
    Lossy(broadcast::Receiver<LiveMessage>),
    Strict(mpsc::Receiver<LiveMessage>),
}

impl Inbox {
    async fn recv(&mut self, id: SubscriberId) -> Option<LiveMessage> {
        match self {
            Self::Strict(rx) => rx.recv().await,
            Self::Lossy(rx) => loop {
                match rx.recv().await {
                    Ok(message) => return Some(message),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("[Hub] Subscriber {} lagged, {} messages dropped", id, skipped);
                    }
                    Err(RecvError::Closed) => return None,
                }
            },
        }
    }
}

/// Registry entry for one session
#[derive(Debug)]
struct Outbox {
    mailbox: Mailbox,
    closing: Arc<AtomicBool>,
    /// Messages the lossy channel holds before overwriting
    retained: usize,
}

impl Outbox {
    fn channel(config: &HubConfig) -> (Self, Inbox) {
        let capacity = config.subscriber_capacity.max(1);
        let closing = Arc::new(AtomicBool::new(false));
        match config.overflow {
            OverflowPolicy::DropOldest => {
                // broadcast rounds its buffer up to a power of two
                let retained = capacity.next_power_of_two();
                let (tx, rx) = broadcast::channel(retained);
                let outbox = Self {
                    mailbox: Mailbox::Lossy(tx),
                    closing,
                    retained,
                };
                (outbox, Inbox::Lossy(rx))
            }
            OverflowPolicy::Disconnect => {
                let (tx, rx) = mpsc::channel(capacity);
                let outbox = Self {
                    mailbox: Mailbox::Strict(tx),
                    closing,
                    retained: capacity,
                };
                (outbox, Inbox::Strict(rx))
            }
        }
    }

    fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    fn push(&self, message: LiveMessage) -> PushOutcome {
        if self.is_closing() {
            return PushOutcome::NotOpen;
        }
        match &self.mailbox {
            Mailbox::Lossy(tx) => {
                let lagging = tx.len() >= self.retained;
                match tx.send(message) {
                    Ok(_) if lagging => PushOutcome::DroppedOldest,
                    Ok(_) => PushOutcome::Queued,
                    Err(_) => PushOutcome::NotOpen,
                }
            }
            Mailbox::Strict(tx) => match tx.try_send(message) {
                Ok(()) => PushOutcome::Queued,
                Err(TrySendError::Full(_)) => {
                    self.closing.store(true, Ordering::Release);
                    PushOutcome::Overflowed
                }
                Err(TrySendError::Closed(_)) => PushOutcome::NotOpen,
            },
        }
    }
}

/// What happened to one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Queued for delivery
    pub delivered: usize,
    /// Skipped because the session was closing or closed
    pub skipped: usize,
    /// Queued after discarding an older message
    pub dropped_oldest: usize,
    /// Sessions closed because their queue was full
    pub disconnected: usize,
}

#[derive(Debug)]
struct HubInner {
    sessions: Mutex<HashMap<SubscriberId, Arc<Outbox>>>,
    config: HubConfig,
}

/// Shared handle to the subscriber registry
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl BroadcastHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                sessions: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Add a session and queue its connection acknowledgement
    pub fn register(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (outbox, inbox) = Outbox::channel(&self.inner.config);
        let closing = Arc::clone(&outbox.closing);
        outbox.push(LiveMessage::connected(id));

        let total = {
            let mut sessions = lock(&self.inner.sessions);
            sessions.insert(id, Arc::new(outbox));
            sessions.len()
        };
        tracing::info!("[Hub] Subscriber {} registered ({} live)", id, total);

        Subscription {
            id,
            inbox,
            closing,
            hub: self.clone(),
        }
    }

    /// Remove a session. Returns `false` if it was already gone.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let removed = lock(&self.inner.sessions).remove(&id);
        match removed {
            Some(outbox) => {
                outbox.closing.store(true, Ordering::Release);
                tracing::info!("[Hub] Subscriber {} unregistered", id);
                true
            }
            None => false,
        }
    }

    /// Queue `event` for every open session
    pub fn broadcast(&self, event: ChangeEvent) -> BroadcastReport {
        let message = LiveMessage::from(event);
        let targets: Vec<(SubscriberId, Arc<Outbox>)> = lock(&self.inner.sessions)
            .iter()
            .map(|(id, outbox)| (*id, Arc::clone(outbox)))
            .collect();

        let mut report = BroadcastReport::default();
        for (id, outbox) in targets {
            match outbox.push(message.clone()) {
                PushOutcome::Queued => report.delivered += 1,
                PushOutcome::DroppedOldest => {
                    report.dropped_oldest += 1;
                    tracing::warn!("[Hub] Subscriber {} is lagging, its oldest message was overwritten", id);
                }
                PushOutcome::Overflowed => {
                    report.disconnected += 1;
                    tracing::warn!("[Hub] Subscriber {} queue full, disconnecting", id);
                }
                PushOutcome::NotOpen => {
                    report.skipped += 1;
                    tracing::debug!("[Hub] Subscriber {} not open, skipped", id);
                }
            }
        }

        tracing::debug!(
            "[Hub] {} broadcast: {:?}",
            message.type_name(),
            report
        );
        report
    }

    /// Queue a message for one session only
    pub fn send_to(&self, id: SubscriberId, message: LiveMessage) -> bool {
        let outbox = lock(&self.inner.sessions).get(&id).map(Arc::clone);
        match outbox {
            Some(outbox) => matches!(
                outbox.push(message),
                PushOutcome::Queued | PushOutcome::DroppedOldest
            ),
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.sessions).len()
    }

    pub fn config(&self) -> HubConfig {
        self.inner.config
    }

    fn is_registered(&self, id: SubscriberId) -> bool {
        lock(&self.inner.sessions).contains_key(&id)
    }
}

/// One registered live connection.
///
/// Dropping it unregisters the session.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    inbox: Inbox,
    closing: Arc<AtomicBool>,
    hub: BroadcastHub,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn liveness(&self) -> Liveness {
        if !self.hub.is_registered(self.id) {
            Liveness::Closed
        } else if self.closing.load(Ordering::Acquire) {
            Liveness::Closing
        } else {
            Liveness::Open
        }
    }

    /// Next queued message; `None` once the session is no longer open
    pub async fn recv(&mut self) -> Option<LiveMessage> {
        if self.closing.load(Ordering::Acquire) {
            return None;
        }
        self.inbox.recv(self.id).await
    }

    /// Queue a message for this subscriber only
    pub fn send_direct(&self, message: LiveMessage) -> bool {
        self.hub.send_to(self.id, message)
    }

    /// Stop accepting messages; the transport is shutting down
    pub fn mark_closing(&self) {
        self.closing.store(true, Ordering::Release);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
