//! Broadcast hub: the single owner of the live client set.
//!
//! The hub runs as one Tokio task that drains a command queue. Register,
//! unregister and broadcast requests are applied one at a time in arrival
//! order, so membership never races a fan-out and every client sees
//! broadcasts in the order the hub processed them.
//!
//! Each client owns a bounded outbound queue. The hub is its only writer
//! and enqueues with [`try_send`](mpsc::Sender::try_send): a client whose
//! queue is full is dropped from the set on the spot, which closes its
//! queue. A broadcast never waits on any consumer.
//!
//! ```text
//! HubHandle::broadcast --> [commands] --> Hub::run --> try_send --> Subscription
//!                                                       (full => evict)
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use skywatch_types::ClientId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::event::StreamEvent;

/// Errors returned by [`HubHandle`] requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    /// The hub task has stopped and accepts no more requests.
    #[error("broadcast hub is not running")]
    Closed,
}

enum Command {
    Register(ClientRegistration),
    Unregister(ClientId),
    Broadcast(Arc<StreamEvent>),
}

/// The producer half of a new client: its identity and outbound queue.
///
/// Not `Clone`, so one registration can join the hub at most once.
#[derive(Debug)]
pub struct ClientRegistration {
    id: ClientId,
    queue: mpsc::Sender<Arc<StreamEvent>>,
}

impl ClientRegistration {
    /// Create a client with a fresh bounded outbound queue.
    ///
    /// Returns the registration to hand to the hub and the consumer half
    /// of the queue.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<StreamEvent>>) {
        let (queue, outbound) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: ClientId::new(),
                queue,
            },
            outbound,
        )
    }

    /// The client's identifier.
    pub const fn id(&self) -> ClientId {
        self.id
    }
}

/// The hub actor. Owns the client set; nothing else may touch it.
pub struct Hub {
    commands: mpsc::UnboundedReceiver<Command>,
    clients: HashMap<ClientId, mpsc::Sender<Arc<StreamEvent>>>,
    client_count: Arc<AtomicUsize>,
}

impl Hub {
    /// Start the hub on a background task.
    ///
    /// `queue_capacity` is the outbound queue size given to clients opened
    /// with [`HubHandle::connect`]. The task exits once every
    /// [`HubHandle`] (including those held by live subscriptions) is
    /// dropped, closing any queues still registered.
    pub fn spawn(queue_capacity: usize) -> (HubHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client_count = Arc::new(AtomicUsize::new(0));
        let hub = Self {
            commands: rx,
            clients: HashMap::new(),
            client_count: Arc::clone(&client_count),
        };
        let handle = HubHandle {
            commands: tx,
            client_count,
            queue_capacity: queue_capacity.max(1),
        };
        let task = tokio::spawn(hub.run());
        (handle, task)
    }

    async fn run(mut self) {
        info!("broadcast hub started");
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Register(registration) => self.register(registration),
                Command::Unregister(id) => self.unregister(id),
                Command::Broadcast(event) => self.broadcast(&event),
            }
            self.client_count.store(self.clients.len(), Ordering::Relaxed);
        }
        self.clients.clear();
        self.client_count.store(0, Ordering::Relaxed);
        info!("broadcast hub stopped");
    }

    fn register(&mut self, registration: ClientRegistration) {
        match self.clients.entry(registration.id) {
            Entry::Vacant(slot) => {
                slot.insert(registration.queue);
                info!(client = %registration.id, "client registered");
            }
            Entry::Occupied(_) => {
                warn!(client = %registration.id, "duplicate registration ignored");
            }
        }
    }

    /// Removing the sender closes the queue; a second request for the
    /// same id finds nothing and does nothing.
    fn unregister(&mut self, id: ClientId) {
        if self.clients.remove(&id).is_some() {
            info!(client = %id, "client unregistered");
        }
    }

    fn broadcast(&mut self, event: &Arc<StreamEvent>) {
        self.clients
            .retain(|id, queue| match queue.try_send(Arc::clone(event)) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(client = %id, kind = %event.kind(), "send queue full, unregistering slow client");
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(client = %id, "client queue already closed, unregistering");
                    false
                }
            });
    }
}

/// Cheap, cloneable handle for sending requests to the [`Hub`].
///
/// Every method enqueues without waiting; the hub applies requests in the
/// order they were enqueued.
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<Command>,
    client_count: Arc<AtomicUsize>,
    queue_capacity: usize,
}

impl HubHandle {
    /// Open a new client: create its queue and request registration.
    ///
    /// On success the returned [`Subscription`] is registered (from the
    /// hub's point of view, as of this request) and will unregister
    /// itself when dropped. On failure nothing joined the hub.
    pub fn connect(&self) -> Result<Subscription, HubError> {
        let (registration, outbound) = ClientRegistration::new(self.queue_capacity);
        let id = registration.id();
        self.register(registration)?;
        Ok(Subscription {
            id,
            outbound,
            hub: self.clone(),
        })
    }

    /// Add a client to the active set.
    pub fn register(&self, registration: ClientRegistration) -> Result<(), HubError> {
        self.send(Command::Register(registration))
    }

    /// Remove a client from the active set and close its queue. No-op if
    /// the client is already gone.
    pub fn unregister(&self, id: ClientId) -> Result<(), HubError> {
        self.send(Command::Unregister(id))
    }

    /// Fan an event out to every client registered when the hub reaches
    /// this request.
    pub fn broadcast(&self, event: StreamEvent) -> Result<(), HubError> {
        self.send(Command::Broadcast(Arc::new(event)))
    }

    /// Number of registered clients as of the last request the hub applied.
    pub fn client_count(&self) -> usize {
        self.client_count.load(Ordering::Relaxed)
    }

    fn send(&self, command: Command) -> Result<(), HubError> {
        if self.commands.send(command).is_err() {
            return Err(HubError::Closed);
        }
        Ok(())
    }
}

/// The consumer side of one registered client.
///
/// Yields events in the order the hub broadcast them and ends when the hub
/// closes the queue (eviction or hub shutdown). Dropping a subscription
/// sends exactly one unregister request for its client.
#[derive(Debug)]
pub struct Subscription {
    id: ClientId,
    outbound: mpsc::Receiver<Arc<StreamEvent>>,
    hub: HubHandle,
}

impl Subscription {
    /// The client's identifier.
    pub const fn id(&self) -> ClientId {
        self.id
    }

    /// Wait for the next event. `None` once the hub has closed the queue.
    pub async fn recv(&mut self) -> Option<Arc<StreamEvent>> {
        self.outbound.recv().await
    }
}

impl Stream for Subscription {
    type Item = Arc<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.outbound.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        info!(client = %self.id, "client connection closed");
        // A stopped hub has already closed every queue.
        if self.hub.unregister(self.id).is_err() {
            debug!(client = %self.id, "hub stopped before client closed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use skywatch_types::Aircraft;

    use super::*;

    fn event(icao: &str) -> StreamEvent {
        let aircraft = Aircraft {
            icao: icao.to_owned(),
            callsign: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0,
            speed: 0.0,
            track: 0.0,
            timestamp: Utc::now(),
        };
        StreamEvent::aircraft_update(&aircraft).unwrap()
    }

    async fn wait_for_count(hub: &HubHandle, expected: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while hub.client_count() != expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn every_client_receives_broadcasts_in_order() {
        let (hub, _task) = Hub::spawn(256);
        let mut clients: Vec<Subscription> = (0..3).map(|_| hub.connect().unwrap()).collect();

        let expected = [event("M1"), event("M2"), event("M3")];
        for message in &expected {
            hub.broadcast(message.clone()).unwrap();
        }

        for client in &mut clients {
            for want in &expected {
                let got = client.recv().await.unwrap();
                assert_eq!(*got, *want);
            }
        }
        wait_for_count(&hub, 3).await;
    }

    #[tokio::test]
    async fn late_client_misses_earlier_broadcast() {
        let (hub, _task) = Hub::spawn(256);
        let mut early = hub.connect().unwrap();
        hub.broadcast(event("FIRST")).unwrap();
        let mut late = hub.connect().unwrap();
        hub.broadcast(event("SECOND")).unwrap();

        assert!(early.recv().await.unwrap().data().contains("FIRST"));
        assert!(early.recv().await.unwrap().data().contains("SECOND"));
        assert!(late.recv().await.unwrap().data().contains("SECOND"));
    }

    #[tokio::test]
    async fn saturated_client_is_evicted_without_affecting_others() {
        let (hub, _task) = Hub::spawn(256);
        let mut slow = hub.connect().unwrap();
        let mut fast = hub.connect().unwrap();

        for i in 0..256 {
            hub.broadcast(event(&format!("F{i:03}"))).unwrap();
        }
        for _ in 0..256 {
            fast.recv().await.unwrap();
        }

        // slow's queue is now full; this broadcast evicts it.
        hub.broadcast(event("OVERFLOW")).unwrap();
        assert!(fast.recv().await.unwrap().data().contains("OVERFLOW"));

        for _ in 0..256 {
            slow.recv().await.unwrap();
        }
        assert!(slow.recv().await.is_none());

        hub.broadcast(event("AFTER")).unwrap();
        assert!(fast.recv().await.unwrap().data().contains("AFTER"));
        wait_for_count(&hub, 1).await;
    }

    #[tokio::test]
    async fn unregister_closes_queue_and_repeats_are_noops() {
        let (hub, _task) = Hub::spawn(8);
        let mut client = hub.connect().unwrap();
        let other = hub.connect().unwrap();

        hub.unregister(client.id()).unwrap();
        hub.unregister(client.id()).unwrap();
        assert!(client.recv().await.is_none());

        wait_for_count(&hub, 1).await;
        drop(other);
        wait_for_count(&hub, 0).await;
    }

    #[tokio::test]
    async fn dropping_subscription_unregisters() {
        let (hub, _task) = Hub::spawn(8);
        let client = hub.connect().unwrap();
        wait_for_count(&hub, 1).await;
        drop(client);
        wait_for_count(&hub, 0).await;
    }

    #[tokio::test]
    async fn manual_registration_receives_broadcasts() {
        let (hub, _task) = Hub::spawn(8);
        let (registration, mut outbound) = ClientRegistration::new(4);
        let id = registration.id();
        hub.register(registration).unwrap();
        hub.broadcast(event("MANUAL")).unwrap();
        assert!(outbound.recv().await.unwrap().data().contains("MANUAL"));

        hub.unregister(id).unwrap();
        assert!(outbound.recv().await.is_none());
    }

    #[tokio::test]
    async fn hub_stops_when_all_handles_drop() {
        let (hub, task) = Hub::spawn(8);
        drop(hub);
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn requests_fail_after_hub_stops() {
        let (hub, task) = Hub::spawn(8);
        task.abort();
        let _ = task.await;
        assert_eq!(hub.broadcast(event("LOST")), Err(HubError::Closed));
        assert!(matches!(hub.connect(), Err(HubError::Closed)));
    }
}
