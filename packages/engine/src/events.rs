//! # Event Channel
//!
//! A reference announces its state transitions through an injected
//! [`Notifier`]. The engine only decides *what* to emit and in which order;
//! delivery belongs to the notifier.
//!
//! Two notifiers ship with the crate:
//! - [`EventBus`]: named subscriptions with callbacks
//! - [`EventLog`]: records every event, for tests and tooling
//!
//! Within one engine call events are emitted in a fixed order. Nothing is
//! promised across calls.

use crate::reference::DocumentKey;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Named state transitions of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Canonical snapshot advanced (remote operation or acknowledged save)
    #[serde(rename = "canonical:change")]
    CanonicalChange,

    /// Buffered snapshot changed
    #[serde(rename = "buffer:change")]
    BufferChange,

    /// Pending tiers were reconciled but the buffered snapshot is unchanged
    #[serde(rename = "buffer:transformed")]
    BufferTransformed,

    /// Buffer moved to in-flight
    #[serde(rename = "lifecycle:saving")]
    LifecycleSaving,

    /// In-flight acknowledged and folded into canonical
    #[serde(rename = "lifecycle:saved")]
    LifecycleSaved,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::CanonicalChange,
        EventKind::BufferChange,
        EventKind::BufferTransformed,
        EventKind::LifecycleSaving,
        EventKind::LifecycleSaved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CanonicalChange => "canonical:change",
            EventKind::BufferChange => "buffer:change",
            EventKind::BufferTransformed => "buffer:transformed",
            EventKind::LifecycleSaving => "lifecycle:saving",
            EventKind::LifecycleSaved => "lifecycle:saved",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An emitted event, borrowed from the reference that emitted it
#[derive(Debug)]
pub struct SyncEvent<'a, O> {
    pub kind: EventKind,
    pub key: &'a DocumentKey,
    /// Operation that triggered the event, when there is a single one
    pub operation: Option<&'a O>,
}

/// Publish capability injected into a reference
pub trait Notifier<O>: Send + Sync {
    fn notify(&self, event: &SyncEvent<'_, O>);
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl<O> Notifier<O> for NullNotifier {
    fn notify(&self, _event: &SyncEvent<'_, O>) {}
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<O> = Arc<dyn Fn(&SyncEvent<'_, O>) + Send + Sync>;

struct Subscription<O> {
    id: SubscriptionId,
    /// `None` listens to every kind
    kind: Option<EventKind>,
    listener: Listener<O>,
}

/// Callback registry keyed by event kind
pub struct EventBus<O> {
    subscriptions: RwLock<Vec<Subscription<O>>>,
    next_id: AtomicU64,
}

impl<O> EventBus<O> {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Call `listener` for every event of `kind`
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: Fn(&SyncEvent<'_, O>) + Send + Sync + 'static,
    {
        self.register(Some(kind), Arc::new(listener))
    }

    /// Call `listener` for every event
    pub fn subscribe_all<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SyncEvent<'_, O>) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(listener))
    }

    /// Remove a subscription; returns whether it existed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.id != id);
        subscriptions.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    fn register(&self, kind: Option<EventKind>, listener: Listener<O>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.write().push(Subscription { id, kind, listener });
        id
    }
}

impl<O> Default for EventBus<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> fmt::Debug for EventBus<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<O> Notifier<O> for EventBus<O> {
    fn notify(&self, event: &SyncEvent<'_, O>) {
        // Listeners run outside the lock so they may (un)subscribe
        let listeners: Vec<Listener<O>> = self
            .subscriptions
            .read()
            .iter()
            .filter(|subscription| subscription.kind.map_or(true, |kind| kind == event.kind))
            .map(|subscription| Arc::clone(&subscription.listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }
}

/// Owned copy of an emitted event
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent<O> {
    pub kind: EventKind,
    pub key: DocumentKey,
    pub operation: Option<O>,
}

/// Records every event in emission order
#[derive(Debug)]
pub struct EventLog<O> {
    events: Mutex<Vec<RecordedEvent<O>>>,
}

impl<O: Clone> EventLog<O> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<RecordedEvent<O>> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(|event| event.kind).collect()
    }

    /// How many times `kind` was emitted
    pub fn count(&self, kind: EventKind) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind == kind)
            .count()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<RecordedEvent<O>> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl<O: Clone> Default for EventLog<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Clone + Send> Notifier<O> for EventLog<O> {
    fn notify(&self, event: &SyncEvent<'_, O>) {
        self.events.lock().push(RecordedEvent {
            kind: event.kind,
            key: event.key.clone(),
            operation: event.operation.cloned(),
        });
    }
}
