//! Typed in-process publish/subscribe for world events.

use std::collections::{BTreeMap, BTreeSet};

use dreamplaza_core::{Event, EventKind};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Subscriber {
    kinds: BTreeSet<EventKind>,
    pending: Vec<Event>,
}

impl Subscriber {
    fn accepts(&self, event: &Event) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&event.kind())
    }
}

/// Broadcasts event batches to every interested subscriber.
///
/// Delivery is fire-and-forget: each subscriber owns a queue that buffers
/// matching events until it is drained.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
    next_id: u64,
}

impl EventBus {
    /// Creates a bus without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in the provided kinds; an empty slice means every kind.
    ///
    /// Matching events queue until [`Self::drain`] is called and the queue is
    /// not bounded, so subscribers must drain regularly or
    /// [`Self::unsubscribe`] once they stop reading.
    pub fn subscribe(&mut self, kinds: &[EventKind]) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let _ = self.subscribers.insert(
            id,
            Subscriber {
                kinds: kinds.iter().copied().collect(),
                pending: Vec::new(),
            },
        );
        id
    }

    /// Removes a subscription, discarding anything it had not drained.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Queues each event for every subscriber whose filter accepts it.
    pub fn publish(&mut self, events: &[Event]) {
        for subscriber in self.subscribers.values_mut() {
            for event in events {
                if subscriber.accepts(event) {
                    subscriber.pending.push(event.clone());
                }
            }
        }
    }

    /// Takes every event queued for the subscription, oldest first.
    ///
    /// Unknown or removed subscriptions yield nothing.
    pub fn drain(&mut self, id: SubscriptionId) -> Vec<Event> {
        self.subscribers
            .get_mut(&id)
            .map(|subscriber| std::mem::take(&mut subscriber.pending))
            .unwrap_or_default()
    }

    /// Number of events queued for the subscription and not yet drained.
    #[must_use]
    pub fn pending(&self, id: SubscriptionId) -> usize {
        self.subscribers
            .get(&id)
            .map_or(0, |subscriber| subscriber.pending.len())
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Reports whether nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
