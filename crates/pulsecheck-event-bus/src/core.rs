//! Core Event Bus Implementation
//!
//! A typed, synchronous publish/subscribe registry for a single payload type:
//! - Subscription lifecycle management (subscribe/unsubscribe by token)
//! - Filtering and one-shot subscriptions
//! - Per-handler failure isolation (errors and panics are captured, logged
//!   and reported, never propagated to the publisher)
//! - Delivery statistics

use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

/// Unique identifier for event subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Statistics for event bus monitoring
#[derive(Debug, Clone, Default)]
pub struct EventBusStats {
    /// Total number of events published
    pub events_published: usize,
    /// Total number of handler invocations, failed ones included
    pub events_delivered: usize,
    /// Total number of handler invocations that returned an error or panicked
    pub handler_failures: usize,
    /// Current number of active subscriptions
    pub active_subscriptions: usize,
    /// Total number of subscriptions created
    pub total_subscriptions: usize,
}

/// Why a handler invocation failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The handler returned `Err`
    Error(String),
    /// The handler panicked
    Panic(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Error(message) => write!(f, "returned error: {}", message),
            FailureCause::Panic(message) => write!(f, "panicked: {}", message),
        }
    }
}

/// Record of one failed handler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub event: &'static str,
    pub subscription: SubscriptionId,
    pub cause: FailureCause,
}

/// Outcome of a single publish.
///
/// Failures are informational: the publish itself always succeeds.
#[derive(Debug, Clone, Default)]
pub struct EmitReport {
    /// Handlers invoked, failed ones included
    pub delivered: usize,
    pub failures: Vec<HandlerFailure>,
}

impl EmitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.delivered - self.failures.len()
    }
}

type Callback<T> = dyn Fn(&T) -> anyhow::Result<()> + Send + Sync;
type Filter<T> = dyn Fn(&T) -> bool + Send + Sync;

/// Subscriber callback with filtering support
struct Subscriber<T> {
    id: SubscriptionId,
    callback: Arc<Callback<T>>,
    filter: Option<Arc<Filter<T>>>,
    /// Set once a one-shot subscriber has been claimed by a publish
    once: Option<Arc<AtomicBool>>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
            filter: self.filter.clone(),
            once: self.once.clone(),
        }
    }
}

impl<T> Subscriber<T> {
    fn should_notify(&self, event: &T) -> bool {
        match &self.filter {
            Some(filter) => filter(event),
            None => true,
        }
    }

    /// Claims a one-shot subscriber; false if another publish already did.
    fn claim(&self) -> bool {
        match &self.once {
            Some(fired) => !fired.swap(true, Ordering::SeqCst),
            None => true,
        }
    }

    /// Runs filter and callback, containing any failure.
    ///
    /// Returns `None` when the event was filtered out or the one-shot
    /// subscriber was already used.
    fn notify(&self, event: &T) -> Option<Result<(), FailureCause>> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if !self.should_notify(event) || !self.claim() {
                return None;
            }
            Some((self.callback)(event))
        }));

        match outcome {
            Ok(None) => None,
            Ok(Some(Ok(()))) => Some(Ok(())),
            Ok(Some(Err(err))) => Some(Err(FailureCause::Error(format!("{:#}", err)))),
            Err(payload) => Some(Err(FailureCause::Panic(panic_message(payload.as_ref())))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Result of running a snapshot of subscribers against one event
struct Delivery {
    report: EmitReport,
    /// One-shot subscriptions consumed by this delivery
    expired: Vec<SubscriptionId>,
}

/// Invokes each subscriber in order. No lock is held here, so handlers may
/// subscribe, unsubscribe or publish again.
fn deliver<T>(event_name: &'static str, subscribers: &[Subscriber<T>], event: &T) -> Delivery {
    let mut report = EmitReport::default();
    let mut expired = Vec::new();

    for subscriber in subscribers {
        let Some(outcome) = subscriber.notify(event) else {
            continue;
        };
        report.delivered += 1;
        if subscriber.once.is_some() {
            expired.push(subscriber.id);
        }
        if let Err(cause) = outcome {
            log::error!(
                "[EventBus] Handler {} for '{}' {}",
                subscriber.id,
                event_name,
                cause
            );
            report.failures.push(HandlerFailure {
                event: event_name,
                subscription: subscriber.id,
                cause,
            });
        }
    }

    Delivery { report, expired }
}

/// Core event bus for one event name and payload type
pub struct EventBus<T> {
    name: &'static str,
    subscribers: Vec<Subscriber<T>>,
    stats: EventBusStats,
}

impl<T> EventBus<T> {
    /// Create a new event bus; `name` labels log lines and failure records
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: Vec::new(),
            stats: EventBusStats::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn add(
        &mut self,
        callback: Arc<Callback<T>>,
        filter: Option<Arc<Filter<T>>>,
        once: bool,
    ) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscribers.push(Subscriber {
            id,
            callback,
            filter,
            once: once.then(|| Arc::new(AtomicBool::new(false))),
        });
        self.stats.active_subscriptions += 1;
        self.stats.total_subscriptions += 1;

        log::trace!("[EventBus] New subscription to '{}': {}", self.name, id);
        id
    }

    /// Subscribe to events
    ///
    /// The callback is appended after every existing subscriber and runs on
    /// each publish until unsubscribed. Registering the same function twice
    /// yields two independent subscriptions.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add(Arc::new(callback), None, false)
    }

    /// Subscribe to events with a filter predicate
    ///
    /// Only events matching the filter will be delivered to the callback.
    pub fn subscribe_with_filter<F, P>(&mut self, callback: F, filter: P) -> SubscriptionId
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.add(
            Arc::new(callback),
            Some(Arc::new(filter) as Arc<Filter<T>>),
            false,
        )
    }

    /// Subscribe to a single event (one-shot subscription)
    ///
    /// The subscription is removed after the first delivered event.
    pub fn subscribe_once<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnOnce(&T) + Send + 'static,
        T: 'static,
    {
        let cell = Mutex::new(Some(callback));
        self.add(
            Arc::new(move |event: &T| {
                let callback = cell.lock().unwrap_or_else(PoisonError::into_inner).take();
                if let Some(callback) = callback {
                    callback(event);
                }
                Ok(())
            }),
            None,
            true,
        )
    }

    /// Unsubscribe using a subscription ID
    ///
    /// Returns true if the subscription was found and removed. Unknown IDs
    /// are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if let Some(pos) = self.subscribers.iter().position(|s| s.id == id) {
            self.subscribers.remove(pos);
            self.stats.active_subscriptions = self.stats.active_subscriptions.saturating_sub(1);
            log::trace!("[EventBus] Unsubscribed from '{}': {}", self.name, id);
            true
        } else {
            log::trace!(
                "[EventBus] Subscription {} not registered on '{}'",
                id,
                self.name
            );
            false
        }
    }

    fn begin_publish(&mut self) -> Vec<Subscriber<T>> {
        self.stats.events_published += 1;
        self.subscribers.clone()
    }

    fn finish_publish(&mut self, delivery: &Delivery) {
        self.stats.events_delivered += delivery.report.delivered;
        self.stats.handler_failures += delivery.report.failures.len();
        for id in &delivery.expired {
            self.unsubscribe(*id);
        }
        log::trace!(
            "[EventBus] Published '{}' to {} subscribers ({} failed)",
            self.name,
            delivery.report.delivered,
            delivery.report.failures.len()
        );
    }

    /// Publish an event to all subscribers in registration order
    ///
    /// Never fails: handler errors and panics are logged and returned in
    /// the report.
    pub fn publish(&mut self, event: T) -> EmitReport {
        let snapshot = self.begin_publish();
        if snapshot.is_empty() {
            return EmitReport::default();
        }
        let delivery = deliver(self.name, &snapshot, &event);
        self.finish_publish(&delivery);
        delivery.report
    }

    /// Get current statistics
    pub fn stats(&self) -> EventBusStats {
        self.stats.clone()
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Clear all subscriptions
    pub fn clear(&mut self) {
        let count = self.subscribers.len();
        self.subscribers.clear();
        self.stats.active_subscriptions = 0;
        log::info!("[EventBus] Cleared {} subscriptions from '{}'", count, self.name);
    }
}

/// Thread-safe shared handle to an [`EventBus`]
///
/// Clones share the same registry. Publishing snapshots the subscriber list
/// and releases the lock before running handlers.
pub struct EventBusContainer<T> {
    inner: Arc<Mutex<EventBus<T>>>,
}

impl<T> Clone for EventBusContainer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> EventBusContainer<T> {
    /// Create a new event bus container
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventBus::new(name))),
        }
    }

    // Handlers never run under this lock, but a panic elsewhere may still
    // poison it; the registry stays consistent either way.
    fn lock(&self) -> MutexGuard<'_, EventBus<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to events
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.lock().subscribe(callback)
    }

    /// Subscribe with a filter predicate
    pub fn subscribe_with_filter<F, P>(&self, callback: F, filter: P) -> SubscriptionId
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.lock().subscribe_with_filter(callback, filter)
    }

    /// Subscribe to a single event (one-shot)
    pub fn subscribe_once<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnOnce(&T) + Send + 'static,
        T: 'static,
    {
        self.lock().subscribe_once(callback)
    }

    /// Unsubscribe using a subscription ID
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().unsubscribe(id)
    }

    /// Publish an event
    pub fn publish(&self, event: T) -> EmitReport {
        let (name, snapshot) = {
            let mut bus = self.lock();
            (bus.name(), bus.begin_publish())
        };
        if snapshot.is_empty() {
            return EmitReport::default();
        }

        let delivery = deliver(name, &snapshot, &event);
        self.lock().finish_publish(&delivery);
        delivery.report
    }

    /// Get current statistics
    pub fn stats(&self) -> EventBusStats {
        self.lock().stats()
    }

    /// Get subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscriber_count()
    }

    /// Clear all subscriptions
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[derive(Clone, Debug, PartialEq)]
    struct TestEvent {
        id: usize,
        message: String,
    }

    fn event(id: usize) -> TestEvent {
        TestEvent {
            id,
            message: format!("event {}", id),
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Box<Callback<TestEvent>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |label: &'static str| -> Box<Callback<TestEvent>> {
            let log = log_clone.clone();
            Box::new(move |event: &TestEvent| {
                log.lock().unwrap().push(format!("{}:{}", label, event.id));
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn test_subscribe_and_publish_in_order() {
        let bus = EventBusContainer::new("test");
        let (log, make) = recorder();

        let first = make("first");
        let second = make("second");
        let third = make("third");
        bus.subscribe(move |e: &TestEvent| first(e));
        bus.subscribe(move |e: &TestEvent| second(e));
        bus.subscribe(move |e: &TestEvent| third(e));

        let report = bus.publish(event(1));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:1", "second:1", "third:1"]
        );
        assert_eq!(report.delivered, 3);
        assert!(report.is_clean());
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus: EventBusContainer<TestEvent> = EventBusContainer::new("test");

        let report = bus.publish(event(1));

        assert_eq!(report.delivered, 0);
        assert!(report.is_clean());
        assert_eq!(bus.stats().events_published, 1);
        assert_eq!(bus.stats().events_delivered, 0);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let bus: EventBusContainer<TestEvent> = EventBusContainer::new("test");
        let mut other = EventBus::<TestEvent>::new("other");
        let foreign = other.subscribe(|_| Ok(()));

        assert!(!bus.unsubscribe(foreign));
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.stats().active_subscriptions, 0);
    }

    #[test]
    fn test_failing_handler_does_not_stop_delivery() {
        let bus = EventBusContainer::new("test");
        let received = Arc::new(Mutex::new(Vec::new()));

        let failing = bus.subscribe(|_: &TestEvent| bail!("overlay unavailable"));
        let received_clone = received.clone();
        bus.subscribe(move |event: &TestEvent| {
            received_clone.lock().unwrap().push(event.clone());
            Ok(())
        });

        let report = bus.publish(event(7));

        assert_eq!(*received.lock().unwrap(), vec![event(7)]);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(
            report.failures,
            vec![HandlerFailure {
                event: "test",
                subscription: failing,
                cause: FailureCause::Error("overlay unavailable".to_string()),
            }]
        );
    }

    #[test]
    fn test_panicking_handler_is_contained() {
        let bus = EventBusContainer::new("test");
        let count = Arc::new(AtomicUsize::new(0));

        bus.subscribe(|event: &TestEvent| -> anyhow::Result<()> {
            panic!("handler blew up on {}", event.id)
        });
        let count_clone = count.clone();
        bus.subscribe(move |_: &TestEvent| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let report = bus.publish(event(3));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].cause,
            FailureCause::Panic("handler blew up on 3".to_string())
        );
        assert_eq!(bus.stats().handler_failures, 1);

        // The registry is still usable after a panic
        bus.publish(event(4));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscribe_with_filter() {
        let bus = EventBusContainer::new("test");
        let received = Arc::new(AtomicUsize::new(0));

        let received_clone = received.clone();
        bus.subscribe_with_filter(
            move |_: &TestEvent| {
                received_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            |event: &TestEvent| event.id > 5,
        );

        // Should be filtered out
        let report = bus.publish(event(3));
        assert_eq!(report.delivered, 0);

        // Should pass filter
        bus.publish(event(10));

        assert_eq!(received.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_once() {
        let bus = EventBusContainer::new("test");
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        bus.subscribe_once(move |_: &TestEvent| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(event(1));
        bus.publish(event(2));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBusContainer::new("test");
        let (log, make) = recorder();

        let kept = make("kept");
        let removed = make("removed");
        bus.subscribe(move |e: &TestEvent| kept(e));
        let sub_id = bus.subscribe(move |e: &TestEvent| removed(e));

        bus.publish(event(1));
        assert!(bus.unsubscribe(sub_id));
        bus.publish(event(2));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["kept:1", "removed:1", "kept:2"]
        );
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_same_callback_registered_twice() {
        let bus = EventBusContainer::new("test");
        let count = Arc::new(AtomicUsize::new(0));
        let callback = {
            let count = count.clone();
            Arc::new(move |_: &TestEvent| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        let first = callback.clone();
        let a = bus.subscribe(move |e: &TestEvent| {
            first(e);
            Ok(())
        });
        let second = callback.clone();
        bus.subscribe(move |e: &TestEvent| {
            second(e);
            Ok(())
        });

        bus.publish(event(1));
        assert_eq!(count.load(Ordering::SeqCst), 2);

        bus.unsubscribe(a);
        bus.publish(event(2));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_handler_may_subscribe_and_publish_during_publish() {
        let bus = EventBusContainer::new("test");
        let (log, make) = recorder();

        let late = Arc::new(Mutex::new(Some(make("late"))));
        let outer = make("outer");
        let bus_clone = bus.clone();
        bus.subscribe(move |e: &TestEvent| {
            outer(e)?;
            if let Some(late) = late.lock().unwrap().take() {
                bus_clone.subscribe(move |e: &TestEvent| late(e));
            }
            if e.id == 1 {
                bus_clone.publish(event(2));
            }
            Ok(())
        });

        let report = bus.publish(event(1));

        // The nested publish sees the subscriber added by the outer handler;
        // the outer publish does not.
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer:1", "outer:2", "late:2"]
        );
        assert_eq!(report.delivered, 1);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let bus = EventBusContainer::new("test");
        let count = Arc::new(AtomicUsize::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let bus_clone = bus.clone();
        let own_id_clone = own_id.clone();
        let count_clone = count.clone();
        let id = bus.subscribe(move |_: &TestEvent| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *own_id_clone.lock().unwrap() {
                bus_clone.unsubscribe(id);
            }
            Ok(())
        });
        *own_id.lock().unwrap() = Some(id);

        bus.publish(event(1));
        bus.publish(event(2));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_sibling_removed_during_publish_still_runs_that_publish() {
        let bus = EventBusContainer::new("test");
        let (log, make) = recorder();
        let target = Arc::new(Mutex::new(None));

        let first = make("first");
        let bus_clone = bus.clone();
        let target_clone = target.clone();
        bus.subscribe(move |e: &TestEvent| {
            first(e)?;
            if let Some(id) = target_clone.lock().unwrap().take() {
                bus_clone.unsubscribe(id);
            }
            Ok(())
        });
        let second = make("second");
        let second_id = bus.subscribe(move |e: &TestEvent| second(e));
        *target.lock().unwrap() = Some(second_id);

        let report = bus.publish(event(1));
        assert_eq!(report.delivered, 2);
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(event(2));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:1", "second:1", "first:2"]
        );
    }

    #[test]
    fn test_once_fires_once_under_nested_publish() {
        let bus = EventBusContainer::new("test");
        let once_count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let bus_clone = bus.clone();
        let once_clone = once_count.clone();
        bus.subscribe_once(move |_: &TestEvent| {
            once_clone.fetch_add(1, Ordering::SeqCst);
            bus_clone.publish(event(2));
        });
        let seen_clone = seen.clone();
        bus.subscribe(move |e: &TestEvent| {
            seen_clone.lock().unwrap().push(e.id);
            Ok(())
        });

        bus.publish(event(1));
        bus.publish(event(3));

        assert_eq!(once_count.load(Ordering::SeqCst), 1);
        // The nested publish completes before the outer one reaches the
        // second subscriber.
        assert_eq!(*seen.lock().unwrap(), vec![2, 1, 3]);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(bus.stats().active_subscriptions, 1);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let bus: EventBusContainer<TestEvent> = EventBusContainer::new("test");

        let poisoner = bus.clone();
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("poison the registry");
        })
        .join();
        assert!(joined.is_err());
        assert!(bus.inner.is_poisoned());

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let id = bus.subscribe(move |_: &TestEvent| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let report = bus.publish(event(1));
        assert_eq!(report.delivered, 1);
        assert!(report.is_clean());
        assert!(bus.unsubscribe(id));
        bus.publish(event(2));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_stats() {
        let bus = EventBusContainer::new("test");

        bus.subscribe(|_: &TestEvent| Ok(()));
        bus.subscribe(|_: &TestEvent| bail!("nope"));

        bus.publish(event(1));

        let stats = bus.stats();
        assert_eq!(stats.events_published, 1);
        assert_eq!(stats.events_delivered, 2);
        assert_eq!(stats.handler_failures, 1);
        assert_eq!(stats.active_subscriptions, 2);
        assert_eq!(stats.total_subscriptions, 2);
    }

    #[test]
    fn test_clear() {
        let mut bus = EventBus::new("test");

        bus.subscribe(|_: &TestEvent| Ok(()));
        bus.subscribe(|_: &TestEvent| Ok(()));
        assert_eq!(bus.subscriber_count(), 2);

        bus.clear();

        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(event(1)).delivered, 0);
        assert_eq!(bus.stats().total_subscriptions, 2);
    }
}
