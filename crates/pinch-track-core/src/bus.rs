//! Single-threaded multi-subscriber broadcast.
//!
//! An [`EventBus`] is a cheap-to-clone handle: clones share one subscriber
//! list, so a handler may capture a clone to unsubscribe itself or others.
//!
//! Dispatch rules:
//! - handlers run synchronously, in subscription order, with the same argument
//! - a handler subscribed during a publish is first called on the next publish
//! - a handler unsubscribed during a publish is skipped if its turn has not come
//! - a handler that returns `Err` or panics is logged and counted, and
//!   delivery continues with the next handler

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Rc<RefCell<dyn FnMut(&T) -> anyhow::Result<()>>>;

struct Subscriber<T> {
    id: SubscriptionId,
    handler: Handler<T>,
    active: Rc<Cell<bool>>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Rc::clone(&self.handler),
            active: Rc::clone(&self.active),
        }
    }
}

struct BusInner<T> {
    name: &'static str,
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
    faults: Cell<u64>,
}

/// Typed observer list for one kind of event.
pub struct EventBus<T> {
    inner: Rc<BusInner<T>>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("name", &self.inner.name)
            .field("subscribers", &self.len())
            .field("faults", &self.fault_count())
            .finish()
    }
}

impl<T> EventBus<T> {
    /// Create an empty bus. `name` only appears in log output.
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Rc::new(BusInner {
                name,
                next_id: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
                faults: Cell::new(0),
            }),
        }
    }

    /// Register a fallible handler. An `Err` is reported as a subscriber fault.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: FnMut(&T) -> anyhow::Result<()> + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.subscribers.borrow_mut().push(Subscriber {
            id,
            handler: Rc::new(RefCell::new(handler)),
            active: Rc::new(Cell::new(true)),
        });
        id
    }

    /// Register a handler that cannot fail.
    pub fn observe<F>(&self, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        self.subscribe(move |args| {
            handler(args);
            Ok(())
        })
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        match subscribers.iter().position(|s| s.id == id) {
            Some(index) => {
                let removed = subscribers.remove(index);
                removed.active.set(false);
                true
            }
            None => false,
        }
    }

    /// Remove every handler.
    pub fn clear(&self) {
        for subscriber in self.inner.subscribers.borrow_mut().drain(..) {
            subscriber.active.set(false);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of handler failures isolated since the bus was created.
    pub fn fault_count(&self) -> u64 {
        self.inner.faults.get()
    }

    /// Deliver `args` to every current subscriber. Returns how many handlers
    /// completed without a fault.
    pub fn publish(&self, args: &T) -> usize {
        // Snapshot so handlers can subscribe or unsubscribe while we iterate
        let snapshot: Vec<Subscriber<T>> = self.inner.subscribers.borrow().clone();
        let mut delivered = 0;

        for subscriber in snapshot {
            if !subscriber.active.get() {
                continue;
            }

            let Ok(mut handler) = subscriber.handler.try_borrow_mut() else {
                tracing::warn!(
                    "Skipping re-entrant dispatch of {:?} on '{}' bus",
                    subscriber.id,
                    self.inner.name
                );
                continue;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| (*handler)(args))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => self.record_fault(subscriber.id, &e.to_string()),
                Err(payload) => self.record_fault(subscriber.id, &panic_message(payload.as_ref())),
            }
        }

        delivered
    }

    fn record_fault(&self, id: SubscriptionId, reason: &str) {
        self.inner.faults.set(self.inner.faults.get() + 1);
        tracing::warn!(
            "Subscriber {:?} on '{}' bus failed: {}",
            id,
            self.inner.name,
            reason
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn FnMut(&u32)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let shared = Rc::clone(&log);
        let make = move |tag: &'static str| {
            let log = Rc::clone(&shared);
            Box::new(move |value: &u32| log.borrow_mut().push(format!("{}:{}", tag, value)))
                as Box<dyn FnMut(&u32)>
        };
        (log, make)
    }

    #[test]
    fn test_publish_in_subscription_order() {
        let bus: EventBus<u32> = EventBus::new("test");
        let (log, make) = recorder();
        bus.observe(make("a"));
        bus.observe(make("b"));
        bus.observe(make("c"));

        assert_eq!(bus.publish(&7), 3);
        assert_eq!(*log.borrow(), vec!["a:7", "b:7", "c:7"]);
    }

    #[test]
    fn test_unsubscribe() {
        let bus: EventBus<u32> = EventBus::new("test");
        let (log, make) = recorder();
        let a = bus.observe(make("a"));
        bus.observe(make("b"));

        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a));
        bus.publish(&1);
        assert_eq!(*log.borrow(), vec!["b:1"]);
    }

    #[test]
    fn test_subscribe_during_publish_waits_for_next_pass() {
        let bus: EventBus<u32> = EventBus::new("test");
        let (log, make) = recorder();
        let added = Rc::new(Cell::new(false));

        let handle = bus.clone();
        let late = Rc::new(RefCell::new(Some(make("late"))));
        let flag = Rc::clone(&added);
        bus.observe(move |_| {
            if !flag.get() {
                flag.set(true);
                if let Some(mut handler) = late.borrow_mut().take() {
                    handle.observe(move |v| handler(v));
                }
            }
        });

        bus.publish(&1);
        assert!(log.borrow().is_empty());
        bus.publish(&2);
        assert_eq!(*log.borrow(), vec!["late:2"]);
    }

    #[test]
    fn test_unsubscribe_during_publish_skips_pending_handler() {
        let bus: EventBus<u32> = EventBus::new("test");
        let (log, make) = recorder();
        let victim = Rc::new(Cell::new(None));

        let handle = bus.clone();
        let target = Rc::clone(&victim);
        bus.observe(move |_| {
            if let Some(id) = target.get() {
                handle.unsubscribe(id);
            }
        });
        victim.set(Some(bus.observe(make("victim"))));

        assert_eq!(bus.publish(&3), 1);
        assert!(log.borrow().is_empty());
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_failing_handler_is_isolated() {
        let bus: EventBus<u32> = EventBus::new("test");
        let (log, make) = recorder();
        bus.observe(make("before"));
        bus.subscribe(|_: &u32| Err(anyhow::anyhow!("consumer broke")));
        bus.observe(|_: &u32| panic!("consumer panicked"));
        bus.observe(make("after"));

        assert_eq!(bus.publish(&5), 2);
        assert_eq!(*log.borrow(), vec!["before:5", "after:5"]);
        assert_eq!(bus.fault_count(), 2);

        // A panicking handler stays usable for later publishes
        bus.publish(&6);
        assert_eq!(bus.fault_count(), 4);
    }

    #[test]
    fn test_reentrant_publish_skips_self() {
        let bus: EventBus<u32> = EventBus::new("test");
        let calls = Rc::new(Cell::new(0));

        let handle = bus.clone();
        let counter = Rc::clone(&calls);
        bus.observe(move |value| {
            counter.set(counter.get() + 1);
            if *value == 0 {
                handle.publish(&1);
            }
        });

        bus.publish(&0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_clear() {
        let bus: EventBus<u32> = EventBus::new("test");
        bus.observe(|_| {});
        bus.observe(|_| {});
        assert_eq!(bus.len(), 2);
        bus.clear();
        assert!(bus.is_empty());
        assert_eq!(bus.publish(&0), 0);
    }
}
