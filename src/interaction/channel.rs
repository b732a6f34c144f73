use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct ChannelInner<E> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<E>)>,
}

/// Single-threaded publish/subscribe channel.
///
/// Clones share the same subscriber list. `publish` snapshots the list before
/// invoking anyone, so a handler subscribing during a notification is first
/// called on the next one.
pub struct EventChannel<E> {
    inner: Rc<RefCell<ChannelInner<E>>>,
}

impl<E> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }
}

impl<E> EventChannel<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl FnMut(&E) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        let handler: Handler<E> = Rc::new(RefCell::new(handler));
        inner.handlers.push((id, handler));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.handlers.len();
        inner.handlers.retain(|(existing, _)| *existing != id);
        inner.handlers.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }

    /// Calls every current subscriber in subscription order; returns how many
    /// ran.
    pub fn publish(&self, event: &E) -> usize {
        let handlers: Vec<(SubscriptionId, Handler<E>)> = self.inner.borrow().handlers.clone();
        let mut delivered = 0;
        for (id, handler) in handlers {
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    (&mut *handler)(event);
                    delivered += 1;
                }
                Err(_) => warn!(subscription = id.0, "skipping re-entrant event handler"),
            }
        }
        delivered
    }
}
