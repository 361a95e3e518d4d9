//! The queue system
//!
//! Every animation kind runs on its own [`Queue`], driven once per host tick.
//! Items implement the small [`QueueItem`] protocol; the queue guarantees:
//!
//! - items run in insertion order
//! - an item added while a tick is in flight (its own queue's pass or any
//!   other queue's, via the shared defer gate) is first updated on the
//!   *following* tick
//! - an item is never updated twice in one pass
//! - completed items are physically removed at the start of the next pass
//! - adding the same item twice yields a single queue entry
//! - callbacks run with no queue or item lock held, so they may freely start,
//!   stop, or replace animations mid-pass

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use slotmap::{new_key_type, SlotMap};
use tracing::trace;

/// A deferred callback. Shared so the same callback can be queued for several
/// ticks without re-boxing.
pub type Callback = Arc<Mutex<dyn FnMut() + Send>>;

/// Box a closure as a [`Callback`].
pub fn callback<F: FnMut() + Send + 'static>(f: F) -> Callback {
    Arc::new(Mutex::new(f))
}

pub(crate) fn invoke(cb: &Callback) {
    let mut f = cb.lock().unwrap();
    (&mut *f)();
}

/// Contract every scheduled item implements.
pub trait QueueItem: Send {
    /// Advance by `dt` seconds. Returns true while the item wants further
    /// ticks.
    fn update(&mut self, dt: f32) -> bool;

    /// Take the callbacks queued by the last update. The queue runs them
    /// after releasing the item's lock.
    fn drain_deferred(&mut self) -> Vec<Callback>;

    /// True once the item has finished and should leave the queue.
    fn is_complete(&self) -> bool;
}

/// A queued item, shared between the queue and whoever controls it.
pub type SharedItem = Arc<Mutex<dyn QueueItem>>;

new_key_type! {
    /// Handle to an item scheduled on a queue.
    pub struct QueueKey;
}

struct QueueInner {
    entries: SlotMap<QueueKey, SharedItem>,
    /// Active keys in insertion order.
    order: Vec<QueueKey>,
    /// Keys added while the defer gate was raised; moved into `order` by
    /// `commit()` once the tick ends.
    incoming: Vec<QueueKey>,
    /// Flagged complete; physically removed at the start of the next pass.
    retired: Vec<QueueKey>,
    /// Raised by the owning context for the duration of a tick.
    defer_adds: Arc<AtomicBool>,
}

impl QueueInner {
    fn add(&mut self, item: SharedItem) -> QueueKey {
        for (key, existing) in self.entries.iter() {
            if Arc::as_ptr(existing) as *const () == Arc::as_ptr(&item) as *const () {
                return key;
            }
        }
        let key = self.entries.insert(item);
        if self.defer_adds.load(Ordering::Relaxed) {
            self.incoming.push(key);
        } else {
            self.order.push(key);
        }
        key
    }

    fn retire(&mut self, key: QueueKey) {
        if self.entries.contains_key(key) {
            self.retired.push(key);
        }
    }
}

/// A per-kind animation queue.
#[derive(Clone)]
pub struct Queue {
    label: &'static str,
    inner: Arc<Mutex<QueueInner>>,
}

impl Queue {
    pub fn new(label: &'static str) -> Self {
        Self::gated(label, Arc::new(AtomicBool::new(false)))
    }

    /// A queue whose adds defer to the next tick while `defer_adds` is
    /// raised. Queues driven together share one gate so an item enqueued
    /// from any callback mid-tick never runs until the following tick.
    pub fn gated(label: &'static str, defer_adds: Arc<AtomicBool>) -> Self {
        Self {
            label,
            inner: Arc::new(Mutex::new(QueueInner {
                entries: SlotMap::with_key(),
                order: Vec::new(),
                incoming: Vec::new(),
                retired: Vec::new(),
                defer_adds,
            })),
        }
    }

    /// Schedule an item. Adding an item that is already queued returns its
    /// existing key instead of a second entry.
    pub fn add(&self, item: SharedItem) -> QueueKey {
        let key = self.inner.lock().unwrap().add(item);
        trace!(queue = self.label, ?key, "queued item");
        key
    }

    /// Flag an item for removal on the next pass. The item is still expected
    /// to gate itself (a cancelled item's `update` returns false).
    pub fn remove(&self, key: QueueKey) {
        self.inner.lock().unwrap().retire(key);
    }

    pub fn contains(&self, key: QueueKey) -> bool {
        self.inner.lock().unwrap().entries.contains_key(key)
    }

    /// Number of active items (excluding ones still deferred to next tick).
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run one pass: flush pending removals, then update every item that was
    /// active before this pass began.
    pub fn execute(&self, dt: f32) {
        let snapshot: Vec<(QueueKey, SharedItem)> = {
            let mut inner = self.inner.lock().unwrap();
            let retired: Vec<QueueKey> = inner.retired.drain(..).collect();
            for key in retired {
                inner.entries.remove(key);
                inner.order.retain(|k| *k != key);
                inner.incoming.retain(|k| *k != key);
            }
            inner
                .order
                .iter()
                .filter_map(|key| inner.entries.get(*key).map(|item| (*key, item.clone())))
                .collect()
        };

        for (key, item) in snapshot {
            let (still_active, batch) = {
                let mut item = item.lock().unwrap();
                let still_active = item.update(dt);
                (still_active, item.drain_deferred())
            };
            for cb in &batch {
                invoke(cb);
            }
            if !still_active {
                // Checked after the callbacks so a completion hook that
                // restarts the item keeps it scheduled.
                let complete = item.lock().unwrap().is_complete();
                if complete {
                    trace!(queue = self.label, ?key, "item complete, retiring");
                    self.inner.lock().unwrap().retire(key);
                }
            }
        }
    }

    /// Activate items that were deferred mid-tick. The owning context calls
    /// this after every queue has run its pass.
    pub fn commit(&self) {
        let mut inner = self.inner.lock().unwrap();
        let incoming: Vec<QueueKey> = inner.incoming.drain(..).collect();
        for key in incoming {
            if inner.entries.contains_key(key) {
                inner.order.push(key);
            }
        }
    }

    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Weak handle to a queue, held by animation handles. Operations no-op once
/// the owning context is gone.
#[derive(Clone)]
pub struct QueueHandle {
    inner: Weak<Mutex<QueueInner>>,
}

impl QueueHandle {
    pub fn add(&self, item: SharedItem) -> Option<QueueKey> {
        self.inner
            .upgrade()
            .map(|inner| inner.lock().unwrap().add(item))
    }

    pub fn remove(&self, key: QueueKey) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().retire(key);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
