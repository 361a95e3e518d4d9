//! Timers
//!
//! Delayed and repeating callbacks on the same queue machinery as the
//! engines. Every timer is reachable through its [`TimerHandle`]; nothing
//! here is fire-and-forget.

use std::sync::{Arc, Mutex};

use crate::queue::{Callback, QueueHandle, QueueItem, QueueKey};

/// A scheduled callback.
pub struct Timer {
    remaining: f32,
    interval: f32,
    repeating: bool,
    cancelled: bool,
    fired: bool,
    callback: Callback,
    deferred: Vec<Callback>,
}

impl Timer {
    /// Fire once after `seconds`.
    pub fn once(seconds: f32, callback: Callback) -> Self {
        Self {
            remaining: seconds.max(0.0),
            interval: seconds.max(0.0),
            repeating: false,
            cancelled: false,
            fired: false,
            callback,
            deferred: Vec::new(),
        }
    }

    /// Fire every `interval` seconds until cancelled.
    pub fn repeating(interval: f32, callback: Callback) -> Self {
        Self {
            repeating: true,
            ..Self::once(interval, callback)
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl QueueItem for Timer {
    fn update(&mut self, dt: f32) -> bool {
        if self.cancelled {
            return false;
        }
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return true;
        }
        self.deferred.push(self.callback.clone());
        if self.repeating {
            self.remaining += self.interval.max(f32::EPSILON);
            true
        } else {
            self.fired = true;
            false
        }
    }

    fn drain_deferred(&mut self) -> Vec<Callback> {
        std::mem::take(&mut self.deferred)
    }

    fn is_complete(&self) -> bool {
        self.cancelled || self.fired
    }
}

/// Control handle for a scheduled timer.
#[derive(Clone)]
pub struct TimerHandle {
    timer: Arc<Mutex<Timer>>,
    queue: QueueHandle,
    key: Option<QueueKey>,
}

impl TimerHandle {
    pub(crate) fn new(timer: Arc<Mutex<Timer>>, queue: QueueHandle, key: Option<QueueKey>) -> Self {
        Self { timer, queue, key }
    }

    /// Stop the timer; its callback will not fire again.
    pub fn cancel(&self) {
        self.timer.lock().unwrap().cancel();
        if let Some(key) = self.key {
            self.queue.remove(key);
        }
    }

    /// True once a one-shot timer has fired or the timer was cancelled.
    pub fn is_finished(&self) -> bool {
        self.timer.lock().unwrap().is_complete()
    }
}
