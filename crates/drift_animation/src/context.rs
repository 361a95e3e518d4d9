//! The animation context
//!
//! One `AnimationContext` owns every queue and every property binding. The
//! host drives it with `tick(dt)` once per frame; queues run in a fixed
//! order (timers, tweens, springs, wobbles), and an animation enqueued by a
//! completing item first runs on the following tick, never the same one.
//!
//! Contexts are plain values: construct one at startup and pass it (or an
//! `Arc` of it) wherever animations are created. Tests construct their own
//! isolated contexts. For hosts that want ambient access, a process-wide
//! context can be installed once via [`install_global`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, trace};

use drift_core::{sink_key, AnimValue, BindError, Property, SharedSink};

use crate::engine::{Engine, EngineState, Motion};
use crate::group::{remove_handler, GroupTable};
use crate::handle::{EngineHandle, SpringHandle, TweenHandle, WobbleHandle};
use crate::handler::{self, Binding, Handler, HandlerEngine, SharedEngine};
use crate::queue::{callback, Queue};
use crate::spring::SpringParams;
use crate::timer::{Timer, TimerHandle};
use crate::tween::TweenParams;
use crate::wobble::WobbleParams;

/// Process-wide context, installed at most once.
static GLOBAL_CONTEXT: OnceLock<Arc<AnimationContext>> = OnceLock::new();

/// Install the process-wide animation context.
///
/// Call once at app startup, after constructing the context the host will
/// tick.
///
/// # Panics
///
/// Panics if called more than once.
pub fn install_global(context: Arc<AnimationContext>) {
    if GLOBAL_CONTEXT.set(context).is_err() {
        panic!("install_global() called more than once");
    }
    debug!("global animation context installed");
}

/// The process-wide context.
///
/// # Panics
///
/// Panics if [`install_global`] has not been called.
pub fn global() -> Arc<AnimationContext> {
    GLOBAL_CONTEXT
        .get()
        .expect("Animation context not installed. Call install_global() at app startup.")
        .clone()
}

/// The process-wide context, if one has been installed.
pub fn try_global() -> Option<Arc<AnimationContext>> {
    GLOBAL_CONTEXT.get().cloned()
}

/// Owns the animation queues and the per-object binding table.
pub struct AnimationContext {
    timers: Queue,
    tweens: Queue,
    springs: Queue,
    wobbles: Queue,
    groups: Arc<Mutex<GroupTable>>,
    /// Raised for the duration of `tick` so anything enqueued mid-tick, from
    /// any queue's callbacks, first runs on the following tick.
    ticking: Arc<AtomicBool>,
}

impl AnimationContext {
    pub fn new() -> Self {
        let ticking = Arc::new(AtomicBool::new(false));
        Self {
            timers: Queue::gated("timer", ticking.clone()),
            tweens: Queue::gated("tween", ticking.clone()),
            springs: Queue::gated("spring", ticking.clone()),
            wobbles: Queue::gated("wobble", ticking.clone()),
            groups: Arc::new(Mutex::new(GroupTable::default())),
            ticking,
        }
    }

    /// Advance every queue by `dt` seconds, in registration order.
    ///
    /// Returns true while anything is still scheduled, as a redraw hint.
    /// Non-finite or negative deltas are ignored.
    pub fn tick(&self, dt: f32) -> bool {
        if !dt.is_finite() || dt < 0.0 {
            trace!(dt, "ignoring invalid tick delta");
            return self.has_active();
        }
        self.ticking.store(true, Ordering::Relaxed);
        self.timers.execute(dt);
        self.tweens.execute(dt);
        self.springs.execute(dt);
        self.wobbles.execute(dt);
        self.ticking.store(false, Ordering::Relaxed);
        self.timers.commit();
        self.tweens.commit();
        self.springs.commit();
        self.wobbles.commit();
        self.has_active()
    }

    /// True while any queue still holds scheduled items.
    pub fn has_active(&self) -> bool {
        !self.timers.is_empty()
            || !self.tweens.is_empty()
            || !self.springs.is_empty()
            || !self.wobbles.is_empty()
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }

    pub fn wobble_count(&self) -> usize {
        self.wobbles.len()
    }

    // =========================================================================
    // Property animation
    // =========================================================================

    /// Tween `property` on `sink` to `target`. Starts immediately (honoring
    /// the configured delay) and replaces any animation already driving the
    /// same property.
    pub fn tween(
        &self,
        sink: &SharedSink,
        property: Property,
        target: impl Into<AnimValue>,
        params: TweenParams,
    ) -> Result<TweenHandle, BindError> {
        let binding = handler::bind(sink, property, target.into())?;
        let engine = Engine::tween(&binding.store, &binding.targets, params);
        Ok(self.install(&self.tweens, sink, property, binding, engine, HandlerEngine::Tween))
    }

    /// Spring `property` on `sink` toward `target`. Redirect a live spring
    /// with [`SpringHandle::to`]; by default a finished spring restarts when
    /// retargeted.
    pub fn spring(
        &self,
        sink: &SharedSink,
        property: Property,
        target: impl Into<AnimValue>,
        params: SpringParams,
    ) -> Result<SpringHandle, BindError> {
        let binding = handler::bind(sink, property, target.into())?;
        let engine = Engine::spring(&binding.store, &binding.targets, params);
        Ok(self.install(
            &self.springs,
            sink,
            property,
            binding,
            engine,
            HandlerEngine::Spring,
        ))
    }

    /// Wobble `property` on `sink` around its current value.
    pub fn wobble(
        &self,
        sink: &SharedSink,
        property: Property,
        params: WobbleParams,
    ) -> Result<WobbleHandle, BindError> {
        let binding = handler::bind_current(sink, property)?;
        let engine = Engine::wobble(&binding.store, params);
        Ok(self.install(
            &self.wobbles,
            sink,
            property,
            binding,
            engine,
            HandlerEngine::Wobble,
        ))
    }

    /// Cancel the animation on one property. Nothing fires afterwards.
    pub fn cancel(&self, sink: &SharedSink, property: Property) {
        remove_handler(&Arc::downgrade(&self.groups), sink_key(sink), property);
    }

    /// Cancel every animation on an object.
    pub fn cancel_all(&self, sink: &SharedSink) {
        let mut table = self.groups.lock().unwrap();
        table.remove(&sink_key(sink));
    }

    /// True while a property has a live binding.
    pub fn is_animating(&self, sink: &SharedSink, property: Property) -> bool {
        self.groups
            .lock()
            .unwrap()
            .get(&sink_key(sink))
            .is_some_and(|group| group.handlers.contains_key(&property))
    }

    /// Number of properties currently bound on an object.
    pub fn animated_property_count(&self, sink: &SharedSink) -> usize {
        self.groups
            .lock()
            .unwrap()
            .get(&sink_key(sink))
            .map_or(0, |group| group.handlers.len())
    }

    // =========================================================================
    // Engine-level API (no sink)
    // =========================================================================

    /// Adopt a hand-built tween over caller-owned slots. The handle is not
    /// started; chain callbacks first, then call `start()`.
    pub fn spawn_tween(&self, engine: Engine<crate::tween::TweenMotion>) -> TweenHandle {
        EngineHandle::new(Arc::new(Mutex::new(engine)), self.tweens.handle())
    }

    /// Adopt a hand-built spring over caller-owned slots.
    pub fn spawn_spring(&self, engine: Engine<crate::spring::SpringMotion>) -> SpringHandle {
        EngineHandle::new(Arc::new(Mutex::new(engine)), self.springs.handle())
    }

    /// Adopt a hand-built wobble over caller-owned slots.
    pub fn spawn_wobble(&self, engine: Engine<crate::wobble::WobbleMotion>) -> WobbleHandle {
        EngineHandle::new(Arc::new(Mutex::new(engine)), self.wobbles.handle())
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Run `f` once after `seconds`.
    pub fn delay(&self, seconds: f32, f: impl FnOnce() + Send + 'static) -> TimerHandle {
        let mut f = Some(f);
        let timer = Arc::new(Mutex::new(Timer::once(
            seconds,
            callback(move || {
                if let Some(f) = f.take() {
                    f();
                }
            }),
        )));
        let key = self.timers.add(timer.clone());
        TimerHandle::new(timer, self.timers.handle(), Some(key))
    }

    /// Run `f` every `interval` seconds until the handle is cancelled.
    pub fn every(&self, interval: f32, f: impl FnMut() + Send + 'static) -> TimerHandle {
        let timer = Arc::new(Mutex::new(Timer::repeating(interval, callback(f))));
        let key = self.timers.add(timer.clone());
        TimerHandle::new(timer, self.timers.handle(), Some(key))
    }

    // =========================================================================

    /// Wire an engine to a (sink, property) binding and swap it in as the
    /// single live handler for that pair. The swap happens under the table
    /// lock: the prior handler's engine is torn down before the new handler
    /// becomes visible, so two engines never drive the same property.
    fn install<M: Motion>(
        &self,
        queue: &Queue,
        sink: &SharedSink,
        property: Property,
        binding: Binding,
        engine: Engine<M>,
        wrap: fn(SharedEngine<M>) -> HandlerEngine,
    ) -> EngineHandle<M> {
        let shared = Arc::new(Mutex::new(engine));
        let key = sink_key(sink);
        let groups = Arc::downgrade(&self.groups);
        {
            let mut engine = shared.lock().unwrap();
            engine.on(
                EngineState::Update,
                handler::apply_callback(
                    &binding.store,
                    sink,
                    property,
                    binding.kind,
                    groups.clone(),
                    key,
                ),
            );
            engine.on(
                EngineState::Complete,
                handler::completion_callback(groups, key, property),
            );
        }
        let new_handler = Handler::new(binding.store, wrap(shared.clone()));
        {
            let mut table = self.groups.lock().unwrap();
            let group = table.entry(key).or_default();
            if let Some(prior) = group.handlers.insert(property, new_handler) {
                debug!(?property, "replacing in-flight animation");
                drop(prior);
            }
        }
        let handle = EngineHandle::new(shared, queue.handle());
        handle.start();
        handle
    }
}

impl Default for AnimationContext {
    fn default() -> Self {
        Self::new()
    }
}
