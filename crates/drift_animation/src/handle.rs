//! Fluent animation handles
//!
//! Every animation the context creates (and every engine spawned directly)
//! is controlled through an [`EngineHandle`]: chain callbacks onto it, start
//! and stop it, redirect it at a new target, or tear it down. Handles are
//! cheap clones; the engine itself lives as long as any handle or its queue
//! entry does.

use std::sync::{Arc, Mutex};

use smallvec::SmallVec;

use drift_core::AnimValue;

use crate::engine::{Engine, EngineState, Motion};
use crate::queue::{callback, QueueHandle};
use crate::spring::SpringMotion;
use crate::tween::TweenMotion;
use crate::wobble::WobbleMotion;

/// Control handle for one engine.
pub struct EngineHandle<M: Motion> {
    engine: Arc<Mutex<Engine<M>>>,
    queue: QueueHandle,
}

/// Handle to a running tween.
pub type TweenHandle = EngineHandle<TweenMotion>;
/// Handle to a running spring.
pub type SpringHandle = EngineHandle<SpringMotion>;
/// Handle to a running wobble.
pub type WobbleHandle = EngineHandle<WobbleMotion>;

impl<M: Motion> Clone for EngineHandle<M> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<M: Motion> EngineHandle<M> {
    pub(crate) fn new(engine: Arc<Mutex<Engine<M>>>, queue: QueueHandle) -> Self {
        Self { engine, queue }
    }

    /// Register a callback for a lifecycle state.
    pub fn on(self, state: EngineState, f: impl FnMut() + Send + 'static) -> Self {
        self.engine.lock().unwrap().on(state, callback(f));
        self
    }

    /// Runs once when updating begins (after any start delay).
    pub fn on_start(self, f: impl FnMut() + Send + 'static) -> Self {
        self.on(EngineState::Start, f)
    }

    /// Runs every tick while the engine is updating.
    pub fn on_update(self, f: impl FnMut() + Send + 'static) -> Self {
        self.on(EngineState::Update, f)
    }

    /// Runs once when the engine completes naturally.
    pub fn on_complete(self, f: impl FnMut() + Send + 'static) -> Self {
        self.on(EngineState::Complete, f)
    }

    /// Runs once when the engine is stopped in place.
    pub fn on_stop(self, f: impl FnMut() + Send + 'static) -> Self {
        self.on(EngineState::Stopped, f)
    }

    /// Sequence a one-shot continuation after natural completion.
    pub fn then(self, f: impl FnOnce() + Send + 'static) -> Self {
        let mut f = Some(f);
        self.on_complete(move || {
            if let Some(f) = f.take() {
                f();
            }
        })
    }

    /// Sequence another animation: `next` starts when this one completes.
    pub fn follow_with<N: Motion>(self, next: &EngineHandle<N>) -> Self {
        let next = next.clone();
        self.then(move || next.start())
    }

    /// Arm the engine and (re)schedule it on its queue.
    pub fn start(&self) {
        self.engine.lock().unwrap().start();
        let _ = self.queue.add(self.engine.clone());
    }

    /// Halt in place. Wobbles with an ease-out wind down first.
    pub fn stop(&self) {
        self.engine.lock().unwrap().stop();
    }

    /// Tear the animation down; no further callbacks fire and the queue
    /// entry is reclaimed on the next pass.
    pub fn delete(&self) {
        self.engine.lock().unwrap().delete();
    }

    /// Redirect at a new target value. On motions configured to restart on
    /// retarget (springs by default), a finished engine is started again.
    pub fn to(&self, value: impl Into<AnimValue>) {
        let value = value.into();
        let mut components = [0.0f32; 4];
        value.write_components(&mut components);
        self.retarget(&components[..value.component_count()]);
    }

    /// Redirect with raw component targets.
    pub fn retarget(&self, targets: &[f32]) {
        let restart = {
            let mut engine = self.engine.lock().unwrap();
            engine.retarget(targets);
            !engine.is_running() && engine.motion().restart_on_retarget()
        };
        if restart {
            self.start();
        }
    }

    pub fn state(&self) -> EngineState {
        self.engine.lock().unwrap().state()
    }

    pub fn is_complete(&self) -> bool {
        self.engine.lock().unwrap().is_complete()
    }

    pub fn is_running(&self) -> bool {
        self.engine.lock().unwrap().is_running()
    }

    /// Current backing values, or `None` once the storage is gone.
    pub fn components(&self) -> Option<SmallVec<[f32; 4]>> {
        self.engine.lock().unwrap().components()
    }

    /// Inspect or adjust the motion under the handle.
    pub fn with_motion<R>(&self, f: impl FnOnce(&mut M) -> R) -> R {
        f(self.engine.lock().unwrap().motion_mut())
    }
}

impl EngineHandle<TweenMotion> {
    /// Normalized tween progress, 0 to 1.
    pub fn percentage(&self) -> f32 {
        self.engine.lock().unwrap().motion().percentage()
    }
}

impl EngineHandle<WobbleMotion> {
    /// Current envelope strength, 0 to 1.
    pub fn strength(&self) -> f32 {
        self.engine.lock().unwrap().motion().strength()
    }
}
