//! The generic animation engine
//!
//! One engine drives the scalar components of one animated value. The motion
//! rule (linear tween, harmonic spring, sinusoidal wobble) is a [`Motion`]
//! strategy; everything else (the state machine, start delay, per-state
//! callbacks, dead-target cancellation, the queue protocol) lives here and is
//! shared by every kind.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::queue::{Callback, QueueItem};
use crate::slot::ScalarSlot;

/// Lifecycle state of an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Armed, waiting for its start delay to elapse.
    Idle,
    /// Entered for one tick when updating begins.
    Start,
    /// Actively stepping its motion every tick.
    Update,
    /// Finished; leaves its queue on the next pass.
    Complete,
    /// Halted in place; stays queued and can be restarted.
    Stopped,
}

/// What a motion step produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    Finished,
}

/// How a motion reacts to a stop request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopResponse {
    /// Halt immediately.
    Stopped,
    /// The motion winds itself down and will report `Finished` when done.
    Deferred,
}

/// Per-component state: the slot being driven plus the start/target/velocity
/// scalars the motion integrates over.
pub struct Lane {
    pub slot: ScalarSlot,
    pub start: f32,
    pub target: f32,
    pub velocity: f32,
    pub threshold: f32,
}

impl Lane {
    pub fn new(slot: ScalarSlot, target: f32) -> Self {
        Self {
            slot,
            start: 0.0,
            target,
            velocity: 0.0,
            threshold: 0.0,
        }
    }
}

/// A motion rule. Implementations advance lane values; the engine decides
/// when they run.
pub trait Motion: Send + 'static {
    /// Capture start values and reset internal progress. Runs when the
    /// engine is started.
    fn begin(&mut self, lanes: &mut [Lane]);

    /// Advance every lane by `dt` seconds.
    fn step(&mut self, lanes: &mut [Lane], dt: f32) -> StepOutcome;

    /// Point the motion at new targets, one per lane.
    fn retarget(&mut self, lanes: &mut [Lane], targets: &[f32]);

    /// Called every tick regardless of engine state, for motions that keep
    /// an internal clock running while halted.
    fn advance_clock(&mut self, _dt: f32) {}

    /// React to `stop()`.
    fn request_stop(&mut self) -> StopResponse {
        StopResponse::Stopped
    }

    /// Whether a retarget on a finished engine should start it again.
    fn restart_on_retarget(&self) -> bool {
        false
    }
}

/// A running animation: one [`Motion`] over a set of lanes.
pub struct Engine<M: Motion> {
    motion: M,
    lanes: SmallVec<[Lane; 4]>,
    state: EngineState,
    started: bool,
    delay: f32,
    delay_left: f32,
    callbacks: FxHashMap<EngineState, Vec<Callback>>,
    deferred: Vec<Callback>,
}

impl<M: Motion> Engine<M> {
    pub fn new(motion: M, lanes: impl IntoIterator<Item = Lane>) -> Self {
        Self {
            motion,
            lanes: lanes.into_iter().collect(),
            state: EngineState::Idle,
            started: false,
            delay: 0.0,
            delay_left: 0.0,
            callbacks: FxHashMap::default(),
            deferred: Vec::new(),
        }
    }

    pub fn motion(&self) -> &M {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut M {
        &mut self.motion
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.started
            && matches!(
                self.state,
                EngineState::Idle | EngineState::Start | EngineState::Update
            )
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Delay, in seconds, between `start()` and the first motion step.
    pub fn set_delay(&mut self, delay: f32) {
        self.delay = delay.max(0.0);
    }

    /// Register a callback for a state. `Start`, `Complete` and `Stopped`
    /// callbacks run once per entry; `Update` callbacks run every updating
    /// tick.
    pub fn on(&mut self, state: EngineState, cb: Callback) {
        self.callbacks.entry(state).or_default().push(cb);
    }

    /// Current lane values, or `None` once the backing store is gone.
    pub fn components(&self) -> Option<SmallVec<[f32; 4]>> {
        self.lanes.iter().map(|lane| lane.slot.get()).collect()
    }

    /// Arm the engine: capture start values and begin the delay countdown.
    /// Also restarts a stopped or completed engine.
    pub fn start(&mut self) {
        self.started = true;
        self.state = EngineState::Idle;
        self.delay_left = self.delay;
        self.motion.begin(&mut self.lanes);
    }

    /// Halt in place. The motion may defer the halt to wind down first.
    pub fn stop(&mut self) {
        if matches!(self.state, EngineState::Complete | EngineState::Stopped) {
            return;
        }
        match self.motion.request_stop() {
            StopResponse::Stopped => self.enter(EngineState::Stopped),
            StopResponse::Deferred => {}
        }
    }

    /// Tear down: no state callback registered on this engine will ever run
    /// again, and the engine leaves its queue on the next pass.
    pub fn delete(&mut self) {
        self.callbacks.clear();
        self.deferred.clear();
        self.state = EngineState::Complete;
    }

    /// Redirect toward new targets. Empty target lists are ignored.
    pub fn retarget(&mut self, targets: &[f32]) {
        if targets.is_empty() {
            return;
        }
        self.motion.retarget(&mut self.lanes, targets);
    }

    pub fn is_complete(&self) -> bool {
        self.state == EngineState::Complete
    }

    fn enter(&mut self, next: EngineState) {
        self.state = next;
        // Update callbacks are queued per-tick by step_lanes instead.
        if next != EngineState::Update {
            self.queue_state_callbacks(next);
        }
    }

    fn queue_state_callbacks(&mut self, state: EngineState) {
        if let Some(cbs) = self.callbacks.get(&state) {
            self.deferred.extend(cbs.iter().cloned());
        }
    }

    fn advance(&mut self, dt: f32) -> bool {
        self.motion.advance_clock(dt);
        if !self.started {
            return true;
        }
        match self.state {
            EngineState::Complete => false,
            EngineState::Stopped => true,
            EngineState::Idle => {
                self.delay_left -= dt;
                if self.delay_left > 0.0 {
                    return true;
                }
                let overshoot = -self.delay_left;
                self.enter(EngineState::Start);
                self.enter(EngineState::Update);
                self.step_lanes(overshoot)
            }
            EngineState::Start => {
                self.enter(EngineState::Update);
                self.step_lanes(dt)
            }
            EngineState::Update => self.step_lanes(dt),
        }
    }

    fn step_lanes(&mut self, dt: f32) -> bool {
        if dt <= 0.0 {
            return true;
        }
        if self.lanes.iter().any(|lane| !lane.slot.is_alive()) {
            debug!("animation target storage dropped, cancelling engine");
            self.delete();
            return false;
        }
        self.queue_state_callbacks(EngineState::Update);
        match self.motion.step(&mut self.lanes, dt) {
            StepOutcome::Running => true,
            StepOutcome::Finished => {
                self.enter(EngineState::Complete);
                false
            }
        }
    }
}

impl<M: Motion> QueueItem for Engine<M> {
    fn update(&mut self, dt: f32) -> bool {
        self.advance(dt)
    }

    fn drain_deferred(&mut self) -> Vec<Callback> {
        std::mem::take(&mut self.deferred)
    }

    fn is_complete(&self) -> bool {
        self.state == EngineState::Complete
    }
}
