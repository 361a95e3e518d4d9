//! Spring motion
//!
//! Damped harmonic integration toward a target with no fixed duration:
//! completion is convergence. Each retarget captures a minimum-force
//! threshold proportional to the distance being covered; a lane is settled
//! once both its displacement and its net force sit at or under that
//! threshold, and a fully settled spring snaps every lane exactly onto its
//! target so micro-oscillation can never hold an engine open.

use serde::{Deserialize, Serialize};

use crate::engine::{Engine, Lane, Motion, StepOutcome};
use crate::slot::SlotStore;

/// Scale factor between the distance a retarget covers and the settle
/// threshold captured for it.
pub const MIN_FORCE_EPSILON: f32 = 1e-3;

/// Spring configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParams {
    /// Pull toward the target per unit displacement.
    pub tension: f32,
    /// Velocity resistance.
    pub dampening: f32,
    /// Restart a finished spring when it is given a new target.
    pub start_on_retarget: bool,
}

impl SpringParams {
    pub fn new(tension: f32, dampening: f32) -> Self {
        Self {
            tension,
            dampening,
            ..Self::default()
        }
    }

    /// Slow and smooth, good for page-scale moves.
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0)
    }

    /// Noticeable overshoot, good for playful UI.
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0)
    }

    /// Fast with little overshoot, good for buttons.
    pub fn stiff() -> Self {
        Self::new(400.0, 30.0)
    }

    pub fn with_start_on_retarget(mut self, enabled: bool) -> Self {
        self.start_on_retarget = enabled;
        self
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            tension: 250.0,
            dampening: 10.0,
            start_on_retarget: true,
        }
    }
}

/// The spring motion rule.
pub struct SpringMotion {
    tension: f32,
    dampening: f32,
    auto_restart: bool,
}

impl SpringMotion {
    pub fn new(params: SpringParams) -> Self {
        Self {
            tension: params.tension.max(0.0),
            dampening: params.dampening.max(0.0),
            auto_restart: params.start_on_retarget,
        }
    }

    pub fn tension(&self) -> f32 {
        self.tension
    }

    pub fn dampening(&self) -> f32 {
        self.dampening
    }

    fn capture_threshold(lane: &mut Lane, current: f32) {
        lane.threshold = MIN_FORCE_EPSILON * (lane.target - current).abs();
    }
}

impl Motion for SpringMotion {
    fn begin(&mut self, lanes: &mut [Lane]) {
        for lane in lanes {
            let current = lane.slot.get().unwrap_or(lane.start);
            lane.start = current;
            lane.velocity = 0.0;
            Self::capture_threshold(lane, current);
        }
    }

    fn step(&mut self, lanes: &mut [Lane], dt: f32) -> StepOutcome {
        let mut settled = true;
        for lane in lanes.iter_mut() {
            let Some(mut value) = lane.slot.get() else {
                continue;
            };
            let displacement = lane.target - value;
            let force = self.tension * displacement - self.dampening * lane.velocity;
            lane.velocity += force * dt;
            value += lane.velocity * dt;
            lane.slot.set(value);

            let displacement = lane.target - value;
            let force = self.tension * displacement - self.dampening * lane.velocity;
            if displacement.abs() > lane.threshold || force.abs() > lane.threshold {
                settled = false;
            }
        }
        if settled {
            for lane in lanes.iter_mut() {
                lane.slot.set(lane.target);
                lane.velocity = 0.0;
            }
            StepOutcome::Finished
        } else {
            StepOutcome::Running
        }
    }

    /// New targets keep the current velocity, so a redirected spring carries
    /// its momentum.
    fn retarget(&mut self, lanes: &mut [Lane], targets: &[f32]) {
        for (lane, target) in lanes.iter_mut().zip(targets) {
            let current = lane.slot.get().unwrap_or(lane.target);
            lane.target = *target;
            Self::capture_threshold(lane, current);
        }
    }

    fn restart_on_retarget(&self) -> bool {
        self.auto_restart
    }
}

impl Engine<SpringMotion> {
    /// A spring over `store`, one lane per target component.
    pub fn spring(store: &SlotStore, targets: &[f32], params: SpringParams) -> Self {
        let lanes = targets
            .iter()
            .enumerate()
            .map(|(i, target)| Lane::new(store.slot(i), *target));
        Engine::new(SpringMotion::new(params), lanes)
    }
}
