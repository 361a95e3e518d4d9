//! Tween motion
//!
//! Duration-bounded interpolation from captured start values to fixed
//! targets through an easing curve. The endpoints are exact: progress 0
//! writes the captured start, the completing tick writes the target itself
//! rather than the eased value, so no easing curve can leave a tween short
//! of its target.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::easing::Ease;
use crate::engine::{Engine, Lane, Motion, StepOutcome};
use crate::slot::SlotStore;

/// Tween configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenParams {
    /// Seconds from first step to completion.
    pub duration: f32,
    /// Seconds to hold before the first step.
    pub delay: f32,
    pub easing: Ease,
}

impl TweenParams {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Ease) -> Self {
        self.easing = easing;
        self
    }
}

impl Default for TweenParams {
    fn default() -> Self {
        Self {
            duration: 0.3,
            delay: 0.0,
            easing: Ease::Linear,
        }
    }
}

/// The tween motion rule.
pub struct TweenMotion {
    duration: f32,
    percentage: f32,
    easing: Ease,
    lane_easings: SmallVec<[Ease; 4]>,
}

impl TweenMotion {
    pub fn new(params: TweenParams) -> Self {
        Self {
            duration: params.duration.max(0.0),
            percentage: 0.0,
            easing: params.easing,
            lane_easings: SmallVec::new(),
        }
    }

    /// Normalized progress, 0 to 1.
    pub fn percentage(&self) -> f32 {
        self.percentage
    }

    pub fn easing(&self) -> Ease {
        self.easing
    }

    pub fn set_easing(&mut self, easing: Ease) {
        self.easing = easing;
        self.lane_easings.clear();
    }

    /// Give each component its own curve. Lanes beyond the slice fall back
    /// to the uniform easing.
    pub fn set_lane_easings(&mut self, easings: &[Ease]) {
        self.lane_easings = SmallVec::from_slice(easings);
    }

    fn ease_for(&self, lane: usize) -> Ease {
        self.lane_easings.get(lane).copied().unwrap_or(self.easing)
    }
}

impl Motion for TweenMotion {
    fn begin(&mut self, lanes: &mut [Lane]) {
        self.percentage = 0.0;
        for lane in lanes {
            lane.start = lane.slot.get().unwrap_or(lane.start);
        }
    }

    fn step(&mut self, lanes: &mut [Lane], dt: f32) -> StepOutcome {
        if self.duration <= 0.0 {
            self.percentage = 1.0;
        } else {
            self.percentage = (self.percentage + dt / self.duration).min(1.0);
        }
        let done = self.percentage >= 1.0;
        for (i, lane) in lanes.iter_mut().enumerate() {
            let value = if done {
                lane.target
            } else {
                self.ease_for(i)
                    .interpolate(self.percentage, lane.start, lane.target)
            };
            lane.slot.set(value);
        }
        if done {
            StepOutcome::Finished
        } else {
            StepOutcome::Running
        }
    }

    /// Redirect mid-flight: current values become the new start and
    /// progress rewinds to zero.
    fn retarget(&mut self, lanes: &mut [Lane], targets: &[f32]) {
        self.percentage = 0.0;
        for (lane, target) in lanes.iter_mut().zip(targets) {
            lane.start = lane.slot.get().unwrap_or(lane.start);
            lane.target = *target;
        }
    }
}

impl Engine<TweenMotion> {
    /// A tween over `store`, one lane per target component.
    pub fn tween(store: &SlotStore, targets: &[f32], params: TweenParams) -> Self {
        let lanes = targets
            .iter()
            .enumerate()
            .map(|(i, target)| Lane::new(store.slot(i), *target));
        let mut engine = Engine::new(TweenMotion::new(params), lanes);
        engine.set_delay(params.delay);
        engine
    }
}
