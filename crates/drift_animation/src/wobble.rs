//! Wobble motion
//!
//! Sinusoidal oscillation around captured start values, continuous or
//! time-bounded. Strength ramps in and out through tween-shaped envelopes so
//! a wobble never starts or stops with a visible pop, and the phase clock
//! advances even while the engine is idle or stopped, so resuming is always
//! phase-continuous.

use serde::{Deserialize, Serialize};

use crate::easing::Ease;
use crate::engine::{Engine, Lane, Motion, StepOutcome, StopResponse};
use crate::slot::SlotStore;
use crate::tween::TweenParams;

/// Wobble configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WobbleParams {
    /// Oscillation rate in radians per second.
    pub frequency: f32,
    /// Peak displacement from the start value.
    pub amplitude: f32,
    /// Seconds of full-strength oscillation; `None` runs until stopped.
    /// The countdown begins once the ease-in envelope lands.
    pub duration: Option<f32>,
    /// Overall output multiplier.
    pub intensity: f32,
    /// Strength envelope from 0 to full on start.
    pub ease_in: Option<TweenParams>,
    /// Strength envelope from full to 0 on stop or duration end.
    pub ease_out: Option<TweenParams>,
}

impl WobbleParams {
    pub fn new(frequency: f32, amplitude: f32) -> Self {
        Self {
            frequency,
            amplitude,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds.max(0.0));
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity.max(0.0);
        self
    }

    pub fn with_ease_in(mut self, ramp: TweenParams) -> Self {
        self.ease_in = Some(ramp);
        self
    }

    pub fn with_ease_out(mut self, ramp: TweenParams) -> Self {
        self.ease_out = Some(ramp);
        self
    }
}

impl Default for WobbleParams {
    fn default() -> Self {
        Self {
            frequency: 10.0,
            amplitude: 1.0,
            duration: None,
            intensity: 1.0,
            ease_in: None,
            ease_out: None,
        }
    }
}

/// Strength envelope: a scalar tween from `from` to `to`.
struct StrengthRamp {
    elapsed: f32,
    duration: f32,
    easing: Ease,
    from: f32,
    to: f32,
}

impl StrengthRamp {
    fn new(params: TweenParams, from: f32, to: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: params.duration.max(0.0),
            easing: params.easing,
            from,
            to,
        }
    }

    fn step(&mut self, dt: f32) -> (f32, bool) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            (self.to, true)
        } else {
            let t = self.elapsed / self.duration;
            (self.easing.interpolate(t, self.from, self.to), false)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WobblePhase {
    RampIn,
    Steady,
    RampOut,
    Landed,
}

/// Keep the phase clock well away from the float range where adding a tick
/// stops changing it.
const CLOCK_CEILING: f32 = 1.0e4;

/// The wobble motion rule.
pub struct WobbleMotion {
    frequency: f32,
    amplitude: f32,
    intensity: f32,
    duration: Option<f32>,
    remaining: Option<f32>,
    clock: f32,
    strength: f32,
    ease_in: Option<TweenParams>,
    ease_out: Option<TweenParams>,
    ramp: Option<StrengthRamp>,
    phase: WobblePhase,
}

impl WobbleMotion {
    pub fn new(params: WobbleParams) -> Self {
        Self {
            frequency: params.frequency.max(0.0),
            amplitude: params.amplitude,
            intensity: params.intensity.max(0.0),
            duration: params.duration,
            remaining: None,
            clock: 0.0,
            strength: 0.0,
            ease_in: params.ease_in,
            ease_out: params.ease_out,
            ramp: None,
            phase: WobblePhase::Landed,
        }
    }

    /// Current envelope strength, 0 to 1.
    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity.max(0.0);
    }

    fn begin_ramp_out(&mut self) {
        match self.ease_out {
            Some(ramp) => {
                self.ramp = Some(StrengthRamp::new(ramp, self.strength, 0.0));
                self.phase = WobblePhase::RampOut;
            }
            None => {
                self.strength = 0.0;
                self.phase = WobblePhase::Landed;
            }
        }
    }

    fn wave(&self) -> f32 {
        (self.clock * self.frequency).sin() * self.amplitude * self.strength * self.intensity
    }
}

impl Motion for WobbleMotion {
    fn begin(&mut self, lanes: &mut [Lane]) {
        // Only recapture the oscillation center when fully at rest; a
        // restart mid-envelope keeps the old center so output stays
        // continuous.
        if self.strength <= 0.0 {
            for lane in lanes.iter_mut() {
                lane.start = lane.slot.get().unwrap_or(lane.start);
            }
        }
        self.remaining = self.duration;
        match self.ease_in {
            Some(ramp) => {
                self.ramp = Some(StrengthRamp::new(ramp, self.strength, 1.0));
                self.phase = WobblePhase::RampIn;
            }
            None => {
                self.strength = 1.0;
                self.ramp = None;
                self.phase = WobblePhase::Steady;
            }
        }
    }

    fn step(&mut self, lanes: &mut [Lane], dt: f32) -> StepOutcome {
        match self.phase {
            WobblePhase::RampIn => {
                if let Some(ramp) = self.ramp.as_mut() {
                    let (strength, done) = ramp.step(dt);
                    self.strength = strength;
                    if done {
                        self.ramp = None;
                        self.phase = WobblePhase::Steady;
                    }
                } else {
                    self.phase = WobblePhase::Steady;
                }
            }
            WobblePhase::Steady => {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= dt;
                    if *remaining <= 0.0 {
                        self.begin_ramp_out();
                    }
                }
            }
            WobblePhase::RampOut => {
                if let Some(ramp) = self.ramp.as_mut() {
                    let (strength, done) = ramp.step(dt);
                    self.strength = strength;
                    if done {
                        self.ramp = None;
                        self.phase = WobblePhase::Landed;
                    }
                } else {
                    self.phase = WobblePhase::Landed;
                }
            }
            WobblePhase::Landed => {}
        }

        if self.phase == WobblePhase::Landed {
            self.strength = 0.0;
            for lane in lanes.iter_mut() {
                lane.slot.set(lane.start);
            }
            return StepOutcome::Finished;
        }

        let wave = self.wave();
        for lane in lanes.iter_mut() {
            lane.slot.set(lane.start + wave);
        }
        StepOutcome::Running
    }

    /// Re-center the oscillation on new base values.
    fn retarget(&mut self, lanes: &mut [Lane], targets: &[f32]) {
        for (lane, target) in lanes.iter_mut().zip(targets) {
            lane.start = *target;
        }
    }

    /// The clock runs even while the engine is idle or stopped so resuming
    /// stays phase-continuous.
    fn advance_clock(&mut self, dt: f32) {
        self.clock += dt;
        if self.clock > CLOCK_CEILING && self.frequency > 0.0 {
            // Shed whole periods only, preserving phase.
            let period = core::f32::consts::TAU / self.frequency;
            self.clock -= (self.clock / period).floor() * period;
        }
    }

    fn request_stop(&mut self) -> StopResponse {
        if self.ease_out.is_some() && self.strength > 0.0 {
            self.begin_ramp_out();
            StopResponse::Deferred
        } else {
            self.strength = 0.0;
            self.phase = WobblePhase::Landed;
            StopResponse::Stopped
        }
    }
}

impl Engine<WobbleMotion> {
    /// A wobble over every component of `store`.
    pub fn wobble(store: &SlotStore, params: WobbleParams) -> Self {
        let lanes = (0..store.len()).map(|i| Lane::new(store.slot(i), 0.0));
        Engine::new(WobbleMotion::new(params), lanes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueItem;

    const DT: f32 = 1.0 / 120.0;

    #[test]
    fn oscillates_around_start_value() {
        let store = SlotStore::from_components(&[10.0]);
        let mut engine = Engine::wobble(&store, WobbleParams::new(8.0, 2.0));
        engine.start();
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..240 {
            engine.update(DT);
            let v = store.snapshot()[0];
            min = min.min(v);
            max = max.max(v);
        }
        assert!(max > 11.5 && max <= 12.0 + 1e-3);
        assert!(min < 8.5 && min >= 8.0 - 1e-3);
    }

    #[test]
    fn bounded_duration_completes_and_returns_to_start() {
        let store = SlotStore::from_components(&[5.0]);
        let mut engine = Engine::wobble(
            &store,
            WobbleParams::new(10.0, 3.0)
                .with_duration(0.5)
                .with_ease_out(TweenParams::new(0.1)),
        );
        engine.start();
        let mut ticks = 0;
        while engine.update(DT) {
            ticks += 1;
            assert!(ticks < 1_000, "bounded wobble never completed");
        }
        assert!(engine.is_complete());
        assert_eq!(store.snapshot()[0], 5.0);
    }

    #[test]
    fn stop_without_ease_out_halts_immediately() {
        let store = SlotStore::from_components(&[0.0]);
        let mut engine = Engine::wobble(&store, WobbleParams::new(10.0, 1.0));
        engine.start();
        for _ in 0..10 {
            engine.update(DT);
        }
        engine.stop();
        assert_eq!(engine.state(), crate::engine::EngineState::Stopped);
    }

    #[test]
    fn stop_with_ease_out_winds_down_then_completes() {
        let store = SlotStore::from_components(&[0.0]);
        let mut engine = Engine::wobble(
            &store,
            WobbleParams::new(10.0, 1.0).with_ease_out(TweenParams::new(0.2)),
        );
        engine.start();
        for _ in 0..10 {
            engine.update(DT);
        }
        engine.stop();
        // Still updating: the ease-out envelope is running.
        assert_eq!(engine.state(), crate::engine::EngineState::Update);
        let mut ticks = 0;
        while engine.update(DT) {
            ticks += 1;
            assert!(ticks < 1_000);
        }
        assert!(engine.is_complete());
        assert_eq!(store.snapshot()[0], 0.0);
    }

    #[test]
    fn clock_wrap_preserves_phase() {
        let mut motion = WobbleMotion::new(WobbleParams::new(8.0, 1.0));
        motion.clock = CLOCK_CEILING + 0.37;
        let before = (motion.clock * motion.frequency).sin();
        motion.advance_clock(0.0);
        let after = (motion.clock * motion.frequency).sin();
        assert!(motion.clock < CLOCK_CEILING);
        // f32 argument reduction at 1e4 seconds costs a little phase.
        assert!((before - after).abs() < 0.05);
    }

    #[test]
    fn stop_restart_with_envelopes_is_phase_continuous() {
        let store = SlotStore::from_components(&[0.0]);
        let params = WobbleParams::new(8.0, 5.0)
            .with_ease_in(TweenParams::new(0.25))
            .with_ease_out(TweenParams::new(0.25));
        let mut engine = Engine::wobble(&store, params);
        // The biggest step the output can take in one tick: wave slope plus
        // envelope slope, with margin.
        let bound = (5.0 * 8.0 + 5.0 / 0.25) * DT * 2.0;

        let mut last = store.snapshot()[0];
        let mut check = |engine: &mut Engine<WobbleMotion>, last: &mut f32| {
            engine.update(DT);
            let v = store.snapshot()[0];
            assert!(
                (v - *last).abs() <= bound,
                "discontinuous jump: {} -> {}",
                *last,
                v
            );
            *last = v;
        };

        engine.start();
        for _ in 0..60 {
            check(&mut engine, &mut last);
        }
        engine.stop();
        for _ in 0..20 {
            check(&mut engine, &mut last);
        }
        // Restart mid-wind-down.
        engine.start();
        for _ in 0..60 {
            check(&mut engine, &mut last);
        }
    }
}
