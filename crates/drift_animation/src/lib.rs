//! Drift Animation Core
//!
//! Per-tick property animation: tween, spring, and wobble engines on a
//! shared queue system.
//!
//! # Features
//!
//! - **Tweens**: duration-bounded easing with exact endpoints
//! - **Springs**: damped harmonic motion that completes by convergence and
//!   lands exactly on target
//! - **Wobbles**: phase-continuous oscillation with ease-in/ease-out
//!   strength envelopes
//! - **Property binding**: drive position, rotation, scale, or color on any
//!   object implementing `PropertySink`, with no reflection and one live
//!   animation per (object, property)
//! - **Queues**: insertion-ordered per-kind scheduling, one host tick drives
//!   everything, reentrant-safe callbacks
//! - **Timers**: one-shot and repeating callbacks with explicit handles
//!
//! # Example
//!
//! ```
//! use drift_animation::{AnimationContext, Ease, Property, TweenParams};
//! use drift_core::{shared_sink, AnimValue, PropertySink, Vec2};
//!
//! struct Panel {
//!     position: Vec2,
//! }
//!
//! impl PropertySink for Panel {
//!     fn read(&self, property: Property) -> Option<AnimValue> {
//!         match property {
//!             Property::Position => Some(AnimValue::Pair(self.position)),
//!             _ => None,
//!         }
//!     }
//!     fn write(&mut self, property: Property, value: AnimValue) {
//!         if let (Property::Position, AnimValue::Pair(p)) = (property, value) {
//!             self.position = p;
//!         }
//!     }
//! }
//!
//! let ctx = AnimationContext::new();
//! let panel = shared_sink(Panel { position: Vec2::ZERO });
//!
//! let handle = ctx
//!     .tween(
//!         &panel,
//!         Property::Position,
//!         Vec2::new(120.0, 40.0),
//!         TweenParams::new(0.25).with_easing(Ease::QuadOut),
//!     )
//!     .unwrap();
//!
//! for _ in 0..30 {
//!     ctx.tick(1.0 / 60.0);
//! }
//! assert!(handle.is_complete());
//! assert_eq!(
//!     panel.lock().unwrap().read(Property::Position),
//!     Some(AnimValue::Pair(Vec2::new(120.0, 40.0)))
//! );
//! ```

pub mod context;
pub mod easing;
pub mod engine;
pub mod handle;
pub mod queue;
pub mod slot;
pub mod spring;
pub mod timer;
pub mod tween;
pub mod wobble;

mod group;
mod handler;

pub use context::{global, install_global, try_global, AnimationContext};
pub use easing::Ease;
pub use engine::{Engine, EngineState, Lane, Motion, StepOutcome, StopResponse};
pub use handle::{EngineHandle, SpringHandle, TweenHandle, WobbleHandle};
pub use queue::{callback, Callback, Queue, QueueHandle, QueueItem, QueueKey, SharedItem};
pub use slot::{ScalarSlot, SlotStore};
pub use spring::{SpringMotion, SpringParams, MIN_FORCE_EPSILON};
pub use timer::{Timer, TimerHandle};
pub use tween::{TweenMotion, TweenParams};
pub use wobble::{WobbleMotion, WobbleParams};

pub use drift_core::{
    shared_sink, sink_key, AnimValue, BindError, Color, Property, PropertySink, SharedSink,
    SinkKey, ValueKind, Vec2, Vec3,
};
