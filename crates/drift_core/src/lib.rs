//! Drift core vocabulary
//!
//! This crate provides the shared types the Drift animation core is built on:
//!
//! - **Math values**: `Vec2`, `Vec3`, `Color`, the concrete value types
//!   animations read and write
//! - **Animatable values**: `AnimValue` / `ValueKind`, a closed sum type over
//!   the supported component counts, so engines dispatch on shape exactly once
//! - **Property seam**: the `PropertySink` trait external objects implement so
//!   abstract properties (position, rotation, scale, color) can be driven
//!   without reflection
//! - **Binding errors**: `BindError` for the few API-level mistakes that are
//!   worth surfacing as a `Result`

pub mod error;
pub mod math;
pub mod property;
pub mod value;

pub use error::BindError;
pub use math::{Color, Vec2, Vec3};
pub use property::{shared_sink, sink_key, Property, PropertySink, SharedSink, SinkKey};
pub use value::{AnimValue, ValueKind};
