//! The property seam
//!
//! External objects become animatable by implementing [`PropertySink`]: a
//! read/write pair over abstract properties. Each sink implementation is an
//! ordinary `match` over the properties it exposes, so the binding between an
//! abstract property and a concrete field is checked at compile time; there
//! is no reflection anywhere in the pipeline.
//!
//! The same property can have different shapes on different sinks (a 2D
//! node's position is a `Pair`, a 3D node's is a `Triple`); the shape a sink
//! reports from `read` is the shape the binding layer drives.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::value::AnimValue;

/// Abstract animatable property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    Position,
    Rotation,
    Scale,
    Color,
}

/// Implemented by objects whose properties can be animated.
pub trait PropertySink: Send + 'static {
    /// Current value of `property`, or `None` if this object does not expose
    /// it. The returned shape decides how many scalar lanes drive it.
    fn read(&self, property: Property) -> Option<AnimValue>;

    /// Store a new value for `property`. Unknown properties are ignored.
    fn write(&mut self, property: Property, value: AnimValue);
}

/// Shared handle to an animatable object.
///
/// The animation core only ever holds `Weak` references derived from this, so
/// dropping the last user-side `Arc` ends every animation on the object.
pub type SharedSink = Arc<Mutex<dyn PropertySink>>;

/// Wrap a concrete sink for use with the animation context.
pub fn shared_sink<S: PropertySink>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// Identity of a sink, used to key per-object animation groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SinkKey(usize);

/// Identity is the shared allocation, so clones of the same `Arc` map to the
/// same group.
pub fn sink_key(sink: &SharedSink) -> SinkKey {
    SinkKey(Arc::as_ptr(sink) as *const () as usize)
}
