//! Property handlers
//!
//! A handler is the binding between one (object, property) pair and one
//! engine: it owns the scalar backing store the engine's slots point into,
//! and the hooks that copy fresh values onto the object each tick and that
//! unbind everything when the animation ends or the object disappears.

use std::sync::{Arc, Mutex, Weak};

use smallvec::SmallVec;
use tracing::debug;

use drift_core::{AnimValue, BindError, Property, PropertySink, SharedSink, SinkKey, ValueKind};

use crate::engine::Engine;
use crate::group::{remove_handler, GroupsRef};
use crate::queue::{callback, Callback};
use crate::slot::SlotStore;
use crate::spring::SpringMotion;
use crate::tween::TweenMotion;
use crate::wobble::WobbleMotion;

pub(crate) type SharedEngine<M> = Arc<Mutex<Engine<M>>>;

/// The engine a handler manages, by kind.
pub(crate) enum HandlerEngine {
    Tween(SharedEngine<TweenMotion>),
    Spring(SharedEngine<SpringMotion>),
    Wobble(SharedEngine<WobbleMotion>),
}

impl HandlerEngine {
    fn delete(&self) {
        match self {
            HandlerEngine::Tween(e) => e.lock().unwrap().delete(),
            HandlerEngine::Spring(e) => e.lock().unwrap().delete(),
            HandlerEngine::Wobble(e) => e.lock().unwrap().delete(),
        }
    }
}

/// Live binding of one engine to one (sink, property) pair.
pub(crate) struct Handler {
    /// Exclusive backing storage; dropping it invalidates the engine's slots.
    #[allow(dead_code)]
    store: SlotStore,
    engine: HandlerEngine,
}

impl Handler {
    pub(crate) fn new(store: SlotStore, engine: HandlerEngine) -> Self {
        Self { store, engine }
    }
}

impl Drop for Handler {
    fn drop(&mut self) {
        // A replaced or unbound handler takes its engine down with it; the
        // engine's callbacks are cleared so nothing fires afterwards.
        self.engine.delete();
    }
}

/// The pieces needed to build an engine over a sink property.
pub(crate) struct Binding {
    pub(crate) store: SlotStore,
    pub(crate) kind: ValueKind,
    pub(crate) targets: SmallVec<[f32; 4]>,
}

/// Read the property's current value, check shapes, and allocate backing
/// storage primed with it.
pub(crate) fn bind(
    sink: &SharedSink,
    property: Property,
    target: AnimValue,
) -> Result<Binding, BindError> {
    let current = sink
        .lock()
        .unwrap()
        .read(property)
        .ok_or(BindError::MissingProperty { property })?;
    if current.kind() != target.kind() {
        return Err(BindError::KindMismatch {
            property,
            expected: current.kind(),
            got: target.kind(),
        });
    }
    let count = current.component_count();
    let mut components = [0.0f32; 4];
    current.write_components(&mut components);
    let store = SlotStore::from_components(&components[..count]);
    let mut target_components = [0.0f32; 4];
    target.write_components(&mut target_components);
    Ok(Binding {
        store,
        kind: current.kind(),
        targets: SmallVec::from_slice(&target_components[..count]),
    })
}

/// Backing storage for a wobble binding: no target value, just the current
/// property components.
pub(crate) fn bind_current(sink: &SharedSink, property: Property) -> Result<Binding, BindError> {
    let current = sink
        .lock()
        .unwrap()
        .read(property)
        .ok_or(BindError::MissingProperty { property })?;
    let count = current.component_count();
    let mut components = [0.0f32; 4];
    current.write_components(&mut components);
    Ok(Binding {
        store: SlotStore::from_components(&components[..count]),
        kind: current.kind(),
        targets: SmallVec::new(),
    })
}

/// The per-tick apply hook: copy the backing scalars onto the real object.
/// When the object is gone, unbind its handler instead; the engine then
/// self-cancels on its next access to the dropped store.
pub(crate) fn apply_callback(
    store: &SlotStore,
    sink: &SharedSink,
    property: Property,
    kind: ValueKind,
    groups: GroupsRef,
    key: SinkKey,
) -> Callback {
    let slots = store.slots();
    let sink: Weak<Mutex<dyn PropertySink>> = Arc::downgrade(sink);
    callback(move || {
        let mut components = [0.0f32; 4];
        for (i, slot) in slots.iter().enumerate() {
            match slot.get() {
                Some(value) => components[i] = value,
                None => return,
            }
        }
        match sink.upgrade() {
            Some(sink) => {
                let value = AnimValue::from_components(kind, &components[..slots.len()]);
                sink.lock().unwrap().write(property, value);
            }
            None => {
                debug!(?property, "animation target dropped, unbinding handler");
                remove_handler(&groups, key, property);
            }
        }
    })
}

/// The completion hook: unbind the handler once its engine finishes.
pub(crate) fn completion_callback(groups: GroupsRef, key: SinkKey, property: Property) -> Callback {
    callback(move || remove_handler(&groups, key, property))
}
