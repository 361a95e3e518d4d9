//! Per-object animation groups
//!
//! Each animated object gets one `Group`, keyed by sink identity in the
//! context's table; each group maps abstract properties to their live
//! handler. The table only ever holds the single live handler per
//! (object, property) pair, and a group that loses its last handler is
//! removed with it.

use std::sync::{Mutex, Weak};

use rustc_hash::FxHashMap;
use tracing::trace;

use drift_core::{Property, SinkKey};

use crate::handler::Handler;

#[derive(Default)]
pub(crate) struct Group {
    pub(crate) handlers: FxHashMap<Property, Handler>,
}

pub(crate) type GroupTable = FxHashMap<SinkKey, Group>;

/// Weak reference to a context's group table, captured by handler hooks.
pub(crate) type GroupsRef = Weak<Mutex<GroupTable>>;

/// Drop the handler for `(key, property)`, and its group if that was the
/// last one. Dropping the handler cancels its engine.
pub(crate) fn remove_handler(groups: &GroupsRef, key: SinkKey, property: Property) {
    let Some(table) = groups.upgrade() else {
        return;
    };
    let mut table = table.lock().unwrap();
    if let Some(group) = table.get_mut(&key) {
        if group.handlers.remove(&property).is_some() {
            trace!(?property, "removed animation handler");
        }
        if group.handlers.is_empty() {
            table.remove(&key);
        }
    }
}
