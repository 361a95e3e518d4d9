//! Scalar slots
//!
//! A [`SlotStore`] is the flat `f32` backing array one binding owns; a
//! [`ScalarSlot`] grants read/write access to a single component of it
//! without owning it. Slots hold only a weak reference, so every access
//! checks whether the owner is still alive: a dead slot reads as `None`
//! and writes are dropped, which the engines treat as their cue to cancel
//! themselves.

use std::sync::{Arc, Mutex, Weak};

/// Backing storage for the scalar components of one animated value.
#[derive(Clone)]
pub struct SlotStore {
    values: Arc<Mutex<Vec<f32>>>,
}

impl SlotStore {
    /// A store of `len` zeroed components.
    pub fn new(len: usize) -> Self {
        Self {
            values: Arc::new(Mutex::new(vec![0.0; len])),
        }
    }

    /// A store initialized from existing component values.
    pub fn from_components(components: &[f32]) -> Self {
        Self {
            values: Arc::new(Mutex::new(components.to_vec())),
        }
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A slot over component `index`.
    pub fn slot(&self, index: usize) -> ScalarSlot {
        ScalarSlot {
            values: Arc::downgrade(&self.values),
            index,
        }
    }

    /// One slot per component, in order.
    pub fn slots(&self) -> Vec<ScalarSlot> {
        (0..self.len()).map(|i| self.slot(i)).collect()
    }

    /// Copy of the current component values.
    pub fn snapshot(&self) -> Vec<f32> {
        self.values.lock().unwrap().clone()
    }

    /// Overwrite the head of the store with `components`.
    pub fn write(&self, components: &[f32]) {
        let mut values = self.values.lock().unwrap();
        for (dst, src) in values.iter_mut().zip(components) {
            *dst = *src;
        }
    }
}

/// Read/write handle to one externally owned scalar.
#[derive(Clone)]
pub struct ScalarSlot {
    values: Weak<Mutex<Vec<f32>>>,
    index: usize,
}

impl ScalarSlot {
    /// Current value, or `None` once the owning store is gone.
    pub fn get(&self) -> Option<f32> {
        self.values
            .upgrade()
            .and_then(|values| values.lock().unwrap().get(self.index).copied())
    }

    /// Store a value. Returns false once the owning store is gone.
    pub fn set(&self, value: f32) -> bool {
        let Some(values) = self.values.upgrade() else {
            return false;
        };
        let mut values = values.lock().unwrap();
        match values.get_mut(self.index) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.values.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_reads_and_writes() {
        let store = SlotStore::from_components(&[1.0, 2.0]);
        let slot = store.slot(1);
        assert_eq!(slot.get(), Some(2.0));
        assert!(slot.set(5.0));
        assert_eq!(store.snapshot(), vec![1.0, 5.0]);
    }

    #[test]
    fn dead_store_is_a_quiet_no_op() {
        let slot = {
            let store = SlotStore::new(1);
            store.slot(0)
        };
        assert!(!slot.is_alive());
        assert_eq!(slot.get(), None);
        assert!(!slot.set(3.0));
    }

    #[test]
    fn out_of_range_slot_never_panics() {
        let store = SlotStore::new(2);
        let slot = store.slot(7);
        assert_eq!(slot.get(), None);
        assert!(!slot.set(1.0));
    }
}
