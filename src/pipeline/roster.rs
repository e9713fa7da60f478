//! Copy-on-write set of active inputs.
//!
//! Polls load the current [`Roster`] without locking. Adding or removing an
//! input rebuilds the roster under a single writer lock, the only exclusive
//! section around the total weight. The total is stored in the same snapshot
//! as the member list, so readers never see the two disagree.

use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use parking_lot::Mutex;
use rand::Rng;

use crate::selection;
use crate::source::{Slot, SourceId};

/// Immutable snapshot of the active inputs, in registration order.
pub(crate) struct Roster<T> {
    inputs: Vec<Arc<Slot<T>>>,
    total_weight: f64,
}

impl<T> Roster<T> {
    fn new(inputs: Vec<Arc<Slot<T>>>) -> Self {
        let total_weight = inputs.iter().map(|slot| slot.priority()).sum();
        Self {
            inputs,
            total_weight,
        }
    }

    pub(crate) fn inputs(&self) -> &[Arc<Slot<T>>] {
        &self.inputs
    }

    pub(crate) fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub(crate) fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Weighted draw: picks an input with probability `priority / total_weight`.
    pub(crate) fn pick(&self) -> Option<&Arc<Slot<T>>> {
        if self.inputs.is_empty() || self.total_weight <= 0.0 {
            return None;
        }
        let threshold = self.total_weight * rand::rng().random::<f64>();
        self.pick_at(threshold)
    }

    /// Deterministic half of [`pick`](Self::pick).
    pub(crate) fn pick_at(&self, threshold: f64) -> Option<&Arc<Slot<T>>> {
        selection::select(&self.inputs, threshold)
    }
}

/// Shared cell holding the current roster.
pub(crate) struct RosterCell<T> {
    current: ArcSwap<Roster<T>>,
    writer: Mutex<()>,
}

impl<T> RosterCell<T> {
    pub(crate) fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Roster::new(Vec::new())),
            writer: Mutex::new(()),
        }
    }

    /// Cheap, short-lived view for a single poll.
    pub(crate) fn load(&self) -> Guard<Arc<Roster<T>>> {
        self.current.load()
    }

    /// Owned snapshot for callers that hold it across a wait or a sweep.
    pub(crate) fn load_full(&self) -> Arc<Roster<T>> {
        self.current.load_full()
    }

    /// Appends an input. Returns the new total weight.
    pub(crate) fn insert(&self, slot: Arc<Slot<T>>) -> f64 {
        let _writer = self.writer.lock();
        let mut inputs = self.current.load().inputs.clone();
        inputs.push(slot);
        self.publish(inputs)
    }

    /// Drops the input with `id`. Returns the new total weight, or `None` if
    /// the input was not a member.
    pub(crate) fn remove(&self, id: SourceId) -> Option<f64> {
        let _writer = self.writer.lock();
        let current = self.current.load();
        let position = current.inputs.iter().position(|slot| slot.id() == id)?;
        let mut inputs = current.inputs.clone();
        drop(current);
        inputs.remove(position);
        Some(self.publish(inputs))
    }

    fn publish(&self, inputs: Vec<Arc<Slot<T>>>) -> f64 {
        let roster = Roster::new(inputs);
        let total_weight = roster.total_weight;
        self.current.store(Arc::new(roster));
        total_weight
    }
}
