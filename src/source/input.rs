//! Producer handle for one combiner input.

use std::sync::Arc;

use crate::event::RemovalReason;
use crate::source::{Slot, SourceId};
use crate::CombinerError;

/// Handle through which producers feed one input of a [`Combiner`](crate::Combiner).
///
/// Obtained from [`Combiner::add_input`](crate::Combiner::add_input). Cloning
/// is cheap and every clone feeds the same input, so several producer
/// threads can share it.
///
/// # Example
///
/// ```
/// use stream_combiner::Combiner;
/// use std::time::Duration;
///
/// let combiner = Combiner::<&str>::new()?;
/// let input = combiner.add_input(1.0, Duration::ZERO)?;
///
/// input.put("hello")?;
/// assert_eq!(combiner.poll(), Some("hello"));
///
/// input.remove();
/// assert!(input.is_removed());
/// assert!(input.put("too late").is_err());
/// # Ok::<(), stream_combiner::CombinerError>(())
/// ```
pub struct Input<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Input<T> {
    pub(crate) fn new(slot: Arc<Slot<T>>) -> Self {
        Self { slot }
    }

    /// Adds an element to this input.
    ///
    /// Never blocks. Refreshes the idle deadline on success.
    ///
    /// # Errors
    ///
    /// - [`CombinerError::Removed`] if the input was already removed.
    /// - [`CombinerError::Capacity`] if the input is bounded and full.
    ///
    /// The value is dropped in both cases.
    pub fn put(&self, value: T) -> Result<(), CombinerError> {
        self.slot.push(value)
    }

    /// Detaches this input from the combiner. Does nothing if already removed.
    ///
    /// Elements still buffered are handled per the combiner's
    /// [`RemovalPolicy`](crate::RemovalPolicy).
    pub fn remove(&self) {
        self.slot.remove(RemovalReason::Explicit);
    }

    /// Returns `true` once the input was removed, explicitly or by idle timeout.
    pub fn is_removed(&self) -> bool {
        self.slot.is_removed()
    }

    /// Returns this input's identifier.
    pub fn id(&self) -> SourceId {
        self.slot.id()
    }

    /// Returns this input's selection weight.
    pub fn priority(&self) -> f64 {
        self.slot.priority()
    }

    /// Returns the number of elements buffered and not yet polled.
    pub fn len(&self) -> usize {
        self.slot.len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Clone for Input<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> std::fmt::Debug for Input<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Input")
            .field("id", &self.slot.id())
            .field("priority", &self.slot.priority())
            .field("removed", &self.slot.is_removed())
            .finish_non_exhaustive()
    }
}
