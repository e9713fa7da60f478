//! Error types for stream-combiner.
//!
//! Every fallible operation returns [`CombinerError`]. Errors are local to the
//! call that produced them: a failing `put` or an interrupted wait never
//! leaves the combiner's roster or total weight inconsistent.

use crate::source::SourceId;

/// Errors returned by [`Combiner`](crate::Combiner) and [`Input`](crate::Input).
#[derive(Debug, thiserror::Error)]
pub enum CombinerError {
    /// The input was already removed (explicitly or by idle timeout).
    ///
    /// Returned by [`Input::put`](crate::Input::put). The rejected value is
    /// dropped.
    #[error("input {source_id} has been removed")]
    Removed {
        /// The removed input.
        source_id: SourceId,
    },

    /// A consumer blocked in a timed poll was interrupted.
    ///
    /// Raised by [`Combiner::interrupt()`](crate::Combiner::interrupt) and
    /// [`Combiner::close()`](crate::Combiner::close).
    #[error("timed poll interrupted")]
    Interrupted,

    /// A bounded input is full.
    #[error("input {source_id} is full (capacity {capacity})")]
    Capacity {
        /// The full input.
        source_id: SourceId,
        /// Configured capacity of the input.
        capacity: usize,
    },

    /// The priority is negative, NaN or infinite.
    #[error("invalid priority {priority}: must be finite and non-negative")]
    InvalidPriority {
        /// The rejected priority.
        priority: f64,
    },

    /// The combiner was closed and accepts no new inputs.
    #[error("combiner is closed")]
    Closed,

    /// The background sweeper thread could not be started.
    #[error("failed to spawn timeout sweeper: {source}")]
    SweeperSpawn {
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

impl CombinerError {
    /// Returns `true` if this is [`CombinerError::Interrupted`].
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }

    /// Creates a removed-input error for the given source.
    pub(crate) fn removed(source_id: SourceId) -> Self {
        Self::Removed { source_id }
    }
}
