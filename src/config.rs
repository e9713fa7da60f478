//! Configuration types for combiners and their inputs.

use std::time::Duration;

/// Default period of the idle-input sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// What happens to elements still buffered in an input when it is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    /// Drop the leftovers.
    ///
    /// An input that is removed or times out is treated as abandoned; its
    /// unpolled elements are discarded and reported through
    /// [`CombinerEvent::ElementsDiscarded`](crate::CombinerEvent::ElementsDiscarded).
    #[default]
    Discard,

    /// Keep the leftovers deliverable.
    ///
    /// Leftovers move to a combiner-level queue that polls consult after all
    /// active inputs came up empty.
    Drain,
}

impl RemovalPolicy {
    /// Returns `true` if removal keeps buffered elements deliverable.
    #[must_use]
    pub fn keeps_leftovers(&self) -> bool {
        matches!(self, Self::Drain)
    }
}

/// Configuration for combiner behavior.
///
/// Use [`CombinerConfig::default()`] for the defaults, or customize:
///
/// ```
/// use stream_combiner::{CombinerConfig, RemovalPolicy};
/// use std::time::Duration;
///
/// let config = CombinerConfig {
///     removal_policy: RemovalPolicy::Drain,
///     ..Default::default()
/// };
/// assert_eq!(config.sweep_interval, Duration::from_millis(10));
/// ```
#[derive(Debug, Clone)]
pub struct CombinerConfig {
    /// How often the sweeper checks inputs for idle timeouts.
    ///
    /// An idle input is evicted at most one interval after its deadline.
    /// Default: 10ms
    pub sweep_interval: Duration,

    /// Fate of buffered elements when an input is removed.
    ///
    /// Default: [`RemovalPolicy::Discard`]
    pub removal_policy: RemovalPolicy,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            removal_policy: RemovalPolicy::default(),
        }
    }
}

/// Settings for a single input.
///
/// [`Combiner::add_input`](crate::Combiner::add_input) covers the common case;
/// build an `InputConfig` for bounded inputs.
///
/// ```
/// use stream_combiner::InputConfig;
/// use std::time::Duration;
///
/// let config = InputConfig::new(2.0)
///     .empty_timeout(Duration::from_secs(5))
///     .capacity(1024);
/// assert_eq!(config.capacity, Some(1024));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InputConfig {
    /// Selection weight. Must be finite and non-negative.
    pub priority: f64,

    /// Idle window after which an input without `put`s is evicted.
    ///
    /// `Duration::ZERO` disables eviction.
    pub empty_timeout: Duration,

    /// Maximum number of buffered elements, `None` for unbounded.
    ///
    /// A full input rejects `put` with
    /// [`CombinerError::Capacity`](crate::CombinerError::Capacity) rather
    /// than blocking the producer.
    pub capacity: Option<usize>,
}

impl InputConfig {
    /// Creates an unbounded, never-expiring input config with the given priority.
    pub fn new(priority: f64) -> Self {
        Self {
            priority,
            empty_timeout: Duration::ZERO,
            capacity: None,
        }
    }

    /// Sets the idle timeout.
    #[must_use]
    pub fn empty_timeout(mut self, timeout: Duration) -> Self {
        self.empty_timeout = timeout;
        self
    }

    /// Bounds the input to `capacity` buffered elements.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Returns the idle timeout, or `None` if the input never expires.
    pub(crate) fn expiry(&self) -> Option<Duration> {
        (!self.empty_timeout.is_zero()).then_some(self.empty_timeout)
    }
}
