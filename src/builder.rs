//! Builder pattern for `Combiner`.

use std::marker::PhantomData;
use std::time::Duration;

use crate::{
    event_callback, Combiner, CombinerConfig, CombinerError, CombinerEvent, EventCallback,
    RemovalPolicy,
};

/// Builder for configuring and starting a combiner.
///
/// Use [`Combiner::builder()`] to create a new builder.
///
/// # Example
///
/// ```
/// use stream_combiner::{Combiner, CombinerEvent, RemovalPolicy};
/// use std::time::Duration;
///
/// let combiner: Combiner<String> = Combiner::builder()
///     .sweep_interval(Duration::from_millis(50))
///     .removal_policy(RemovalPolicy::Drain)
///     .on_event(|event| {
///         if let CombinerEvent::InputRemoved { source_id, reason, .. } = event {
///             tracing::info!(%source_id, %reason, "input gone");
///         }
///     })
///     .build()?;
/// # combiner.close();
/// # Ok::<(), stream_combiner::CombinerError>(())
/// ```
#[must_use]
pub struct CombinerBuilder<T> {
    config: CombinerConfig,
    event_callback: Option<EventCallback>,
    _element: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> Default for CombinerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> CombinerBuilder<T> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: CombinerConfig::default(),
            event_callback: None,
            _element: PhantomData,
        }
    }

    /// Sets how often idle inputs are checked for eviction.
    ///
    /// Values below one millisecond are raised to one millisecond.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Sets what happens to buffered elements of removed inputs.
    pub fn removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.config.removal_policy = policy;
        self
    }

    /// Sets a callback for lifecycle events.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(CombinerEvent) + Send + Sync + 'static,
    {
        self.event_callback = Some(event_callback(callback));
        self
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: CombinerConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration the combiner will start with.
    pub fn config(&self) -> &CombinerConfig {
        &self.config
    }

    /// Starts the sweeper and returns the combiner.
    ///
    /// # Errors
    ///
    /// Returns [`CombinerError::SweeperSpawn`] if the sweeper thread cannot start.
    pub fn build(self) -> Result<Combiner<T>, CombinerError> {
        tracing::debug!(
            sweep_interval_ms = self.config.sweep_interval.as_millis() as u64,
            policy = ?self.config.removal_policy,
            "starting combiner"
        );
        Combiner::start(self.config, self.event_callback)
    }
}
