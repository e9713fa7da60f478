//! Lifecycle events for monitoring a combiner.
//!
//! Events are non-fatal notifications. The combiner keeps serving after any
//! event; they exist for logging and metrics, not error handling.

use std::sync::Arc;

use crate::source::SourceId;

/// Why an input left the combiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// [`Input::remove()`](crate::Input::remove) was called.
    Explicit,
    /// The input received no `put` within its idle timeout.
    IdleTimeout,
}

impl std::fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::IdleTimeout => f.write_str("idle timeout"),
        }
    }
}

/// Events emitted as inputs come and go.
///
/// # Example
///
/// ```
/// use stream_combiner::CombinerEvent;
///
/// fn handle_event(event: CombinerEvent) {
///     match event {
///         CombinerEvent::InputAdded { source_id, priority } => {
///             eprintln!("{source_id} joined with priority {priority}");
///         }
///         CombinerEvent::InputRemoved { source_id, reason, buffered } => {
///             eprintln!("{source_id} left ({reason}) with {buffered} buffered");
///         }
///         CombinerEvent::ElementsDiscarded { source_id, count } => {
///             eprintln!("{source_id}: {count} elements discarded");
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CombinerEvent {
    /// An input was registered.
    InputAdded {
        /// ID of the new input.
        source_id: SourceId,
        /// Its selection weight.
        priority: f64,
    },

    /// An input was removed and no longer takes part in selection.
    InputRemoved {
        /// ID of the removed input.
        source_id: SourceId,
        /// Why it was removed.
        reason: RemovalReason,
        /// Elements still buffered in the input at removal.
        buffered: usize,
    },

    /// Buffered elements of a removed input were dropped.
    ///
    /// Only emitted under [`RemovalPolicy::Discard`](crate::RemovalPolicy::Discard).
    ElementsDiscarded {
        /// Input the elements belonged to.
        source_id: SourceId,
        /// Number of dropped elements.
        count: usize,
    },
}

/// Callback type for receiving combiner events.
///
/// Register one via [`CombinerBuilder::on_event()`]. The callback runs on
/// the thread performing the operation (the sweeper thread for idle
/// evictions), with no combiner lock held.
///
/// [`CombinerBuilder::on_event()`]: crate::CombinerBuilder::on_event
pub type EventCallback = Arc<dyn Fn(CombinerEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// ```
/// use stream_combiner::{event_callback, CombinerEvent};
///
/// let callback = event_callback(|event: CombinerEvent| {
///     println!("Got event: {:?}", event);
/// });
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(CombinerEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}
