//! The combiner: weighted merging of many inputs into one output.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::builder::CombinerBuilder;
use crate::config::{CombinerConfig, InputConfig, RemovalPolicy};
use crate::event::{CombinerEvent, EventCallback, RemovalReason};
use crate::pipeline::{Roster, RosterCell, TimeoutSweeper};
use crate::source::{Input, Slot, SourceId, WaitOutcome};
use crate::CombinerError;

/// Upper bound on how far ahead a timed poll computes its deadline.
const MAX_WAIT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Counters and gauges describing a combiner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinerStats {
    /// Inputs currently taking part in selection.
    pub active_inputs: usize,
    /// Sum of the active inputs' priorities.
    pub total_weight: f64,
    /// Polls served by the weighted pick.
    pub weighted_hits: u64,
    /// Polls served by the fallback scan because the picked input was empty.
    pub fallback_hits: u64,
    /// Polls that returned nothing.
    pub misses: u64,
    /// Inputs removed by the idle-timeout sweep.
    pub evicted_inputs: u64,
    /// Elements dropped because their input was removed.
    pub discarded_elements: u64,
}

#[derive(Default)]
struct Counters {
    weighted_hits: AtomicU64,
    fallback_hits: AtomicU64,
    misses: AtomicU64,
    evicted_inputs: AtomicU64,
    discarded_elements: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }
}

/// State shared between the combiner, its input slots and the sweeper.
pub(crate) struct Shared<T> {
    roster: RosterCell<T>,
    /// Leftovers of removed inputs under [`RemovalPolicy::Drain`].
    orphans: Mutex<VecDeque<T>>,
    policy: RemovalPolicy,
    next_id: AtomicU64,
    /// Bumped on every interrupt; waiters compare it with the value they started with.
    interrupts: AtomicU64,
    closed: AtomicBool,
    counters: Counters,
    event_callback: Option<EventCallback>,
}

impl<T> Shared<T> {
    fn new(policy: RemovalPolicy, event_callback: Option<EventCallback>) -> Self {
        Self {
            roster: RosterCell::new(),
            orphans: Mutex::new(VecDeque::new()),
            policy,
            next_id: AtomicU64::new(1),
            interrupts: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            counters: Counters::default(),
            event_callback,
        }
    }

    fn emit(&self, event: CombinerEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }

    /// Takes a removed slot out of selection and applies the removal policy.
    pub(crate) fn detach(&self, slot: &Slot<T>, leftovers: VecDeque<T>, reason: RemovalReason) {
        let source_id = slot.id();
        let total_weight = self.roster.remove(source_id);
        let buffered = leftovers.len();

        if reason == RemovalReason::IdleTimeout {
            Counters::bump(&self.counters.evicted_inputs, 1);
        }

        let discarded = if buffered == 0 {
            0
        } else if self.policy.keeps_leftovers() {
            self.orphans.lock().extend(leftovers);
            0
        } else {
            drop(leftovers);
            Counters::bump(&self.counters.discarded_elements, buffered as u64);
            buffered
        };

        tracing::debug!(
            source = %source_id,
            %reason,
            buffered,
            total_weight = ?total_weight,
            "input removed"
        );
        self.emit(CombinerEvent::InputRemoved {
            source_id,
            reason,
            buffered,
        });

        if discarded > 0 {
            tracing::warn!(
                source = %source_id,
                discarded,
                "removed input still had buffered elements; discarding them"
            );
            self.emit(CombinerEvent::ElementsDiscarded {
                source_id,
                count: discarded,
            });
        }
    }

    /// Removes every input past its idle deadline. Returns how many were evicted.
    pub(crate) fn sweep(&self, now: Instant) -> usize {
        let roster = self.roster.load_full();
        let mut evicted = 0;
        for slot in roster.inputs() {
            if slot.check_timeout(now) {
                evicted += 1;
            }
        }
        evicted
    }

    /// Throughput-preserving scan: first non-empty input, then the orphans.
    fn poll_any(&self, roster: &Roster<T>) -> Option<T> {
        let value = roster
            .inputs()
            .iter()
            .find_map(|slot| slot.try_take())
            .or_else(|| self.take_orphan());

        match value {
            Some(_) => Counters::bump(&self.counters.fallback_hits, 1),
            None => Counters::bump(&self.counters.misses, 1),
        }
        value
    }

    fn take_orphan(&self) -> Option<T> {
        if self.policy.keeps_leftovers() {
            self.orphans.lock().pop_front()
        } else {
            None
        }
    }

    fn interrupted_since(&self, epoch: u64) -> bool {
        self.interrupts.load(Ordering::Acquire) != epoch
    }

    fn interrupt_waiters(&self) {
        self.interrupts.fetch_add(1, Ordering::AcqRel);
        for slot in self.roster.load().inputs() {
            slot.wake_all();
        }
    }

    /// Turns the outcome of a single-input wait into a poll result.
    fn settle(&self, outcome: WaitOutcome<T>) -> Result<Option<T>, CombinerError> {
        match outcome {
            WaitOutcome::Ready(value) => {
                Counters::bump(&self.counters.weighted_hits, 1);
                Ok(Some(value))
            }
            // The picked input stayed empty or is gone; serve whatever else is buffered.
            WaitOutcome::TimedOut | WaitOutcome::Removed => {
                Ok(self.poll_any(&self.roster.load()))
            }
            WaitOutcome::Interrupted => Err(CombinerError::Interrupted),
        }
    }
}

/// Merges elements from many weighted inputs into a single output.
///
/// Each input's priority sets the long-run share of output it contributes,
/// as long as every input has data. When the input chosen by the weighted
/// draw is empty, the poll falls back to any input that has data, so
/// throughput wins over strict ratios. Inputs configured with an idle
/// timeout are evicted by a background sweeper when no `put` arrives in time.
///
/// `Combiner` is `Send + Sync`; share it behind an `Arc` to poll from several
/// consumers.
///
/// # Lifecycle
///
/// 1. Created by [`Combiner::new()`] or [`CombinerBuilder::build()`],
///    which starts the sweeper thread
/// 2. Producers obtain [`Input`]s via [`add_input`](Self::add_input)
/// 3. Consumers call [`poll`](Self::poll) or [`poll_timeout`](Self::poll_timeout)
/// 4. [`close()`](Self::close) stops the sweeper and releases blocked consumers
///
/// Dropping the combiner also stops the sweeper (asynchronously); prefer an
/// explicit `close()` when the owner needs the thread gone before moving on.
///
/// # Example
///
/// ```
/// use stream_combiner::Combiner;
/// use std::time::Duration;
///
/// let combiner = Combiner::new()?;
/// let fast = combiner.add_input(9.5, Duration::ZERO)?;
/// let slow = combiner.add_input(0.5, Duration::from_secs(30))?;
///
/// fast.put(1)?;
/// slow.put(2)?;
///
/// let mut out = vec![combiner.poll().unwrap(), combiner.poll().unwrap()];
/// out.sort_unstable();
/// assert_eq!(out, vec![1, 2]);
/// assert_eq!(combiner.poll(), None);
///
/// combiner.close();
/// # Ok::<(), stream_combiner::CombinerError>(())
/// ```
pub struct Combiner<T> {
    shared: Arc<Shared<T>>,
    sweeper: Mutex<Option<TimeoutSweeper>>,
}

impl<T: Send + 'static> Combiner<T> {
    /// Returns a builder for configuring a combiner.
    pub fn builder() -> CombinerBuilder<T> {
        CombinerBuilder::new()
    }

    /// Creates a combiner with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CombinerError::SweeperSpawn`] if the sweeper thread cannot start.
    pub fn new() -> Result<Self, CombinerError> {
        Self::start(CombinerConfig::default(), None)
    }

    pub(crate) fn start(
        config: CombinerConfig,
        event_callback: Option<EventCallback>,
    ) -> Result<Self, CombinerError> {
        let shared = Arc::new(Shared::new(config.removal_policy, event_callback));
        let sweeper = TimeoutSweeper::spawn(Arc::downgrade(&shared), config.sweep_interval)
            .map_err(|source| CombinerError::SweeperSpawn { source })?;

        Ok(Self {
            shared,
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    /// Registers an unbounded input.
    ///
    /// `empty_timeout` of `Duration::ZERO` disables idle eviction.
    ///
    /// # Errors
    ///
    /// See [`add_input_with`](Self::add_input_with).
    pub fn add_input(&self, priority: f64, empty_timeout: Duration) -> Result<Input<T>, CombinerError> {
        self.add_input_with(InputConfig::new(priority).empty_timeout(empty_timeout))
    }

    /// Registers an input described by `config`.
    ///
    /// # Errors
    ///
    /// - [`CombinerError::InvalidPriority`] for negative, NaN or infinite priorities.
    /// - [`CombinerError::Closed`] after [`close()`](Self::close).
    pub fn add_input_with(&self, config: InputConfig) -> Result<Input<T>, CombinerError> {
        let priority = config.priority;
        if !priority.is_finite() || priority < 0.0 {
            return Err(CombinerError::InvalidPriority { priority });
        }
        if self.is_closed() {
            return Err(CombinerError::Closed);
        }

        let source_id = SourceId::new(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let slot = Arc::new(Slot::new(source_id, &config, Arc::downgrade(&self.shared)));
        let total_weight = self.shared.roster.insert(Arc::clone(&slot));

        tracing::debug!(
            source = %source_id,
            priority,
            total_weight,
            empty_timeout_ms = config.empty_timeout.as_millis() as u64,
            "input added"
        );
        self.shared.emit(CombinerEvent::InputAdded {
            source_id,
            priority,
        });

        Ok(Input::new(slot))
    }

    /// Fetches the next element without blocking.
    ///
    /// Draws an input by weight and takes its head element. If the drawn
    /// input is empty, returns the head of the first input that has data.
    /// Returns `None` only when every input is empty.
    pub fn poll(&self) -> Option<T> {
        let roster = self.shared.roster.load();
        if let Some(value) = roster.pick().and_then(|slot| slot.try_take()) {
            Counters::bump(&self.shared.counters.weighted_hits, 1);
            return Some(value);
        }
        self.shared.poll_any(&roster)
    }

    /// Fetches the next element, waiting up to `timeout` for one to arrive.
    ///
    /// Draws an input by weight once and waits on that input alone; it does
    /// not re-draw while waiting. If the drawn input is still empty at the
    /// deadline, or is removed during the wait, the fallback scan serves the
    /// call from any other input with data. If the draw selects nothing (no
    /// inputs, or all weights zero) the fallback scan runs once without waiting.
    ///
    /// After [`close()`](Self::close) this behaves like [`poll()`](Self::poll).
    ///
    /// # Errors
    ///
    /// Returns [`CombinerError::Interrupted`] if [`interrupt()`](Self::interrupt)
    /// or [`close()`](Self::close) is called while waiting.
    pub fn poll_timeout(&self, timeout: Duration) -> Result<Option<T>, CombinerError> {
        if self.is_closed() {
            return Ok(self.poll());
        }
        let epoch = self.shared.interrupts.load(Ordering::Acquire);
        let Some(slot) = self.pick_for_wait() else {
            return Ok(self.shared.poll_any(&self.shared.roster.load()));
        };

        let outcome = slot.take_until(deadline_after(timeout), || {
            self.shared.interrupted_since(epoch)
        });
        self.shared.settle(outcome)
    }

    /// Async counterpart of [`poll_timeout`](Self::poll_timeout).
    ///
    /// Must be awaited inside a tokio runtime with the time driver enabled.
    /// Dropping the future cancels the wait.
    ///
    /// # Errors
    ///
    /// Returns [`CombinerError::Interrupted`] if [`interrupt()`](Self::interrupt)
    /// or [`close()`](Self::close) is called while waiting.
    pub async fn poll_timeout_async(&self, timeout: Duration) -> Result<Option<T>, CombinerError> {
        if self.is_closed() {
            return Ok(self.poll());
        }
        let epoch = self.shared.interrupts.load(Ordering::Acquire);
        let Some(slot) = self.pick_for_wait() else {
            return Ok(self.shared.poll_any(&self.shared.roster.load()));
        };

        let deadline = tokio::time::Instant::from_std(deadline_after(timeout));
        let outcome = slot
            .take_until_async(deadline, || self.shared.interrupted_since(epoch))
            .await;
        self.shared.settle(outcome)
    }

    /// Weighted draw that detaches the picked slot from the roster snapshot.
    fn pick_for_wait(&self) -> Option<Arc<Slot<T>>> {
        self.shared.roster.load().pick().map(Arc::clone)
    }

    /// Releases every consumer blocked in a timed poll with
    /// [`CombinerError::Interrupted`].
    ///
    /// Only affects waits already in progress; later polls run normally.
    pub fn interrupt(&self) {
        self.shared.interrupt_waiters();
    }

    /// Stops the sweeper, interrupts blocked consumers and refuses new inputs.
    ///
    /// Existing inputs keep accepting `put`s and polls keep draining them,
    /// but idle inputs are no longer evicted. Idempotent.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.interrupt_waiters();
        if let Some(sweeper) = self.sweeper.lock().take() {
            sweeper.shutdown();
        }
        tracing::debug!(active_inputs = self.len(), "combiner closed");
    }
}

impl<T> Combiner<T> {
    /// Returns `true` after [`close()`](Self::close).
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Returns the number of active inputs.
    pub fn len(&self) -> usize {
        self.shared.roster.load().len()
    }

    /// Returns `true` if no input is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the sum of the active inputs' priorities.
    pub fn total_weight(&self) -> f64 {
        self.shared.roster.load().total_weight()
    }

    /// Returns current statistics.
    pub fn stats(&self) -> CombinerStats {
        let roster = self.shared.roster.load();
        let counters = &self.shared.counters;
        CombinerStats {
            active_inputs: roster.len(),
            total_weight: roster.total_weight(),
            weighted_hits: counters.weighted_hits.load(Ordering::Relaxed),
            fallback_hits: counters.fallback_hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            evicted_inputs: counters.evicted_inputs.load(Ordering::Relaxed),
            discarded_elements: counters.discarded_elements.load(Ordering::Relaxed),
        }
    }
}

impl<T> std::fmt::Debug for Combiner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combiner")
            .field("active_inputs", &self.len())
            .field("total_weight", &self.total_weight())
            .field("policy", &self.shared.policy)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn deadline_after(timeout: Duration) -> Instant {
    Instant::now() + timeout.min(MAX_WAIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn combiner() -> Combiner<u32> {
        Combiner::new().unwrap()
    }

    #[test]
    fn test_add_input_tracks_total_weight() {
        let combiner = combiner();
        let a = combiner.add_input(1.0, Duration::ZERO).unwrap();
        let _b = combiner.add_input(2.0, Duration::ZERO).unwrap();

        assert_eq!(combiner.len(), 2);
        assert!((combiner.total_weight() - 3.0).abs() < f64::EPSILON);

        a.remove();
        assert_eq!(combiner.len(), 1);
        assert!((combiner.total_weight() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_input_rejects_bad_priority() {
        let combiner = combiner();
        for priority in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                combiner.add_input(priority, Duration::ZERO),
                Err(CombinerError::InvalidPriority { .. })
            ));
        }
        assert!(combiner.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let combiner = combiner();
        let a = combiner.add_input(1.0, Duration::ZERO).unwrap();
        let b = combiner.add_input(1.0, Duration::ZERO).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_poll_empty_combiner() {
        let combiner = combiner();
        assert_eq!(combiner.poll(), None);
        assert_eq!(combiner.stats().misses, 1);
    }

    #[test]
    fn test_poll_preserves_per_input_order() {
        let combiner = combiner();
        let a = combiner.add_input(1.0, Duration::ZERO).unwrap();
        let b = combiner.add_input(1.0, Duration::ZERO).unwrap();
        for i in 0..50 {
            a.put(i).unwrap();
            b.put(100 + i).unwrap();
        }

        let polled: Vec<u32> = std::iter::from_fn(|| combiner.poll()).collect();
        let from_a: Vec<u32> = polled.iter().copied().filter(|v| *v < 100).collect();
        let from_b: Vec<u32> = polled.iter().copied().filter(|v| *v >= 100).collect();

        assert_eq!(polled.len(), 100);
        assert_eq!(from_a, (0..50).collect::<Vec<_>>());
        assert_eq!(from_b, (100..150).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_weight_input_served_by_fallback() {
        let combiner = combiner();
        let input = combiner.add_input(0.0, Duration::ZERO).unwrap();
        input.put(1).unwrap();

        assert_eq!(combiner.poll(), Some(1));
        assert_eq!(combiner.stats().fallback_hits, 1);
    }

    #[test]
    fn test_discard_policy_drops_leftovers() {
        let combiner = combiner();
        let input = combiner.add_input(1.0, Duration::ZERO).unwrap();
        input.put(1).unwrap();
        input.put(2).unwrap();

        input.remove();

        assert_eq!(combiner.poll(), None);
        assert_eq!(combiner.stats().discarded_elements, 2);
    }

    #[test]
    fn test_drain_policy_keeps_leftovers() {
        let combiner: Combiner<u32> = Combiner::builder()
            .removal_policy(RemovalPolicy::Drain)
            .build()
            .unwrap();
        let input = combiner.add_input(1.0, Duration::ZERO).unwrap();
        input.put(1).unwrap();
        input.put(2).unwrap();

        input.remove();

        assert_eq!(combiner.poll(), Some(1));
        assert_eq!(combiner.poll(), Some(2));
        assert_eq!(combiner.poll(), None);
        assert_eq!(combiner.stats().discarded_elements, 0);
    }

    #[test]
    fn test_poll_timeout_without_inputs_returns_immediately() {
        let combiner = combiner();
        let started = Instant::now();
        assert_eq!(combiner.poll_timeout(Duration::from_secs(5)).unwrap(), None);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_poll_timeout_removed_input_falls_back() {
        let combiner = Arc::new(combiner());
        let waited = combiner.add_input(1.0, Duration::ZERO).unwrap();
        let other = combiner.add_input(0.0, Duration::ZERO).unwrap();
        other.put(42).unwrap();

        let remover = waited.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            remover.remove();
        });

        // Only `waited` has weight, so the draw always lands on it.
        let value = combiner.poll_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();

        assert_eq!(value, Some(42));
    }

    #[test]
    fn test_poll_timeout_falls_back_when_picked_input_stays_empty() {
        let combiner = combiner();
        let _heavy = combiner.add_input(1000.0, Duration::ZERO).unwrap();
        let light = combiner.add_input(0.001, Duration::ZERO).unwrap();
        for i in 0..5 {
            light.put(i).unwrap();
        }

        let polled: Vec<Option<u32>> = (0..5)
            .map(|_| combiner.poll_timeout(Duration::from_millis(20)).unwrap())
            .collect();

        assert_eq!(polled, (0..5).map(Some).collect::<Vec<_>>());
        assert_eq!(combiner.poll_timeout(Duration::from_millis(5)).unwrap(), None);
        assert_eq!(combiner.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_poll_timeout_async_falls_back_when_picked_input_stays_empty() {
        let combiner = combiner();
        let _heavy = combiner.add_input(1000.0, Duration::ZERO).unwrap();
        let light = combiner.add_input(0.001, Duration::ZERO).unwrap();
        light.put(8).unwrap();

        let value = combiner
            .poll_timeout_async(Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(value, Some(8));
    }

    #[test]
    fn test_interrupt_releases_waiter() {
        let combiner = Arc::new(combiner());
        let _input = combiner.add_input(1.0, Duration::ZERO).unwrap();

        let interrupter = Arc::clone(&combiner);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            interrupter.interrupt();
        });

        let started = Instant::now();
        let result = combiner.poll_timeout(Duration::from_secs(5));
        handle.join().unwrap();

        assert!(matches!(result, Err(CombinerError::Interrupted)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_interrupt_does_not_affect_later_polls() {
        let combiner = combiner();
        let input = combiner.add_input(1.0, Duration::ZERO).unwrap();
        combiner.interrupt();

        input.put(3).unwrap();
        assert_eq!(combiner.poll_timeout(Duration::from_millis(10)).unwrap(), Some(3));
    }

    #[test]
    fn test_close_refuses_new_inputs_but_drains() {
        let combiner = combiner();
        let input = combiner.add_input(1.0, Duration::ZERO).unwrap();
        input.put(1).unwrap();

        combiner.close();
        combiner.close();

        assert!(combiner.is_closed());
        assert!(matches!(
            combiner.add_input(1.0, Duration::ZERO),
            Err(CombinerError::Closed)
        ));
        assert_eq!(combiner.poll_timeout(Duration::from_secs(5)).unwrap(), Some(1));
        assert_eq!(combiner.poll_timeout(Duration::from_secs(5)).unwrap(), None);
    }

    #[test]
    fn test_sweep_evicts_expired_inputs() {
        let combiner = combiner();
        let idle = combiner.add_input(1.0, Duration::from_secs(10)).unwrap();
        let forever = combiner.add_input(1.0, Duration::ZERO).unwrap();

        let evicted = combiner
            .shared
            .sweep(Instant::now() + Duration::from_secs(60));

        assert_eq!(evicted, 1);
        assert!(idle.is_removed());
        assert!(!forever.is_removed());
        assert_eq!(combiner.stats().evicted_inputs, 1);
    }

    #[test]
    fn test_eviction_never_takes_fresh_puts() {
        let expiry = Duration::from_millis(1);
        let combiner: Combiner<Instant> = Combiner::builder()
            .removal_policy(RemovalPolicy::Drain)
            .sweep_interval(Duration::from_secs(3600))
            .build()
            .unwrap();
        let input = combiner.add_input(1.0, expiry).unwrap();

        let producer_input = input.clone();
        let producer = thread::spawn(move || {
            for i in 0u64..100_000 {
                if producer_input.put(Instant::now()).is_err() {
                    break;
                }
                // Occasional pauses past the idle window let the slot expire.
                if i % 64 == 63 {
                    thread::sleep(Duration::from_micros(1500));
                }
            }
        });

        let give_up = Instant::now() + Duration::from_secs(5);
        let mut evicted_at = None;
        while evicted_at.is_none() && Instant::now() < give_up {
            let now = Instant::now();
            if combiner.shared.sweep(now) > 0 {
                evicted_at = Some(now);
            }
        }
        producer.join().unwrap();

        let evicted_at = evicted_at.unwrap();
        assert!(input.is_removed());
        let leftovers: Vec<Instant> = std::iter::from_fn(|| combiner.poll()).collect();
        for stamp in leftovers {
            assert!(stamp + expiry <= evicted_at);
        }
    }

    #[test]
    fn test_stats_count_hits() {
        let combiner = combiner();
        let input = combiner.add_input(1.0, Duration::ZERO).unwrap();
        input.put(1).unwrap();

        combiner.poll();
        combiner.poll();

        let stats = combiner.stats();
        assert_eq!(stats.weighted_hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.active_inputs, 1);
    }

    #[test]
    fn test_debug_output() {
        let combiner = combiner();
        let debug = format!("{combiner:?}");
        assert!(debug.contains("Combiner"));
        assert!(debug.contains("Discard"));
    }

    #[tokio::test]
    async fn test_poll_timeout_async_receives_late_value() {
        let combiner = combiner();
        let input = combiner.add_input(1.0, Duration::ZERO).unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            input.put(5).unwrap();
        });

        let value = combiner
            .poll_timeout_async(Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(value, Some(5));
    }
}
