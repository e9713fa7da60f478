//! Shared state of one combiner input.
//!
//! A `Slot` is owned jointly by the producer-facing [`Input`](super::Input)
//! handles and by the combiner's roster. The buffer lock also guards the
//! removal transition, so a `put` either lands before removal (and is handed
//! to the removal policy) or is rejected.

use std::collections::VecDeque;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Weak;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

use crate::combiner::Shared;
use crate::config::InputConfig;
use crate::event::RemovalReason;
use crate::selection::Weighted;
use crate::source::SourceId;
use crate::CombinerError;

/// How a blocking take on a single slot ended.
#[derive(Debug)]
pub(crate) enum WaitOutcome<T> {
    /// An element arrived before the deadline.
    Ready(T),
    /// The deadline passed with the slot still empty.
    TimedOut,
    /// The slot was removed while waiting.
    Removed,
    /// The combiner interrupted its waiters.
    Interrupted,
}

pub(crate) struct Slot<T> {
    id: SourceId,
    priority: f64,
    capacity: Option<usize>,
    /// Idle window, `None` if the slot never expires.
    expiry: Option<Duration>,
    /// Reference point for `deadline_nanos`.
    created: Instant,
    /// Eviction deadline as nanoseconds after `created`.
    deadline_nanos: AtomicU64,
    /// Written only while `queue` is locked.
    removed: AtomicBool,
    queue: Mutex<VecDeque<T>>,
    /// Wakes blocking consumers.
    ready: Condvar,
    /// Wakes async consumers.
    notify: Notify,
    owner: Weak<Shared<T>>,
}

impl<T> Slot<T> {
    pub(crate) fn new(id: SourceId, config: &InputConfig, owner: Weak<Shared<T>>) -> Self {
        let slot = Self {
            id,
            priority: config.priority,
            capacity: config.capacity,
            expiry: config.expiry(),
            created: Instant::now(),
            deadline_nanos: AtomicU64::new(u64::MAX),
            removed: AtomicBool::new(false),
            queue: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
            notify: Notify::new(),
            owner,
        };
        slot.touch();
        slot
    }

    pub(crate) fn id(&self) -> SourceId {
        self.id
    }

    pub(crate) fn priority(&self) -> f64 {
        self.priority
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Refreshes the idle deadline, appends a value and wakes one blocked consumer.
    pub(crate) fn push(&self, value: T) -> Result<(), CombinerError> {
        {
            let mut queue = self.queue.lock();
            if self.is_removed() {
                return Err(CombinerError::removed(self.id));
            }
            if let Some(capacity) = self.capacity {
                if queue.len() >= capacity {
                    return Err(CombinerError::Capacity {
                        source_id: self.id,
                        capacity,
                    });
                }
            }
            // Under the lock, so an eviction re-checking expiry sees the new deadline.
            self.touch();
            queue.push_back(value);
        }
        self.ready.notify_one();
        self.notify.notify_waiters();
        Ok(())
    }

    /// Dequeues the head element without waiting.
    pub(crate) fn try_take(&self) -> Option<T> {
        self.queue.lock().pop_front()
    }

    /// Blocks until an element arrives, the deadline passes, the slot is
    /// removed or `interrupted` turns true.
    pub(crate) fn take_until(
        &self,
        deadline: Instant,
        interrupted: impl Fn() -> bool,
    ) -> WaitOutcome<T> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(outcome) = self.settled(&mut queue, &interrupted) {
                return outcome;
            }
            if self.ready.wait_until(&mut queue, deadline).timed_out() {
                return queue
                    .pop_front()
                    .map_or(WaitOutcome::TimedOut, WaitOutcome::Ready);
            }
        }
    }

    /// Async counterpart of [`take_until`](Self::take_until).
    ///
    /// Must run inside a tokio runtime with the time driver enabled.
    pub(crate) async fn take_until_async(
        &self,
        deadline: tokio::time::Instant,
        interrupted: impl Fn() -> bool,
    ) -> WaitOutcome<T> {
        loop {
            let mut notified = pin!(self.notify.notified());
            notified.as_mut().enable();

            let settled = {
                let mut queue = self.queue.lock();
                self.settled(&mut queue, &interrupted)
            };
            if let Some(outcome) = settled {
                return outcome;
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self
                    .try_take()
                    .map_or(WaitOutcome::TimedOut, WaitOutcome::Ready);
            }
        }
    }

    fn settled(
        &self,
        queue: &mut VecDeque<T>,
        interrupted: &impl Fn() -> bool,
    ) -> Option<WaitOutcome<T>> {
        if let Some(value) = queue.pop_front() {
            return Some(WaitOutcome::Ready(value));
        }
        if self.is_removed() {
            return Some(WaitOutcome::Removed);
        }
        if interrupted() {
            return Some(WaitOutcome::Interrupted);
        }
        None
    }

    /// Wakes every consumer waiting on this slot so it re-checks its exit conditions.
    pub(crate) fn wake_all(&self) {
        // Taking the lock orders this wakeup after any waiter's last check.
        drop(self.queue.lock());
        self.ready.notify_all();
        self.notify.notify_waiters();
    }

    /// Marks the slot removed and hands its leftovers to the owning combiner.
    ///
    /// Returns `false` if the slot was already removed.
    pub(crate) fn remove(&self, reason: RemovalReason) -> bool {
        self.remove_if(reason, || true)
    }

    /// Removes the slot if `due` still holds once the buffer lock is taken.
    fn remove_if(&self, reason: RemovalReason, due: impl FnOnce() -> bool) -> bool {
        let leftovers = {
            let mut queue = self.queue.lock();
            if self.is_removed() || !due() {
                return false;
            }
            self.removed.store(true, Ordering::Release);
            std::mem::take(&mut *queue)
        };

        self.ready.notify_all();
        self.notify.notify_waiters();

        if let Some(owner) = self.owner.upgrade() {
            owner.detach(self, leftovers, reason);
        }
        true
    }

    /// Evicts the slot if `now` is past its idle deadline.
    ///
    /// Expiry is checked again under the buffer lock, so a `put` racing with
    /// the sweep either keeps the slot alive or is rejected with `Removed`.
    pub(crate) fn check_timeout(&self, now: Instant) -> bool {
        self.is_expired(now)
            && self.remove_if(RemovalReason::IdleTimeout, || self.is_expired(now))
    }

    fn is_expired(&self, now: Instant) -> bool {
        if self.expiry.is_none() {
            return false;
        }
        let elapsed = saturating_nanos(now.saturating_duration_since(self.created));
        elapsed > self.deadline_nanos.load(Ordering::Acquire)
    }

    /// Pushes the idle deadline to `now + expiry`.
    fn touch(&self) {
        if let Some(expiry) = self.expiry {
            let deadline =
                saturating_nanos(self.created.elapsed()).saturating_add(saturating_nanos(expiry));
            self.deadline_nanos.store(deadline, Ordering::Release);
        }
    }
}

impl<T> Weighted for Slot<T> {
    fn weight(&self) -> f64 {
        self.priority
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
