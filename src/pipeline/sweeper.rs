//! Background thread that evicts idle inputs.

use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::combiner::Shared;

/// Shortest accepted sweep period.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Stop flag the sweeper sleeps on between passes.
#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }

    /// Sleeps up to `interval`. Returns `true` once stop was requested.
    fn wait(&self, interval: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        if !*stopped {
            self.wake.wait_for(&mut stopped, interval);
        }
        *stopped
    }
}

/// Handle to the periodic idle-input sweep.
///
/// The thread only holds a weak reference to the combiner state and exits on
/// its own once the combiner is gone. [`shutdown`](Self::shutdown) stops and
/// joins it; dropping the handle only requests the stop.
pub(crate) struct TimeoutSweeper {
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl TimeoutSweeper {
    pub(crate) fn spawn<T: Send + 'static>(
        shared: Weak<Shared<T>>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name("combiner-sweeper".to_string())
            .spawn(move || run(&shared, interval, &thread_signal))?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    /// Stops the sweeper and waits for its thread to exit.
    pub(crate) fn shutdown(mut self) {
        self.signal.stop();
        if let Some(handle) = self.handle.take() {
            // An event callback may close the combiner from the sweeper itself.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for TimeoutSweeper {
    fn drop(&mut self) {
        self.signal.stop();
    }
}

fn run<T>(shared: &Weak<Shared<T>>, interval: Duration, signal: &StopSignal) {
    tracing::trace!(
        interval_ms = interval.as_millis() as u64,
        "timeout sweeper started"
    );

    loop {
        let Some(state) = shared.upgrade() else {
            break;
        };
        let evicted = state.sweep(Instant::now());
        drop(state);

        if evicted > 0 {
            tracing::trace!(evicted, "sweep evicted idle inputs");
        }

        if signal.wait(interval) {
            break;
        }
    }

    tracing::trace!("timeout sweeper stopped");
}
