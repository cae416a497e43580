//! Coalesces bursts of change notifications into one deferred action.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

#[derive(Default)]
struct State {
    pending: bool,
    shutdown: bool,
}

struct Inner {
    state: Mutex<State>,
    wake: Condvar,
    action: Box<dyn Fn() + Send + Sync>,
}

/// Runs `action` at most once per interval while events keep arriving.
///
/// Events are only flagged on the caller's thread; the action runs on a
/// named background thread once the interval has elapsed since the first
/// unhandled event. Dropping the conflater stops and joins the thread.
pub struct EventConflater {
    inner: Arc<Inner>,
    interval: Duration,
    worker: Option<JoinHandle<()>>,
}

impl EventConflater {
    pub fn new(interval: Duration, action: impl Fn() + Send + Sync + 'static) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(State::default()),
            wake: Condvar::new(),
            action: Box::new(action),
        });

        let worker_inner = Arc::clone(&inner);
        let worker = thread::Builder::new()
            .name("filter-event-conflater".to_string())
            .spawn(move || run(&worker_inner, interval));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("event conflater thread not started, events run inline: {e}");
                None
            }
        };

        Self { inner, interval, worker }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record one event.
    pub fn add_event(&self) {
        if self.worker.is_none() {
            (self.inner.action)();
            return;
        }
        self.inner.state.lock().pending = true;
        self.inner.wake.notify_one();
    }

    /// Whether an event is waiting for the action.
    pub fn pending(&self) -> bool {
        self.inner.state.lock().pending
    }

    /// Run the action now if an event is pending.
    pub fn flush(&self) {
        let pending = std::mem::take(&mut self.inner.state.lock().pending);
        if pending {
            (self.inner.action)();
        }
    }
}

impl Drop for EventConflater {
    fn drop(&mut self) {
        self.inner.state.lock().shutdown = true;
        self.inner.wake.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("event conflater thread panicked");
            }
        }
    }
}

fn run(inner: &Inner, interval: Duration) {
    let mut state = inner.state.lock();
    loop {
        if state.shutdown {
            return;
        }
        if !state.pending {
            inner.wake.wait(&mut state);
            continue;
        }

        let deadline = Instant::now() + interval;
        while !state.shutdown && !inner.wake.wait_until(&mut state, deadline).timed_out() {}
        if state.shutdown {
            return;
        }
        // A flush may have beaten us to it
        if std::mem::take(&mut state.pending) {
            MutexGuard::unlocked(&mut state, || (inner.action)());
        }
    }
}
