//! Fixed-rate background tasks
//!
//! Each task runs on its own named thread. Cancelling wakes every worker and
//! joins it, so once `cancel` returns no task body is running or will run.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::SimError;

#[derive(Debug, Default)]
struct Shutdown {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl Shutdown {
    /// Sleep until `deadline`; false if shutdown was requested meanwhile
    fn wait_until(&self, deadline: Instant) -> bool {
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *stopped {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            stopped = self
                .wake
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn trigger(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }
}

/// Runs closures periodically until cancelled
#[derive(Debug, Default)]
pub struct Scheduler {
    shutdown: Arc<Shutdown>,
    workers: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` every `period`, first after one full period
    ///
    /// Deadlines advance by exactly `period`, so a late tick does not shift
    /// the ones after it.
    pub fn schedule_at_fixed_rate<F>(
        &mut self,
        name: &str,
        period: Duration,
        mut task: F,
    ) -> Result<(), SimError>
    where
        F: FnMut() + Send + 'static,
    {
        let shutdown = Arc::clone(&self.shutdown);
        let label = name.to_string();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                log::debug!("{label} started ({period:?})");
                let mut deadline = Instant::now() + period;
                while shutdown.wait_until(deadline) {
                    task();
                    deadline += period;
                }
                log::debug!("{label} stopped");
            })?;
        self.workers.push(handle);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Stop all tasks and wait for them; safe to call repeatedly
    pub fn cancel(&mut self) {
        self.shutdown.trigger();
        for worker in self.workers.drain(..) {
            if worker.thread().id() == thread::current().id() {
                continue;
            }
            if worker.join().is_err() {
                log::error!("Background task panicked");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
