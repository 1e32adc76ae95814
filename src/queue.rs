//! The ready queue(s) (§4.4): one FIFO per scheduling policy, a single mutex,
//! one condition variable, and the worker shutdown flag — all bundled
//! together because every worker waits on exactly this one condition for
//! either "work available" or "shut down".

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use crate::config::SchedulingPolicy;
use crate::process::Process;

struct Inner {
    fcfs: VecDeque<Arc<Process>>,
    rr: VecDeque<Arc<Process>>,
    shutdown: bool,
}

/// Both ready queues plus the worker shutdown signal, guarded by one lock
/// (§5). Only the queue matching the active [`SchedulingPolicy`] is ever
/// drained by workers; the other stays empty for that run's lifetime.
pub struct ReadyQueues {
    inner: Mutex<Inner>,
    condvar: Condvar,
}

impl ReadyQueues {
    pub fn new() -> ReadyQueues {
        ReadyQueues {
            inner: Mutex::new(Inner {
                fcfs: VecDeque::new(),
                rr: VecDeque::new(),
                shutdown: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Append to the tail of the queue selected by `policy` and wake one
    /// waiting worker.
    pub fn enqueue(&self, policy: SchedulingPolicy, process: Arc<Process>) {
        let mut inner = self.inner.lock().unwrap();
        match policy {
            SchedulingPolicy::Fcfs => inner.fcfs.push_back(process),
            SchedulingPolicy::Rr => inner.rr.push_back(process),
        }
        self.condvar.notify_one();
    }

    /// Block until the queue for `policy` is non-empty or shutdown has been
    /// signalled, then pop the head. Returns `None` only on shutdown.
    pub fn wait_and_dequeue(&self, policy: SchedulingPolicy) -> Option<Arc<Process>> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(process) = Self::pop(&mut inner, policy) {
                return Some(process);
            }
            if inner.shutdown {
                return None;
            }
            inner = self.condvar.wait(inner).unwrap();
        }
    }

    fn pop(inner: &mut Inner, policy: SchedulingPolicy) -> Option<Arc<Process>> {
        match policy {
            SchedulingPolicy::Fcfs => inner.fcfs.pop_front(),
            SchedulingPolicy::Rr => inner.rr.pop_front(),
        }
    }

    /// Non-blocking check used between interpreter steps, so a worker can
    /// break out of a quantum or an FCFS run mid-process on shutdown (§4.5)
    /// instead of only checking at the dequeue boundary.
    pub fn is_shutdown(&self) -> bool {
        self.inner.lock().unwrap().shutdown
    }

    /// Signal every waiting worker to stop and return `None` from their next
    /// wait. Idempotent.
    pub fn shutdown(&self) {
        self.inner.lock().unwrap().shutdown = true;
        self.condvar.notify_all();
    }

    /// Clear the shutdown flag so a fresh worker pool can be spawned after
    /// `initialize` re-runs.
    pub fn reset(&self) {
        self.inner.lock().unwrap().shutdown = false;
    }
}

impl Default for ReadyQueues {
    fn default() -> ReadyQueues {
        ReadyQueues::new()
    }
}
