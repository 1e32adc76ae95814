//! The autonomous batch generator (§4.6): a single background thread that
//! periodically synthesises and enqueues new processes.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::SystemConfig;
use crate::error::CommandError;
use crate::queue::ReadyQueues;
use crate::table::ProcessTable;

const TICK: Duration = Duration::from_millis(100);

/// A stop signal dedicated to the batch generator, independent of the
/// workers' shutdown flag (§5) — `scheduler-stop` must retire the generator
/// without touching running workers.
pub struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    pub fn new() -> StopSignal {
        StopSignal {
            stopped: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    pub fn stop(&self) {
        *self.stopped.lock().unwrap() = true;
        self.condvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap()
    }

    /// Wait for one 100 ms tick, or return early if stopped. Returns `true`
    /// if the signal was observed (stop, either before or during the wait).
    fn wait_tick(&self) -> bool {
        let guard = self.stopped.lock().unwrap();
        if *guard {
            return true;
        }
        let (guard, _) = self.condvar.wait_timeout(guard, TICK).unwrap();
        *guard
    }
}

impl Default for StopSignal {
    fn default() -> StopSignal {
        StopSignal::new()
    }
}

/// `process<kk>`: two-digit zero-padded below 10, plain decimal above (§4.6).
fn candidate_name(k: u32) -> String {
    if k < 10 {
        format!("process0{k}")
    } else {
        format!("process{k}")
    }
}

/// Sleep for `ticks` 100 ms slices, bailing out early if `stop` fires.
/// Returns `true` if stopped before the full duration elapsed.
fn cancellable_sleep(stop: &StopSignal, ticks: u32) -> bool {
    for _ in 0..ticks {
        if stop.wait_tick() {
            return true;
        }
    }
    false
}

fn run(
    config: Arc<SystemConfig>,
    table: Arc<ProcessTable>,
    queues: Arc<ReadyQueues>,
    counter: Arc<AtomicU32>,
    stop: Arc<StopSignal>,
) {
    loop {
        if cancellable_sleep(&stop, config.batch_process_freq) {
            tracing::debug!("batch generator stopping");
            return;
        }

        let mut rng = rand::rng();
        loop {
            let k = counter.fetch_add(1, Ordering::Relaxed);
            let name = candidate_name(k);
            match table.create(&name, &mut rng) {
                Ok(process) => {
                    tracing::info!(process = %name, "batch generator created process");
                    queues.enqueue(config.scheduler, process);
                    break;
                }
                Err(CommandError::AlreadyExists(_)) => continue,
                Err(CommandError::NotFound(_)) => unreachable!("create never returns NotFound"),
            }
        }
    }
}

/// Spawn the batch generator thread. `counter` is owned by the engine and
/// survives across stop/restart so naming continues where it left off
/// (§4.6).
pub fn spawn(
    config: Arc<SystemConfig>,
    table: Arc<ProcessTable>,
    queues: Arc<ReadyQueues>,
    counter: Arc<AtomicU32>,
    stop: Arc<StopSignal>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("batch-generator".to_string())
        .spawn(move || run(config, table, queues, counter, stop))
        .expect("failed to spawn batch generator thread")
}
