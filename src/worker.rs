//! The virtual-core worker threads (§4.5): one thread per configured core,
//! each repeatedly dequeuing a process and running it under the active
//! scheduling discipline.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::{SchedulingPolicy, SystemConfig};
use crate::process::Process;
use crate::queue::ReadyQueues;

/// Outcome of giving one process its share of a core's attention under RR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RrOutcome {
    /// The quantum ran out before the program finished; re-enqueue at tail.
    QuantumExpired,
    /// The program ran to completion within this quantum.
    Finished,
    /// Shutdown was observed mid-quantum; leave the process exactly where
    /// it is, unfinished, and do not touch the queue.
    Interrupted,
}

fn pace(config: &SystemConfig) {
    if config.delay_per_exec > 0 {
        thread::sleep(Duration::from_millis(u64::from(config.delay_per_exec)));
    }
}

/// Run `process` to completion, one instruction at a time, stopping early
/// (without finalizing) if shutdown is observed between steps.
fn run_fcfs(process: &Process, core_id: u32, config: &SystemConfig, queues: &ReadyQueues) {
    while process.cursor() < process.program_length() {
        if queues.is_shutdown() {
            return;
        }
        process.step(core_id);
        pace(config);
    }
    process.finalize();
}

/// Run `process` for at most `config.quantum_cycles` instructions.
fn run_rr(process: &Process, core_id: u32, config: &SystemConfig, queues: &ReadyQueues) -> RrOutcome {
    let mut executed = 0u32;
    while process.cursor() < process.program_length() && executed < config.quantum_cycles {
        if queues.is_shutdown() {
            return RrOutcome::Interrupted;
        }
        process.step(core_id);
        executed += 1;
        pace(config);
    }

    if process.cursor() < process.program_length() {
        RrOutcome::QuantumExpired
    } else {
        process.finalize();
        RrOutcome::Finished
    }
}

fn run(core_id: u32, config: &SystemConfig, queues: &ReadyQueues) {
    loop {
        let process = match queues.wait_and_dequeue(config.scheduler) {
            Some(process) => process,
            None => {
                tracing::debug!(core_id, "worker shutting down");
                return;
            }
        };

        process.assign_core(core_id);
        tracing::debug!(core_id, process = %process.name, "dequeued process");

        match config.scheduler {
            SchedulingPolicy::Fcfs => {
                run_fcfs(&process, core_id, config, queues);
                if process.is_finished() {
                    tracing::info!(core_id, process = %process.name, "process finished");
                }
            }
            SchedulingPolicy::Rr => match run_rr(&process, core_id, config, queues) {
                RrOutcome::QuantumExpired => {
                    queues.enqueue(SchedulingPolicy::Rr, process);
                }
                RrOutcome::Finished => {
                    tracing::info!(core_id, process = %process.name, "process finished");
                }
                RrOutcome::Interrupted => {}
            },
        }
    }
}

/// Spawn one worker thread for `core_id`. The returned handle should be
/// joined after [`ReadyQueues::shutdown`] has been called.
pub fn spawn(core_id: u32, config: Arc<SystemConfig>, queues: Arc<ReadyQueues>) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("worker-{core_id}"))
        .spawn(move || run(core_id, &config, &queues))
        .expect("failed to spawn worker thread")
}
