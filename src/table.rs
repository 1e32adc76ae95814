//! Keyed registry of processes (§4.3). Append-only and insertion-ordered so
//! iteration order for snapshots is deterministic without a separate sort
//! key, and so handles cloned out to queues/workers never dangle even after
//! the table grows.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use rand::Rng;

use crate::error::CommandError;
use crate::instruction::generator;
use crate::process::{Process, ProcessSnapshot};

/// Two ordered lists of process snapshots, as returned by `screen -ls`.
pub struct TableSnapshot {
    pub running: Vec<ProcessSnapshot>,
    pub finished: Vec<ProcessSnapshot>,
}

pub struct ProcessTable {
    next_id: AtomicU32,
    min_instructions: AtomicU32,
    max_instructions: AtomicU32,
    entries: Mutex<IndexMap<String, Arc<Process>>>,
}

impl ProcessTable {
    pub fn new(min_instructions: u32, max_instructions: u32) -> ProcessTable {
        ProcessTable {
            next_id: AtomicU32::new(1),
            min_instructions: AtomicU32::new(min_instructions),
            max_instructions: AtomicU32::new(max_instructions),
            entries: Mutex::new(IndexMap::new()),
        }
    }

    /// Update the program-length bounds used by future `create` calls, so a
    /// re-`initialize` with a changed config takes effect without discarding
    /// the table (§4.7: the process table survives reinitialisation).
    pub fn set_bounds(&self, min_instructions: u32, max_instructions: u32) {
        self.min_instructions.store(min_instructions, Ordering::Relaxed);
        self.max_instructions.store(max_instructions, Ordering::Relaxed);
    }

    /// Create and insert a new process with a program drawn from `rng`.
    /// Fails with `AlreadyExists` (non-fatal, no state change) if `name` is
    /// already taken — the check-and-insert happens under the same lock, so
    /// two concurrent creators can never both succeed for the same name.
    pub fn create(&self, name: &str, rng: &mut impl Rng) -> Result<Arc<Process>, CommandError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(name) {
            return Err(CommandError::AlreadyExists(name.to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let min_instructions = self.min_instructions.load(Ordering::Relaxed);
        let max_instructions = self.max_instructions.load(Ordering::Relaxed);
        let length = generator::random_program_length(min_instructions, max_instructions, rng);
        let program = generator::generate_program(length, rng);
        let process = Arc::new(Process::new(id, name, program));
        entries.insert(name.to_string(), Arc::clone(&process));
        Ok(process)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Process>, CommandError> {
        self.entries
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| CommandError::NotFound(name.to_string()))
    }

    /// Processes in creation order, split into not-yet-finished (but
    /// assigned at least once) and finished (§4.3). A brand-new process that
    /// has never been dequeued appears in neither list until a worker picks
    /// it up, matching the original's "running" column semantics.
    pub fn snapshot(&self) -> TableSnapshot {
        let entries = self.entries.lock().unwrap();
        let mut running = Vec::new();
        let mut finished = Vec::new();
        for process in entries.values() {
            let snap = process.snapshot();
            if snap.is_finished {
                finished.push(snap);
            } else if snap.core_assigned.is_some() {
                running.push(snap);
            }
        }
        TableSnapshot { running, finished }
    }
}
