//! A single simulated process: identity, program, execution cursor, and the
//! accumulated log of executed instructions (§3, §4.5).

use crate::clock;
use crate::instruction::{self, Instruction, Memory};

/// A point-in-time view of a process, cheap to clone and safe to hand to a
/// reader without holding the process's lock (§5: readers see loose
/// consistency, one lock acquisition per snapshot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub id: u32,
    pub name: String,
    pub created_at: String,
    pub finished_at: Option<String>,
    pub core_assigned: Option<u32>,
    pub cursor: usize,
    pub program_length: usize,
    pub is_finished: bool,
}

struct State {
    memory: Memory,
    program: Vec<Instruction>,
    cursor: usize,
    log: Vec<String>,
    core_assigned: Option<u32>,
    is_finished: bool,
    created_at: String,
    finished_at: Option<String>,
}

/// A process record (§3). `id`/`name` are immutable for the record's
/// lifetime; everything mutated while the process runs lives behind a single
/// `Mutex<State>` locked once per [`Process::step`] call, never held across
/// the `delay_per_exec` sleep between steps (§5).
pub struct Process {
    pub id: u32,
    pub name: String,
    state: std::sync::Mutex<State>,
}

impl Process {
    pub fn new(id: u32, name: impl Into<String>, program: Vec<Instruction>) -> Process {
        Process {
            id,
            name: name.into(),
            state: std::sync::Mutex::new(State {
                memory: Memory::new(),
                program,
                cursor: 0,
                log: Vec::new(),
                core_assigned: None,
                is_finished: false,
                created_at: clock::timestamp(),
                finished_at: None,
            }),
        }
    }

    pub fn program_length(&self) -> usize {
        self.state.lock().unwrap().program.len()
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().unwrap().is_finished
    }

    pub fn cursor(&self) -> usize {
        self.state.lock().unwrap().cursor
    }

    /// Record which core is about to run (or is running) this process.
    pub fn assign_core(&self, core_id: u32) {
        self.state.lock().unwrap().core_assigned = Some(core_id);
    }

    /// Execute exactly one instruction at the current cursor, append its log
    /// line, and advance the cursor. Returns `true` if the process has more
    /// instructions left to run, `false` if this was its last step.
    ///
    /// Does not call [`Process::finalize`] itself and does not sleep for
    /// `delay_per_exec` — both are the caller's ([`crate::worker`]'s)
    /// responsibility, so a `Sleep` instruction's own delay is never
    /// conflated with the inter-step pacing delay.
    pub fn step(&self, core_id: u32) -> bool {
        let mut state = self.state.lock().unwrap();
        let cursor = state.cursor;
        let instruction = state.program[cursor].clone();
        let line = instruction::execute(&instruction, &mut state.memory, cursor, core_id);
        state.log.push(line);
        state.cursor += 1;
        state.cursor < state.program.len()
    }

    /// Mark the process finished. Idempotent in the sense that calling it
    /// twice leaves `finished_at` at its first value (§8 invariant 4).
    pub fn finalize(&self) {
        let mut state = self.state.lock().unwrap();
        if !state.is_finished {
            state.is_finished = true;
            state.finished_at = Some(clock::timestamp());
        }
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        let state = self.state.lock().unwrap();
        ProcessSnapshot {
            id: self.id,
            name: self.name.clone(),
            created_at: state.created_at.clone(),
            finished_at: state.finished_at.clone(),
            core_assigned: state.core_assigned,
            cursor: state.cursor,
            program_length: state.program.len(),
            is_finished: state.is_finished,
        }
    }

    /// The full executed-instruction log, for `screen -r` detail views.
    pub fn log_lines(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn program(n: usize) -> Vec<Instruction> {
        let mut program = vec![Instruction::Declare("v0".into(), 0)];
        for _ in 1..n {
            program.push(Instruction::Print("v0".into()));
        }
        program
    }

    #[test]
    fn new_process_starts_unassigned_and_unfinished() {
        let p = Process::new(1, "process01", program(3));
        let snap = p.snapshot();
        assert_eq!(snap.cursor, 0);
        assert_eq!(snap.program_length, 3);
        assert!(!snap.is_finished);
        assert_eq!(snap.finished_at, None);
        assert_eq!(snap.core_assigned, None);
    }

    #[test]
    fn step_advances_cursor_and_appends_exactly_one_log_line() {
        let p = Process::new(1, "process01", program(3));
        let has_more = p.step(0);
        assert!(has_more);
        assert_eq!(p.cursor(), 1);
        assert_eq!(p.log_lines().len(), 1);
    }

    #[test]
    fn step_reports_false_on_the_final_instruction() {
        let p = Process::new(1, "process01", program(2));
        assert!(p.step(0));
        assert!(!p.step(0));
        assert_eq!(p.cursor(), 2);
    }

    #[test]
    fn finalize_sets_finished_flag_and_timestamp_exactly_once() {
        let p = Process::new(1, "process01", program(1));
        p.step(0);
        p.finalize();
        let first = p.snapshot();
        assert!(first.is_finished);
        assert!(first.finished_at.is_some());

        p.finalize();
        let second = p.snapshot();
        assert_eq!(first.finished_at, second.finished_at);
    }

    #[test]
    fn log_length_equals_cursor_at_every_step() {
        let p = Process::new(1, "process01", program(5));
        for expected in 1..=5 {
            p.step(0);
            assert_eq!(p.log_lines().len(), expected);
            assert_eq!(p.cursor(), expected);
        }
    }

    #[test]
    fn assign_core_is_visible_in_snapshot() {
        let p = Process::new(1, "process01", program(1));
        p.assign_core(3);
        assert_eq!(p.snapshot().core_assigned, Some(3));
    }
}
