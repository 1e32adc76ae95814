//! The closed instruction set (§3) and its single-step interpreter (§4.2).
//!
//! Mirrors the tagged-enum-plus-`execute` shape of the donor's instruction
//! dispatch (`Instruction` in the teacher's `vm/instructions.rs`), but as a
//! plain `match` rather than `enum_dispatch`: six variants don't need macro-
//! generated trait dispatch.

pub mod generator;

use std::collections::HashMap;

use crate::clock;

/// Per-process variable memory (§3). Missing keys read as 0.
pub type Memory = HashMap<String, u16>;

fn read(memory: &Memory, name: &str) -> u16 {
    memory.get(name).copied().unwrap_or(0)
}

/// The closed instruction set from §3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Declare(String, u16),
    Print(String),
    Add(String, String),
    Subtract(String, String),
    Sleep(u32),
    For(String, u32),
    /// Never produced by [`generator::generate_program`] — the instruction set
    /// is closed and exhaustively matched by construction. Reachable only via
    /// [`Instruction::parse_opcode`], which exists purely to give the
    /// `UNKNOWN INSTRUCTION` fault path (§7) a concrete, testable entry point.
    Unknown(String),
}

impl Instruction {
    /// Decode a mnemonic + operand list into an instruction, the way a textual
    /// bytecode loader would. Anything unrecognised (bad opcode, wrong arity,
    /// unparsable operand) becomes `Unknown`.
    pub fn parse_opcode(opcode: &str, args: &[&str]) -> Instruction {
        match (opcode, args) {
            ("DECLARE", [var, val]) => match val.parse() {
                Ok(val) => Instruction::Declare((*var).to_string(), val),
                Err(_) => Instruction::Unknown(opcode.to_string()),
            },
            ("PRINT", [var]) => Instruction::Print((*var).to_string()),
            ("ADD", [a, b]) => Instruction::Add((*a).to_string(), (*b).to_string()),
            ("SUBTRACT", [a, b]) => Instruction::Subtract((*a).to_string(), (*b).to_string()),
            ("SLEEP", [ms]) => match ms.parse() {
                Ok(ms) => Instruction::Sleep(ms),
                Err(_) => Instruction::Unknown(opcode.to_string()),
            },
            ("FOR", [var, n]) => match n.parse() {
                Ok(n) => Instruction::For((*var).to_string(), n),
                Err(_) => Instruction::Unknown(opcode.to_string()),
            },
            _ => Instruction::Unknown(opcode.to_string()),
        }
    }
}

/// Execute `instruction` against `memory` and render its log line (§6). Does
/// not touch the cursor or the process's log vector — the caller
/// ([`crate::process::Process::step`]) owns that bookkeeping so a blocking
/// `Sleep` never straddles a partially-applied step.
pub fn execute(instruction: &Instruction, memory: &mut Memory, cursor: usize, core_id: u32) -> String {
    let summary = match instruction {
        Instruction::Declare(var, val) => {
            memory.insert(var.clone(), *val);
            format!("DECLARE {var} = {val}")
        }
        Instruction::Print(var) => {
            let val = read(memory, var);
            format!("PRINT {var} = {val}")
        }
        Instruction::Add(a, b) => {
            let va = read(memory, a);
            let vb = read(memory, b);
            let result = va.saturating_add(vb);
            memory.insert(format!("res{cursor}"), result);
            format!("ADD {a}({va}) + {b}({vb}) = {result}")
        }
        Instruction::Subtract(a, b) => {
            let va = read(memory, a);
            let vb = read(memory, b);
            let result = va.saturating_sub(vb);
            memory.insert(format!("res{cursor}"), result);
            format!("SUBTRACT {a}({va}) - {b}({vb}) = {result}")
        }
        Instruction::Sleep(ms) => {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(*ms)));
            format!("SLEPT for {ms}ms")
        }
        Instruction::For(var, n) => {
            let mut steps = String::new();
            for i in 1..=*n {
                let current = read(memory, var).saturating_add(1);
                memory.insert(var.clone(), current);
                steps.push_str(&format!("[{i}]={current} "));
            }
            format!("FOR loop on {var}: {steps}")
        }
        Instruction::Unknown(opcode) => format!("UNKNOWN INSTRUCTION: {opcode}"),
    };

    format!("({}) Core: {core_id} \"{summary}\"", clock::timestamp())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn line_summary(line: &str) -> &str {
        // strip the "(<timestamp>) Core: <id> " prefix and surrounding quotes
        let start = line.find('"').unwrap() + 1;
        let end = line.rfind('"').unwrap();
        &line[start..end]
    }

    #[test]
    fn declare_binds_variable() {
        let mut memory = Memory::new();
        let line = execute(&Instruction::Declare("v0".into(), 42), &mut memory, 0, 1);
        assert_eq!(memory.get("v0"), Some(&42));
        assert_eq!(line_summary(&line), "DECLARE v0 = 42");
        assert!(line.contains("Core: 1"));
    }

    #[test]
    fn print_reads_missing_variable_as_zero() {
        let mut memory = Memory::new();
        let line = execute(&Instruction::Print("ghost".into()), &mut memory, 0, 2);
        assert_eq!(line_summary(&line), "PRINT ghost = 0");
    }

    #[test]
    fn add_saturates_at_max() {
        let mut memory = Memory::new();
        memory.insert("v0".into(), 65530);
        memory.insert("v1".into(), 10);
        let line = execute(&Instruction::Add("v0".into(), "v1".into()), &mut memory, 2, 0);
        assert_eq!(memory.get("res2"), Some(&65535));
        assert_eq!(line_summary(&line), "ADD v0(65530) + v1(10) = 65535");
    }

    #[test]
    fn subtract_saturates_at_zero() {
        let mut memory = Memory::new();
        memory.insert("v0".into(), 3);
        memory.insert("v1".into(), 10);
        let line = execute(
            &Instruction::Subtract("v0".into(), "v1".into()),
            &mut memory,
            5,
            0,
        );
        assert_eq!(memory.get("res5"), Some(&0));
        assert_eq!(line_summary(&line), "SUBTRACT v0(3) - v1(10) = 0");
    }

    #[test]
    fn for_loop_increments_and_logs_every_sub_step() {
        let mut memory = Memory::new();
        memory.insert("v0".into(), 0);
        let line = execute(&Instruction::For("v0".into(), 3), &mut memory, 0, 0);
        assert_eq!(memory.get("v0"), Some(&3));
        assert_eq!(
            line_summary(&line),
            "FOR loop on v0: [1]=1 [2]=2 [3]=3 "
        );
    }

    #[test]
    fn unknown_instruction_logs_opcode_and_does_not_panic() {
        let mut memory = Memory::new();
        let line = execute(&Instruction::Unknown("FROB".into()), &mut memory, 0, 0);
        assert_eq!(line_summary(&line), "UNKNOWN INSTRUCTION: FROB");
    }

    #[test]
    fn parse_opcode_round_trips_known_forms() {
        assert_eq!(
            Instruction::parse_opcode("DECLARE", &["v0", "7"]),
            Instruction::Declare("v0".into(), 7)
        );
        assert_eq!(
            Instruction::parse_opcode("ADD", &["v0", "v1"]),
            Instruction::Add("v0".into(), "v1".into())
        );
    }

    #[test]
    fn parse_opcode_falls_back_to_unknown() {
        assert_eq!(
            Instruction::parse_opcode("TELEPORT", &["v0"]),
            Instruction::Unknown("TELEPORT".into())
        );
        assert_eq!(
            Instruction::parse_opcode("DECLARE", &["v0", "not-a-number"]),
            Instruction::Unknown("DECLARE".into())
        );
    }
}
