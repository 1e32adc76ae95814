//! Random program generation (§4.1). Deterministic given a seeded `Rng`, so it
//! is testable in isolation from the threading machinery around it.

use rand::Rng;

use super::Instruction;

const SLEEP_MS: u32 = 100;
const FOR_LOOP_COUNT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opcode {
    Declare,
    Print,
    Add,
    Subtract,
    Sleep,
    For,
}

fn new_variable(var_count: &mut u32) -> String {
    let name = format!("v{var_count}");
    *var_count += 1;
    name
}

fn random_variable(var_count: u32, rng: &mut impl Rng) -> String {
    format!("v{}", rng.random_range(0..var_count))
}

fn random_pair(var_count: u32, rng: &mut impl Rng) -> (String, String) {
    (
        random_variable(var_count, rng),
        random_variable(var_count, rng),
    )
}

/// Draw a uniformly random program length in `[min, max]` inclusive.
pub fn random_program_length(min: u32, max: u32, rng: &mut impl Rng) -> u32 {
    if min == max {
        min
    } else {
        rng.random_range(min..=max)
    }
}

/// Generate a `length`-instruction program. The first instruction is always a
/// `Declare` (there are no variables yet, §4.1); afterwards each step draws
/// uniformly from whichever opcodes are legal given the variables declared so
/// far (`Add`/`Subtract` need two, `Print`/`For` need one, `Declare`/`Sleep`
/// are always legal).
pub fn generate_program(length: u32, rng: &mut impl Rng) -> Vec<Instruction> {
    let mut program = Vec::with_capacity(length as usize);
    let mut var_count: u32 = 0;

    for _ in 0..length {
        let instruction = if var_count == 0 {
            Instruction::Declare(new_variable(&mut var_count), rng.random())
        } else {
            let mut choices = vec![Opcode::Declare, Opcode::Sleep, Opcode::Print, Opcode::For];
            if var_count >= 2 {
                choices.push(Opcode::Add);
                choices.push(Opcode::Subtract);
            }
            match choices[rng.random_range(0..choices.len())] {
                Opcode::Declare => Instruction::Declare(new_variable(&mut var_count), rng.random()),
                Opcode::Print => Instruction::Print(random_variable(var_count, rng)),
                Opcode::For => Instruction::For(random_variable(var_count, rng), FOR_LOOP_COUNT),
                Opcode::Sleep => Instruction::Sleep(SLEEP_MS),
                Opcode::Add => {
                    let (a, b) = random_pair(var_count, rng);
                    Instruction::Add(a, b)
                }
                Opcode::Subtract => {
                    let (a, b) = random_pair(var_count, rng);
                    Instruction::Subtract(a, b)
                }
            }
        };
        program.push(instruction);
    }

    program
}
