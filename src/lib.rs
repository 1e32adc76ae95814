//! A multi-core process scheduler simulator: a process table, FCFS/Round-
//! Robin ready queues, a worker-thread pool, a tiny per-process instruction
//! interpreter, and an autonomous batch generator, composed behind a single
//! [`engine::Engine`] handle.
//!
//! This crate is the scheduling/execution core only — driving it from a
//! console, parsing commands, and formatting output is left to a thin
//! consumer (see `src/bin/schedsim.rs` for a minimal one).

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod instruction;
pub mod process;
pub mod queue;
pub mod table;
pub mod worker;

pub use config::{SchedulingPolicy, SystemConfig};
pub use engine::Engine;
pub use error::{CommandError, ConfigError, LifecycleError, ScreenError};
pub use process::{Process, ProcessSnapshot};
pub use table::TableSnapshot;
