//! Engine lifecycle (§4.7): the top-level object the demo binary (or any
//! other driver) holds, composing config, process table, ready queues,
//! worker pool and batch generator into the `Uninitialised → Initialised →
//! Running → Stopping → Initialised` protocol.

use std::sync::atomic::AtomicU32;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::SystemConfig;
use crate::error::{CommandError, LifecycleError, ScreenError};
use crate::generator::{self, StopSignal};
use crate::process::Process;
use crate::queue::ReadyQueues;
use crate::table::{ProcessTable, TableSnapshot};
use crate::worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    Initialized,
}

struct Inner {
    state: State,
    config: Option<Arc<SystemConfig>>,
    table: Option<Arc<ProcessTable>>,
    queues: Option<Arc<ReadyQueues>>,
    counter: Option<Arc<AtomicU32>>,
    workers: Vec<JoinHandle<()>>,
    generator: Option<(JoinHandle<()>, Arc<StopSignal>)>,
}

impl Inner {
    fn new() -> Inner {
        Inner {
            state: State::Uninitialized,
            config: None,
            table: None,
            queues: None,
            counter: None,
            workers: Vec::new(),
            generator: None,
        }
    }

    fn stop_generator_locked(&mut self) {
        if let Some((handle, stop)) = self.generator.take() {
            stop.stop();
            let _ = handle.join();
        }
    }

    fn stop_workers_locked(&mut self) {
        if let Some(queues) = &self.queues {
            queues.shutdown();
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

/// The simulator's top-level handle. Cheap to share: clone it (it is itself
/// just an `Arc<Mutex<_>>` wrapper) or hold it behind a reference — every
/// method takes `&self`.
pub struct Engine {
    inner: Mutex<Inner>,
}

impl Engine {
    pub fn new() -> Engine {
        Engine {
            inner: Mutex::new(Inner::new()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock().unwrap().state == State::Initialized
    }

    pub fn config(&self) -> Option<Arc<SystemConfig>> {
        self.inner.lock().unwrap().config.clone()
    }

    /// Load (or reload) the engine with `config`. If already initialised,
    /// first drains the previous run: stops the generator (if running),
    /// signals workers to shut down, and joins every thread. The process
    /// table and ready queues are preserved across a reinitialisation; only
    /// the worker pool is rebuilt to match the new `num_cpu`/`scheduler`.
    pub fn initialize(&self, config: SystemConfig) {
        let mut inner = self.inner.lock().unwrap();

        inner.stop_generator_locked();
        inner.stop_workers_locked();

        let config = Arc::new(config);

        match (&inner.table, &inner.queues, &inner.counter) {
            (Some(table), Some(queues), Some(_)) => {
                table.set_bounds(config.min_instructions, config.max_instructions);
                queues.reset();
            }
            _ => {
                inner.table = Some(Arc::new(ProcessTable::new(
                    config.min_instructions,
                    config.max_instructions,
                )));
                inner.queues = Some(Arc::new(ReadyQueues::new()));
                inner.counter = Some(Arc::new(AtomicU32::new(1)));
            }
        }

        let queues = Arc::clone(inner.queues.as_ref().unwrap());

        inner.workers = (0..config.num_cpu)
            .map(|core_id| worker::spawn(core_id, Arc::clone(&config), Arc::clone(&queues)))
            .collect();

        tracing::info!(
            num_cpu = config.num_cpu,
            scheduler = %config.scheduler,
            "engine initialized"
        );

        inner.config = Some(config);
        inner.state = State::Initialized;
    }

    /// Spawn the batch generator thread. Idempotent: refuses with
    /// `GeneratorAlreadyRunning` if one is already running.
    pub fn start_generator(&self) -> Result<(), LifecycleError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != State::Initialized {
            return Err(LifecycleError::NotInitialized);
        }
        if inner.generator.is_some() {
            return Err(LifecycleError::GeneratorAlreadyRunning);
        }

        let config = Arc::clone(inner.config.as_ref().unwrap());
        let table = Arc::clone(inner.table.as_ref().unwrap());
        let queues = Arc::clone(inner.queues.as_ref().unwrap());
        let counter = Arc::clone(inner.counter.as_ref().unwrap());
        let stop = Arc::new(StopSignal::new());

        let handle = generator::spawn(config, table, queues, counter, Arc::clone(&stop));
        inner.generator = Some((handle, stop));
        tracing::info!("batch generator started");
        Ok(())
    }

    /// Stop the batch generator and join its thread. Workers are untouched
    /// and keep draining whatever is already enqueued (§5).
    pub fn stop_generator(&self) -> Result<(), LifecycleError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.generator.take() {
            None => Err(LifecycleError::GeneratorNotRunning),
            Some((handle, stop)) => {
                stop.stop();
                let _ = handle.join();
                tracing::info!("batch generator stopped");
                Ok(())
            }
        }
    }

    /// Signal workers and the generator (if running) to stop, and join every
    /// thread. Leaves the engine `Uninitialised`; process table contents are
    /// not discarded, but a subsequent `initialize` starts a fresh pool.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.stop_generator_locked();
        inner.stop_workers_locked();
        inner.state = State::Uninitialized;
        tracing::info!("engine shut down");
    }

    /// `screen -s <name>`: create one process and enqueue it directly.
    pub fn screen_start(&self, name: &str) -> Result<Arc<Process>, ScreenError> {
        let (config, table, queues) = self.active_handles()?;
        let mut rng = rand::rng();
        let process = table.create(name, &mut rng)?;
        queues.enqueue(config.scheduler, Arc::clone(&process));
        tracing::info!(process = %name, "process created via screen -s");
        Ok(process)
    }

    /// `screen -r <name>`: look up an existing process for a detail view.
    pub fn screen_resume(&self, name: &str) -> Result<Arc<Process>, ScreenError> {
        let (_, table, _) = self.active_handles()?;
        Ok(table.get(name)?)
    }

    /// `screen -ls`: running and finished process snapshots.
    pub fn snapshot(&self) -> Result<TableSnapshot, LifecycleError> {
        let (_, table, _) = self
            .active_handles()
            .map_err(|e| match e {
                ScreenError::Lifecycle(e) => e,
                ScreenError::Command(_) => unreachable!("active_handles never returns Command"),
            })?;
        Ok(table.snapshot())
    }

    fn active_handles(&self) -> Result<(Arc<SystemConfig>, Arc<ProcessTable>, Arc<ReadyQueues>), ScreenError> {
        let inner = self.inner.lock().unwrap();
        if inner.state != State::Initialized {
            return Err(LifecycleError::NotInitialized.into());
        }
        Ok((
            Arc::clone(inner.config.as_ref().unwrap()),
            Arc::clone(inner.table.as_ref().unwrap()),
            Arc::clone(inner.queues.as_ref().unwrap()),
        ))
    }
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SchedulingPolicy;

    fn fcfs_config() -> SystemConfig {
        SystemConfig {
            num_cpu: 2,
            scheduler: SchedulingPolicy::Fcfs,
            quantum_cycles: 4,
            batch_process_freq: 1,
            min_instructions: 1,
            max_instructions: 1,
            delay_per_exec: 0,
        }
    }

    #[test]
    fn commands_before_initialize_are_rejected() {
        let engine = Engine::new();
        assert!(matches!(
            engine.screen_start("p"),
            Err(ScreenError::Lifecycle(LifecycleError::NotInitialized))
        ));
        assert_eq!(engine.start_generator(), Err(LifecycleError::NotInitialized));
    }

    #[test]
    fn initialize_then_screen_start_runs_a_process_to_completion() {
        let engine = Engine::new();
        engine.initialize(fcfs_config());
        let process = engine.screen_start("process01").unwrap();

        for _ in 0..50 {
            if process.is_finished() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert!(process.is_finished());
        engine.shutdown();
    }

    #[test]
    fn screen_start_rejects_duplicate_names() {
        let engine = Engine::new();
        engine.initialize(fcfs_config());
        engine.screen_start("dup").unwrap();
        assert!(matches!(
            engine.screen_start("dup"),
            Err(ScreenError::Command(CommandError::AlreadyExists(_)))
        ));
        engine.shutdown();
    }

    #[test]
    fn start_generator_is_not_idempotent() {
        let engine = Engine::new();
        engine.initialize(fcfs_config());
        engine.start_generator().unwrap();
        assert_eq!(
            engine.start_generator(),
            Err(LifecycleError::GeneratorAlreadyRunning)
        );
        engine.stop_generator().unwrap();
        engine.shutdown();
    }

    #[test]
    fn stop_generator_without_one_running_is_an_error() {
        let engine = Engine::new();
        engine.initialize(fcfs_config());
        assert_eq!(
            engine.stop_generator(),
            Err(LifecycleError::GeneratorNotRunning)
        );
        engine.shutdown();
    }

    #[test]
    fn reinitialize_preserves_the_process_table() {
        let engine = Engine::new();
        engine.initialize(fcfs_config());
        engine.screen_start("survivor").unwrap();

        engine.initialize(fcfs_config());

        assert!(engine.screen_resume("survivor").is_ok());
        engine.shutdown();
    }

    #[test]
    fn shutdown_then_commands_are_rejected_again() {
        let engine = Engine::new();
        engine.initialize(fcfs_config());
        engine.shutdown();
        assert!(matches!(
            engine.screen_start("p"),
            Err(ScreenError::Lifecycle(LifecycleError::NotInitialized))
        ));
    }
}
