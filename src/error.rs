use thiserror::Error;

/// Failures from loading and validating a [`crate::config::SystemConfig`].
///
/// Fatal to `initialize`: the engine is left in whatever state it was in before
/// the call, and the caller is expected to surface `Display` text to the user.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not open config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("missing value for config key: {0}")]
    MissingValue(String),

    #[error("invalid value {value:?} for key {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("num-cpu must be between 1 and 128, got {0}")]
    NumCpuOutOfRange(i64),

    #[error("{0} must be a positive integer, got 0")]
    MustBePositive(&'static str),

    #[error("min-ins ({min}) cannot be greater than max-ins ({max})")]
    MinGreaterThanMax { min: u32, max: u32 },

    #[error("missing required config key: {0}")]
    MissingKey(&'static str),
}

/// Non-fatal failures from process-table commands (`screen -s`, `screen -r`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("process {0} already exists")]
    AlreadyExists(String),

    #[error("process {0} not found")]
    NotFound(String),
}

/// Non-fatal failures from engine lifecycle commands.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("engine has not been initialized")]
    NotInitialized,

    #[error("scheduler is already running")]
    GeneratorAlreadyRunning,

    #[error("scheduler is not running")]
    GeneratorNotRunning,
}

/// Failures from the `screen -s`/`screen -r` commands, which can fail either
/// because the engine isn't ready yet or because the process name itself is
/// invalid for the requested operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScreenError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Command(#[from] CommandError),
}
