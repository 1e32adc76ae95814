//! Loader for the whitespace-separated `key value` config format (§6).

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use strum::{Display, EnumString};

use crate::error::ConfigError;

/// Which ready queue discipline the engine runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SchedulingPolicy {
    Fcfs,
    Rr,
}

/// Immutable, validated set of tunables. Produced once by [`load`]/[`load_from_str`]
/// and shared read-only (behind an `Arc`) with every worker and the batch generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    pub num_cpu: u32,
    pub scheduler: SchedulingPolicy,
    pub quantum_cycles: u32,
    pub batch_process_freq: u32,
    pub min_instructions: u32,
    pub max_instructions: u32,
    pub delay_per_exec: u32,
}

impl fmt::Display for SystemConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- num-cpu:            {}", self.num_cpu)?;
        writeln!(f, "- scheduler:          {}", self.scheduler)?;
        writeln!(f, "- quantum-cycles:     {}", self.quantum_cycles)?;
        writeln!(f, "- batch-process-freq: {}", self.batch_process_freq)?;
        writeln!(f, "- min-ins:            {}", self.min_instructions)?;
        writeln!(f, "- max-ins:            {}", self.max_instructions)?;
        write!(f, "- delay-per-exec:     {} ms", self.delay_per_exec)
    }
}

#[derive(Default)]
struct Fields {
    num_cpu: Option<u32>,
    scheduler: Option<SchedulingPolicy>,
    quantum_cycles: Option<u32>,
    batch_process_freq: Option<u32>,
    min_instructions: Option<u32>,
    max_instructions: Option<u32>,
    delay_per_exec: Option<u32>,
}

fn parse_u32(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Like [`parse_u32`] but rejects `0` — for keys SPEC_FULL.md §3/§6 call
/// "positive integer[s]" (`quantum-cycles`, `batch-process-freq`, `min-ins`).
fn parse_positive_u32(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    let raw = parse_u32(key, value)?;
    if raw == 0 {
        return Err(ConfigError::MustBePositive(key));
    }
    Ok(raw)
}

/// Parse the config format from an in-memory string. Order of keys does not matter;
/// unknown keys and out-of-range values are rejected outright.
pub fn load_from_str(text: &str) -> Result<SystemConfig, ConfigError> {
    let mut fields = Fields::default();
    let mut tokens = text.split_whitespace();

    while let Some(key) = tokens.next() {
        let value = tokens
            .next()
            .ok_or_else(|| ConfigError::MissingValue(key.to_string()))?;

        match key {
            "num-cpu" => {
                let raw: i64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "num-cpu",
                    value: value.to_string(),
                })?;
                if !(1..=128).contains(&raw) {
                    return Err(ConfigError::NumCpuOutOfRange(raw));
                }
                fields.num_cpu = Some(raw as u32);
            }
            "scheduler" => {
                let policy =
                    SchedulingPolicy::from_str(value).map_err(|_| ConfigError::InvalidValue {
                        key: "scheduler",
                        value: value.to_string(),
                    })?;
                fields.scheduler = Some(policy);
            }
            "quantum-cycles" => {
                fields.quantum_cycles = Some(parse_positive_u32("quantum-cycles", value)?)
            }
            "batch-process-freq" => {
                fields.batch_process_freq = Some(parse_positive_u32("batch-process-freq", value)?)
            }
            "min-ins" => fields.min_instructions = Some(parse_positive_u32("min-ins", value)?),
            "max-ins" => fields.max_instructions = Some(parse_u32("max-ins", value)?),
            "delay-per-exec" => fields.delay_per_exec = Some(parse_u32("delay-per-exec", value)?),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    let min_instructions = fields
        .min_instructions
        .ok_or(ConfigError::MissingKey("min-ins"))?;
    let max_instructions = fields
        .max_instructions
        .ok_or(ConfigError::MissingKey("max-ins"))?;

    if min_instructions > max_instructions {
        return Err(ConfigError::MinGreaterThanMax {
            min: min_instructions,
            max: max_instructions,
        });
    }

    Ok(SystemConfig {
        num_cpu: fields.num_cpu.ok_or(ConfigError::MissingKey("num-cpu"))?,
        scheduler: fields
            .scheduler
            .ok_or(ConfigError::MissingKey("scheduler"))?,
        quantum_cycles: fields
            .quantum_cycles
            .ok_or(ConfigError::MissingKey("quantum-cycles"))?,
        batch_process_freq: fields
            .batch_process_freq
            .ok_or(ConfigError::MissingKey("batch-process-freq"))?,
        min_instructions,
        max_instructions,
        delay_per_exec: fields
            .delay_per_exec
            .ok_or(ConfigError::MissingKey("delay-per-exec"))?,
    })
}

/// Load and validate the config file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<SystemConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&text)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> &'static str {
        "num-cpu 4\n\
         scheduler rr\n\
         quantum-cycles 5\n\
         batch-process-freq 1\n\
         min-ins 1000\n\
         max-ins 2000\n\
         delay-per-exec 0\n"
    }

    #[test]
    fn parses_all_known_keys() {
        let config = load_from_str(sample()).unwrap();
        assert_eq!(
            config,
            SystemConfig {
                num_cpu: 4,
                scheduler: SchedulingPolicy::Rr,
                quantum_cycles: 5,
                batch_process_freq: 1,
                min_instructions: 1000,
                max_instructions: 2000,
                delay_per_exec: 0,
            }
        );
    }

    #[test]
    fn order_independent() {
        let shuffled = "max-ins 2000 min-ins 1000 delay-per-exec 0 \
                         batch-process-freq 1 quantum-cycles 5 \
                         scheduler fcfs num-cpu 4";
        let config = load_from_str(shuffled).unwrap();
        assert_eq!(config.scheduler, SchedulingPolicy::Fcfs);
        assert_eq!(config.num_cpu, 4);
    }

    #[test]
    fn rejects_unknown_key() {
        let text = "num-cpu 4 frobnicate 1";
        assert!(matches!(
            load_from_str(text),
            Err(ConfigError::UnknownKey(k)) if k == "frobnicate"
        ));
    }

    #[test]
    fn rejects_num_cpu_out_of_range() {
        assert!(matches!(
            load_from_str("num-cpu 0"),
            Err(ConfigError::NumCpuOutOfRange(0))
        ));
        assert!(matches!(
            load_from_str("num-cpu 129"),
            Err(ConfigError::NumCpuOutOfRange(129))
        ));
    }

    #[test]
    fn rejects_zero_for_keys_that_must_be_positive() {
        assert!(matches!(
            load_from_str("num-cpu 1 scheduler rr quantum-cycles 0 batch-process-freq 1 min-ins 1 max-ins 5 delay-per-exec 0"),
            Err(ConfigError::MustBePositive("quantum-cycles"))
        ));
        assert!(matches!(
            load_from_str("num-cpu 1 scheduler rr quantum-cycles 1 batch-process-freq 0 min-ins 1 max-ins 5 delay-per-exec 0"),
            Err(ConfigError::MustBePositive("batch-process-freq"))
        ));
        assert!(matches!(
            load_from_str("num-cpu 1 scheduler rr quantum-cycles 1 batch-process-freq 1 min-ins 0 max-ins 5 delay-per-exec 0"),
            Err(ConfigError::MustBePositive("min-ins"))
        ));
    }

    #[test]
    fn rejects_bad_scheduler() {
        assert!(matches!(
            load_from_str("scheduler round-robin"),
            Err(ConfigError::InvalidValue { key: "scheduler", .. })
        ));
    }

    #[test]
    fn rejects_min_greater_than_max() {
        let text = "num-cpu 1 scheduler fcfs quantum-cycles 1 \
                     batch-process-freq 1 min-ins 10 max-ins 5 delay-per-exec 0";
        assert!(matches!(
            load_from_str(text),
            Err(ConfigError::MinGreaterThanMax { min: 10, max: 5 })
        ));
    }

    #[test]
    fn rejects_missing_key() {
        assert!(matches!(
            load_from_str("num-cpu 4"),
            Err(ConfigError::MissingKey(_))
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        assert!(matches!(
            load("/nonexistent/path/to/config.txt"),
            Err(ConfigError::Io { .. })
        ));
    }
}
