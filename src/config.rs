//! Sorting configuration.
//!
//! Configuration files consist of `key = value` lines. Empty lines and lines starting with `#` are skipped.
//! Supported keys:
//!
//! * `read_delay`, `write_delay`, `rewind_delay`, `shift_delay` - tape operation delays in milliseconds;
//! * `memory_limit` - sorting memory limit in bytes (default: 1024).

use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;
use std::time::Duration;

use crate::tape::TapeDelays;

/// Default sorting memory limit in bytes.
pub const DEFAULT_MEMORY_LIMIT: u64 = 1024;

/// Size of a sorted element in bytes.
pub const ELEMENT_SIZE: u64 = std::mem::size_of::<i32>() as u64;

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file reading error.
    IO(io::Error),
    /// Line is not a `key = value` pair.
    Format { line: usize, reason: &'static str },
    /// Key is not supported.
    UnknownKey { line: usize, key: String },
    /// Value is not a non-negative integer.
    InvalidValue { line: usize, key: String, value: String },
    /// Memory limit can not hold a single element.
    MemoryLimitTooSmall(u64),
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            ConfigError::IO(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            ConfigError::IO(err) => write!(f, "configuration reading error: {}", err),
            ConfigError::Format { line, reason } => write!(f, "line {}: {}", line, reason),
            ConfigError::UnknownKey { line, key } => write!(f, "line {}: unknown key {:?}", line, key),
            ConfigError::InvalidValue { line, key, value } => {
                write!(f, "line {}: {} must be a non-negative integer, got {:?}", line, key, value)
            }
            ConfigError::MemoryLimitTooSmall(limit) => write!(
                f,
                "memory limit of {} bytes can not hold a single {}-byte element",
                limit, ELEMENT_SIZE
            ),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IO(err)
    }
}

/// Immutable sorting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    memory_limit: u64,
    delays: TapeDelays,
}

impl SortConfig {
    /// Creates a validated configuration.
    ///
    /// # Arguments
    /// * `memory_limit` - Maximum size in bytes of the elements kept in memory at once
    /// * `delays` - Operation delays of the tapes created during sorting
    pub fn new(memory_limit: u64, delays: TapeDelays) -> Result<Self, ConfigError> {
        if memory_limit < ELEMENT_SIZE {
            return Err(ConfigError::MemoryLimitTooSmall(memory_limit));
        }

        return Ok(SortConfig { memory_limit, delays });
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("loading configuration from {}", path.display());
        let file = fs::File::open(path)?;

        Self::parse(io::BufReader::new(file))
    }

    /// Loads configuration from `key = value` lines. Keys missing from the input keep their defaults.
    pub fn parse(reader: impl BufRead) -> Result<Self, ConfigError> {
        let mut builder = SortConfigBuilder::new();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some((key, value)) if !value.contains('=') => (key.trim(), value.trim()),
                _ => {
                    return Err(ConfigError::Format {
                        line: line_no,
                        reason: "expected exactly one '='",
                    })
                }
            };
            if key.is_empty() {
                return Err(ConfigError::Format {
                    line: line_no,
                    reason: "missing key",
                });
            }
            if value.is_empty() {
                return Err(ConfigError::Format {
                    line: line_no,
                    reason: "missing value",
                });
            }

            let number: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                line: line_no,
                key: key.to_string(),
                value: value.to_string(),
            })?;

            builder = match key {
                "read_delay" => builder.with_read_delay(Duration::from_millis(number)),
                "write_delay" => builder.with_write_delay(Duration::from_millis(number)),
                "rewind_delay" => builder.with_rewind_delay(Duration::from_millis(number)),
                "shift_delay" => builder.with_shift_delay(Duration::from_millis(number)),
                "memory_limit" => builder.with_memory_limit(number),
                _ => {
                    return Err(ConfigError::UnknownKey {
                        line: line_no,
                        key: key.to_string(),
                    })
                }
            };
        }

        builder.build()
    }

    /// Returns memory limit in bytes.
    pub fn memory_limit(&self) -> u64 {
        self.memory_limit
    }

    /// Returns maximum number of elements in a single run.
    pub fn max_elements_per_run(&self) -> usize {
        (self.memory_limit / ELEMENT_SIZE) as usize
    }

    /// Returns tape operation delays.
    pub fn delays(&self) -> TapeDelays {
        self.delays
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            memory_limit: DEFAULT_MEMORY_LIMIT,
            delays: TapeDelays::none(),
        }
    }
}

/// Sorting configuration builder. Provides methods for [`SortConfig`] initialization.
#[derive(Debug, Clone)]
pub struct SortConfigBuilder {
    memory_limit: u64,
    delays: TapeDelays,
}

impl SortConfigBuilder {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        SortConfigBuilder::default()
    }

    /// Builds a validated [`SortConfig`].
    pub fn build(self) -> Result<SortConfig, ConfigError> {
        SortConfig::new(self.memory_limit, self.delays)
    }

    /// Sets memory limit in bytes.
    pub fn with_memory_limit(mut self, memory_limit: u64) -> SortConfigBuilder {
        self.memory_limit = memory_limit;
        return self;
    }

    /// Sets all tape operation delays at once.
    pub fn with_delays(mut self, delays: TapeDelays) -> SortConfigBuilder {
        self.delays = delays;
        return self;
    }

    pub fn with_read_delay(mut self, delay: Duration) -> SortConfigBuilder {
        self.delays.read = delay;
        return self;
    }

    pub fn with_write_delay(mut self, delay: Duration) -> SortConfigBuilder {
        self.delays.write = delay;
        return self;
    }

    pub fn with_rewind_delay(mut self, delay: Duration) -> SortConfigBuilder {
        self.delays.rewind = delay;
        return self;
    }

    pub fn with_shift_delay(mut self, delay: Duration) -> SortConfigBuilder {
        self.delays.shift = delay;
        return self;
    }
}

impl Default for SortConfigBuilder {
    fn default() -> Self {
        let config = SortConfig::default();

        SortConfigBuilder {
            memory_limit: config.memory_limit,
            delays: config.delays,
        }
    }
}
