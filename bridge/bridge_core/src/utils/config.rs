//! Configuration for the bridge.
//!
//! Configuration is read from an optional TOML file and then adjusted by
//! environment variables. Every field has a default, so an empty file (or no
//! file at all) yields a working configuration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::logging::LogLevel;
use crate::error::ConfigError;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "RBRIDGE_CONFIG";

/// Environment variable overriding `kernel.concurrency`.
pub const NUM_THREADS_ENV: &str = "RBRIDGE_NUM_THREADS";

/// Embedded runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Program-name token passed as the runtime's only argument
    #[serde(default = "default_program_name")]
    pub program_name: String,

    /// Whether `start` is allowed again after a completed `stop`
    #[serde(default)]
    pub allow_restart: bool,
}

fn default_program_name() -> String {
    "ghcDll".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program_name: default_program_name(),
            allow_restart: false,
        }
    }
}

/// Element-wise kernel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Worker count; detected logical cores when absent
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Smallest chunk worth handing to its own worker
    #[serde(default = "default_min_chunk_len")]
    pub min_chunk_len: usize,

    /// Name prefix for worker threads
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,

    /// Whether to collect per-call statistics
    #[serde(default = "default_collect_stats")]
    pub collect_stats: bool,
}

fn default_min_chunk_len() -> usize {
    4096
}

fn default_thread_name_prefix() -> String {
    "rbridge-worker".to_string()
}

fn default_collect_stats() -> bool {
    true
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            concurrency: None,
            min_chunk_len: default_min_chunk_len(),
            thread_name_prefix: default_thread_name_prefix(),
            collect_stats: default_collect_stats(),
        }
    }
}

impl KernelConfig {
    /// Worker count to use: the configured value or the logical core count.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.unwrap_or_else(num_cpus::get)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level emitted
    #[serde(default)]
    pub level: LogLevel,
}

/// Top-level bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Embedded runtime settings
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Kernel settings
    #[serde(default)]
    pub kernel: KernelConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Load configuration.
    ///
    /// Reads `path`, or the file named by `RBRIDGE_CONFIG` when `path` is
    /// `None`, falling back to defaults. `RBRIDGE_NUM_THREADS` is applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            Some(path) => {
                warn!("Configuration file not found: {}", path.display());
                Self::default()
            }
            None => {
                info!("No configuration file specified, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let threads = env::var(NUM_THREADS_ENV).ok();
        self.apply_num_threads(threads.as_deref())
    }

    fn apply_num_threads(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };

        let threads = value.parse::<usize>().map_err(|_| {
            ConfigError::Invalid(format!(
                "{} must be a positive integer, got '{}'",
                NUM_THREADS_ENV, value
            ))
        })?;

        info!("{} overrides kernel concurrency: {}", NUM_THREADS_ENV, threads);
        self.kernel.concurrency = Some(threads);
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.program_name.is_empty() {
            return Err(ConfigError::Invalid(
                "Runtime program name cannot be empty".to_string(),
            ));
        }

        if self.runtime.program_name.contains('\0') {
            return Err(ConfigError::Invalid(
                "Runtime program name cannot contain NUL".to_string(),
            ));
        }

        if self.kernel.concurrency == Some(0) {
            return Err(ConfigError::Invalid(
                "Kernel concurrency cannot be zero".to_string(),
            ));
        }

        if self.kernel.min_chunk_len == 0 {
            return Err(ConfigError::Invalid(
                "Kernel min_chunk_len cannot be zero".to_string(),
            ));
        }

        let prefix = &self.kernel.thread_name_prefix;
        if prefix.is_empty() || prefix.contains('\0') {
            return Err(ConfigError::Invalid(
                "Kernel thread_name_prefix must be non-empty and free of NUL".to_string(),
            ));
        }

        if self.runtime.allow_restart {
            warn!("Runtime restart enabled; the embedded runtime must support re-initialization");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.runtime.program_name, "ghcDll");
        assert!(!config.runtime.allow_restart);
        assert_eq!(config.kernel.concurrency, None);
        assert_eq!(config.kernel.min_chunk_len, 4096);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.kernel.effective_concurrency() >= 1);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml() {
        let config = BridgeConfig::from_toml_str(
            r#"
            [kernel]
            concurrency = 3

            [logging]
            level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.kernel.concurrency, Some(3));
        assert_eq!(config.kernel.effective_concurrency(), 3);
        assert_eq!(config.kernel.thread_name_prefix, "rbridge-worker");
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert_eq!(config.runtime, RuntimeConfig::default());
    }

    #[test]
    fn test_num_threads_override() {
        let mut config = BridgeConfig::default();

        config.apply_num_threads(None).unwrap();
        assert_eq!(config.kernel.concurrency, None);

        config.apply_num_threads(Some("  ")).unwrap();
        assert_eq!(config.kernel.concurrency, None);

        config.apply_num_threads(Some("6")).unwrap();
        assert_eq!(config.kernel.concurrency, Some(6));

        let err = config.apply_num_threads(Some("many")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_validate_rejects_zero() {
        let mut config = BridgeConfig::default();
        config.kernel.concurrency = Some(0);
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.kernel.min_chunk_len = 0;
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.runtime.program_name.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_thread_name_prefix() {
        let config = BridgeConfig::from_toml_str(
            "[kernel]\nthread_name_prefix = \"w\\u0000x\"\nconcurrency = 2\n",
        )
        .unwrap();
        assert_eq!(config.kernel.thread_name_prefix, "w\0x");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = BridgeConfig::default();
        config.kernel.thread_name_prefix.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        let err = BridgeConfig::from_toml_str("[kernel\nconcurrency = 2").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));

        let err = BridgeConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }
}
