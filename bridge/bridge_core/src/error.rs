//! Error types for the rbridge host extension.
//!
//! Errors are organized by subsystem: the embedded runtime lifecycle, the
//! element-wise kernel, and configuration. The root error type, `Error`,
//! wraps each of them so the foreign-call layer can handle failures
//! uniformly.

use thiserror::Error;

/// Root error type for the bridge.
#[derive(Debug, Error)]
pub enum Error {
    /// Embedded runtime lifecycle errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Element-wise kernel errors
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An argument received from the host was unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A panic was caught before it could cross the foreign-call boundary
    #[error("Panic: {0}")]
    Panic(String),
}

/// Errors related to the embedded runtime lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// `start` was called while the runtime is running
    #[error("Embedded runtime is already running")]
    AlreadyRunning,

    /// `stop` was called while the runtime is stopped
    #[error("Embedded runtime is not running")]
    NotRunning,

    /// `start` was called after the runtime has been shut down once
    #[error("Embedded runtime cannot be restarted after shutdown")]
    RestartUnsupported,

    /// The embedded runtime refused to initialize
    #[error("Embedded runtime initialization failed: {0}")]
    InitFailed(String),
}

/// Errors related to the element-wise kernel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// Numerator and denominator lengths differ
    #[error(
        "Dimension mismatch: numerator has {numerator} elements, denominator has {denominator}"
    )]
    DimensionMismatch {
        /// Length of the numerator
        numerator: usize,

        /// Length of the denominator
        denominator: usize,
    },

    /// A caller-supplied output buffer has the wrong length
    #[error("Output length mismatch: expected {expected} elements, got {actual}")]
    OutputLengthMismatch {
        /// Length required by the inputs
        expected: usize,

        /// Length of the buffer supplied
        actual: usize,
    },

    /// Worker threads or the output buffer could not be allocated
    #[error("Resource exhaustion: {0}")]
    ResourceExhaustion(String),

    /// A worker panicked while computing its chunk
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    /// Worker threads could not be given a valid name
    #[error("Invalid worker thread name: {0}")]
    InvalidThreadName(String),

    /// The requested concurrency was zero
    #[error("Concurrency must be at least 1")]
    InvalidConcurrency,
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    /// The configuration file is not valid TOML for `BridgeConfig`
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// A value is outside its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type used throughout the bridge.
pub type Result<T> = std::result::Result<T, Error>;
