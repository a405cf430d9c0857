//! Embedded runtime lifecycle.
//!
//! `RuntimeLifecycle` owns the embedded runtime and its state. The state
//! has exactly two values, `Stopped` and `Running`; `start` is only legal
//! from `Stopped` and `stop` only from `Running`. Every transition happens
//! under one mutex, so concurrent start/stop calls are serialized.

use std::fmt;

use bridge_core::{LifecycleError, RuntimeConfig};
use log::{debug, error, info};
use parking_lot::Mutex;

use super::embedded::EmbeddedRuntime;

/// State of the embedded runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    /// Not initialized, or torn down
    Stopped,

    /// Initialized and usable
    Running,
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
        }
    }
}

struct LifecycleInner<R> {
    runtime: R,
    state: RuntimeState,
    starts: u64,
    stops: u64,
}

/// Guarded start/stop state machine around an embedded runtime
pub struct RuntimeLifecycle<R: EmbeddedRuntime> {
    inner: Mutex<LifecycleInner<R>>,
    program_name: String,
    allow_restart: bool,
}

impl<R: EmbeddedRuntime> RuntimeLifecycle<R> {
    /// Wrap `runtime`, initially `Stopped`
    pub fn new(runtime: R, config: &RuntimeConfig) -> Self {
        Self {
            inner: Mutex::new(LifecycleInner {
                runtime,
                state: RuntimeState::Stopped,
                starts: 0,
                stops: 0,
            }),
            program_name: config.program_name.clone(),
            allow_restart: config.allow_restart,
        }
    }

    /// Current state
    pub fn state(&self) -> RuntimeState {
        self.inner.lock().state
    }

    /// Whether the runtime is running
    pub fn is_running(&self) -> bool {
        self.state() == RuntimeState::Running
    }

    /// Number of completed `start` and `stop` transitions
    pub fn transitions(&self) -> (u64, u64) {
        let inner = self.inner.lock();
        (inner.starts, inner.stops)
    }

    /// Argument list passed to the runtime on `start`
    pub fn args(&self) -> Vec<String> {
        vec![self.program_name.clone()]
    }

    /// Start the runtime.
    ///
    /// Fails with `AlreadyRunning` if it is running, and with
    /// `RestartUnsupported` if it has been stopped before and restarts are
    /// not allowed. A failed `init` leaves the state `Stopped`.
    pub fn start(&self) -> Result<(), LifecycleError> {
        let mut inner = self.inner.lock();

        if inner.state == RuntimeState::Running {
            error!("Start requested but {} runtime is already running", inner.runtime.name());
            return Err(LifecycleError::AlreadyRunning);
        }

        if inner.stops > 0 && !self.allow_restart {
            error!("Start requested after {} runtime shutdown", inner.runtime.name());
            return Err(LifecycleError::RestartUnsupported);
        }

        info!("Starting {} runtime", inner.runtime.name());
        let args = self.args();
        if let Err(e) = inner.runtime.init(&args) {
            error!("{} runtime failed to start: {}", inner.runtime.name(), e);
            return Err(e);
        }

        inner.state = RuntimeState::Running;
        inner.starts += 1;
        info!("{} runtime running", inner.runtime.name());

        Ok(())
    }

    /// Stop the runtime. Fails with `NotRunning` unless it is running.
    pub fn stop(&self) -> Result<(), LifecycleError> {
        let mut inner = self.inner.lock();

        if inner.state == RuntimeState::Stopped {
            error!("Stop requested but {} runtime is not running", inner.runtime.name());
            return Err(LifecycleError::NotRunning);
        }

        info!("Stopping {} runtime", inner.runtime.name());
        inner.runtime.exit();
        inner.state = RuntimeState::Stopped;
        inner.stops += 1;
        info!("{} runtime stopped", inner.runtime.name());

        Ok(())
    }

    /// Start the runtime and return a guard that stops it when dropped.
    pub fn acquire(&self) -> Result<RuntimeGuard<'_, R>, LifecycleError> {
        self.start()?;
        Ok(RuntimeGuard {
            lifecycle: self,
            released: false,
        })
    }

    /// Run `f` with shared access to the wrapped runtime
    pub fn inspect<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.inner.lock().runtime)
    }
}

impl<R: EmbeddedRuntime> fmt::Debug for RuntimeLifecycle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RuntimeLifecycle")
            .field("runtime", &inner.runtime.name())
            .field("state", &inner.state)
            .field("starts", &inner.starts)
            .field("stops", &inner.stops)
            .finish()
    }
}

/// Scoped ownership of a running runtime.
///
/// The runtime is stopped exactly once: by `release`, or by `Drop` on any
/// other exit path, including unwinding.
#[must_use = "dropping the guard stops the runtime immediately"]
pub struct RuntimeGuard<'a, R: EmbeddedRuntime> {
    lifecycle: &'a RuntimeLifecycle<R>,
    released: bool,
}

impl<R: EmbeddedRuntime> RuntimeGuard<'_, R> {
    /// Stop the runtime now and report the result
    pub fn release(mut self) -> Result<(), LifecycleError> {
        self.released = true;
        self.lifecycle.stop()
    }

    /// Current state of the guarded runtime
    pub fn state(&self) -> RuntimeState {
        self.lifecycle.state()
    }
}

impl<R: EmbeddedRuntime> Drop for RuntimeGuard<'_, R> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        debug!("Runtime guard dropped, stopping runtime");
        if let Err(e) = self.lifecycle.stop() {
            error!("Runtime guard failed to stop runtime: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::embedded::DetachedRuntime;

    fn lifecycle() -> RuntimeLifecycle<DetachedRuntime> {
        RuntimeLifecycle::new(DetachedRuntime::new(), &RuntimeConfig::default())
    }

    #[test]
    fn test_start_stop() {
        let lifecycle = lifecycle();
        assert_eq!(lifecycle.state(), RuntimeState::Stopped);

        lifecycle.start().unwrap();
        assert!(lifecycle.is_running());
        assert_eq!(
            lifecycle.inspect(|rt| rt.args().to_vec()),
            vec!["ghcDll".to_string()]
        );

        lifecycle.stop().unwrap();
        assert_eq!(lifecycle.state(), RuntimeState::Stopped);
        assert_eq!(lifecycle.transitions(), (1, 1));
        assert_eq!(lifecycle.inspect(|rt| (rt.inits(), rt.exits())), (1, 1));
    }

    #[test]
    fn test_double_start_rejected() {
        let lifecycle = lifecycle();
        lifecycle.start().unwrap();

        assert_eq!(lifecycle.start(), Err(LifecycleError::AlreadyRunning));
        assert_eq!(lifecycle.inspect(|rt| rt.inits()), 1);
        assert!(lifecycle.is_running());
    }

    #[test]
    fn test_stop_without_start_rejected() {
        let lifecycle = lifecycle();
        assert_eq!(lifecycle.stop(), Err(LifecycleError::NotRunning));
        assert_eq!(lifecycle.inspect(|rt| rt.exits()), 0);
    }

    #[test]
    fn test_restart_policy() {
        let lifecycle = lifecycle();
        lifecycle.start().unwrap();
        lifecycle.stop().unwrap();
        assert_eq!(lifecycle.start(), Err(LifecycleError::RestartUnsupported));

        let config = RuntimeConfig {
            allow_restart: true,
            ..RuntimeConfig::default()
        };
        let lifecycle = RuntimeLifecycle::new(DetachedRuntime::new(), &config);
        lifecycle.start().unwrap();
        lifecycle.stop().unwrap();
        lifecycle.start().unwrap();
        assert_eq!(lifecycle.transitions(), (2, 1));
    }

    #[test]
    fn test_guard_stops_on_drop() {
        let lifecycle = lifecycle();
        {
            let guard = lifecycle.acquire().unwrap();
            assert_eq!(guard.state(), RuntimeState::Running);
        }
        assert_eq!(lifecycle.state(), RuntimeState::Stopped);
        assert_eq!(lifecycle.inspect(|rt| rt.exits()), 1);
    }

    #[test]
    fn test_guard_release_stops_once() {
        let lifecycle = lifecycle();
        let guard = lifecycle.acquire().unwrap();
        guard.release().unwrap();

        assert_eq!(lifecycle.state(), RuntimeState::Stopped);
        assert_eq!(lifecycle.inspect(|rt| rt.exits()), 1);
    }

    #[test]
    fn test_acquire_while_running_fails() {
        let lifecycle = lifecycle();
        let _guard = lifecycle.acquire().unwrap();
        assert!(matches!(
            lifecycle.acquire(),
            Err(LifecycleError::AlreadyRunning)
        ));
    }
}
