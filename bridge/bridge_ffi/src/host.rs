//! Process-wide bridge state.
//!
//! The host loads the extension once per process, so the configuration, the
//! runtime lifecycle and the kernel live in statics. Everything here is safe
//! Rust; `exports` only translates between these functions and the C ABI.

use bridge_concurrency::{ElementwiseKernel, KernelOptions, KernelTotalsSnapshot};
use bridge_core::{BridgeConfig, LifecycleError, LogLevel, NumericVector, Result};
use bridge_runtime::{RuntimeGuard, RuntimeLifecycle, RuntimeState};
use env_logger::Env;
use log::{debug, info};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

#[cfg(feature = "ghc-rts")]
use bridge_runtime::GhcRuntime;
#[cfg(not(feature = "ghc-rts"))]
use bridge_runtime::DetachedRuntime;

/// Runtime embedded in the host process
#[cfg(feature = "ghc-rts")]
pub type HostRuntime = GhcRuntime;

/// Runtime embedded in the host process
#[cfg(not(feature = "ghc-rts"))]
pub type HostRuntime = DetachedRuntime;

/// Environment variable holding an `env_logger` filter string.
pub const LOG_ENV: &str = "RBRIDGE_LOG";

static CONFIG: OnceCell<BridgeConfig> = OnceCell::new();
static RUNTIME: OnceCell<RuntimeLifecycle<HostRuntime>> = OnceCell::new();
static GUARD: Mutex<Option<RuntimeGuard<'static, HostRuntime>>> = parking_lot::const_mutex(None);
static KERNEL: OnceCell<ElementwiseKernel> = OnceCell::new();

/// Configuration, loaded on first use
pub fn config() -> Result<&'static BridgeConfig> {
    let config = CONFIG.get_or_try_init(|| {
        let config = BridgeConfig::load(None).map_err(|e| {
            init_logging(LogLevel::default());
            e
        })?;
        init_logging(config.logging.level);
        Ok::<_, bridge_core::Error>(config)
    })?;
    Ok(config)
}

/// Install the `env_logger` backend unless a logger is already set.
///
/// `RBRIDGE_LOG` takes precedence over `level`.
pub fn init_logging(level: LogLevel) {
    let installed = env_logger::Builder::new()
        .filter_level(level.into())
        .parse_env(Env::new().filter(LOG_ENV))
        .try_init()
        .is_ok();

    if installed {
        debug!("Logging initialized at {}", level);
    }
}

fn lifecycle() -> Result<&'static RuntimeLifecycle<HostRuntime>> {
    let config = config()?;
    Ok(RUNTIME.get_or_init(|| RuntimeLifecycle::new(HostRuntime::new(), &config.runtime)))
}

/// Start the process-wide runtime and keep it running until `stop_runtime`.
pub fn start_runtime() -> Result<()> {
    let lifecycle = lifecycle()?;
    let mut guard = GUARD.lock();

    let acquired = lifecycle.acquire()?;
    *guard = Some(acquired);
    info!("Host extension loaded");

    Ok(())
}

/// Stop the process-wide runtime started by `start_runtime`.
pub fn stop_runtime() -> Result<()> {
    let mut guard = GUARD.lock();
    let acquired = guard.take().ok_or(LifecycleError::NotRunning)?;

    acquired.release()?;
    info!("Host extension unloaded");

    Ok(())
}

/// State of the process-wide runtime
pub fn runtime_state() -> RuntimeState {
    RUNTIME
        .get()
        .map(|lifecycle| lifecycle.state())
        .unwrap_or(RuntimeState::Stopped)
}

/// The shared division kernel, configured on first use
pub fn kernel() -> Result<&'static ElementwiseKernel> {
    let config = config()?;
    Ok(KERNEL.get_or_init(|| ElementwiseKernel::divide(KernelOptions::from_config(&config.kernel))))
}

/// Element-wise quotient on the shared kernel
pub fn divide(numerator: &[f64], denominator: &[f64]) -> Result<NumericVector> {
    Ok(kernel()?.apply(numerator, denominator)?)
}

/// Element-wise quotient into a caller-supplied buffer
pub fn divide_into(numerator: &[f64], denominator: &[f64], out: &mut [f64]) -> Result<()> {
    kernel()?.apply_into(numerator, denominator, out)?;
    Ok(())
}

/// Totals of every kernel call made through the bridge
pub fn kernel_totals() -> KernelTotalsSnapshot {
    KERNEL
        .get()
        .map(|kernel| kernel.totals())
        .unwrap_or_default()
}
