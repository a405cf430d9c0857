//! GHC runtime system binding.
//!
//! `hs_init` may keep pointers into `argv` for the lifetime of the runtime,
//! so the argument strings are owned by `GhcRuntime` and never freed while
//! it is running.

use std::ffi::{c_char, c_int, CString};
use std::ptr;

use bridge_core::LifecycleError;
use log::info;

use super::embedded::EmbeddedRuntime;

extern "C" {
    fn hs_init(argc: *mut c_int, argv: *mut *mut *mut c_char);
    fn hs_exit();
}

/// The GHC runtime system, linked into the host process
#[derive(Debug, Default)]
pub struct GhcRuntime {
    args: Vec<CString>,
    argv: Vec<*mut c_char>,
}

// SAFETY: the raw pointers in `argv` point into `args`, which is owned by the
// same value and only touched under the lifecycle mutex.
unsafe impl Send for GhcRuntime {}

impl GhcRuntime {
    /// Create an unbound handle; nothing happens until `init`
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmbeddedRuntime for GhcRuntime {
    fn name(&self) -> &str {
        "ghc"
    }

    fn init(&mut self, args: &[String]) -> Result<(), LifecycleError> {
        let owned = args
            .iter()
            .map(|a| CString::new(a.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LifecycleError::InitFailed(format!("invalid runtime argument: {}", e)))?;

        let mut argc = c_int::try_from(owned.len())
            .map_err(|_| LifecycleError::InitFailed("too many runtime arguments".to_string()))?;

        self.args = owned;
        self.argv = self
            .args
            .iter()
            .map(|a| a.as_ptr() as *mut c_char)
            .chain(std::iter::once(ptr::null_mut()))
            .collect();

        let mut argv = self.argv.as_mut_ptr();

        info!("Calling hs_init with {} argument(s)", argc);
        // SAFETY: argc/argv describe a NUL-terminated argv array that outlives
        // the runtime; the lifecycle guarantees hs_init is not called twice
        // without an intervening hs_exit.
        unsafe { hs_init(&mut argc, &mut argv) };

        Ok(())
    }

    fn exit(&mut self) {
        info!("Calling hs_exit");
        // SAFETY: only reached after a successful init.
        unsafe { hs_exit() };
    }
}
