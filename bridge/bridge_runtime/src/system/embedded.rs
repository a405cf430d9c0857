//! The embedded runtime seam.
//!
//! The runtime's internals (garbage collector, scheduler) are opaque here;
//! the lifecycle only needs to initialize it with an argument list and tear
//! it down.

use bridge_core::LifecycleError;
use log::info;

/// An embedded managed runtime that can be initialized and torn down.
///
/// `RuntimeLifecycle` guarantees that `init` and `exit` are called
/// alternately, starting with `init`.
pub trait EmbeddedRuntime: Send {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// Initialize the runtime with a synthetic argument list
    fn init(&mut self, args: &[String]) -> Result<(), LifecycleError>;

    /// Tear the runtime down
    fn exit(&mut self);
}

/// A runtime that is not bound to any native runtime system.
///
/// Records the calls it receives. Used when the bridge is built without a
/// native runtime, and in tests.
#[derive(Debug, Default, Clone)]
pub struct DetachedRuntime {
    args: Vec<String>,
    inits: usize,
    exits: usize,
}

impl DetachedRuntime {
    /// Create a detached runtime
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments received by the last `init`
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Number of `init` calls
    pub fn inits(&self) -> usize {
        self.inits
    }

    /// Number of `exit` calls
    pub fn exits(&self) -> usize {
        self.exits
    }
}

impl EmbeddedRuntime for DetachedRuntime {
    fn name(&self) -> &str {
        "detached"
    }

    fn init(&mut self, args: &[String]) -> Result<(), LifecycleError> {
        info!("Detached runtime initialized with args {:?}", args);
        self.args = args.to_vec();
        self.inits += 1;
        Ok(())
    }

    fn exit(&mut self) {
        info!("Detached runtime exited");
        self.exits += 1;
    }
}
