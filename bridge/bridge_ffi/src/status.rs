//! Status codes and the per-thread last error.

use std::cell::RefCell;
use std::ffi::c_int;

use bridge_core::{Error, KernelError};

/// Status returned across the C ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StatusCode {
    /// Success
    Ok = 0,

    /// Input lengths differ, or the output buffer does not match them
    DimensionMismatch = 1,

    /// Worker threads or the result buffer could not be allocated
    ResourceExhaustion = 2,

    /// Null pointer with a non-zero length, zero concurrency, or a bad
    /// worker thread name
    InvalidArgument = 3,

    /// A worker (or the call itself) panicked
    Panic = 4,

    /// Runtime lifecycle misuse
    Lifecycle = 5,

    /// Configuration could not be loaded
    Config = 6,
}

impl StatusCode {
    /// Numeric value passed to the host
    pub fn code(self) -> c_int {
        self as c_int
    }
}

impl From<&Error> for StatusCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Kernel(KernelError::DimensionMismatch { .. })
            | Error::Kernel(KernelError::OutputLengthMismatch { .. }) => Self::DimensionMismatch,
            Error::Kernel(KernelError::ResourceExhaustion(_)) => Self::ResourceExhaustion,
            Error::Kernel(KernelError::WorkerPanicked(_)) | Error::Panic(_) => Self::Panic,
            Error::Kernel(KernelError::InvalidConcurrency)
            | Error::Kernel(KernelError::InvalidThreadName(_))
            | Error::InvalidArgument(_) => Self::InvalidArgument,
            Error::Lifecycle(_) => Self::Lifecycle,
            Error::Config(_) => Self::Config,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Remember `err` as the calling thread's last error and return its status
pub fn record_error(err: &Error) -> StatusCode {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(err.to_string()));
    StatusCode::from(err)
}

/// Forget the calling thread's last error
pub fn clear_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Message of the calling thread's last error, if any
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}
