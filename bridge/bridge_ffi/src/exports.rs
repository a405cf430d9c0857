//! C ABI entry points.
//!
//! All functions use the C calling convention and are `no_mangle` so the host
//! can resolve them by name. No panic unwinds across this boundary: every
//! entry point runs its body under `catch_unwind` and reports failures as a
//! status code plus a per-thread message (`bridge_last_error`).

use std::any::Any;
use std::ffi::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

use bridge_core::{Error, NumericVector, Result};
use log::error;

use crate::host;
use crate::status::{clear_error, last_error, record_error, StatusCode};

/// Owned result buffer handed to the host.
///
/// On success `status` is `0` and `data`/`len` describe the quotient. On
/// failure `data` is null and `len` is `0`. Release with
/// `bridge_vector_free`.
#[repr(C)]
#[derive(Debug)]
pub struct BridgeVector {
    /// First element, or null on failure
    pub data: *mut f64,

    /// Number of elements
    pub len: usize,

    /// `StatusCode` as an integer
    pub status: c_int,
}

impl BridgeVector {
    fn from_vector(vector: NumericVector) -> Self {
        let boxed = vector.into_boxed_slice();
        let len = boxed.len();
        Self {
            data: Box::into_raw(boxed) as *mut f64,
            len,
            status: StatusCode::Ok.code(),
        }
    }

    fn failed(status: StatusCode) -> Self {
        Self {
            data: ptr::null_mut(),
            len: 0,
            status: status.code(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(Error::Panic(panic_message(&*payload))))
}

fn status_of(result: Result<()>) -> c_int {
    match result {
        Ok(()) => {
            clear_error();
            StatusCode::Ok.code()
        }
        Err(e) => record_error(&e).code(),
    }
}

/// # Safety
///
/// Unless `len` is `0`, `data` must point to `len` readable `f64` values.
unsafe fn input_slice<'a>(data: *const f64, len: usize, name: &str) -> Result<&'a [f64]> {
    if len == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(Error::InvalidArgument(format!(
            "{} is null but has length {}",
            name, len
        )));
    }
    Ok(slice::from_raw_parts(data, len))
}

/// # Safety
///
/// Unless `len` is `0`, `data` must point to `len` writable `f64` values not
/// aliased by any input.
unsafe fn output_slice<'a>(data: *mut f64, len: usize) -> Result<&'a mut [f64]> {
    if len == 0 {
        return Ok(&mut []);
    }
    if data.is_null() {
        return Err(Error::InvalidArgument(format!(
            "out is null but has length {}",
            len
        )));
    }
    Ok(slice::from_raw_parts_mut(data, len))
}

/// Start the embedded runtime. Called once when the host loads the extension.
///
/// Lifecycle misuse (a second `HsStart` without `HsEnd`) is fatal: the error
/// is logged and the process aborts, since this signature cannot report it.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn HsStart() {
    if let Err(e) = guarded(host::start_runtime) {
        error!("HsStart failed: {}", e);
        std::process::abort();
    }
}

/// Stop the embedded runtime. Called once when the host unloads the extension.
///
/// `HsEnd` without a running runtime is fatal, as for `HsStart`.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn HsEnd() {
    if let Err(e) = guarded(host::stop_runtime) {
        error!("HsEnd failed: {}", e);
        std::process::abort();
    }
}

/// Element-wise quotient `x[i] / y[i]`, computed on all logical cores.
///
/// Division by zero follows IEEE-754 (`±inf` or `NaN`).
///
/// # Safety
///
/// `x` must point to `nx` readable `f64` values and `y` to `ny`; either may
/// be null when its length is `0`. A successful result must be released with
/// `bridge_vector_free`.
#[no_mangle]
pub unsafe extern "C" fn parad(x: *const f64, nx: usize, y: *const f64, ny: usize) -> BridgeVector {
    let result = guarded(|| {
        let x = input_slice(x, nx, "x")?;
        let y = input_slice(y, ny, "y")?;
        host::divide(x, y)
    });

    match result {
        Ok(quotient) => {
            clear_error();
            BridgeVector::from_vector(quotient)
        }
        Err(e) => BridgeVector::failed(record_error(&e)),
    }
}

/// Release a buffer returned by `parad`.
///
/// # Safety
///
/// `vector` must have been returned by `parad` and not released before.
/// Failed results (null `data`) may be passed and are ignored.
#[no_mangle]
pub unsafe extern "C" fn bridge_vector_free(vector: BridgeVector) {
    if vector.data.is_null() {
        return;
    }
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
        vector.data,
        vector.len,
    )));
}

/// Element-wise quotient written into the host-allocated `out`.
///
/// Returns a status code. When it is not `0`, the contents of `out` are
/// unspecified.
///
/// # Safety
///
/// `x`, `y` and `out` must point to `nx`, `ny` and `nout` `f64` values
/// respectively (null is allowed for a length of `0`), and `out` must not
/// overlap either input.
#[no_mangle]
pub unsafe extern "C" fn parad_into(
    x: *const f64,
    nx: usize,
    y: *const f64,
    ny: usize,
    out: *mut f64,
    nout: usize,
) -> c_int {
    status_of(guarded(|| {
        let x = input_slice(x, nx, "x")?;
        let y = input_slice(y, ny, "y")?;
        let out = output_slice(out, nout)?;
        host::divide_into(x, y, out)
    }))
}

/// Copy the calling thread's last error message into `buf`.
///
/// Writes at most `cap - 1` bytes followed by a NUL. Returns the full message
/// length in bytes (excluding the NUL), or `0` if the last call succeeded.
///
/// # Safety
///
/// `buf` must point to `cap` writable bytes, or be null (then nothing is
/// written and only the length is returned).
#[no_mangle]
pub unsafe extern "C" fn bridge_last_error(buf: *mut c_char, cap: usize) -> usize {
    let message = match last_error() {
        Some(message) => message,
        None => return 0,
    };

    if !buf.is_null() && cap > 0 {
        let copied = message.len().min(cap - 1);
        ptr::copy_nonoverlapping(message.as_ptr() as *const c_char, buf, copied);
        *buf.add(copied) = 0;
    }

    message.len()
}
