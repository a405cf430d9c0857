//! Numeric vectors.
//!
//! A `NumericVector` is the owned, fixed-length `f64` sequence the kernel
//! produces. Inputs are borrowed as plain slices; only results are owned, and
//! ownership passes to the caller on return.

use std::ops::{Deref, DerefMut};

use crate::error::KernelError;

/// An ordered, fixed-length sequence of double-precision values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericVector {
    values: Vec<f64>,
}

impl NumericVector {
    /// Allocate a zero-filled vector of length `len`.
    ///
    /// Allocation failure is reported as `KernelError::ResourceExhaustion`
    /// instead of aborting the host process.
    pub fn zeroed(len: usize) -> Result<Self, KernelError> {
        let mut values = Vec::new();
        values.try_reserve_exact(len).map_err(|e| {
            KernelError::ResourceExhaustion(format!(
                "cannot allocate output of {} elements: {}",
                len, e
            ))
        })?;
        values.resize(len, 0.0);
        Ok(Self { values })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the elements.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Borrow the elements mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Take the underlying buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Take the underlying buffer as a boxed slice (no spare capacity).
    pub fn into_boxed_slice(self) -> Box<[f64]> {
        self.values.into_boxed_slice()
    }
}

impl From<Vec<f64>> for NumericVector {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl From<&[f64]> for NumericVector {
    fn from(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

impl From<NumericVector> for Vec<f64> {
    fn from(vector: NumericVector) -> Self {
        vector.values
    }
}

impl Deref for NumericVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl DerefMut for NumericVector {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

impl AsRef<[f64]> for NumericVector {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
