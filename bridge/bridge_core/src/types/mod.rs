//! Data types exchanged with the host environment.

pub mod vector;

pub use vector::NumericVector;
