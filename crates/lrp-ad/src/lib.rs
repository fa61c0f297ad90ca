//! # lrp-ad
//!
//! Automatic differentiation (AD) primitives for the stock-recruitment objective.
//!
//! Provides:
//! - **Forward-mode AD** via [`dual::Dual`] numbers
//! - **Reverse-mode AD** via a computation [`tape::Tape`]
//! - [`scalar::Scalar`] trait for writing generic code over `f64` and `Dual`
//! - The [`lambert`] W solver, with its derivative registered on both AD modes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dual;
pub mod lambert;
pub mod scalar;
pub mod tape;

pub use scalar::Scalar;
