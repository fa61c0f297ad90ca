//! # lrp-core
//!
//! Shared error type and the [`LogDensityModel`](traits::LogDensityModel)
//! contract between the stock-recruitment objective and its host.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;

pub use error::{Error, Result};
