//! Core traits
//!
//! The host optimizer or sampler only ever sees a [`LogDensityModel`]: a flat
//! parameter vector in, a scalar negative log-density (and its gradient) out.
//! Nothing about the concrete model leaks through this seam.

use crate::Result;

/// A differentiable negative log-density over a flat parameter vector.
///
/// Implementations must be pure: two calls with the same `params` return the
/// same value, and no state is carried between calls. The `Send + Sync` bound
/// lets a host evaluate one model from several threads at once.
pub trait LogDensityModel: Send + Sync {
    /// Number of parameters.
    fn dim(&self) -> usize;

    /// Parameter names, in vector order.
    fn parameter_names(&self) -> Vec<String>;

    /// Parameter bounds `(min, max)`, in vector order.
    fn parameter_bounds(&self) -> Vec<(f64, f64)>;

    /// Suggested starting point for the host.
    fn parameter_init(&self) -> Vec<f64>;

    /// Negative log-density (likelihood plus priors) at `params`.
    fn nll(&self, params: &[f64]) -> Result<f64>;

    /// Gradient of [`nll`](LogDensityModel::nll) with respect to `params`.
    fn grad_nll(&self, params: &[f64]) -> Result<Vec<f64>>;
}
