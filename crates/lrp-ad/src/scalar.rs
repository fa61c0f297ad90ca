//! [`Scalar`] trait: abstraction over `f64` and [`Dual`](crate::dual::Dual)
//! that lets the objective be written once and reused both for plain
//! evaluation **and** forward-mode gradients.

use crate::dual::Dual;
use crate::lambert;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A scalar type suitable for likelihood computation.
///
/// Implemented for `f64` (plain evaluation) and `Dual` (forward-mode AD).
pub trait Scalar:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Sum
    + PartialOrd
    + Sized
{
    /// Wrap an `f64` constant (derivative = 0 for AD types).
    fn from_f64(v: f64) -> Self;

    /// Extract the primal (function) value.
    fn value(&self) -> f64;

    /// Natural logarithm.
    fn ln(self) -> Self;

    /// Exponential.
    fn exp(self) -> Self;

    /// Stable `ln(1 + exp(x))`.
    fn log1pexp(self) -> Self;

    /// Maximum of two values (non-smooth; passes derivative of the winner).
    fn max_s(self, other: Self) -> Self;

    /// `W(e^self)` plus the solver's convergence flag.
    ///
    /// AD types attach the analytic derivative; the iteration is never
    /// differentiated.
    fn lambert_w_log(self) -> (Self, bool);
}

// --- f64 implementation ---

impl Scalar for f64 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn value(&self) -> f64 {
        *self
    }

    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }

    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }

    #[inline]
    fn log1pexp(self) -> Self {
        self.max(0.0) + (-self.abs()).exp().ln_1p()
    }

    #[inline]
    fn max_s(self, other: Self) -> Self {
        f64::max(self, other)
    }

    #[inline]
    fn lambert_w_log(self) -> (Self, bool) {
        let sol = lambert::solve_log(self);
        (sol.value, sol.converged)
    }
}

// --- Dual implementation ---

impl Scalar for Dual {
    #[inline]
    fn from_f64(v: f64) -> Self {
        Dual::constant(v)
    }

    #[inline]
    fn value(&self) -> f64 {
        self.val
    }

    #[inline]
    fn ln(self) -> Self {
        Dual::ln(self)
    }

    #[inline]
    fn exp(self) -> Self {
        Dual::exp(self)
    }

    #[inline]
    fn log1pexp(self) -> Self {
        Dual::log1pexp(self)
    }

    #[inline]
    fn max_s(self, other: Self) -> Self {
        Dual::max(self, other)
    }

    #[inline]
    fn lambert_w_log(self) -> (Self, bool) {
        Dual::lambert_w_log(self)
    }
}
