//! Principal branch of the Lambert W function, `W(x) e^{W(x)} = x` for `x >= 0`.
//!
//! The argument is always taken as `ln x`, so arguments like `e^800` that do
//! not fit in an `f64` are still solvable. The solve is a plain `f64` Newton
//! iteration on `y + ln y = ln x`. AD types do **not** differentiate through
//! the iterations: [`Dual`](crate::dual::Dual) and the
//! [`Tape`](crate::tape::Tape) attach the implicit-function derivative
//!
//! ```text
//! dW/d(ln x) = x dW/dx = W / (1 + W)
//! ```
//!
//! to the converged value instead.

/// Iteration cap.
pub const MAX_ITER: usize = 100;

/// Convergence threshold on `|ln x - ln y - y|`.
pub const TOLERANCE: f64 = 1e-9;

/// Below this `ln x`, `W(x)` and `x` agree to `f64` precision.
const SMALL_LOG_X: f64 = -40.0;

/// Outcome of one Lambert W solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// Last iterate (the root when `converged`).
    pub value: f64,
    /// Whether the residual dropped below [`TOLERANCE`].
    pub converged: bool,
}

/// Solve `W + ln W = log_x`, i.e. `W = W(exp(log_x))`.
///
/// Non-convergence is not an error: a warning is logged and the last iterate
/// is returned with `converged = false`.
pub fn solve_log(log_x: f64) -> Solution {
    if log_x < SMALL_LOG_X {
        return Solution { value: log_x.exp(), converged: true };
    }

    let mut y = log_x.max(0.0);
    for _ in 0..MAX_ITER {
        if (log_x - y.ln() - y).abs() < TOLERANCE {
            return Solution { value: y, converged: true };
        }
        y -= (y - (log_x - y).exp()) / (1.0 + y);
    }

    log::warn!("Lambert W failed to converge after {} iterations (ln x = {})", MAX_ITER, log_x);
    Solution { value: y, converged: false }
}

/// `dW/d(ln x)` evaluated at a solution `w = W(x)`.
#[inline]
pub fn derivative_log(w: f64) -> f64 {
    w / (1.0 + w)
}
