//! Small numerically-stable math utilities used across probability code.

use lrp_ad::Scalar;
use lrp_ad::tape::{Tape, Var};
use lrp_core::{Error, Result};

/// Stable `log(1 + exp(x))`.
///
/// Branchless: `log(1+exp(x)) = max(x,0) + log(1+exp(-|x|))`.
#[inline]
pub fn log1pexp(x: f64) -> f64 {
    let e = (-x.abs()).exp(); // always in (0, 1], no overflow
    x.max(0.0) + e.ln_1p()
}

/// Stable sigmoid: `1 / (1 + exp(-x))`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    let e = (-x.abs()).exp();
    let recip = 1.0 / (1.0 + e);
    // x >= 0: 1/(1+exp(-x)); x < 0: exp(x)/(1+exp(x))
    if x >= 0.0 { recip } else { e * recip }
}

/// Stable `log(sigmoid(x))`.
#[inline]
pub fn log_sigmoid(x: f64) -> f64 {
    -log1pexp(-x)
}

/// Log-odds `ln(p / (1 - p))` for `p ∈ (0, 1)`.
pub fn logit(p: f64) -> Result<f64> {
    if !p.is_finite() || p <= 0.0 || p >= 1.0 {
        return Err(Error::Validation(format!("p must be in (0,1), got {}", p)));
    }
    Ok((p / (1.0 - p)).ln())
}

/// Generic `log(sigmoid(x))` over [`Scalar`].
#[inline]
pub fn log_sigmoid_s<T: Scalar>(x: T) -> T {
    -(-x).log1pexp()
}

/// `log(sigmoid(x))` recorded on a tape.
pub fn log_sigmoid_on_tape(tape: &mut Tape, x: Var) -> Var {
    let neg_x = tape.neg(x);
    let sp = tape.log1pexp(neg_x);
    tape.neg(sp)
}
