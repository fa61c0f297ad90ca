//! Normal distribution utilities.

use lrp_ad::Scalar;
use lrp_ad::tape::{Tape, Var};
use lrp_core::{Error, Result};

/// Natural log of `sqrt(2π)`.
pub const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

/// Log-PDF of a Normal distribution `N(mu, sigma)` at `x`.
///
/// `log p(x) = -0.5 * ((x-mu)/sigma)^2 - ln(sigma) - ln(sqrt(2π))`
pub fn logpdf(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::Validation(format!("sigma must be finite and > 0, got {}", sigma)));
    }
    Ok(logpdf_s(x, mu, sigma))
}

/// Generic Normal log-PDF. `sigma` is assumed positive.
#[inline]
pub fn logpdf_s<T: Scalar>(x: T, mu: T, sigma: T) -> T {
    let z = (x - mu) / sigma;
    T::from_f64(-0.5) * z * z - sigma.ln() - T::from_f64(LN_SQRT_2PI)
}

/// Normal log-PDF recorded on a tape. `sigma` is assumed positive.
pub fn logpdf_on_tape(tape: &mut Tape, x: Var, mu: Var, sigma: Var) -> Var {
    let diff = tape.sub(x, mu);
    let z = tape.div(diff, sigma);
    let z2 = tape.mul(z, z);
    let quad = tape.mul_f64(z2, -0.5);
    let ln_sigma = tape.ln(sigma);
    let lp = tape.sub(quad, ln_sigma);
    tape.add_f64(lp, -LN_SQRT_2PI)
}
