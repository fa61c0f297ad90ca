//! Binomial distribution utilities.
//!
//! The logit-parameterized forms never build the probability itself, so they
//! stay finite for linear predictors far into either tail.

use crate::math::{log_sigmoid, log_sigmoid_on_tape, log_sigmoid_s};
use lrp_ad::Scalar;
use lrp_ad::tape::{Tape, Var};
use lrp_core::{Error, Result};
use statrs::function::gamma::ln_gamma;

/// `ln(n choose k)` for `k <= n`.
pub fn ln_choose(n: u64, k: u64) -> f64 {
    // ln Γ(n+1) - ln Γ(k+1) - ln Γ(n-k+1)
    let n1 = (n as f64) + 1.0;
    let k1 = (k as f64) + 1.0;
    let nk1 = ((n - k) as f64) + 1.0;
    ln_gamma(n1) - ln_gamma(k1) - ln_gamma(nk1)
}

fn validate_counts(k: u64, n: u64) -> Result<()> {
    if k > n {
        return Err(Error::Validation(format!("k must be <= n, got k={} n={}", k, n)));
    }
    Ok(())
}

/// Log-PMF of a Binomial distribution with probability in logit space.
pub fn logpmf_logit(k: u64, n: u64, logit_p: f64) -> Result<f64> {
    validate_counts(k, n)?;
    if !logit_p.is_finite() {
        return Err(Error::Validation(format!("logit_p must be finite, got {}", logit_p)));
    }
    let kf = k as f64;
    let nf = n as f64;
    Ok(ln_choose(n, k) + kf * log_sigmoid(logit_p) + (nf - kf) * log_sigmoid(-logit_p))
}

/// Generic logit-space Binomial log-PMF.
pub fn logpmf_logit_s<T: Scalar>(k: u64, n: u64, logit_p: T) -> Result<T> {
    validate_counts(k, n)?;
    let kf = T::from_f64(k as f64);
    let nk = T::from_f64((n - k) as f64);
    Ok(T::from_f64(ln_choose(n, k)) + kf * log_sigmoid_s(logit_p) + nk * log_sigmoid_s(-logit_p))
}

/// Logit-space Binomial log-PMF recorded on a tape.
pub fn logpmf_logit_on_tape(tape: &mut Tape, k: u64, n: u64, logit_p: Var) -> Result<Var> {
    validate_counts(k, n)?;
    let ls_pos = log_sigmoid_on_tape(tape, logit_p);
    let neg = tape.neg(logit_p);
    let ls_neg = log_sigmoid_on_tape(tape, neg);
    let a = tape.mul_f64(ls_pos, k as f64);
    let b = tape.mul_f64(ls_neg, (n - k) as f64);
    let ab = tape.add(a, b);
    Ok(tape.add_f64(ab, ln_choose(n, k)))
}
