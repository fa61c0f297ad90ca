//! Bernoulli distribution utilities.

use crate::math::{log_sigmoid, log_sigmoid_on_tape, log_sigmoid_s};
use lrp_ad::Scalar;
use lrp_ad::tape::{Tape, Var};
use lrp_core::{Error, Result};

fn validate_outcome(k: u8) -> Result<()> {
    if k > 1 {
        return Err(Error::Validation(format!("k must be 0 or 1, got {}", k)));
    }
    Ok(())
}

/// Log-PMF of a Bernoulli distribution with logit parameter `eta = ln(p/(1-p))`.
pub fn logpmf_logit(k: u8, eta: f64) -> Result<f64> {
    validate_outcome(k)?;
    if !eta.is_finite() {
        return Err(Error::Validation(format!("eta must be finite, got {}", eta)));
    }
    Ok(if k == 1 { log_sigmoid(eta) } else { log_sigmoid(-eta) })
}

/// Generic logit-space Bernoulli log-PMF.
pub fn logpmf_logit_s<T: Scalar>(k: u8, eta: T) -> Result<T> {
    validate_outcome(k)?;
    Ok(if k == 1 { log_sigmoid_s(eta) } else { log_sigmoid_s(-eta) })
}

/// Logit-space Bernoulli log-PMF recorded on a tape.
pub fn logpmf_logit_on_tape(tape: &mut Tape, k: u8, eta: Var) -> Result<Var> {
    validate_outcome(k)?;
    if k == 1 {
        Ok(log_sigmoid_on_tape(tape, eta))
    } else {
        let neg = tape.neg(eta);
        Ok(log_sigmoid_on_tape(tape, neg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lrp_ad::dual::Dual;

    #[test]
    fn test_basic_values() {
        // eta = ln(0.3 / 0.7)
        let p: f64 = 0.3;
        let eta = (p / (1.0 - p)).ln();
        assert_relative_eq!(logpmf_logit(1, eta).unwrap(), p.ln(), epsilon = 1e-12);
        assert_relative_eq!(logpmf_logit(0, eta).unwrap(), (1.0 - p).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_logit_matches_statrs_and_binomial_n1() {
        use statrs::distribution::{Bernoulli, Discrete};
        let eta: f64 = 1.3;
        let d = Bernoulli::new(crate::math::sigmoid(eta)).unwrap();
        for k in [0u8, 1] {
            let a = logpmf_logit(k, eta).unwrap();
            assert_relative_eq!(a, d.ln_pmf(k as u64), epsilon = 1e-12);
            assert_relative_eq!(a, crate::binomial::logpmf_logit(k as u64, 1, eta).unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(logpmf_logit(2, 0.0).is_err());
        assert!(logpmf_logit(0, f64::NAN).is_err());
        assert!(logpmf_logit(1, f64::NEG_INFINITY).is_err());
        assert!(logpmf_logit_s(3, Dual::var(0.0)).is_err());
    }

    #[test]
    fn test_saturated_logit_stays_finite() {
        // sigmoid(800) is exactly 1.0 in f64, so ln(1 - p) would be -inf.
        assert_relative_eq!(logpmf_logit(0, 800.0).unwrap(), -800.0, max_relative = 1e-12);
        assert_eq!(logpmf_logit(1, 800.0).unwrap(), 0.0);
    }

    #[test]
    fn test_tape_matches_dual() {
        for k in [0u8, 1] {
            let eta = -0.8;
            let d = logpmf_logit_s(k, Dual::var(eta)).unwrap();
            let mut t = Tape::new();
            let e = t.var(eta);
            let lp = logpmf_logit_on_tape(&mut t, k, e).unwrap();
            t.backward(lp);
            assert_relative_eq!(t.val(lp), d.val, epsilon = 1e-12);
            assert_relative_eq!(t.adjoint(e), d.dot, epsilon = 1e-12);
        }
    }
}
