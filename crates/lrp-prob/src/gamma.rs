//! Gamma distribution utilities.
//!
//! The stock-recruitment priors put a Gamma on a *precision* `x = sigma^-2`
//! while the model estimates `ln sigma`. The Jacobian of that change of
//! variables is the caller's responsibility; see [`log_jacobian_precision`].

use lrp_ad::Scalar;
use lrp_ad::tape::{Tape, Var};
use lrp_core::{Error, Result};
use statrs::function::gamma::ln_gamma;

fn validate_shape_rate(shape: f64, rate: f64) -> Result<()> {
    if !shape.is_finite() || shape <= 0.0 {
        return Err(Error::Validation(format!("shape must be finite and > 0, got {}", shape)));
    }
    if !rate.is_finite() || rate <= 0.0 {
        return Err(Error::Validation(format!("rate must be finite and > 0, got {}", rate)));
    }
    Ok(())
}

/// Log-PDF of a Gamma distribution with `shape` and `rate` at `x`.
///
/// Support: `x >= 0`.
pub fn logpdf_shape_rate(x: f64, shape: f64, rate: f64) -> Result<f64> {
    validate_shape_rate(shape, rate)?;
    if x < 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    if x == 0.0 {
        if shape < 1.0 {
            return Ok(f64::INFINITY);
        }
        if shape > 1.0 {
            return Ok(f64::NEG_INFINITY);
        }
        // shape == 1 => exponential
        return Ok(rate.ln());
    }
    Ok(logpdf_shape_rate_s(x, shape, rate))
}

/// Generic Gamma(shape, rate) log-PDF for `x > 0`; parameters are trusted.
#[inline]
pub fn logpdf_shape_rate_s<T: Scalar>(x: T, shape: f64, rate: f64) -> T {
    let ln_norm = shape * rate.ln() - ln_gamma(shape);
    T::from_f64(ln_norm) + T::from_f64(shape - 1.0) * x.ln() - T::from_f64(rate) * x
}

/// Gamma(shape, rate) log-PDF recorded on a tape, for `x > 0`.
pub fn logpdf_shape_rate_on_tape(tape: &mut Tape, x: Var, shape: f64, rate: f64) -> Var {
    let ln_norm = shape * rate.ln() - ln_gamma(shape);
    let ln_x = tape.ln(x);
    let a = tape.mul_f64(ln_x, shape - 1.0);
    let b = tape.mul_f64(x, rate);
    let ab = tape.sub(a, b);
    tape.add_f64(ab, ln_norm)
}

/// Log-Jacobian of `log_sigma ↦ sigma^-2`: `ln|d(sigma^-2)/d(log_sigma)| = ln 2 - 2 log_sigma`.
#[inline]
pub fn log_jacobian_precision<T: Scalar>(log_sigma: T) -> T {
    T::from_f64(std::f64::consts::LN_2) - T::from_f64(2.0) * log_sigma
}

/// [`log_jacobian_precision`] recorded on a tape.
pub fn log_jacobian_precision_on_tape(tape: &mut Tape, log_sigma: Var) -> Var {
    let two_ls = tape.mul_f64(log_sigma, 2.0);
    tape.f64_sub(std::f64::consts::LN_2, two_ls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lrp_ad::dual::Dual;

    #[test]
    fn test_shape_one_matches_exponential() {
        let (x, rate) = (0.7, 2.3);
        let lp = logpdf_shape_rate(x, 1.0, rate).unwrap();
        assert_relative_eq!(lp, rate.ln() - rate * x, epsilon = 1e-12);
    }

    #[test]
    fn test_matches_statrs() {
        use statrs::distribution::{Continuous, Gamma};
        // statrs uses (shape, rate)
        let d = Gamma::new(3.0, 3.0).unwrap();
        for x in [0.1, 0.8, 2.0, 7.5] {
            assert_relative_eq!(logpdf_shape_rate(x, 3.0, 3.0).unwrap(), d.ln_pdf(x), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_out_of_support() {
        let lp = logpdf_shape_rate(-0.1, 2.0, 1.0).unwrap();
        assert!(lp.is_infinite() && lp.is_sign_negative());
    }

    #[test]
    fn test_invalid_params() {
        assert!(logpdf_shape_rate(1.0, 0.0, 1.0).is_err());
        assert!(logpdf_shape_rate(1.0, 1.0, 0.0).is_err());
        assert!(logpdf_shape_rate(1.0, 1.0, -2.0).is_err());
        assert!(logpdf_shape_rate(1.0, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_precision_prior_on_log_sigma() {
        // Density of log_sigma implied by a Gamma prior on sigma^-2, three ways.
        let (shape, rate, ls) = (2.0, 0.5, -0.35);
        let f = |l: Dual| {
            let prec = (Dual::constant(-2.0) * l).exp();
            logpdf_shape_rate_s(prec, shape, rate) + log_jacobian_precision(l)
        };
        let d = f(Dual::var(ls));

        let prec = (-2.0 * ls).exp();
        let plain = logpdf_shape_rate(prec, shape, rate).unwrap() + std::f64::consts::LN_2 - 2.0 * ls;
        assert_relative_eq!(d.val, plain, epsilon = 1e-12);

        let mut t = Tape::new();
        let l = t.var(ls);
        let m2 = t.mul_f64(l, -2.0);
        let p = t.exp(m2);
        let lp = logpdf_shape_rate_on_tape(&mut t, p, shape, rate);
        let jac = log_jacobian_precision_on_tape(&mut t, l);
        let total = t.add(lp, jac);
        t.backward(total);
        assert_relative_eq!(t.val(total), plain, epsilon = 1e-12);
        assert_relative_eq!(t.adjoint(l), d.dot, epsilon = 1e-12);

        // Analytic: d/dl [(k-1)(-2l) - r e^{-2l} - 2l] = -2(k-1) + 2 r e^{-2l} - 2
        assert_relative_eq!(d.dot, -2.0 * (shape - 1.0) + 2.0 * rate * prec - 2.0, epsilon = 1e-12);
    }
}
