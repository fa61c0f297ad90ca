//! Hierarchical priors.
//!
//! `logA_i ~ N(logMuA, SigmaA)`, a Gamma(Tau, Tau) prior on each precision
//! `sigma^-2` (stock residuals and `SigmaA`) expressed on the log-sd scale
//! with its Jacobian, plus Normal hyperpriors on `logMuA` and `gamma`.

use crate::config::PriorConfig;
use crate::params::Params;
use lrp_ad::Scalar;
use lrp_ad::tape::{Tape, Var};
use lrp_prob::{gamma, normal};

/// `-ln p(log_sigma)` for a Gamma(tau, tau) prior on `exp(log_sigma)^-2`.
fn precision_prior_nll<T: Scalar>(log_sigma: T, tau: f64) -> T {
    let prec = (T::from_f64(-2.0) * log_sigma).exp();
    -(gamma::logpdf_shape_rate_s(prec, tau, tau) + gamma::log_jacobian_precision(log_sigma))
}

fn precision_prior_nll_on_tape(tape: &mut Tape, log_sigma: Var, tau: f64) -> Var {
    let m2 = tape.mul_f64(log_sigma, -2.0);
    let prec = tape.exp(m2);
    let lp = gamma::logpdf_shape_rate_on_tape(tape, prec, tau, tau);
    let jac = gamma::log_jacobian_precision_on_tape(tape, log_sigma);
    let total = tape.add(lp, jac);
    tape.neg(total)
}

/// Prior negative log-density.
pub fn nll<T: Scalar>(cfg: &PriorConfig, p: &Params<'_, T>) -> T {
    let c = T::from_f64;
    let sigma_a = p.log_sigma_a.exp();
    let mut total = c(0.0);

    for (&log_a, &log_sigma) in p.log_a.iter().zip(p.log_sigma) {
        total = total - normal::logpdf_s(log_a, p.log_mu_a, sigma_a);
        total = total + precision_prior_nll(log_sigma, cfg.tau_dist);
    }

    total = total - normal::logpdf_s(p.log_mu_a, c(cfg.log_mu_a_mean), c(cfg.log_mu_a_sig));
    total = total + precision_prior_nll(p.log_sigma_a, cfg.tau_a_dist);
    total - normal::logpdf_s(p.gamma, c(cfg.gamma_mean), c(cfg.gamma_sig))
}

/// Prior term recorded on a tape.
pub fn nll_on_tape(tape: &mut Tape, cfg: &PriorConfig, p: &Params<'_, Var>) -> Var {
    let sigma_a = tape.exp(p.log_sigma_a);
    let mut terms = Vec::with_capacity(2 * p.log_a.len() + 3);

    for (&log_a, &log_sigma) in p.log_a.iter().zip(p.log_sigma) {
        let lp = normal::logpdf_on_tape(tape, log_a, p.log_mu_a, sigma_a);
        terms.push(tape.neg(lp));
        terms.push(precision_prior_nll_on_tape(tape, log_sigma, cfg.tau_dist));
    }

    let mean = tape.constant(cfg.log_mu_a_mean);
    let sd = tape.constant(cfg.log_mu_a_sig);
    let lp = normal::logpdf_on_tape(tape, p.log_mu_a, mean, sd);
    terms.push(tape.neg(lp));

    terms.push(precision_prior_nll_on_tape(tape, p.log_sigma_a, cfg.tau_a_dist));

    let mean = tape.constant(cfg.gamma_mean);
    let sd = tape.constant(cfg.gamma_sig);
    let lp = normal::logpdf_on_tape(tape, p.gamma, mean, sd);
    terms.push(tape.neg(lp));

    tape.sum(&terms)
}
