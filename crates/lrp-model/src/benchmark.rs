//! Per-stock benchmarks: productivity, SMSY and the Sgen soft constraint.
//!
//! With `logProd = logA + gamma muLSurv` the Ricker yield curve peaks at
//! `SMSY = (1 - W(e^(1 - logProd))) / B`. `Sgen` is a free parameter tied to
//! its definition (the spawners that recover to SMSY in one generation) by
//! `exp(logProd + logSgen - B Sgen) - SMSY ~ N(0, Sgen_sig)`.

use crate::params::Params;
use lrp_ad::Scalar;
use lrp_ad::tape::{Tape, Var};
use lrp_prob::normal;

/// Benchmark quantities for every stock, plus the soft-constraint nll.
#[derive(Debug, Clone)]
pub struct Benchmarks<T> {
    /// Ricker productivity `A = exp(logProd)`.
    pub a: Vec<T>,
    pub smsy: Vec<T>,
    pub sgen: Vec<T>,
    pub nll: T,
    /// `false` when any Lambert W solve hit its iteration cap.
    pub converged: bool,
}

/// Generic benchmarks over [`Scalar`].
pub fn compute<T: Scalar>(mu_log_surv: &[f64], sgen_sig: f64, p: &Params<'_, T>) -> Benchmarks<T> {
    let c = T::from_f64;
    let n = p.log_a.len();
    let mut out = Benchmarks {
        a: Vec::with_capacity(n),
        smsy: Vec::with_capacity(n),
        sgen: Vec::with_capacity(n),
        nll: c(0.0),
        converged: true,
    };

    for i in 0..n {
        let log_prod = p.log_a[i] + p.gamma * c(mu_log_surv[i]);
        let b = p.log_b[i].exp();
        let (w, ok) = (c(1.0) - log_prod).lambert_w_log();
        out.converged &= ok;
        let smsy = (c(1.0) - w) / b;

        let sgen = p.log_sgen[i].exp();
        let recovered = (log_prod + p.log_sgen[i] - b * sgen).exp();
        out.nll = out.nll - normal::logpdf_s(recovered - smsy, c(0.0), c(sgen_sig));

        out.a.push(log_prod.exp());
        out.smsy.push(smsy);
        out.sgen.push(sgen);
    }
    out
}

/// Benchmarks recorded on a tape.
pub fn compute_on_tape(
    tape: &mut Tape,
    mu_log_surv: &[f64],
    sgen_sig: f64,
    p: &Params<'_, Var>,
) -> Benchmarks<Var> {
    let n = p.log_a.len();
    let mut a = Vec::with_capacity(n);
    let mut smsy_out = Vec::with_capacity(n);
    let mut sgen_out = Vec::with_capacity(n);
    let mut terms = Vec::with_capacity(n);
    let mut converged = true;

    let zero = tape.constant(0.0);
    let sd = tape.constant(sgen_sig);

    for i in 0..n {
        let g = tape.mul_f64(p.gamma, mu_log_surv[i]);
        let log_prod = tape.add(p.log_a[i], g);
        let b = tape.exp(p.log_b[i]);

        let arg = tape.f64_sub(1.0, log_prod);
        let (w, ok) = tape.lambert_w_log(arg);
        converged &= ok;
        let num = tape.f64_sub(1.0, w);
        let smsy = tape.div(num, b);

        let sgen = tape.exp(p.log_sgen[i]);
        let bs = tape.mul(b, sgen);
        let lr = tape.add(log_prod, p.log_sgen[i]);
        let lr = tape.sub(lr, bs);
        let recovered = tape.exp(lr);
        let diff = tape.sub(recovered, smsy);
        let lp = normal::logpdf_on_tape(tape, diff, zero, sd);
        terms.push(tape.neg(lp));

        a.push(tape.exp(log_prod));
        smsy_out.push(smsy);
        sgen_out.push(sgen);
    }

    let nll = tape.sum(&terms);
    Benchmarks { a, smsy: smsy_out, sgen: sgen_out, nll, converged }
}
