//! Survival-adjusted Ricker recruitment likelihood.
//!
//! Each observation splits its spawners into an age-3 share `P_3 S` and an
//! age-4 share `(1 - P_3) S`, each with its own survival covariate:
//!
//! ```text
//! LogR_3 = logA - B S + gamma logSurv_3 + ln(P_3 S)
//! LogR_4 = logA - B S + gamma logSurv_4 + ln((1 - P_3) S)
//! LogR_Pred = ln(S / (S + S_dep)) + ln(e^LogR_3 + e^LogR_4)
//! ```
//!
//! and contributes `-ln N(LogR_Pred - ln S | logR - ln S, sigma)`. The sum of
//! exponentials is taken in log space so a zero share (`P_3 ∈ {0, 1}`) just
//! drops out.

use crate::data::RecruitmentData;
use crate::params::Params;
use lrp_ad::Scalar;
use lrp_ad::tape::{Tape, Var};
use lrp_prob::normal;

/// One observation with its data-only logarithms taken once.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedObs {
    pub stock: usize,
    pub spawners: f64,
    pub ln_s: f64,
    /// `ln(P_3 S)`; `-inf` when `P_3 = 0`.
    pub ln_s3: f64,
    /// `ln((1 - P_3) S)`; `-inf` when `P_3 = 1`.
    pub ln_s4: f64,
    /// `ln(S / (S + S_dep))`.
    pub ln_weight: f64,
    pub log_surv3: f64,
    pub log_surv4: f64,
    pub log_r: f64,
}

/// Precompute per-observation constants. `data` must already be validated.
pub fn prepare(data: &RecruitmentData, s_dep: f64) -> Vec<PreparedObs> {
    (0..data.len())
        .map(|i| {
            let s = data.spawners[i];
            let p3 = data.p3[i];
            PreparedObs {
                stock: data.stock[i],
                spawners: s,
                ln_s: s.ln(),
                ln_s3: (p3 * s).ln(),
                ln_s4: ((1.0 - p3) * s).ln(),
                ln_weight: (s / (s + s_dep)).ln(),
                log_surv3: data.log_surv3[i],
                log_surv4: data.log_surv4[i],
                log_r: data.log_recruits[i],
            }
        })
        .collect()
}

/// Recruitment negative log-likelihood and the per-observation predictions.
#[derive(Debug, Clone)]
pub struct RecruitmentTerm<T> {
    pub nll: T,
    pub log_r_pred: Vec<T>,
}

/// Generic recruitment term over [`Scalar`].
pub fn nll<T: Scalar>(obs: &[PreparedObs], p: &Params<'_, T>) -> RecruitmentTerm<T> {
    let c = T::from_f64;
    let mut total = c(0.0);
    let mut log_r_pred = Vec::with_capacity(obs.len());

    for o in obs {
        let k = o.stock;
        let base = p.log_a[k] - p.log_b[k].exp() * c(o.spawners);
        let lr3 = base + p.gamma * c(o.log_surv3) + c(o.ln_s3);
        let lr4 = base + p.gamma * c(o.log_surv4) + c(o.ln_s4);
        let m = lr3.max_s(lr4);
        let lse = m + ((lr3 - m).exp() + (lr4 - m).exp()).ln();
        let pred = c(o.ln_weight) + lse;

        let sigma = p.log_sigma[k].exp();
        total = total - normal::logpdf_s(pred - c(o.ln_s), c(o.log_r - o.ln_s), sigma);
        log_r_pred.push(pred);
    }

    RecruitmentTerm { nll: total, log_r_pred }
}

/// Recruitment term recorded on a tape; returns the nll node.
pub fn nll_on_tape(tape: &mut Tape, obs: &[PreparedObs], p: &Params<'_, Var>) -> Var {
    let mut terms = Vec::with_capacity(obs.len());

    for o in obs {
        let k = o.stock;
        let b = tape.exp(p.log_b[k]);
        let bs = tape.mul_f64(b, o.spawners);
        let base = tape.sub(p.log_a[k], bs);

        let g3 = tape.mul_f64(p.gamma, o.log_surv3);
        let lr3 = tape.add(base, g3);
        let lr3 = tape.add_f64(lr3, o.ln_s3);
        let g4 = tape.mul_f64(p.gamma, o.log_surv4);
        let lr4 = tape.add(base, g4);
        let lr4 = tape.add_f64(lr4, o.ln_s4);

        let m = tape.max(lr3, lr4);
        let d3 = tape.sub(lr3, m);
        let e3 = tape.exp(d3);
        let d4 = tape.sub(lr4, m);
        let e4 = tape.exp(d4);
        let sum = tape.add(e3, e4);
        let ln_sum = tape.ln(sum);
        let lse = tape.add(m, ln_sum);
        let pred = tape.add_f64(lse, o.ln_weight);

        let resid = tape.add_f64(pred, -o.ln_s);
        let mu = tape.constant(o.log_r - o.ln_s);
        let sigma = tape.exp(p.log_sigma[k]);
        let lp = normal::logpdf_on_tape(tape, resid, mu, sigma);
        terms.push(tape.neg(lp));
    }

    tape.sum(&terms)
}
