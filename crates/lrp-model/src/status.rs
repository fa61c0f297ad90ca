//! Aggregate status logistic regression and the aggregate LRP.
//!
//! Each year is summarized by how many stocks sit above their Sgen. The
//! summaries are data to the regression: the comparison against Sgen is a
//! step function and carries no derivative. The yearly outcome is modelled
//! with `logit p_y = B_0 + B_1 LM_Agg_Abund_y` and the aggregate limit
//! reference point is the abundance at which `p_y` reaches the target `p`.

use crate::config::LogisticForm;
use crate::data::StatusData;
use lrp_ad::Scalar;
use lrp_ad::tape::{Tape, Var};
use lrp_core::Result;
use lrp_prob::{bernoulli, binomial};

/// Stocks above their benchmark in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSummary {
    pub year: usize,
    /// Number of observed stocks with `LM_S > Sgen`.
    pub n_above: u64,
    /// All `N_Stks` stocks observed and above. A year with a stock missing
    /// from the status data is never all-above.
    pub all_above: bool,
}

/// Count stocks above Sgen per year. `sgen` holds plain values, one per stock.
pub fn summarize(data: &StatusData, sgen: &[f64]) -> Vec<YearSummary> {
    let n_stocks = sgen.len() as u64;
    let mut n_above = vec![0u64; data.n_years()];
    for ((&s, &y), &k) in data.spawners.iter().zip(&data.year).zip(&data.stock) {
        if s > sgen[k] {
            n_above[y] += 1;
        }
    }
    n_above
        .into_iter()
        .enumerate()
        .map(|(year, n)| YearSummary { year, n_above: n, all_above: n == n_stocks })
        .collect()
}

impl LogisticForm {
    /// Yearly log-likelihood at linear predictor `eta`.
    pub fn logpmf_s<T: Scalar>(self, y: &YearSummary, n_stocks: u64, eta: T) -> Result<T> {
        match self {
            LogisticForm::Bernoulli => bernoulli::logpmf_logit_s(u8::from(y.all_above), eta),
            LogisticForm::Binomial => binomial::logpmf_logit_s(y.n_above, n_stocks, eta),
        }
    }

    /// Yearly log-likelihood recorded on a tape.
    pub fn logpmf_on_tape(
        self,
        tape: &mut Tape,
        y: &YearSummary,
        n_stocks: u64,
        eta: Var,
    ) -> Result<Var> {
        match self {
            LogisticForm::Bernoulli => {
                bernoulli::logpmf_logit_on_tape(tape, u8::from(y.all_above), eta)
            }
            LogisticForm::Binomial => {
                binomial::logpmf_logit_on_tape(tape, y.n_above, n_stocks, eta)
            }
        }
    }
}

/// Logistic-regression negative log-likelihood summed over years.
pub fn nll<T: Scalar>(
    form: LogisticForm,
    years: &[YearSummary],
    agg_abund: &[f64],
    n_stocks: u64,
    b0: T,
    b1: T,
) -> Result<T> {
    let mut total = T::from_f64(0.0);
    for y in years {
        let eta = b0 + b1 * T::from_f64(agg_abund[y.year]);
        total = total - form.logpmf_s(y, n_stocks, eta)?;
    }
    Ok(total)
}

/// Logistic term recorded on a tape.
pub fn nll_on_tape(
    tape: &mut Tape,
    form: LogisticForm,
    years: &[YearSummary],
    agg_abund: &[f64],
    n_stocks: u64,
    b0: Var,
    b1: Var,
) -> Result<Var> {
    let mut terms = Vec::with_capacity(years.len());
    for y in years {
        let slope = tape.mul_f64(b1, agg_abund[y.year]);
        let eta = tape.add(b0, slope);
        let lp = form.logpmf_on_tape(tape, y, n_stocks, eta)?;
        terms.push(tape.neg(lp));
    }
    Ok(tape.sum(&terms))
}

/// `AggregateLRP = (logit(p) - B_0) / B_1`. Unbounded as `B_1 -> 0`.
pub fn aggregate_lrp<T: Scalar>(logit_p: f64, b0: T, b1: T) -> T {
    (T::from_f64(logit_p) - b0) / b1
}

pub fn aggregate_lrp_on_tape(tape: &mut Tape, logit_p: f64, b0: Var, b1: Var) -> Var {
    let num = tape.f64_sub(logit_p, b0);
    tape.div(num, b1)
}

/// Linear predictor `B_0 + B_1 x` at each prediction abundance.
pub fn logit_preds<T: Scalar>(abund: &[f64], b0: T, b1: T) -> Vec<T> {
    abund.iter().map(|&x| b0 + b1 * T::from_f64(x)).collect()
}

pub fn logit_preds_on_tape(tape: &mut Tape, abund: &[f64], b0: Var, b1: Var) -> Vec<Var> {
    abund
        .iter()
        .map(|&x| {
            let slope = tape.mul_f64(b1, x);
            tape.add(b0, slope)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lrp_ad::dual::Dual;
    use lrp_prob::math::{log_sigmoid, logit};

    fn status() -> StatusData {
        StatusData {
            spawners: vec![100.0, 50.0, 120.0, 10.0, 200.0],
            year: vec![0, 0, 1, 1, 2],
            stock: vec![0, 1, 0, 1, 0],
            agg_abund: vec![150.0, 130.0, 200.0],
        }
    }

    #[test]
    fn test_summarize() {
        let years = summarize(&status(), &[80.0, 40.0]);
        assert_eq!(years[0], YearSummary { year: 0, n_above: 2, all_above: true });
        assert_eq!(years[1], YearSummary { year: 1, n_above: 1, all_above: false });
        // stock 1 missing in year 2
        assert_eq!(years[2], YearSummary { year: 2, n_above: 1, all_above: false });
    }

    #[test]
    fn test_spawners_equal_to_sgen_not_above() {
        let years = summarize(&status(), &[100.0, 50.0]);
        assert_eq!(years[0].n_above, 0);
    }

    #[test]
    fn test_bernoulli_nll() {
        let years = summarize(&status(), &[80.0, 40.0]);
        let agg = status().agg_abund;
        let (b0, b1) = (-2.0, 0.02);
        let got = nll(LogisticForm::Bernoulli, &years, &agg, 2, b0, b1).unwrap();
        let expected = -log_sigmoid(b0 + b1 * 150.0)
            - log_sigmoid(-(b0 + b1 * 130.0))
            - log_sigmoid(-(b0 + b1 * 200.0));
        assert_relative_eq!(got, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_binomial_nll() {
        let years = summarize(&status(), &[80.0, 40.0]);
        let agg = status().agg_abund;
        let (b0, b1) = (-1.0, 0.01);
        let got = nll(LogisticForm::Binomial, &years, &agg, 2, b0, b1).unwrap();
        let mut expected = 0.0;
        for (k, a) in [(2, 150.0), (1, 130.0), (1, 200.0)] {
            expected -= binomial::logpmf_logit(k, 2, b0 + b1 * a).unwrap();
        }
        assert_relative_eq!(got, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_no_years_is_zero() {
        let got = nll(LogisticForm::Binomial, &[], &[], 3, 0.4, 1.0).unwrap();
        assert_eq!(got, 0.0);
    }

    #[test]
    fn test_aggregate_lrp_hits_target_probability() {
        let p = 0.8;
        let lp = logit(p).unwrap();
        let (b0, b1) = (-3.0, 0.004);
        let lrp = aggregate_lrp(lp, b0, b1);
        let eta = logit_preds(&[lrp], b0, b1)[0];
        assert_relative_eq!(lrp_prob::math::sigmoid(eta), p, epsilon = 1e-12);

        // d/dB_1 = -(logit p - B_0) / B_1^2
        let d = aggregate_lrp(lp, Dual::constant(b0), Dual::var(b1));
        assert_relative_eq!(d.dot, -(lp - b0) / (b1 * b1), max_relative = 1e-12);
    }

    #[test]
    fn test_tape_matches_generic() {
        let years = summarize(&status(), &[80.0, 40.0]);
        let agg = status().agg_abund;
        for form in [LogisticForm::Bernoulli, LogisticForm::Binomial] {
            let mut tape = Tape::new();
            let b0 = tape.var(-1.5);
            let b1 = tape.var(0.01);
            let out = nll_on_tape(&mut tape, form, &years, &agg, 2, b0, b1).unwrap();
            tape.backward(out);

            let d0 = nll(form, &years, &agg, 2, Dual::var(-1.5), Dual::constant(0.01)).unwrap();
            let d1 = nll(form, &years, &agg, 2, Dual::constant(-1.5), Dual::var(0.01)).unwrap();
            assert_relative_eq!(tape.val(out), d0.val, epsilon = 1e-12);
            assert_relative_eq!(tape.adjoint(b0), d0.dot, epsilon = 1e-10);
            assert_relative_eq!(tape.adjoint(b1), d1.dot, epsilon = 1e-8);
        }
    }
}
