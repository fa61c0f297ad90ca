//! Hierarchical Ricker model with an aggregate logistic status regression.
//!
//! The objective is written twice: once generically over [`Scalar`] (plain
//! `f64` evaluation and forward-mode [`Dual`] gradients) and once recorded on
//! a reverse-mode [`Tape`]. Both paths share the per-component modules, so the
//! two can be cross-checked term by term.

use crate::benchmark::{self, Benchmarks};
use crate::config::{LogisticForm, PriorConfig, StatusConfig};
use crate::data::{RecruitmentData, StatusData};
use crate::params::ParamLayout;
use crate::prior;
use crate::recruitment::{self, PreparedObs, RecruitmentTerm};
use crate::report::{DerivedJacobian, NllTerms, Report};
use crate::status::{self, YearSummary};
use lrp_ad::Scalar;
use lrp_ad::dual::Dual;
use lrp_ad::tape::{Tape, Var};
use lrp_core::traits::LogDensityModel;
use lrp_core::{Error, Result};
use lrp_prob::math::{logit, sigmoid};

/// Hierarchical Bayesian Ricker stock-recruitment model.
///
/// Built once from validated data and configuration; every evaluation is a
/// pure function of the parameter vector (see [`ParamLayout`]).
#[derive(Debug, Clone)]
pub struct HierRickerModel {
    layout: ParamLayout,
    obs: Vec<PreparedObs>,
    mu_log_surv: Vec<f64>,
    mean_spawners: Vec<Option<f64>>,
    status: StatusData,
    priors: PriorConfig,
    status_cfg: StatusConfig,
    logit_p: f64,
    pred_abund: Vec<f64>,
}

/// All components of one generic evaluation.
struct Evaluation<T> {
    recruitment: RecruitmentTerm<T>,
    prior: T,
    benchmarks: Benchmarks<T>,
    years: Vec<YearSummary>,
    logistic: T,
}

impl<T: Scalar> Evaluation<T> {
    fn nll(&self) -> T {
        self.recruitment.nll + self.prior + self.benchmarks.nll + self.logistic
    }
}

/// Objective recorded on a tape, with the benchmark nodes kept for derived outputs.
struct TapeRecord {
    nll: Var,
    benchmarks: Benchmarks<Var>,
}

impl HierRickerModel {
    /// Validate inputs and build the model.
    ///
    /// `pred_abund` is the aggregate abundance grid at which the fitted
    /// logistic curve is reported.
    pub fn new(
        data: RecruitmentData,
        priors: PriorConfig,
        status: StatusData,
        status_cfg: StatusConfig,
        pred_abund: Vec<f64>,
    ) -> Result<Self> {
        data.validate()?;
        priors.validate()?;
        status_cfg.validate()?;
        status.validate(data.n_stocks)?;
        if let Some((j, v)) = pred_abund.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Validation(format!("Pred_Abund[{}] must be finite, got {}", j, v)));
        }

        let n_stocks = data.n_stocks;
        let incomplete =
            status.stocks_per_year().iter().filter(|&&c| c < n_stocks).count();
        if incomplete > 0 {
            log::warn!(
                "{} of {} status years lack some stocks; those years are never all-above",
                incomplete,
                status.n_years()
            );
        }

        let logit_p = logit(status_cfg.p)?;
        let obs = recruitment::prepare(&data, status_cfg.s_dep);
        log::debug!(
            "built HierRickerModel: {} stocks, {} recruitment obs, {} status rows over {} years, {:?} logistic",
            n_stocks,
            obs.len(),
            status.spawners.len(),
            status.n_years(),
            status_cfg.form
        );

        Ok(Self {
            layout: ParamLayout::new(n_stocks),
            mean_spawners: data.mean_spawners(),
            mu_log_surv: data.mu_log_surv,
            obs,
            status,
            priors,
            status_cfg,
            logit_p,
            pred_abund,
        })
    }

    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    pub fn n_stocks(&self) -> usize {
        self.layout.n_stocks()
    }

    pub fn form(&self) -> LogisticForm {
        self.status_cfg.form
    }

    fn evaluate_generic<T: Scalar>(&self, params: &[T]) -> Result<Evaluation<T>> {
        let p = self.layout.split(params)?;
        let recruitment = recruitment::nll(&self.obs, &p);
        let prior = prior::nll(&self.priors, &p);
        let benchmarks = benchmark::compute(&self.mu_log_surv, self.status_cfg.sgen_sig, &p);

        let sgen: Vec<f64> = benchmarks.sgen.iter().map(|s| s.value()).collect();
        let years = status::summarize(&self.status, &sgen);
        let logistic = status::nll(
            self.status_cfg.form,
            &years,
            &self.status.agg_abund,
            self.n_stocks() as u64,
            p.b0,
            p.b1,
        )?;

        Ok(Evaluation { recruitment, prior, benchmarks, years, logistic })
    }

    /// Generic NLL that works with any [`Scalar`] type (f64 or Dual).
    pub fn nll_generic<T: Scalar>(&self, params: &[T]) -> Result<T> {
        Ok(self.evaluate_generic(params)?.nll())
    }

    /// Objective plus every reported quantity at `params`.
    pub fn evaluate(&self, params: &[f64]) -> Result<Report> {
        let e = self.evaluate_generic(params)?;
        let p = self.layout.split(params)?;

        let terms = NllTerms {
            recruitment: e.recruitment.nll,
            prior: e.prior,
            benchmark: e.benchmarks.nll,
            logistic: e.logistic,
        };
        let logit_preds = status::logit_preds(&self.pred_abund, p.b0, p.b1);
        let pred_probs = logit_preds.iter().map(|&x| sigmoid(x)).collect();

        Ok(Report {
            nll: e.nll(),
            terms,
            n_above_bm: e.years.iter().map(|y| y.n_above).collect(),
            all_above_bm: e.years.iter().map(|y| u8::from(y.all_above)).collect(),
            agg_lrp: status::aggregate_lrp(self.logit_p, p.b0, p.b1),
            smsy: e.benchmarks.smsy,
            sgen: e.benchmarks.sgen,
            a: e.benchmarks.a,
            logit_preds,
            pred_probs,
            log_r_pred: e.recruitment.log_r_pred,
            lambert_converged: e.benchmarks.converged,
        })
    }

    /// Gradient of the NLL by forward-mode AD, one dual pass per parameter.
    pub fn gradient_ad(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.layout.split(params)?;
        let mut grad = vec![0.0; params.len()];

        for (i, g) in grad.iter_mut().enumerate() {
            let dual_params: Vec<Dual> = params
                .iter()
                .enumerate()
                .map(|(j, &v)| if j == i { Dual::var(v) } else { Dual::constant(v) })
                .collect();
            *g = self.nll_generic(&dual_params)?.dot;
        }

        Ok(grad)
    }

    /// Gradient of the NLL by reverse-mode AD: one forward and one backward pass.
    pub fn gradient_reverse(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.layout.split(params)?;
        let mut tape = Tape::with_capacity(40 * self.obs.len() + 30 * params.len());
        let vars: Vec<Var> = params.iter().map(|&v| tape.var(v)).collect();

        let record = self.nll_on_tape(&mut tape, &vars)?;
        tape.backward(record.nll);

        Ok(vars.iter().map(|&v| tape.adjoint(v)).collect())
    }

    /// Record the full objective on `tape`.
    fn nll_on_tape(&self, tape: &mut Tape, vars: &[Var]) -> Result<TapeRecord> {
        let p = self.layout.split(vars)?;
        let r = recruitment::nll_on_tape(tape, &self.obs, &p);
        let pr = prior::nll_on_tape(tape, &self.priors, &p);
        let benchmarks =
            benchmark::compute_on_tape(tape, &self.mu_log_surv, self.status_cfg.sgen_sig, &p);

        let sgen: Vec<f64> = benchmarks.sgen.iter().map(|&s| tape.val(s)).collect();
        let years = status::summarize(&self.status, &sgen);
        let lg = status::nll_on_tape(
            tape,
            self.status_cfg.form,
            &years,
            &self.status.agg_abund,
            self.n_stocks() as u64,
            p.b0,
            p.b1,
        )?;

        let nll = tape.add(r, pr);
        let nll = tape.add(nll, benchmarks.nll);
        let nll = tape.add(nll, lg);
        Ok(TapeRecord { nll, benchmarks })
    }

    /// Names of the differentiable reported quantities, in Jacobian row order.
    pub fn derived_names(&self) -> Vec<String> {
        let n = self.n_stocks();
        let mut names = Vec::with_capacity(3 * n + 1 + self.pred_abund.len());
        names.extend((0..n).map(|i| format!("SMSY[{}]", i)));
        names.extend((0..n).map(|i| format!("Sgen[{}]", i)));
        names.push("Agg_LRP".into());
        names.extend((0..n).map(|i| format!("A[{}]", i)));
        names.extend((0..self.pred_abund.len()).map(|j| format!("Logit_Preds[{}]", j)));
        names
    }

    /// Jacobian of SMSY, Sgen, Agg_LRP, A and Logit_Preds with respect to the
    /// parameters, for delta-method standard errors on the host side.
    ///
    /// The quantities are recorded on one tape; each row is one backward pass.
    pub fn derived_jacobian(&self, params: &[f64]) -> Result<DerivedJacobian> {
        self.layout.split(params)?;
        let mut tape = Tape::with_capacity(40 * self.obs.len() + 30 * params.len());
        let vars: Vec<Var> = params.iter().map(|&v| tape.var(v)).collect();

        let record = self.nll_on_tape(&mut tape, &vars)?;
        let p = self.layout.split(&vars)?;
        let agg_lrp = status::aggregate_lrp_on_tape(&mut tape, self.logit_p, p.b0, p.b1);
        let preds = status::logit_preds_on_tape(&mut tape, &self.pred_abund, p.b0, p.b1);

        let bm = record.benchmarks;
        let outputs: Vec<Var> = bm
            .smsy
            .into_iter()
            .chain(bm.sgen)
            .chain(std::iter::once(agg_lrp))
            .chain(bm.a)
            .chain(preds)
            .collect();

        let mut values = Vec::with_capacity(outputs.len());
        let mut jacobian = Vec::with_capacity(outputs.len());
        for out in outputs {
            tape.backward(out);
            values.push(tape.val(out));
            jacobian.push(vars.iter().map(|&v| tape.adjoint(v)).collect());
        }

        Ok(DerivedJacobian { names: self.derived_names(), values, jacobian })
    }
}

impl LogDensityModel for HierRickerModel {
    fn dim(&self) -> usize {
        self.layout.dim()
    }

    fn parameter_names(&self) -> Vec<String> {
        self.layout.names()
    }

    fn parameter_bounds(&self) -> Vec<(f64, f64)> {
        vec![(f64::NEG_INFINITY, f64::INFINITY); self.layout.dim()]
    }

    fn parameter_init(&self) -> Vec<f64> {
        let l = &self.layout;
        let mut init = vec![0.0; l.dim()];
        for (i, mean_s) in self.mean_spawners.iter().enumerate() {
            let s = mean_s.unwrap_or(1.0);
            init[l.log_a(i)] = 1.0;
            init[l.log_b(i)] = -s.ln();
            init[l.log_sgen(i)] = (s / 4.0).ln();
        }
        init[l.log_mu_a()] = self.priors.log_mu_a_mean;
        init[l.gamma()] = self.priors.gamma_mean;

        let agg = &self.status.agg_abund;
        let mean_agg =
            if agg.is_empty() { 0.0 } else { agg.iter().sum::<f64>() / agg.len() as f64 };
        init[l.b1()] = if mean_agg > 0.0 { 1.0 / mean_agg } else { 1.0 };
        init
    }

    fn nll(&self, params: &[f64]) -> Result<f64> {
        self.nll_generic(params)
    }

    fn grad_nll(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.gradient_reverse(params)
    }
}
