//! Fixed configuration: prior shapes and aggregate-status settings.
//!
//! These are data, not parameters: they are validated once when the model is
//! built and stay constant for its lifetime. Field names serialize with the
//! keys used by existing assessment inputs (`logMuA_mean`, `Bern_Logistic`, ...).

use lrp_core::{Error, Result};
use serde::{Deserialize, Serialize};

fn require_positive(name: &str, v: f64) -> Result<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(Error::Validation(format!("{} must be finite and > 0, got {}", name, v)));
    }
    Ok(())
}

fn require_finite(name: &str, v: f64) -> Result<()> {
    if !v.is_finite() {
        return Err(Error::Validation(format!("{} must be finite, got {}", name, v)));
    }
    Ok(())
}

/// Prior hyperparameters for the hierarchical structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorConfig {
    /// Mean of the Normal prior on `logMuA`.
    #[serde(rename = "logMuA_mean")]
    pub log_mu_a_mean: f64,
    /// Sd of the Normal prior on `logMuA`.
    #[serde(rename = "logMuA_sig")]
    pub log_mu_a_sig: f64,
    /// Shape (and rate) of the Gamma prior on each stock's residual precision.
    #[serde(rename = "Tau_dist")]
    pub tau_dist: f64,
    /// Shape (and rate) of the Gamma prior on the productivity precision `SigmaA^-2`.
    #[serde(rename = "Tau_A_dist")]
    pub tau_a_dist: f64,
    /// Mean of the Normal prior on the survival effect `gamma`.
    pub gamma_mean: f64,
    /// Sd of the Normal prior on `gamma`.
    pub gamma_sig: f64,
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            log_mu_a_mean: 1.0,
            log_mu_a_sig: 2.0,
            tau_dist: 0.1,
            tau_a_dist: 0.1,
            gamma_mean: 0.0,
            gamma_sig: 10.0,
        }
    }
}

impl PriorConfig {
    /// Check every scale is positive and every location finite.
    pub fn validate(&self) -> Result<()> {
        require_finite("logMuA_mean", self.log_mu_a_mean)?;
        require_positive("logMuA_sig", self.log_mu_a_sig)?;
        require_positive("Tau_dist", self.tau_dist)?;
        require_positive("Tau_A_dist", self.tau_a_dist)?;
        require_finite("gamma_mean", self.gamma_mean)?;
        require_positive("gamma_sig", self.gamma_sig)
    }
}

/// Likelihood used for the aggregate-status logistic regression.
///
/// Serialized as the integer flag `Bern_Logistic` (`1` Bernoulli, `0` Binomial);
/// any other flag is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum LogisticForm {
    /// `All_Above_BM ~ Bernoulli(p_y)`, one trial per year.
    Bernoulli,
    /// `N_Above_BM ~ Binomial(N_Stks, p_y)`.
    Binomial,
}

impl LogisticForm {
    /// The `Bern_Logistic` flag value.
    pub fn flag(self) -> i32 {
        match self {
            LogisticForm::Bernoulli => 1,
            LogisticForm::Binomial => 0,
        }
    }
}

impl TryFrom<i32> for LogisticForm {
    type Error = Error;

    fn try_from(flag: i32) -> Result<Self> {
        match flag {
            1 => Ok(LogisticForm::Bernoulli),
            0 => Ok(LogisticForm::Binomial),
            other => {
                Err(Error::Validation(format!("Bern_Logistic must be 0 or 1, got {}", other)))
            }
        }
    }
}

impl From<LogisticForm> for i32 {
    fn from(form: LogisticForm) -> i32 {
        form.flag()
    }
}

/// Settings for the benchmark soft constraint and the aggregate-status model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Logistic likelihood form.
    #[serde(rename = "Bern_Logistic")]
    pub form: LogisticForm,
    /// Target probability that all stocks are above Sgen; defines the LRP.
    pub p: f64,
    /// Sd of the Sgen soft constraint.
    #[serde(rename = "Sgen_sig")]
    pub sgen_sig: f64,
    /// Spawner abundance scale of the `S / (S + S_dep)` recruitment weight.
    #[serde(rename = "S_dep")]
    pub s_dep: f64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self { form: LogisticForm::Bernoulli, p: 0.5, sgen_sig: 1.0, s_dep: 0.0 }
    }
}

impl StatusConfig {
    /// Check `p ∈ (0,1)`, `Sgen_sig > 0`, `S_dep >= 0`.
    pub fn validate(&self) -> Result<()> {
        if !self.p.is_finite() || self.p <= 0.0 || self.p >= 1.0 {
            return Err(Error::Validation(format!("p must be in (0,1), got {}", self.p)));
        }
        require_positive("Sgen_sig", self.sgen_sig)?;
        if !self.s_dep.is_finite() || self.s_dep < 0.0 {
            return Err(Error::Validation(format!(
                "S_dep must be finite and >= 0, got {}",
                self.s_dep
            )));
        }
        Ok(())
    }
}
