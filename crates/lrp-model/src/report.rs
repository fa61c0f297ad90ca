//! Reported quantities.

use serde::Serialize;

/// Objective split by component. The components sum to the total nll.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NllTerms {
    pub recruitment: f64,
    pub prior: f64,
    pub benchmark: f64,
    pub logistic: f64,
}

impl NllTerms {
    pub fn total(&self) -> f64 {
        self.recruitment + self.prior + self.benchmark + self.logistic
    }
}

/// Everything the model reports at one parameter vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub nll: f64,
    pub terms: NllTerms,
    /// Stocks above Sgen per year.
    #[serde(rename = "N_Above_BM")]
    pub n_above_bm: Vec<u64>,
    /// `1` when every stock is above Sgen in that year.
    #[serde(rename = "All_Above_BM")]
    pub all_above_bm: Vec<u8>,
    #[serde(rename = "SMSY")]
    pub smsy: Vec<f64>,
    #[serde(rename = "Sgen")]
    pub sgen: Vec<f64>,
    #[serde(rename = "Agg_LRP")]
    pub agg_lrp: f64,
    /// Ricker productivity `exp(logA + gamma muLSurv)` per stock.
    #[serde(rename = "A")]
    pub a: Vec<f64>,
    /// Linear predictor at each prediction abundance (logit scale).
    #[serde(rename = "Logit_Preds")]
    pub logit_preds: Vec<f64>,
    /// `sigmoid(Logit_Preds)`.
    #[serde(rename = "Pred_Probs")]
    pub pred_probs: Vec<f64>,
    #[serde(rename = "LogR_Pred")]
    pub log_r_pred: Vec<f64>,
    pub lambert_converged: bool,
}

/// Derivatives of the reported quantities with respect to the parameters.
///
/// Row order: `SMSY[0..N]`, `Sgen[0..N]`, `Agg_LRP`, `A[0..N]`, `Logit_Preds[..]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedJacobian {
    pub names: Vec<String>,
    pub values: Vec<f64>,
    /// `jacobian[r][j] = d values[r] / d params[j]`.
    pub jacobian: Vec<Vec<f64>>,
}

impl DerivedJacobian {
    /// Row for the quantity called `name`, if any.
    pub fn row(&self, name: &str) -> Option<&[f64]> {
        self.names.iter().position(|n| n == name).map(|r| self.jacobian[r].as_slice())
    }
}
