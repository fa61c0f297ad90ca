//! Observation inputs.
//!
//! Field names serialize with the keys used by existing assessment inputs so a
//! host can feed the same JSON it already assembles (`S`, `logR`, `LM_yr`, ...).

use lrp_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Spawner-recruit observations pooled across stocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitmentData {
    /// Spawner abundance per observation.
    #[serde(rename = "S")]
    pub spawners: Vec<f64>,
    /// Proportion of recruits returning at age 3.
    #[serde(rename = "P_3")]
    pub p3: Vec<f64>,
    /// Observed log recruits.
    #[serde(rename = "logR")]
    pub log_recruits: Vec<f64>,
    /// Stock index per observation, `0..n_stocks`.
    #[serde(rename = "stk")]
    pub stock: Vec<usize>,
    /// Brood year index per observation. Carried for reporting only.
    #[serde(rename = "yr")]
    pub year: Vec<usize>,
    /// Log marine survival of the age-3 returns.
    #[serde(rename = "logSurv_3")]
    pub log_surv3: Vec<f64>,
    /// Log marine survival of the age-4 returns.
    #[serde(rename = "logSurv_4")]
    pub log_surv4: Vec<f64>,
    /// Mean log survival per stock, used for the benchmark productivity.
    #[serde(rename = "muLSurv")]
    pub mu_log_surv: Vec<f64>,
    /// Number of stocks.
    #[serde(rename = "N_Stks")]
    pub n_stocks: usize,
}

impl RecruitmentData {
    /// Number of observations.
    pub fn len(&self) -> usize {
        self.spawners.len()
    }

    /// `true` when there are no observations.
    pub fn is_empty(&self) -> bool {
        self.spawners.is_empty()
    }

    /// Check lengths, stock indices and value domains.
    pub fn validate(&self) -> Result<()> {
        if self.n_stocks == 0 {
            return Err(Error::Validation("N_Stks must be >= 1".into()));
        }
        let n = self.len();
        for (name, len) in [
            ("P_3", self.p3.len()),
            ("logR", self.log_recruits.len()),
            ("stk", self.stock.len()),
            ("yr", self.year.len()),
            ("logSurv_3", self.log_surv3.len()),
            ("logSurv_4", self.log_surv4.len()),
        ] {
            if len != n {
                return Err(Error::Validation(format!(
                    "{} has length {}, expected {} (length of S)",
                    name, len, n
                )));
            }
        }
        if self.mu_log_surv.len() != self.n_stocks {
            return Err(Error::Validation(format!(
                "muLSurv has length {}, expected N_Stks = {}",
                self.mu_log_surv.len(),
                self.n_stocks
            )));
        }

        for i in 0..n {
            let s = self.spawners[i];
            if !s.is_finite() || s <= 0.0 {
                return Err(Error::Validation(format!("S[{}] must be finite and > 0, got {}", i, s)));
            }
            let p3 = self.p3[i];
            if !p3.is_finite() || !(0.0..=1.0).contains(&p3) {
                return Err(Error::Validation(format!("P_3[{}] must be in [0,1], got {}", i, p3)));
            }
            if self.stock[i] >= self.n_stocks {
                return Err(Error::Validation(format!(
                    "stk[{}] = {} out of range for N_Stks = {}",
                    i, self.stock[i], self.n_stocks
                )));
            }
            for (name, v) in [
                ("logR", self.log_recruits[i]),
                ("logSurv_3", self.log_surv3[i]),
                ("logSurv_4", self.log_surv4[i]),
            ] {
                if !v.is_finite() {
                    return Err(Error::Validation(format!("{}[{}] must be finite, got {}", name, i, v)));
                }
            }
        }
        if let Some((k, v)) = self.mu_log_surv.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Validation(format!("muLSurv[{}] must be finite, got {}", k, v)));
        }
        Ok(())
    }

    /// Mean spawner abundance per stock; `None` for stocks without observations.
    pub fn mean_spawners(&self) -> Vec<Option<f64>> {
        let mut sum = vec![0.0; self.n_stocks];
        let mut count = vec![0usize; self.n_stocks];
        for (&k, &s) in self.stock.iter().zip(&self.spawners) {
            if k < self.n_stocks {
                sum[k] += s;
                count[k] += 1;
            }
        }
        sum.into_iter().zip(count).map(|(s, c)| if c > 0 { Some(s / c as f64) } else { None }).collect()
    }
}

/// Stock-year spawner abundances and yearly aggregate abundance for the
/// status logistic regression.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusData {
    /// Spawner abundance of one stock in one year.
    #[serde(rename = "LM_S")]
    pub spawners: Vec<f64>,
    /// Year index per row, `0..n_years`.
    #[serde(rename = "LM_yr")]
    pub year: Vec<usize>,
    /// Stock index per row.
    #[serde(rename = "LM_stk")]
    pub stock: Vec<usize>,
    /// Aggregate abundance per year; its length defines `n_years`.
    #[serde(rename = "LM_Agg_Abund")]
    pub agg_abund: Vec<f64>,
}

impl StatusData {
    /// Number of years.
    pub fn n_years(&self) -> usize {
        self.agg_abund.len()
    }

    /// Check lengths, index ranges, finiteness and `(stock, year)` uniqueness.
    pub fn validate(&self, n_stocks: usize) -> Result<()> {
        let n = self.spawners.len();
        if self.year.len() != n || self.stock.len() != n {
            return Err(Error::Validation(format!(
                "LM_S, LM_yr and LM_stk must share one length, got {}, {}, {}",
                n,
                self.year.len(),
                self.stock.len()
            )));
        }
        if let Some((y, v)) = self.agg_abund.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Validation(format!("LM_Agg_Abund[{}] must be finite, got {}", y, v)));
        }

        let n_years = self.n_years();
        let mut seen = HashSet::with_capacity(n);
        for i in 0..n {
            if !self.spawners[i].is_finite() {
                return Err(Error::Validation(format!(
                    "LM_S[{}] must be finite, got {}",
                    i, self.spawners[i]
                )));
            }
            if self.stock[i] >= n_stocks {
                return Err(Error::Validation(format!(
                    "LM_stk[{}] = {} out of range for N_Stks = {}",
                    i, self.stock[i], n_stocks
                )));
            }
            if self.year[i] >= n_years {
                return Err(Error::Validation(format!(
                    "LM_yr[{}] = {} out of range for {} years of LM_Agg_Abund",
                    i, self.year[i], n_years
                )));
            }
            if !seen.insert((self.stock[i], self.year[i])) {
                return Err(Error::Validation(format!(
                    "duplicate status row for stock {} in year {}",
                    self.stock[i], self.year[i]
                )));
            }
        }
        Ok(())
    }

    /// Number of stocks observed in each year.
    pub fn stocks_per_year(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_years()];
        for &y in &self.year {
            if let Some(c) = counts.get_mut(y) {
                *c += 1;
            }
        }
        counts
    }
}
