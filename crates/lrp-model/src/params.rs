//! Flat parameter vector layout.
//!
//! For `N` stocks the vector is
//! `[logA[N], logB[N], logSigma[N], logMuA, logSigmaA, gamma, logSgen[N], B_0, B_1]`,
//! so `dim = 4N + 5`. Every entry is unconstrained.

use lrp_core::{Error, Result};

/// Offsets into the flat parameter vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLayout {
    n_stocks: usize,
}

impl ParamLayout {
    pub fn new(n_stocks: usize) -> Self {
        Self { n_stocks }
    }

    pub fn n_stocks(&self) -> usize {
        self.n_stocks
    }

    pub fn dim(&self) -> usize {
        4 * self.n_stocks + 5
    }

    pub fn log_a(&self, stock: usize) -> usize {
        stock
    }

    pub fn log_b(&self, stock: usize) -> usize {
        self.n_stocks + stock
    }

    pub fn log_sigma(&self, stock: usize) -> usize {
        2 * self.n_stocks + stock
    }

    pub fn log_mu_a(&self) -> usize {
        3 * self.n_stocks
    }

    pub fn log_sigma_a(&self) -> usize {
        3 * self.n_stocks + 1
    }

    pub fn gamma(&self) -> usize {
        3 * self.n_stocks + 2
    }

    pub fn log_sgen(&self, stock: usize) -> usize {
        3 * self.n_stocks + 3 + stock
    }

    pub fn b0(&self) -> usize {
        4 * self.n_stocks + 3
    }

    pub fn b1(&self) -> usize {
        4 * self.n_stocks + 4
    }

    /// Parameter names in vector order, e.g. `logA[0]`, `B_1`.
    pub fn names(&self) -> Vec<String> {
        let n = self.n_stocks;
        let mut out = Vec::with_capacity(self.dim());
        for block in ["logA", "logB", "logSigma"] {
            out.extend((0..n).map(|i| format!("{}[{}]", block, i)));
        }
        out.push("logMuA".into());
        out.push("logSigmaA".into());
        out.push("gamma".into());
        out.extend((0..n).map(|i| format!("logSgen[{}]", i)));
        out.push("B_0".into());
        out.push("B_1".into());
        out
    }

    /// Borrow the blocks of `params`. Fails when the length is not [`dim`](Self::dim).
    pub fn split<'a, T: Copy>(&self, params: &'a [T]) -> Result<Params<'a, T>> {
        if params.len() != self.dim() {
            return Err(Error::Validation(format!(
                "expected {} parameters for {} stocks, got {}",
                self.dim(),
                self.n_stocks,
                params.len()
            )));
        }
        let n = self.n_stocks;
        Ok(Params {
            log_a: &params[..n],
            log_b: &params[n..2 * n],
            log_sigma: &params[2 * n..3 * n],
            log_mu_a: params[self.log_mu_a()],
            log_sigma_a: params[self.log_sigma_a()],
            gamma: params[self.gamma()],
            log_sgen: &params[self.log_sgen(0)..self.b0()],
            b0: params[self.b0()],
            b1: params[self.b1()],
        })
    }
}

/// Named view of one parameter vector. `T` is `f64`, `Dual` or a tape `Var`.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a, T> {
    pub log_a: &'a [T],
    pub log_b: &'a [T],
    pub log_sigma: &'a [T],
    pub log_mu_a: T,
    pub log_sigma_a: T,
    pub gamma: T,
    pub log_sgen: &'a [T],
    pub b0: T,
    pub b1: T,
}
