//! Probability building blocks for the stock-recruitment objective.
//!
//! Each distribution module offers up to three flavours of the same density:
//! - a validated `f64` function (`logpdf`, `logpmf_logit`, ...) returning `Result`;
//! - a generic `*_s` version over [`lrp_ad::Scalar`] (plain or forward-mode AD);
//! - an `*_on_tape` version recording onto a reverse-mode [`lrp_ad::tape::Tape`].
//!
//! The generic and tape versions skip per-call validation of values that are
//! positive by construction (exponentiated log-scale parameters).

pub mod bernoulli;
pub mod binomial;
pub mod gamma;
pub mod math;
pub mod normal;
