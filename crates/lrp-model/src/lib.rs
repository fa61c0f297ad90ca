//! # lrp-model
//!
//! Hierarchical Bayesian Ricker stock-recruitment objective for a stock
//! management unit, with per-stock benchmarks (SMSY, Sgen) and a logistic
//! regression of "all stocks above Sgen" on aggregate abundance that yields
//! an aggregate limit reference point.
//!
//! The entry point is [`HierRickerModel`], which implements
//! [`lrp_core::traits::LogDensityModel`] so a host optimizer or sampler can
//! drive it through a flat parameter vector.

pub mod benchmark;
pub mod config;
pub mod data;
pub mod model;
pub mod params;
pub mod prior;
pub mod recruitment;
pub mod report;
pub mod status;

pub use config::{LogisticForm, PriorConfig, StatusConfig};
pub use data::{RecruitmentData, StatusData};
pub use model::HierRickerModel;
pub use params::ParamLayout;
pub use report::{DerivedJacobian, NllTerms, Report};
