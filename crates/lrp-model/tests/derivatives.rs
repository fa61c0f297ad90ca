//! Gradient and derived-quantity Jacobian checks, plus concurrent evaluation.

use approx::assert_relative_eq;
use lrp_core::traits::LogDensityModel;
use lrp_model::{
    HierRickerModel, LogisticForm, PriorConfig, RecruitmentData, Report, StatusConfig, StatusData,
};

fn model(form: LogisticForm) -> HierRickerModel {
    let data = RecruitmentData {
        spawners: vec![1200.0, 800.0, 1500.0, 1000.0, 300.0, 450.0, 200.0, 380.0, 60.0, 90.0],
        p3: vec![0.3, 0.5, 0.2, 0.4, 0.6, 0.1, 0.5, 0.3, 1.0, 0.0],
        log_recruits: vec![7.9, 7.5, 8.1, 7.7, 6.4, 6.9, 6.0, 6.6, 5.1, 5.3],
        stock: vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2],
        year: vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1],
        log_surv3: vec![-3.0, -2.5, -3.2, -2.9, -3.0, -2.5, -3.2, -2.9, -3.0, -2.5],
        log_surv4: vec![-2.8, -2.6, -3.0, -2.7, -2.8, -2.6, -3.0, -2.7, -2.8, -2.6],
        mu_log_surv: vec![-2.9, -2.9, -2.8],
        n_stocks: 3,
    };
    // Spawners sit far from the Sgen values used below, so small steps never flip a status.
    let status = StatusData {
        spawners: vec![1300.0, 150.0, 300.0, 900.0, 20.0, 200.0, 100.0, 400.0, 5.0],
        year: vec![0, 0, 0, 1, 1, 1, 2, 2, 2],
        stock: vec![0, 1, 2, 0, 1, 2, 0, 1, 2],
        agg_abund: vec![1.75, 1.12, 0.505],
    };
    let priors = PriorConfig { tau_dist: 1.0, ..PriorConfig::default() };
    let cfg = StatusConfig { form, p: 0.8, sgen_sig: 20.0, s_dep: 100.0 };
    HierRickerModel::new(data, priors, status, cfg, vec![0.5, 1.0, 2.0]).unwrap()
}

fn point(m: &HierRickerModel) -> Vec<f64> {
    let l = *m.layout();
    let mut x = m.parameter_init();
    x[l.log_a(0)] = 1.2;
    x[l.log_a(1)] = 0.9;
    x[l.log_a(2)] = 1.5;
    x[l.log_sigma(0)] = -0.4;
    x[l.log_sigma(1)] = -0.2;
    x[l.log_sigma(2)] = 0.1;
    x[l.log_mu_a()] = 1.1;
    x[l.log_sigma_a()] = -0.5;
    x[l.gamma()] = 0.3;
    x[l.log_sgen(0)] = 250.0_f64.ln();
    x[l.log_sgen(1)] = 80.0_f64.ln();
    x[l.log_sgen(2)] = 30.0_f64.ln();
    x[l.b0()] = -1.5;
    x[l.b1()] = 1.3;
    x
}

fn step(x: f64) -> f64 {
    1e-6 * x.abs().max(1.0)
}

/// SMSY, Sgen, Agg_LRP, A, Logit_Preds flattened in Jacobian row order.
fn derived(r: &Report) -> Vec<f64> {
    let mut out = Vec::new();
    out.extend(&r.smsy);
    out.extend(&r.sgen);
    out.push(r.agg_lrp);
    out.extend(&r.a);
    out.extend(&r.logit_preds);
    out
}

#[test]
fn reverse_gradient_matches_forward() {
    for form in [LogisticForm::Bernoulli, LogisticForm::Binomial] {
        let m = model(form);
        let x = point(&m);
        let fwd = m.gradient_ad(&x).unwrap();
        let rev = m.gradient_reverse(&x).unwrap();
        assert_eq!(fwd.len(), m.dim());
        for (j, (a, b)) in fwd.iter().zip(&rev).enumerate() {
            assert_relative_eq!(*a, *b, epsilon = 1e-8, max_relative = 1e-8);
            assert!(a.is_finite(), "non-finite gradient for {}", m.parameter_names()[j]);
        }
    }
}

#[test]
fn reverse_gradient_matches_finite_differences() {
    for form in [LogisticForm::Bernoulli, LogisticForm::Binomial] {
        let m = model(form);
        let x = point(&m);
        let g = m.grad_nll(&x).unwrap();
        let names = m.parameter_names();

        for j in 0..x.len() {
            let h = step(x[j]);
            let mut xp = x.clone();
            let mut xm = x.clone();
            xp[j] += h;
            xm[j] -= h;
            let fd = (m.nll(&xp).unwrap() - m.nll(&xm).unwrap()) / (2.0 * h);
            assert!(
                (fd - g[j]).abs() <= 1e-4 * (1.0 + g[j].abs()),
                "{}: fd={} reverse={}",
                names[j],
                fd,
                g[j]
            );
        }
    }
}

#[test]
fn derived_jacobian_matches_finite_differences() {
    let m = model(LogisticForm::Binomial);
    let x = point(&m);
    let jac = m.derived_jacobian(&x).unwrap();
    let base = derived(&m.evaluate(&x).unwrap());

    assert_eq!(jac.names, m.derived_names());
    assert_eq!(jac.values.len(), base.len());
    for (a, b) in jac.values.iter().zip(&base) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12);
    }

    for j in 0..x.len() {
        let h = step(x[j]);
        let mut xp = x.clone();
        let mut xm = x.clone();
        xp[j] += h;
        xm[j] -= h;
        let up = derived(&m.evaluate(&xp).unwrap());
        let down = derived(&m.evaluate(&xm).unwrap());
        for r in 0..base.len() {
            let fd = (up[r] - down[r]) / (2.0 * h);
            let ad = jac.jacobian[r][j];
            assert!(
                (fd - ad).abs() <= 1e-4 * (1.0 + ad.abs()),
                "d {} / d param {}: fd={} ad={}",
                jac.names[r],
                j,
                fd,
                ad
            );
        }
    }
}

#[test]
fn derived_jacobian_known_entries() {
    let m = model(LogisticForm::Bernoulli);
    let l = *m.layout();
    let x = point(&m);
    let jac = m.derived_jacobian(&x).unwrap();

    // dSgen/dlogSgen = Sgen, and Sgen depends on nothing else.
    let row = jac.row("Sgen[1]").unwrap();
    for (j, &d) in row.iter().enumerate() {
        let expected = if j == l.log_sgen(1) { 80.0 } else { 0.0 };
        assert_relative_eq!(d, expected, max_relative = 1e-12);
    }

    // Logit_Preds[j] = B_0 + B_1 x_j
    let row = jac.row("Logit_Preds[2]").unwrap();
    assert_relative_eq!(row[l.b0()], 1.0, epsilon = 1e-15);
    assert_relative_eq!(row[l.b1()], 2.0, epsilon = 1e-15);

    // Agg_LRP does not move with the stock parameters.
    let row = jac.row("Agg_LRP").unwrap();
    assert_eq!(row[l.log_a(0)], 0.0);
    assert!(row[l.b1()] != 0.0);

    assert!(jac.row("nope").is_none());
}

#[test]
fn concurrent_evaluation_matches_serial() {
    let m = model(LogisticForm::Binomial);
    let x = point(&m);
    let serial_nll = m.nll(&x).unwrap();
    let serial_grad = m.grad_nll(&x).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| (m.nll(&x).unwrap(), m.grad_nll(&x).unwrap())))
            .collect();
        for h in handles {
            let (nll, grad) = h.join().unwrap();
            assert_eq!(nll.to_bits(), serial_nll.to_bits());
            assert_eq!(grad, serial_grad);
        }
    });
}

#[test]
fn usable_as_trait_object() {
    let m = model(LogisticForm::Bernoulli);
    let dyn_model: &dyn LogDensityModel = &m;
    let x = dyn_model.parameter_init();
    assert_eq!(x.len(), dyn_model.dim());
    assert!(dyn_model.nll(&x).unwrap().is_finite());
    assert_eq!(dyn_model.grad_nll(&x).unwrap(), m.gradient_reverse(&x).unwrap());
}
