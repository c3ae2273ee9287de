mod common;

use openmander_engine::{EqualizeOutcome, Metric, Plan};

fn max_deviation(plan: &Plan) -> f64 {
    plan.compute_metric_score(&Metric::population_deviation("pop")).unwrap()
}

#[test]
fn equalize_narrows_imbalance_and_is_idempotent() {
    let units = common::grid(8, 8, |r, c| 50 + ((r * 13 + c * 7) % 11) as i64);
    let total = units.total("pop").unwrap();

    for seed in [1, 2, 3] {
        let mut plan = Plan::with_seed(units.clone(), 4, seed).unwrap();
        plan.randomize().unwrap();
        let before = max_deviation(&plan);

        let report = plan.equalize("pop", 0.02, 10_000).unwrap();
        assert_ne!(report.outcome, EqualizeOutcome::MaxIterations);
        assert!(report.max_deviation <= before + 1e-12);
        assert!((report.max_deviation - max_deviation(&plan)).abs() < 1e-12);
        if report.outcome == EqualizeOutcome::Converged {
            assert!(report.max_deviation <= 0.02);
        }
        assert!(plan.is_contiguous());
        assert_eq!(plan.district_totals("pop").unwrap().iter().sum::<f64>(), total);

        let assignments = plan.assignments().unwrap();
        let again = plan.equalize("pop", 0.02, 10_000).unwrap();
        assert_eq!(again.moves, 0);
        assert_eq!(again.outcome, report.outcome);
        assert_eq!(plan.assignments().unwrap(), assignments);
    }
}

#[test]
fn uniform_strip_converges() {
    let mut plan = Plan::with_seed(common::uniform_grid(1, 12), 2, 4).unwrap();
    plan.randomize().unwrap();
    let report = plan.equalize("pop", 0.0, 1_000).unwrap();
    assert_eq!(report.outcome, EqualizeOutcome::Converged);
    assert_eq!(report.max_deviation, 0.0);
    assert_eq!(plan.district_totals("pop").unwrap(), vec![6.0, 6.0]);
}

#[test]
fn zero_budget_reports_max_iterations() {
    let mut plan = Plan::with_seed(common::uniform_grid(1, 12), 3, 4).unwrap();
    plan.set_assignments(vec![0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2]).unwrap();
    let report = plan.equalize("pop", 0.0, 0).unwrap();
    assert_eq!(report.moves, 0);
    assert_eq!(report.outcome, EqualizeOutcome::MaxIterations);
}
