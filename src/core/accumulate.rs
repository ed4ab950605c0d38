use super::percentile::{percentile, representative_index};
use super::random::{MonthlyReturnModel, Rng, derive_seed};
use super::target::target_assets;
use super::types::{AccumulationOutcome, AccumulationTrial, PlanParameters, RepresentativePaths};

const ACCUMULATION_STREAM: u32 = 0;

/// Accumulation phase over a whole plan: the target figure comes from the
/// desired withdrawal and post-retirement rate, the trials from the
/// pre-retirement return assumptions.
pub fn accumulate(params: &PlanParameters) -> AccumulationOutcome {
    let target = target_assets(
        params.desired_monthly_withdrawal,
        params.mean_annual_return_post,
    );
    simulate_accumulation(
        params.current_assets,
        params.monthly_contribution,
        target,
        params.mean_annual_return_pre,
        params.annual_volatility_pre,
        params.trial_count,
        params.max_months_accumulation,
        params.track_paths,
        params.seed,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn simulate_accumulation(
    initial_asset: f64,
    monthly_contribution: f64,
    target_asset: f64,
    mean_return_pct: f64,
    volatility_pct: f64,
    trial_count: u32,
    max_months: u32,
    track_paths: bool,
    seed: u64,
) -> AccumulationOutcome {
    let model = MonthlyReturnModel::from_annual_pct(mean_return_pct, volatility_pct);

    let mut successes: Vec<AccumulationTrial> = Vec::new();
    let mut failure_count = 0_u32;

    for trial_id in 0..trial_count {
        let mut rng = Rng::new(derive_seed(seed, ACCUMULATION_STREAM, trial_id));
        let trial = run_trial(
            initial_asset,
            monthly_contribution,
            target_asset,
            model,
            max_months,
            track_paths,
            &mut rng,
        );
        if trial.months_to_target.is_some() {
            successes.push(trial);
        } else {
            failure_count += 1;
        }
    }

    let mut success_months: Vec<u32> = successes
        .iter()
        .filter_map(|t| t.months_to_target)
        .collect();
    success_months.sort_unstable();

    let success_count = success_months.len() as u32;
    let success_rate = if trial_count == 0 {
        0.0
    } else {
        success_count as f64 / trial_count as f64
    };

    let mut month_values: Vec<f64> = success_months.iter().map(|&m| m as f64).collect();
    let average_months = if month_values.is_empty() {
        0.0
    } else {
        month_values.iter().sum::<f64>() / month_values.len() as f64
    };

    let representative = if track_paths {
        select_representative(&successes, &success_months)
    } else {
        None
    };

    AccumulationOutcome {
        trial_count,
        success_count,
        failure_count,
        success_rate,
        target_assets: target_asset,
        average_months,
        median_months: percentile(&mut month_values, 50.0),
        p10_months: percentile(&mut month_values, 10.0),
        p90_months: percentile(&mut month_values, 90.0),
        success_months,
        representative,
    }
}

fn run_trial(
    initial_asset: f64,
    monthly_contribution: f64,
    target_asset: f64,
    model: MonthlyReturnModel,
    max_months: u32,
    track_paths: bool,
    rng: &mut Rng,
) -> AccumulationTrial {
    let mut monthly_balances = if track_paths {
        let mut balances = Vec::with_capacity(max_months as usize + 1);
        balances.push(initial_asset);
        balances
    } else {
        Vec::new()
    };

    if initial_asset >= target_asset {
        return AccumulationTrial {
            months_to_target: Some(0),
            monthly_balances,
        };
    }

    let mut balance = initial_asset;
    for month in 1..=max_months {
        balance += monthly_contribution;
        balance *= model.sample_growth_factor(rng);
        if track_paths {
            monthly_balances.push(balance);
        }

        if balance <= 0.0 {
            return AccumulationTrial {
                months_to_target: None,
                monthly_balances,
            };
        }
        if balance >= target_asset {
            return AccumulationTrial {
                months_to_target: Some(month),
                monthly_balances,
            };
        }
    }

    // Horizon exhausted without reaching the target.
    AccumulationTrial {
        months_to_target: None,
        monthly_balances,
    }
}

/// Representative paths over the successful trials. The sorted month-counts
/// give the 10th/50th/90th percentile targets; the first stored trial whose
/// terminal month-count matches is used, falling back to the trial at the
/// same index when no exact match exists.
fn select_representative(
    successes: &[AccumulationTrial],
    sorted_months: &[u32],
) -> Option<RepresentativePaths<AccumulationTrial>> {
    if successes.is_empty() {
        return None;
    }

    let pick = |p: f64| {
        let idx = representative_index(sorted_months.len(), p);
        let target = sorted_months[idx];
        successes
            .iter()
            .find(|t| t.months_to_target == Some(target))
            .unwrap_or(&successes[idx])
            .clone()
    };

    Some(RepresentativePaths {
        best: pick(0.1),
        median: pick(0.5),
        worst: pick(0.9),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::months_to_target;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    #[test]
    fn zero_volatility_matches_the_deterministic_calculator() {
        let expected = months_to_target(0.0, 100_000_000.0, 1_000_000.0, 6.0, 1_200);
        let outcome = simulate_accumulation(
            0.0,
            1_000_000.0,
            100_000_000.0,
            6.0,
            0.0,
            50,
            1_200,
            false,
            42,
        );

        assert_eq!(outcome.success_count, 50);
        assert_eq!(outcome.failure_count, 0);
        assert_eq!(outcome.success_rate, 1.0);
        for &months in &outcome.success_months {
            assert_eq!(months, expected);
        }
        assert_eq!(outcome.average_months, expected as f64);
        assert_eq!(outcome.median_months, expected as f64);
    }

    #[test]
    fn already_funded_plans_succeed_at_month_zero() {
        let outcome = simulate_accumulation(
            900_000_000.0,
            0.0,
            900_000_000.0,
            6.0,
            12.0,
            200,
            1_200,
            true,
            7,
        );

        assert_eq!(outcome.success_rate, 1.0);
        assert_eq!(outcome.failure_count, 0);
        assert!(outcome.success_months.iter().all(|&m| m == 0));

        let rep = outcome.representative.expect("paths were tracked");
        assert_eq!(rep.best.months_to_target, Some(0));
        assert_eq!(rep.median.months_to_target, Some(0));
        assert_eq!(rep.worst.months_to_target, Some(0));
    }

    #[test]
    fn unreachable_targets_fail_by_exhaustion() {
        let outcome =
            simulate_accumulation(100.0, 0.0, 1_000_000.0, 0.0, 0.0, 20, 240, true, 11);

        assert_eq!(outcome.success_count, 0);
        assert_eq!(outcome.failure_count, 20);
        assert_eq!(outcome.success_rate, 0.0);
        assert!(outcome.success_months.is_empty());
        // Empty distribution resolves to neutral statistics, not a panic.
        assert_eq!(outcome.median_months, 0.0);
        assert_eq!(outcome.average_months, 0.0);
        assert!(outcome.representative.is_none());
    }

    #[test]
    fn success_rate_accounts_for_every_trial() {
        let outcome = simulate_accumulation(
            5_000_000.0,
            800_000.0,
            150_000_000.0,
            5.0,
            15.0,
            500,
            360,
            false,
            99,
        );

        assert_eq!(outcome.success_count + outcome.failure_count, 500);
        assert!((0.0..=1.0).contains(&outcome.success_rate));
        assert_eq!(
            (outcome.success_rate * 500.0).round() as u32,
            outcome.success_count
        );
    }

    #[test]
    fn representative_months_are_ordered_best_to_worst() {
        let outcome = simulate_accumulation(
            10_000_000.0,
            1_000_000.0,
            120_000_000.0,
            6.0,
            12.0,
            400,
            1_200,
            true,
            13,
        );

        let rep = outcome.representative.expect("paths were tracked");
        let best = rep.best.months_to_target.expect("successful trial");
        let median = rep.median.months_to_target.expect("successful trial");
        let worst = rep.worst.months_to_target.expect("successful trial");
        assert!(best <= median);
        assert!(median <= worst);
    }

    #[test]
    fn tracked_paths_cover_every_simulated_month() {
        let outcome = simulate_accumulation(
            10_000_000.0,
            1_000_000.0,
            50_000_000.0,
            6.0,
            10.0,
            50,
            1_200,
            true,
            21,
        );

        let rep = outcome.representative.expect("paths were tracked");
        for trial in [&rep.best, &rep.median, &rep.worst] {
            let months = trial.months_to_target.expect("successful trial");
            assert_eq!(trial.monthly_balances.len(), months as usize + 1);
            assert_eq!(trial.monthly_balances[0], 10_000_000.0);
        }
    }

    #[test]
    fn higher_mean_return_never_lowers_the_success_rate() {
        // Shared seed means shared normal draws, so every trial's balance is
        // pointwise increasing in the mean and the rate ordering is exact.
        let run = |mean: f64| {
            simulate_accumulation(
                5_000_000.0,
                700_000.0,
                200_000_000.0,
                mean,
                15.0,
                300,
                480,
                false,
                5,
            )
            .success_rate
        };
        let low = run(3.0);
        let mid = run(5.0);
        let high = run(7.0);
        assert!(low <= mid);
        assert!(mid <= high);
    }

    #[test]
    fn same_seed_reproduces_the_same_outcome() {
        let run = || {
            simulate_accumulation(
                2_000_000.0,
                500_000.0,
                80_000_000.0,
                6.0,
                14.0,
                200,
                600,
                false,
                77,
            )
        };
        let a = run();
        let b = run();
        assert_eq!(a.success_months, b.success_months);
        assert_eq!(a.success_rate, b.success_rate);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_outcome_invariants_hold(
            seed in 0u64..u64::MAX,
            initial_millions in 0u32..200,
            contribution_thousands in 0u32..3_000,
            target_millions in 1u32..400,
            mean_bp in -500i32..1_500,
            vol_bp in 0u32..3_000,
            trial_count in 1u32..40,
            max_months in 1u32..360
        ) {
            let outcome = simulate_accumulation(
                initial_millions as f64 * 1_000_000.0,
                contribution_thousands as f64 * 1_000.0,
                target_millions as f64 * 1_000_000.0,
                mean_bp as f64 / 100.0,
                vol_bp as f64 / 100.0,
                trial_count,
                max_months,
                true,
                seed,
            );

            prop_assert_eq!(outcome.success_count + outcome.failure_count, trial_count);
            prop_assert!((0.0..=1.0).contains(&outcome.success_rate));
            prop_assert_eq!(outcome.success_months.len() as u32, outcome.success_count);
            prop_assert!(outcome.success_months.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(outcome.success_months.iter().all(|&m| m <= max_months));
            prop_assert!(outcome.average_months.is_finite());

            if let Some(rep) = &outcome.representative {
                let best = rep.best.months_to_target.unwrap();
                let median = rep.median.months_to_target.unwrap();
                let worst = rep.worst.months_to_target.unwrap();
                prop_assert!(best <= median && median <= worst);
            } else {
                prop_assert_eq!(outcome.success_count, 0);
            }
        }
    }
}
