use super::percentile::{percentile, representative_index};
use super::random::{MonthlyReturnModel, Rng, derive_seed};
use super::target::target_assets;
use super::types::{DecumulationOutcome, DecumulationTrial, PlanParameters, RepresentativePaths};

const DECUMULATION_STREAM: u32 = 1;

/// Coarse progress granularity: one callback per this many completed trials,
/// plus one on the final trial.
const PROGRESS_INTERVAL: u32 = 200;

/// Decumulation phase over a whole plan: the starting balance is the target
/// figure derived from the same desired-income/return inputs.
pub fn decumulate(
    params: &PlanParameters,
    progress: Option<&mut dyn FnMut(u32)>,
) -> DecumulationOutcome {
    let initial = target_assets(
        params.desired_monthly_withdrawal,
        params.mean_annual_return_post,
    );
    simulate_decumulation(
        initial,
        params.desired_monthly_withdrawal,
        params.mean_annual_return_post,
        params.annual_volatility_post,
        params.horizon_years_post,
        params.trial_count,
        params.seed,
        progress,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn simulate_decumulation(
    initial_asset: f64,
    monthly_withdrawal: f64,
    annual_return_pct: f64,
    volatility_pct: f64,
    years: u32,
    trial_count: u32,
    seed: u64,
    mut progress: Option<&mut dyn FnMut(u32)>,
) -> DecumulationOutcome {
    let model = MonthlyReturnModel::from_annual_pct(annual_return_pct, volatility_pct);

    let mut trials = Vec::with_capacity(trial_count as usize);
    for trial_id in 0..trial_count {
        let mut rng = Rng::new(derive_seed(seed, DECUMULATION_STREAM, trial_id));
        trials.push(run_trial(
            initial_asset,
            monthly_withdrawal,
            model,
            years,
            &mut rng,
        ));

        let completed = trial_id + 1;
        if completed % PROGRESS_INTERVAL == 0 || completed == trial_count {
            if let Some(report) = progress.as_mut() {
                report(completed);
            }
        }
    }

    // Baseline path at the same mean with the randomness switched off.
    let mut baseline_rng = Rng::new(derive_seed(seed, DECUMULATION_STREAM, trial_count));
    let deterministic = run_trial(
        initial_asset,
        monthly_withdrawal,
        model.zero_volatility(),
        years,
        &mut baseline_rng,
    );

    let mut depletion_years: Vec<u32> = trials.iter().filter_map(|t| t.depletion_year).collect();
    depletion_years.sort_unstable();

    let depleted_count = depletion_years.len() as u32;
    let depletion_probability = if trial_count == 0 {
        0.0
    } else {
        depleted_count as f64 / trial_count as f64
    };

    let mut year_values: Vec<f64> = depletion_years.iter().map(|&y| y as f64).collect();
    let mut final_balances: Vec<f64> = trials.iter().map(|t| t.final_balance).collect();

    let representative = select_representative(&trials);

    DecumulationOutcome {
        trial_count,
        depleted_count,
        depletion_probability,
        initial_assets: initial_asset,
        median_depletion_year: percentile(&mut year_values, 50.0),
        median_final_balance: percentile(&mut final_balances, 50.0),
        p10_final_balance: percentile(&mut final_balances, 10.0),
        depletion_years,
        deterministic,
        representative,
    }
}

fn run_trial(
    initial_asset: f64,
    monthly_withdrawal: f64,
    model: MonthlyReturnModel,
    years: u32,
    rng: &mut Rng,
) -> DecumulationTrial {
    let mut balance = initial_asset;
    let mut depletion_year = None;
    let mut yearly_balances = Vec::with_capacity(years as usize);

    for year in 0..years {
        for _ in 0..12 {
            balance *= model.sample_growth_factor(rng);
            // Withdrawal at month end, after growth.
            balance -= monthly_withdrawal;
            if balance <= 0.0 {
                // Negative only long enough to notice; the first hit sticks.
                if depletion_year.is_none() {
                    depletion_year = Some(year);
                }
                balance = 0.0;
            }
        }
        yearly_balances.push(balance.max(0.0));
    }

    DecumulationTrial {
        depletion_year,
        final_balance: balance.max(0.0),
        yearly_balances,
    }
}

/// Representative paths sorted by final-year balance descending. This sort
/// key differs from the accumulation side's month-count sort: coming out of
/// retirement, "best" means the most money left.
fn select_representative(
    trials: &[DecumulationTrial],
) -> Option<RepresentativePaths<DecumulationTrial>> {
    if trials.is_empty() {
        return None;
    }

    let mut order: Vec<usize> = (0..trials.len()).collect();
    order.sort_by(|&a, &b| trials[b].final_balance.total_cmp(&trials[a].final_balance));

    let pick = |p: f64| trials[order[representative_index(order.len(), p)]].clone();
    Some(RepresentativePaths {
        best: pick(0.1),
        median: pick(0.5),
        worst: pick(0.9),
    })
}
