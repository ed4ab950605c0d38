use serde::Serialize;

#[derive(Debug, Clone)]
pub struct PlanParameters {
    pub current_assets: f64,
    pub monthly_contribution: f64,
    pub desired_monthly_withdrawal: f64,
    pub mean_annual_return_pre: f64,
    pub mean_annual_return_post: f64,
    pub annual_volatility_pre: f64,
    pub annual_volatility_post: f64,
    pub horizon_years_post: u32,
    pub trial_count: u32,
    pub max_months_accumulation: u32,
    pub track_paths: bool,
    pub seed: u64,
}

impl Default for PlanParameters {
    fn default() -> Self {
        Self {
            current_assets: 0.0,
            monthly_contribution: 0.0,
            desired_monthly_withdrawal: 0.0,
            mean_annual_return_pre: 6.0,
            mean_annual_return_post: 4.0,
            annual_volatility_pre: 12.0,
            annual_volatility_post: 10.0,
            horizon_years_post: 40,
            trial_count: 10_000,
            max_months_accumulation: 1_200,
            track_paths: false,
            seed: 42,
        }
    }
}

/// One accumulation trial. `months_to_target` is None when the trial failed,
/// either by balance collapse or by exhausting the month cap.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulationTrial {
    pub months_to_target: Option<u32>,
    pub monthly_balances: Vec<f64>,
}

/// One decumulation trial. `depletion_year` is the 0-based index of the first
/// year the running balance reached zero or below; yearly snapshots are
/// clamped to >= 0 for charting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecumulationTrial {
    pub depletion_year: Option<u32>,
    pub yearly_balances: Vec<f64>,
    pub final_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentativePaths<T> {
    pub best: T,
    pub median: T,
    pub worst: T,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulationOutcome {
    pub trial_count: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub success_rate: f64,
    pub target_assets: f64,
    /// Month counts of all successful trials, ascending.
    pub success_months: Vec<u32>,
    pub average_months: f64,
    pub median_months: f64,
    pub p10_months: f64,
    pub p90_months: f64,
    pub representative: Option<RepresentativePaths<AccumulationTrial>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecumulationOutcome {
    pub trial_count: u32,
    pub depleted_count: u32,
    pub depletion_probability: f64,
    pub initial_assets: f64,
    /// Depletion years (0-based) of all depleted trials, ascending.
    pub depletion_years: Vec<u32>,
    pub median_depletion_year: f64,
    pub median_final_balance: f64,
    pub p10_final_balance: f64,
    pub deterministic: DecumulationTrial,
    pub representative: Option<RepresentativePaths<DecumulationTrial>>,
}
