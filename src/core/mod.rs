mod accumulate;
mod decumulate;
mod percentile;
mod random;
mod target;
mod types;

pub use accumulate::{accumulate, simulate_accumulation};
pub use decumulate::{decumulate, simulate_decumulation};
pub use target::{monthly_compound_rate, months_to_target, required_return_rate, target_assets};
pub use types::{
    AccumulationOutcome, AccumulationTrial, DecumulationOutcome, DecumulationTrial,
    PlanParameters, RepresentativePaths,
};
