/// Nest egg required to sustain `desired_monthly_withdrawal` forever at the
/// given post-retirement return rate. A non-positive rate falls back to 50x
/// the annual withdrawal instead of dividing by zero or a negative rate.
pub fn target_assets(desired_monthly_withdrawal: f64, post_return_rate_pct: f64) -> f64 {
    let annual = desired_monthly_withdrawal * 12.0;
    let rate = post_return_rate_pct / 100.0;
    if rate <= 0.0 { annual * 50.0 } else { annual / rate }
}

/// Annual return rate (percent) at which `current_assets` alone would fund
/// the desired withdrawal. Non-positive assets resolve to 0 rather than an
/// error.
pub fn required_return_rate(current_assets: f64, desired_monthly_withdrawal: f64) -> f64 {
    if current_assets <= 0.0 {
        return 0.0;
    }
    desired_monthly_withdrawal * 12.0 / current_assets * 100.0
}

/// Monthly compounding rate equivalent to an annual percent rate.
pub fn monthly_compound_rate(annual_return_rate_pct: f64) -> f64 {
    (1.0 + annual_return_rate_pct / 100.0).powf(1.0 / 12.0) - 1.0
}

/// Deterministic months until `target_assets` is reached: contribution first,
/// then fixed-rate growth, one month at a time. Stops at `max_months` even if
/// the target is never reached; the cap value itself signals "effectively
/// unreachable".
pub fn months_to_target(
    current_assets: f64,
    target_assets: f64,
    monthly_contribution: f64,
    annual_return_rate_pct: f64,
    max_months: u32,
) -> u32 {
    if current_assets >= target_assets {
        return 0;
    }

    let monthly_rate = monthly_compound_rate(annual_return_rate_pct);
    let mut balance = current_assets;
    let mut months = 0;
    while months < max_months {
        balance += monthly_contribution;
        balance *= 1.0 + monthly_rate;
        months += 1;
        if balance >= target_assets {
            break;
        }
    }
    months
}
