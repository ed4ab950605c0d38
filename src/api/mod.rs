use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    AccumulationOutcome, DecumulationOutcome, PlanParameters, accumulate, decumulate,
    months_to_target, required_return_rate, target_assets,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPhase {
    #[serde(alias = "accumulation")]
    Accumulate,
    #[serde(alias = "decumulation")]
    Decumulate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ResponsePhase {
    Accumulate,
    Decumulate,
}

impl From<ApiPhase> for ResponsePhase {
    fn from(value: ApiPhase) -> Self {
        match value {
            ApiPhase::Accumulate => ResponsePhase::Accumulate,
            ApiPhase::Decumulate => ResponsePhase::Decumulate,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    current_assets: Option<f64>,
    monthly_contribution: Option<f64>,
    desired_monthly_withdrawal: Option<f64>,
    pre_return_mean: Option<f64>,
    pre_return_vol: Option<f64>,
    post_return_mean: Option<f64>,
    post_return_vol: Option<f64>,
    post_horizon_years: Option<u32>,
    simulations: Option<u32>,
    max_accumulation_months: Option<u32>,
    seed: Option<u64>,
    track_paths: Option<bool>,
    phase: Option<ApiPhase>,
}

#[derive(Parser, Debug)]
#[command(
    name = "glidepath",
    about = "Monte Carlo retirement glide-path estimator (accumulation + decumulation)"
)]
struct Cli {
    #[arg(long, default_value_t = 0.0, help = "Current investable assets")]
    current_assets: f64,
    #[arg(
        long,
        default_value_t = 1_000_000.0,
        help = "Fixed monthly contribution while accumulating"
    )]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 3_000_000.0,
        help = "Desired monthly withdrawal once the target is reached"
    )]
    desired_monthly_withdrawal: f64,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Expected annual return before the target is reached, in percent"
    )]
    pre_return_mean: f64,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Annual return volatility before the target is reached, in percent"
    )]
    pre_return_volatility: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Expected annual return after the target is reached, in percent"
    )]
    post_return_mean: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Annual return volatility after the target is reached, in percent"
    )]
    post_return_volatility: f64,
    #[arg(
        long,
        default_value_t = 40,
        help = "Years the nest egg must fund after the target is reached"
    )]
    post_horizon_years: u32,
    #[arg(long, default_value_t = 10_000)]
    simulations: u32,
    #[arg(
        long,
        default_value_t = 1_200,
        help = "Accumulation month cap; reaching it marks a trial as failed"
    )]
    max_accumulation_months: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, help = "Materialize representative monthly paths for charting")]
    track_paths: bool,
}

#[derive(Debug)]
struct ApiRequest {
    params: PlanParameters,
    phase: ApiPhase,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    phase: ResponsePhase,
    target_assets: f64,
    required_return_rate: f64,
    baseline_months_to_target: u32,
    accumulation: Option<AccumulationOutcome>,
    decumulation: Option<DecumulationOutcome>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_params(cli: Cli) -> Result<PlanParameters, String> {
    if !cli.current_assets.is_finite() || cli.current_assets < 0.0 {
        return Err("--current-assets must be >= 0".to_string());
    }

    if !cli.monthly_contribution.is_finite() || cli.monthly_contribution < 0.0 {
        return Err("--monthly-contribution must be >= 0".to_string());
    }

    if !cli.desired_monthly_withdrawal.is_finite() || cli.desired_monthly_withdrawal <= 0.0 {
        return Err("--desired-monthly-withdrawal must be > 0".to_string());
    }

    for (name, mean) in [
        ("--pre-return-mean", cli.pre_return_mean),
        ("--post-return-mean", cli.post_return_mean),
    ] {
        if !mean.is_finite() || mean <= -100.0 {
            return Err(format!("{name} must be > -100"));
        }
    }

    for (name, vol) in [
        ("--pre-return-volatility", cli.pre_return_volatility),
        ("--post-return-volatility", cli.post_return_volatility),
    ] {
        if !vol.is_finite() || !(0.0..=100.0).contains(&vol) {
            return Err(format!("{name} must be between 0 and 100"));
        }
    }

    if cli.post_horizon_years == 0 {
        return Err("--post-horizon-years must be > 0".to_string());
    }

    if cli.simulations == 0 {
        return Err("--simulations must be > 0".to_string());
    }

    if cli.max_accumulation_months == 0 {
        return Err("--max-accumulation-months must be > 0".to_string());
    }

    Ok(PlanParameters {
        current_assets: cli.current_assets,
        monthly_contribution: cli.monthly_contribution,
        desired_monthly_withdrawal: cli.desired_monthly_withdrawal,
        mean_annual_return_pre: cli.pre_return_mean,
        mean_annual_return_post: cli.post_return_mean,
        annual_volatility_pre: cli.pre_return_volatility,
        annual_volatility_post: cli.post_return_volatility,
        horizon_years_post: cli.post_horizon_years,
        trial_count: cli.simulations,
        max_months_accumulation: cli.max_accumulation_months,
        track_paths: cli.track_paths,
        seed: cli.seed,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("glidepath HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let response = build_simulate_response(&request.params, request.phase);
    json_response(StatusCode::OK, response)
}

fn build_simulate_response(params: &PlanParameters, phase: ApiPhase) -> SimulateResponse {
    let target = target_assets(
        params.desired_monthly_withdrawal,
        params.mean_annual_return_post,
    );
    let baseline_months = months_to_target(
        params.current_assets,
        target,
        params.monthly_contribution,
        params.mean_annual_return_pre,
        params.max_months_accumulation,
    );

    let (accumulation, decumulation) = match phase {
        ApiPhase::Accumulate => (Some(accumulate(params)), None),
        ApiPhase::Decumulate => (None, Some(decumulate(params, None))),
    };

    SimulateResponse {
        phase: phase.into(),
        target_assets: target,
        required_return_rate: required_return_rate(
            params.current_assets,
            params.desired_monthly_withdrawal,
        ),
        baseline_months_to_target: baseline_months,
        accumulation,
        decumulation,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();
    let mut phase = ApiPhase::Accumulate;

    if let Some(v) = payload.current_assets {
        cli.current_assets = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.desired_monthly_withdrawal {
        cli.desired_monthly_withdrawal = v;
    }
    if let Some(v) = payload.pre_return_mean {
        cli.pre_return_mean = v;
    }
    if let Some(v) = payload.pre_return_vol {
        cli.pre_return_volatility = v;
    }
    if let Some(v) = payload.post_return_mean {
        cli.post_return_mean = v;
    }
    if let Some(v) = payload.post_return_vol {
        cli.post_return_volatility = v;
    }
    if let Some(v) = payload.post_horizon_years {
        cli.post_horizon_years = v;
    }
    if let Some(v) = payload.simulations {
        cli.simulations = v;
    }
    if let Some(v) = payload.max_accumulation_months {
        cli.max_accumulation_months = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }
    if let Some(v) = payload.track_paths {
        cli.track_paths = v;
    }
    if let Some(v) = payload.phase {
        phase = v;
    }

    let params = build_params(cli)?;
    Ok(ApiRequest { params, phase })
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_assets: 0.0,
        monthly_contribution: 1_000_000.0,
        desired_monthly_withdrawal: 3_000_000.0,
        pre_return_mean: 6.0,
        pre_return_volatility: 12.0,
        post_return_mean: 4.0,
        post_return_volatility: 10.0,
        post_horizon_years: 40,
        simulations: 10_000,
        max_accumulation_months: 1_200,
        seed: 42,
        track_paths: false,
    }
}
