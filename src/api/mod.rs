use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    AccountType, AdvancedSettings, CompoundingFrequency, InvestmentSettings, ProjectionResult,
    RiskTolerance, SamplingMethod, ValidationError, project, project_with_rng,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCompounding {
    Daily,
    Monthly,
    Quarterly,
    Annually,
    Continuous,
}

impl From<CliCompounding> for CompoundingFrequency {
    fn from(value: CliCompounding) -> Self {
        match value {
            CliCompounding::Daily => CompoundingFrequency::Daily,
            CliCompounding::Monthly => CompoundingFrequency::Monthly,
            CliCompounding::Quarterly => CompoundingFrequency::Quarterly,
            CliCompounding::Annually => CompoundingFrequency::Annually,
            CliCompounding::Continuous => CompoundingFrequency::Continuous,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliAccountType {
    Taxable,
    #[value(alias = "401k", alias = "ira")]
    TaxDeferred,
    #[value(alias = "roth-ira")]
    TaxFree,
}

impl From<CliAccountType> for AccountType {
    fn from(value: CliAccountType) -> Self {
        match value {
            CliAccountType::Taxable => AccountType::Taxable,
            CliAccountType::TaxDeferred => AccountType::TaxDeferred,
            CliAccountType::TaxFree => AccountType::TaxFree,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl From<CliRiskTolerance> for RiskTolerance {
    fn from(value: CliRiskTolerance) -> Self {
        match value {
            CliRiskTolerance::Conservative => RiskTolerance::Conservative,
            CliRiskTolerance::Moderate => RiskTolerance::Moderate,
            CliRiskTolerance::Aggressive => RiskTolerance::Aggressive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliSamplingMethod {
    Uniform,
    Gaussian,
}

impl From<CliSamplingMethod> for SamplingMethod {
    fn from(value: CliSamplingMethod) -> Self {
        match value {
            CliSamplingMethod::Uniform => SamplingMethod::UniformPerturbation,
            CliSamplingMethod::Gaussian => SamplingMethod::Gaussian,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCompounding {
    Daily,
    Monthly,
    Quarterly,
    #[serde(alias = "yearly", alias = "annual")]
    Annually,
    Continuous,
}

impl From<ApiCompounding> for CliCompounding {
    fn from(value: ApiCompounding) -> Self {
        match value {
            ApiCompounding::Daily => CliCompounding::Daily,
            ApiCompounding::Monthly => CliCompounding::Monthly,
            ApiCompounding::Quarterly => CliCompounding::Quarterly,
            ApiCompounding::Annually => CliCompounding::Annually,
            ApiCompounding::Continuous => CliCompounding::Continuous,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiAccountType {
    Taxable,
    #[serde(
        alias = "taxDeferred",
        alias = "tax_deferred",
        alias = "401k",
        alias = "ira"
    )]
    TaxDeferred,
    #[serde(
        alias = "taxFree",
        alias = "tax_free",
        alias = "roth-ira",
        alias = "roth_ira",
        alias = "rothIra"
    )]
    TaxFree,
}

impl From<ApiAccountType> for CliAccountType {
    fn from(value: ApiAccountType) -> Self {
        match value {
            ApiAccountType::Taxable => CliAccountType::Taxable,
            ApiAccountType::TaxDeferred => CliAccountType::TaxDeferred,
            ApiAccountType::TaxFree => CliAccountType::TaxFree,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl From<ApiRiskTolerance> for CliRiskTolerance {
    fn from(value: ApiRiskTolerance) -> Self {
        match value {
            ApiRiskTolerance::Conservative => CliRiskTolerance::Conservative,
            ApiRiskTolerance::Moderate => CliRiskTolerance::Moderate,
            ApiRiskTolerance::Aggressive => CliRiskTolerance::Aggressive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiSamplingMethod {
    #[serde(alias = "uniformPerturbation", alias = "uniform_perturbation")]
    Uniform,
    #[serde(alias = "normal")]
    Gaussian,
}

impl From<ApiSamplingMethod> for CliSamplingMethod {
    fn from(value: ApiSamplingMethod) -> Self {
        match value {
            ApiSamplingMethod::Uniform => CliSamplingMethod::Uniform,
            ApiSamplingMethod::Gaussian => CliSamplingMethod::Gaussian,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    initial_amount: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_interest_rate: Option<f64>,
    compounding_frequency: Option<ApiCompounding>,
    investment_period_years: Option<u32>,
    inflation_rate: Option<f64>,
    tax_rate: Option<f64>,
    account_type: Option<ApiAccountType>,

    contribution_growth_rate: Option<f64>,
    risk_tolerance: Option<ApiRiskTolerance>,
    sampling_method: Option<ApiSamplingMethod>,
    goal_amount: Option<f64>,
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "compound",
    bin_name = "compound project",
    about = "Compound growth projection with inflation, tax, goal and Monte Carlo analysis",
    allow_negative_numbers = true
)]
struct Cli {
    #[arg(long, default_value_t = 0.0)]
    initial_amount: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_contribution: f64,
    #[arg(long, help = "Nominal annual interest rate in percent, e.g. 7")]
    annual_interest_rate: f64,
    #[arg(long, value_enum, default_value_t = CliCompounding::Monthly)]
    compounding_frequency: CliCompounding,
    #[arg(long, help = "Whole years to project, 1 to 100")]
    investment_period_years: u32,
    #[arg(
        long,
        default_value_t = 2.5,
        help = "Expected annual inflation in percent"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 22.0,
        help = "Marginal tax rate in percent applied per account type"
    )]
    tax_rate: f64,
    #[arg(long, value_enum, default_value_t = CliAccountType::Taxable)]
    account_type: CliAccountType,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual contribution escalation in percent (recorded, not applied)"
    )]
    contribution_growth_rate: f64,
    #[arg(
        long,
        value_enum,
        help = "Risk profile for the Monte Carlo retirement analysis; omit to skip it"
    )]
    risk_tolerance: Option<CliRiskTolerance>,
    #[arg(
        long,
        value_enum,
        default_value_t = CliSamplingMethod::Uniform,
        help = "Annual return sampling for the Monte Carlo analysis"
    )]
    sampling_method: CliSamplingMethod,
    #[arg(long, help = "Target balance for goal and success-probability analysis")]
    goal_amount: Option<f64>,
    #[arg(long)]
    current_age: Option<u32>,
    #[arg(long)]
    retirement_age: Option<u32>,
    #[arg(long, help = "Seed for the Monte Carlo random source; random when omitted")]
    seed: Option<u64>,
}

#[derive(Debug, Clone)]
struct ProjectionRequest {
    settings: InvestmentSettings,
    advanced: AdvancedSettings,
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct FieldErrorBody {
    field: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldErrorBody>,
}

impl From<&ValidationError> for ErrorResponse {
    fn from(err: &ValidationError) -> Self {
        Self {
            error: err.to_string(),
            fields: err
                .errors
                .iter()
                .map(|e| FieldErrorBody {
                    field: e.field(),
                    message: e.to_string(),
                })
                .collect(),
        }
    }
}

fn build_request(cli: Cli) -> ProjectionRequest {
    ProjectionRequest {
        settings: InvestmentSettings {
            initial_amount: cli.initial_amount,
            monthly_contribution: cli.monthly_contribution,
            annual_interest_rate: cli.annual_interest_rate,
            compounding_frequency: cli.compounding_frequency.into(),
            investment_period_years: cli.investment_period_years,
            inflation_rate: cli.inflation_rate,
            tax_rate: cli.tax_rate,
            account_type: cli.account_type.into(),
        },
        advanced: AdvancedSettings {
            contribution_growth_rate: cli.contribution_growth_rate,
            risk_tolerance: cli.risk_tolerance.map(Into::into),
            sampling_method: cli.sampling_method.into(),
            goal_amount: cli.goal_amount,
            current_age: cli.current_age,
            retirement_age: cli.retirement_age,
        },
        seed: cli.seed,
    }
}

fn run_request(request: &ProjectionRequest) -> Result<ProjectionResult, ValidationError> {
    match request.seed {
        Some(seed) => project_with_rng(
            &request.settings,
            &request.advanced,
            &mut StdRng::seed_from_u64(seed),
        ),
        None => project(&request.settings, &request.advanced),
    }
}

/// Parses `compound project ...` arguments and returns the projection as
/// pretty-printed JSON.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let request = build_request(cli);
    let result = run_request(&request).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&result).map_err(|e| format!("Failed to encode result: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "projection HTTP API listening");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = request_from_payload(payload);

    let outcome = tokio::task::spawn_blocking(move || run_request(&request)).await;
    match outcome {
        Ok(Ok(result)) => json_response(StatusCode::OK, result),
        Ok(Err(err)) => {
            warn!(error = %err, "rejected projection request");
            json_response(StatusCode::BAD_REQUEST, ErrorResponse::from(&err))
        }
        Err(join_err) => {
            warn!(error = %join_err, "projection task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Projection failed")
        }
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
            fields: Vec::new(),
        },
    )
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<ProjectionRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(request_from_payload(payload))
}

fn request_from_payload(payload: ProjectPayload) -> ProjectionRequest {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_amount {
        cli.initial_amount = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_interest_rate {
        cli.annual_interest_rate = v;
    }
    if let Some(v) = payload.compounding_frequency {
        cli.compounding_frequency = v.into();
    }
    if let Some(v) = payload.investment_period_years {
        cli.investment_period_years = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.tax_rate {
        cli.tax_rate = v;
    }
    if let Some(v) = payload.account_type {
        cli.account_type = v.into();
    }

    if let Some(v) = payload.contribution_growth_rate {
        cli.contribution_growth_rate = v;
    }
    if let Some(v) = payload.risk_tolerance {
        cli.risk_tolerance = Some(v.into());
    }
    if let Some(v) = payload.sampling_method {
        cli.sampling_method = v.into();
    }
    if let Some(v) = payload.goal_amount {
        cli.goal_amount = Some(v);
    }
    if let Some(v) = payload.current_age {
        cli.current_age = Some(v);
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = Some(v);
    }
    if let Some(v) = payload.seed {
        cli.seed = Some(v);
    }

    build_request(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_amount: 10_000.0,
        monthly_contribution: 500.0,
        annual_interest_rate: 7.0,
        compounding_frequency: CliCompounding::Monthly,
        investment_period_years: 30,
        inflation_rate: 2.5,
        tax_rate: 22.0,
        account_type: CliAccountType::Taxable,
        contribution_growth_rate: 0.0,
        risk_tolerance: Some(CliRiskTolerance::Moderate),
        sampling_method: CliSamplingMethod::Uniform,
        goal_amount: None,
        current_age: None,
        retirement_age: None,
        seed: None,
    }
}
