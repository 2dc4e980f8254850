use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    CalculatorInput, FieldErrors, FundType, ProjectionResult, ProjectionYear, RawCalculatorInput,
    SolveConfig, SolveResult, project, solve_required_contribution, validate,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const SOLVE_SEARCH_MIN: f64 = 0.0;
const SOLVE_SEARCH_MAX: f64 = 50_000.0;
const SOLVE_TOLERANCE: f64 = 0.01;
const SOLVE_MAX_ITERATIONS: u32 = 64;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFundType {
    #[value(name = "0", alias = "capital-preservation")]
    CapitalPreservation,
    #[value(name = "1", alias = "conservative")]
    Conservative,
    #[value(name = "2", alias = "balanced")]
    Balanced,
    #[value(name = "3", alias = "growth")]
    Growth,
}

impl From<CliFundType> for FundType {
    fn from(value: CliFundType) -> Self {
        match value {
            CliFundType::CapitalPreservation => FundType::CapitalPreservation,
            CliFundType::Conservative => FundType::Conservative,
            CliFundType::Balanced => FundType::Balanced,
            CliFundType::Growth => FundType::Growth,
        }
    }
}

/// Form values arrive as strings from the web form and as bare numbers from
/// JSON clients; both are funneled into the raw string shape the validator
/// coerces.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FormValue {
    Text(String),
    Number(f64),
}

impl FormValue {
    fn into_text(self) -> String {
        match self {
            FormValue::Text(text) => text,
            FormValue::Number(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    age: Option<FormValue>,
    salary: Option<FormValue>,
    monthly_contribution: Option<FormValue>,
    fund_type: Option<FormValue>,
    years_to_retirement: Option<FormValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SolvePayload {
    age: Option<FormValue>,
    salary: Option<FormValue>,
    monthly_contribution: Option<FormValue>,
    fund_type: Option<FormValue>,
    years_to_retirement: Option<FormValue>,
    target_balance: Option<FormValue>,
}

impl SolvePayload {
    fn calculator_fields(self) -> (CalculatePayload, Option<FormValue>) {
        (
            CalculatePayload {
                age: self.age,
                salary: self.salary,
                monthly_contribution: self.monthly_contribution,
                fund_type: self.fund_type,
                years_to_retirement: self.years_to_retirement,
            },
            self.target_balance,
        )
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "afp",
    about = "AFP pension projection calculator (fund growth profiles + contribution goal solver)"
)]
struct Cli {
    #[arg(long, help = "Affiliate age in years (18-65)")]
    age: u32,
    #[arg(long, help = "Gross monthly salary in soles (minimum wage floor 930)")]
    salary: f64,
    #[arg(long, help = "Voluntary monthly contribution in soles")]
    monthly_contribution: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliFundType::Balanced,
        help = "Fund risk profile: 0 (capital preservation) to 3 (growth)"
    )]
    fund_type: CliFundType,
    #[arg(long, help = "Years until planned retirement (1-47)")]
    years_to_retirement: u32,
    #[arg(
        long,
        help = "Solve for the monthly contribution needed to reach this final balance"
    )]
    target_balance: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    fund_type: &'static str,
    fund_label: &'static str,
    annual_growth_rate: f64,
    total_contributions: f64,
    total_growth: f64,
    final_balance: f64,
    projection_by_year: Vec<ProjectionYear>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveResponse {
    fund_type: &'static str,
    fund_label: &'static str,
    annual_growth_rate: f64,
    target_balance: f64,
    solved_monthly_contribution: Option<f64>,
    achieved_balance: Option<f64>,
    iterations_used: u32,
    converged: bool,
    feasible: bool,
    message: String,
}

#[derive(Debug, Serialize)]
struct ValidationErrorResponse {
    errors: FieldErrors,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
enum SolveRejection {
    Invalid(FieldErrors),
    Config(String),
}

fn raw_calculator_input(payload: CalculatePayload) -> RawCalculatorInput {
    RawCalculatorInput {
        age: payload.age.map(FormValue::into_text),
        salary: payload.salary.map(FormValue::into_text),
        monthly_contribution: payload.monthly_contribution.map(FormValue::into_text),
        fund_type: payload.fund_type.map(FormValue::into_text),
        years_to_retirement: payload.years_to_retirement.map(FormValue::into_text),
    }
}

fn calculate_outcome(payload: CalculatePayload) -> Result<CalculateResponse, FieldErrors> {
    let raw = raw_calculator_input(payload);
    let input = validate(&raw)?;
    Ok(build_calculate_response(&input, project(&input)))
}

fn solve_outcome(payload: SolvePayload) -> Result<SolveResponse, SolveRejection> {
    let (calculator, target_balance) = payload.calculator_fields();
    let raw = raw_calculator_input(calculator);
    let target = parse_target_balance(target_balance);

    let (input, target_balance) = match (validate(&raw), target) {
        (Ok(input), Ok(target_balance)) => (input, target_balance),
        (validated, target) => {
            let mut errors = validated.err().unwrap_or_default();
            if let Err(message) = target {
                errors.push("targetBalance", message);
            }
            return Err(SolveRejection::Invalid(errors));
        }
    };

    let result = solve_required_contribution(&input, default_solve_config(target_balance))
        .map_err(SolveRejection::Config)?;
    Ok(build_solve_response(&input, &result))
}

fn parse_target_balance(value: Option<FormValue>) -> Result<f64, &'static str> {
    let text = value.map(FormValue::into_text);
    let Some(text) = text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Err("target balance is required");
    };
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        Ok(value) if value.is_finite() => Err("target balance must be greater than 0"),
        _ => Err("target balance must be a number"),
    }
}

fn default_solve_config(target_balance: f64) -> SolveConfig {
    SolveConfig {
        target_balance,
        search_min: SOLVE_SEARCH_MIN,
        search_max: SOLVE_SEARCH_MAX,
        tolerance: SOLVE_TOLERANCE,
        max_iterations: SOLVE_MAX_ITERATIONS,
    }
}

fn build_calculate_response(
    input: &CalculatorInput,
    result: ProjectionResult,
) -> CalculateResponse {
    let profile = input.fund_type.profile();
    CalculateResponse {
        fund_type: profile.code,
        fund_label: profile.label,
        annual_growth_rate: profile.annual_growth_rate,
        total_contributions: result.total_contributions,
        total_growth: result.total_growth,
        final_balance: result.final_balance,
        projection_by_year: result.projection_by_year,
    }
}

fn build_solve_response(input: &CalculatorInput, result: &SolveResult) -> SolveResponse {
    let profile = input.fund_type.profile();
    SolveResponse {
        fund_type: profile.code,
        fund_label: profile.label,
        annual_growth_rate: profile.annual_growth_rate,
        target_balance: result.target_balance,
        solved_monthly_contribution: result.solved_monthly_contribution,
        achieved_balance: result.achieved_balance,
        iterations_used: result.iterations.len() as u32,
        converged: result.converged,
        feasible: result.feasible,
        message: result.message.clone(),
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/solve", post(solve_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("AFP calculator listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

/// One-shot projection (or goal solve, with `--target-balance`) printed as
/// JSON, for scripting against the same engine the server runs.
pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let input = build_input(&cli)?;

    let json = if let Some(target_balance) = cli.target_balance {
        let result = solve_required_contribution(&input, default_solve_config(target_balance))?;
        to_pretty_json(&build_solve_response(&input, &result))?
    } else {
        to_pretty_json(&build_calculate_response(&input, project(&input)))?
    };
    println!("{json}");
    Ok(())
}

fn build_input(cli: &Cli) -> Result<CalculatorInput, String> {
    CalculatorInput::new(
        cli.age,
        cli.salary,
        cli.monthly_contribution,
        cli.fund_type.into(),
        cli.years_to_retirement,
    )
    .map_err(|errors| format!("invalid inputs: {errors}"))
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode result: {e}"))
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

async fn solve_post_handler(Json(payload): Json<SolvePayload>) -> Response {
    match solve_outcome(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(SolveRejection::Invalid(errors)) => validation_error_response(errors),
        Err(SolveRejection::Config(msg)) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    match calculate_outcome(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(errors) => validation_error_response(errors),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn validation_error_response(errors: FieldErrors) -> Response {
    json_response(StatusCode::BAD_REQUEST, ValidationErrorResponse { errors })
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
