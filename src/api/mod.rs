mod error;
mod format;
mod report;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    FinancingInputs, Forecast, PayoffOutcome, UnboundedReason, YearlyScheduleRow, run_forecast,
};

pub use error::ForecastError;
pub use format::{format_duration, format_euro};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

pub const DEFAULT_PORT: u16 = 8080;

const DEFAULT_PURCHASE_PRICE: f64 = 400_000.0;
const DEFAULT_EQUITY: f64 = 80_000.0;
const DEFAULT_ANCILLARY_PERCENT: f64 = 10.0;
const DEFAULT_INTEREST_RATE: f64 = 3.5;
const DEFAULT_REPAYMENT_RATE: f64 = 2.0;
const DEFAULT_FIXED_YEARS: u32 = 10;
const DEFAULT_EXTRA_REPAYMENT: f64 = 0.0;

const NOT_PAYABLE_TEXT: &str = "Not payable (payment too small)";

#[derive(Parser, Debug)]
#[command(
    name = "mortgage-forecast",
    about = "Mortgage amortization forecast (annuity loan with optional annual extra repayment)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the web calculator and the JSON API.
    Serve {
        #[arg(default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Print a single forecast and its yearly schedule.
    Forecast(ForecastArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    #[arg(long, default_value_t = DEFAULT_PURCHASE_PRICE)]
    purchase_price: f64,
    #[arg(long, default_value_t = DEFAULT_EQUITY)]
    equity: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_ANCILLARY_PERCENT,
        help = "Ancillary purchase costs in percent of the purchase price"
    )]
    ancillary_percent: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_INTEREST_RATE,
        help = "Nominal annual interest rate in percent, e.g. 3.5"
    )]
    interest_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_REPAYMENT_RATE,
        help = "Initial annual repayment rate in percent"
    )]
    repayment_rate: f64,
    #[arg(long, default_value_t = DEFAULT_FIXED_YEARS, help = "Fixed-rate period in years")]
    fixed_years: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_EXTRA_REPAYMENT,
        help = "Extra repayment applied at the end of every loan year"
    )]
    extra_repayment: f64,
    #[arg(long, help = "Print the API JSON instead of the text report")]
    json: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ForecastPayload {
    purchase_price: Option<f64>,
    equity: Option<f64>,
    ancillary_percent: Option<f64>,
    interest_rate: Option<f64>,
    repayment_rate: Option<f64>,
    fixed_years: Option<u32>,
    extra_repayment: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayoffResponse {
    payable: bool,
    total_months: Option<u32>,
    total_interest: Option<f64>,
    duration_text: String,
    reason: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForecastResponse<'a> {
    inputs: &'a FinancingInputs,
    ancillary_costs: f64,
    principal: f64,
    monthly_payment: f64,
    remaining_balance: f64,
    payoff: PayoffResponse,
    total_repayment: Option<f64>,
    schedule_rows: &'a [YearlyScheduleRow],
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(args: &ForecastArgs) -> Result<FinancingInputs, ForecastError> {
    for (field, value) in [
        ("purchasePrice", args.purchase_price),
        ("equity", args.equity),
        ("ancillaryPercent", args.ancillary_percent),
        ("interestRate", args.interest_rate),
        ("repaymentRate", args.repayment_rate),
        ("extraRepayment", args.extra_repayment),
    ] {
        if !value.is_finite() {
            return Err(ForecastError::NonFiniteInput { field });
        }
    }

    Ok(FinancingInputs {
        purchase_price: args.purchase_price,
        equity: args.equity,
        ancillary_percent: args.ancillary_percent,
        annual_interest_rate: args.interest_rate,
        annual_repayment_rate: args.repayment_rate,
        fixed_period_years: args.fixed_years,
        annual_extra_repayment: args.extra_repayment,
    })
}

/// Runs the `forecast` subcommand and returns the text to print.
pub fn run_cli_forecast(args: &ForecastArgs) -> Result<String, ForecastError> {
    let inputs = build_inputs(args)?;
    let forecast = run_forecast(&inputs);
    if args.json {
        let json = serde_json::to_string_pretty(&build_forecast_response(&forecast))?;
        return Ok(json);
    }
    Ok(report::render_report(&forecast))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/forecast",
            get(forecast_get_handler).post(forecast_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "mortgage forecast HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
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

async fn forecast_get_handler(
    payload: Result<Query<ForecastPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => forecast_handler_impl(payload),
        Err(rejection) => bad_request(ForecastError::InvalidPayload(rejection.body_text())),
    }
}

async fn forecast_post_handler(
    payload: Result<Json<ForecastPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => forecast_handler_impl(payload),
        Err(rejection) => bad_request(ForecastError::InvalidPayload(rejection.body_text())),
    }
}

fn forecast_handler_impl(payload: ForecastPayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(err) => return bad_request(err),
    };

    debug!(?inputs, "running forecast");
    let forecast = run_forecast(&inputs);
    json_response(StatusCode::OK, build_forecast_response(&forecast))
}

fn bad_request(err: ForecastError) -> Response {
    warn!(error = %err, "rejected forecast request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
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
fn inputs_from_json(json: &str) -> Result<FinancingInputs, ForecastError> {
    let payload = serde_json::from_str::<ForecastPayload>(json)
        .map_err(|e| ForecastError::InvalidPayload(e.to_string()))?;
    inputs_from_payload(payload)
}

fn inputs_from_payload(payload: ForecastPayload) -> Result<FinancingInputs, ForecastError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.purchase_price {
        args.purchase_price = v;
    }
    if let Some(v) = payload.equity {
        args.equity = v;
    }
    if let Some(v) = payload.ancillary_percent {
        args.ancillary_percent = v;
    }
    if let Some(v) = payload.interest_rate {
        args.interest_rate = v;
    }
    if let Some(v) = payload.repayment_rate {
        args.repayment_rate = v;
    }
    if let Some(v) = payload.fixed_years {
        args.fixed_years = v;
    }
    if let Some(v) = payload.extra_repayment {
        args.extra_repayment = v;
    }

    build_inputs(&args)
}

fn default_args_for_api() -> ForecastArgs {
    ForecastArgs {
        purchase_price: DEFAULT_PURCHASE_PRICE,
        equity: DEFAULT_EQUITY,
        ancillary_percent: DEFAULT_ANCILLARY_PERCENT,
        interest_rate: DEFAULT_INTEREST_RATE,
        repayment_rate: DEFAULT_REPAYMENT_RATE,
        fixed_years: DEFAULT_FIXED_YEARS,
        extra_repayment: DEFAULT_EXTRA_REPAYMENT,
        json: false,
    }
}

fn build_payoff_response(payoff: PayoffOutcome) -> PayoffResponse {
    match payoff {
        PayoffOutcome::PaidOff {
            total_months,
            total_interest,
        } => PayoffResponse {
            payable: true,
            total_months: Some(total_months),
            total_interest: Some(total_interest),
            duration_text: format_duration(total_months),
            reason: None,
        },
        PayoffOutcome::Unbounded { reason } => PayoffResponse {
            payable: false,
            total_months: None,
            total_interest: None,
            duration_text: NOT_PAYABLE_TEXT.to_string(),
            reason: Some(match reason {
                UnboundedReason::NonAmortizing => "non-amortizing",
                UnboundedReason::HorizonExceeded => "horizon-exceeded",
            }),
        },
    }
}

fn build_forecast_response(forecast: &Forecast) -> ForecastResponse<'_> {
    ForecastResponse {
        inputs: &forecast.inputs,
        ancillary_costs: forecast.loan.ancillary_costs,
        principal: forecast.loan.principal,
        monthly_payment: forecast.monthly_payment,
        remaining_balance: forecast.remaining_balance,
        payoff: build_payoff_response(forecast.payoff),
        total_repayment: forecast.total_repayment,
        schedule_rows: &forecast.schedule,
    }
}
