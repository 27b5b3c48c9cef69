use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Local, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

use arrivals_ops::arrivals::export::render_csv;
use arrivals_ops::arrivals::flight::FlightPayload;
use arrivals_ops::arrivals::manifest::{ManifestPayload, PassengerPayload};
use arrivals_ops::config::AppConfig;
use arrivals_ops::error::AppError;
use arrivals_ops::ports::port_config;
use arrivals_ops::routes::ops_router;
use arrivals_ops::store::OpsStore;
use arrivals_ops::telemetry;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Arrivals Operations Service",
    about = "Run the arrivals and staffing dashboard backend from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seeded walkthroughs for stakeholder demos and smoke checks
    Demo {
        #[command(subcommand)]
        command: DemoCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum DemoCommand {
    /// Render an arrivals export for a seeded sample flight
    Export(DemoExportArgs),
}

#[derive(Args, Debug)]
struct DemoExportArgs {
    /// Arrival date for the seeded flight (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Terminal to seed and export
    #[arg(long, default_value = "T1")]
    terminal: String,
    /// Include the privileged API-actual columns
    #[arg(long)]
    with_api_splits: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo {
            command: DemoCommand::Export(args),
        } => run_demo_export(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let store = Arc::new(OpsStore::new(port_config(&config.port_code)));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(ops_router(store))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, port = %config.port_code, "arrivals operations service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn run_demo_export(args: DemoExportArgs) -> Result<(), AppError> {
    let DemoExportArgs {
        date,
        terminal,
        with_api_splits,
    } = args;

    let config = AppConfig::load()?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let store = OpsStore::new(port_config(&config.port_code));

    store.submit_flight(FlightPayload {
        operator: "TestAir".to_string(),
        status: "On Chox".to_string(),
        estimated: format!("{date}T12:10:00Z"),
        actual: format!("{date}T12:12:00Z"),
        estimated_chocks: format!("{date}T12:16:00Z"),
        actual_chocks: format!("{date}T12:17:00Z"),
        gate: "46".to_string(),
        stand: "44R".to_string(),
        max_pax: Some(78),
        act_pax: Some(51),
        tran_pax: Some(0),
        airport_id: config.port_code.clone(),
        terminal: terminal.clone(),
        iata: "TS123".to_string(),
        icao: "TS123".to_string(),
        origin: "AMS".to_string(),
        scheduled: format!("{date}T12:00:00Z"),
        ..FlightPayload::default()
    })?;
    store.submit_manifest(sample_manifest(date, &config.port_code))?;

    let at = Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).expect("noon is always valid"));
    let rows = store.arrivals_rows(at, &terminal, 0, 24);
    let csv = render_csv(&rows, store.terminal_config(&terminal), with_api_splits)?;

    println!("Arrivals export demo");
    println!(
        "Port {} terminal {terminal}, {date} (API splits: {})",
        config.port_code,
        if with_api_splits { "shown" } else { "hidden" }
    );
    println!();
    println!("{csv}");

    Ok(())
}

fn sample_manifest(date: NaiveDate, arrival_port: &str) -> ManifestPayload {
    fn passenger(nationality: &str, eea_flag: &str, document_type: &str) -> PassengerPayload {
        PassengerPayload {
            document_issuing_country: nationality.to_string(),
            person_type: "P".to_string(),
            document_level: "Primary".to_string(),
            age: "30".to_string(),
            in_transit_flag: "N".to_string(),
            eea_flag: eea_flag.to_string(),
            document_type: document_type.to_string(),
            poav_key: "1".to_string(),
            nationality: nationality.to_string(),
            ..PassengerPayload::default()
        }
    }

    let mut passengers = Vec::new();
    passengers.extend(std::iter::repeat_with(|| passenger("GBR", "EEA", "Passport")).take(24));
    passengers.extend(std::iter::repeat_with(|| passenger("ZWE", "", "P")).take(10));
    passengers.extend(std::iter::repeat_with(|| passenger("MRU", "", "P")).take(7));
    passengers.extend(std::iter::repeat_with(|| passenger("AUS", "", "P")).take(10));

    ManifestPayload {
        event_code: "DC".to_string(),
        departure_port: "AMS".to_string(),
        voyage_suffix: String::new(),
        arrival_port: arrival_port.to_string(),
        departure_country: "NLD".to_string(),
        voyage_number: "0123".to_string(),
        voyage_key: "demo".to_string(),
        scheduled_departure_date: date.to_string(),
        scheduled_arrival_date: date.to_string(),
        carrier_type: "AIR".to_string(),
        carrier_code: "TS".to_string(),
        scheduled_departure_time: "06:30:00".to_string(),
        scheduled_arrival_time: "12:00:00".to_string(),
        file_id: "demo".to_string(),
        passengers,
    }
}
