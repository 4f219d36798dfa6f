//! HTTP API for the Payroll Engine.
//!
//! This module exposes a minimal REST API around the payroll engine
//! using the [`axum`](https://crates.io/crates/axum) framework.  The
//! API is a thin shell: clients submit salary structures and
//! attendance, the engine computes, and results are returned as JSON
//! (or CSV for exports).  Nothing is persisted server side apart from
//! the active payroll configuration snapshot.

use crate::attendance::summarize_attendance;
use crate::calendar::{calculate_sunday_pay_status, SundayPayStatus};
use crate::engine::{process_input, run_payroll};
use crate::error::PayrollError;
use crate::export::{generate_payroll_export_data, write_export_csv};
use crate::models::{
    AttendanceRecord, AttendanceSummary, EmployeePayrollInput, PayRunInput, PayRunResult, PayrollConfig, Payslip,
};
use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Application state shared across requests.
pub struct AppState {
    pub payroll_config: RwLock<PayrollConfig>,
}

impl AppState {
    pub fn new(payroll_config: PayrollConfig) -> Arc<Self> {
        Arc::new(Self {
            payroll_config: RwLock::new(payroll_config),
        })
    }

    /// The configuration to use for a request: the one supplied with
    /// the request, or else the active snapshot.
    async fn resolve_config(&self, requested: Option<PayrollConfig>) -> PayrollConfig {
        match requested {
            Some(config) => config,
            None => self.payroll_config.read().await.clone(),
        }
    }
}

/// Build the API router around the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/config", get(get_config_handler).put(put_config_handler))
        .route("/api/payslip", post(payslip_handler))
        .route("/api/payroll/run", post(run_handler))
        .route("/api/payroll/export", post(export_handler))
        .route("/api/attendance/summary", post(summary_handler))
        .route("/api/attendance/sunday-pay", post(sunday_pay_handler))
        .with_state(state)
}

fn validate_month(month: u32) -> std::result::Result<(), PayrollError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(PayrollError::InvalidMonth(month))
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn get_config_handler(State(state): State<Arc<AppState>>) -> Json<PayrollConfig> {
    Json(state.payroll_config.read().await.clone())
}

/// Replaces the active configuration.  Runs already in flight keep the
/// snapshot they started with.
async fn put_config_handler(
    State(state): State<Arc<AppState>>,
    Json(config): Json<PayrollConfig>,
) -> Json<PayrollConfig> {
    let mut active = state.payroll_config.write().await;
    *active = config;
    info!(config = ?*active, "payroll configuration replaced");
    Json(active.clone())
}

#[derive(Debug, Deserialize)]
pub struct PayslipRequest {
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub config: Option<PayrollConfig>,
    #[serde(flatten)]
    pub input: EmployeePayrollInput,
}

async fn payslip_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PayslipRequest>,
) -> std::result::Result<Json<Payslip>, PayrollError> {
    validate_month(request.month)?;
    let config = state.resolve_config(request.config).await;
    Ok(Json(process_input(&request.input, &config, request.month, request.year)))
}

async fn run_handler(
    State(state): State<Arc<AppState>>,
    Json(mut input): Json<PayRunInput>,
) -> std::result::Result<Json<PayRunResult>, PayrollError> {
    validate_month(input.month)?;
    let config = state.resolve_config(input.config.take()).await;
    info!(month = input.month, year = input.year, employees = input.employees.len(), "starting payroll run");
    Ok(Json(run_payroll(&input, &config)))
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub month: u32,
    pub year: i32,
    pub payslips: Vec<Payslip>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

async fn export_handler(
    Query(query): Query<ExportQuery>,
    Json(request): Json<ExportRequest>,
) -> std::result::Result<Response, PayrollError> {
    validate_month(request.month)?;
    let rows = generate_payroll_export_data(&request.payslips, request.month, request.year);
    if query.format.as_deref() == Some("csv") {
        let mut buffer = Vec::new();
        write_export_csv(&mut buffer, &rows)?;
        let filename = format!("attachment; filename=\"payroll_{}_{:02}.csv\"", request.year, request.month);
        Ok((
            [(header::CONTENT_TYPE, "text/csv".to_string()), (header::CONTENT_DISPOSITION, filename)],
            buffer,
        )
            .into_response())
    } else {
        Ok(Json(rows).into_response())
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub month: u32,
    pub year: i32,
    pub records: Vec<AttendanceRecord>,
    #[serde(default)]
    pub holidays: Vec<String>,
}

async fn summary_handler(
    Json(request): Json<SummaryRequest>,
) -> std::result::Result<Json<AttendanceSummary>, PayrollError> {
    validate_month(request.month)?;
    Ok(Json(summarize_attendance(&request.records, request.year, request.month, &request.holidays)))
}

#[derive(Debug, Deserialize)]
pub struct SundayPayRequest {
    pub month: u32,
    pub year: i32,
    pub records: Vec<AttendanceRecord>,
}

async fn sunday_pay_handler(
    Json(request): Json<SundayPayRequest>,
) -> std::result::Result<Json<SundayPayStatus>, PayrollError> {
    validate_month(request.month)?;
    Ok(Json(calculate_sunday_pay_status(&request.records, request.year, request.month)))
}

/// Launch the API server.  Binds to `addr` and blocks until the
/// server terminates.
pub async fn serve(addr: SocketAddr, payroll_config: PayrollConfig) -> Result<()> {
    let router = build_router(AppState::new(payroll_config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
