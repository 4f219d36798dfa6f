//! Payroll Engine library crate.
//!
//! This crate exposes the monthly salary computation engine and API
//! components as reusable modules.  External applications may
//! depend on the `payroll_engine` crate and call into
//! `engine::process_employee_salary` or `engine::run_payroll`
//! directly, or embed the API via `api::build_router`.

pub mod models;
pub mod calendar;
pub mod attendance;
pub mod statutory;
pub mod engine;
pub mod export;
pub mod config;
pub mod error;
pub mod api;
