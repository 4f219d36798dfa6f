//! Flattening of payslips into spreadsheet rows.
//!
//! Column names and their order are fixed by the downstream salary
//! sheet template and must not change.

use crate::error::Result;
use crate::models::Payslip;
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// Export columns, in sheet order.
pub const EXPORT_COLUMNS: [&str; 29] = [
    "Emp Code",
    "Name",
    "BASIC",
    "DA",
    "HRA",
    "CONVEYANCE",
    "GRADE PAY",
    "OTHER ALLOWANCE",
    "MEDICAL ALLOWANCE",
    "TOTAL FIXED",
    "TOTAL DAYS",
    "OFFICE DAYS",
    "WFH DAYS",
    "PAID SUNDAYS",
    "PAID HOLIDAYS",
    "PAID LEAVES",
    "HALF DAYS",
    "LATE COUNT",
    "EARNED DAYS",
    "EARNED BEFORE LATE",
    "LATE DEDUCTION",
    "GROSS SALARY",
    "EPF",
    "ESI",
    "SEWA",
    "SEWA ADVANCE",
    "OTHER DEDUCTIONS",
    "TOTAL DEDUCTIONS",
    "NET PAYABLE",
];

/// One spreadsheet row.  Field order matches [`EXPORT_COLUMNS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Emp Code")]
    pub emp_code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "BASIC")]
    pub basic: f64,
    #[serde(rename = "DA")]
    pub da: f64,
    #[serde(rename = "HRA")]
    pub hra: f64,
    #[serde(rename = "CONVEYANCE")]
    pub conveyance: f64,
    #[serde(rename = "GRADE PAY")]
    pub grade_pay: f64,
    #[serde(rename = "OTHER ALLOWANCE")]
    pub other_allowance: f64,
    #[serde(rename = "MEDICAL ALLOWANCE")]
    pub medical_allowance: f64,
    #[serde(rename = "TOTAL FIXED")]
    pub total_fixed: f64,
    #[serde(rename = "TOTAL DAYS")]
    pub total_days: u32,
    #[serde(rename = "OFFICE DAYS")]
    pub office_days: f64,
    #[serde(rename = "WFH DAYS")]
    pub wfh_days: f64,
    #[serde(rename = "PAID SUNDAYS")]
    pub paid_sundays: f64,
    #[serde(rename = "PAID HOLIDAYS")]
    pub paid_holidays: f64,
    #[serde(rename = "PAID LEAVES")]
    pub paid_leaves: f64,
    #[serde(rename = "HALF DAYS")]
    pub half_days: f64,
    #[serde(rename = "LATE COUNT")]
    pub late_count: u32,
    #[serde(rename = "EARNED DAYS")]
    pub earned_days: f64,
    #[serde(rename = "EARNED BEFORE LATE")]
    pub earned_before_late: f64,
    #[serde(rename = "LATE DEDUCTION")]
    pub late_deduction: f64,
    #[serde(rename = "GROSS SALARY")]
    pub gross_salary: f64,
    #[serde(rename = "EPF")]
    pub epf: f64,
    #[serde(rename = "ESI")]
    pub esi: f64,
    #[serde(rename = "SEWA")]
    pub sewa: f64,
    #[serde(rename = "SEWA ADVANCE")]
    pub sewa_advance: f64,
    #[serde(rename = "OTHER DEDUCTIONS")]
    pub other_deductions: f64,
    #[serde(rename = "TOTAL DEDUCTIONS")]
    pub total_deductions: f64,
    #[serde(rename = "NET PAYABLE")]
    pub net_payable: f64,
}

impl From<&Payslip> for ExportRow {
    fn from(p: &Payslip) -> Self {
        let fixed = &p.fixed_components.components;
        let att = &p.attendance;
        Self {
            emp_code: p.employee.emp_code.clone(),
            name: p.employee.name.clone(),
            basic: fixed.basic,
            da: fixed.da,
            hra: fixed.hra,
            conveyance: fixed.conveyance,
            grade_pay: fixed.grade_pay,
            other_allowance: fixed.other_allowance,
            medical_allowance: fixed.medical_allowance,
            total_fixed: p.fixed_components.total_fixed,
            total_days: att.total_days,
            office_days: att.office_days,
            wfh_days: att.wfh_days,
            paid_sundays: att.paid_sundays,
            paid_holidays: att.paid_holidays,
            paid_leaves: att.paid_leave_days,
            half_days: att.half_day_count + att.second_saturday_count,
            late_count: att.late_count,
            earned_days: att.total_earned_days,
            earned_before_late: p.earnings.total_before_late,
            late_deduction: p.earnings.late_deduction,
            gross_salary: p.gross_salary,
            epf: p.deductions.epf,
            esi: p.deductions.esi,
            sewa: p.deductions.sewa,
            sewa_advance: p.deductions.sewa_advance,
            other_deductions: p.deductions.other_deductions,
            total_deductions: p.total_deductions,
            net_payable: p.net_payable,
        }
    }
}

/// Projects the payslips of a period onto export rows, one per
/// payslip and in the same order.  Fields missing from a stored
/// payslip come out as zero or empty.
pub fn generate_payroll_export_data(payslips: &[Payslip], month: u32, year: i32) -> Vec<ExportRow> {
    debug!(month, year, rows = payslips.len(), "shaping payroll export");
    payslips.iter().map(ExportRow::from).collect()
}

/// Writes rows as CSV with the header in [`EXPORT_COLUMNS`] order.
pub fn write_export_csv<W: Write>(writer: W, rows: &[ExportRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(EXPORT_COLUMNS)?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
