//! Data models for the Payroll Engine.
//!
//! The `models` module defines the serialisable records consumed and
//! produced by the engine: salary structures, attendance (raw and
//! summarised), the global payroll configuration, loan instalments,
//! one-time deductions and the resulting payslip.  Every optional
//! field carries a serde default so that partially populated
//! documents (for example legacy salary rows) still deserialise; the
//! defaults documented on each field are the values the engine uses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifies the employee a salary structure or payslip belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Internal identifier of the employee record.
    pub id: String,
    /// The organisation's employee code, printed on exports.
    #[serde(default)]
    pub emp_code: String,
    /// The employee's full name.
    #[serde(default)]
    pub name: String,
}

/// Fixed monthly pay components of a salary structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedComponents {
    /// Basic pay.
    pub basic: f64,
    /// Dearness allowance.  Together with basic it forms the EPF and
    /// SEWA base.
    pub da: f64,
    /// House rent allowance.
    pub hra: f64,
    /// Conveyance (travel) allowance.
    pub conveyance: f64,
    /// Grade pay attached to the employee's pay band.
    pub grade_pay: f64,
    /// Any other fixed allowance not covered above.
    pub other_allowance: f64,
    /// Medical allowance.
    pub medical_allowance: f64,
}

impl FixedComponents {
    /// Sum of all components.
    pub fn total(&self) -> f64 {
        self.basic
            + self.da
            + self.hra
            + self.conveyance
            + self.grade_pay
            + self.other_allowance
            + self.medical_allowance
    }

    /// Basic plus dearness allowance, the base for EPF and SEWA.
    pub fn basic_da(&self) -> f64 {
        self.basic + self.da
    }
}

/// Per-employee overrides for statutory deductions.  Any field left
/// unset falls back to the global [`PayrollConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionConfig {
    /// Whether EPF is deducted for this employee.
    pub epf_applicable: Option<bool>,
    /// Whether ESI is deducted for this employee.  Even when applicable,
    /// ESI is only due while gross stays within the ESI ceiling.
    pub esi_applicable: Option<bool>,
    /// Whether the SEWA contribution is deducted for this employee.
    pub sewa_applicable: Option<bool>,
    /// SEWA rate in percent of earned basic plus DA.
    pub sewa_percentage: Option<f64>,
}

/// Recurring deductions stored on the salary record itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedDeductions {
    /// Amount deducted every month, on top of statutory deductions.
    pub other_deduction: f64,
}

/// The active salary structure of an employee.
///
/// Salary rows imported before the component breakdown existed only
/// carry a flat `total_fixed` (or, older still, `gross`) figure.  See
/// [`SalaryStructure::basis`] for how those are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryStructure {
    /// Component breakdown, stored inline on the salary row.
    #[serde(flatten)]
    pub components: FixedComponents,
    /// Overrides of the global deduction rules.
    #[serde(default)]
    pub deduction_config: Option<DeductionConfig>,
    /// Recurring non-statutory deductions.
    #[serde(default)]
    pub fixed_deductions: Option<FixedDeductions>,
    /// Legacy flat monthly salary.
    #[serde(default)]
    pub total_fixed: Option<f64>,
    /// Legacy gross salary, consulted when `total_fixed` is absent.
    #[serde(default)]
    pub gross: Option<f64>,
}

/// Share of the legacy total treated as basic pay.
const LEGACY_BASIC_RATIO: f64 = 0.40;
/// Share of the derived basic treated as HRA.
const LEGACY_HRA_RATIO: f64 = 0.40;

/// How the fixed components of a salary were obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SalaryBasis {
    /// The structure carried a positive component breakdown.
    Structured(FixedComponents),
    /// Compatibility shim for salary rows without a breakdown: the flat
    /// total is split as basic = 40% of total, HRA = 40% of basic and
    /// medical allowance = the remainder.
    LegacySalaryFallback { total_fixed: f64 },
}

impl SalaryBasis {
    /// The components used for proration.
    pub fn components(&self) -> FixedComponents {
        match *self {
            SalaryBasis::Structured(components) => components,
            SalaryBasis::LegacySalaryFallback { total_fixed } => {
                let basic = total_fixed * LEGACY_BASIC_RATIO;
                let hra = basic * LEGACY_HRA_RATIO;
                FixedComponents {
                    basic,
                    hra,
                    medical_allowance: total_fixed - basic - hra,
                    ..FixedComponents::default()
                }
            }
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, SalaryBasis::LegacySalaryFallback { .. })
    }
}

impl SalaryStructure {
    /// Resolves the salary basis.  A breakdown summing to zero or less
    /// is treated as absent and the legacy flat fields are used
    /// instead (`total_fixed`, then `gross`, then zero).
    pub fn basis(&self) -> SalaryBasis {
        if self.components.total() > 0.0 {
            SalaryBasis::Structured(self.components)
        } else {
            let total_fixed = self.total_fixed.or(self.gross).unwrap_or(0.0).max(0.0);
            SalaryBasis::LegacySalaryFallback { total_fixed }
        }
    }

    pub fn other_deduction(&self) -> f64 {
        self.fixed_deductions
            .map(|d| d.other_deduction)
            .unwrap_or(0.0)
    }
}

/// A single day of raw attendance as recorded by the attendance store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Date string in `YYYY-MM-DD` form.  Records whose date cannot be
    /// parsed are ignored by every consumer.
    pub date: String,
    /// Status such as `present`, `wfh`, `half_day`, `leave`, `absent`,
    /// `lop`, `lwp` or `loss_of_pay`.
    pub status: String,
    #[serde(default)]
    pub is_late: bool,
    /// For `leave` records, whether the leave was approved as paid.
    #[serde(default)]
    pub paid: Option<bool>,
}

impl AttendanceRecord {
    pub fn new(date: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            status: status.into(),
            is_late: false,
            paid: None,
        }
    }

    /// The parsed date, if well formed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

/// Calendar breakdown of a month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingDaysInfo {
    /// Days in the month.
    pub calendar_days: u32,
    /// Sundays in the month.
    pub sundays: u32,
    /// Holidays in the month that do not fall on a Sunday.
    pub holidays: u32,
    /// `calendar_days - sundays - holidays`.
    pub working_days: u32,
}

/// Attendance of one employee for one month, derived from the raw
/// daily records by [`crate::attendance::summarize_attendance`] or
/// supplied directly by the caller.
///
/// `paid_sundays + unpaid_sundays` is expected to equal the number of
/// Sundays in the month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceSummary {
    /// Full days worked from the office.
    pub office_days: f64,
    /// Days worked from home, paid at the configured WFH percentage.
    pub wfh_days: f64,
    /// Late marks in the month.
    pub late_count: u32,
    /// Half days, each paid as half a day.
    pub half_day_count: f64,
    /// Second Saturdays worked, each paid as a half day.
    pub second_saturday_count: f64,
    /// Approved paid leave.
    pub paid_leave_days: f64,
    /// Unpaid leave and absences.  Never paid.
    pub unpaid_leave_days: f64,
    /// Sundays paid under the weekly leave rule.
    pub paid_sundays: f64,
    /// Sundays forfeited under the weekly leave rule.
    pub unpaid_sundays: f64,
    /// Holidays in the month, all paid.
    pub paid_holidays: f64,
    /// Calendar breakdown of the month.
    pub working_days_info: WorkingDaysInfo,
}

/// Global payroll rates.  The caller resolves the active configuration
/// and passes an immutable snapshot; the engine never looks it up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Employee EPF rate in percent.
    pub epf_employee_percentage: f64,
    /// Cap on the basic plus DA amount EPF is charged on.
    pub epf_wage_ceiling: f64,
    /// Employee ESI rate in percent.
    pub esi_employee_percentage: f64,
    /// Highest gross on which ESI is still due.
    pub esi_wage_ceiling: f64,
    /// Default SEWA rate in percent, used when the salary structure does
    /// not set one.
    pub sewa_percentage: f64,
    /// Share of a full day paid for a work-from-home day, in percent.
    pub wfh_pay_percentage: f64,
    /// Whether late marks are penalised at all.
    pub late_deduction_enabled: bool,
    /// Every this many late marks cost half a day's pay.
    pub late_count_threshold: u32,
    /// EPF applicability when the salary structure does not say.
    pub epf_applicable: bool,
    /// ESI applicability when the salary structure does not say.
    pub esi_applicable: bool,
    /// SEWA applicability when the salary structure does not say.
    pub sewa_applicable: bool,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            epf_employee_percentage: 12.0,
            epf_wage_ceiling: 15000.0,
            esi_employee_percentage: 0.75,
            esi_wage_ceiling: 21000.0,
            sewa_percentage: 2.0,
            wfh_pay_percentage: 100.0,
            late_deduction_enabled: true,
            late_count_threshold: 3,
            epf_applicable: true,
            esi_applicable: true,
            sewa_applicable: false,
        }
    }
}

/// An ongoing SEWA advance (loan) repaid in monthly instalments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SewaAdvanceInfo {
    /// Inactive (fully repaid or paused) advances are not deducted.
    pub is_active: bool,
    /// Instalment deducted each month.
    pub monthly_amount: f64,
}

/// A deduction applied once, in the given month of the given year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneTimeDeduction {
    /// Month (1 to 12) the deduction applies to.
    pub month: u32,
    pub year: i32,
    pub amount: f64,
}

/// Attendance section of a payslip: the summary echoed back along
/// with the figures computed from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayslipAttendance {
    /// Calendar days in the month, the proration denominator.
    pub total_days: u32,
    pub office_days: f64,
    pub wfh_days: f64,
    /// WFH pay percentage the run was computed with.
    pub wfh_percentage: f64,
    pub late_count: u32,
    pub half_day_count: f64,
    pub second_saturday_count: f64,
    pub paid_leave_days: f64,
    /// Echoed for display; unpaid leave never adds earned days.
    pub unpaid_leave_days: f64,
    pub paid_sundays: f64,
    /// Echoed for display; unpaid Sundays never add earned days.
    pub unpaid_sundays: f64,
    pub paid_holidays: f64,
    /// Days the salary was prorated to.
    pub total_earned_days: f64,
}

/// Prorated earnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Earnings {
    /// Earned basic plus DA.
    pub basic_da: f64,
    /// Earned HRA.
    pub hra: f64,
    /// Earned conveyance allowance.
    pub conveyance: f64,
    /// Earned grade pay.
    pub grade_pay: f64,
    /// Earned other allowance.
    pub other_allowance: f64,
    /// Earned medical allowance.
    pub medical_allowance: f64,
    /// Sum of the prorated components.
    pub total_before_late: f64,
    /// Penalty for late marks.
    pub late_deduction: f64,
    /// `total_before_late - late_deduction`, the gross salary.
    pub total_after_late: f64,
}

/// Amounts withheld from the gross salary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deductions {
    /// Employee EPF contribution.
    pub epf: f64,
    /// Employee ESI contribution.
    pub esi: f64,
    /// SEWA welfare contribution.
    pub sewa: f64,
    /// SEWA advance instalment for the month.
    pub sewa_advance: f64,
    /// One-time deductions for the month plus the salary's recurring
    /// other deduction.
    pub other_deductions: f64,
    /// Sum of all of the above.
    pub total: f64,
}

/// Fixed components as shown on the payslip, with their total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayslipFixedComponents {
    /// Monthly components before proration.
    #[serde(flatten)]
    pub components: FixedComponents,
    /// Sum of the components.
    pub total_fixed: f64,
    /// Set when the components were approximated from a flat legacy salary.
    pub legacy_fallback: bool,
}

/// The engine's output for one employee and one month.  Callers
/// persist it keyed by (employee, month, year).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payslip {
    pub employee: Employee,
    /// Pay period month, 1 to 12.
    pub month: u32,
    /// Pay period year.
    pub year: i32,
    /// Monthly salary the earnings were prorated from.
    pub fixed_components: PayslipFixedComponents,
    /// Attendance the earned days were derived from.
    pub attendance: PayslipAttendance,
    /// Prorated earnings and the late penalty.
    pub earnings: Earnings,
    /// Itemised deductions.
    pub deductions: Deductions,
    /// Earnings after the late penalty.
    pub gross_salary: f64,
    /// Same as `deductions.total`.
    pub total_deductions: f64,
    /// `gross_salary - total_deductions`; negative when deductions
    /// exceed earnings.
    pub net_payable: f64,
}

/// Everything the engine needs for one employee in a payroll run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeePayrollInput {
    pub employee: Employee,
    /// Active salary structure.
    pub salary: SalaryStructure,
    /// Summary for the pay period.  Missing attendance means no days
    /// were worked.
    #[serde(default)]
    pub attendance: AttendanceSummary,
    /// Outstanding SEWA advance, if any.
    #[serde(default)]
    pub sewa_advance: Option<SewaAdvanceInfo>,
    /// One-time deductions of any period; only those matching the run's
    /// month and year are applied.
    #[serde(default)]
    pub one_time_deductions: Vec<OneTimeDeduction>,
}

/// Input to a batch payroll run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayRunInput {
    /// Month to pay, 1 to 12.
    pub month: u32,
    pub year: i32,
    /// Configuration snapshot for the run.  When omitted the server's
    /// active configuration is used.
    #[serde(default)]
    pub config: Option<PayrollConfig>,
    /// Employees to pay.
    pub employees: Vec<EmployeePayrollInput>,
}

/// Aggregate figures of a payroll run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayRunTotals {
    /// Number of payslips produced.
    pub employee_count: usize,
    /// Sum of gross salaries.
    pub gross_salary: f64,
    /// Sum of total deductions.
    pub total_deductions: f64,
    /// Sum of net payable amounts.
    pub net_payable: f64,
}

/// The result of a payroll run, one payslip per input employee in
/// input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayRunResult {
    pub month: u32,
    pub year: i32,
    pub payslips: Vec<Payslip>,
    /// Totals across `payslips`.
    pub totals: PayRunTotals,
}
