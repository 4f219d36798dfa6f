//! Payroll computation engine.
//!
//! The `engine` module turns a salary structure and a monthly
//! attendance summary into a [`Payslip`].  Every function here is
//! total: missing or zero inputs contribute zero instead of producing
//! an error, so a caller always receives a (possibly all-zero)
//! payslip and is responsible for validating business data up front.
//!
//! [`run_payroll`] uses the [`rayon`] crate to process employees in
//! parallel; payslips are independent of each other so no
//! coordination is required.

use crate::calendar::calendar_days_in_month;
use crate::models::{
    AttendanceSummary, Deductions, Earnings, Employee, EmployeePayrollInput, FixedComponents, OneTimeDeduction, PayRunInput,
    PayRunResult, PayRunTotals, PayrollConfig, Payslip, PayslipAttendance, PayslipFixedComponents, SalaryStructure,
    SewaAdvanceInfo,
};
use crate::statutory::{calculate_epf, calculate_esi, calculate_late_deduction, calculate_sewa, round2};
use rayon::prelude::*;
use tracing::{debug, info};

/// Days counted towards pay for the month.
///
/// Unpaid leave never appears in the sum.  `half_day_count` is
/// expected to already include second Saturday half days.
pub fn calculate_earned_days(
    office_days: f64,
    paid_sundays: f64,
    paid_holidays: f64,
    paid_leave_days: f64,
    wfh_days: f64,
    half_day_count: f64,
    wfh_percentage: f64,
) -> f64 {
    office_days + paid_sundays + paid_holidays + paid_leave_days + wfh_days * (wfh_percentage / 100.0)
        + half_day_count * 0.5
}

/// Scales a fixed monthly amount to the days earned.  Returns 0 when
/// `total_days` is not positive.
pub fn prorate_component(fixed_amount: f64, earned_days: f64, total_days: f64) -> f64 {
    if total_days <= 0.0 {
        return 0.0;
    }
    (fixed_amount / total_days) * earned_days
}

/// Applicability and rates resolved from the salary structure's
/// overrides and the global configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResolvedDeductions {
    epf_applicable: bool,
    esi_applicable: bool,
    sewa_applicable: bool,
    sewa_percentage: f64,
}

fn resolve_deductions(salary: &SalaryStructure, config: &PayrollConfig) -> ResolvedDeductions {
    let overrides = salary.deduction_config.unwrap_or_default();
    ResolvedDeductions {
        epf_applicable: overrides.epf_applicable.unwrap_or(config.epf_applicable),
        esi_applicable: overrides.esi_applicable.unwrap_or(config.esi_applicable),
        sewa_applicable: overrides.sewa_applicable.unwrap_or(config.sewa_applicable),
        sewa_percentage: overrides.sewa_percentage.unwrap_or(config.sewa_percentage),
    }
}

/// Sum of one-time deductions falling in the given period.
pub fn one_time_deductions_for(deductions: &[OneTimeDeduction], month: u32, year: i32) -> f64 {
    deductions
        .iter()
        .filter(|d| d.month == month && d.year == year)
        .map(|d| d.amount)
        .sum()
}

/// Computes the payslip of one employee for `month` of `year`.
///
/// Steps, in order: fixed components (falling back to the legacy flat
/// salary), earned days, proration, late penalty, statutory
/// deductions on the post-penalty amounts, loan and other deductions,
/// net pay.  Late penalty is taken out of earned basic plus DA first,
/// never below zero, before EPF and SEWA are computed.
#[allow(clippy::too_many_arguments)]
pub fn process_employee_salary(
    employee: &Employee,
    salary: &SalaryStructure,
    attendance: &AttendanceSummary,
    config: &PayrollConfig,
    month: u32,
    year: i32,
    sewa_advance: Option<&SewaAdvanceInfo>,
    one_time_deductions: &[OneTimeDeduction],
) -> Payslip {
    let total_days = calendar_days_in_month(year, month);
    let days = f64::from(total_days);

    let basis = salary.basis();
    let fixed = basis.components();
    let total_fixed = fixed.total();

    let rules = resolve_deductions(salary, config);

    let half_days = attendance.half_day_count + attendance.second_saturday_count;
    let earned_days = calculate_earned_days(
        attendance.office_days,
        attendance.paid_sundays,
        attendance.paid_holidays,
        attendance.paid_leave_days,
        attendance.wfh_days,
        half_days,
        config.wfh_pay_percentage,
    );

    let basic_da_earned = prorate_component(fixed.basic_da(), earned_days, days);
    let hra_earned = prorate_component(fixed.hra, earned_days, days);
    let conveyance_earned = prorate_component(fixed.conveyance, earned_days, days);
    let grade_pay_earned = prorate_component(fixed.grade_pay, earned_days, days);
    let other_allowance_earned = prorate_component(fixed.other_allowance, earned_days, days);
    let medical_earned = prorate_component(fixed.medical_allowance, earned_days, days);
    let total_before_late = basic_da_earned
        + hra_earned
        + conveyance_earned
        + grade_pay_earned
        + other_allowance_earned
        + medical_earned;

    let daily_rate = if total_days > 0 { total_fixed / days } else { 0.0 };
    let late_deduction = calculate_late_deduction(
        attendance.late_count,
        config.late_deduction_enabled,
        config.late_count_threshold,
        daily_rate,
    );
    let total_after_late = total_before_late - late_deduction;
    let basic_da_after_late = (basic_da_earned - late_deduction).max(0.0);

    let epf = calculate_epf(
        basic_da_after_late,
        rules.epf_applicable,
        config.epf_employee_percentage,
        config.epf_wage_ceiling,
    );
    let esi = calculate_esi(
        total_after_late,
        rules.esi_applicable,
        config.esi_employee_percentage,
        config.esi_wage_ceiling,
    );
    let sewa = calculate_sewa(basic_da_after_late, rules.sewa_applicable, rules.sewa_percentage);
    let sewa_advance = sewa_advance
        .filter(|a| a.is_active)
        .map(|a| a.monthly_amount)
        .unwrap_or(0.0);
    let other_deductions = one_time_deductions_for(one_time_deductions, month, year) + salary.other_deduction();
    let total_deductions = round2(epf + esi + sewa + sewa_advance + other_deductions);

    let gross_salary = round2(total_after_late);
    let net_payable = round2(total_after_late - total_deductions);

    debug!(
        employee = %employee.id,
        month,
        year,
        earned_days,
        gross_salary,
        net_payable,
        legacy = basis.is_legacy(),
        "processed payslip"
    );

    Payslip {
        employee: employee.clone(),
        month,
        year,
        fixed_components: PayslipFixedComponents {
            components: fixed_rounded(fixed),
            total_fixed: round2(total_fixed),
            legacy_fallback: basis.is_legacy(),
        },
        attendance: PayslipAttendance {
            total_days,
            office_days: attendance.office_days,
            wfh_days: attendance.wfh_days,
            wfh_percentage: config.wfh_pay_percentage,
            late_count: attendance.late_count,
            half_day_count: attendance.half_day_count,
            second_saturday_count: attendance.second_saturday_count,
            paid_leave_days: attendance.paid_leave_days,
            unpaid_leave_days: attendance.unpaid_leave_days,
            paid_sundays: attendance.paid_sundays,
            unpaid_sundays: attendance.unpaid_sundays,
            paid_holidays: attendance.paid_holidays,
            total_earned_days: round2(earned_days),
        },
        earnings: Earnings {
            basic_da: round2(basic_da_earned),
            hra: round2(hra_earned),
            conveyance: round2(conveyance_earned),
            grade_pay: round2(grade_pay_earned),
            other_allowance: round2(other_allowance_earned),
            medical_allowance: round2(medical_earned),
            total_before_late: round2(total_before_late),
            late_deduction,
            total_after_late: gross_salary,
        },
        deductions: Deductions {
            epf,
            esi,
            sewa,
            sewa_advance: round2(sewa_advance),
            other_deductions: round2(other_deductions),
            total: total_deductions,
        },
        gross_salary,
        total_deductions,
        net_payable,
    }
}

fn fixed_rounded(fixed: FixedComponents) -> FixedComponents {
    FixedComponents {
        basic: round2(fixed.basic),
        da: round2(fixed.da),
        hra: round2(fixed.hra),
        conveyance: round2(fixed.conveyance),
        grade_pay: round2(fixed.grade_pay),
        other_allowance: round2(fixed.other_allowance),
        medical_allowance: round2(fixed.medical_allowance),
    }
}

/// Convenience wrapper over [`process_employee_salary`] for a batch
/// input entry.
pub fn process_input(input: &EmployeePayrollInput, config: &PayrollConfig, month: u32, year: i32) -> Payslip {
    process_employee_salary(
        &input.employee,
        &input.salary,
        &input.attendance,
        config,
        month,
        year,
        input.sewa_advance.as_ref(),
        &input.one_time_deductions,
    )
}

/// Runs payroll for every employee of `input` using `config`.
///
/// Payslips are computed in parallel and returned in input order.  A
/// configuration embedded in `input` is ignored here; callers decide
/// which snapshot applies before calling.
pub fn run_payroll(input: &PayRunInput, config: &PayrollConfig) -> PayRunResult {
    let (month, year) = (input.month, input.year);
    let payslips: Vec<Payslip> = input
        .employees
        .par_iter()
        .map(|employee| process_input(employee, config, month, year))
        .collect();

    let totals = PayRunTotals {
        employee_count: payslips.len(),
        gross_salary: round2(payslips.iter().map(|p| p.gross_salary).sum()),
        total_deductions: round2(payslips.iter().map(|p| p.total_deductions).sum()),
        net_payable: round2(payslips.iter().map(|p| p.net_payable).sum()),
    };
    info!(
        month,
        year,
        employees = totals.employee_count,
        net_payable = totals.net_payable,
        "payroll run complete"
    );
    PayRunResult {
        month,
        year,
        payslips,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeductionConfig, FixedDeductions};

    fn employee() -> Employee {
        Employee {
            id: "e1".into(),
            emp_code: "EMP001".into(),
            name: "Asha Rao".into(),
        }
    }

    fn salary(basic: f64, hra: f64) -> SalaryStructure {
        SalaryStructure {
            components: FixedComponents {
                basic,
                hra,
                ..FixedComponents::default()
            },
            deduction_config: Some(DeductionConfig {
                epf_applicable: Some(true),
                esi_applicable: Some(true),
                sewa_applicable: Some(false),
                sewa_percentage: None,
            }),
            ..SalaryStructure::default()
        }
    }

    fn full_month() -> AttendanceSummary {
        AttendanceSummary {
            office_days: 26.0,
            paid_sundays: 4.0,
            ..AttendanceSummary::default()
        }
    }

    #[test]
    fn test_earned_days() {
        assert_eq!(calculate_earned_days(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 50.0), 0.0);
        assert_eq!(calculate_earned_days(20.0, 4.0, 1.0, 2.0, 2.0, 3.0, 50.0), 29.5);
    }

    #[test]
    fn test_prorate_component() {
        assert_eq!(round2(prorate_component(14000.0, 30.0, 30.0)), 14000.0);
        assert_eq!(prorate_component(3100.0, 15.5, 31.0), 1550.0);
        assert_eq!(prorate_component(3100.0, 15.5, 0.0), 0.0);
    }

    #[test]
    fn test_full_month_scenario() {
        // September 2024 has 30 days.
        let payslip = process_employee_salary(
            &employee(),
            &salary(10000.0, 4000.0),
            &full_month(),
            &PayrollConfig::default(),
            9,
            2024,
            None,
            &[],
        );
        assert_eq!(payslip.attendance.total_days, 30);
        assert_eq!(payslip.attendance.total_earned_days, 30.0);
        assert_eq!(payslip.earnings.basic_da, 10000.0);
        assert_eq!(payslip.earnings.hra, 4000.0);
        assert_eq!(payslip.gross_salary, 14000.0);
        assert_eq!(payslip.deductions.epf, 1200.0);
        assert_eq!(payslip.deductions.esi, 105.0);
        assert_eq!(payslip.deductions.sewa, 0.0);
        assert_eq!(payslip.total_deductions, 1305.0);
        assert_eq!(payslip.net_payable, 12695.0);
        assert!(!payslip.fixed_components.legacy_fallback);
    }

    #[test]
    fn test_zero_attendance_leaves_only_deductions() {
        let advance = SewaAdvanceInfo {
            is_active: true,
            monthly_amount: 500.0,
        };
        let payslip = process_employee_salary(
            &employee(),
            &salary(10000.0, 4000.0),
            &AttendanceSummary::default(),
            &PayrollConfig::default(),
            9,
            2024,
            Some(&advance),
            &[],
        );
        assert_eq!(payslip.gross_salary, 0.0);
        assert_eq!(payslip.deductions.epf, 0.0);
        assert_eq!(payslip.deductions.esi, 0.0);
        assert_eq!(payslip.total_deductions, 500.0);
        assert_eq!(payslip.net_payable, -500.0);
    }

    #[test]
    fn test_legacy_salary_fallback() {
        let legacy = SalaryStructure {
            total_fixed: Some(20000.0),
            ..SalaryStructure::default()
        };
        let payslip = process_employee_salary(
            &employee(),
            &legacy,
            &full_month(),
            &PayrollConfig::default(),
            9,
            2024,
            None,
            &[],
        );
        let fixed = &payslip.fixed_components;
        assert!(fixed.legacy_fallback);
        assert_eq!(fixed.components.basic, 8000.0);
        assert_eq!(fixed.components.hra, 3200.0);
        assert_eq!(fixed.components.medical_allowance, 8800.0);
        assert_eq!(fixed.total_fixed, 20000.0);
        assert_eq!(payslip.gross_salary, 20000.0);
        // EPF on 8000 basic; ESI because 20000 is under the ceiling.
        assert_eq!(payslip.deductions.epf, 960.0);
        assert_eq!(payslip.deductions.esi, 150.0);
    }

    #[test]
    fn test_legacy_gross_used_when_total_fixed_missing() {
        let legacy = SalaryStructure {
            gross: Some(10000.0),
            ..SalaryStructure::default()
        };
        assert_eq!(legacy.basis().components().basic, 4000.0);
    }

    #[test]
    fn test_late_penalty_reduces_gross_and_bases() {
        let attendance = AttendanceSummary {
            late_count: 7,
            ..full_month()
        };
        let config = PayrollConfig {
            late_count_threshold: 3,
            ..PayrollConfig::default()
        };
        let payslip = process_employee_salary(
            &employee(),
            &salary(10000.0, 5000.0),
            &attendance,
            &config,
            9,
            2024,
            None,
            &[],
        );
        // 7 / 3 = 2 blocks of half a day at 15000 / 30 = 500 per day.
        assert_eq!(payslip.earnings.late_deduction, 500.0);
        assert_eq!(payslip.earnings.total_before_late, 15000.0);
        assert_eq!(payslip.gross_salary, 14500.0);
        assert_eq!(payslip.deductions.epf, 1140.0);
        assert_eq!(payslip.deductions.esi, 108.75);
    }

    #[test]
    fn test_wfh_and_half_days_weighting() {
        let attendance = AttendanceSummary {
            office_days: 20.0,
            wfh_days: 4.0,
            half_day_count: 1.0,
            second_saturday_count: 1.0,
            paid_sundays: 4.0,
            ..AttendanceSummary::default()
        };
        let config = PayrollConfig {
            wfh_pay_percentage: 50.0,
            ..PayrollConfig::default()
        };
        let payslip = process_employee_salary(
            &employee(),
            &salary(3000.0, 0.0),
            &attendance,
            &config,
            9,
            2024,
            None,
            &[],
        );
        // 20 + 4 + 4 * 0.5 + 2 * 0.5 = 27 earned days.
        assert_eq!(payslip.attendance.total_earned_days, 27.0);
        assert_eq!(payslip.earnings.basic_da, 2700.0);
    }

    #[test]
    fn test_sewa_and_other_deductions() {
        let mut structure = salary(10000.0, 0.0);
        structure.deduction_config = Some(DeductionConfig {
            epf_applicable: Some(false),
            esi_applicable: Some(false),
            sewa_applicable: Some(true),
            sewa_percentage: Some(1.5),
        });
        structure.fixed_deductions = Some(FixedDeductions { other_deduction: 100.0 });
        let one_time = [
            OneTimeDeduction { month: 9, year: 2024, amount: 250.0 },
            OneTimeDeduction { month: 9, year: 2024, amount: 50.0 },
            OneTimeDeduction { month: 10, year: 2024, amount: 999.0 },
            OneTimeDeduction { month: 9, year: 2023, amount: 999.0 },
        ];
        let inactive = SewaAdvanceInfo {
            is_active: false,
            monthly_amount: 1000.0,
        };
        let payslip = process_employee_salary(
            &employee(),
            &structure,
            &full_month(),
            &PayrollConfig::default(),
            9,
            2024,
            Some(&inactive),
            &one_time,
        );
        assert_eq!(payslip.deductions.sewa, 150.0);
        assert_eq!(payslip.deductions.sewa_advance, 0.0);
        assert_eq!(payslip.deductions.other_deductions, 400.0);
        assert_eq!(payslip.total_deductions, 550.0);
        assert_eq!(payslip.net_payable, 9450.0);
    }

    #[test]
    fn test_config_defaults_apply_without_overrides() {
        let structure = SalaryStructure {
            components: FixedComponents {
                basic: 10000.0,
                ..FixedComponents::default()
            },
            ..SalaryStructure::default()
        };
        let config = PayrollConfig {
            esi_applicable: false,
            sewa_applicable: true,
            sewa_percentage: 2.0,
            ..PayrollConfig::default()
        };
        let payslip = process_employee_salary(&employee(), &structure, &full_month(), &config, 9, 2024, None, &[]);
        assert_eq!(payslip.deductions.epf, 1200.0);
        assert_eq!(payslip.deductions.esi, 0.0);
        assert_eq!(payslip.deductions.sewa, 200.0);
    }

    #[test]
    fn test_invalid_month_yields_zero_payslip() {
        let payslip = process_employee_salary(
            &employee(),
            &salary(10000.0, 4000.0),
            &full_month(),
            &PayrollConfig::default(),
            13,
            2024,
            None,
            &[],
        );
        assert_eq!(payslip.attendance.total_days, 0);
        assert_eq!(payslip.gross_salary, 0.0);
        assert_eq!(payslip.net_payable, 0.0);
    }

    #[test]
    fn test_run_payroll_preserves_order_and_totals() {
        let input = PayRunInput {
            month: 9,
            year: 2024,
            config: None,
            employees: (0..8)
                .map(|i| EmployeePayrollInput {
                    employee: Employee {
                        id: format!("e{i}"),
                        ..Employee::default()
                    },
                    salary: salary(10000.0, 4000.0),
                    attendance: full_month(),
                    ..EmployeePayrollInput::default()
                })
                .collect(),
        };
        let result = run_payroll(&input, &PayrollConfig::default());
        assert_eq!(result.totals.employee_count, 8);
        let ids: Vec<_> = result.payslips.iter().map(|p| p.employee.id.as_str()).collect();
        assert_eq!(ids, ["e0", "e1", "e2", "e3", "e4", "e5", "e6", "e7"]);
        assert_eq!(result.totals.gross_salary, 112000.0);
        assert_eq!(result.totals.net_payable, 101560.0);
    }
}
