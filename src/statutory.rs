//! Statutory and policy deductions.
//!
//! Each calculator is a pure function over already-prorated amounts.
//! Results are rounded to two decimal places.

/// Rounds a monetary amount to two decimal places.  Exact ties go to
/// the even cent, so 200.125 becomes 200.12.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Employees' Provident Fund contribution.
///
/// The contribution base is earned basic plus DA, capped at the wage
/// ceiling.
pub fn calculate_epf(basic_da_earned: f64, applicable: bool, percentage: f64, ceiling: f64) -> f64 {
    if !applicable {
        return 0.0;
    }
    round2(basic_da_earned.min(ceiling) * percentage / 100.0)
}

/// Employees' State Insurance contribution.
///
/// ESI is levied on the full gross up to and including the ceiling.
/// Above it no ESI is due at all; the base is not capped.
pub fn calculate_esi(gross_earned: f64, applicable: bool, percentage: f64, ceiling: f64) -> f64 {
    if !applicable || gross_earned > ceiling {
        return 0.0;
    }
    round2(gross_earned * percentage / 100.0)
}

/// SEWA welfare contribution on earned basic plus DA.
pub fn calculate_sewa(basic_da_earned: f64, applicable: bool, percentage: f64) -> f64 {
    if !applicable {
        return 0.0;
    }
    round2(basic_da_earned * percentage / 100.0)
}

/// Late attendance penalty.
///
/// Every complete block of `threshold` late marks costs half a day's
/// pay.  A threshold of zero disables the penalty.
pub fn calculate_late_deduction(late_count: u32, enabled: bool, threshold: u32, daily_rate: f64) -> f64 {
    if !enabled || threshold == 0 || late_count < threshold {
        return 0.0;
    }
    let penalty_units = late_count / threshold;
    round2(f64::from(penalty_units) * (daily_rate * 0.5))
}
