//! Derivation of a monthly [`AttendanceSummary`] from raw daily
//! attendance records.
//!
//! This is the step performed before a payroll run: the engine itself
//! only ever sees the summary.

use crate::calendar::{calculate_sunday_pay_status, is_leave_status, is_second_saturday, latest_by_date, parse_holidays, working_days_in_month};
use crate::models::{AttendanceRecord, AttendanceSummary};
use chrono::{Datelike, Weekday};
use std::collections::HashMap;
use tracing::debug;

/// The kind of day an attendance status represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayKind {
    Office,
    Late,
    Wfh,
    HalfDay,
    Leave,
    Unpaid,
}

fn classify(status: &str) -> Option<DayKind> {
    match status {
        "present" | "office" => Some(DayKind::Office),
        "late" => Some(DayKind::Late),
        "wfh" | "work_from_home" => Some(DayKind::Wfh),
        "half_day" => Some(DayKind::HalfDay),
        "leave" => Some(DayKind::Leave),
        s if is_leave_status(s) => Some(DayKind::Unpaid),
        _ => None,
    }
}

/// Summarises one employee's attendance for `month` of `year`.
///
/// Records outside the month or with malformed dates are ignored and
/// the last record for a date wins.  Sundays are settled by the Sunday
/// pay rule and holidays are always paid, so records on those days do
/// not contribute to the day counts.  Statuses match exactly; anything
/// else, including differently cased spellings, is ignored.
pub fn summarize_attendance<S: AsRef<str>>(
    records: &[AttendanceRecord],
    year: i32,
    month: u32,
    holidays: &[S],
) -> AttendanceSummary {
    let working_days_info = working_days_in_month(year, month, holidays);
    let holiday_set = parse_holidays(holidays);
    let sundays = calculate_sunday_pay_status(records, year, month);

    // Flags such as `is_late` and `paid` belong to the winning record.
    let mut latest: HashMap<_, &AttendanceRecord> = HashMap::new();
    for record in records {
        if let Some(date) = record.parsed_date() {
            latest.insert(date, record);
        }
    }

    let mut summary = AttendanceSummary {
        paid_sundays: f64::from(sundays.paid_sundays),
        unpaid_sundays: f64::from(sundays.unpaid_sundays),
        paid_holidays: f64::from(working_days_info.holidays),
        working_days_info,
        ..AttendanceSummary::default()
    };

    for (date, status) in latest_by_date(records, year, month) {
        if date.weekday() == Weekday::Sun || holiday_set.contains(&date) {
            continue;
        }
        let Some(kind) = classify(status) else {
            debug!(%date, status, "ignoring unknown attendance status");
            continue;
        };
        let record = latest[&date];
        match kind {
            DayKind::Office | DayKind::Late => {
                if kind == DayKind::Late || record.is_late {
                    summary.late_count += 1;
                }
                if is_second_saturday(year, month, date.day()) {
                    summary.second_saturday_count += 1.0;
                } else {
                    summary.office_days += 1.0;
                }
            }
            DayKind::Wfh => {
                if record.is_late {
                    summary.late_count += 1;
                }
                summary.wfh_days += 1.0;
            }
            DayKind::HalfDay => summary.half_day_count += 1.0,
            DayKind::Leave if record.paid.unwrap_or(true) => summary.paid_leave_days += 1.0,
            DayKind::Leave | DayKind::Unpaid => summary.unpaid_leave_days += 1.0,
        }
    }
    summary
}
