//! Calendar arithmetic and the Sunday pay rule.
//!
//! All functions here are total: invalid months yield zero-sized
//! results and malformed date strings are skipped rather than
//! reported.

use crate::models::{AttendanceRecord, WorkingDaysInfo};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Statuses that count towards the weekly leave total.
pub const LEAVE_STATUSES: [&str; 5] = ["leave", "absent", "lop", "lwp", "loss_of_pay"];

/// A week with more leave days than this loses its Sunday pay.
pub const MAX_LEAVES_FOR_PAID_SUNDAY: u32 = 2;

/// Number of days in `month` of `year`, or 0 for an invalid month.
pub fn calendar_days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map(|n| (n - first).num_days() as u32).unwrap_or(0)
}

/// Iterates over every date of the month.
pub fn days_of_month(year: i32, month: u32) -> impl Iterator<Item = NaiveDate> {
    (1..=calendar_days_in_month(year, month))
        .filter_map(move |day| NaiveDate::from_ymd_opt(year, month, day))
}

/// Parses holiday date strings, dropping the ones that are not valid
/// `YYYY-MM-DD` dates.
pub fn parse_holidays<S: AsRef<str>>(holidays: &[S]) -> HashSet<NaiveDate> {
    holidays
        .iter()
        .filter_map(|h| {
            let raw = h.as_ref().trim();
            let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
            if parsed.is_none() {
                warn!(holiday = raw, "ignoring malformed holiday date");
            }
            parsed
        })
        .collect()
}

/// Calendar, Sunday, holiday and working day counts of a month.
///
/// A holiday falling on a Sunday is counted as a Sunday only.
/// Holidays outside the month and malformed holiday strings are
/// ignored.
pub fn working_days_in_month<S: AsRef<str>>(year: i32, month: u32, holidays: &[S]) -> WorkingDaysInfo {
    let holiday_set = parse_holidays(holidays);
    let mut info = WorkingDaysInfo {
        calendar_days: calendar_days_in_month(year, month),
        ..WorkingDaysInfo::default()
    };
    for date in days_of_month(year, month) {
        if date.weekday() == Weekday::Sun {
            info.sundays += 1;
        } else if holiday_set.contains(&date) {
            info.holidays += 1;
        }
    }
    info.working_days = info.calendar_days - info.sundays - info.holidays;
    info
}

/// True iff the date is the second Saturday of its month.  Invalid
/// dates are never second Saturdays.
pub fn is_second_saturday(year: i32, month: u32, day: u32) -> bool {
    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        return false;
    };
    if date.weekday() != Weekday::Sat {
        return false;
    }
    let saturdays = (1..=day)
        .filter_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .filter(|d| d.weekday() == Weekday::Sat)
        .count();
    saturdays == 2
}

/// Whether an attendance status counts as a leave day for the Sunday
/// pay rule.  Only the exact lowercase strings of [`LEAVE_STATUSES`]
/// match.
pub fn is_leave_status(status: &str) -> bool {
    LEAVE_STATUSES.contains(&status)
}

/// Outcome of the Sunday pay rule for a single week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBreakdown {
    pub sunday_date: NaiveDate,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub leaves_in_week: u32,
    pub sunday_paid: bool,
}

/// Paid and unpaid Sundays of a month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SundayPayStatus {
    pub paid_sundays: u32,
    pub unpaid_sundays: u32,
    pub total_sundays: u32,
    pub weekly_breakdown: Vec<WeekBreakdown>,
}

/// Applies the Sunday pay rule to a month of attendance.
///
/// Each Sunday closes a Monday to Sunday week, clipped to the first of
/// the month.  If more than [`MAX_LEAVES_FOR_PAID_SUNDAY`] days of that
/// window carry a leave status the Sunday is unpaid, otherwise it is
/// paid.  A date recorded more than once is counted once, using its
/// last record.
pub fn calculate_sunday_pay_status(records: &[AttendanceRecord], year: i32, month: u32) -> SundayPayStatus {
    let leave_days: HashSet<NaiveDate> = latest_by_date(records, year, month)
        .into_iter()
        .filter(|(_, status)| is_leave_status(status))
        .map(|(date, _)| date)
        .collect();

    let mut result = SundayPayStatus::default();
    let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return result;
    };

    for sunday in days_of_month(year, month).filter(|d| d.weekday() == Weekday::Sun) {
        let week_start = (sunday - Duration::days(6)).max(month_start);
        let leaves_in_week = leave_days
            .iter()
            .filter(|d| **d >= week_start && **d <= sunday)
            .count() as u32;
        let sunday_paid = leaves_in_week <= MAX_LEAVES_FOR_PAID_SUNDAY;

        if sunday_paid {
            result.paid_sundays += 1;
        } else {
            result.unpaid_sundays += 1;
        }
        result.total_sundays += 1;
        result.weekly_breakdown.push(WeekBreakdown {
            sunday_date: sunday,
            week_start,
            week_end: sunday,
            leaves_in_week,
            sunday_paid,
        });
    }
    result
}

/// The last status recorded for each date of the month, in date order.
pub(crate) fn latest_by_date(records: &[AttendanceRecord], year: i32, month: u32) -> Vec<(NaiveDate, &str)> {
    let mut by_date = std::collections::BTreeMap::new();
    for record in records {
        match record.parsed_date() {
            Some(date) if date.year() == year && date.month() == month => {
                by_date.insert(date, record.status.as_str());
            }
            Some(_) => {}
            None => warn!(date = %record.date, "ignoring attendance record with malformed date"),
        }
    }
    by_date.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, status: &str) -> AttendanceRecord {
        AttendanceRecord::new(date, status)
    }

    #[test]
    fn test_calendar_days_in_month() {
        assert_eq!(calendar_days_in_month(2024, 1), 31);
        assert_eq!(calendar_days_in_month(2024, 2), 29);
        assert_eq!(calendar_days_in_month(2023, 2), 28);
        assert_eq!(calendar_days_in_month(2024, 4), 30);
        assert_eq!(calendar_days_in_month(2024, 12), 31);
        assert_eq!(calendar_days_in_month(2024, 13), 0);
    }

    #[test]
    fn test_working_days_without_holidays() {
        // June 2024 starts on a Saturday: Sundays are 2, 9, 16, 23, 30.
        let info = working_days_in_month::<&str>(2024, 6, &[]);
        assert_eq!(
            info,
            WorkingDaysInfo {
                calendar_days: 30,
                sundays: 5,
                holidays: 0,
                working_days: 25,
            }
        );
    }

    #[test]
    fn test_holiday_on_sunday_not_double_counted() {
        let holidays = ["2024-06-09", "2024-06-17", "2024-06-17", "2024-07-01", "not-a-date", "2024-06-31"];
        let info = working_days_in_month(2024, 6, &holidays);
        assert_eq!(info.sundays, 5);
        assert_eq!(info.holidays, 1);
        assert_eq!(info.working_days, 24);
    }

    #[test]
    fn test_is_second_saturday() {
        // June 2024 Saturdays: 1, 8, 15, 22, 29.
        assert!(!is_second_saturday(2024, 6, 1));
        assert!(is_second_saturday(2024, 6, 8));
        assert!(!is_second_saturday(2024, 6, 15));
        assert!(!is_second_saturday(2024, 6, 9));
        assert!(!is_second_saturday(2024, 6, 31));
    }

    #[test]
    fn test_two_leaves_keep_sunday_paid() {
        // Week of Monday 2024-06-10 to Sunday 2024-06-16.
        let records = vec![record("2024-06-11", "leave"), record("2024-06-12", "absent")];
        let status = calculate_sunday_pay_status(&records, 2024, 6);
        assert_eq!(status.total_sundays, 5);
        assert_eq!(status.paid_sundays, 5);
        assert_eq!(status.unpaid_sundays, 0);
        let week = &status.weekly_breakdown[2];
        assert_eq!(week.sunday_date, NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
        assert_eq!(week.leaves_in_week, 2);
        assert!(week.sunday_paid);
    }

    #[test]
    fn test_three_leaves_make_sunday_unpaid() {
        let records = vec![
            record("2024-06-11", "leave"),
            record("2024-06-12", "lop"),
            record("2024-06-13", "loss_of_pay"),
            record("2024-06-14", "present"),
        ];
        let status = calculate_sunday_pay_status(&records, 2024, 6);
        assert_eq!(status.paid_sundays, 4);
        assert_eq!(status.unpaid_sundays, 1);
        assert!(!status.weekly_breakdown[2].sunday_paid);
        assert_eq!(status.weekly_breakdown[2].leaves_in_week, 3);
    }

    #[test]
    fn test_status_match_is_exact() {
        let records = vec![
            record("2024-06-11", "Leave"),
            record("2024-06-12", "ABSENT"),
            record("2024-06-13", " lop "),
        ];
        let status = calculate_sunday_pay_status(&records, 2024, 6);
        assert_eq!(status.weekly_breakdown[2].leaves_in_week, 0);
        assert!(status.weekly_breakdown[2].sunday_paid);
        assert_eq!(status.unpaid_sundays, 0);
        assert!(!is_leave_status("Leave"));
        assert!(is_leave_status("leave"));
    }

    #[test]
    fn test_first_week_is_clipped_to_month_start() {
        // 2024-05-29..31 fall in the week ending Sunday 2024-06-02 but
        // belong to May and must not count.
        let records = vec![
            record("2024-05-29", "leave"),
            record("2024-05-30", "leave"),
            record("2024-05-31", "leave"),
            record("2024-06-01", "lwp"),
        ];
        let status = calculate_sunday_pay_status(&records, 2024, 6);
        let first = &status.weekly_breakdown[0];
        assert_eq!(first.week_start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(first.leaves_in_week, 1);
        assert!(first.sunday_paid);
        assert_eq!(status.paid_sundays + status.unpaid_sundays, status.total_sundays);
    }

    #[test]
    fn test_duplicate_dates_count_once() {
        let records = vec![
            record("2024-06-11", "leave"),
            record("2024-06-11", "leave"),
            record("2024-06-12", "leave"),
            record("2024-06-13", "leave"),
            record("2024-06-13", "present"),
            record("garbage", "leave"),
        ];
        let status = calculate_sunday_pay_status(&records, 2024, 6);
        assert_eq!(status.weekly_breakdown[2].leaves_in_week, 2);
        assert_eq!(status.unpaid_sundays, 0);
    }
}
