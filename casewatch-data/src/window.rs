//! Selection of the date range eligible for display and reporting.

use chrono::{Duration, Months, NaiveDate};

/// How many days of the most recent data we treat as provisionally
/// incomplete. Upstream keeps revising counts for roughly this long.
const REPORTING_LAG_DAYS: i64 = 5;

/// How far back the chart looks.
const WINDOW_MONTHS: u32 = 3;

/// The valid plotting/reporting range: `last_complete_day` is today minus
/// the reporting lag, `start` is three calendar months before that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub last_complete_day: NaiveDate,
}

impl ReportWindow {
    /// Pure function of "today"; always succeeds.
    pub fn from_today(today: NaiveDate) -> Self {
        let last_complete_day = today - Duration::days(REPORTING_LAG_DAYS);
        let start = last_complete_day - Months::new(WINDOW_MONTHS);
        Self {
            start,
            last_complete_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn window_for_a_march_run() {
        let window = ReportWindow::from_today(d(2021, 3, 20));
        assert_eq!(window.last_complete_day, d(2021, 3, 15));
        assert_eq!(window.start, d(2020, 12, 15));
    }

    #[test]
    fn month_arithmetic_crosses_year_boundaries() {
        let window = ReportWindow::from_today(d(2021, 1, 6));
        assert_eq!(window.last_complete_day, d(2021, 1, 1));
        assert_eq!(window.start, d(2020, 10, 1));
    }
}
