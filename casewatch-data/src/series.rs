//! Derivation of the per-region time series from raw upstream records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::fetch::RawRecord;
use crate::window::ReportWindow;

const WEEK: usize = 7;
const RATE_BASIS: f64 = 100_000.0;

#[derive(Debug, Error)]
pub enum MalformedRecordError {
    #[error("unparseable date {value:?} in upstream record")]
    BadDate { value: String },
    #[error("record for {date} is missing required field {field}")]
    MissingField { date: String, field: &'static str },
}

/// One derived row. `weekly_sum` and `weekly_rate` are `None` for the first
/// six rows of a series, where a full trailing week does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub date: NaiveDate,
    pub daily_cases: i64,
    pub reported_cases: Option<i64>,
    pub daily_deaths: Option<i64>,
    pub cumulative_deaths: Option<i64>,
    pub weekly_sum: Option<i64>,
    pub weekly_rate: Option<f64>,
}

/// Ordered-by-date series for one region, built once per run.
#[derive(Debug, Clone)]
pub struct RegionSeries {
    population: u64,
    has_report_columns: bool,
    rows: BTreeMap<NaiveDate, SeriesRow>,
}

impl RegionSeries {
    /// Build the series from raw records and a population count.
    ///
    /// Records may arrive in any order (the upstream API serves newest
    /// first); rows are keyed ascending by date. The report columns
    /// (reported cases, daily deaths, cumulative deaths) are extracted for
    /// the whole series iff they are present on the first record received —
    /// the upstream response shape is dictated by the requested structure,
    /// so a region either has them on every record or on none.
    pub fn build(records: &[RawRecord], population: u64) -> Result<Self, MalformedRecordError> {
        let has_report_columns = records
            .first()
            .is_some_and(|r| r.reported_cases.is_some());

        let mut rows: Vec<SeriesRow> = Vec::with_capacity(records.len());
        for rec in records {
            let missing = |field| MalformedRecordError::MissingField {
                date: rec.date.clone(),
                field,
            };
            let date = NaiveDate::parse_from_str(&rec.date, "%Y-%m-%d").map_err(|_| {
                MalformedRecordError::BadDate {
                    value: rec.date.clone(),
                }
            })?;
            let daily_cases = rec.daily_cases.ok_or_else(|| missing("DailyCasesSpecimen"))?;

            let (reported_cases, daily_deaths, cumulative_deaths) = if has_report_columns {
                (
                    Some(rec.reported_cases.ok_or_else(|| missing("DailyCasesReported"))?),
                    Some(rec.daily_deaths.ok_or_else(|| missing("DailyDeaths"))?),
                    Some(
                        rec.cumulative_deaths
                            .ok_or_else(|| missing("CumulativeDeaths"))?,
                    ),
                )
            } else {
                (None, None, None)
            };

            rows.push(SeriesRow {
                date,
                daily_cases,
                reported_cases,
                daily_deaths,
                cumulative_deaths,
                weekly_sum: None,
                weekly_rate: None,
            });
        }

        rows.sort_by_key(|r| r.date);

        // Trailing 7-day sum over ascending index positions:
        // sum[i] = daily[i-6] + … + daily[i], undefined for i < 6.
        let daily: Vec<i64> = rows.iter().map(|r| r.daily_cases).collect();
        let mut window_sum: i64 = 0;
        for i in 0..rows.len() {
            window_sum += daily[i];
            if i >= WEEK {
                window_sum -= daily[i - WEEK];
            }
            if i >= WEEK - 1 {
                rows[i].weekly_sum = Some(window_sum);
                rows[i].weekly_rate = Some(window_sum as f64 / population as f64 * RATE_BASIS);
            }
        }

        Ok(Self {
            population,
            has_report_columns,
            rows: rows.into_iter().map(|r| (r.date, r)).collect(),
        })
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    /// Whether the report columns were present on the first record and were
    /// therefore extracted for every row.
    pub fn has_report_columns(&self) -> bool {
        self.has_report_columns
    }

    pub fn row(&self, date: NaiveDate) -> Option<&SeriesRow> {
        self.rows.get(&date)
    }

    pub fn rows(&self) -> impl Iterator<Item = &SeriesRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(date, rate)` points inside the report window, for charting. Rows
    /// without a defined rate are skipped.
    pub fn rate_points(&self, window: &ReportWindow) -> Vec<(NaiveDate, f64)> {
        self.rows
            .range(window.start..=window.last_complete_day)
            .filter_map(|(date, row)| row.weekly_rate.map(|rate| (*date, rate)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, daily: i64) -> RawRecord {
        RawRecord {
            date: date.into(),
            area: None,
            daily_cases: Some(daily),
            reported_cases: None,
            daily_deaths: None,
            cumulative_deaths: None,
        }
    }

    fn full_record(date: &str, daily: i64, reported: i64, deaths: i64, cum: i64) -> RawRecord {
        RawRecord {
            reported_cases: Some(reported),
            daily_deaths: Some(deaths),
            cumulative_deaths: Some(cum),
            ..record(date, daily)
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn trailing_sum_undefined_before_seven_rows() {
        let records: Vec<RawRecord> = (1..=10)
            .map(|day| record(&format!("2021-01-{day:02}"), day))
            .collect();
        let series = RegionSeries::build(&records, 1000).unwrap();

        for (i, row) in series.rows().enumerate() {
            if i < 6 {
                assert_eq!(row.weekly_sum, None, "row {i} should be undefined");
                assert_eq!(row.weekly_rate, None);
            } else {
                // daily counts are 1..=10, so the window sum is arithmetic
                let expected: i64 = ((i as i64 - 5)..=(i as i64 + 1)).sum();
                assert_eq!(row.weekly_sum, Some(expected));
            }
        }
    }

    #[test]
    fn rate_is_sum_over_population_times_basis() {
        let records: Vec<RawRecord> = (1..=9)
            .map(|day| record(&format!("2021-02-{day:02}"), 14))
            .collect();
        let series = RegionSeries::build(&records, 341_173).unwrap();
        let last = series.row(d("2021-02-09")).unwrap();
        assert_eq!(last.weekly_sum, Some(98));
        assert_eq!(last.weekly_rate, Some(98.0 / 341_173.0 * 100_000.0));
    }

    #[test]
    fn step_change_sums_to_one_hundred() {
        // Seven days at 10 then three at 20: final window = 10*4 + 20*3.
        let counts = [10, 10, 10, 10, 10, 10, 10, 20, 20, 20];
        let records: Vec<RawRecord> = counts
            .iter()
            .enumerate()
            .map(|(i, c)| record(&format!("2021-01-{:02}", i + 1), *c))
            .collect();
        let series = RegionSeries::build(&records, 100_000).unwrap();
        let last = series.row(d("2021-01-10")).unwrap();
        assert_eq!(last.weekly_sum, Some(100));
        assert_eq!(last.weekly_rate, Some(100.0));
    }

    #[test]
    fn accepts_newest_first_input_order() {
        let mut records: Vec<RawRecord> = (1..=8)
            .map(|day| record(&format!("2021-03-{day:02}"), day))
            .collect();
        records.reverse();
        let series = RegionSeries::build(&records, 1000).unwrap();
        let dates: Vec<NaiveDate> = series.rows().map(|r| r.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(series.row(d("2021-03-08")).unwrap().weekly_sum, Some(35));
    }

    #[test]
    fn first_record_without_reported_cases_drops_report_columns_everywhere() {
        let mut records = vec![record("2021-01-01", 5)];
        records.extend((2..=8).map(|day| full_record(&format!("2021-01-{day:02}"), 5, 6, 1, day)));
        let series = RegionSeries::build(&records, 1000).unwrap();

        assert!(!series.has_report_columns());
        for row in series.rows() {
            assert_eq!(row.reported_cases, None);
            assert_eq!(row.daily_deaths, None);
            assert_eq!(row.cumulative_deaths, None);
        }
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let records = vec![record("2021-01-01", 1), record("not-a-date", 2)];
        let err = RegionSeries::build(&records, 1000).unwrap_err();
        assert!(matches!(err, MalformedRecordError::BadDate { value } if value == "not-a-date"));
    }

    #[test]
    fn null_daily_cases_is_a_missing_required_field() {
        let mut bad = record("2021-01-02", 0);
        bad.daily_cases = None;
        let records = vec![record("2021-01-01", 1), bad];
        let err = RegionSeries::build(&records, 1000).unwrap_err();
        assert!(matches!(
            err,
            MalformedRecordError::MissingField { field: "DailyCasesSpecimen", .. }
        ));
    }

    #[test]
    fn report_column_missing_mid_series_is_rejected() {
        let mut records = vec![full_record("2021-01-01", 5, 6, 1, 10)];
        let mut bad = full_record("2021-01-02", 5, 6, 1, 11);
        bad.daily_deaths = None;
        records.push(bad);
        let err = RegionSeries::build(&records, 1000).unwrap_err();
        assert!(matches!(
            err,
            MalformedRecordError::MissingField { field: "DailyDeaths", .. }
        ));
    }

    #[test]
    fn rate_points_respect_the_window() {
        let records: Vec<RawRecord> = (1..=20)
            .map(|day| record(&format!("2021-01-{day:02}"), 7))
            .collect();
        let series = RegionSeries::build(&records, 7000).unwrap();
        let window = ReportWindow {
            start: d("2021-01-10"),
            last_complete_day: d("2021-01-15"),
        };
        let points = series.rate_points(&window);
        assert_eq!(points.first().unwrap().0, d("2021-01-10"));
        assert_eq!(points.last().unwrap().0, d("2021-01-15"));
        assert!(points.iter().all(|(_, rate)| *rate == 49.0 / 7000.0 * 100_000.0));
    }
}
