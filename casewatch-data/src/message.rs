//! Plain-text status message composition.
//!
//! One block per region with report columns, covering the day before the
//! last complete day: reported cases with a day-over-day delta, cumulative
//! deaths, and the daily death count. A missing row aborts composition —
//! a partial message would misrepresent the data.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::series::RegionSeries;
use crate::window::ReportWindow;

pub const DATA_ATTRIBUTION: &str = "All data from: https://coronavirus.data.gov.uk/";

#[derive(Debug, Error)]
#[error("series for {region} has no usable row for {date}")]
pub struct MissingRowError {
    pub region: String,
    pub date: NaiveDate,
}

/// Render a delta with an explicit sign: non-negative values get a leading
/// `+` (zero is `+0`), negatives keep the native minus.
pub fn sign(num: i64) -> String {
    if num >= 0 {
        format!("+{num}")
    } else {
        num.to_string()
    }
}

/// The two-line body for one region:
///
/// ```text
/// Cases reported on 14 Mar: 50 (+10 from 13 Mar)
/// Total deaths: 200 (+2 from 13 Mar).
/// ```
pub fn region_summary(
    label: &str,
    series: &RegionSeries,
    window: &ReportWindow,
) -> Result<String, MissingRowError> {
    let day = window.last_complete_day - Duration::days(1);
    let prev = day - Duration::days(1);
    let missing = |date: NaiveDate| MissingRowError {
        region: label.to_string(),
        date,
    };

    let row = series.row(day).ok_or_else(|| missing(day))?;
    let prev_row = series.row(prev).ok_or_else(|| missing(prev))?;

    // Rows without report columns cannot be summarised either.
    let day_cases = row.reported_cases.ok_or_else(|| missing(day))?;
    let prev_cases = prev_row.reported_cases.ok_or_else(|| missing(prev))?;
    let cum_deaths = row.cumulative_deaths.ok_or_else(|| missing(day))?;
    let day_deaths = row.daily_deaths.ok_or_else(|| missing(day))?;

    let day_str = day.format("%d %b");
    let prev_str = prev.format("%d %b");
    Ok(format!(
        "Cases reported on {day_str}: {day_cases} ({} from {prev_str})\n\
         Total deaths: {cum_deaths} ({} from {prev_str}).\n",
        sign(day_cases - prev_cases),
        sign(day_deaths),
    ))
}

/// The full post text: one labelled block per region that carries report
/// columns, then the data attribution footer. Regions without report
/// columns (the national overview) appear on the chart only.
pub fn compose_message(
    regions: &[(&str, &RegionSeries)],
    window: &ReportWindow,
) -> Result<String, MissingRowError> {
    let mut text = String::new();
    for (label, series) in regions {
        if !series.has_report_columns() {
            continue;
        }
        text.push_str(&format!(
            "{label}:\n{}\n",
            region_summary(label, series, window)?
        ));
    }
    text.push_str(DATA_ATTRIBUTION);
    Ok(text)
}
