//! Multi-region rate chart rendered with `plotters`.
//!
//! Draws the weekly rate-per-100k line for each region over the report
//! window, shades the two fixed historical lockdown intervals, and saves a
//! PNG sized like the original artifact (8×4.5 in at 300 dpi).

use std::path::Path;

use casewatch_data::{RegionSeries, ReportWindow};
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

const CHART_WIDTH: u32 = 2400;
const CHART_HEIGHT: u32 = 1350;

/// Shading used for the lockdown intervals.
const LOCKDOWN_FILL: RGBColor = RGBColor(0xc1, 0xe7, 0xff);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid colour {0:?}: expected #rrggbb")]
    BadColor(String),
    #[error("chart rendering failed: {0}")]
    Draw(String),
}

/// One line on the chart: a series plus its display label and colour.
pub struct ChartSeries<'a> {
    pub label: &'a str,
    pub color: RGBColor,
    pub series: &'a RegionSeries,
}

impl<'a> ChartSeries<'a> {
    pub fn new(label: &'a str, color_hex: &str, series: &'a RegionSeries) -> Result<Self, ChartError> {
        Ok(Self {
            label,
            color: parse_hex_color(color_hex)?,
            series,
        })
    }
}

/// Parse `#rrggbb` into an [`RGBColor`].
pub fn parse_hex_color(s: &str) -> Result<RGBColor, ChartError> {
    let bad = || ChartError::BadColor(s.to_string());
    let hex = s.strip_prefix('#').ok_or_else(|| bad())?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(bad());
    }
    let byte = |range| u8::from_str_radix(&hex[range], 16).map_err(|_| bad());
    Ok(RGBColor(byte(0..2)?, byte(2..4)?, byte(4..6)?))
}

/// The two national lockdowns shown on every chart: start date + length.
fn lockdown_intervals() -> [(NaiveDate, Duration); 2] {
    let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid lockdown date");
    [
        (day(2020, 11, 5), Duration::days(28)),
        (day(2021, 1, 5), Duration::days(42)),
    ]
}

fn max_rate(serieses: &[ChartSeries<'_>], window: &ReportWindow) -> f64 {
    serieses
        .iter()
        .flat_map(|s| s.series.rate_points(window))
        .map(|(_, rate)| rate)
        .fold(0.0_f64, f64::max)
}

/// Render the chart to `path`.
pub fn render_chart(
    path: &Path,
    title: &str,
    serieses: &[ChartSeries<'_>],
    window: &ReportWindow,
) -> Result<(), ChartError> {
    let draw_err = |e: &dyn std::fmt::Display| ChartError::Draw(e.to_string());

    // Headroom above the highest rate so lines never touch the frame.
    let y_max = (max_rate(serieses, window) * 1.05).max(1.0);

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 48))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(90)
        .build_cartesian_2d(window.start..window.last_complete_day, 0.0..y_max)
        .map_err(|e| draw_err(&e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Weekly cases per 100,000 population")
        .x_label_formatter(&|d: &NaiveDate| d.format("%d %b").to_string())
        .label_style(("sans-serif", 28))
        .axis_desc_style(("sans-serif", 32))
        .draw()
        .map_err(|e| draw_err(&e))?;

    // Shade the lockdown intervals behind the series lines.
    for (i, (start, length)) in lockdown_intervals().iter().enumerate() {
        let end = (*start + *length).min(window.last_complete_day);
        if end <= window.start || *start >= window.last_complete_day {
            continue;
        }
        let start = (*start).max(window.start);
        let anno = chart
            .draw_series(std::iter::once(Rectangle::new(
                [(start, 0.0), (end, y_max)],
                LOCKDOWN_FILL.filled(),
            )))
            .map_err(|e| draw_err(&e))?;
        if i == 0 {
            anno.label("Lockdown")
                .legend(|(x, y)| Rectangle::new([(x, y - 8), (x + 16, y + 8)], LOCKDOWN_FILL.filled()));
        }
    }

    for s in serieses {
        let color = s.color;
        chart
            .draw_series(LineSeries::new(
                s.series.rate_points(window),
                color.stroke_width(5),
            ))
            .map_err(|e| draw_err(&e))?
            .label(s.label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(5))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 28))
        .draw()
        .map_err(|e| draw_err(&e))?;

    let note = format!(
        "Data up to {}. More recent data are incomplete and not included.",
        window.last_complete_day.format("%d %b")
    );
    let note_style = TextStyle::from(("sans-serif", 26))
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    root.draw(&Text::new(
        note,
        (CHART_WIDTH as i32 / 2, CHART_HEIGHT as i32 - 10),
        note_style,
    ))
    .map_err(|e| draw_err(&e))?;

    root.present().map_err(|e| draw_err(&e))?;
    tracing::info!(path = %path.display(), series = serieses.len(), "chart.saved");
    Ok(())
}
