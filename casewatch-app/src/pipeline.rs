//! One run of the fetch → derive → render → publish cycle.

use std::path::Path;

use anyhow::{Context, Result};
use casewatch_chart::{render_chart, ChartSeries};
use casewatch_config::{CasewatchConfig, RegionSpec};
use casewatch_data::{compose_message, RegionQuery, RegionSeries, ReportWindow, StatsApi};
use casewatch_social::{OauthCredentials, TwitterApi};
use chrono::Local;
use futures::future::try_join_all;

pub async fn run(cfg: CasewatchConfig, dry_run: bool) -> Result<()> {
    let window = ReportWindow::from_today(Local::now().date_naive());
    tracing::info!(
        start = %window.start,
        last_complete_day = %window.last_complete_day,
        "report window"
    );

    let api = StatsApi::new(&cfg.api.base_url).context("construct statistics client")?;

    // The region fetches have no data dependency on each other, but the
    // chart and the message need every region, so join them all before
    // building anything.
    let fetched = try_join_all(cfg.regions.iter().map(|spec| {
        let api = api.clone();
        async move {
            let query =
                RegionQuery::new(&spec.filter, spec.structure.clone(), spec.population);
            api.fetch_region(&query).await
        }
    }))
    .await
    .context("fetch upstream statistics")?;

    let mut serieses: Vec<(&RegionSpec, RegionSeries)> = Vec::with_capacity(fetched.len());
    for (spec, records) in cfg.regions.iter().zip(fetched) {
        let series = RegionSeries::build(&records, spec.population)
            .with_context(|| format!("build series for {}", spec.label))?;
        tracing::info!(
            region = %spec.label,
            rows = series.len(),
            report_columns = series.has_report_columns(),
            "series built"
        );
        serieses.push((spec, series));
    }

    let chart_path = Path::new(&cfg.chart.output_path);
    let chart_serieses: Vec<ChartSeries<'_>> = serieses
        .iter()
        .map(|(spec, series)| ChartSeries::new(&spec.label, &spec.color, series))
        .collect::<Result<_, _>>()
        .context("prepare chart series")?;
    render_chart(chart_path, &cfg.chart.title, &chart_serieses, &window)
        .context("render chart")?;

    let labelled: Vec<(&str, &RegionSeries)> = serieses
        .iter()
        .map(|(spec, series)| (spec.label.as_str(), series))
        .collect();
    let text = compose_message(&labelled, &window).context("compose message")?;
    tracing::info!(chars = text.len(), "message composed");

    if dry_run {
        tracing::info!("dry run, skipping publish");
        println!("{text}");
        return Ok(());
    }

    let twitter = TwitterApi::new(OauthCredentials {
        consumer_key: cfg.twitter.consumer_key,
        consumer_key_secret: cfg.twitter.consumer_key_secret,
        access_token: cfg.twitter.access_token,
        access_token_secret: cfg.twitter.access_token_secret,
    })?;

    // A run that cannot authenticate must not attempt the upload or post.
    twitter
        .verify_credentials()
        .await
        .context("verify posting credentials")?;

    let media = twitter.upload_media(chart_path).await.context("upload chart")?;
    twitter
        .post_status(&text, &[&media.media_id_string])
        .await
        .context("post status")?;

    Ok(())
}
