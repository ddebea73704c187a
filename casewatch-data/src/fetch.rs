//! One blocking-style GET per region against the UK government COVID API.
//!
//! The API takes two query parameters: `filters` (a filter expression such
//! as `areaType=utla;areaName=Kingston upon Hull, City of`) and `structure`
//! (a JSON-encoded mapping describing the desired response shape). The
//! response is `{"data": [record, …]}`, newest date first.

use std::borrow::Cow;

use casewatch_http::{HttpClient, HttpError, RequestOpts};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use thiserror::Error;

use crate::region::RegionQuery;

pub const DEFAULT_BASE_URL: &str = "https://api.coronavirus.data.gov.uk";

const ACCEPT_VALUE: &str = "application/json; application/xml; text/csv; \
     application/vnd.PHE-COVID19.v1+json; application/vnd.PHE-COVID19.v1+xml";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("statistics request failed: {0}")]
    Http(#[from] HttpError),
    #[error("could not encode structure mapping: {0}")]
    Structure(#[from] serde_json::Error),
}

/// One upstream JSON object per date per region. Field names match the keys
/// we ask for in [`RegionQuery::structure`]; regions we only chart carry
/// case counts, regions we also summarise carry report and death fields.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Area", default)]
    pub area: Option<String>,
    #[serde(rename = "DailyCasesSpecimen", default)]
    pub daily_cases: Option<i64>,
    #[serde(rename = "DailyCasesReported", default)]
    pub reported_cases: Option<i64>,
    #[serde(rename = "DailyDeaths", default)]
    pub daily_deaths: Option<i64>,
    #[serde(rename = "CumulativeDeaths", default)]
    pub cumulative_deaths: Option<i64>,
}

#[derive(Clone)]
pub struct StatsApi {
    http: HttpClient,
}

impl StatsApi {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    /// Fetch the raw per-day records for one region. Non-2xx statuses and
    /// undecodable bodies both surface as [`UpstreamError`]; there is no
    /// partial-success mode.
    pub async fn fetch_region(&self, query: &RegionQuery) -> Result<Vec<RawRecord>, UpstreamError> {
        #[derive(Deserialize)]
        struct Envelope {
            data: Vec<RawRecord>,
        }

        let structure = serde_json::to_string(&query.structure)?;
        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("filters", Cow::Borrowed(query.filter.as_str())),
            ("structure", Cow::Owned(structure)),
        ];

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let envelope: Envelope = self
            .http
            .get_json(
                "v1/data",
                RequestOpts {
                    headers: Some(headers),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            filter = %query.filter,
            records = envelope.data.len(),
            "stats.fetch.done"
        );
        Ok(envelope.data)
    }
}
