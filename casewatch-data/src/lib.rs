//! Core data pipeline: region descriptors, the upstream fetcher, series
//! derivation, report-window selection, and message composition.
//!
//! The flow is `RegionQuery` → [`fetch::StatsApi`] → [`series::RegionSeries`]
//! → `{chart, message}`. Everything in here is pure apart from the fetcher;
//! the window and composer take their dates as arguments so runs are
//! reproducible in tests.

pub mod fetch;
pub mod message;
pub mod region;
pub mod series;
pub mod window;

pub use fetch::{RawRecord, StatsApi, UpstreamError};
pub use message::{compose_message, region_summary, MissingRowError};
pub use region::RegionQuery;
pub use series::{MalformedRecordError, RegionSeries, SeriesRow};
pub use window::ReportWindow;
