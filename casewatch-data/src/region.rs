//! Static descriptors for the geographies we report on.

use serde::Deserialize;
use serde_json::Value;

/// One geography's data request: a server-side filter expression, the
/// requested output shape (output key → upstream field path, which may be
/// nested), and the population used to normalise rates.
///
/// Defined once at startup from configuration and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionQuery {
    pub filter: String,
    pub structure: Value,
    pub population: u64,
}

impl RegionQuery {
    pub fn new(filter: impl Into<String>, structure: Value, population: u64) -> Self {
        Self {
            filter: filter.into(),
            structure,
            population,
        }
    }
}
