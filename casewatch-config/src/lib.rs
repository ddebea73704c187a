//! Loader for the bot's configuration with YAML + environment overlays.
//!
//! The file (conventionally `casewatch.yaml`) declares the upstream API
//! base URL, the chart output settings, the posting credentials, and one
//! entry per region. `CASEWATCH_`-prefixed environment variables override
//! file values, and `${VAR}` placeholders inside values are expanded so
//! credentials can live in the environment rather than on disk.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct CasewatchConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chart: ChartSettings,
    pub twitter: TwitterCredentials,
    pub regions: Vec<RegionSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartSettings {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_chart_title")]
    pub title: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            title: default_chart_title(),
        }
    }
}

/// The four long-lived credential strings the posting API needs,
/// provisioned out-of-band.
#[derive(Debug, Deserialize)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_key_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

/// One region: display label and chart colour plus the upstream request
/// descriptor (filter expression, requested structure, population).
#[derive(Debug, Deserialize)]
pub struct RegionSpec {
    pub label: String,
    /// Hex line colour for the chart, e.g. `"#bc5090"`.
    pub color: String,
    pub filter: String,
    /// Output key → upstream field path, arbitrarily nested; sent to the
    /// API as a JSON-encoded `structure` query parameter.
    pub structure: Value,
    pub population: u64,
}

fn default_base_url() -> String {
    "https://api.coronavirus.data.gov.uk".into()
}
fn default_output_path() -> String {
    "graph.png".into()
}
fn default_chart_title() -> String {
    "COVID-19 rates in Hull and East Yorkshire".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct CasewatchConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CasewatchConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CasewatchConfigLoader {
    /// Start with the defaults: `CASEWATCH_` env overrides layered over
    /// whatever file or inline snippets are attached afterwards.
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("CASEWATCH").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by
    /// suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge the sources, expand `${VAR}` placeholders, and deserialize
    /// into the strongly typed config.
    pub fn load(self) -> Result<CasewatchConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: CasewatchConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("AREA", Some("Hull")), ("KIND", Some("utla"))], || {
            let mut v = json!([
                "areaName=$AREA",
                { "filter": "areaType=${KIND};areaName=${AREA}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!([
                    "areaName=Hull",
                    { "filter": "areaType=utla;areaName=Hull" },
                    42,
                    true,
                    null
                ])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles_and_leaves_value_reasonable() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // Only that the depth cap terminates the loop matters here.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }
}
