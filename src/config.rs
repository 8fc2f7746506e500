// src/config.rs

use anyhow::{Context, Result};
use chrono::Datelike;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

use crate::fetch::STATBANK_API;
use crate::model::{ForecastOptions, LineFit};

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "DSTSTAT_CONFIG";

/// Every tunable of a report run. Missing YAML keys fall back to [`Config::default`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
    /// First year requested from the API.
    pub first_year: i32,
    /// Upper bound handed to the table loaders; defaults to last calendar year.
    pub current_year: i32,
    /// Category the last-year summary compares against.
    pub reference: String,
    pub rolling_window: usize,
    /// Year rebased to 100; `None` means the table's first year.
    pub index_base_year: Option<i32>,
    /// Forecast horizons, in years, rendered one after another.
    pub horizons: Vec<usize>,
    pub clip_min: Option<f64>,
    pub line_fit: LineFit,
    pub poly_degree: usize,
    /// Number of trailing years echoed before the charts.
    pub preview_rows: usize,
    pub bar_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: STATBANK_API.to_string(),
            request_timeout_secs: 30,
            first_year: 2015,
            current_year: chrono::Local::now().year() - 1,
            reference: "DANSK".into(),
            rolling_window: 3,
            index_base_year: None,
            horizons: vec![10, 5],
            clip_min: Some(0.0),
            line_fit: LineFit::ClosedForm,
            poly_degree: 2,
            preview_rows: 5,
            bar_width: 40,
        }
    }
}

impl Config {
    /// Parse a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing YAML config")
    }

    /// Read a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Use `path` if given, else `$DSTSTAT_CONFIG` if set, else the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(p) => {
                info!(path = %p.display(), "loading config");
                Self::from_file(&p)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn forecast_options(&self, horizon: usize) -> ForecastOptions {
        ForecastOptions {
            horizon,
            clip_min: self.clip_min,
        }
    }
}
