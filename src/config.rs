//! Dashboard configuration.
//!
//! Loaded from the JSON file named by `RUSTY_BISTRO_CONFIG`, else from
//! `rusty-bistro.json` in the working directory if present. Every field has
//! a default, so a partial file is fine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV_VAR: &str = "RUSTY_BISTRO_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "rusty-bistro.json";

/// Bar direction for the ranked charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartOrientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// File opened at start-up.
    #[serde(default)]
    pub data_path: Option<PathBuf>,

    /// Columns never treated as categories even when 0/1-valued.
    #[serde(default = "default_excluded_columns")]
    pub excluded_columns: Vec<String>,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    #[serde(default = "default_min_sample_size")]
    pub default_min_sample_size: usize,

    #[serde(default)]
    pub chart_orientation: ChartOrientation,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            excluded_columns: default_excluded_columns(),
            default_top_n: default_top_n(),
            default_min_sample_size: default_min_sample_size(),
            chart_orientation: ChartOrientation::default(),
        }
    }
}

fn default_excluded_columns() -> Vec<String> {
    [
        "business_id",
        "name",
        "address",
        "city",
        "state",
        "postal_code",
        "latitude",
        "longitude",
        "stars",
        "review_count",
        "is_open",
        "attributes",
        "categories",
        "hours",
        // Present on nearly every row; not a cuisine.
        "Restaurants",
        "Food",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_top_n() -> usize {
    10
}

fn default_min_sample_size() -> usize {
    5
}

impl DashboardConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the config location and load it; defaults when none exists.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(local);
        }
        Ok(Self::default())
    }
}
