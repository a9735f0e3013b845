use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::processor::FilterSpec;

/// Environment variable naming the config file for the binaries.
pub const CONFIG_ENV: &str = "HOTEL_INSIGHTS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "src/configs/dashboard.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub filters: FilterSpec,
    #[serde(default)]
    pub charts: ChartSection,
    #[serde(default)]
    pub export: ExportSection,
}

/// Where the listings come from and how to decode them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub default_path: String,
    /// Tried in order for path loads.
    pub encodings: Vec<String>,
    /// Lossy single-pass decoding for uploads.
    pub upload_encoding: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSection {
    pub top_n: usize,
    pub histogram_bins: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub file_name: String,
}

impl DashboardConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dashboard config file: {}", path))?;

        let config: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse dashboard config file: {}", path))?;

        Ok(config)
    }

    /// Reads `path` if it exists, otherwise falls back to defaults.
    pub fn from_file_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!("Config file not found: {}, using defaults", path);
            Ok(Self::default())
        }
    }
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            default_path: "data/Worlds Best 50 Hotels.csv".to_string(),
            encodings: vec![
                "latin-1".to_string(),
                "cp1252".to_string(),
                "utf-8".to_string(),
            ],
            upload_encoding: "latin-1".to_string(),
        }
    }
}

impl Default for ChartSection {
    fn default() -> Self {
        Self {
            top_n: 10,
            histogram_bins: 20,
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            file_name: "hotels_filtered.csv".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.data.encodings, vec!["latin-1", "cp1252", "utf-8"]);
        assert_eq!(config.data.upload_encoding, "latin-1");
        assert_eq!(config.charts.top_n, 10);
        assert_eq!(config.charts.histogram_bins, 20);
        assert_eq!(config.export.file_name, "hotels_filtered.csv");
        assert!(config.filters.locations.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[filters]
locations = ["Venice", "Bangkok"]
rate_range = [1900.0, 2500.0]
name_query = "aman"

[charts]
top_n = 5
"#
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.filters.locations.len(), 2);
        assert_eq!(config.filters.rate_range, Some((1900.0, 2500.0)));
        assert_eq!(config.filters.name_query.as_deref(), Some("aman"));
        assert_eq!(config.charts.top_n, 5);
        assert_eq!(config.charts.histogram_bins, 20);
        assert_eq!(config.data.upload_encoding, "latin-1");
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/src/configs/dashboard.toml");
        let config = DashboardConfig::from_file(path).unwrap();
        assert_eq!(config.data.default_path, "data/Worlds Best 50 Hotels.csv");
        assert_eq!(config.filters.rate_range, None);
        assert_eq!(config.export.file_name, "hotels_filtered.csv");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = DashboardConfig::from_file_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config.charts.top_n, 10);
        assert!(DashboardConfig::from_file("does/not/exist.toml").is_err());
    }
}
