use crate::app::page_config::PageConfig;
use crate::core::loader::{DEFAULT_DATA_URL, DEFAULT_TOLERANCE};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{HazardsError, Result};
use crate::utils::validation::{
    parse_iso_date, validate_non_empty_string, validate_one_of, validate_path, validate_range,
    validate_url, Validate,
};
use crate::visuals::maps::{MapOptions, ViewPreset};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// `map.since` value that disables the date cut-off.
pub const NO_CUTOFF: &str = "all";

pub const OUTPUT_FORMATS: [&str; 5] = ["csv", "json", "html", "geojson", "report"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardsConfig {
    pub app: PageConfig,
    pub source: SourceConfig,
    pub validation: ValidationConfig,
    pub map: MapConfig,
    pub load: LoadConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    /// Local archive or delimited file; takes precedence over `url`.
    pub path: Option<String>,
    pub member_extension: String,
    pub delimiter: String,
    pub timeout_seconds: Option<u64>,
    pub cache_dir: String,
    pub disk_cache: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATA_URL.to_string(),
            path: None,
            member_extension: "txt".to_string(),
            delimiter: ",".to_string(),
            timeout_seconds: Some(300),
            cache_dir: "./.cache/hazards".to_string(),
            disk_cache: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub enabled: bool,
    pub tolerance: f64,
    pub fail_on_unhealthy: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tolerance: DEFAULT_TOLERANCE,
            fail_on_unhealthy: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub view: String,
    /// Show fires reported on or after this `YYYY-MM-DD` date.
    pub since: Option<String>,
    pub color_by_year: bool,
    pub size_by_area: bool,
    pub alpha: u8,
    pub min_display_radius: f64,
    pub max_display_radius: f64,
    pub default_radius: f64,
    pub preview_rows: usize,
    pub zoom_start: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            view: "canada".to_string(),
            since: Some("2020-01-01".to_string()),
            color_by_year: false,
            size_by_area: true,
            alpha: 140,
            min_display_radius: 300.0,
            max_display_radius: 5000.0,
            default_radius: 2000.0,
            preview_rows: 5,
            zoom_start: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            output_formats: OUTPUT_FORMATS.iter().map(|f| f.to_string()).collect(),
            compression: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// `compact` (default) or `json`
    pub log_format: Option<String>,
}

impl HazardsConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left untouched.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HazardsError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        match &self.source.path {
            Some(path) => validate_path("source.path", path)?,
            None if self.source.url.trim().is_empty() => {
                return Err(HazardsError::MissingConfigError {
                    field: "source.url".to_string(),
                });
            }
            None => validate_url("source.url", &self.source.url)?,
        }

        validate_non_empty_string("source.member_extension", &self.source.member_extension)?;
        if self.source.delimiter.len() != 1 {
            return Err(HazardsError::InvalidConfigValueError {
                field: "source.delimiter".to_string(),
                value: self.source.delimiter.clone(),
                reason: "Delimiter must be a single ASCII character".to_string(),
            });
        }
        if self.source.disk_cache {
            validate_path("source.cache_dir", &self.source.cache_dir)?;
        }

        validate_range("validation.tolerance", self.validation.tolerance, 0.0, 1.0)?;

        self.map.view.parse::<ViewPreset>()?;
        self.since()?;
        validate_range("map.min_display_radius", self.map.min_display_radius, 0.0, f64::MAX)?;
        if self.map.max_display_radius < self.map.min_display_radius {
            return Err(HazardsError::ConfigValidationError {
                field: "map.max_display_radius".to_string(),
                message: "Must not be smaller than map.min_display_radius".to_string(),
            });
        }

        validate_path("load.output_path", &self.load.output_path)?;
        for format in &self.load.output_formats {
            validate_one_of("load.output_formats", format, &OUTPUT_FORMATS)?;
        }
        if let Some(compression) = &self.load.compression {
            if compression.enabled {
                validate_non_empty_string("load.compression.filename", &compression.filename)?;
            }
        }

        if let Some(format) = &self.monitoring.log_format {
            validate_one_of("monitoring.log_format", format, &["compact", "json"])?;
        }

        Ok(())
    }

    /// Configured cut-off date. An empty value or `all` clears the default
    /// cut-off, so the map starts at the earliest report date.
    pub fn since(&self) -> Result<Option<NaiveDate>> {
        self.map
            .since
            .as_deref()
            .map(str::trim)
            .filter(|since| !since.is_empty() && !since.eq_ignore_ascii_case(NO_CUTOFF))
            .map(|since| parse_iso_date("map.since", since))
            .transpose()
    }

    pub fn map_options(&self) -> Result<MapOptions> {
        Ok(MapOptions {
            color_by_year: self.map.color_by_year,
            size_by_area: self.map.size_by_area,
            max_display_radius: self.map.max_display_radius,
            min_display_radius: self.map.min_display_radius,
            default_radius: self.map.default_radius,
            view: self.map.view.parse()?,
            alpha: self.map.alpha,
        })
    }

    pub fn wants(&self, format: &str) -> bool {
        self.load.output_formats.iter().any(|f| f == format)
    }

    /// Archive name when outputs are bundled into a single ZIP.
    pub fn compression_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring.log_format.as_deref() == Some("json")
    }
}

impl ConfigProvider for HazardsConfig {
    fn source(&self) -> &str {
        self.source.path.as_deref().unwrap_or(&self.source.url)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn member_extension(&self) -> &str {
        &self.source.member_extension
    }

    fn delimiter(&self) -> u8 {
        self.source.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn cache_dir(&self) -> Option<&str> {
        self.source
            .disk_cache
            .then_some(self.source.cache_dir.as_str())
    }
}

impl Validate for HazardsConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = HazardsConfig::from_toml_str("").unwrap();

        assert_eq!(config.source(), DEFAULT_DATA_URL);
        assert_eq!(config.member_extension(), "txt");
        assert_eq!(config.delimiter(), b',');
        assert_eq!(config.validation.tolerance, 0.05);
        assert_eq!(config.since().unwrap(), NaiveDate::from_ymd_opt(2020, 1, 1));
        assert!(config.map.size_by_area);
        assert!(config.wants("html"));
        assert!(config.compression_filename().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[app]
page_title = "Hazards"
title = "Quebec Fires"

[source]
path = "./data/NFDB_point_txt.zip"
delimiter = "\t"
disk_cache = false

[validation]
tolerance = 0.1
fail_on_unhealthy = true

[map]
view = "quebec"
since = "2015-05-01"
color_by_year = true

[load]
output_path = "./fires-output"
output_formats = ["csv", "html"]
compression = { enabled = true, filename = "fires.zip" }
"#;

        let config = HazardsConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.app.title, "Quebec Fires");
        assert_eq!(config.source(), "./data/NFDB_point_txt.zip");
        assert_eq!(config.delimiter(), b'\t');
        assert_eq!(config.cache_dir(), None);
        assert!(config.validation.fail_on_unhealthy);
        assert_eq!(config.map_options().unwrap().view, ViewPreset::Quebec);
        assert!(!config.wants("geojson"));
        assert_eq!(config.compression_filename(), Some("fires.zip"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HAZARDS_TEST_SOURCE_URL", "https://mirror.example.com/nfdb.zip");

        let toml_content = r#"
[source]
url = "${HAZARDS_TEST_SOURCE_URL}"
"#;

        let config = HazardsConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.url, "https://mirror.example.com/nfdb.zip");

        std::env::remove_var("HAZARDS_TEST_SOURCE_URL");
    }

    #[test]
    fn test_config_validation_errors() {
        let bad_url = HazardsConfig::from_toml_str("[source]\nurl = \"ftp://example.com/a.zip\"").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_view = HazardsConfig::from_toml_str("[map]\nview = \"atlantis\"").unwrap();
        assert!(matches!(bad_view.validate(), Err(HazardsError::UnknownView(_))));

        let bad_since = HazardsConfig::from_toml_str("[map]\nsince = \"yesterday\"").unwrap();
        assert!(bad_since.validate().is_err());

        let bad_format = HazardsConfig::from_toml_str("[load]\noutput_formats = [\"xlsx\"]").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_tolerance = HazardsConfig::from_toml_str("[validation]\ntolerance = 2.0").unwrap();
        assert!(bad_tolerance.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            HazardsConfig::from_toml_str("[source\nurl = 1"),
            Err(HazardsError::TomlError(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[load]\noutput_path = \"./file-output\"\n")
            .unwrap();

        let config = HazardsConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "./file-output");
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = HazardsConfig::from_toml_str(include_str!("../../hazards.example.toml")).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.app.title, "Canadian Fires");
        assert!(config.compression_filename().is_none());
        assert!(!config.json_logs());
    }

    #[test]
    fn test_since_can_be_cleared() {
        let config = HazardsConfig::default();
        assert_eq!(config.since().unwrap(), NaiveDate::from_ymd_opt(2020, 1, 1));

        let cleared = HazardsConfig::from_toml_str("[map]\nsince = \"\"\n").unwrap();
        assert_eq!(cleared.since().unwrap(), None);
        assert!(cleared.validate().is_ok());

        let all = HazardsConfig::from_toml_str("[map]\nsince = \"All\"\n").unwrap();
        assert_eq!(all.since().unwrap(), None);

        let bad = HazardsConfig::from_toml_str("[map]\nsince = \"last year\"\n").unwrap();
        assert!(bad.since().is_err());
    }
}
