use thiserror::Error;

#[derive(Error, Debug)]
pub enum HazardsError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Download from {url} failed with status {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("No '.{extension}' member found in archive")]
    ArchiveMemberNotFound { extension: String },

    #[error("Dataset is empty: {message}")]
    EmptyDataset { message: String },

    #[error("Unhealthy data: only {:.0}% of rows conformed (tolerance {:.0}%)", .pass_rate * 100.0, .tolerance * 100.0)]
    UnhealthyData { pass_rate: f64, tolerance: f64 },

    #[error("Unknown map view '{0}'")]
    UnknownView(String),

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Storage,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl HazardsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HazardsError::ConfigError { .. }
            | HazardsError::InvalidConfigValueError { .. }
            | HazardsError::MissingConfigError { .. }
            | HazardsError::ConfigValidationError { .. }
            | HazardsError::TomlError(_)
            | HazardsError::UnknownView(_) => ErrorCategory::Configuration,
            HazardsError::ApiError(_) | HazardsError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            HazardsError::ZipError(_)
            | HazardsError::CsvError(_)
            | HazardsError::ArchiveMemberNotFound { .. }
            | HazardsError::EmptyDataset { .. }
            | HazardsError::UnhealthyData { .. } => ErrorCategory::Data,
            HazardsError::IoError(_) => ErrorCategory::Storage,
            HazardsError::SerializationError(_) | HazardsError::ProcessingError { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            HazardsError::ApiError(_) | HazardsError::HttpStatusError { .. } => {
                "Check your network connection and the source URL, then retry"
            }
            HazardsError::TomlError(_) | HazardsError::ConfigValidationError { .. } => {
                "Check the configuration file syntax against hazards.example.toml"
            }
            HazardsError::ConfigError { .. }
            | HazardsError::InvalidConfigValueError { .. }
            | HazardsError::MissingConfigError { .. } => {
                "Fix the reported configuration value or command line flag"
            }
            HazardsError::UnknownView(_) => "Use one of the supported views: canada, quebec",
            HazardsError::ArchiveMemberNotFound { .. } => {
                "Set source.member_extension to the extension of the data file inside the archive"
            }
            HazardsError::ZipError(_) => "The archive looks corrupted; rerun with --force-reload",
            HazardsError::CsvError(_) => "Check source.delimiter and the file encoding",
            HazardsError::EmptyDataset { .. } => "Verify the source actually contains fire records",
            HazardsError::UnhealthyData { .. } => {
                "Inspect the skipped rows with --verbose, or raise validation.tolerance"
            }
            HazardsError::IoError(_) => "Check permissions and free space on the output and cache paths",
            HazardsError::SerializationError(_) | HazardsError::ProcessingError { .. } => {
                "Rerun with --verbose and report the issue"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not download the fire data: {}", self),
            ErrorCategory::Data => format!("The fire data could not be processed: {}", self),
            ErrorCategory::Storage => format!("Could not read or write files: {}", self),
            ErrorCategory::Internal => format!("Unexpected internal error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, HazardsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors_are_retryable() {
        let err = HazardsError::HttpStatusError {
            url: "https://example.com/fires.zip".to_string(),
            status: 503,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("503"));
    }

    #[test]
    fn test_unhealthy_data_message() {
        let err = HazardsError::UnhealthyData {
            pass_rate: 0.5,
            tolerance: 0.05,
        };
        assert_eq!(err.to_string(), "Unhealthy data: only 50% of rows conformed (tolerance 5%)");
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_config_errors_point_at_example_file() {
        let err = HazardsError::MissingConfigError {
            field: "source.url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().starts_with("Configuration problem"));

        let err = HazardsError::ConfigValidationError {
            field: "map.max_display_radius".to_string(),
            message: "too small".to_string(),
        };
        assert!(err.recovery_suggestion().contains("hazards.example.toml"));
    }

    #[test]
    fn test_processing_errors_are_critical() {
        let err = HazardsError::ProcessingError {
            message: "CSV buffer could not be flushed".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.to_string(), "Data processing error: CSV buffer could not be flushed");
    }
}
