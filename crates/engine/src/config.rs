//! Backup configuration via `calllog-backup.toml`
//!
//! Every key is optional; an empty file yields the defaults. To change
//! settings, edit the file before the next pass.

use std::path::Path;

use calllog_durability::{is_known_revision, RecordCodec, UnknownRevision};
use serde::{Deserialize, Serialize};

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "calllog-backup.toml";

/// Data type label attached to accounting signals.
pub const CALL_LOGS_DATA_TYPE: &str = "telecom_call_logs";

/// Backup configuration.
///
/// # Example
///
/// ```toml
/// data_type = "telecom_call_logs"
/// verbose_records = false
/// # record_format_version = 1009
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Label passed with every accounting signal.
    #[serde(default = "default_data_type")]
    pub data_type: String,
    /// Log numbers, accounts and dates alongside record ids.
    #[serde(default)]
    pub verbose_records: bool,
    /// Pin the record codec to an older schema revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_format_version: Option<i32>,
}

fn default_data_type() -> String {
    CALL_LOGS_DATA_TYPE.to_string()
}

impl Default for BackupConfig {
    fn default() -> Self {
        BackupConfig {
            data_type: default_data_type(),
            verbose_records: false,
            record_format_version: None,
        }
    }
}

impl BackupConfig {
    /// Enable or disable verbose record logging.
    pub fn with_verbose_records(mut self, verbose: bool) -> Self {
        self.verbose_records = verbose;
        self
    }

    /// Pin the record format revision.
    pub fn with_record_format_version(mut self, version: i32) -> Self {
        self.record_format_version = Some(version);
        self
    }

    /// Set the accounting data type label.
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_type.is_empty() {
            return Err(ConfigError::EmptyDataType);
        }
        if let Some(version) = self.record_format_version {
            if !is_known_revision(version) {
                return Err(ConfigError::UnknownRevision(UnknownRevision(version)));
            }
        }
        Ok(())
    }

    /// Record codec matching this configuration.
    pub fn record_codec(&self) -> Result<RecordCodec, ConfigError> {
        match self.record_format_version {
            Some(version) => Ok(RecordCodec::pinned(version)?),
            None => Ok(RecordCodec::new()),
        }
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BackupConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Call log backup configuration
#
# Label attached to every accounting signal.
data_type = "telecom_call_logs"

# Log numbers, accounts and dates alongside record ids (default: false).
# Record details are personal data; enable only for local debugging.
verbose_records = false

# Pin the record format to an older schema revision (default: newest).
# record_format_version = 1009
"#
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|source| ConfigError::Write {
                path: path.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Data type label is empty
    #[error("data_type must not be empty")]
    EmptyDataType,

    /// Pinned revision does not exist
    #[error("Invalid record_format_version: {0}")]
    UnknownRevision(#[from] UnknownRevision),

    /// Config text is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be written
    #[error("Failed to write config file '{path}': {source}")]
    Write {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}
