//! Configuration types for immich-helper
//!
//! Every field has a default, so an absent or partial `immich-helper.json` is
//! always valid. Nested sections group the settings of each process.

use crate::error::{Error, Result};
use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the optional configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "immich-helper.json";

/// Settings for deleting tags by pattern
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagDeleteConfig {
    /// Result sets longer than this ask before being listed (default: 30)
    #[serde(default = "default_review_threshold")]
    pub review_threshold: usize,
}

impl Default for TagDeleteConfig {
    fn default() -> Self {
        Self {
            review_threshold: default_review_threshold(),
        }
    }
}

/// Settings for retiming pictures from their filenames
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetimeConfig {
    /// Filename pattern, matched from the start of the name
    ///
    /// Must contain a capture group named `date` holding eight digits (`YYYYMMDD`).
    #[serde(default = "default_filename_pattern")]
    pub filename_pattern: String,

    /// Time of day assigned to every retimed picture (default: 12:04:06)
    #[serde(default = "default_time_of_day")]
    pub time_of_day: NaiveTime,
}

impl Default for RetimeConfig {
    fn default() -> Self {
        Self {
            filename_pattern: default_filename_pattern(),
            time_of_day: default_time_of_day(),
        }
    }
}

/// Settings for separating videos into their own album
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoSplitConfig {
    /// Description given to the created album
    #[serde(default = "default_album_description")]
    pub album_description: String,

    /// Minimum length of an album id accepted at the prompt (default: 35)
    #[serde(default = "default_min_album_id_len")]
    pub min_album_id_len: usize,
}

impl Default for VideoSplitConfig {
    fn default() -> Self {
        Self {
            album_description: default_album_description(),
            min_album_id_len: default_min_album_id_len(),
        }
    }
}

/// Main configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// File the API key and instance URL are stored in (default: "api_key.json")
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,

    /// Directory rollback records and error logs are written to (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Timeout for a single HTTP request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Number of entries listed before pausing for ENTER (default: 500)
    #[serde(default = "default_listing_batch")]
    pub listing_batch: usize,

    /// Tag deletion settings
    #[serde(default)]
    pub tags: TagDeleteConfig,

    /// Retime settings
    #[serde(default)]
    pub retime: RetimeConfig,

    /// Video separation settings
    #[serde(default)]
    pub videos: VideoSplitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
            output_dir: default_output_dir(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            listing_batch: default_listing_batch(),
            tags: TagDeleteConfig::default(),
            retime: RetimeConfig::default(),
            videos: VideoSplitConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, using defaults when the file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, is not valid JSON,
    /// or holds values that fail [`Config::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.listing_batch == 0 {
            return Err(Error::Config {
                message: "listing_batch must be at least 1".to_string(),
                key: Some("listing_batch".to_string()),
            });
        }
        self.filename_regex().map(|_| ())
    }

    /// Compile the retime filename pattern
    pub fn filename_regex(&self) -> Result<Regex> {
        let regex = Regex::new(&self.retime.filename_pattern).map_err(|e| Error::Config {
            message: e.to_string(),
            key: Some("retime.filename_pattern".to_string()),
        })?;
        if !regex.capture_names().any(|name| name == Some("date")) {
            return Err(Error::Config {
                message: "pattern needs a capture group named `date`".to_string(),
                key: Some("retime.filename_pattern".to_string()),
            });
        }
        Ok(regex)
    }
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("api_key.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("immich-helper/{}", env!("CARGO_PKG_VERSION"))
}

fn default_listing_batch() -> usize {
    500
}

fn default_review_threshold() -> usize {
    30
}

fn default_filename_pattern() -> String {
    r"IMG-(?P<date>[0-9]{8})-WA[0-9]{4}\.jpg".to_string()
}

fn default_time_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 4, 6).unwrap_or(NaiveTime::MIN)
}

fn default_album_description() -> String {
    "Album of only videos".to_string()
}

fn default_min_album_id_len() -> usize {
    35
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
