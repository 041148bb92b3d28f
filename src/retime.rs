//! Capture times derived from filenames
//!
//! Messenger apps strip EXIF data and name pictures after the day they were
//! received, e.g. `IMG-20150112-WA0017.jpg`. [`FilenameDater`] turns such a
//! name into a capture time on that day at a fixed time of day, and
//! [`RetimePlan`] splits an album into assets that can be retimed and names
//! that cannot.

use crate::batch::{BatchReport, run_batch};
use crate::client::ImmichClient;
use crate::config::Config;
use crate::error::Result;
use crate::filter::captures_from_start;
use crate::types::Asset;
use crate::utils::write_timestamped;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Prefix of error log file names
pub const ERROR_LOG_PREFIX: &str = "WA-Errors_";

/// Capture time format sent to the server
pub const CAPTURE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Derives a capture time from a filename
#[derive(Clone, Debug)]
pub struct FilenameDater {
    pattern: Regex,
    time_of_day: NaiveTime,
}

impl FilenameDater {
    /// `pattern` must have a capture group named `date` holding `YYYYMMDD`
    pub fn new(pattern: Regex, time_of_day: NaiveTime) -> Self {
        Self {
            pattern,
            time_of_day,
        }
    }

    /// Dater using the configured pattern and time of day
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.filename_regex()?, config.retime.time_of_day))
    }

    /// Capture time for `file_name`
    ///
    /// `None` when the name does not match from its start or the date group
    /// holds no real calendar date.
    pub fn date_for(&self, file_name: &str) -> Option<NaiveDateTime> {
        let caps = captures_from_start(&self.pattern, file_name)?;
        let date = NaiveDate::parse_from_str(caps.name("date")?.as_str(), "%Y%m%d").ok()?;
        Some(date.and_time(self.time_of_day))
    }
}

/// Wire form of a capture time, millisecond precision
pub fn format_capture_time(at: NaiveDateTime) -> String {
    at.format(CAPTURE_TIME_FORMAT).to_string()
}

/// Assets to retime and names that could not be dated
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetimePlan {
    /// Asset id and new capture time, in album order
    pub updates: Vec<(String, NaiveDateTime)>,
    /// Original filenames that yielded no date, in album order
    pub malformed: Vec<String>,
}

impl RetimePlan {
    /// Sort every member of an album into updates or malformed names
    pub fn build(dater: &FilenameDater, assets: &[Asset]) -> Self {
        let mut plan = Self::default();
        for asset in assets {
            match dater.date_for(&asset.original_file_name) {
                Some(at) => plan.updates.push((asset.id.clone(), at)),
                None => plan.malformed.push(asset.original_file_name.clone()),
            }
        }
        plan
    }

    /// Number of album members covered by the plan
    pub fn total(&self) -> usize {
        self.updates.len() + self.malformed.len()
    }

    /// Send one update per asset, continuing past failures
    pub async fn apply(&self, client: &ImmichClient) -> BatchReport<String> {
        let items = self
            .updates
            .iter()
            .map(|(id, at)| (id.clone(), format_capture_time(*at)))
            .collect();
        run_batch("retime asset", items, |id, when| async move {
            client.update_asset_date(&id, &when).await
        })
        .await
    }
}

/// Write `names` to `WA-Errors_<YYYYmmdd_HHMMSS>.log` in `dir`, one per line
pub fn write_error_log(dir: &Path, names: &[String], at: NaiveDateTime) -> Result<PathBuf> {
    let mut content = String::new();
    for name in names {
        content.push_str(name);
        content.push('\n');
    }
    let path = write_timestamped(dir, ERROR_LOG_PREFIX, "log", at, content.as_bytes())?;
    tracing::info!(path = %path.display(), entries = names.len(), "wrote retime error log");
    Ok(path)
}
