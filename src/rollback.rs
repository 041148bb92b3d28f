//! Tag rollback records
//!
//! Before tags are deleted, the assets carrying each tag are resolved and
//! written to `TagRollback<YYYYmmdd_HHMMSS>.json`:
//!
//! ```json
//! {
//!   "dateCreated": "2025-03-07T09:05:01.123456",
//!   "tags": {
//!     "trip2019": ["a1", "a2"]
//!   }
//! }
//! ```
//!
//! The file enables manual recovery only; nothing reads it back automatically.

use crate::client::ImmichClient;
use crate::error::{Error, Result};
use crate::types::Tag;
use crate::utils::write_timestamped;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of rollback file names
pub const ROLLBACK_PREFIX: &str = "TagRollback";

/// Tag name to asset ids, captured before deletion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackRecord {
    /// Local time the record was taken
    pub date_created: NaiveDateTime,
    /// Asset ids per tag name
    pub tags: BTreeMap<String, Vec<String>>,
}

impl RollbackRecord {
    /// Resolve the assets of every tag in `tags`, one tag after another
    ///
    /// # Errors
    ///
    /// The first tag that cannot be resolved aborts the capture with
    /// [`Error::Snapshot`].
    pub async fn capture(client: &ImmichClient, tags: &[Tag], at: NaiveDateTime) -> Result<Self> {
        let mut record = Self {
            date_created: at,
            tags: BTreeMap::new(),
        };

        for (i, tag) in tags.iter().enumerate() {
            let assets = client
                .assets_with_tag(&tag.id)
                .await
                .map_err(|e| Error::Snapshot {
                    tag: tag.name.clone(),
                    source: Box::new(e),
                })?;
            debug!(tag = %tag, assets = assets.len(), progress = i + 1, total = tags.len(), "resolved tag");
            record.tags.insert(tag.name.clone(), assets);
        }

        Ok(record)
    }

    /// Number of asset references across all tags
    pub fn asset_count(&self) -> usize {
        self.tags.values().map(Vec::len).sum()
    }

    /// Write the record into `dir`, named after its creation time
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(self)?;
        let path = write_timestamped(dir, ROLLBACK_PREFIX, "json", self.date_created, json.as_bytes())?;
        info!(path = %path.display(), tags = self.tags.len(), "wrote rollback record");
        Ok(path)
    }

    /// Read a record written by [`RollbackRecord::write`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
