//! Video separation
//!
//! Picks the videos out of a mixed album so they can be collected in an album
//! of their own.

use crate::client::ImmichClient;
use crate::error::Result;
use crate::types::{Album, Asset, CreateAlbumRequest};
use crate::utils::format_size;
use std::fmt;

/// The videos of one album, in album order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VideoSelection {
    /// Selected assets
    pub videos: Vec<Asset>,
}

impl VideoSelection {
    /// Keep the members of `album` whose media kind is video
    pub fn from_album(album: &Album) -> Self {
        Self {
            videos: album.assets.iter().filter(|a| a.is_video()).cloned().collect(),
        }
    }

    /// Number of selected videos
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    /// Whether the album held no videos
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Sum of the known file sizes
    pub fn total_bytes(&self) -> u64 {
        self.videos.iter().map(Asset::size_bytes).sum()
    }

    /// Asset ids, in album order
    pub fn ids(&self) -> Vec<String> {
        self.videos.iter().map(|v| v.id.clone()).collect()
    }

    /// Listing lines, one per video
    pub fn entries(&self) -> Vec<VideoEntry<'_>> {
        self.videos.iter().map(VideoEntry).collect()
    }

    /// Request body creating an album that holds exactly these videos
    pub fn album_request(&self, name: &str, description: &str) -> CreateAlbumRequest {
        CreateAlbumRequest {
            album_name: name.to_string(),
            asset_ids: self.ids(),
            description: description.to_string(),
        }
    }

    /// Create the album in one request
    ///
    /// Returns the id of the new album when the server reports one.
    pub async fn create_album(
        &self,
        client: &ImmichClient,
        name: &str,
        description: &str,
    ) -> Result<Option<String>> {
        let id = client
            .create_album(&self.album_request(name, description))
            .await?;
        tracing::info!(name, videos = self.len(), album_id = ?id, "created video album");
        Ok(id)
    }
}

/// One video as shown in listings: `name, size - created`
pub struct VideoEntry<'a>(&'a Asset);

impl fmt::Display for VideoEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} - {}",
            self.0.original_file_name,
            format_size(self.0.size_bytes()),
            self.0.created_at.to_rfc3339()
        )
    }
}
