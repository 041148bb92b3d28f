//! Wire types for the Immich REST API
//!
//! Only the fields this tool reads are modelled; unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A tag as listed by `GET tags`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Server-assigned identifier
    pub id: String,
    /// Human-readable name, unique per account
    pub name: String,
}

impl Tag {
    /// Create a new Tag
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}

/// Media kind of an asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    /// Still image
    Image,
    /// Video clip
    Video,
    /// Audio file
    Audio,
    /// Anything the server adds later
    #[serde(other)]
    Other,
}

/// Subset of the EXIF block attached to an asset
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExifInfo {
    /// File size in bytes
    #[serde(default)]
    pub file_size_in_byte: Option<u64>,
}

/// An asset as embedded in an album response
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Server-assigned identifier
    pub id: String,
    /// Filename at upload time
    pub original_file_name: String,
    /// When the asset was created on the server
    pub created_at: DateTime<Utc>,
    /// Image, video, ...
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// EXIF data; absent until the server's metadata job ran
    #[serde(default)]
    pub exif_info: Option<ExifInfo>,
}

impl Asset {
    /// Size in bytes, 0 when the server does not know it yet
    pub fn size_bytes(&self) -> u64 {
        self.exif_info
            .as_ref()
            .and_then(|exif| exif.file_size_in_byte)
            .unwrap_or(0)
    }

    /// Whether this asset is a video
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// An album with its members, as returned by `GET albums/{id}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Server-assigned identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub album_name: String,
    /// Members of the album
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// Identifier-only view of an asset, as needed from search results
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Server-assigned identifier
    pub id: String,
}

/// One page of a paginated listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in server order
    pub items: Vec<T>,
    /// Number of the following page, `None` on the last page
    #[serde(default, deserialize_with = "next_page_token")]
    pub next_page: Option<u32>,
}

/// Response body of `POST search/metadata`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetadataSearchResponse {
    /// The asset part of the result
    pub assets: Page<AssetRef>,
}

/// Request body of `POST search/metadata`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSearchRequest {
    /// Assets must carry all of these tags
    pub tag_ids: Vec<String>,
    /// 1-based page number
    pub page: u32,
}

/// Request body of `PUT assets`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetsRequest {
    /// Assets to update
    pub ids: Vec<String>,
    /// New capture time, `YYYY-MM-DDTHH:MM:SS.mmm`
    pub date_time_original: String,
}

/// Request body of `POST albums`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    /// Name of the new album
    pub album_name: String,
    /// Initial members
    pub asset_ids: Vec<String>,
    /// Album description
    pub description: String,
}

/// Response body of `GET api-keys/me`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyInfo {
    /// Key name chosen when it was created
    #[serde(default)]
    pub name: Option<String>,
    /// Granted permissions, e.g. `tag.read`; `all` grants everything
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl ApiKeyInfo {
    /// Permission that implies every other one
    pub const ALL: &'static str = "all";

    /// Whether the key grants `permission`
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p == Self::ALL || p == permission)
    }

    /// The subset of `required` the key does not grant, in the given order
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|p| !self.grants(p))
            .map(|p| p.to_string())
            .collect()
    }
}

// The server sends the next page as a string ("2"); accept numbers too.
fn next_page_token<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Number(u32),
        Text(String),
    }

    match Option::<Token>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Token::Number(n)) => Ok(Some(n)),
        Some(Token::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid next page token {s:?}"))),
    }
}
