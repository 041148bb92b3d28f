//! Typed client for the Immich REST API
//!
//! Each method issues exactly one request (except [`ImmichClient::assets_with_tag`],
//! which walks all result pages) and checks the response against the status code
//! the endpoint answers with on success. Any other status becomes
//! [`Error::Api`] carrying the server's error payload; a body that does not
//! have the expected shape becomes [`Error::MalformedResponse`].

use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::{Error, Result, ServerError};
use crate::paginate::collect_pages;
use crate::types::{
    Album, ApiKeyInfo, AssetRef, CreateAlbumRequest, MetadataSearchRequest,
    MetadataSearchResponse, Page, Tag, UpdateAssetsRequest,
};
use crate::utils::{MAX_DISPLAYED_BODY, truncate_for_display};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Endpoint paths, relative to the instance base URL
pub mod endpoints {
    /// Information about the key used for the request
    pub const API_KEY_SELF: &str = "api-keys/me";
    /// Tag listing; `tags/{id}` for a single tag
    pub const TAGS: &str = "tags";
    /// Paginated metadata search
    pub const SEARCH_METADATA: &str = "search/metadata";
    /// Bulk asset update
    pub const ASSETS: &str = "assets";
    /// Album creation; `albums/{id}` for a single album
    pub const ALBUMS: &str = "albums";
}

/// Result of probing the credentials against the server
#[derive(Clone, Debug, PartialEq)]
pub enum KeyCheck {
    /// Endpoint and key work
    Valid(ApiKeyInfo),
    /// The endpoint answered but refused the key
    Rejected,
    /// The URL does not lead to a working API endpoint
    Unreachable(String),
}

#[derive(Deserialize)]
struct CreatedAlbum {
    id: String,
}

/// Client bound to one instance and API key
#[derive(Clone)]
pub struct ImmichClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

impl std::fmt::Debug for ImmichClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImmichClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl ImmichClient {
    /// Create a client for `creds`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstance`] if the instance URL cannot be parsed,
    /// or an error if the HTTP client cannot be created.
    pub fn new(creds: &Credentials, config: &Config) -> Result<Self> {
        let base = creds.base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base,
            api_key: creds.api_key.clone(),
        })
    }

    /// Base URL every endpoint path is joined onto
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Probe `GET api-keys/me`
    ///
    /// Never fails: every outcome maps to a [`KeyCheck`] the session flow can act on.
    pub async fn check_key(&self) -> KeyCheck {
        let endpoint = endpoints::API_KEY_SELF;
        let request = match self.request(Method::GET, endpoint) {
            Ok(request) => request,
            Err(e) => return KeyCheck::Unreachable(e.to_string()),
        };
        let (status, body) = match self.execute(endpoint, request).await {
            Ok(answer) => answer,
            Err(e) => return KeyCheck::Unreachable(e.to_string()),
        };

        match status {
            StatusCode::UNAUTHORIZED => KeyCheck::Rejected,
            StatusCode::OK if looks_like_html(&body) => KeyCheck::Unreachable(
                "the URL serves a web page, not the API (does it end in /api/?)".to_string(),
            ),
            StatusCode::OK => match parse_body::<ApiKeyInfo>(endpoint, &body) {
                Ok(info) => KeyCheck::Valid(info),
                Err(e) => KeyCheck::Unreachable(e.to_string()),
            },
            StatusCode::NOT_FOUND => {
                KeyCheck::Unreachable(format!("{} not found (HTTP 404)", self.base))
            }
            other => KeyCheck::Unreachable(format!("unexpected HTTP {}", other.as_u16())),
        }
    }

    /// All tags of the account, in server order
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        let endpoint = endpoints::TAGS;
        let request = self.request(Method::GET, endpoint)?;
        let (status, body) = self.execute(endpoint, request).await?;
        expect_status(endpoint, status, StatusCode::OK, &body)?;
        parse_body(endpoint, &body)
    }

    /// Delete one tag; the server answers 204 on success
    pub async fn delete_tag(&self, tag_id: &str) -> Result<()> {
        let endpoint = format!("{}/{}", endpoints::TAGS, urlencoding::encode(tag_id));
        let request = self.request(Method::DELETE, &endpoint)?;
        let (status, body) = self.execute(&endpoint, request).await?;
        expect_status(&endpoint, status, StatusCode::NO_CONTENT, &body)
    }

    /// One page of the assets carrying `tag_id`
    pub async fn search_assets_by_tag(&self, tag_id: &str, page: u32) -> Result<Page<AssetRef>> {
        let endpoint = endpoints::SEARCH_METADATA;
        let request = self
            .request(Method::POST, endpoint)?
            .json(&MetadataSearchRequest {
                tag_ids: vec![tag_id.to_string()],
                page,
            });
        let (status, body) = self.execute(endpoint, request).await?;
        expect_status(endpoint, status, StatusCode::OK, &body)?;
        parse_body::<MetadataSearchResponse>(endpoint, &body).map(|response| response.assets)
    }

    /// Ids of every asset carrying `tag_id`, across all result pages
    pub async fn assets_with_tag(&self, tag_id: &str) -> Result<Vec<String>> {
        let assets = collect_pages(endpoints::SEARCH_METADATA, |page| {
            self.search_assets_by_tag(tag_id, page)
        })
        .await?;
        Ok(assets.into_iter().map(|asset| asset.id).collect())
    }

    /// An album with its members
    ///
    /// The server answers 400 for ids that are not UUIDs or not accessible and
    /// 404 for unknown ones; both are reported as [`Error::AlbumNotFound`].
    pub async fn get_album(&self, album_id: &str) -> Result<Album> {
        let endpoint = format!("{}/{}", endpoints::ALBUMS, urlencoding::encode(album_id));
        let request = self.request(Method::GET, &endpoint)?;
        let (status, body) = self.execute(&endpoint, request).await?;
        match status {
            StatusCode::OK => parse_body(&endpoint, &body),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                debug!(album_id, body = %truncate_for_display(&body, MAX_DISPLAYED_BODY), "album lookup refused");
                Err(Error::AlbumNotFound(album_id.to_string()))
            }
            other => Err(api_error(&endpoint, other, &body)),
        }
    }

    /// Set the original capture time of one asset; the server answers 204
    pub async fn update_asset_date(&self, asset_id: &str, date_time_original: &str) -> Result<()> {
        let endpoint = endpoints::ASSETS;
        let request = self
            .request(Method::PUT, endpoint)?
            .json(&UpdateAssetsRequest {
                ids: vec![asset_id.to_string()],
                date_time_original: date_time_original.to_string(),
            });
        let (status, body) = self.execute(endpoint, request).await?;
        expect_status(endpoint, status, StatusCode::NO_CONTENT, &body)
    }

    /// Create an album with initial members; the server answers 201
    ///
    /// Returns the new album's id when the response carries one.
    pub async fn create_album(&self, album: &CreateAlbumRequest) -> Result<Option<String>> {
        let endpoint = endpoints::ALBUMS;
        let request = self.request(Method::POST, endpoint)?.json(album);
        let (status, body) = self.execute(endpoint, request).await?;
        expect_status(endpoint, status, StatusCode::CREATED, &body)?;
        Ok(serde_json::from_str::<CreatedAlbum>(&body)
            .ok()
            .map(|created| created.id))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base.join(path).map_err(|e| Error::InvalidInstance {
            url: self.base.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(ACCEPT, "application/json"))
    }

    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<(StatusCode, String)> {
        debug!(endpoint, "sending request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(endpoint, status = status.as_u16(), bytes = body.len(), "received response");
        Ok((status, body))
    }
}

fn expect_status(endpoint: &str, status: StatusCode, expected: StatusCode, body: &str) -> Result<()> {
    if status == expected {
        Ok(())
    } else {
        Err(api_error(endpoint, status, body))
    }
}

fn api_error(endpoint: &str, status: StatusCode, body: &str) -> Error {
    Error::Api {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        detail: ServerError::from_body(status.as_u16(), body),
    }
}

fn parse_body<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
        body: truncate_for_display(body, MAX_DISPLAYED_BODY),
    })
}

fn looks_like_html(body: &str) -> bool {
    let start = body.trim_start();
    let head = start.get(..14).unwrap_or(start).to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}
