//! # immich-helper
//!
//! Console helpers for bulk maintenance of an Immich photo server.
//!
//! ## Processes
//!
//! - **Tag deletion** - delete every tag whose name matches a regular
//!   expression, after writing a rollback record of the affected assets
//! - **Retiming** - set the capture time of album members from dates embedded
//!   in their filenames (`IMG-YYYYMMDD-WAnnnn.jpg`)
//! - **Video separation** - create a new album holding only the videos of an
//!   existing album
//!
//! Every process talks to the server one request at a time and keeps going
//! past single failed items; failures are collected and shown at the end.
//!
//! ## Library use
//!
//! ```no_run
//! use immich_helper::{Config, Credentials, ImmichClient};
//! use immich_helper::filter::filter_tags;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = Credentials::new("https://photos.example.com/api/", "secret");
//!     let client = ImmichClient::new(&creds, &Config::default())?;
//!
//!     let tags = client.list_tags().await?;
//!     let pattern = regex::Regex::new("trip")?;
//!     for tag in filter_tags(&tags, &pattern) {
//!         println!("{tag}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Sequential batches with per-item failure tracking
pub mod batch;
/// Immich REST client
pub mod client;
/// Configuration types
pub mod config;
/// Operator prompts
pub mod console;
/// API credentials and the credential file
pub mod credentials;
/// Error types
pub mod error;
/// Start-anchored pattern matching
pub mod filter;
/// Page-by-page collection of listings
pub mod paginate;
/// Capture times from filenames
pub mod retime;
/// Tag rollback records
pub mod rollback;
/// Wire types
pub mod types;
/// Utility functions
pub mod utils;
/// Video separation
pub mod videos;
/// Interactive wizards
pub mod wizard;

// Re-export commonly used types
pub use batch::{BatchFailure, BatchReport, run_batch};
pub use client::{ImmichClient, KeyCheck};
pub use config::Config;
pub use console::Console;
pub use credentials::{CredentialStore, Credentials};
pub use error::{Error, FailureKind, Result, ServerError};
pub use rollback::RollbackRecord;
pub use types::{Album, ApiKeyInfo, Asset, MediaKind, Page, Tag};
