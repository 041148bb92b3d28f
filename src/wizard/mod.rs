//! Interactive wizards
//!
//! [`run`] establishes a session, then shows the main menu until the operator
//! exits. Each process is a short wizard with confirm, retry and abort points;
//! nothing carries over between runs.

pub mod retime;
pub mod session;
pub mod tag_delete;
pub mod video_split;

pub use session::Session;

use crate::batch::BatchReport;
use crate::client::ImmichClient;
use crate::config::Config;
use crate::console::Console;
use crate::error::{Error, FailureKind, Result};
use crate::types::Album;
use std::fmt::Display;
use std::io::{BufRead, Write};
use tracing::{info, warn};

/// Title shown at the top of every screen
pub const TITLE: &str = "Immich Helper";

/// The processes offered in the main menu
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Process {
    /// Delete every tag whose name matches a pattern
    TagDeletion,
    /// Set capture times from messenger filenames
    Retime,
    /// Copy the videos of an album into a new album
    VideoSeparation,
}

impl Process {
    /// All processes, in menu order
    pub const ALL: [Process; 3] = [Process::TagDeletion, Process::Retime, Process::VideoSeparation];

    /// Menu label
    pub fn name(self) -> &'static str {
        match self {
            Process::TagDeletion => "Delete tags by pattern",
            Process::Retime => "Retime messenger pictures",
            Process::VideoSeparation => "Separate videos into a new album",
        }
    }

    /// Permissions the API key needs for this process
    pub fn required_permissions(self) -> &'static [&'static str] {
        match self {
            Process::TagDeletion => &["asset.read", "tag.read", "tag.delete"],
            Process::Retime => &["album.read", "asset.update"],
            Process::VideoSeparation => &["album.read", "album.create"],
        }
    }

    /// Process for a menu number; 0 and out-of-range numbers have none
    pub fn from_choice(choice: u32) -> Option<Self> {
        let index = usize::try_from(choice).ok()?.checked_sub(1)?;
        Self::ALL.get(index).copied()
    }
}

/// How a process ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The process ran to its end
    Done,
    /// The operator aborted at a decision point
    Aborted,
}

/// Why the main loop ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// The operator chose to exit
    Finished,
    /// No usable credentials; nothing was done
    NoCredentials,
}

/// Run the helper until the operator exits
///
/// Failed processes are reported and the menu is shown again. A refused key
/// or a lost endpoint is re-entered first; aborting that entry ends the run.
/// Only closed console input ends the loop with an error.
pub async fn run<R: BufRead, W: Write>(console: &mut Console<R, W>, config: &Config) -> Result<Exit> {
    console.header(TITLE)?;
    console.say("Checking for API key")?;

    let Some(mut session) = session::establish(console, config).await? else {
        console.say("No work possible without API key, aborting...")?;
        return Ok(Exit::NoCredentials);
    };
    console.say("Looks good, proceeding...")?;

    loop {
        console.header(TITLE)?;
        console.say("Choose a process:")?;
        for (i, process) in Process::ALL.iter().enumerate() {
            console.say(format_args!("{} - {}", i + 1, process.name()))?;
        }
        console.say("0 - Exit")?;

        let choice = console.choose(0, Process::ALL.len() as u32)?;
        let Some(process) = Process::from_choice(choice) else {
            info!("operator exited");
            return Ok(Exit::Finished);
        };

        let missing = session.key.missing(process.required_permissions());
        if !missing.is_empty() {
            console.say(format_args!(
                "The API key lacks permissions for {}: {}",
                process.name(),
                missing.join(", ")
            ))?;
            continue;
        }

        info!(process = process.name(), "starting process");
        let result = match process {
            Process::TagDeletion => tag_delete::run(console, &session, config).await,
            Process::Retime => retime::run(console, &session, config).await,
            Process::VideoSeparation => video_split::run(console, &session, config).await,
        };

        match result {
            Ok(outcome) => info!(process = process.name(), ?outcome, "process ended"),
            Err(Error::InputClosed) => return Err(Error::InputClosed),
            Err(e) => {
                warn!(process = process.name(), error = %e, "process failed");
                console.say(format_args!("{} failed: {}", process.name(), e))?;
                if let Error::MalformedResponse { body, .. } = &e {
                    console.say(format_args!("Response was: {body}"))?;
                }

                let renewed = match e.kind() {
                    FailureKind::Authentication => {
                        session::renew_key(console, config, &session.credentials.instance).await?
                    }
                    FailureKind::Endpoint => session::reconnect(console, config, &e.to_string()).await?,
                    _ => continue,
                };
                let Some(renewed) = renewed else {
                    console.say("No work possible without API key, aborting...")?;
                    return Ok(Exit::NoCredentials);
                };
                session = renewed;
                console.say("Looks good, proceeding...")?;
            }
        }
    }
}

/// Show the counts of a finished batch and let the operator review failures
pub(crate) fn report_batch<R: BufRead, W: Write, K: Display>(
    console: &mut Console<R, W>,
    done: &str,
    report: &BatchReport<K>,
    listing_batch: usize,
) -> Result<()> {
    if report.is_clean() {
        console.say(format_args!("{} {} with no errors.", report.succeeded, done))?;
    } else {
        console.say(format_args!(
            "{} {}, {} errors (of {} entries in total).",
            report.succeeded,
            done,
            report.failed(),
            report.total()
        ))?;
        if console.menu(&["Review errors", "Ignore them and continue"])? == 1 {
            console.list_paged(&report.failures, listing_batch)?;
        }
    }
    console.pause("Process done, press ENTER to continue")
}

/// Ask for an album id until the album is found or the operator gives up
pub(crate) async fn ask_album<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    client: &ImmichClient,
    min_id_len: usize,
) -> Result<Option<Album>> {
    loop {
        let id = console.ask_min_len("Album id: ", min_id_len)?;
        match client.get_album(&id).await {
            Ok(album) => return Ok(Some(album)),
            Err(Error::AlbumNotFound(_)) => {
                console.say("The request came back without an album, try again?")?;
                console.say(
                    "A wrong id is the most likely cause, but a key without access to the album looks the same.",
                )?;
                if console.menu(&["Retry with a different album id", "Abort"])? == 2 {
                    return Ok(None);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests;
