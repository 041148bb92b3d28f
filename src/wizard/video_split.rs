//! Collect the videos of an album in a new album

use super::{Outcome, Session, ask_album};
use crate::config::Config;
use crate::console::Console;
use crate::error::Result;
use crate::utils::format_size;
use crate::videos::VideoSelection;
use std::io::{BufRead, Write};

/// Minimum length of a new album name
pub const MIN_ALBUM_NAME_LEN: usize = 3;

/// Run the video separation wizard
pub async fn run<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &Session,
    config: &Config,
) -> Result<Outcome> {
    console.header("Separate videos into a new album")?;
    console.say("The videos of an existing album are added to a new album; the source album stays as it is.")?;

    let Some(album) = ask_album(console, &session.client, config.videos.min_album_id_len).await?
    else {
        return Ok(Outcome::Aborted);
    };

    let selection = VideoSelection::from_album(&album);
    console.say(format_args!(
        "Found {} videos in album {}, with a total size of {}.",
        selection.len(),
        album.album_name,
        format_size(selection.total_bytes())
    ))?;
    if selection.is_empty() {
        console.say("No videos, no album to create.")?;
        return Ok(Outcome::Done);
    }

    match console.menu(&["List all entries", "Continue", "Abort"])? {
        1 => {
            console.list_paged(&selection.entries(), config.listing_batch)?;
            console.say(format_args!(
                "{} videos fetched, next step: creating a new album",
                selection.len()
            ))?;
            if console.menu(&["Continue", "Abort"])? == 2 {
                return Ok(Outcome::Aborted);
            }
        }
        2 => {}
        _ => return Ok(Outcome::Aborted),
    }

    console.say("Choose a name for the new album")?;
    let name = console.ask_min_len("Album name: ", MIN_ALBUM_NAME_LEN)?;
    let created = selection
        .create_album(&session.client, &name, &config.videos.album_description)
        .await?;

    match created {
        Some(id) => console.say(format_args!(
            "Created album {name} ({id}) with {} videos.",
            selection.len()
        ))?,
        None => console.say(format_args!(
            "Created album {name} with {} videos.",
            selection.len()
        ))?,
    }
    Ok(Outcome::Done)
}
