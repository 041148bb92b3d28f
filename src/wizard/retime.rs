//! Retime the pictures of an album from their filenames

use super::{Outcome, Session, ask_album, report_batch};
use crate::config::Config;
use crate::console::Console;
use crate::error::Result;
use crate::retime::{FilenameDater, RetimePlan, write_error_log};
use chrono::Local;
use std::io::{BufRead, Write};

/// Run the retime wizard
pub async fn run<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &Session,
    config: &Config,
) -> Result<Outcome> {
    console.header("Retime messenger pictures")?;
    console.say("Put the pictures into an album first, then paste the album id here.")?;

    let dater = FilenameDater::from_config(config)?;
    let Some(album) = ask_album(console, &session.client, 1).await? else {
        return Ok(Outcome::Aborted);
    };

    let plan = RetimePlan::build(&dater, &album.assets);
    console.say(format_args!(
        "Found {} entries in album {}, {} of them with a usable date in their name.",
        plan.total(),
        album.album_name,
        plan.updates.len()
    ))?;

    if plan.malformed.is_empty() {
        console.say("Every name could be dated.")?;
    } else {
        console.say(format_args!(
            "{} names could not be dated. Review them?",
            plan.malformed.len()
        ))?;
        match console.menu(&[
            "Review them",
            "Write them to a log file",
            "Ignore them and continue",
        ])? {
            1 => console.list_paged(&plan.malformed, config.listing_batch)?,
            2 => {
                let path = write_error_log(
                    &config.output_dir,
                    &plan.malformed,
                    Local::now().naive_local(),
                )?;
                console.say(format_args!("Written all names to {}", path.display()))?;
            }
            _ => {}
        }
    }

    if plan.updates.is_empty() {
        console.say("Nothing to retime.")?;
        return Ok(Outcome::Done);
    }

    console.say("Every change is one request, so this takes a while.")?;
    let change = format!(
        "Continue and change the capture time of {} assets",
        plan.updates.len()
    );
    if console.menu(&[change.as_str(), "Abort"])? == 2 {
        return Ok(Outcome::Aborted);
    }

    let report = plan.apply(&session.client).await;
    report_batch(console, "assets retimed", &report, config.listing_batch)?;
    Ok(Outcome::Done)
}
