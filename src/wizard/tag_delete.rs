//! Delete tags whose name matches a pattern
//!
//! The operator reviews the hits before anything is deleted. A rollback record
//! of every affected tag is written before the first delete request.

use super::{Outcome, Session, report_batch};
use crate::batch::run_batch;
use crate::config::Config;
use crate::console::Console;
use crate::error::Result;
use crate::filter::filter_tags;
use crate::rollback::RollbackRecord;
use crate::types::Tag;
use chrono::Local;
use std::io::{BufRead, Write};

/// Run the tag deletion wizard
pub async fn run<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &Session,
    config: &Config,
) -> Result<Outcome> {
    console.header("Delete tags by pattern")?;
    console.say("Tags are not deleted right away; you review the hits first and may change the pattern.")?;

    let client = &session.client;
    let tags = client.list_tags().await?;
    tracing::info!(tags = tags.len(), "listed tags");

    let Some(hits) = select_tags(console, &tags, config)? else {
        console.say("Aborted, nothing was deleted.")?;
        return Ok(Outcome::Aborted);
    };

    console.say(format_args!(
        "Creating a rollback file first. These are {} requests, so it may take a while.",
        hits.len()
    ))?;
    let record = RollbackRecord::capture(client, &hits, Local::now().naive_local()).await?;
    let path = record.write(&config.output_dir)?;
    console.say(format_args!(
        "Rollback file {} written ({} tags, {} asset references).",
        path.display(),
        record.tags.len(),
        record.asset_count()
    ))?;

    let items = hits.into_iter().map(|tag| (tag, ())).collect();
    let report = run_batch("delete tag", items, |tag: Tag, ()| async move {
        client.delete_tag(&tag.id).await
    })
    .await;

    report_batch(console, "tags deleted", &report, config.listing_batch)?;
    Ok(Outcome::Done)
}

// Pattern, review and confirmation; `None` when the operator aborts.
fn select_tags<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    tags: &[Tag],
    config: &Config,
) -> Result<Option<Vec<Tag>>> {
    let threshold = config.tags.review_threshold;
    let mut default = String::new();

    loop {
        console.say("Enter a regular expression; tag names are matched from their start.")?;
        let pattern = console.ask_regex("Pattern: ", &default)?;
        default = pattern.as_str().to_string();

        let hits = filter_tags(tags, &pattern);
        if hits.is_empty() {
            console.say("Not a single hit, you might want to try again.")?;
            continue;
        }

        if hits.len() > threshold {
            console.say(format_args!(
                "There are more than {threshold} hits: display, abort or retry?"
            ))?;
            let display = format!("Display the result set anyway ({} lines)", hits.len());
            match console.menu(&[display.as_str(), "Abort", "Enter a different pattern"])? {
                2 => return Ok(None),
                3 => continue,
                _ => {}
            }
        }

        console.list_paged(&hits, config.listing_batch)?;
        console.say("Are those hits to your liking?")?;
        let delete = format!("Delete the {} selected tags", hits.len());
        match console.menu(&[delete.as_str(), "Edit the pattern", "Abort"])? {
            1 => return Ok(Some(hits)),
            2 => continue,
            _ => return Ok(None),
        }
    }
}
