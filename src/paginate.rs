//! Paginated collection
//!
//! Listing endpoints answer one page at a time together with the number of the
//! next page. [`collect_pages`] walks the pages in order and concatenates their
//! items.

use crate::error::{Error, Result};
use crate::types::Page;
use std::future::Future;

/// Number of the first page of every listing
pub const FIRST_PAGE: u32 = 1;

/// Fetch every page starting at [`FIRST_PAGE`] and return all items in server order
///
/// Stops when a page carries no next-page number. Items are not deduplicated.
///
/// # Errors
///
/// Propagates the first error returned by `fetch`. A next-page number that
/// does not move forward is reported as [`Error::MalformedResponse`] for
/// `endpoint`.
pub async fn collect_pages<T, F, Fut>(endpoint: &str, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut page = FIRST_PAGE;

    loop {
        let current = fetch(page).await?;
        tracing::debug!(
            endpoint,
            page,
            items = current.items.len(),
            next_page = ?current.next_page,
            "fetched page"
        );
        items.extend(current.items);

        match current.next_page {
            None => break,
            Some(next) if next > page => page = next,
            Some(next) => {
                return Err(Error::MalformedResponse {
                    endpoint: endpoint.to_string(),
                    reason: format!("next page {next} does not follow page {page}"),
                    body: String::new(),
                });
            }
        }
    }

    Ok(items)
}
