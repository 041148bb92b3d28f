//! Start-anchored pattern matching
//!
//! A name matches when the pattern matches a prefix of it: `trip` matches
//! `trip2019` but not `roadtrip`, and `trip` also matches `tripod`. This is
//! neither a full match nor a search anywhere in the name.

use crate::types::Tag;
use regex::{Captures, Regex};

/// Whether `pattern` matches `text` starting at its first character
pub fn matches_from_start(pattern: &Regex, text: &str) -> bool {
    // The leftmost match starts at 0 whenever any match does.
    pattern.find(text).is_some_and(|m| m.start() == 0)
}

/// Captures of a match starting at the first character of `text`
pub fn captures_from_start<'t>(pattern: &Regex, text: &'t str) -> Option<Captures<'t>> {
    pattern
        .captures(text)
        .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0))
}

/// The tags whose name matches `pattern` from the start, in input order
pub fn filter_tags(tags: &[Tag], pattern: &Regex) -> Vec<Tag> {
    tags.iter()
        .filter(|tag| matches_from_start(pattern, &tag.name))
        .cloned()
        .collect()
}
