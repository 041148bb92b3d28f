//! Utility functions for formatting and file naming

use chrono::NaiveDateTime;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Longest response body shown to the operator before it is cut
pub const MAX_DISPLAYED_BODY: usize = 500;

/// Human-readable size with binary prefixes
///
/// # Examples
///
/// ```
/// use immich_helper::utils::format_size;
///
/// assert_eq!(format_size(512), "512.0 B");
/// assert_eq!(format_size(1536), "1.5 KiB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

    let mut value = bytes as f64;
    for unit in UNITS {
        if value.abs() < 1024.0 {
            return format!("{value:3.1} {unit}B");
        }
        value /= 1024.0;
    }
    format!("{value:.1} YiB")
}

const FILE_STAMP: &str = "%Y%m%d_%H%M%S";

/// File name of the form `<prefix><YYYYmmdd_HHMMSS>.<extension>`
pub fn timestamped_file_name(prefix: &str, extension: &str, at: NaiveDateTime) -> String {
    format!("{}{}.{}", prefix, at.format(FILE_STAMP), extension)
}

/// Write `contents` to a new [`timestamped_file_name`] inside `dir`
///
/// An existing file is never replaced: when the name is taken, `_1`, `_2`, ...
/// is appended to the stamp until a free name is found.
pub fn write_timestamped(
    dir: &Path,
    prefix: &str,
    extension: &str,
    at: NaiveDateTime,
    contents: &[u8],
) -> std::io::Result<PathBuf> {
    let mut path = dir.join(timestamped_file_name(prefix, extension, at));
    let mut suffix = 0u32;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents)?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                suffix += 1;
                path = dir.join(format!(
                    "{}{}_{}.{}",
                    prefix,
                    at.format(FILE_STAMP),
                    suffix,
                    extension
                ));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Cut `text` to at most `max` characters, marking the cut
pub fn truncate_for_display(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}... ({} bytes total)", &text[..cut], text.len()),
        None => text.to_string(),
    }
}
