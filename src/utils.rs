//! Small helpers shared across the crate: human-readable byte formatting and
//! the minute-resolution timestamp slug used in archive filenames.

use chrono::{DateTime, Local};

/// Format bytes in human-readable form
///
/// Converts a byte count into a human-readable string using binary units
/// (1024-based). Values below 1 KB are shown as whole numbers; larger values
/// get two decimal places.
///
/// # Example
///
/// ```rust
/// use dirvault::utils::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(1536), "1.50 KB");
/// assert_eq!(format_bytes(1_048_576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a local timestamp as the archive-name slug `DD.MM.YYYY_HH-MM`.
///
/// Minute resolution: two archives of the same source created within the same
/// minute share a filename and the later one overwrites the earlier.
pub fn timestamp_slug(when: DateTime<Local>) -> String {
    when.format("%d.%m.%Y_%H-%M").to_string()
}
