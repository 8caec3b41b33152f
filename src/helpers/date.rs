//! Date helper functions

use chrono::NaiveDateTime;

/// Format a date using a Moment.js-style format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date(date: &NaiveDateTime, format: &str) -> String {
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Format date in full format (like "January 15, 2024")
pub fn full_date(date: &NaiveDateTime) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `YYYY-MM-DD`, used for sitemap `lastmod` and `<time datetime>`
pub fn iso_date(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longer tokens first so "MMMM" is not eaten by "MM"
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}
