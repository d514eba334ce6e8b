//! Conversion between elapsed-time strings and milliseconds.

use std::time::Duration;

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Converts `H:M:S:ms` (or `H:M:S`, whole seconds) to milliseconds.
///
/// Any other field count, an empty or non-numeric field, or an overflowing
/// total yields `None`.
///
/// # Examples
/// ```
/// use grafy_core::parse_elapsed_ms;
///
/// assert_eq!(parse_elapsed_ms("0:00:00:096"), Some(96));
/// assert_eq!(parse_elapsed_ms("1:02:03"), Some(3_723_000));
/// assert_eq!(parse_elapsed_ms("0:00"), None);
/// ```
#[must_use]
pub fn parse_elapsed_ms(text: &str) -> Option<u64> {
    let fields = text
        .trim()
        .split(':')
        .map(|field| field.parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;
    let (hours, minutes, seconds, millis) = match fields.as_slice() {
        &[hours, minutes, seconds, millis] => (hours, minutes, seconds, millis),
        &[hours, minutes, seconds] => (hours, minutes, seconds, 0),
        _ => return None,
    };
    hours
        .checked_mul(MS_PER_HOUR)?
        .checked_add(minutes.checked_mul(MS_PER_MINUTE)?)?
        .checked_add(seconds.checked_mul(MS_PER_SECOND)?)?
        .checked_add(millis)
}

/// Formats a duration as `H:MM:SS:mmm`, the form written to run logs.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use grafy_core::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_millis(3_723_045)), "1:02:03:045");
/// ```
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    let millis = elapsed.subsec_millis();
    format!("{hours}:{minutes:02}:{seconds:02}:{millis:03}")
}
