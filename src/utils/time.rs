use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::error::{config_error, RoundupResult};

/// Parse an ISO-8601 timestamp that carries a UTC offset
///
/// Naive timestamps are rejected, since the upcoming-events window can only be
/// computed from an unambiguous instant.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

/// Parse a calendar date in YYYY-MM-DD format
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parse a clock time such as "9:00am", "9:00 PM" or "9am"
///
/// Plain 24-hour "HH:MM" strings are accepted too.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    if let Some(clock) = compact
        .strip_suffix("am")
        .or_else(|| compact.strip_suffix("pm"))
    {
        let meridiem = &compact[clock.len()..];
        let clock = if clock.contains(':') {
            clock.to_string()
        } else {
            format!("{}:00", clock)
        };
        return NaiveTime::parse_from_str(&format!("{}{}", clock, meridiem), "%I:%M%p").ok();
    }

    NaiveTime::parse_from_str(&compact, "%H:%M").ok()
}

/// Resolve an IANA timezone name
pub fn parse_timezone(name: &str) -> RoundupResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| config_error(&format!("Invalid timezone '{}': {}", name, e)))
}

/// Format a date the way event cards show it, e.g. "Thursday, Nov 21"
pub fn format_event_date(date: NaiveDate) -> String {
    date.format("%A, %b %d").to_string()
}

/// Format a start time the way event cards show it, e.g. "5:00 pm"
pub fn format_start_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string().to_lowercase()
}

/// Format the date a roundup is posted, e.g. "Monday, Jan 01, 2024"
pub fn format_post_date(date: NaiveDate) -> String {
    date.format("%A, %b %d, %Y").to_string()
}
