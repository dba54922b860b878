pub mod models;

pub use models::Event;

use crate::components::airtable::models::{fields, RawRecord};
use crate::error::{invalid_record, Error, RoundupResult};
use crate::utils::time::{parse_clock_time, parse_date};

/// Convert a table record into an event
///
/// `Date` is required. `Start Time` is optional, but when present it must be a
/// recognisable clock time. All-day events never carry a start time.
pub fn to_event(record: &RawRecord) -> RoundupResult<Event> {
    let raw_date = record
        .text(fields::DATE)
        .ok_or_else(|| invalid_record(&record.id, "missing Date field"))?;
    let date = parse_date(raw_date).ok_or_else(|| {
        invalid_record(
            &record.id,
            &format!("Date '{}' is not in YYYY-MM-DD format", raw_date),
        )
    })?;

    let start_time = match record.text(fields::START_TIME).map(str::trim) {
        _ if record.flag(fields::ALL_DAY) => None,
        Some(raw) if !raw.is_empty() => Some(parse_clock_time(raw).ok_or_else(|| {
            invalid_record(
                &record.id,
                &format!("Start Time '{}' is not a clock time", raw),
            )
        })?),
        _ => None,
    };

    Ok(Event {
        title: record.text(fields::TITLE).unwrap_or_default().to_string(),
        date,
        start_time,
        location: record.text(fields::LOCATION).unwrap_or_default().to_string(),
    })
}

impl TryFrom<&RawRecord> for Event {
    type Error = Error;

    fn try_from(record: &RawRecord) -> Result<Self, Self::Error> {
        to_event(record)
    }
}
