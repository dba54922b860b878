use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::collections::HashSet;
use tracing::debug;

use super::models::RawRecord;
use crate::error::RoundupResult;

/// Default number of days ahead the cutoff window covers
pub const DEFAULT_CUTOFF_DAYS: u32 = 10;
/// Default minimum number of events before the cutoff is ignored
pub const DEFAULT_MIN_EVENTS: usize = 10;

/// Parameters for selecting upcoming events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    pub cutoff_days: u32,
    pub min_events: usize,
    pub reference: DateTime<Utc>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

impl FilterConfig {
    /// Default window and minimum, anchored at the given instant
    pub fn at(reference: DateTime<Utc>) -> Self {
        Self {
            cutoff_days: DEFAULT_CUTOFF_DAYS,
            min_events: DEFAULT_MIN_EVENTS,
            reference,
        }
    }

    pub fn with_cutoff_days(mut self, cutoff_days: u32) -> Self {
        self.cutoff_days = cutoff_days;
        self
    }

    pub fn with_min_events(mut self, min_events: usize) -> Self {
        self.min_events = min_events;
        self
    }

    /// Latest start instant still inside the cutoff window
    ///
    /// A window reaching past the representable range covers everything.
    pub fn cutoff(&self) -> DateTime<Utc> {
        TimeDelta::try_days(i64::from(self.cutoff_days))
            .and_then(|window| self.reference.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Which rule produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionWindow {
    /// Everything starting within `days` of the reference
    Cutoff { days: u32 },
    /// The window was too sparse, so the first `limit` upcoming events were taken
    Fallback { limit: usize },
}

/// Records chosen for posting, in start order
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub records: Vec<RawRecord>,
    pub window: SelectionWindow,
}

/// Select upcoming records for a roundup
///
/// Keeps events starting on or after the reference date, sorted by start,
/// with only the earliest occurrence of each recurring series. Events inside
/// the cutoff window are returned when there are at least `min_events` of
/// them; otherwise the first `min_events + 1` upcoming events are returned.
///
/// Every record must carry a parseable `Start`, the first one that does not
/// fails the whole selection.
pub fn select_records(records: Vec<RawRecord>, config: &FilterConfig) -> RoundupResult<Selection> {
    let reference_date = config.reference.date_naive();

    let mut upcoming: Vec<(DateTime<FixedOffset>, RawRecord)> = Vec::with_capacity(records.len());
    for record in records {
        let start = record.start()?;
        if start.date_naive() >= reference_date {
            upcoming.push((start, record));
        }
    }

    upcoming.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut seen_series = HashSet::new();
    upcoming.retain(|(_, record)| match record.recurring_event_id() {
        Some(series) => seen_series.insert(series.to_string()),
        None => true,
    });

    let cutoff = config.cutoff();
    let in_window = upcoming
        .iter()
        .take_while(|(start, _)| start.with_timezone(&Utc) <= cutoff)
        .count();

    let window = if in_window >= config.min_events {
        upcoming.truncate(in_window);
        SelectionWindow::Cutoff {
            days: config.cutoff_days,
        }
    } else {
        let limit = config.min_events.saturating_add(1);
        upcoming.truncate(limit);
        SelectionWindow::Fallback { limit }
    };

    debug!(
        "Selected {} upcoming records ({} inside the {}-day window)",
        upcoming.len(),
        in_window,
        config.cutoff_days
    );

    Ok(Selection {
        records: upcoming.into_iter().map(|(_, record)| record).collect(),
        window,
    })
}

/// Select upcoming records, discarding which rule was applied
pub fn filter_records(records: Vec<RawRecord>, config: &FilterConfig) -> RoundupResult<Vec<RawRecord>> {
    Ok(select_records(records, config)?.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::airtable::models::fields;
    use crate::error::Error;
    use chrono::TimeZone;
    use serde_json::json;

    fn create_event(title: &str, start: &str, recurring_event_id: &str) -> RawRecord {
        RawRecord::from_fields(json!({
            "Title": title,
            "All Day": false,
            "Start": start,
            "Location": "",
            "Recurring Event ID": recurring_event_id,
        }))
    }

    fn new_year_2021() -> FilterConfig {
        FilterConfig::at(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap())
    }

    fn titles(records: &[RawRecord]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r.text(fields::TITLE).unwrap_or(""))
            .collect()
    }

    fn day_records(days: &[u32]) -> Vec<RawRecord> {
        days.iter()
            .map(|day| {
                create_event(
                    &format!("Day {} Event", day),
                    &format!("2021-01-{:02}T00:00:00Z", day),
                    "",
                )
            })
            .collect()
    }

    #[test]
    fn test_only_includes_future_events() {
        let records = vec![
            create_event("Past Event", "2020-10-14T17:45:00.000Z", ""),
            create_event("Future Event", "2022-10-14T17:45:00.000Z", ""),
        ];
        let filtered = filter_records(records, &new_year_2021()).unwrap();

        assert_eq!(titles(&filtered), vec!["Future Event"]);
    }

    #[test]
    fn test_sorts_events_by_start_time() {
        let records = vec![
            create_event("Event 3", "2022-03-14T17:45:00.000Z", ""),
            create_event("Event 1", "2022-01-14T17:45:00.000Z", ""),
            create_event("Event 2", "2022-02-14T17:45:00.000Z", ""),
        ];
        let filtered = filter_records(records, &new_year_2021()).unwrap();

        assert_eq!(titles(&filtered), vec!["Event 1", "Event 2", "Event 3"]);
    }

    #[test]
    fn test_only_includes_earliest_upcoming_instance_of_recurring_event() {
        let records = vec![
            create_event("Past Event", "2020-10-14T17:45:00.000Z", "some-id"),
            create_event("Upcoming Event", "2021-10-14T17:45:00.000Z", "some-id"),
            create_event("Later Event", "2022-10-14T17:45:00.000Z", "some-id"),
        ];
        let filtered = filter_records(records, &new_year_2021()).unwrap();

        assert_eq!(titles(&filtered), vec!["Upcoming Event"]);
    }

    #[test]
    fn test_only_includes_events_for_today_plus_next_10_days() {
        let config = new_year_2021().with_min_events(1);
        let selection = select_records(day_records(&[1, 11, 12]), &config).unwrap();

        assert_eq!(titles(&selection.records), vec!["Day 1 Event", "Day 11 Event"]);
        assert_eq!(selection.window, SelectionWindow::Cutoff { days: 10 });
    }

    #[test]
    fn test_includes_up_to_min_events_count_if_fewer_than_min_in_next_10_days() {
        let config = new_year_2021().with_min_events(3);
        let selection = select_records(day_records(&[1, 11, 12]), &config).unwrap();

        assert_eq!(selection.records.len(), 3);
        assert_eq!(titles(&selection.records)[2], "Day 12 Event");
        assert_eq!(selection.window, SelectionWindow::Fallback { limit: 4 });
    }

    #[test]
    fn test_fallback_takes_min_events_plus_one() {
        let config = new_year_2021().with_min_events(3);
        let filtered = filter_records(day_records(&[1, 20, 21, 22, 23, 24]), &config).unwrap();

        assert_eq!(
            titles(&filtered),
            vec!["Day 1 Event", "Day 20 Event", "Day 21 Event", "Day 22 Event"]
        );
    }

    #[test]
    fn test_zero_min_events_keeps_cutoff_window() {
        let config = new_year_2021().with_min_events(0);
        let filtered = filter_records(day_records(&[20, 21]), &config).unwrap();

        assert!(filtered.is_empty());
    }

    #[test]
    fn test_huge_cutoff_covers_every_upcoming_event() {
        let config = new_year_2021().with_cutoff_days(100_000_000).with_min_events(1);
        assert_eq!(config.cutoff(), DateTime::<Utc>::MAX_UTC);

        let selection = select_records(day_records(&[2, 30]), &config).unwrap();

        assert_eq!(titles(&selection.records), vec!["Day 2 Event", "Day 30 Event"]);
        assert_eq!(selection.window, SelectionWindow::Cutoff { days: 100_000_000 });
    }

    #[test]
    fn test_empty_input() {
        let selection = select_records(Vec::new(), &new_year_2021()).unwrap();
        assert!(selection.records.is_empty());
    }

    #[test]
    fn test_same_day_event_already_started_is_kept() {
        let config = FilterConfig::at(Utc.with_ymd_and_hms(2021, 1, 5, 20, 0, 0).unwrap());
        let records = vec![create_event("Morning", "2021-01-05T08:00:00Z", "")];

        assert_eq!(filter_records(records, &config).unwrap().len(), 1);
    }

    #[test]
    fn test_non_recurring_duplicates_are_kept() {
        let records = vec![
            create_event("A", "2021-01-02T10:00:00Z", ""),
            create_event("A", "2021-01-02T10:00:00Z", ""),
        ];
        assert_eq!(filter_records(records, &new_year_2021()).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_start_fails_fast() {
        let records = vec![
            create_event("Fine", "2021-01-02T10:00:00Z", ""),
            RawRecord::from_fields(json!({"Title": "Broken"})).with_id("recBroken"),
        ];
        let err = filter_records(records, &new_year_2021()).unwrap_err();

        assert!(matches!(err, Error::InvalidRecord { ref record, .. } if record == "recBroken"));
    }
}
