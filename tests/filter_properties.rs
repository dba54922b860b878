use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use roundup::components::airtable::{select_records, FilterConfig, RawRecord, SelectionWindow};
use serde_json::json;
use std::collections::HashSet;

fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 12, 0, 0).unwrap()
}

/// Records starting `hours` from the reference, optionally part of a series
fn records(specs: &[(i64, Option<u8>)]) -> Vec<RawRecord> {
    specs
        .iter()
        .enumerate()
        .map(|(i, (hours, series))| {
            let start = reference() + Duration::hours(*hours);
            let mut fields = json!({
                "Title": format!("Event {}", i),
                "Start": start.to_rfc3339(),
            });
            if let Some(series) = series {
                fields["Recurring Event ID"] = json!(format!("series{}", series));
            }
            RawRecord::from_fields(fields).with_id(format!("rec{}", i))
        })
        .collect()
}

fn specs() -> impl Strategy<Value = Vec<(i64, Option<u8>)>> {
    prop::collection::vec((-720i64..1440, prop::option::of(0u8..5)), 0..40)
}

proptest! {
    #[test]
    fn selection_is_sorted_upcoming_and_deduplicated(
        specs in specs(),
        cutoff_days in 0u32..30,
        min_events in 0usize..15,
    ) {
        let config = FilterConfig::at(reference())
            .with_cutoff_days(cutoff_days)
            .with_min_events(min_events);
        let selection = select_records(records(&specs), &config).unwrap();
        let starts: Vec<_> = selection.records.iter().map(|r| r.start().unwrap()).collect();

        prop_assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert!(starts.iter().all(|s| s.date_naive() >= reference().date_naive()));

        let mut series = HashSet::new();
        for record in &selection.records {
            if let Some(id) = record.recurring_event_id() {
                prop_assert!(series.insert(id.to_string()), "duplicate series {}", id);
            }
        }
    }

    #[test]
    fn window_rule_bounds_the_selection(
        specs in specs(),
        cutoff_days in 0u32..30,
        min_events in 0usize..15,
    ) {
        let config = FilterConfig::at(reference())
            .with_cutoff_days(cutoff_days)
            .with_min_events(min_events);
        let selection = select_records(records(&specs), &config).unwrap();

        match selection.window {
            SelectionWindow::Cutoff { days } => {
                prop_assert_eq!(days, cutoff_days);
                prop_assert!(selection.records.len() >= min_events);
                for record in &selection.records {
                    prop_assert!(record.start().unwrap().with_timezone(&Utc) <= config.cutoff());
                }
            }
            SelectionWindow::Fallback { limit } => {
                prop_assert_eq!(limit, min_events + 1);
                prop_assert!(selection.records.len() <= limit);
            }
        }
    }

    #[test]
    fn selecting_twice_changes_nothing(
        specs in specs(),
        cutoff_days in 0u32..30,
        min_events in 0usize..15,
    ) {
        let config = FilterConfig::at(reference())
            .with_cutoff_days(cutoff_days)
            .with_min_events(min_events);
        let once = select_records(records(&specs), &config).unwrap();
        let twice = select_records(once.records.clone(), &config).unwrap();

        prop_assert_eq!(once, twice);
    }
}
