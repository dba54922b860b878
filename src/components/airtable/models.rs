use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{invalid_record, RoundupResult};
use crate::utils::time::parse_timestamp;

/// Field names used by the events table
pub mod fields {
    pub const START: &str = "Start";
    pub const RECURRING_EVENT_ID: &str = "Recurring Event ID";
    pub const TITLE: &str = "Title";
    pub const LOCATION: &str = "Location";
    pub const DATE: &str = "Date";
    pub const START_TIME: &str = "Start Time";
    pub const ALL_DAY: &str = "All Day";
}

/// A record as returned by the events table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: String,
    #[serde(
        rename = "createdTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawRecord {
    /// Build a record from a JSON object of fields
    ///
    /// Anything other than an object yields a record with no fields.
    pub fn from_fields(fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            fields,
            ..Default::default()
        }
    }

    /// Set the record id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Get a non-empty text field
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Get a checkbox field, absent means unchecked
    pub fn flag(&self, field: &str) -> bool {
        self.fields
            .get(field)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Start timestamp of the event
    pub fn start(&self) -> RoundupResult<DateTime<FixedOffset>> {
        let raw = self
            .text(fields::START)
            .ok_or_else(|| invalid_record(&self.id, "missing Start field"))?;
        parse_timestamp(raw).ok_or_else(|| {
            invalid_record(
                &self.id,
                &format!("Start '{}' is not a timestamp with an offset", raw),
            )
        })
    }

    /// Recurring series id, `None` for one-off events
    pub fn recurring_event_id(&self) -> Option<&str> {
        self.text(fields::RECURRING_EVENT_ID)
    }
}
