use chrono::{NaiveDate, NaiveTime};

use crate::utils::time::{format_event_date, format_start_time};

/// An event ready to be rendered onto a card
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub location: String,
}

impl Event {
    /// Date line as shown on the card
    pub fn formatted_date(&self) -> String {
        format_event_date(self.date)
    }

    /// Start time line as shown on the card, if the event has one
    pub fn formatted_start_time(&self) -> Option<String> {
        self.start_time.map(format_start_time)
    }
}
