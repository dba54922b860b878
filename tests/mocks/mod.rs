#![allow(dead_code)]

use async_trait::async_trait;
use roundup::components::airtable::{RawRecord, RecordQuery, RecordSource};
use roundup::components::events::Event;
use roundup::components::images::{ImageRenderer, IntroCard};
use roundup::components::instagram::SocialPublisher;
use roundup::error::{publish_error, RoundupResult};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Build an events-table record starting at `start`
pub fn event_record(id: &str, start: &str, recurring_id: Option<&str>) -> RawRecord {
    let mut fields = json!({
        "Title": format!("Rally {}", id),
        "Start": start,
        "Date": &start[..10],
        "Start Time": "10:00 am",
        "Location": "City Hall",
    });
    if let Some(recurring_id) = recurring_id {
        fields["Recurring Event ID"] = json!(recurring_id);
    }
    RawRecord::from_fields(fields).with_id(id)
}

/// One record per day at 10:00 UTC, starting the day after 2021-01-01
pub fn daily_records(count: usize) -> Vec<RawRecord> {
    (1..=count)
        .map(|n| {
            let day = chrono::NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
                + chrono::Duration::days(n as i64);
            event_record(
                &format!("rec{:03}", n),
                &format!("{}T10:00:00Z", day.format("%Y-%m-%d")),
                None,
            )
        })
        .collect()
}

/// Record source serving a fixed list of records
#[derive(Debug, Clone, Default)]
pub struct MockRecordSource {
    records: Vec<RawRecord>,
    pub queries: Arc<Mutex<Vec<RecordQuery>>>,
}

impl MockRecordSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn fetch(&self, query: &RecordQuery) -> RoundupResult<Vec<RawRecord>> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.records.clone())
    }
}

/// Renderer writing small placeholder files instead of real cards
#[derive(Debug, Clone, Default)]
pub struct StubRenderer {
    pub rendered: Arc<Mutex<Vec<PathBuf>>>,
    pub intros: Arc<Mutex<Vec<IntroCard>>>,
}

impl ImageRenderer for StubRenderer {
    fn render_intro(&self, card: &IntroCard, path: &Path) -> RoundupResult<()> {
        fs::write(path, format!("intro {}/{}", card.batch_no, card.total_batches))?;
        self.intros.lock().unwrap().push(*card);
        self.rendered.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn render_event(&self, event: &Event, path: &Path) -> RoundupResult<()> {
        fs::write(path, &event.title)?;
        self.rendered.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Publisher recording every album it is asked to post
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    pub albums: Arc<Mutex<Vec<(Vec<PathBuf>, String)>>>,
    /// Fail when asked to post this album, counting from 1
    pub fail_on: Option<usize>,
    /// Cancel this token after posting the first album
    pub cancel_after_first: Option<CancellationToken>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(album: usize) -> Self {
        Self {
            fail_on: Some(album),
            ..Default::default()
        }
    }

    pub fn cancelling(token: CancellationToken) -> Self {
        Self {
            cancel_after_first: Some(token),
            ..Default::default()
        }
    }

    pub fn album_count(&self) -> usize {
        self.albums.lock().unwrap().len()
    }
}

#[async_trait]
impl SocialPublisher for RecordingPublisher {
    async fn publish_album(&self, image_paths: &[PathBuf], caption: &str) -> RoundupResult<String> {
        let mut albums = self.albums.lock().unwrap();
        let album = albums.len() + 1;
        if self.fail_on == Some(album) {
            return Err(publish_error("Graph API returned HTTP 500"));
        }

        albums.push((image_paths.to_vec(), caption.to_string()));
        if let Some(token) = &self.cancel_after_first {
            token.cancel();
        }
        Ok(format!("media-{}", album))
    }
}
