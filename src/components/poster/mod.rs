pub mod batch;
mod caption;

pub use batch::{batch, DEFAULT_BATCH_SIZE, MAX_ALBUM_IMAGES};
pub use caption::CaptionBuilder;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::airtable::{select_records, FilterConfig, RecordQuery, RecordSource, SelectionWindow};
use super::events::{to_event, Event};
use super::images::{batch_dir, event_image_path, intro_image_path, ImageRenderer, IntroCard};
use super::instagram::SocialPublisher;
use crate::config::{BrandSettings, Config};
use crate::error::RoundupResult;
use crate::utils::time::parse_timezone;

/// How a [`Poster`] selects, lays out and captions events
#[derive(Debug, Clone)]
pub struct PosterOptions {
    pub query: RecordQuery,
    pub cutoff_days: u32,
    pub min_events: usize,
    pub batch_size: usize,
    pub image_base_path: PathBuf,
    /// Timezone the intro card's post date is shown in
    pub timezone: Tz,
    pub open_images: bool,
    pub captions: CaptionBuilder,
}

impl PosterOptions {
    /// Default selection and batching for the given table and output directory
    pub fn new(query: RecordQuery, image_base_path: impl Into<PathBuf>) -> Self {
        Self {
            query,
            cutoff_days: super::airtable::filter::DEFAULT_CUTOFF_DAYS,
            min_events: super::airtable::filter::DEFAULT_MIN_EVENTS,
            batch_size: DEFAULT_BATCH_SIZE,
            image_base_path: image_base_path.into(),
            timezone: Tz::UTC,
            open_images: false,
            captions: CaptionBuilder::new(BrandSettings::default()),
        }
    }

    /// Options from the loaded configuration
    pub fn from_config(config: &Config) -> RoundupResult<Self> {
        let query = RecordQuery::new(&config.airtable_events_table_id)
            .with_view(&config.airtable_calendar_view_name);
        let settings = &config.settings;
        Ok(Self {
            query,
            cutoff_days: settings.cutoff_days,
            min_events: settings.min_events,
            batch_size: settings.batch_size,
            image_base_path: config.image_base_path.clone(),
            timezone: parse_timezone(&config.timezone)?,
            open_images: config.open_images,
            captions: CaptionBuilder::new(settings.brand.clone()),
        })
    }
}

/// One album that was published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedBatch {
    pub number: usize,
    pub media_id: String,
    pub image_paths: Vec<PathBuf>,
    pub caption: String,
}

/// Outcome of a posting run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostReport {
    pub batches: Vec<PublishedBatch>,
    /// The run was stopped by a shutdown request before every batch was posted
    pub interrupted: bool,
}

impl PostReport {
    pub fn batches_processed(&self) -> usize {
        self.batches.len()
    }
}

/// Fetches, selects, renders and publishes the upcoming-events roundup
pub struct Poster {
    source: Box<dyn RecordSource>,
    renderer: Box<dyn ImageRenderer>,
    publisher: Box<dyn SocialPublisher>,
    options: PosterOptions,
    shutdown: CancellationToken,
}

impl Poster {
    pub fn new(
        source: Box<dyn RecordSource>,
        renderer: Box<dyn ImageRenderer>,
        publisher: Box<dyn SocialPublisher>,
        options: PosterOptions,
    ) -> Self {
        Self {
            source,
            renderer,
            publisher,
            options,
            shutdown: CancellationToken::new(),
        }
    }

    /// Stop between batches once `token` is cancelled
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Post the roundup as of now
    pub async fn post(&self) -> RoundupResult<PostReport> {
        self.post_at(Utc::now()).await
    }

    /// Post the roundup as of `reference`
    ///
    /// Batches are rendered and published one after another. The first
    /// failure stops the run; albums already published stay published.
    pub async fn post_at(&self, reference: DateTime<Utc>) -> RoundupResult<PostReport> {
        let (events, window) = self.upcoming_events(reference).await?;
        let event_count = events.len();
        let batches = batch(events, self.options.batch_size);
        let total_batches = batches.len();

        let mut report = PostReport::default();
        if total_batches == 0 {
            info!("No upcoming events found, nothing to post");
            return Ok(report);
        }
        info!("Posting {} events in {} batches", event_count, total_batches);

        let post_date = reference.with_timezone(&self.options.timezone).date_naive();

        for (index, events) in batches.iter().enumerate() {
            let batch_no = index + 1;
            if self.shutdown.is_cancelled() {
                warn!(
                    "Shutdown requested, stopping before batch {}/{}",
                    batch_no, total_batches
                );
                report.interrupted = true;
                break;
            }

            let image_paths = self.render_batch(batch_no, total_batches, events, post_date)?;
            let caption = self.options.captions.caption(batch_no, total_batches, window);

            let media_id = self
                .publisher
                .publish_album(&image_paths, &caption)
                .await
                .inspect_err(|e| {
                    error!("Failed to publish batch {}/{}: {}", batch_no, total_batches, e)
                })?;
            info!(
                "Published batch {}/{} as media {}",
                batch_no, total_batches, media_id
            );

            report.batches.push(PublishedBatch {
                number: batch_no,
                media_id,
                image_paths,
                caption,
            });
        }

        Ok(report)
    }

    /// Fetch records and turn the selected ones into events
    pub async fn upcoming_events(
        &self,
        reference: DateTime<Utc>,
    ) -> RoundupResult<(Vec<Event>, SelectionWindow)> {
        let records = self.source.fetch(&self.options.query).await?;
        let config = FilterConfig::at(reference)
            .with_cutoff_days(self.options.cutoff_days)
            .with_min_events(self.options.min_events);

        let selection = select_records(records, &config)?;
        let events = selection
            .records
            .iter()
            .map(to_event)
            .collect::<RoundupResult<Vec<_>>>()?;

        debug!("Selected {} events ({:?})", events.len(), selection.window);
        Ok((events, selection.window))
    }

    /// Render the intro and event images for one batch, in album order
    fn render_batch(
        &self,
        batch_no: usize,
        total_batches: usize,
        events: &[Event],
        post_date: NaiveDate,
    ) -> RoundupResult<Vec<PathBuf>> {
        let base = &self.options.image_base_path;
        fs::create_dir_all(batch_dir(base, batch_no))?;

        let mut paths = Vec::with_capacity(events.len() + 1);

        let intro_path = intro_image_path(base, batch_no);
        let card = IntroCard {
            batch_no,
            total_batches,
            post_date,
        };
        self.renderer.render_intro(&card, &intro_path)?;
        paths.push(intro_path);

        for (index, event) in events.iter().enumerate() {
            let path = event_image_path(base, batch_no, index + 1);
            self.renderer.render_event(event, &path)?;
            paths.push(path);
        }
        info!("Rendered {} images for batch {}", paths.len(), batch_no);

        if self.options.open_images {
            paths.iter().for_each(|path| preview(path));
        }

        Ok(paths)
    }
}

/// Open an image in the system viewer
fn preview(path: &Path) {
    if let Err(e) = webbrowser::open(&path.to_string_lossy()) {
        warn!("Failed to open {}: {}", path.display(), e);
    }
}
