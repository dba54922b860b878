use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use tokio::time::{sleep, Duration};
use tracing::{debug, info};
use url::Url;

use super::SocialPublisher;
use crate::config::InstagramConfig;
use crate::error::{publish_error, RoundupResult};

/// Instagram Graph API root, including the API version
pub const GRAPH_API_URL: &str = "https://graph.facebook.com/v21.0/";

const STATUS_POLL_ATTEMPTS: u32 = 10;
const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ContainerStatus {
    #[serde(default)]
    status_code: Option<String>,
}

/// Publishes carousel albums through the Instagram Graph API
///
/// The Graph API fetches images by URL, so every local image path must live
/// under `image_base`, which is expected to be served at `public_base_url`.
#[derive(Clone)]
pub struct InstagramPublisher {
    client: Client,
    access_token: String,
    user_id: String,
    graph_url: Url,
    image_base: PathBuf,
    public_base_url: Url,
    collaborators: Vec<String>,
    poll_attempts: u32,
    poll_interval: Duration,
}

impl InstagramPublisher {
    /// Create a publisher for images stored under `image_base`
    pub fn new(config: &InstagramConfig, image_base: impl Into<PathBuf>) -> RoundupResult<Self> {
        let graph_url = Url::parse(GRAPH_API_URL)
            .map_err(|e| publish_error(&format!("Failed to parse URL: {}", e)))?;
        let public_base_url = Url::parse(&config.public_base_url).map_err(|e| {
            publish_error(&format!(
                "Invalid IMAGE_PUBLIC_BASE_URL '{}': {}",
                config.public_base_url, e
            ))
        })?;

        Ok(Self {
            client: Client::new(),
            access_token: config.access_token.clone(),
            user_id: config.user_id.clone(),
            graph_url,
            image_base: image_base.into(),
            public_base_url,
            collaborators: config.collaborators.clone(),
            poll_attempts: STATUS_POLL_ATTEMPTS,
            poll_interval: STATUS_POLL_INTERVAL,
        })
    }

    /// Point the publisher at a different Graph API root
    pub fn with_graph_url(mut self, graph_url: Url) -> Self {
        self.graph_url = graph_url;
        self
    }

    /// How long to wait for Instagram to finish processing a carousel
    pub fn with_status_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.poll_attempts = attempts.max(1);
        self.poll_interval = interval;
        self
    }

    /// URL Instagram can download a rendered image from
    fn public_url(&self, path: &Path) -> RoundupResult<Url> {
        let relative = path.strip_prefix(&self.image_base).map_err(|_| {
            publish_error(&format!(
                "Image {} is outside {}",
                path.display(),
                self.image_base.display()
            ))
        })?;

        let mut url = self.public_base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| publish_error("IMAGE_PUBLIC_BASE_URL cannot be a base"))?;
            segments.pop_if_empty();
            for component in relative.components() {
                if let Component::Normal(part) = component {
                    segments.push(&part.to_string_lossy());
                }
            }
        }
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> RoundupResult<Url> {
        self.graph_url
            .join(path)
            .map_err(|e| publish_error(&format!("Failed to build Graph API URL: {}", e)))
    }

    /// Parameters for the carousel container
    fn carousel_params(&self, children: &[String], caption: &str) -> RoundupResult<Vec<(&'static str, String)>> {
        let mut params = vec![
            ("media_type", "CAROUSEL".to_string()),
            ("children", children.join(",")),
            ("caption", caption.to_string()),
        ];
        if !self.collaborators.is_empty() {
            params.push(("collaborators", serde_json::to_string(&self.collaborators)?));
        }
        Ok(params)
    }

    /// POST a form and return the id of the created object
    async fn create(&self, path: &str, mut params: Vec<(&'static str, String)>) -> RoundupResult<String> {
        params.push(("access_token", self.access_token.clone()));

        let response = self
            .client
            .post(self.endpoint(path)?)
            .form(&params)
            .send()
            .await
            .map_err(|e| publish_error(&format!("Request to {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(publish_error(&format!(
                "Request to {} failed: HTTP {} - {}",
                path, status, error_body
            )));
        }

        let created: CreatedObject = response
            .json()
            .await
            .map_err(|e| publish_error(&format!("Failed to parse response from {}: {}", path, e)))?;
        Ok(created.id)
    }

    /// Wait until Instagram has processed a container
    async fn wait_until_finished(&self, container_id: &str) -> RoundupResult<()> {
        let mut url = self.endpoint(container_id)?;
        url.query_pairs_mut()
            .append_pair("fields", "status_code")
            .append_pair("access_token", &self.access_token);

        for attempt in 1..=self.poll_attempts {
            let status: ContainerStatus = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| publish_error(&format!("Failed to check container status: {}", e)))?
                .error_for_status()
                .map_err(|e| publish_error(&format!("Failed to check container status: {}", e)))?
                .json()
                .await
                .map_err(|e| publish_error(&format!("Failed to parse container status: {}", e)))?;

            match status.status_code.as_deref() {
                Some("FINISHED") | Some("PUBLISHED") => return Ok(()),
                Some("ERROR") | Some("EXPIRED") => {
                    return Err(publish_error(&format!(
                        "Container {} failed with status {}",
                        container_id,
                        status.status_code.clone().unwrap_or_default()
                    )));
                }
                other => {
                    debug!(
                        "Container {} not ready ({:?}), attempt {}/{}",
                        container_id, other, attempt, self.poll_attempts
                    );
                    sleep(self.poll_interval).await;
                }
            }
        }

        Err(publish_error(&format!(
            "Container {} was not ready after {} checks",
            container_id, self.poll_attempts
        )))
    }
}

#[async_trait]
impl SocialPublisher for InstagramPublisher {
    async fn publish_album(&self, image_paths: &[PathBuf], caption: &str) -> RoundupResult<String> {
        info!("Uploading album of {} images", image_paths.len());
        let media_path = format!("{}/media", self.user_id);

        let mut children = Vec::with_capacity(image_paths.len());
        for path in image_paths {
            let image_url = self.public_url(path)?;
            let id = self
                .create(
                    &media_path,
                    vec![
                        ("image_url", image_url.to_string()),
                        ("is_carousel_item", "true".to_string()),
                    ],
                )
                .await?;
            debug!("Created carousel item {} for {}", id, path.display());
            children.push(id);
        }

        let container = self
            .create(&media_path, self.carousel_params(&children, caption)?)
            .await?;
        self.wait_until_finished(&container).await?;

        let media_id = self
            .create(
                &format!("{}/media_publish", self.user_id),
                vec![("creation_id", container)],
            )
            .await?;

        info!("Published album as media {}", media_id);
        Ok(media_id)
    }
}
