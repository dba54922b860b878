use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::models::RawRecord;
use super::{RecordQuery, RecordSource};
use crate::error::{record_source_error, RoundupResult};

/// Airtable REST API root
pub const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0/";

/// Largest page Airtable will return
const PAGE_SIZE: &str = "100";

/// One page of a list-records response
#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    records: Vec<RawRecord>,
    #[serde(default)]
    offset: Option<String>,
}

/// Record source backed by an Airtable base
#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    api_key: String,
    base_id: String,
    api_url: Url,
}

impl AirtableClient {
    /// Create a client for the given base
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> RoundupResult<Self> {
        let api_url = Url::parse(AIRTABLE_API_URL)
            .map_err(|e| record_source_error(&format!("Failed to parse URL: {}", e)))?;
        Ok(Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_id: base_id.into(),
            api_url,
        })
    }

    /// Point the client at a different API root
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }

    /// Build the list-records URL for one page
    fn records_url(&self, query: &RecordQuery, offset: Option<&str>) -> RoundupResult<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| record_source_error("Airtable API URL cannot be a base"))?
            .pop_if_empty()
            .push(&self.base_id)
            .push(&query.table);

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("pageSize", PAGE_SIZE);
            if let Some(view) = &query.view {
                pairs.append_pair("view", view);
            }
            if let Some(formula) = &query.filter_formula {
                pairs.append_pair("filterByFormula", formula);
            }
            if let Some(offset) = offset {
                pairs.append_pair("offset", offset);
            }
        }

        Ok(url)
    }

    async fn fetch_page(&self, query: &RecordQuery, offset: Option<&str>) -> RoundupResult<RecordPage> {
        let url = self.records_url(query, offset)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| record_source_error(&format!("Failed to fetch records: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(record_source_error(&format!(
                "Failed to fetch records: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| record_source_error(&format!("Failed to parse records response: {}", e)))
    }
}

#[async_trait]
impl RecordSource for AirtableClient {
    async fn fetch(&self, query: &RecordQuery) -> RoundupResult<Vec<RawRecord>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self.fetch_page(query, offset.as_deref()).await?;
            debug!("Fetched page of {} records", page.records.len());
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        info!("Fetched {} records from table {}", records.len(), query.table);
        Ok(records)
    }
}
