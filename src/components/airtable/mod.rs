mod client;
pub mod filter;
pub mod models;

pub use client::{AirtableClient, AIRTABLE_API_URL};
pub use filter::{filter_records, select_records, FilterConfig, Selection, SelectionWindow};
pub use models::RawRecord;

use crate::error::RoundupResult;
use async_trait::async_trait;

/// Which table and view to read records from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub table: String,
    pub view: Option<String>,
    pub filter_formula: Option<String>,
}

impl RecordQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn with_filter_formula(mut self, formula: impl Into<String>) -> Self {
        self.filter_formula = Some(formula.into());
        self
    }
}

/// Source of raw event records
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every record matching the query
    async fn fetch(&self, query: &RecordQuery) -> RoundupResult<Vec<RawRecord>>;
}
