//! View model for the dataset catalog screen.

use chrono::DateTime;

use super::LoadTicket;
use crate::client::{ListScope, ResourceClient};
use crate::errors::ApiError;
use crate::models::Dataset;

/// Sort order for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most recently created first
    #[default]
    Newest,
    /// Alphabetical by name
    Name,
    /// Most downloaded first
    Downloads,
    /// Largest file first
    Size,
}

/// State behind the dataset catalog screen.
///
/// The loaded rows are kept as the backend returned them; searching,
/// filtering, and sorting happen in [`visible`](Self::visible) so changing
/// a control never needs another network call.
#[derive(Debug, Default)]
pub struct DatasetListModel {
    datasets: Vec<Dataset>,
    pub search_text: String,
    pub sort_key: SortKey,
    /// When set, only datasets of this file type are visible.
    pub file_type: Option<String>,
    loading: bool,
    error: Option<ApiError>,
    generation: u64,
}

impl DatasetListModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load, invalidating any response still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        LoadTicket::new(self.generation)
    }

    /// Apply a load result. Returns `false` when the ticket is stale, in
    /// which case the model is left untouched.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Dataset>, ApiError>,
    ) -> bool {
        if !ticket.matches(self.generation) {
            tracing::debug!("Discarding stale dataset list response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(datasets) => self.datasets = datasets,
            Err(err) => self.error = Some(err),
        }
        true
    }

    /// Drop any result still in flight without clearing loaded rows.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    /// Load the given scope from the backend and apply the result.
    pub async fn refresh(&mut self, client: &ResourceClient, scope: ListScope) -> bool {
        let ticket = self.begin_load();
        let result = client.list_datasets(scope).await;
        self.complete_load(ticket, result)
    }

    /// Remove one dataset locally, for when a delete already succeeded on
    /// the backend and a full reload is not worth it.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.datasets.len();
        self.datasets.retain(|dataset| dataset.id != id);
        self.datasets.len() != before
    }

    /// The rows the screen should render, after search, file-type filter,
    /// and sort.
    pub fn visible(&self) -> Vec<&Dataset> {
        let needle = self.search_text.trim().to_lowercase();
        let mut rows: Vec<&Dataset> = self
            .datasets
            .iter()
            .filter(|dataset| needle.is_empty() || matches_search(dataset, &needle))
            .filter(|dataset| match &self.file_type {
                Some(file_type) => dataset.file_type.eq_ignore_ascii_case(file_type),
                None => true,
            })
            .collect();
        match self.sort_key {
            SortKey::Newest => rows.sort_by(|a, b| compare_created(b, a)),
            SortKey::Name => {
                rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            }
            SortKey::Downloads => rows.sort_by(|a, b| b.downloads.cmp(&a.downloads)),
            SortKey::Size => rows.sort_by(|a, b| b.size.cmp(&a.size)),
        }
        rows
    }

    /// Distinct file types among the loaded rows, for the filter control.
    pub fn file_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .datasets
            .iter()
            .map(|dataset| dataset.file_type.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }
}

fn matches_search(dataset: &Dataset, needle: &str) -> bool {
    dataset.name.to_lowercase().contains(needle)
        || dataset.description.to_lowercase().contains(needle)
        || dataset
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// Compare by creation time, falling back to the raw strings when a
/// timestamp does not parse.
fn compare_created(a: &Dataset, b: &Dataset) -> std::cmp::Ordering {
    let parse = |value: &str| DateTime::parse_from_rfc3339(value).ok();
    match (parse(&a.created_at), parse(&b.created_at)) {
        (Some(a_ts), Some(b_ts)) => a_ts.cmp(&b_ts),
        _ => a.created_at.cmp(&b.created_at),
    }
}
