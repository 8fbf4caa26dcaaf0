//! View model for a single dataset's page.

use super::LoadTicket;
use crate::client::ResourceClient;
use crate::errors::ApiError;
use crate::models::{Dataset, DatasetDownload};

/// State behind the dataset detail screen. Distinguishes "still loading",
/// "loaded", and "this dataset does not exist for you".
#[derive(Debug, Default)]
pub struct DatasetDetailModel {
    dataset: Option<Dataset>,
    resolved: bool,
    loading: bool,
    downloading: bool,
    error: Option<ApiError>,
    generation: u64,
}

impl DatasetDetailModel {
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

    /// Apply a load result. Returns `false` when the ticket is stale.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Option<Dataset>, ApiError>,
    ) -> bool {
        if !ticket.matches(self.generation) {
            tracing::debug!("Discarding stale dataset detail response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(dataset) => {
                self.resolved = true;
                self.dataset = dataset;
            }
            Err(err) => self.error = Some(err),
        }
        true
    }

    /// Drop any result still in flight, for when the screen navigates to a
    /// different dataset.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    /// Fetch the dataset and apply the result.
    pub async fn load(&mut self, client: &ResourceClient, id: &str) -> bool {
        let ticket = self.begin_load();
        let result = client.get_dataset(id).await;
        self.complete_load(ticket, result)
    }

    /// Download the loaded dataset's file. On success the local download
    /// counter is bumped so the screen reflects it without a reload.
    pub async fn download(&mut self, client: &ResourceClient) -> Result<DatasetDownload, ApiError> {
        let Some(id) = self.dataset.as_ref().map(|dataset| dataset.id.clone()) else {
            return Err(ApiError::NotFound("no dataset loaded".to_string()));
        };
        self.downloading = true;
        let result = client.download_dataset(&id).await;
        self.downloading = false;
        match &result {
            Ok(_) => {
                if let Some(dataset) = self.dataset.as_mut() {
                    dataset.downloads += 1;
                }
            }
            Err(err) => self.error = Some(err.clone()),
        }
        result
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// True once a load came back empty: the dataset is gone or hidden.
    pub fn not_found(&self) -> bool {
        self.resolved && self.dataset.is_none()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visibility;

    fn sample_dataset() -> Dataset {
        Dataset {
            id: "7".to_string(),
            name: "Heart Rates".to_string(),
            description: "Ward telemetry".to_string(),
            tags: vec![],
            file_type: "CSV".to_string(),
            size: 2048,
            visibility: Visibility::Public,
            owner_id: "1".to_string(),
            owner_name: "City General Hospital".to_string(),
            created_at: "2024-01-10T08:00:00+00:00".to_string(),
            last_updated: "2024-01-10T08:00:00+00:00".to_string(),
            downloads: 3,
            columns: Some(4),
            rows: Some(900),
            preview: None,
        }
    }

    #[test]
    fn test_absent_dataset_resolves_to_not_found() {
        let mut model = DatasetDetailModel::new();
        assert!(!model.not_found());

        let ticket = model.begin_load();
        model.complete_load(ticket, Ok(None));

        assert!(model.not_found());
        assert!(model.dataset().is_none());
        assert!(model.error().is_none());
    }

    #[test]
    fn test_loaded_dataset_is_exposed() {
        let mut model = DatasetDetailModel::new();
        let ticket = model.begin_load();
        model.complete_load(ticket, Ok(Some(sample_dataset())));

        assert!(!model.not_found());
        assert_eq!(model.dataset().unwrap().name, "Heart Rates");
    }

    #[test]
    fn test_stale_detail_response_is_discarded() {
        let mut model = DatasetDetailModel::new();
        let stale = model.begin_load();
        let fresh = model.begin_load();

        assert!(model.complete_load(fresh, Ok(Some(sample_dataset()))));
        assert!(!model.complete_load(stale, Ok(None)));

        // The earlier response cannot overwrite the newer one.
        assert!(model.dataset().is_some());
        assert!(!model.not_found());
    }

    #[test]
    fn test_load_error_is_kept() {
        let mut model = DatasetDetailModel::new();
        let ticket = model.begin_load();
        model.complete_load(ticket, Err(ApiError::Transport("boom".to_string())));

        assert!(model.error().is_some());
        assert!(!model.not_found());
    }
}
