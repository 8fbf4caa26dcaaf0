//! View model for the dataset upload form.

use crate::client::ResourceClient;
use crate::errors::ApiError;
use crate::models::{
    format_size, CreateDatasetRequest, Dataset, FilePayload, Visibility, MAX_UPLOAD_BYTES,
};

/// State behind the upload form. Fields mirror the form controls; `tags`
/// stays the raw comma-separated text the user typed until submission.
#[derive(Debug, Default)]
pub struct CreateDatasetForm {
    pub name: String,
    pub description: String,
    pub tags: String,
    pub visibility: Visibility,
    pub file: Option<FilePayload>,
    submitting: bool,
    error: Option<ApiError>,
}

impl CreateDatasetForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a file for upload.
    pub fn attach_file(&mut self, filename: &str, content_type: &str, bytes: Vec<u8>) {
        self.file = Some(FilePayload {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
    }

    /// Check the form and build the request it describes. Never touches the
    /// network; oversized or incomplete forms fail here.
    pub fn validate(&self) -> Result<CreateDatasetRequest, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation {
                field: Some("name".to_string()),
                message: "a dataset name is required".to_string(),
            });
        }
        let Some(file) = &self.file else {
            return Err(ApiError::Validation {
                field: Some("file".to_string()),
                message: "a file is required".to_string(),
            });
        };
        if file.size() > MAX_UPLOAD_BYTES {
            return Err(ApiError::Validation {
                field: Some("file".to_string()),
                message: format!(
                    "file is {}, above the {} upload limit",
                    format_size(file.size()),
                    format_size(MAX_UPLOAD_BYTES)
                ),
            });
        }
        Ok(CreateDatasetRequest {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            tags: parse_tags(&self.tags),
            visibility: self.visibility,
            file: file.clone(),
        })
    }

    /// Validate and submit the form. The form keeps its contents on failure
    /// so the user can correct and retry.
    pub async fn submit(&mut self, client: &ResourceClient) -> Result<Dataset, ApiError> {
        let request = match self.validate() {
            Ok(request) => request,
            Err(err) => {
                self.error = Some(err.clone());
                return Err(err);
            }
        };
        self.submitting = true;
        let result = client.create_dataset(&request).await;
        self.submitting = false;
        match &result {
            Ok(_) => self.error = None,
            Err(err) => self.error = Some(err.clone()),
        }
        result
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }
}

/// Split comma-separated tag text into clean tags: trimmed, empties
/// dropped, duplicates collapsed keeping first appearance.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if tags.iter().any(|seen| seen == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> CreateDatasetForm {
        let mut form = CreateDatasetForm::new();
        form.name = "Ward Census".to_string();
        form.description = "Daily occupancy".to_string();
        form.tags = "census, beds".to_string();
        form.attach_file("census.csv", "text/csv", b"a,b\n1,2\n".to_vec());
        form
    }

    #[test]
    fn test_parse_tags_trims_and_dedupes() {
        assert_eq!(
            parse_tags("icu, beds , icu,,  "),
            vec!["icu".to_string(), "beds".to_string()]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn test_validate_builds_request() {
        let request = filled_form().validate().unwrap();
        assert_eq!(request.name, "Ward Census");
        assert_eq!(request.tags, vec!["census".to_string(), "beds".to_string()]);
        assert_eq!(request.visibility, Visibility::Private);
        assert_eq!(request.file.filename, "census.csv");
    }

    #[test]
    fn test_validate_requires_name() {
        let mut form = filled_form();
        form.name = "   ".to_string();
        match form.validate() {
            Err(ApiError::Validation { field, .. }) => assert_eq!(field.as_deref(), Some("name")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_requires_file() {
        let mut form = filled_form();
        form.file = None;
        match form.validate() {
            Err(ApiError::Validation { field, .. }) => assert_eq!(field.as_deref(), Some("file")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let mut form = filled_form();
        form.attach_file(
            "huge.csv",
            "text/csv",
            vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize],
        );
        match form.validate() {
            Err(ApiError::Validation { field, message }) => {
                assert_eq!(field.as_deref(), Some("file"));
                assert!(message.contains("10 MB"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
