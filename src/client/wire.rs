//! Wire-format records for the DataRepo REST dialect.
//!
//! The backend speaks snake_case JSON with its own field names (`title`,
//! `is_public`, numeric ids). Everything in this module is an adapter from
//! that dialect into the canonical models; swap this module out to target a
//! different backend variant without touching the rest of the crate.

use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::{
    Dataset, Principal, PrincipalKind, UpdateDatasetRequest, Visibility,
};

/// Hospital account as the backend serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WirePrincipal {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub dataset_count: i64,
    #[serde(default)]
    pub download_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_type: Option<String>,
}

impl From<WirePrincipal> for Principal {
    fn from(wire: WirePrincipal) -> Self {
        let full_name = format!("{} {}", wire.first_name.trim(), wire.last_name.trim());
        let full_name = full_name.trim();
        let display_name = if full_name.is_empty() {
            wire.username.clone()
        } else {
            full_name.to_string()
        };
        let kind = wire
            .organization_type
            .as_deref()
            .and_then(PrincipalKind::from_str)
            .unwrap_or_default();
        Principal {
            id: wire.id.to_string(),
            display_name,
            email: wire.email,
            dataset_count: wire.dataset_count,
            download_count: wire.download_count,
            joined_date: wire.date_joined,
            location: wire.location,
            kind,
        }
    }
}

/// Dataset as the backend serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireDataset {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub is_public: bool,
    pub owner_id: i64,
    #[serde(default)]
    pub owner_name: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub download_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_columns: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_rows: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_data: Option<Vec<serde_json::Value>>,
}

impl From<WireDataset> for Dataset {
    fn from(wire: WireDataset) -> Self {
        let visibility = if wire.is_public {
            Visibility::Public
        } else {
            Visibility::Private
        };
        Dataset {
            id: wire.id.to_string(),
            name: wire.title,
            description: wire.description,
            tags: wire.tags,
            file_type: wire.file_type.unwrap_or_default().to_uppercase(),
            size: wire.size,
            visibility,
            owner_id: wire.owner_id.to_string(),
            owner_name: wire.owner_name,
            created_at: wire.created_at,
            last_updated: wire.updated_at,
            downloads: wire.download_count,
            columns: wire.num_columns,
            rows: wire.num_rows,
            preview: wire.preview_data,
        }
    }
}

/// Partial dataset update in wire field names. `None` fields are omitted
/// from the payload entirely so the backend leaves them untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct WireDatasetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl From<&UpdateDatasetRequest> for WireDatasetPatch {
    fn from(request: &UpdateDatasetRequest) -> Self {
        WireDatasetPatch {
            title: request.name.clone(),
            description: request.description.clone(),
            tags: request.tags.clone(),
            is_public: request.visibility.map(|v| v == Visibility::Public),
        }
    }
}

/// Translate a wire-level field name from a backend validation error into
/// the canonical field name callers know.
pub(crate) fn canonical_field_name(wire: &str) -> &str {
    match wire {
        "title" => "name",
        "is_public" => "visibility",
        "updated_at" => "lastUpdated",
        "preview_data" => "preview",
        other => other,
    }
}

/// Rewrite the field of a backend validation error into canonical naming.
/// Every other error kind passes through unchanged.
pub(crate) fn normalize_validation(error: ApiError) -> ApiError {
    match error {
        ApiError::Validation {
            field: Some(field),
            message,
        } => ApiError::Validation {
            field: Some(canonical_field_name(&field).to_string()),
            message,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wire_dataset() -> WireDataset {
        WireDataset {
            id: 42,
            title: "Patient Vitals 2024".to_string(),
            description: "Anonymized vitals".to_string(),
            tags: vec!["vitals".to_string(), "icu".to_string()],
            file_type: Some("csv".to_string()),
            size: 2048,
            is_public: true,
            owner_id: 7,
            owner_name: "City General Hospital".to_string(),
            created_at: "2024-03-01T10:00:00+00:00".to_string(),
            updated_at: "2024-03-05T16:30:00+00:00".to_string(),
            download_count: 12,
            num_columns: Some(9),
            num_rows: Some(15000),
            preview_data: None,
        }
    }

    #[test]
    fn test_dataset_conversion() {
        let dataset = Dataset::from(sample_wire_dataset());
        assert_eq!(dataset.id, "42");
        assert_eq!(dataset.name, "Patient Vitals 2024");
        assert_eq!(dataset.file_type, "CSV");
        assert_eq!(dataset.visibility, Visibility::Public);
        assert_eq!(dataset.owner_id, "7");
        assert_eq!(dataset.downloads, 12);
        assert_eq!(dataset.columns, Some(9));
    }

    #[test]
    fn test_private_dataset_visibility() {
        let mut wire = sample_wire_dataset();
        wire.is_public = false;
        assert_eq!(Dataset::from(wire).visibility, Visibility::Private);
    }

    #[test]
    fn test_principal_display_name_falls_back_to_username() {
        let wire = WirePrincipal {
            id: 3,
            username: "citygen".to_string(),
            email: "info@citygen.example".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            dataset_count: 0,
            download_count: 0,
            date_joined: None,
            location: None,
            organization_type: Some("public".to_string()),
        };
        let principal = Principal::from(wire);
        assert_eq!(principal.display_name, "citygen");
        assert_eq!(principal.kind, PrincipalKind::Public);
    }

    #[test]
    fn test_principal_full_name_preferred() {
        let wire = WirePrincipal {
            id: 3,
            username: "citygen".to_string(),
            email: String::new(),
            first_name: "City General".to_string(),
            last_name: "Hospital".to_string(),
            dataset_count: 0,
            download_count: 0,
            date_joined: None,
            location: None,
            organization_type: None,
        };
        let principal = Principal::from(wire);
        assert_eq!(principal.display_name, "City General Hospital");
        // Unknown classification reads as private.
        assert_eq!(principal.kind, PrincipalKind::Private);
    }

    #[test]
    fn test_patch_serialization_omits_unset_fields() {
        let request = UpdateDatasetRequest {
            name: Some("Renamed".to_string()),
            visibility: Some(Visibility::Private),
            ..Default::default()
        };
        let value = serde_json::to_value(WireDatasetPatch::from(&request)).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["title"], "Renamed");
        assert_eq!(object["is_public"], false);
    }

    #[test]
    fn test_validation_field_names_are_translated() {
        let error = ApiError::Validation {
            field: Some("title".to_string()),
            message: "This field is required.".to_string(),
        };
        match normalize_validation(error) {
            ApiError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("name")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
