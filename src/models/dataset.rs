//! Dataset model and the request types for dataset mutations.

use serde::{Deserialize, Serialize};

use super::Principal;

/// Largest file the client will accept for upload. Oversized payloads are
/// rejected locally before any network traffic is produced.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Who can see a dataset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl Default for Visibility {
    /// New uploads stay private until the owner opts in to sharing.
    fn default() -> Self {
        Visibility::Private
    }
}

/// A dataset published on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub file_type: String,
    /// File size in bytes. Render with [`format_size`].
    pub size: u64,
    pub visibility: Visibility,
    pub owner_id: String,
    pub owner_name: String,
    pub created_at: String,
    pub last_updated: String,
    #[serde(default)]
    pub downloads: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<serde_json::Value>>,
}

impl Dataset {
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.owner_id == principal.id
    }
}

/// File contents staged for upload.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Request for publishing a new dataset.
#[derive(Debug, Clone)]
pub struct CreateDatasetRequest {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub file: FilePayload,
}

/// Partial update for an existing dataset. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateDatasetRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
}

/// A downloaded dataset file, ready to hand to the host shell for saving.
#[derive(Clone)]
pub struct DatasetDownload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for DatasetDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetDownload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("bytes", &format!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// Human-readable file size, e.g. `"2.5 MB"`. Uses 1024-based units and
/// trims trailing zeros from the fraction.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{value:.2}");
    let formatted = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", formatted, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_basics() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(2_621_440), "2.5 MB");
        assert_eq!(format_size(10 * 1024 * 1024), "10 MB");
    }

    #[test]
    fn test_format_size_caps_at_gigabytes() {
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");
        // Terabyte-scale values still render in GB.
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_visibility_round_trip() {
        assert_eq!(Visibility::from_str("public"), Some(Visibility::Public));
        assert_eq!(Visibility::from_str("private"), Some(Visibility::Private));
        assert_eq!(Visibility::from_str("unlisted"), None);
        assert_eq!(Visibility::Public.as_str(), "public");
        assert_eq!(Visibility::default(), Visibility::Private);
    }
}
