//! Dataset manifests.
//!
//! A dataset is a JSON document describing a set of sequencing files and
//! summary metadata. Converting a legacy `HdfSubreadSet` produces a
//! `SubreadSet` or `ConsensusReadSet` that points at the new BAM files.
//!
//! ```json
//! {
//!   "type": "HdfSubreadSet",
//!   "metaType": "PacBio.DataSet.HdfSubreadSet",
//!   "createdAt": "2015-08-19T15:11:59Z",
//!   "timeStampedName": "hdfsubreadset_150819_151159",
//!   "name": "movie",
//!   "externalResources": [
//!     {
//!       "metaType": "PacBio.SubreadFile.BaxFile",
//!       "resourceId": "file:///data/m1.1.bax.h5"
//!     }
//!   ],
//!   "metadata": { "totalLength": "0", "numRecords": "0" }
//! }
//! ```
//!
//! Fields the converter does not touch are kept verbatim.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod synthesis;

/// URI scheme used for local resources
pub const FILE_SCHEME: &str = "file://";

#[derive(Error, Debug)]
pub enum DataSetError {
    #[error("Failed to read dataset: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse dataset: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Dataset type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSetKind {
    HdfSubreadSet,
    SubreadSet,
    ConsensusReadSet,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for DataSetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HdfSubreadSet => write!(f, "HdfSubreadSet"),
            Self::SubreadSet => write!(f, "SubreadSet"),
            Self::ConsensusReadSet => write!(f, "ConsensusReadSet"),
            Self::Other => write!(f, "unknown"),
        }
    }
}

/// Index file attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileIndex {
    pub meta_type: String,
    pub resource_id: String,
}

/// A file referenced by a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalResource {
    pub meta_type: String,

    pub resource_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_indices: Vec<FileIndex>,

    /// Child resources, e.g. a scraps BAM beneath its subreads BAM
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_resources: Vec<ExternalResource>,
}

impl ExternalResource {
    pub fn new(meta_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            meta_type: meta_type.into(),
            resource_id: resource_id.into(),
            file_indices: Vec::new(),
            external_resources: Vec::new(),
        }
    }
}

/// Summary metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSetMetadata {
    #[serde(default)]
    pub total_length: String,

    #[serde(default)]
    pub num_records: String,

    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// A dataset manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSet {
    #[serde(rename = "type")]
    pub kind: DataSetKind,

    pub meta_type: String,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub time_stamped_name: String,

    #[serde(default)]
    pub external_resources: Vec<ExternalResource>,

    #[serde(default)]
    pub metadata: DataSetMetadata,

    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl DataSet {
    /// Load a dataset from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `DataSetError` if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, DataSetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a dataset from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `DataSetError::ParseError` if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self, DataSetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `DataSetError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, DataSetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the dataset to a file
    ///
    /// # Errors
    ///
    /// Returns `DataSetError` if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), DataSetError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Top-level resource ids as local paths.
    ///
    /// `file://` schemes are stripped and relative ids are resolved against
    /// `base_dir` (normally the directory holding the dataset).
    #[must_use]
    pub fn resolved_resource_ids(&self, base_dir: &Path) -> Vec<String> {
        self.external_resources
            .iter()
            .map(|r| resolve_resource_id(&r.resource_id, base_dir))
            .collect()
    }
}

/// Turn a resource id into a local path string
#[must_use]
pub fn resolve_resource_id(resource_id: &str, base_dir: &Path) -> String {
    let path = resource_id.strip_prefix(FILE_SCHEME).unwrap_or(resource_id);
    if Path::new(path).is_absolute() || base_dir.as_os_str().is_empty() {
        path.to_string()
    } else {
        base_dir.join(path).display().to_string()
    }
}

/// Directory a dataset file lives in, used to resolve relative resources
#[must_use]
pub fn dataset_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HDF_SUBREAD_SET: &str = r#"{
        "type": "HdfSubreadSet",
        "metaType": "PacBio.DataSet.HdfSubreadSet",
        "createdAt": "2015-08-19T15:11:59Z",
        "timeStampedName": "hdfsubreadset_150819_151159",
        "name": "movie",
        "uniqueId": "b095d0a3-94b8-4918-b3af-a3f81bbe519c",
        "externalResources": [
            {"metaType": "PacBio.SubreadFile.BaxFile", "resourceId": "file:///data/m1.1.bax.h5"},
            {"metaType": "PacBio.SubreadFile.BaxFile", "resourceId": "m1.2.bax.h5"},
            {"metaType": "PacBio.SubreadFile.MetadataFile", "resourceId": "m1.metadata.xml"}
        ],
        "metadata": {"totalLength": "0", "numRecords": "0", "collections": ["a"]}
    }"#;

    #[test]
    fn test_parse() {
        let dataset = DataSet::from_json(HDF_SUBREAD_SET).unwrap();
        assert_eq!(dataset.kind, DataSetKind::HdfSubreadSet);
        assert_eq!(dataset.external_resources.len(), 3);
        assert_eq!(dataset.other["name"], "movie");
        assert!(dataset.metadata.other.contains_key("collections"));
    }

    #[test]
    fn test_unknown_kind() {
        let json = r#"{"type": "ReferenceSet", "metaType": "PacBio.DataSet.ReferenceSet"}"#;
        let dataset = DataSet::from_json(json).unwrap();
        assert_eq!(dataset.kind, DataSetKind::Other);
        assert!(dataset.external_resources.is_empty());
    }

    #[test]
    fn test_untouched_fields_survive_serialization() {
        let dataset = DataSet::from_json(HDF_SUBREAD_SET).unwrap();
        let json = dataset.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["uniqueId"], "b095d0a3-94b8-4918-b3af-a3f81bbe519c");
        assert_eq!(value["metadata"]["collections"][0], "a");
        assert_eq!(value["type"], "HdfSubreadSet");
        // Empty child lists are omitted
        assert!(value["externalResources"][0].get("fileIndices").is_none());
    }

    #[test]
    fn test_resolved_resource_ids() {
        let dataset = DataSet::from_json(HDF_SUBREAD_SET).unwrap();
        let ids = dataset.resolved_resource_ids(Path::new("/runs/r1"));
        assert_eq!(
            ids,
            vec![
                "/data/m1.1.bax.h5".to_string(),
                "/runs/r1/m1.2.bax.h5".to_string(),
                "/runs/r1/m1.metadata.xml".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolve_without_base_dir() {
        assert_eq!(resolve_resource_id("m1.2.bax.h5", Path::new("")), "m1.2.bax.h5");
        assert_eq!(dataset_dir(Path::new("in.json")), PathBuf::new());
    }
}
