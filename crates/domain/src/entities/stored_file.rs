use serde::{Deserialize, Serialize};

/// Metadata of a blob just written to the upload directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Generated, unique name inside the upload directory.
    pub file_name: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub file_path: String,
}
