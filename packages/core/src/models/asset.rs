//! Uploaded asset descriptor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptor the store returns for an uploaded file (image paste/drop)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// File name the client uploaded under
    pub ori_file_name: String,

    pub content_type: String,

    pub create_time: DateTime<Utc>,
}
