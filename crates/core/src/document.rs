//! Documents attached to a signature request.

use serde::{Deserialize, Serialize};

use crate::types::DocKey;

/// A PDF in the active document set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub doc_key: DocKey,
    pub name: String,
    /// Cloud-storage identifier when the file came from the user's cloud.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_uuid: Option<String>,
    /// Known once the document has been rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

impl Document {
    pub fn new(doc_key: impl Into<DocKey>, name: impl Into<String>) -> Self {
        Self {
            doc_key: doc_key.into(),
            name: name.into(),
            cloud_uuid: None,
            page_count: None,
        }
    }
}
