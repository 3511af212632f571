//! Raw record rows, pages and attachment descriptors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Remote representation of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    /// Opaque record id
    #[serde(rename = "recordId")]
    pub id: String,
    /// Canonical field key → value; empty cells are omitted by the server
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Creation timestamp (ms since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Last update timestamp (ms since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl RawRow {
    /// Creates a row with the given id and field values.
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
            created_at: None,
            updated_at: None,
        }
    }
}

/// One page of a record listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Total rows matching the query (all pages)
    pub total: u64,
    /// 1-based page number
    pub page_num: u64,
    /// Rows per page
    pub page_size: u64,
    /// Rows on this page, in server order
    #[serde(default)]
    pub records: Vec<RawRow>,
}

impl Page {
    /// Returns true when rows remain beyond this page.
    pub fn has_more(&self) -> bool {
        self.page_num.saturating_mul(self.page_size) < self.total
    }
}

/// Attachment descriptor returned by the upload endpoint and stored in
/// attachment cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Storage token identifying the uploaded file
    #[serde(alias = "id")]
    pub token: String,
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type
    pub mime_type: String,
    /// Download URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Image width, when the file is an image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Image height, when the file is an image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Preview URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}
