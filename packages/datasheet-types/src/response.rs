//! Response envelope and per-endpoint payloads.

use serde::{Deserialize, Serialize};

use crate::field::FieldDescriptor;
use crate::record::RawRow;

/// Envelope wrapping every API response.
///
/// `data` is absent when `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the server accepted the request
    pub success: bool,
    /// Server status code
    #[serde(default)]
    pub code: Option<u16>,
    /// Human-readable status message
    #[serde(default)]
    pub message: String,
    /// Response payload
    pub data: Option<T>,
}

/// Payload of record create and update responses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordsData {
    /// Affected rows
    #[serde(default)]
    pub records: Vec<RawRow>,
}

/// Payload of the field metadata response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldsData {
    /// Fields in datasheet order
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}
