//! API request types and query serialization.

use std::path::PathBuf;

use serde_json::Value;

use datasheet_types::RecordQuery;

use crate::error::{ClientError, Result};

/// Ordered `(key, value)` query-string pairs. Keys may repeat.
pub type QueryPairs = Vec<(String, String)>;

/// One remote operation against a datasheet.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// List field metadata
    ListFields { datasheet: String },
    /// Fetch one page of records
    GetRecords { datasheet: String, query: QueryPairs },
    /// Create records; body is `{"records": [{"fields": {..}}], "fieldKey": ..}`
    CreateRecords { datasheet: String, body: Value },
    /// Update records; body is `{"records": [{"recordId": .., "fields": {..}}], "fieldKey": ..}`
    UpdateRecords { datasheet: String, body: Value },
    /// Delete records by id
    DeleteRecords {
        datasheet: String,
        record_ids: Vec<String>,
    },
    /// Upload a file for use in an attachment cell
    UploadAttachment {
        datasheet: String,
        source: AttachmentSource,
    },
}

impl ApiRequest {
    /// Returns the datasheet this request targets.
    pub fn datasheet(&self) -> &str {
        match self {
            ApiRequest::ListFields { datasheet }
            | ApiRequest::GetRecords { datasheet, .. }
            | ApiRequest::CreateRecords { datasheet, .. }
            | ApiRequest::UpdateRecords { datasheet, .. }
            | ApiRequest::DeleteRecords { datasheet, .. }
            | ApiRequest::UploadAttachment { datasheet, .. } => datasheet,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ApiRequest::ListFields { .. } => "list_fields",
            ApiRequest::GetRecords { .. } => "get_records",
            ApiRequest::CreateRecords { .. } => "create_records",
            ApiRequest::UpdateRecords { .. } => "update_records",
            ApiRequest::DeleteRecords { .. } => "delete_records",
            ApiRequest::UploadAttachment { .. } => "upload_attachment",
        }
    }
}

/// Where an attachment upload reads its bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Remote file, downloaded before upload
    Url(String),
    /// Local file
    Path(PathBuf),
}

impl AttachmentSource {
    /// Classifies `location`: anything starting with `http` is a URL.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http") {
            AttachmentSource::Url(location.to_string())
        } else {
            AttachmentSource::Path(PathBuf::from(location))
        }
    }
}

/// Serializes listing options into query pairs.
///
/// `recordIds`, `fields` and `sort` repeat once per entry; each sort entry
/// is sent as a JSON object. Fails on a sort entry without a field name.
pub fn query_params(query: &RecordQuery) -> Result<QueryPairs> {
    let mut pairs = QueryPairs::new();

    if let Some(view_id) = &query.view_id {
        pairs.push(("viewId".to_string(), view_id.clone()));
    }
    for spec in &query.sort {
        if spec.field.is_empty() {
            return Err(ClientError::QueryBuild(
                "sort entry must name a field".to_string(),
            ));
        }
        pairs.push(("sort".to_string(), spec.to_value().to_string()));
    }
    for id in &query.record_ids {
        pairs.push(("recordIds".to_string(), id.clone()));
    }
    for field in &query.fields {
        pairs.push(("fields".to_string(), field.clone()));
    }
    if let Some(formula) = &query.filter_by_formula {
        pairs.push(("filterByFormula".to_string(), formula.clone()));
    }
    if let Some(max_records) = query.max_records {
        pairs.push(("maxRecords".to_string(), max_records.to_string()));
    }
    if let Some(cell_format) = query.cell_format {
        pairs.push(("cellFormat".to_string(), cell_format.as_str().to_string()));
    }
    if let Some(field_key) = query.field_key {
        pairs.push(("fieldKey".to_string(), field_key.as_str().to_string()));
    }
    if let Some(page_size) = query.page_size {
        pairs.push(("pageSize".to_string(), page_size.to_string()));
    }
    if let Some(page_num) = query.page_num {
        pairs.push(("pageNum".to_string(), page_num.to_string()));
    }

    Ok(pairs)
}

/// Parses raw sort objects such as `{"title": "desc"}`.
pub fn parse_sort(entries: &[Value]) -> Result<Vec<datasheet_types::SortSpec>> {
    entries
        .iter()
        .map(|entry| {
            datasheet_types::SortSpec::from_value(entry).ok_or_else(|| {
                ClientError::QueryBuild(format!(
                    "malformed sort entry {}, expected {{\"field\": \"asc\" | \"desc\"}}",
                    entry
                ))
            })
        })
        .collect()
}
