//! Datasheet context and request layer.
//!
//! Every remote call of the crate goes through here: requests are built
//! with the datasheet's field-key mode, responses are decoded into typed
//! payloads. The only state shared between handles is the field metadata,
//! fetched once; row snapshots live in the [`Record`](crate::Record)
//! handles themselves.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;

use datasheet_types::{
    ApiResponse, Attachment, FieldDescriptor, FieldKey, FieldsData, Page, RawRow, RecordQuery,
    RecordsData,
};

use crate::api_request::{self, ApiRequest, AttachmentSource};
use crate::config::{ClientConfig, DatasheetOptions};
use crate::error::{ClientError, Result};
use crate::fields::FieldIndex;
use crate::key_map::KeyTranslator;
use crate::pagination::{self, PageCursor, PageSource};
use crate::record_manager::RecordManager;
use crate::transport::Transport;

/// Handle to one remote datasheet. Cheap to clone; clones share the field
/// metadata.
#[derive(Clone)]
pub struct Datasheet {
    inner: Arc<DatasheetInner>,
}

struct DatasheetInner {
    id: String,
    field_key: FieldKey,
    translator: KeyTranslator,
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
    /// Fetched at most once
    fields: OnceCell<FieldIndex>,
}

impl std::fmt::Debug for Datasheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Datasheet")
            .field("id", &self.inner.id)
            .field("field_key", &self.inner.field_key)
            .finish()
    }
}

impl Datasheet {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: Arc<ClientConfig>,
        id: impl Into<String>,
        options: DatasheetOptions,
    ) -> Self {
        Self {
            inner: Arc::new(DatasheetInner {
                id: id.into(),
                field_key: options.field_key,
                translator: KeyTranslator::new(options.field_key_map),
                transport,
                config,
                fields: OnceCell::new(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Field-key mode applied to every request on this datasheet.
    pub fn field_key(&self) -> FieldKey {
        self.inner.field_key
    }

    pub fn translator(&self) -> &KeyTranslator {
        &self.inner.translator
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Record operations on this datasheet.
    pub fn records(&self) -> RecordManager {
        RecordManager::new(self.clone())
    }

    // Field metadata

    /// Returns the field index, fetching it on first use.
    pub async fn fields(&self) -> Result<&FieldIndex> {
        self.inner
            .fields
            .get_or_try_init(|| async move {
                let data: FieldsData = self
                    .call(ApiRequest::ListFields {
                        datasheet: self.inner.id.clone(),
                    })
                    .await?;
                tracing::debug!(
                    "Loaded {} fields for datasheet {}",
                    data.fields.len(),
                    self.inner.id
                );
                Ok::<_, ClientError>(FieldIndex::new(data.fields))
            })
            .await
    }

    pub async fn primary_field(&self) -> Result<Option<&FieldDescriptor>> {
        Ok(self.fields().await?.primary())
    }

    /// Resolves a canonical key to its descriptor under this datasheet's mode.
    pub async fn field(&self, key: &str) -> Result<&FieldDescriptor> {
        self.fields()
            .await?
            .get(key, self.inner.field_key)
            .ok_or_else(|| ClientError::UnknownField {
                key: key.to_string(),
            })
    }

    // Records

    /// Fetches one page. Remote failures are raised.
    pub async fn get_records(&self, query: &RecordQuery) -> Result<Page> {
        self.call(ApiRequest::GetRecords {
            datasheet: self.inner.id.clone(),
            query: api_request::query_params(query)?,
        })
        .await
    }

    /// Fetches every page of `query`; see [`pagination::fetch_all`] for the
    /// failure policy.
    pub async fn get_records_all(&self, query: RecordQuery) -> Result<Vec<RawRow>> {
        pagination::fetch_all(
            self,
            query,
            self.inner.config.default_page_size,
            self.inner.config.strict_pagination,
        )
        .await
    }

    /// Lazy page-by-page view of `query`.
    pub fn pages(&self, query: RecordQuery) -> PageCursor<'_, Self> {
        PageCursor::new(self, query, self.inner.config.default_page_size)
    }

    /// Fetches the current state of one row.
    pub async fn get_record_by_id(&self, record_id: &str) -> Result<RawRow> {
        let query = RecordQuery::new()
            .record_ids([record_id])
            .field_key(self.inner.field_key);
        self.get_records(&query)
            .await?
            .records
            .into_iter()
            .find(|row| row.id == record_id)
            .ok_or(ClientError::RecordNotFound)
    }

    /// Creates rows; keys are translated through the alias map.
    pub async fn create_records(&self, rows: Vec<Map<String, Value>>) -> Result<Vec<RawRow>> {
        let records: Vec<Value> = rows
            .into_iter()
            .map(|fields| json!({ "fields": self.inner.translator.translate_fields(fields) }))
            .collect();
        let data: RecordsData = self
            .call(ApiRequest::CreateRecords {
                datasheet: self.inner.id.clone(),
                body: json!({
                    "records": records,
                    "fieldKey": self.inner.field_key,
                }),
            })
            .await?;
        tracing::info!(
            "Created {} records in datasheet {}",
            data.records.len(),
            self.inner.id
        );
        Ok(data.records)
    }

    /// Updates rows. Keys must already be canonical.
    pub async fn update_records(
        &self,
        updates: Vec<(String, Map<String, Value>)>,
    ) -> Result<Vec<RawRow>> {
        let records: Vec<Value> = updates
            .into_iter()
            .map(|(record_id, fields)| json!({ "recordId": record_id, "fields": fields }))
            .collect();
        let data: RecordsData = self
            .call(ApiRequest::UpdateRecords {
                datasheet: self.inner.id.clone(),
                body: json!({
                    "records": records,
                    "fieldKey": self.inner.field_key,
                }),
            })
            .await?;
        Ok(data.records)
    }

    /// Deletes rows by id and returns the server's success flag.
    pub async fn delete_records(&self, record_ids: Vec<String>) -> Result<bool> {
        let value = self
            .inner
            .transport
            .execute(ApiRequest::DeleteRecords {
                datasheet: self.inner.id.clone(),
                record_ids: record_ids.clone(),
            })
            .await?;
        let resp: ApiResponse<Value> = decode(value)?;
        if resp.success {
            tracing::info!(
                "Deleted {} records from datasheet {}",
                record_ids.len(),
                self.inner.id
            );
        } else {
            tracing::warn!(
                "Deleting records from datasheet {} failed: {}",
                self.inner.id,
                resp.message
            );
        }
        Ok(resp.success)
    }

    /// Uploads a local path or remote URL and returns its descriptor.
    pub async fn upload_attachment(&self, location: &str) -> Result<Attachment> {
        self.call(ApiRequest::UploadAttachment {
            datasheet: self.inner.id.clone(),
            source: AttachmentSource::parse(location),
        })
        .await
    }

    /// Executes `request` and unwraps the payload of a successful envelope.
    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let name = request.name();
        let value = self.inner.transport.execute(request).await?;
        let resp: ApiResponse<T> = decode(value)?;
        if !resp.success {
            return Err(ClientError::RemoteOperationFailed {
                code: resp.code,
                message: resp.message,
            });
        }
        resp.data
            .ok_or_else(|| ClientError::Decode(format!("{} response carried no data", name)))
    }
}

#[async_trait]
impl PageSource for Datasheet {
    async fn fetch_page(&self, query: &RecordQuery) -> Result<Page> {
        self.get_records(query).await
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<ApiResponse<T>> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}
