//! Handle to one remote row.
//!
//! A [`Record`] holds the row id, its datasheet and the last snapshot of the
//! row it has seen. Reads re-fetch the row so they always reflect the remote
//! state; writes go straight to the server and patch the snapshot once the
//! server confirms a single affected row. The snapshot is owned by the
//! handle and dropped with it. After a successful [`Record::delete`] the
//! handle is tombstoned and every operation fails with
//! [`ClientError::RecordAlreadyDeleted`].

use std::fmt;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use datasheet_types::{FieldDescriptor, RawRow};

use crate::datasheet::Datasheet;
use crate::error::{ClientError, Result};
use crate::key_map::is_reserved_key;

/// Client-side handle to one remote row.
#[derive(Debug)]
pub struct Record {
    datasheet: Datasheet,
    id: String,
    /// Fields as last seen from the server
    snapshot: Mutex<Map<String, Value>>,
    deleted: bool,
}

impl Record {
    pub(crate) fn new(datasheet: Datasheet, row: RawRow) -> Self {
        Self {
            datasheet,
            id: row.id,
            snapshot: Mutex::new(row.fields),
            deleted: false,
        }
    }

    /// Record id. Never changes.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn datasheet(&self) -> &Datasheet {
        &self.datasheet
    }

    /// True once [`delete`](Self::delete) succeeded.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn check_status(&self) -> Result<()> {
        if self.deleted {
            return Err(ClientError::RecordAlreadyDeleted {
                record_id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Reads one field from a fresh copy of the row.
    ///
    /// Returns `Value::Null` for a known field with an empty cell. `_id` and
    /// `recordId` return the record id.
    ///
    /// # Errors
    /// [`ClientError::UnknownField`] when the key is neither in the row nor
    /// a field id or name.
    pub async fn get(&self, key: &str) -> Result<Value> {
        self.check_status()?;
        let key = self.datasheet.translator().translate(key);
        if is_reserved_key(key) {
            return Ok(Value::String(self.id.clone()));
        }

        let fields = self.refresh().await?;
        if let Some(value) = fields.get(key) {
            return Ok(value.clone());
        }

        // Missing from the row but a known field: the cell is empty
        if self.datasheet.fields().await?.contains(key) {
            return Ok(Value::Null);
        }

        Err(ClientError::UnknownField {
            key: key.to_string(),
        })
    }

    /// Reads one field from this handle's last snapshot without a round trip.
    ///
    /// Returns `None` if the field was absent from that snapshot.
    pub fn cached(&self, key: &str) -> Result<Option<Value>> {
        self.check_status()?;
        let key = self.datasheet.translator().translate(key);
        Ok(self.snapshot.lock().get(key).cloned())
    }

    /// Writes one field.
    ///
    /// For attachment fields an array of paths or URLs is uploaded first and
    /// replaced by the returned descriptors; an empty array clears the cell.
    pub async fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.update([(key, value.into())]).await.map(|_| ())
    }

    /// Writes several fields in one request and returns the number of rows
    /// the server reports as updated.
    pub async fn update<I, K>(&self, fields: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        self.check_status()?;
        let fields = self.datasheet.translator().translate_fields(fields);

        let mut prepared = Map::new();
        for (key, value) in fields {
            let field = self.datasheet.field(&key).await?;
            let value = self.prepare_value(field, value).await?;
            prepared.insert(key, value);
        }

        let updated = self
            .datasheet
            .update_records(vec![(self.id.clone(), prepared.clone())])
            .await?;
        if updated.len() == 1 {
            self.snapshot.lock().extend(prepared);
        }
        Ok(updated.len())
    }

    /// Deletes the row and tombstones this handle.
    ///
    /// Returns the server's success flag; the handle stays live when the
    /// server refuses.
    pub async fn delete(&mut self) -> Result<bool> {
        self.check_status()?;
        let success = self.datasheet.delete_records(vec![self.id.clone()]).await?;
        if success {
            self.deleted = true;
        }
        Ok(success)
    }

    /// Returns a fresh copy of the row's fields, keyed by canonical key.
    pub async fn to_json(&self) -> Result<Map<String, Value>> {
        self.check_status()?;
        self.refresh().await
    }

    /// Re-fetches the row and replaces the snapshot.
    async fn refresh(&self) -> Result<Map<String, Value>> {
        let row = self.datasheet.get_record_by_id(&self.id).await?;
        *self.snapshot.lock() = row.fields.clone();
        Ok(row.fields)
    }

    async fn prepare_value(&self, field: &FieldDescriptor, value: Value) -> Result<Value> {
        if !field.is_attachment() {
            return Ok(value);
        }
        match value {
            Value::Array(items) => {
                let mut attachments = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(location) => {
                            let attachment = self.datasheet.upload_attachment(&location).await?;
                            attachments.push(
                                serde_json::to_value(attachment)
                                    .map_err(|e| ClientError::Decode(e.to_string()))?,
                            );
                        }
                        // Already a descriptor
                        other => attachments.push(other),
                    }
                }
                if attachments.is_empty() {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Array(attachments))
                }
            }
            other => Ok(other),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Record: {})", self.id)
    }
}

/// Anything that identifies a record: an id string or a [`Record`].
pub trait AsRecordId {
    fn record_id(&self) -> &str;
}

impl AsRecordId for str {
    fn record_id(&self) -> &str {
        self
    }
}

impl AsRecordId for String {
    fn record_id(&self) -> &str {
        self
    }
}

impl AsRecordId for Record {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl<T: AsRecordId + ?Sized> AsRecordId for &T {
    fn record_id(&self) -> &str {
        (**self).record_id()
    }
}
