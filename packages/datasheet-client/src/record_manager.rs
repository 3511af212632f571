//! Record creation, listing, lookup and deletion for one datasheet.

use serde_json::{Map, Value};

use datasheet_types::RecordQuery;

use crate::datasheet::Datasheet;
use crate::error::{ClientError, Result};
use crate::formula;
use crate::query_set::QuerySet;
use crate::record::{AsRecordId, Record};

/// Record operations, obtained from [`Datasheet::records`].
#[derive(Debug, Clone)]
pub struct RecordManager {
    datasheet: Datasheet,
}

impl RecordManager {
    pub(crate) fn new(datasheet: Datasheet) -> Self {
        Self { datasheet }
    }

    /// Creates one record.
    ///
    /// # Example
    /// ```no_run
    /// # async fn demo(ds: datasheet_client::Datasheet) -> datasheet_client::Result<()> {
    /// let book = ds.records().create([("title", "Dune".into())]).await?;
    /// println!("{}", book);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create<I, K>(&self, fields: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let rows = self.datasheet.create_records(vec![collect(fields)]).await?;
        rows.into_iter()
            .next()
            .map(|row| Record::new(self.datasheet.clone(), row))
            .ok_or_else(|| ClientError::Decode("create returned no records".to_string()))
    }

    /// Creates up to `max_write_records` (10) records in one request.
    ///
    /// Larger batches fail with [`ClientError::BatchSizeExceeded`] before any
    /// request is sent. Creation is not idempotent; do not blindly retry.
    pub async fn bulk_create<R, I, K>(&self, rows: R) -> Result<Vec<Record>>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let rows: Vec<Map<String, Value>> = rows.into_iter().map(collect).collect();
        let limit = self.datasheet.config().max_write_records;
        if rows.len() > limit {
            return Err(ClientError::BatchSizeExceeded {
                requested: rows.len(),
                limit,
            });
        }

        let created = self.datasheet.create_records(rows).await?;
        Ok(created
            .into_iter()
            .map(|row| Record::new(self.datasheet.clone(), row))
            .collect())
    }

    /// Lists records.
    ///
    /// With `page_size` or `page_num` set exactly one page is fetched;
    /// otherwise every page is. The datasheet's field-key mode always wins
    /// over `query.field_key`.
    pub async fn all(&self, mut query: RecordQuery) -> Result<QuerySet> {
        let field_key = self.datasheet.field_key();
        if let Some(requested) = query.field_key {
            if requested != field_key {
                tracing::warn!(
                    "Datasheet {} uses field key '{}', ignoring requested '{}'",
                    self.datasheet.id(),
                    field_key,
                    requested
                );
            }
        }
        query.field_key = Some(field_key);

        let rows = if query.has_page_params() {
            match self.datasheet.get_records(&query).await {
                Ok(page) => page.records,
                Err(e) if self.datasheet.config().strict_pagination || e.is_validation() => {
                    return Err(e)
                }
                Err(e) => {
                    tracing::warn!(
                        "Fetching records from datasheet {} failed: {}",
                        self.datasheet.id(),
                        e
                    );
                    Vec::new()
                }
            }
        } else {
            self.datasheet.get_records_all(query).await?
        };

        Ok(QuerySet::new(self.datasheet.clone(), rows))
    }

    /// Returns the first record matching every equality constraint.
    ///
    /// # Errors
    /// [`ClientError::QueryBuild`] for zero constraints,
    /// [`ClientError::RecordNotFound`] when nothing matches.
    pub async fn get<I, K>(&self, constraints: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let formula = formula::build_required(self.datasheet.translator(), constraints)?;
        let query = RecordQuery::new()
            .filter_by_formula(formula)
            .field_key(self.datasheet.field_key());

        let page = self.datasheet.get_records(&query).await?;
        page.records
            .into_iter()
            .next()
            .map(|row| Record::new(self.datasheet.clone(), row))
            .ok_or(ClientError::RecordNotFound)
    }

    /// Returns a handle to the record with `record_id` after confirming it
    /// exists.
    pub async fn get_by_id(&self, record_id: &str) -> Result<Record> {
        let row = self.datasheet.get_record_by_id(record_id).await?;
        Ok(Record::new(self.datasheet.clone(), row))
    }

    /// Returns every record matching the equality constraints, walking all
    /// pages at the server's maximum page size. Zero constraints match all.
    pub async fn filter<I, K>(&self, constraints: I) -> Result<QuerySet>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut query = RecordQuery::new()
            .page_size(self.datasheet.config().max_page_size)
            .field_key(self.datasheet.field_key());
        if let Some(formula) = formula::build(self.datasheet.translator(), constraints)? {
            query = query.filter_by_formula(formula);
        }

        let rows = self.datasheet.get_records_all(query).await?;
        Ok(QuerySet::new(self.datasheet.clone(), rows))
    }

    /// Deletes records given by id or by handle in one request.
    ///
    /// Handles passed here are not tombstoned; use [`Record::delete`] for
    /// that. An empty selection sends nothing and reports success. For a
    /// single target see [`delete_one`](Self::delete_one).
    pub async fn delete<I, T>(&self, targets: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
        T: AsRecordId,
    {
        let ids: Vec<String> = targets
            .into_iter()
            .map(|t| t.record_id().to_string())
            .collect();
        if ids.is_empty() {
            return Ok(true);
        }
        self.datasheet.delete_records(ids).await
    }

    /// Deletes one record given by id or by handle.
    pub async fn delete_one<T: AsRecordId>(&self, target: T) -> Result<bool> {
        self.delete([target]).await
    }
}

fn collect<I, K>(fields: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
