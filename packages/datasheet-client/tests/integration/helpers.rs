//! In-memory transport emulating the datasheet REST API.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use datasheet_client::api_request::QueryPairs;
use datasheet_client::{
    ApiRequest, AttachmentSource, Client, ClientConfig, Datasheet, DatasheetOptions, RawRow,
    Result, Transport,
};

/// Transport serving records from memory and recording every request.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    fields: Vec<Value>,
    rows: Vec<RawRow>,
    requests: Vec<ApiRequest>,
    next_id: u64,
    fail_page: Option<u64>,
    fail_writes: Option<String>,
    refuse_deletes: bool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds field metadata as (id, name, type) triples.
    pub fn with_fields(self: Arc<Self>, fields: &[(&str, &str, &str)]) -> Arc<Self> {
        self.state.lock().fields = fields
            .iter()
            .map(|(id, name, ty)| json!({ "id": id, "name": name, "type": ty }))
            .collect();
        self
    }

    /// Adds rows as (id, fields object) pairs.
    pub fn with_rows(self: Arc<Self>, rows: Vec<(&str, Value)>) -> Arc<Self> {
        self.state.lock().rows = rows
            .into_iter()
            .map(|(id, fields)| RawRow::new(id, fields.as_object().cloned().unwrap_or_default()))
            .collect();
        self
    }

    /// Makes listing requests for `page` fail.
    pub fn fail_page(&self, page: u64) {
        self.state.lock().fail_page = Some(page);
    }

    /// Makes create and update requests fail with `message`.
    pub fn fail_writes(&self, message: &str) {
        self.state.lock().fail_writes = Some(message.to_string());
    }

    pub fn refuse_deletes(&self) {
        self.state.lock().refuse_deletes = true;
    }

    /// Changes a cell behind the client's back.
    pub fn set_cell(&self, record_id: &str, key: &str, value: Value) {
        let mut state = self.state.lock();
        if let Some(row) = state.rows.iter_mut().find(|r| r.id == record_id) {
            row.fields.insert(key.to_string(), value);
        }
    }

    pub fn row(&self, record_id: &str) -> Option<RawRow> {
        self.state
            .lock()
            .rows
            .iter()
            .find(|r| r.id == record_id)
            .cloned()
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().rows.len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Query pairs of every GetRecords request, in order.
    pub fn record_queries(&self) -> Vec<QueryPairs> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                ApiRequest::GetRecords { query, .. } => Some(query),
                _ => None,
            })
            .collect()
    }

    /// Bodies of every UpdateRecords request, in order.
    pub fn update_bodies(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                ApiRequest::UpdateRecords { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    /// Bodies of every CreateRecords request, in order.
    pub fn create_bodies(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                ApiRequest::CreateRecords { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn count_where(&self, f: impl Fn(&ApiRequest) -> bool) -> usize {
        self.state.lock().requests.iter().filter(|r| f(r)).count()
    }
}

/// First value for `key` in `pairs`.
pub fn query_value<'a>(pairs: &'a QueryPairs, key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn ok(data: Value) -> Value {
    json!({ "success": true, "code": 200, "message": "SUCCESS", "data": data })
}

fn fail(code: u16, message: &str) -> Value {
    json!({ "success": false, "code": code, "message": message })
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        self.handle(request)
    }
}

impl MockTransport {
    fn handle(&self, request: ApiRequest) -> Result<Value> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());

        let response = match request {
            ApiRequest::ListFields { .. } => ok(json!({ "fields": state.fields })),
            ApiRequest::GetRecords { query, .. } => {
                let page_num: u64 = query_value(&query, "pageNum")
                    .map(|v| v.parse().unwrap())
                    .unwrap_or(1);
                let page_size: u64 = query_value(&query, "pageSize")
                    .map(|v| v.parse().unwrap())
                    .unwrap_or(100);
                if state.fail_page == Some(page_num) {
                    return Ok(fail(500, "server error"));
                }

                let ids: Vec<&str> = query
                    .iter()
                    .filter(|(k, _)| k == "recordIds")
                    .map(|(_, v)| v.as_str())
                    .collect();
                let formula = query_value(&query, "filterByFormula");
                let matched: Vec<&RawRow> = state
                    .rows
                    .iter()
                    .filter(|row| ids.is_empty() || ids.contains(&row.id.as_str()))
                    .filter(|row| formula.map_or(true, |f| matches_formula(row, f)))
                    .collect();

                let records: Vec<&RawRow> = matched
                    .iter()
                    .skip(((page_num - 1) * page_size) as usize)
                    .take(page_size as usize)
                    .copied()
                    .collect();
                ok(json!({
                    "total": matched.len(),
                    "pageNum": page_num,
                    "pageSize": page_size,
                    "records": records,
                }))
            }
            ApiRequest::CreateRecords { body, .. } => {
                if let Some(message) = state.fail_writes.clone() {
                    return Ok(fail(400, &message));
                }
                let mut created = Vec::new();
                for record in body["records"].as_array().unwrap() {
                    state.next_id += 1;
                    let row = RawRow::new(
                        format!("recNew{}", state.next_id),
                        record["fields"].as_object().cloned().unwrap_or_default(),
                    );
                    state.rows.push(row.clone());
                    created.push(row);
                }
                ok(json!({ "records": created }))
            }
            ApiRequest::UpdateRecords { body, .. } => {
                if let Some(message) = state.fail_writes.clone() {
                    return Ok(fail(400, &message));
                }
                let mut updated = Vec::new();
                for record in body["records"].as_array().unwrap() {
                    let id = record["recordId"].as_str().unwrap();
                    let fields = record["fields"].as_object().unwrap();
                    if let Some(row) = state.rows.iter_mut().find(|r| r.id == id) {
                        merge(&mut row.fields, fields);
                        updated.push(row.clone());
                    }
                }
                ok(json!({ "records": updated }))
            }
            ApiRequest::DeleteRecords { record_ids, .. } => {
                if state.refuse_deletes {
                    return Ok(fail(403, "no permission"));
                }
                state.rows.retain(|r| !record_ids.contains(&r.id));
                ok(json!(true))
            }
            ApiRequest::UploadAttachment { source, .. } => {
                state.next_id += 1;
                let (name, size) = match source {
                    AttachmentSource::Url(url) => {
                        (url.rsplit('/').next().unwrap_or("file").to_string(), 0)
                    }
                    AttachmentSource::Path(path) => (
                        path.file_name().unwrap().to_string_lossy().into_owned(),
                        std::fs::metadata(&path)?.len(),
                    ),
                };
                ok(json!({
                    "token": format!("space/att{}", state.next_id),
                    "name": name,
                    "size": size,
                    "mimeType": "text/plain",
                    "url": format!("https://files.example.com/att{}", state.next_id),
                }))
            }
        };
        Ok(response)
    }
}

/// Null clears a cell, anything else overwrites it.
fn merge(row: &mut Map<String, Value>, fields: &Map<String, Value>) {
    for (key, value) in fields {
        if value.is_null() {
            row.remove(key);
        } else {
            row.insert(key.clone(), value.clone());
        }
    }
}

/// Evaluates the `{key}=literal` and `AND(...)` formulas the client emits.
fn matches_formula(row: &RawRow, formula: &str) -> bool {
    if let Some(inner) = formula
        .strip_prefix("AND(")
        .and_then(|s| s.strip_suffix(')'))
    {
        return split_predicates(inner)
            .iter()
            .all(|p| matches_formula(row, p));
    }
    let Some((key, literal)) = formula
        .strip_prefix('{')
        .and_then(|s| s.split_once("}="))
    else {
        return false;
    };
    let actual = row.fields.get(key);
    match literal {
        "BLANK()" => actual.map_or(true, Value::is_null),
        "TRUE()" => actual == Some(&Value::Bool(true)),
        "FALSE()" => actual == Some(&Value::Bool(false)),
        other => serde_json::from_str::<Value>(other).ok().as_ref() == actual,
    }
}

fn split_predicates(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in s.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                out.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    out.push(current);
    out
}

/// Opens `dst1` on `mock` with `config`.
pub fn datasheet_with(
    mock: &Arc<MockTransport>,
    config: ClientConfig,
    options: DatasheetOptions,
) -> Datasheet {
    let transport: Arc<dyn Transport> = mock.clone();
    Client::with_transport(config, transport).datasheet("dst1", options)
}

/// Opens `dst1` on `mock` with default configuration.
pub fn datasheet(mock: &Arc<MockTransport>, options: DatasheetOptions) -> Datasheet {
    datasheet_with(mock, ClientConfig::default(), options)
}

/// Books table used across tests: `title` is aliased to the `name` field.
pub fn books() -> Arc<MockTransport> {
    MockTransport::new()
        .with_fields(&[
            ("fldName", "name", "SingleText"),
            ("fldYear", "year", "Number"),
            ("fldNotes", "notes", "Text"),
            ("fldCover", "cover", "Attachment"),
        ])
        .with_rows(vec![
            ("r1", json!({ "name": "A", "year": 1965 })),
            ("r2", json!({ "name": "B", "year": 1984 })),
        ])
}

/// Options aliasing `title` → `name`.
pub fn title_alias() -> DatasheetOptions {
    let mut aliases = datasheet_client::FieldKeyMap::new();
    aliases.insert("title".to_string(), "name".to_string());
    DatasheetOptions::default().with_field_key_map(aliases)
}
