//! Record handle tests: remote-backed reads, writes, tombstoning.

use std::io::Write;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use datasheet_client::{
    ApiRequest, ClientError, Datasheet, DatasheetOptions, FieldKey, Record, RecordQuery,
};

use super::helpers::{books, datasheet, title_alias, MockTransport};

async fn record_titled(ds: &Datasheet, title: &str) -> Record {
    ds.records()
        .get([("title", Value::from(title))])
        .await
        .unwrap()
}

#[tokio::test]
async fn test_alias_read_write_round_trip() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;
    assert_eq!(r1.id(), "r1");

    assert_eq!(r1.get("title").await.unwrap(), json!("A"));

    r1.set("title", "Z").await.unwrap();
    assert_eq!(
        mock.update_bodies(),
        vec![json!({
            "records": [{ "recordId": "r1", "fields": { "name": "Z" } }],
            "fieldKey": "name",
        })]
    );

    assert_eq!(r1.get("title").await.unwrap(), json!("Z"));
    assert_eq!(mock.row("r1").unwrap().fields["name"], json!("Z"));
}

#[tokio::test]
async fn test_get_empty_known_field_is_null() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;

    assert_eq!(r1.get("notes").await.unwrap(), Value::Null);
    // Field ids are known keys too
    assert_eq!(r1.get("fldNotes").await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_get_unknown_field_fails() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;

    match r1.get("author").await {
        Err(ClientError::UnknownField { key }) => assert_eq!(key, "author"),
        other => panic!("expected UnknownField, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reserved_keys_return_record_id() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;
    let before = mock.request_count();

    assert_eq!(r1.get("_id").await.unwrap(), json!("r1"));
    assert_eq!(r1.get("recordId").await.unwrap(), json!("r1"));
    assert_eq!(mock.request_count(), before);
}

#[tokio::test]
async fn test_get_always_refetches() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;
    assert_eq!(r1.cached("title").unwrap(), Some(json!("A")));

    mock.set_cell("r1", "name", json!("Changed"));
    assert_eq!(r1.cached("title").unwrap(), Some(json!("A")));

    let fetches = mock.count_where(|r| matches!(r, ApiRequest::GetRecords { .. }));
    assert_eq!(r1.get("title").await.unwrap(), json!("Changed"));
    assert_eq!(
        mock.count_where(|r| matches!(r, ApiRequest::GetRecords { .. })),
        fetches + 1
    );
    assert_eq!(r1.cached("title").unwrap(), Some(json!("Changed")));
}

#[tokio::test]
async fn test_snapshots_belong_to_each_handle() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let first = ds.records().get_by_id("r1").await.unwrap();
    let second = ds.records().get_by_id("r1").await.unwrap();

    first.set("title", "Z").await.unwrap();
    assert_eq!(first.cached("title").unwrap(), Some(json!("Z")));
    assert_eq!(second.cached("title").unwrap(), Some(json!("A")));

    assert_eq!(second.get("title").await.unwrap(), json!("Z"));
    assert_eq!(second.cached("title").unwrap(), Some(json!("Z")));
}

#[tokio::test]
async fn test_listed_records_carry_their_row() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let set = ds.records().all(RecordQuery::new()).await.unwrap();
    let requests = mock.request_count();

    let years: Vec<Option<Value>> = set.iter().map(|r| r.cached("year").unwrap()).collect();
    assert_eq!(years, vec![Some(json!(1965)), Some(json!(1984))]);
    assert_eq!(mock.request_count(), requests);
}

#[tokio::test]
async fn test_deleted_record_rejects_every_operation() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let mut r1 = record_titled(&ds, "A").await;

    assert!(r1.delete().await.unwrap());
    assert!(r1.is_deleted());
    assert!(mock.row("r1").is_none());

    let requests = mock.request_count();
    let deleted = |e: ClientError| matches!(e, ClientError::RecordAlreadyDeleted { .. });

    assert!(deleted(r1.get("title").await.unwrap_err()));
    assert!(deleted(r1.get("_id").await.unwrap_err()));
    assert!(deleted(r1.set("title", "Z").await.unwrap_err()));
    assert!(deleted(
        r1.update([("year", json!(1))]).await.unwrap_err()
    ));
    assert!(deleted(r1.to_json().await.unwrap_err()));
    assert!(deleted(r1.cached("title").unwrap_err()));
    assert!(deleted(r1.delete().await.unwrap_err()));

    assert_eq!(mock.request_count(), requests);
    assert_eq!(r1.id(), "r1");
}

#[tokio::test]
async fn test_refused_delete_keeps_record_live() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let mut r1 = record_titled(&ds, "A").await;
    mock.refuse_deletes();

    assert!(!r1.delete().await.unwrap());
    assert!(!r1.is_deleted());
    assert_eq!(r1.get("title").await.unwrap(), json!("A"));
}

#[tokio::test]
async fn test_to_json_uses_canonical_keys() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;

    let fields = r1.to_json().await.unwrap();
    assert_eq!(Value::Object(fields), json!({ "name": "A", "year": 1965 }));
}

#[tokio::test]
async fn test_update_sends_one_request_and_patches_cache() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;

    let updated = r1
        .update([("title", json!("New")), ("year", json!(2000))])
        .await
        .unwrap();
    assert_eq!(updated, 1);
    assert_eq!(
        mock.update_bodies(),
        vec![json!({
            "records": [{ "recordId": "r1", "fields": { "name": "New", "year": 2000 } }],
            "fieldKey": "name",
        })]
    );
    assert_eq!(r1.cached("title").unwrap(), Some(json!("New")));
    assert_eq!(r1.cached("year").unwrap(), Some(json!(2000)));
}

#[tokio::test]
async fn test_set_unknown_field_sends_nothing() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;

    let err = r1.set("author", "Herbert").await.unwrap_err();
    assert!(matches!(err, ClientError::UnknownField { .. }));
    assert!(err.is_validation());
    assert!(mock.update_bodies().is_empty());
}

#[tokio::test]
async fn test_remote_write_failure_is_propagated() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;
    mock.fail_writes("field type mismatch");

    match r1.set("year", "abc").await {
        Err(ClientError::RemoteOperationFailed { code, message }) => {
            assert_eq!(code, Some(400));
            assert_eq!(message, "field type mismatch");
        }
        other => panic!("expected RemoteOperationFailed, got {:?}", other),
    }
    assert_eq!(r1.cached("year").unwrap(), Some(json!(1965)));
}

#[tokio::test]
async fn test_attachment_set_uploads_each_file() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"cover bytes").unwrap();
    let path = file.path().to_string_lossy().into_owned();

    r1.set("cover", json!([path, "https://example.com/pic.png"]))
        .await
        .unwrap();

    let uploads: Vec<ApiRequest> = mock
        .requests()
        .into_iter()
        .filter(|r| matches!(r, ApiRequest::UploadAttachment { .. }))
        .collect();
    assert_eq!(uploads.len(), 2);

    let body = &mock.update_bodies()[0];
    let cover = body["records"][0]["fields"]["cover"].as_array().unwrap();
    assert_eq!(cover.len(), 2);
    assert_eq!(cover[0]["size"], json!(11));
    assert_eq!(cover[1]["name"], json!("pic.png"));
    assert!(cover[1]["token"].as_str().unwrap().starts_with("space/att"));
}

#[tokio::test]
async fn test_attachment_empty_list_clears_cell() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;

    r1.set("cover", json!([])).await.unwrap();
    let body = &mock.update_bodies()[0];
    assert_eq!(body["records"][0]["fields"]["cover"], Value::Null);
    assert_eq!(
        mock.count_where(|r| matches!(r, ApiRequest::UploadAttachment { .. })),
        0
    );
}

#[tokio::test]
async fn test_id_mode_addresses_fields_by_id() {
    let mock = MockTransport::new()
        .with_fields(&[("fldName", "name", "SingleText")])
        .with_rows(vec![("r1", json!({ "fldName": "A" }))]);
    let ds = datasheet(&mock, DatasheetOptions::new(FieldKey::Id));

    let r1 = ds
        .records()
        .get([("fldName", json!("A"))])
        .await
        .unwrap();
    r1.set("fldName", "Z").await.unwrap();
    assert_eq!(mock.update_bodies()[0]["fieldKey"], json!("id"));
    assert_eq!(r1.get("fldName").await.unwrap(), json!("Z"));

    // Names are not field keys in id mode
    assert!(matches!(
        r1.set("name", "Y").await,
        Err(ClientError::UnknownField { .. })
    ));
}

#[tokio::test]
async fn test_display() {
    let mock = books();
    let ds = datasheet(&mock, title_alias());
    let r1 = record_titled(&ds, "A").await;
    assert_eq!(r1.to_string(), "(Record: r1)");
}
