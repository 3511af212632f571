//! Client library for the datasheet REST API.
//!
//! Provides record handles with remote-backed field access, automatic
//! pagination, equality filters compiled to formula expressions, and
//! attachment upload.
//!
//! ```no_run
//! # async fn demo() -> datasheet_client::Result<()> {
//! use datasheet_client::{Client, ClientConfig, DatasheetOptions};
//!
//! let client = Client::new(ClientConfig::from_env())?;
//! let songs = client.datasheet("dstSongs", DatasheetOptions::default());
//! for song in songs.records().filter([("artist", "X".into())]).await? {
//!     println!("{}", song.get("title").await?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api_request;
pub mod client;
pub mod config;
pub mod datasheet;
pub mod error;
pub mod fields;
pub mod formula;
pub mod key_map;
pub mod pagination;
pub mod query_set;
pub mod record;
pub mod record_manager;
pub mod transport;

pub use api_request::{ApiRequest, AttachmentSource};
pub use client::Client;
pub use config::{ClientConfig, DatasheetOptions};
pub use datasheet::Datasheet;
pub use error::{ClientError, Result};
pub use fields::FieldIndex;
pub use key_map::KeyTranslator;
pub use pagination::{PageCursor, PageSource};
pub use query_set::QuerySet;
pub use record::{AsRecordId, Record};
pub use record_manager::RecordManager;
pub use transport::{HttpTransport, Transport};

/// Re-exports from datasheet-types for convenience.
pub use datasheet_types::{
    Attachment, CellFormat, FieldDescriptor, FieldKey, FieldKeyMap, FieldType, Page, RawRow,
    RecordQuery, SortOrder, SortSpec,
};
