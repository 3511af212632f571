//! Type definitions shared by the datasheet client crates.
//!
//! Pure data: field metadata, raw rows, pages, query options and the
//! response envelope returned by every endpoint. No I/O lives here.

pub mod field;
pub mod query;
pub mod record;
pub mod response;

pub use field::{FieldDescriptor, FieldKey, FieldKeyMap, FieldType, ParseFieldKeyError};
pub use query::{CellFormat, RecordQuery, SortOrder, SortSpec};
pub use record::{Attachment, Page, RawRow};
pub use response::{ApiResponse, FieldsData, RecordsData};
