//! Options accepted by the record listing endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::FieldKey;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One sort object: a single field and its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field name or id, depending on the field-key mode
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }

    /// Reads a `{"field": "asc" | "desc"}` object.
    ///
    /// Returns `None` unless the value is an object with exactly one key
    /// whose value is `"asc"` or `"desc"`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 1 {
            return None;
        }
        let (field, order) = object.iter().next()?;
        let order = match order.as_str()? {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return None,
        };
        Some(Self {
            field: field.clone(),
            order,
        })
    }

    /// Returns the `{"field": "order"}` object sent on the wire.
    pub fn to_value(&self) -> Value {
        let mut object = serde_json::Map::new();
        object.insert(self.field.clone(), Value::from(self.order.as_str()));
        Value::Object(object)
    }
}

/// Cell value rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    #[default]
    Json,
    String,
}

impl CellFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellFormat::Json => "json",
            CellFormat::String => "string",
        }
    }
}

/// Query options for listing records.
///
/// Every option is optional; unset options are not sent. `record_ids`
/// overrides filtering, sorting and pagination on the server side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// View to read through (view filters and sort apply)
    pub view_id: Option<String>,
    /// Sort objects, overriding the view sort
    pub sort: Vec<SortSpec>,
    /// Explicit record ids to return
    pub record_ids: Vec<String>,
    /// Field projection
    pub fields: Vec<String>,
    /// Formula filter expression
    pub filter_by_formula: Option<String>,
    /// Cap on the total number of rows returned
    pub max_records: Option<u64>,
    pub cell_format: Option<CellFormat>,
    /// Field addressing mode for the request and response
    pub field_key: Option<FieldKey>,
    pub page_size: Option<u64>,
    /// 1-based page number
    pub page_num: Option<u64>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_id(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort.push(spec);
        self
    }

    pub fn record_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter_by_formula(mut self, formula: impl Into<String>) -> Self {
        self.filter_by_formula = Some(formula.into());
        self
    }

    pub fn max_records(mut self, max_records: u64) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn cell_format(mut self, cell_format: CellFormat) -> Self {
        self.cell_format = Some(cell_format);
        self
    }

    pub fn field_key(mut self, field_key: FieldKey) -> Self {
        self.field_key = Some(field_key);
        self
    }

    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn page_num(mut self, page_num: u64) -> Self {
        self.page_num = Some(page_num);
        self
    }

    /// Returns true when the caller pinned a page explicitly.
    pub fn has_page_params(&self) -> bool {
        self.page_size.is_some() || self.page_num.is_some()
    }
}
