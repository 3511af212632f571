//! Field metadata and field-key addressing.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Alias → canonical field key mapping attached to a datasheet.
pub type FieldKeyMap = HashMap<String, String>;

/// Selects whether request and response bodies address fields by their
/// human-readable name or by their opaque id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    /// Address fields by display name
    #[default]
    Name,
    /// Address fields by field id (stable across renames)
    Id,
}

impl FieldKey {
    /// Returns the wire representation (`"name"` or `"id"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Id => "id",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`FieldKey`] from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid field key '{0}', expected 'name' or 'id'")]
pub struct ParseFieldKeyError(pub String);

impl FromStr for FieldKey {
    type Err = ParseFieldKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FieldKey::Name),
            "id" => Ok(FieldKey::Id),
            other => Err(ParseFieldKeyError(other.to_string())),
        }
    }
}

/// Field type tag reported by the field metadata endpoint.
///
/// Only the tags the client interprets get their own variant; everything
/// else is carried verbatim in [`FieldType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    SingleText,
    Text,
    Number,
    Currency,
    Percent,
    SingleSelect,
    MultiSelect,
    Member,
    Checkbox,
    Rating,
    DateTime,
    Attachment,
    MagicLink,
    MagicLookUp,
    Formula,
    /// Any other type tag
    Other(String),
}

impl FieldType {
    /// Returns the wire tag for this type.
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::SingleText => "SingleText",
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Currency => "Currency",
            FieldType::Percent => "Percent",
            FieldType::SingleSelect => "SingleSelect",
            FieldType::MultiSelect => "MultiSelect",
            FieldType::Member => "Member",
            FieldType::Checkbox => "Checkbox",
            FieldType::Rating => "Rating",
            FieldType::DateTime => "DateTime",
            FieldType::Attachment => "Attachment",
            FieldType::MagicLink => "MagicLink",
            FieldType::MagicLookUp => "MagicLookUp",
            FieldType::Formula => "Formula",
            FieldType::Other(tag) => tag,
        }
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "SingleText" => FieldType::SingleText,
            "Text" => FieldType::Text,
            "Number" => FieldType::Number,
            "Currency" => FieldType::Currency,
            "Percent" => FieldType::Percent,
            "SingleSelect" => FieldType::SingleSelect,
            "MultiSelect" => FieldType::MultiSelect,
            "Member" => FieldType::Member,
            "Checkbox" => FieldType::Checkbox,
            "Rating" => FieldType::Rating,
            "DateTime" => FieldType::DateTime,
            "Attachment" => FieldType::Attachment,
            "MagicLink" => FieldType::MagicLink,
            "MagicLookUp" => FieldType::MagicLookUp,
            "Formula" => FieldType::Formula,
            _ => FieldType::Other(tag),
        }
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        match ty {
            FieldType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column descriptor returned by the field metadata endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Opaque field id
    pub id: String,
    /// Display name
    pub name: String,
    /// Type tag
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether this is the primary (first) field
    #[serde(default)]
    pub is_primary: Option<bool>,
    /// Free-form description
    #[serde(default)]
    pub desc: Option<String>,
    /// Type-specific property block, kept undecoded
    #[serde(default)]
    pub property: Option<serde_json::Value>,
    /// Whether the field accepts writes through the API
    #[serde(default)]
    pub editable: Option<bool>,
}

impl FieldDescriptor {
    /// Returns the key this field is addressed by under `mode`.
    pub fn key(&self, mode: FieldKey) -> &str {
        match mode {
            FieldKey::Name => &self.name,
            FieldKey::Id => &self.id,
        }
    }

    /// Returns true for attachment columns, whose writes need a prior upload.
    pub fn is_attachment(&self) -> bool {
        self.field_type == FieldType::Attachment
    }
}
