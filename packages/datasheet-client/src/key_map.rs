//! Alias → canonical field key translation.

use serde_json::{Map, Value};

use datasheet_types::FieldKeyMap;

/// Keys addressing the record itself rather than a field. Never translated.
pub const RESERVED_KEYS: [&str; 2] = ["_id", "recordId"];

/// Returns true for `_id` and `recordId`.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Maps user-facing field keys to the keys the server expects.
///
/// Without an alias map every key passes through unchanged. Translation is
/// a single lookup: aliases are expected to point at canonical keys, never
/// at other aliases. With a chained map such as `title -> name`,
/// `name -> fldName` the key `title` becomes `name`, not `fldName`, and
/// translating twice no longer gives the same key.
#[derive(Debug, Clone, Default)]
pub struct KeyTranslator {
    aliases: Option<FieldKeyMap>,
}

impl KeyTranslator {
    pub fn new(aliases: Option<FieldKeyMap>) -> Self {
        Self { aliases }
    }

    /// Translates one key.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        if is_reserved_key(key) {
            return key;
        }
        match &self.aliases {
            Some(aliases) => aliases.get(key).map(String::as_str).unwrap_or(key),
            None => key,
        }
    }

    /// Translates every key of a field-value mapping.
    ///
    /// When two keys translate to the same canonical key the later one wins.
    pub fn translate_fields<I, K>(&self, fields: I) -> Map<String, Value>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        fields
            .into_iter()
            .map(|(key, value)| (self.translate(key.as_ref()).to_string(), value))
            .collect()
    }
}
