//! Cached field metadata for one datasheet.

use std::collections::HashMap;

use datasheet_types::{FieldDescriptor, FieldKey};

/// Field list plus id and name lookups.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    fields: Vec<FieldDescriptor>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl FieldIndex {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        let mut by_id = HashMap::with_capacity(fields.len());
        let mut by_name = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            by_id.insert(field.id.clone(), idx);
            by_name.insert(field.name.clone(), idx);
        }
        Self {
            fields,
            by_id,
            by_name,
        }
    }

    /// Fields in datasheet order.
    pub fn all(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The primary field is always the first one.
    pub fn primary(&self) -> Option<&FieldDescriptor> {
        self.fields.first()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&FieldDescriptor> {
        self.by_id.get(id).map(|&idx| &self.fields[idx])
    }

    pub fn get_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&idx| &self.fields[idx])
    }

    /// Looks `key` up as an id or a name depending on `mode`.
    pub fn get(&self, key: &str, mode: FieldKey) -> Option<&FieldDescriptor> {
        match mode {
            FieldKey::Id => self.get_by_id(key),
            FieldKey::Name => self.get_by_name(key),
        }
    }

    /// Returns true if `key` is any field's id or name.
    pub fn contains(&self, key: &str) -> bool {
        self.by_id.contains_key(key) || self.by_name.contains_key(key)
    }
}
