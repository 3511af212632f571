//! Result set of a listing or filter call.

use datasheet_types::RawRow;

use crate::datasheet::Datasheet;
use crate::record::Record;

/// Rows returned by [`RecordManager::all`](crate::RecordManager::all) or
/// [`RecordManager::filter`](crate::RecordManager::filter).
///
/// Rows are wrapped into [`Record`] handles only as they are iterated.
#[derive(Debug, Clone)]
pub struct QuerySet {
    datasheet: Datasheet,
    rows: Vec<RawRow>,
}

impl QuerySet {
    pub(crate) fn new(datasheet: Datasheet, rows: Vec<RawRow>) -> Self {
        Self { datasheet, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw rows as returned by the server, in server order.
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<Record> {
        self.rows
            .get(index)
            .map(|row| Record::new(self.datasheet.clone(), row.clone()))
    }

    pub fn first(&self) -> Option<Record> {
        self.get(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Record> + '_ {
        self.rows
            .iter()
            .map(|row| Record::new(self.datasheet.clone(), row.clone()))
    }
}

/// Owning iterator over a [`QuerySet`].
pub struct IntoIter {
    datasheet: Datasheet,
    rows: std::vec::IntoIter<RawRow>,
}

impl Iterator for IntoIter {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.rows
            .next()
            .map(|row| Record::new(self.datasheet.clone(), row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for QuerySet {
    type Item = Record;
    type IntoIter = IntoIter;

    fn into_iter(self) -> IntoIter {
        IntoIter {
            datasheet: self.datasheet,
            rows: self.rows.into_iter(),
        }
    }
}
