//! Records fetched from the document source

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// One schema-less document from the source collection.
///
/// Field order is the order the database returned it in; the spreadsheet header depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record(Document);

impl Record {
    pub fn new(document: Document) -> Self {
        Self(document)
    }

    /// Field names in stored order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn document(&self) -> &Document {
        &self.0
    }
}

impl From<Document> for Record {
    fn from(document: Document) -> Self {
        Self(document)
    }
}

/// Ordered sequence of records as returned by a single fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl From<Vec<Document>> for RecordSet {
    fn from(documents: Vec<Document>) -> Self {
        Self::new(documents.into_iter().map(Record::new).collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Equality filter applied to the source collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub field: String,
    pub value: String,
}

impl RecordFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Query document for the driver
    pub fn to_document(&self) -> Document {
        let mut query = Document::new();
        query.insert(self.field.clone(), self.value.clone());
        query
    }

    /// Whether a record satisfies the filter
    pub fn matches(&self, record: &Record) -> bool {
        matches!(record.get(&self.field), Some(Bson::String(v)) if *v == self.value)
    }
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self::new("department", "Books")
    }
}
