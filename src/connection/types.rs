use mongodb::bson::{Document, doc};

/// Options accepted by `DataSource::find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub limit: Option<i64>,
    pub sort: Option<Document>,
}

impl FindOptions {
    pub fn with_limit(limit: i64) -> Self {
        Self { limit: Some(limit), sort: None }
    }
}

/// `_id` ordering for document previews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreviewSort {
    #[default]
    Natural,
    Ascending,
    Descending,
}

impl PreviewSort {
    pub fn to_sort(self) -> Option<Document> {
        match self {
            PreviewSort::Natural => None,
            PreviewSort::Ascending => Some(doc! { "_id": 1 }),
            PreviewSort::Descending => Some(doc! { "_id": -1 }),
        }
    }
}

/// Options for loading a document preview from a document list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewOptions {
    pub sort: PreviewSort,
    /// Falls back to the list's current window when unset.
    pub limit: Option<i64>,
}
