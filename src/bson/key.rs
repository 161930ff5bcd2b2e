//! Stable document identity helpers.

use mongodb::bson::{Bson, Document};

/// Display key derived from a document's `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey(String);

impl DocumentKey {
    /// Build a key from a BSON `_id` value, rendered as relaxed Extended JSON.
    pub fn from_id(id: &Bson) -> Self {
        let ext = id.clone().into_relaxed_extjson();
        let repr = serde_json::to_string(&ext).unwrap_or_else(|_| format!("{id:?}"));
        Self(repr)
    }

    /// Build a key from a document, falling back to its 1-based position.
    pub fn from_document(doc: &Document, index: usize) -> Self {
        match doc.get("_id") {
            Some(id) => Self::from_id(id),
            None => Self(format!("Document {}", index + 1)),
        }
    }

    /// Return the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    #[test]
    fn string_id_keeps_json_quotes() {
        let key = DocumentKey::from_document(&doc! { "_id": "mock_document_id" }, 1);
        assert_eq!(key.as_str(), "\"mock_document_id\"");
    }

    #[test]
    fn object_id_is_stringified() {
        let key = DocumentKey::from_document(
            &doc! { "_id": { "someIdField": "a", "anotherIdField": "b" } },
            1,
        );
        assert_eq!(key.as_str(), r#"{"someIdField":"a","anotherIdField":"b"}"#);
    }

    #[test]
    fn missing_id_uses_position() {
        let key = DocumentKey::from_document(&doc! { "noIdField": true }, 1);
        assert_eq!(key.to_string(), "Document 2");
    }
}
