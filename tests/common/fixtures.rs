//! Test fixtures for integration tests.

#![allow(dead_code)]

use mongodb::bson::{Document, doc, oid::ObjectId};

/// Generate a batch of documents with sequential string ids.
pub fn generate_test_documents(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            doc! {
                "_id": format!("doc-{i:03}"),
                "index": i as i32,
                "name": format!("Document {}", i),
                "category": if i % 2 == 0 { "even" } else { "odd" },
                "nested": {
                    "field": format!("nested_{}", i),
                    "number": i as i32,
                },
            }
        })
        .collect()
}

/// A document with one top-level field per name, all strings.
pub fn document_with_fields(count: usize) -> Document {
    let mut document = Document::new();
    for i in 0..count {
        document.insert(format!("field_{i:02}"), format!("value {i}"));
    }
    document
}

/// A document covering the common BSON types.
pub fn document_with_all_types() -> Document {
    doc! {
        "_id": ObjectId::new(),
        "string": "hello world",
        "int32": 42_i32,
        "int64": 9_000_000_000_000_i64,
        "double": std::f64::consts::PI,
        "boolean": true,
        "null": null,
        "array": ["a", "b", "c"],
        "nested": {
            "key": "value",
            "deep": {
                "deeper": "bottom"
            }
        },
        "date": mongodb::bson::DateTime::now(),
    }
}
