//! Integration tests for the schema node and its field rows.

mod common;

use common::fixtures;
use common::mock::session;
use mango_explorer::Error;
use mango_explorer::models::Namespace;
use mango_explorer::tree::{
    CollapsibleState, FieldNode, NO_DOCUMENTS_NOTICE, SHOW_MORE_FIELDS_LABEL, SchemaNode, TreeNode,
};
use mongodb::bson::doc;

fn namespace() -> Namespace {
    Namespace::new("zoo", "animals")
}

fn fields(children: &[TreeNode]) -> Vec<FieldNode> {
    children
        .iter()
        .filter_map(|child| match child {
            TreeNode::Field(field) => Some(field.clone()),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Sampling
// =============================================================================

/// Test that the schema samples one page of documents when expanded.
#[tokio::test]
async fn test_schema_samples_page_of_documents() {
    let session = session();
    session.source.with_documents(&namespace(), fixtures::generate_test_documents(30));

    let schema = SchemaNode::new(namespace(), session.ctx.clone());
    assert!(schema.children().await.expect("collapsed").is_empty());
    assert_eq!(session.source.calls("find"), 0);

    schema.on_expand();
    let children = schema.children().await.expect("children");
    let labels: Vec<String> = children.iter().map(TreeNode::label).collect();
    assert_eq!(labels, vec!["_id", "index", "name", "category", "nested"]);
    assert_eq!(session.source.find_options()[0].limit, Some(10));

    schema.children().await.expect("cached");
    assert_eq!(session.source.calls("find"), 1);
}

/// Test that an empty sample shows a notice instead of fields.
#[tokio::test]
async fn test_empty_sample_shows_notice() {
    let session = session();

    let schema = SchemaNode::new(namespace(), session.ctx.clone());
    schema.on_expand();
    assert!(schema.children().await.expect("children").is_empty());
    assert_eq!(session.window.infos(), vec![NO_DOCUMENTS_NOTICE.to_string()]);
}

/// Test that a sampling failure propagates and leaves the cache stale.
#[tokio::test]
async fn test_sampling_failure_propagates() {
    let session = session();
    session.source.with_documents(&namespace(), fixtures::generate_test_documents(3));
    session.source.fail("find");

    let schema = SchemaNode::new(namespace(), session.ctx.clone());
    schema.on_expand();
    let err = schema.children().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Fetch(ref text) if text == "Unable to list documents: find failed"
    ));
    assert_eq!(session.window.errors(), vec!["Unable to list documents: find failed".to_string()]);
    assert!(!schema.cache_is_up_to_date());

    session.source.recover("find");
    assert_eq!(schema.children().await.expect("retry").len(), 5);
    assert_eq!(session.source.calls("find"), 2);
}

// =============================================================================
// Show more fields
// =============================================================================

/// Test that wide schemas are truncated until "show more" is clicked, and stay expanded after.
#[tokio::test]
async fn test_show_more_fields_is_sticky() {
    let session = session();
    session.source.with_documents(&namespace(), vec![fixtures::document_with_fields(20)]);

    let schema = SchemaNode::new(namespace(), session.ctx.clone());
    schema.on_expand();
    let children = schema.children().await.expect("children");
    assert_eq!(children.len(), 16);
    assert_eq!(children[15].label(), SHOW_MORE_FIELDS_LABEL);
    assert!(schema.has_more_fields_to_show());

    let TreeNode::ShowMore(sentinel) = &children[15] else {
        panic!("expected a show more sentinel");
    };
    sentinel.on_show_more_clicked();
    assert!(schema.has_clicked_show_more());

    let all = schema.children().await.expect("all fields");
    assert_eq!(all.len(), 20);
    assert!(!all.iter().any(TreeNode::is_show_more));

    schema.on_collapse();
    schema.on_expand();
    assert_eq!(schema.children().await.expect("after collapse").len(), 20);
}

// =============================================================================
// Fields
// =============================================================================

/// Test which fields can be drilled into.
#[tokio::test]
async fn test_field_expandability() {
    let session = session();
    session.source.with_documents(
        &namespace(),
        vec![
            doc! {
                "name": "Gnocchi",
                "address": { "city": "Rome", "zip": "00100" },
                "tags": ["a"],
                "age": 3,
            },
            doc! {
                "name": "Pesto",
                "address": { "city": "Genoa", "zip": "16100" },
                "tags": ["b"],
                "age": "old",
            },
        ],
    );

    let schema = SchemaNode::new(namespace(), session.ctx.clone());
    schema.on_expand();
    let children = fields(&schema.children().await.expect("children"));
    let [name, address, tags, age] = children.as_slice() else {
        panic!("expected four fields, got {}", children.len());
    };

    assert!(!name.is_expandable());
    assert_eq!(name.tree_item().collapsible_state, CollapsibleState::None);
    assert_eq!(name.tree_item().description.as_deref(), Some("String"));

    assert!(address.is_expandable());
    assert_eq!(address.tree_item().collapsible_state, CollapsibleState::Collapsed);
    assert!(tags.is_expandable());

    assert!(!age.is_expandable());
    assert_eq!(age.tree_item().description.as_deref(), Some("mixed-type"));
    assert_eq!(age.tree_item().tooltip.as_deref(), Some("age - mixed-type"));
}

/// Test that nested fields are listed without a remote call and keep their expansion.
#[tokio::test]
async fn test_nested_fields_keep_expansion() {
    let session = session();
    session.source.with_documents(
        &namespace(),
        vec![doc! { "address": { "geo": { "lat": 1.0, "lng": 2.0 }, "city": "Rome" } }],
    );

    let schema = SchemaNode::new(namespace(), session.ctx.clone());
    schema.on_expand();
    let top = fields(&schema.children().await.expect("children"));
    let address = &top[0];

    let nested = fields(&address.children());
    let labels: Vec<String> = nested.iter().map(|field| field.tree_item().label).collect();
    assert_eq!(labels, vec!["geo", "city"]);
    assert_eq!(nested[0].tree_item().key.to_tree_id(), "field:conn-1:zoo.animals:address.geo");

    nested[0].on_expand();
    let again = fields(&address.children());
    assert!(!again[0].ptr_eq(&nested[0]));
    assert!(again[0].is_expanded());
    assert_eq!(session.source.calls("find"), 1);
}

/// Test that array fields expose their element descriptor.
#[tokio::test]
async fn test_array_field_children() {
    let session = session();
    let pets = doc! { "pets": [{ "kind": "cat" }, { "kind": "dog" }] };
    session.source.with_documents(&namespace(), vec![pets]);

    let schema = SchemaNode::new(namespace(), session.ctx.clone());
    schema.on_expand();
    let pets = fields(&schema.children().await.expect("children")).remove(0);
    let element = fields(&pets.children()).remove(0);
    assert_eq!(element.tree_item().label, "[*]");
    assert!(element.is_expandable());
    assert_eq!(fields(&element.children())[0].tree_item().label, "kind");
}
