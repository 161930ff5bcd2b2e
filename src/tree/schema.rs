//! Schema inferred from a document sample, and its field rows.

use mongodb::bson::doc;

use crate::connection::FindOptions;
use crate::error::{Error, Result};
use crate::models::{Namespace, TreeNodeId};
use crate::schema::{SchemaField, infer_schema};
use crate::tree::context::NodeContext;
use crate::tree::leaf::{ShowMoreNode, ShowMoreTarget};
use crate::tree::node::{ExpandableNode, Node, TreeNode};
use crate::tree::reconcile::{ChildCache, rebuild_children, reconcile_children, to_tree_nodes};
use crate::tree::{CollapsibleState, TreeItem};

pub const NO_DOCUMENTS_NOTICE: &str = "No documents were found when attempting to parse schema.";

#[derive(Clone)]
pub struct SchemaState {
    namespace: Namespace,
    ctx: NodeContext,
    is_expanded: bool,
    cache_is_up_to_date: bool,
    /// Survives collapse.
    has_clicked_show_more: bool,
    has_more_fields_to_show: bool,
    fields: ChildCache<FieldState>,
}

impl ExpandableNode for SchemaState {
    fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    fn cache_is_up_to_date(&self) -> bool {
        self.cache_is_up_to_date
    }
}

pub type SchemaNode = Node<SchemaState>;

impl SchemaNode {
    pub fn new(namespace: Namespace, ctx: NodeContext) -> Self {
        Self::from_state(SchemaState {
            namespace,
            ctx,
            is_expanded: false,
            cache_is_up_to_date: false,
            has_clicked_show_more: false,
            has_more_fields_to_show: false,
            fields: ChildCache::new(),
        })
    }

    pub fn has_clicked_show_more(&self) -> bool {
        self.lock().has_clicked_show_more
    }

    pub fn has_more_fields_to_show(&self) -> bool {
        self.lock().has_more_fields_to_show
    }

    pub fn field(&self, name: &str) -> Option<FieldNode> {
        self.lock().fields.get(name).cloned()
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        TreeItem::new(
            TreeNodeId::Schema {
                connection: state.ctx.connection_id.clone(),
                namespace: state.namespace.clone(),
            },
            "Schema",
            CollapsibleState::from_expanded(state.is_expanded),
        )
        .with_context("schemaTreeItem")
        .with_icon("schema")
    }

    /// Sample documents and render their fields. Fetch failures are returned to the caller.
    pub async fn children(&self) -> Result<Vec<TreeNode>> {
        let (namespace, ctx, is_expanded, cache_is_up_to_date, has_clicked_show_more) = {
            let state = self.lock();
            (
                state.namespace.clone(),
                state.ctx.clone(),
                state.is_expanded,
                state.cache_is_up_to_date,
                state.has_clicked_show_more,
            )
        };

        if !is_expanded {
            return Ok(Vec::new());
        }

        if cache_is_up_to_date {
            let mut state = self.lock();
            state.fields = rebuild_children(&state.fields);
            return Ok(self.wrap_children(&state));
        }

        let sample_size = ctx.explorer.page_size() as i64;
        let documents = match ctx
            .source
            .find(&namespace, doc! {}, FindOptions::with_limit(sample_size))
            .await
        {
            Ok(documents) => documents,
            Err(err) => {
                ctx.explorer.notify_error(format!("Unable to list documents: {err}"));
                return Err(Error::fetch("Unable to list documents", err));
            }
        };

        if documents.is_empty() {
            ctx.explorer.notify_info(NO_DOCUMENTS_NOTICE);
            let mut state = self.lock();
            state.fields.clear();
            state.has_more_fields_to_show = false;
            state.cache_is_up_to_date = true;
            return Ok(Vec::new());
        }

        let schema = infer_schema(&documents);
        let limit = ctx.explorer.settings.schema_fields_to_show;
        let has_more = !has_clicked_show_more && schema.fields.len() > limit;
        let shown = if has_more { limit } else { schema.fields.len() };

        let mut state = self.lock();
        let connection_id = ctx.connection_id.clone();
        state.fields = reconcile_children(
            &state.fields,
            schema.fields.into_iter().take(shown),
            |field| field.name.clone(),
            |field, prior| match prior {
                Some(node) => {
                    node.set_field(field);
                    node
                }
                None => FieldNode::new(field, connection_id.clone(), namespace.clone()),
            },
        );
        state.has_more_fields_to_show = has_more;
        state.cache_is_up_to_date = true;

        if !state.is_expanded {
            return Ok(Vec::new());
        }
        Ok(self.wrap_children(&state))
    }

    fn wrap_children(&self, state: &SchemaState) -> Vec<TreeNode> {
        let mut children = to_tree_nodes(&state.fields, TreeNode::Field);
        if state.has_more_fields_to_show {
            children.push(TreeNode::ShowMore(ShowMoreNode::new(
                &state.namespace,
                state.fields.len(),
                ShowMoreTarget::Schema(self.clone()),
            )));
        }
        children
    }

    /// Show every field from now on, including after collapse.
    pub fn on_show_more_clicked(&self) {
        let mut state = self.lock();
        state.has_clicked_show_more = true;
        state.cache_is_up_to_date = false;
    }

    pub fn on_expand(&self) -> bool {
        let mut state = self.lock();
        state.cache_is_up_to_date = false;
        state.is_expanded = true;
        true
    }

    pub fn on_collapse(&self) {
        let mut state = self.lock();
        state.is_expanded = false;
        state.cache_is_up_to_date = false;
    }

    pub fn reset_cache(&self) {
        let mut state = self.lock();
        state.fields.clear();
        state.cache_is_up_to_date = false;
    }
}

#[derive(Clone)]
pub struct FieldState {
    field: SchemaField,
    connection_id: String,
    namespace: Namespace,
    is_expanded: bool,
    fields: ChildCache<FieldState>,
}

impl ExpandableNode for FieldState {
    fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    /// Children derive from the in-memory descriptor.
    fn cache_is_up_to_date(&self) -> bool {
        true
    }
}

pub type FieldNode = Node<FieldState>;

impl FieldNode {
    pub fn new(field: SchemaField, connection_id: String, namespace: Namespace) -> Self {
        Self::from_state(FieldState {
            field,
            connection_id,
            namespace,
            is_expanded: false,
            fields: ChildCache::new(),
        })
    }

    pub(crate) fn set_field(&self, field: SchemaField) {
        self.lock().field = field;
    }

    pub fn descriptor(&self) -> SchemaField {
        self.lock().field.clone()
    }

    pub fn is_expandable(&self) -> bool {
        self.lock().field.is_expandable()
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        let field = &state.field;
        let collapsible_state = if field.is_expandable() {
            CollapsibleState::from_expanded(state.is_expanded)
        } else {
            CollapsibleState::None
        };

        TreeItem::new(
            TreeNodeId::Field {
                connection: state.connection_id.clone(),
                namespace: state.namespace.clone(),
                path: field.path.clone(),
            },
            field.name.clone(),
            collapsible_state,
        )
        .with_description(field.type_label())
        .with_tooltip(format!("{} - {}", field.name, field.type_label()))
        .with_context("fieldTreeItem")
        .with_icon(field_icon(field))
    }

    /// Nested fields, rebuilt on every call regardless of expansion.
    pub fn children(&self) -> Vec<TreeNode> {
        let mut state = self.lock();
        if !state.field.is_expandable() {
            return Vec::new();
        }

        let nested: Vec<SchemaField> = state.field.children().into_iter().cloned().collect();
        let connection_id = state.connection_id.clone();
        let namespace = state.namespace.clone();
        state.fields = reconcile_children(
            &state.fields,
            nested,
            |field| field.name.clone(),
            |field, prior| match prior {
                Some(node) => {
                    node.set_field(field);
                    node
                }
                None => FieldNode::new(field, connection_id.clone(), namespace.clone()),
            },
        );
        to_tree_nodes(&state.fields, TreeNode::Field)
    }

    pub fn on_expand(&self) -> bool {
        self.lock().is_expanded = true;
        true
    }

    pub fn on_collapse(&self) {
        self.lock().is_expanded = false;
    }
}

fn field_icon(field: &SchemaField) -> &'static str {
    if field.is_mixed() {
        return "mixed-type";
    }
    match field.single_type() {
        Some("Document") => "object",
        Some("Array") => "array",
        Some("String") => "string",
        Some("Double" | "Int32" | "Int64" | "Decimal128") => "number",
        Some("Boolean") => "boolean",
        Some("Date" | "Timestamp") => "date",
        Some("ObjectId") => "key",
        _ => "field",
    }
}
