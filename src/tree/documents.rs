//! Paginated document list and its document leaves.

use std::sync::Arc;

use futures::future::{AbortRegistration, Abortable, BoxFuture};
use mongodb::bson::{Document, doc};

use crate::bson::DocumentKey;
use crate::connection::{FindOptions, PreviewOptions};
use crate::error::{Error, Result};
use crate::helpers::format_doc_count;
use crate::models::{CollectionKind, Namespace, TreeNodeId};
use crate::tree::context::NodeContext;
use crate::tree::leaf::{ShowMoreNode, ShowMoreTarget};
use crate::tree::node::{ExpandableNode, Node, TreeNode};
use crate::tree::{CollapsibleState, TreeItem};

pub const DOCUMENT_LIST_CONTEXT: &str = "documentListTreeItem";
pub const DOCUMENT_CONTEXT: &str = "documentTreeItem";

/// Asks the owning collection to refresh its document count.
pub type RefreshCount = Arc<dyn Fn() -> BoxFuture<'static, Option<u64>> + Send + Sync>;

#[derive(Clone)]
pub struct DocumentListState {
    kind: CollectionKind,
    namespace: Namespace,
    ctx: NodeContext,
    is_expanded: bool,
    cache_is_up_to_date: bool,
    max_to_show: usize,
    document_count: Option<u64>,
    documents: Vec<Document>,
    refresh_count: Option<RefreshCount>,
}

impl ExpandableNode for DocumentListState {
    fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    fn cache_is_up_to_date(&self) -> bool {
        self.cache_is_up_to_date
    }
}

impl DocumentListState {
    fn has_more_documents_to_show(&self) -> bool {
        self.document_count.is_some_and(|count| count > self.max_to_show as u64)
    }
}

pub type DocumentListNode = Node<DocumentListState>;

impl DocumentListNode {
    pub fn new(kind: CollectionKind, namespace: Namespace, ctx: NodeContext) -> Self {
        let max_to_show = ctx.explorer.page_size();
        Self::from_state(DocumentListState {
            kind,
            namespace,
            ctx,
            is_expanded: false,
            cache_is_up_to_date: false,
            max_to_show,
            document_count: None,
            documents: Vec::new(),
            refresh_count: None,
        })
    }

    pub(crate) fn attach_parent(&self, refresh: RefreshCount, document_count: Option<u64>) {
        let mut state = self.lock();
        state.refresh_count = Some(refresh);
        state.document_count = document_count;
    }

    pub(crate) fn set_kind(&self, kind: CollectionKind) {
        self.lock().kind = kind;
    }

    pub fn max_to_show(&self) -> usize {
        self.lock().max_to_show
    }

    pub fn document_count(&self) -> Option<u64> {
        self.lock().document_count
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        let collapsible_state = if state.kind == CollectionKind::View {
            CollapsibleState::None
        } else {
            CollapsibleState::from_expanded(state.is_expanded)
        };
        let type_name = if state.kind == CollectionKind::View { "View" } else { "Collection" };

        let mut item = TreeItem::new(
            TreeNodeId::Documents {
                connection: state.ctx.connection_id.clone(),
                namespace: state.namespace.clone(),
            },
            "Documents",
            collapsible_state,
        )
        .with_context(DOCUMENT_LIST_CONTEXT)
        .with_icon("documents");

        match state.document_count {
            Some(count) => {
                item = item
                    .with_description(format_doc_count(count))
                    .with_tooltip(format!("{type_name} Documents - {count}"));
            }
            None => item = item.with_tooltip(format!("{type_name} Documents")),
        }
        item
    }

    pub async fn children(&self) -> Result<Vec<TreeNode>> {
        let (kind, namespace, ctx, is_expanded, cache_is_up_to_date, max_to_show) = {
            let state = self.lock();
            (
                state.kind,
                state.namespace.clone(),
                state.ctx.clone(),
                state.is_expanded,
                state.cache_is_up_to_date,
                state.max_to_show,
            )
        };

        if !is_expanded || kind == CollectionKind::View {
            return Ok(Vec::new());
        }

        if cache_is_up_to_date {
            return Ok(self.wrap_children());
        }

        log::debug!("Fetching {max_to_show} documents of {namespace}");
        let result =
            ctx.source.find(&namespace, doc! {}, FindOptions::with_limit(max_to_show as i64)).await;

        {
            let mut state = self.lock();
            state.cache_is_up_to_date = true;
            state.documents.clear();
        }

        let documents = match result {
            Ok(documents) => documents,
            Err(err) => {
                ctx.explorer.notify_error(format!("Fetch documents failed: {err}"));
                return Ok(Vec::new());
            }
        };

        self.lock().documents = documents;
        if !self.is_expanded() {
            return Ok(Vec::new());
        }
        Ok(self.wrap_children())
    }

    fn wrap_children(&self) -> Vec<TreeNode> {
        let state = self.lock();
        let mut children: Vec<TreeNode> = state
            .documents
            .iter()
            .enumerate()
            .map(|(index, document)| {
                TreeNode::Document(DocumentNode::new(
                    document.clone(),
                    state.ctx.connection_id.clone(),
                    state.namespace.clone(),
                    index,
                ))
            })
            .collect();

        if state.has_more_documents_to_show() {
            children.push(TreeNode::ShowMore(ShowMoreNode::new(
                &state.namespace,
                state.max_to_show,
                ShowMoreTarget::Documents(self.clone()),
            )));
        }
        children
    }

    /// Widen the window by one page.
    pub fn on_show_more_clicked(&self) {
        let mut state = self.lock();
        state.max_to_show += state.ctx.explorer.page_size();
        state.cache_is_up_to_date = false;
    }

    pub fn on_collapse(&self) {
        let mut state = self.lock();
        state.is_expanded = false;
        state.cache_is_up_to_date = false;
        state.max_to_show = state.ctx.explorer.page_size();
    }

    pub async fn on_expand(&self) -> bool {
        let refresh = {
            let mut state = self.lock();
            state.cache_is_up_to_date = false;
            state.is_expanded = true;
            state.refresh_count.clone()
        };

        if let Some(refresh) = refresh {
            let count = refresh().await;
            self.lock().document_count = count;
        }
        true
    }

    pub async fn reset_cache(&self) {
        let refresh = {
            let mut state = self.lock();
            state.documents.clear();
            state.cache_is_up_to_date = false;
            state.refresh_count.clone()
        };

        if let Some(refresh) = refresh {
            let count = refresh().await;
            self.lock().document_count = count;
        }
    }

    /// Load documents for a preview, optionally sorted by `_id`.
    pub async fn load_preview(
        &self,
        options: PreviewOptions,
        abort: Option<AbortRegistration>,
    ) -> Result<Vec<Document>> {
        let (namespace, ctx, max_to_show) = {
            let state = self.lock();
            (state.namespace.clone(), state.ctx.clone(), state.max_to_show)
        };

        let find_options = FindOptions {
            limit: Some(options.limit.unwrap_or(max_to_show as i64)),
            sort: options.sort.to_sort(),
        };
        let fetch = ctx.source.find(&namespace, doc! {}, find_options);

        match abort {
            Some(registration) => match Abortable::new(fetch, registration).await {
                Ok(result) => result,
                Err(_aborted) => Err(Error::Aborted),
            },
            None => fetch.await,
        }
    }

    /// Estimated total for previews. Views and time series report zero.
    pub async fn total_count(&self, abort: Option<AbortRegistration>) -> Result<u64> {
        let (kind, namespace, ctx) = {
            let state = self.lock();
            (state.kind, state.namespace.clone(), state.ctx.clone())
        };

        if matches!(kind, CollectionKind::View | CollectionKind::Timeseries) {
            return Ok(0);
        }

        let fetch = ctx.source.estimated_count(&namespace);
        let result = match abort {
            Some(registration) => match Abortable::new(fetch, registration).await {
                Ok(result) => result,
                Err(_aborted) => return Err(Error::Aborted),
            },
            None => fetch.await,
        };

        Ok(result.unwrap_or_else(|err| {
            log::warn!("Unable to count documents of {namespace}: {err}");
            0
        }))
    }
}

#[derive(Clone)]
pub struct DocumentState {
    document: Document,
    connection_id: String,
    namespace: Namespace,
    index: usize,
}

/// One fetched document.
pub type DocumentNode = Node<DocumentState>;

impl DocumentNode {
    pub fn new(
        document: Document,
        connection_id: String,
        namespace: Namespace,
        index: usize,
    ) -> Self {
        Self::from_state(DocumentState { document, connection_id, namespace, index })
    }

    pub fn document(&self) -> Document {
        self.lock().document.clone()
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        let label = DocumentKey::from_document(&state.document, state.index);
        TreeItem::new(
            TreeNodeId::Document {
                connection: state.connection_id.clone(),
                namespace: state.namespace.clone(),
                index: state.index,
            },
            label.to_string(),
            CollapsibleState::None,
        )
        .with_tooltip(label.to_string())
        .with_context(DOCUMENT_CONTEXT)
        .with_icon("document")
    }
}
