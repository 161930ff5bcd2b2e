//! Renderable description of a node, handed to the host UI.

use crate::models::TreeNodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapsibleState {
    None,
    Collapsed,
    Expanded,
}

impl CollapsibleState {
    pub fn from_expanded(is_expanded: bool) -> Self {
        if is_expanded { CollapsibleState::Expanded } else { CollapsibleState::Collapsed }
    }
}

/// What the host needs to draw one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    /// Stable identity across reconciliation passes.
    pub key: TreeNodeId,
    /// Instance id for hosts that track rows by id. Set when a forced replacement is needed.
    pub id: Option<String>,
    pub label: String,
    pub description: Option<String>,
    pub tooltip: Option<String>,
    pub collapsible_state: CollapsibleState,
    pub context_value: Option<&'static str>,
    pub icon: Option<&'static str>,
}

impl TreeItem {
    pub fn new(
        key: TreeNodeId,
        label: impl Into<String>,
        collapsible_state: CollapsibleState,
    ) -> Self {
        Self {
            key,
            id: None,
            label: label.into(),
            description: None,
            tooltip: None,
            collapsible_state,
            context_value: None,
            icon: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_context(mut self, context_value: &'static str) -> Self {
        self.context_value = Some(context_value);
        self
    }

    pub fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }
}
