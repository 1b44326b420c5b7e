// Pane tree node types.

use serde::Serialize;
use trellis_core::{NodeId, Pane, SplitDirection};

/// Records that a vertical split was produced by expelling a pane out of
/// a stack sideways, so a later consume to the right can restore the
/// horizontal layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOrigin {
    #[default]
    None,
    ExpelledLeft,
    ExpelledRight,
}

impl CycleOrigin {
    pub fn is_expelled(self) -> bool {
        self != CycleOrigin::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitNode {
    pub direction: SplitDirection,
    /// Share of the first child, in (0, 1).
    pub ratio: f64,
    pub children: [NodeId; 2],
    pub cycle_origin: CycleOrigin,
}

impl SplitNode {
    pub fn index_of(&self, child: &NodeId) -> Option<usize> {
        self.children.iter().position(|c| c == child)
    }

    pub fn sibling_of(&self, child: &NodeId) -> Option<&NodeId> {
        match self.index_of(child)? {
            0 => Some(&self.children[1]),
            _ => Some(&self.children[0]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackNode {
    pub children: Vec<NodeId>,
    /// Index of the visible child.
    pub active: usize,
}

impl StackNode {
    pub fn index_of(&self, child: &NodeId) -> Option<usize> {
        self.children.iter().position(|c| c == child)
    }

    pub fn active_child(&self) -> Option<&NodeId> {
        self.children.get(self.active)
    }

    pub(crate) fn clamp_active(&mut self) {
        if self.active >= self.children.len() {
            self.active = self.children.len().saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Leaf(Pane),
    Split(SplitNode),
    Stack(StackNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaneNode {
    id: NodeId,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl PaneNode {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self { id, parent, kind }
    }

    pub(crate) fn leaf(pane: Pane, parent: Option<NodeId>) -> Self {
        Self::new(NodeId::for_pane(&pane.id), parent, NodeKind::Leaf(pane))
    }

    /// Detached leaf under an explicit node ID.
    pub(crate) fn leaf_with_id(id: NodeId, pane: Pane) -> Self {
        Self::new(id, None, NodeKind::Leaf(pane))
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn pane(&self) -> Option<&Pane> {
        match &self.kind {
            NodeKind::Leaf(pane) => Some(pane),
            _ => None,
        }
    }

    pub fn as_split(&self) -> Option<&SplitNode> {
        match &self.kind {
            NodeKind::Split(split) => Some(split),
            _ => None,
        }
    }

    pub fn as_stack(&self) -> Option<&StackNode> {
        match &self.kind {
            NodeKind::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn is_split(&self) -> bool {
        matches!(self.kind, NodeKind::Split(_))
    }

    pub fn is_stack(&self) -> bool {
        matches!(self.kind, NodeKind::Stack(_))
    }

    /// Child IDs in order; empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Split(split) => &split.children,
            NodeKind::Stack(stack) => &stack.children,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn split_mut(&mut self) -> Option<&mut SplitNode> {
        match &mut self.kind {
            NodeKind::Split(split) => Some(split),
            _ => None,
        }
    }

    pub(crate) fn stack_mut(&mut self) -> Option<&mut StackNode> {
        match &mut self.kind {
            NodeKind::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut [NodeId] {
        match &mut self.kind {
            NodeKind::Leaf(_) => &mut [],
            NodeKind::Split(split) => &mut split.children,
            NodeKind::Stack(stack) => &mut stack.children,
        }
    }

    pub(crate) fn into_kind(self) -> NodeKind {
        self.kind
    }

    /// Swap the node's whole payload, keeping its ID and parent.
    pub(crate) fn retag(&mut self, kind: NodeKind) -> NodeKind {
        std::mem::replace(&mut self.kind, kind)
    }
}
