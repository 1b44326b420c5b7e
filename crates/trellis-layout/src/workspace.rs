// Workspace: one tab's pane tree, stored as an arena of nodes keyed by ID.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use trellis_core::{IdGenerator, NodeId, Pane, PaneId, SplitDirection, WorkspaceId};

use crate::error::{InvariantViolation, LayoutError, Result};
use crate::node::{CycleOrigin, NodeKind, PaneNode, SplitNode, StackNode};

const RATIO_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workspace {
    id: WorkspaceId,
    nodes: HashMap<NodeId, PaneNode>,
    root: Option<NodeId>,
    active_pane: Option<PaneId>,
}

impl Workspace {
    pub fn empty(id: impl Into<WorkspaceId>) -> Self {
        Self {
            id: id.into(),
            nodes: HashMap::new(),
            root: None,
            active_pane: None,
        }
    }

    /// A workspace holding a single active pane.
    pub fn with_pane(id: impl Into<WorkspaceId>, pane: Pane) -> Self {
        let mut ws = Self::empty(id);
        ws.install_root(PaneNode::leaf(pane, None));
        ws
    }

    // ──────────────────────────────────────────────
    // Queries
    // ──────────────────────────────────────────────

    pub fn id(&self) -> &WorkspaceId {
        &self.id
    }

    pub fn root(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    pub fn root_node(&self) -> Option<&PaneNode> {
        self.root.as_ref().and_then(|id| self.nodes.get(id))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node(&self, id: &NodeId) -> Option<&PaneNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn active_pane_id(&self) -> Option<&PaneId> {
        self.active_pane.as_ref()
    }

    pub fn active_node(&self) -> Option<&PaneNode> {
        self.find_pane(self.active_pane.as_ref()?)
    }

    pub fn active_pane(&self) -> Option<&Pane> {
        self.active_node().and_then(PaneNode::pane)
    }

    /// Leaf node holding the given pane.
    pub fn find_pane(&self, pane: &PaneId) -> Option<&PaneNode> {
        // Leaves are normally keyed by their pane ID; stack conversion and
        // dissolution are the exceptions.
        let direct = self
            .nodes
            .get(&NodeId::for_pane(pane))
            .filter(|node| node.pane().is_some_and(|p| &p.id == pane));
        direct.or_else(|| {
            self.nodes
                .values()
                .find(|node| node.pane().is_some_and(|p| &p.id == pane))
        })
    }

    /// All nodes in depth-first pre-order.
    pub fn walk(&self) -> Vec<&PaneNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut pending: Vec<&NodeId> = self.root.iter().collect();
        while let Some(id) = pending.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push(node);
            pending.extend(node.children().iter().rev());
        }
        out
    }

    /// Leaf nodes in depth-first order.
    pub fn leaves(&self) -> Vec<&PaneNode> {
        self.walk().into_iter().filter(|n| n.is_leaf()).collect()
    }

    pub fn all_panes(&self) -> Vec<&Pane> {
        self.walk().into_iter().filter_map(PaneNode::pane).collect()
    }

    pub fn pane_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_leaf()).count()
    }

    /// First leaf under `id`, always taking the first child.
    pub fn first_leaf(&self, id: &NodeId) -> Option<&PaneNode> {
        let mut node = self.nodes.get(id)?;
        loop {
            match node.children().first() {
                None => return node.is_leaf().then_some(node),
                Some(child) => node = self.nodes.get(child)?,
            }
        }
    }

    /// Stack directly containing `id`, if any.
    pub fn parent_stack(&self, id: &NodeId) -> Option<&PaneNode> {
        let parent = self.nodes.get(id)?.parent()?;
        self.nodes.get(parent).filter(|p| p.is_stack())
    }

    /// The node that represents `id` in its split layout: the enclosing
    /// stack for stack members, the node itself otherwise.
    pub fn layout_node(&self, id: &NodeId) -> NodeId {
        match self.parent_stack(id) {
            Some(stack) => stack.id().clone(),
            None => id.clone(),
        }
    }

    // ──────────────────────────────────────────────
    // Invariants
    // ──────────────────────────────────────────────

    /// Verify the structural rules every operation must preserve.
    pub fn check_invariants(&self, min_ratio: f64) -> std::result::Result<(), InvariantViolation> {
        let Some(root) = &self.root else {
            if let Some(stray) = self.nodes.keys().next() {
                return Err(InvariantViolation::Unreachable(stray.clone()));
            }
            if self.active_pane.is_some() {
                return Err(InvariantViolation::ActivePaneWithoutRoot);
            }
            return Ok(());
        };

        let root_node = self
            .nodes
            .get(root)
            .ok_or_else(|| InvariantViolation::MissingNode(root.clone()))?;
        if root_node.parent().is_some() {
            return Err(InvariantViolation::ParentMismatch {
                node: root.clone(),
                expected: None,
                actual: root_node.parent().cloned(),
            });
        }

        let (min, max) = (min_ratio, 1.0 - min_ratio);
        let mut visited: HashSet<&NodeId> = HashSet::new();
        let mut panes: HashSet<&PaneId> = HashSet::new();
        let mut pending = vec![root];

        while let Some(id) = pending.pop() {
            if !visited.insert(id) {
                return Err(InvariantViolation::Cycle(id.clone()));
            }
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| InvariantViolation::MissingNode(id.clone()))?;

            match node.kind() {
                NodeKind::Leaf(pane) => {
                    if !panes.insert(&pane.id) {
                        return Err(InvariantViolation::DuplicatePane(pane.id.clone()));
                    }
                }
                NodeKind::Split(split) => {
                    if split.ratio < min - RATIO_EPSILON || split.ratio > max + RATIO_EPSILON {
                        return Err(InvariantViolation::RatioOutOfBounds {
                            split: id.clone(),
                            ratio: split.ratio,
                            min,
                            max,
                        });
                    }
                }
                NodeKind::Stack(stack) => {
                    if stack.children.is_empty() {
                        return Err(InvariantViolation::EmptyStack(id.clone()));
                    }
                    if stack.active >= stack.children.len() {
                        return Err(InvariantViolation::ActiveIndexOutOfRange {
                            stack: id.clone(),
                            index: stack.active,
                            len: stack.children.len(),
                        });
                    }
                }
            }

            for child in node.children() {
                let child_node = self
                    .nodes
                    .get(child)
                    .ok_or_else(|| InvariantViolation::MissingNode(child.clone()))?;
                if child_node.parent() != Some(id) {
                    return Err(InvariantViolation::ParentMismatch {
                        node: child.clone(),
                        expected: Some(id.clone()),
                        actual: child_node.parent().cloned(),
                    });
                }
                pending.push(child);
            }
        }

        if let Some(stray) = self.nodes.keys().find(|id| !visited.contains(id)) {
            return Err(InvariantViolation::Unreachable(stray.clone()));
        }

        match &self.active_pane {
            Some(active) if !panes.contains(active) => {
                Err(InvariantViolation::ActivePaneMissing(active.clone()))
            }
            Some(_) => Ok(()),
            None => Err(InvariantViolation::NoActivePane),
        }
    }

    // ──────────────────────────────────────────────
    // Mutation primitives
    // ──────────────────────────────────────────────

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut PaneNode> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn require(&self, id: &NodeId) -> Result<&PaneNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| LayoutError::NodeNotFound(id.clone()))
    }

    pub(crate) fn require_mut(&mut self, id: &NodeId) -> Result<&mut PaneNode> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| LayoutError::NodeNotFound(id.clone()))
    }

    pub(crate) fn insert(&mut self, node: PaneNode) {
        self.nodes.insert(node.id().clone(), node);
    }

    pub(crate) fn take(&mut self, id: &NodeId) -> Result<PaneNode> {
        self.nodes
            .remove(id)
            .ok_or_else(|| LayoutError::NodeNotFound(id.clone()))
    }

    /// Replace everything with a single root node and focus its first leaf.
    pub(crate) fn install_root(&mut self, mut node: PaneNode) {
        node.set_parent(None);
        let id = node.id().clone();
        self.nodes.clear();
        self.insert(node);
        self.root = Some(id.clone());
        self.active_pane = self
            .first_leaf(&id)
            .and_then(PaneNode::pane)
            .map(|p| p.id.clone());
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.active_pane = None;
    }

    /// Fail with `IdCollision` if any ID is already present or repeated.
    pub(crate) fn ensure_fresh(&self, ids: &[&NodeId]) -> Result<()> {
        for (i, id) in ids.iter().enumerate() {
            if id.is_empty() || self.nodes.contains_key(*id) || ids[..i].contains(id) {
                return Err(LayoutError::IdCollision(id.to_string()));
            }
        }
        Ok(())
    }

    /// `preferred` if no node uses it and it is not in `taken`, otherwise a
    /// fresh ID from `ids`. Leaf and stack-child IDs are derived from pane
    /// and container IDs, and those can outlive the node they came from.
    pub(crate) fn claim_node_id(
        &self,
        preferred: NodeId,
        taken: &[&NodeId],
        ids: &mut dyn IdGenerator,
    ) -> Result<NodeId> {
        let free = |id: &NodeId| !id.is_empty() && !self.contains(id) && !taken.contains(&id);
        if free(&preferred) {
            return Ok(preferred);
        }
        let fresh = NodeId::new(ids.generate());
        if !free(&fresh) {
            return Err(LayoutError::IdCollision(fresh.to_string()));
        }
        log::debug!("node id {} in use; allocated {}", preferred, fresh);
        Ok(fresh)
    }

    pub(crate) fn ensure_pane_absent(&self, pane: &PaneId) -> Result<()> {
        if self.find_pane(pane).is_some() {
            return Err(LayoutError::IdCollision(pane.to_string()));
        }
        Ok(())
    }

    /// Make `pane` the active pane and bring it to the front of its stack.
    pub(crate) fn focus_pane(&mut self, pane: &PaneId) -> Result<NodeId> {
        let node = self
            .find_pane(pane)
            .ok_or_else(|| LayoutError::PaneNotFound(pane.clone()))?;
        let node_id = node.id().clone();
        if let Some(parent) = node.parent().cloned() {
            if let Some(stack) = self.nodes.get_mut(&parent).and_then(PaneNode::stack_mut) {
                if let Some(index) = stack.index_of(&node_id) {
                    stack.active = index;
                }
            }
        }
        self.active_pane = Some(pane.clone());
        Ok(node_id)
    }

    /// Focus the first leaf under `id`.
    pub(crate) fn focus_first_leaf(&mut self, id: &NodeId) -> Result<()> {
        let pane = self
            .first_leaf(id)
            .and_then(PaneNode::pane)
            .map(|p| p.id.clone())
            .ok_or_else(|| LayoutError::NotALeaf(id.clone()))?;
        self.focus_pane(&pane)?;
        Ok(())
    }

    /// Put `replacement` into the tree slot currently held by `old`.
    /// `old` is left in the arena without a parent.
    pub(crate) fn replace_in_parent(&mut self, old: &NodeId, replacement: &NodeId) -> Result<()> {
        let parent = self.require(old)?.parent().cloned();
        match &parent {
            Some(parent_id) => {
                let parent_node = self.require_mut(parent_id)?;
                for slot in parent_node.children_mut() {
                    if slot == old {
                        *slot = replacement.clone();
                    }
                }
            }
            None => self.root = Some(replacement.clone()),
        }
        self.require_mut(replacement)?.set_parent(parent);
        self.require_mut(old)?.set_parent(None);
        Ok(())
    }

    /// Wrap `target` in a new split together with `new_node`.
    pub(crate) fn wrap_in_split(
        &mut self,
        target: &NodeId,
        mut new_node: PaneNode,
        split_id: NodeId,
        direction: SplitDirection,
        new_first: bool,
        cycle_origin: CycleOrigin,
    ) -> Result<()> {
        self.require(target)?;
        let new_id = new_node.id().clone();
        let children = if new_first {
            [new_id, target.clone()]
        } else {
            [target.clone(), new_id]
        };
        let split = SplitNode {
            direction,
            ratio: 0.5,
            children,
            cycle_origin,
        };
        self.insert(PaneNode::new(split_id.clone(), None, NodeKind::Split(split)));
        self.replace_in_parent(target, &split_id)?;
        self.require_mut(target)?.set_parent(Some(split_id.clone()));
        new_node.set_parent(Some(split_id));
        self.insert(new_node);
        Ok(())
    }

    /// Remove `leaf` from its parent split; the sibling takes the split's
    /// place. Returns the detached node and the promoted sibling.
    pub(crate) fn detach_promoting_sibling(&mut self, leaf: &NodeId) -> Result<(PaneNode, NodeId)> {
        let parent_id = self
            .require(leaf)?
            .parent()
            .cloned()
            .ok_or_else(|| LayoutError::NoParentSplit(leaf.clone()))?;
        let sibling = self
            .require(&parent_id)?
            .as_split()
            .and_then(|split| split.sibling_of(leaf))
            .cloned()
            .ok_or_else(|| LayoutError::NoParentSplit(leaf.clone()))?;

        self.replace_in_parent(&parent_id, &sibling)?;
        self.take(&parent_id)?;
        let mut detached = self.take(leaf)?;
        detached.set_parent(None);
        Ok((detached, sibling))
    }

    /// Remove the child `child` from `stack`, keeping the active index on
    /// the same visible child where possible.
    pub(crate) fn remove_stack_child(&mut self, stack_id: &NodeId, child: &NodeId) -> Result<PaneNode> {
        let stack = self
            .require_mut(stack_id)?
            .stack_mut()
            .ok_or_else(|| LayoutError::NotAStack(stack_id.clone()))?;
        let index = stack
            .index_of(child)
            .ok_or_else(|| LayoutError::NodeNotFound(child.clone()))?;
        stack.children.remove(index);
        if index < stack.active {
            stack.active -= 1;
        }
        stack.clamp_active();
        let mut removed = self.take(child)?;
        removed.set_parent(None);
        Ok(removed)
    }

    /// Turn a one-child stack back into a plain leaf that keeps the stack's
    /// node ID. A non-leaf only child is promoted into the stack's slot.
    /// Returns the node now occupying the stack's position.
    pub(crate) fn dissolve_stack(&mut self, stack_id: &NodeId) -> Result<NodeId> {
        let only = match self.require(stack_id)?.as_stack() {
            Some(StackNode { children, .. }) if children.len() == 1 => children[0].clone(),
            Some(StackNode { children, .. }) => {
                return Err(InvariantViolation::StackTooSmall {
                    stack: stack_id.clone(),
                    len: children.len(),
                    min: 1,
                }
                .into())
            }
            None => return Err(LayoutError::NotAStack(stack_id.clone())),
        };

        if self.require(&only)?.is_leaf() {
            if let NodeKind::Leaf(pane) = self.take(&only)?.into_kind() {
                self.require_mut(stack_id)?.retag(NodeKind::Leaf(pane));
            }
            Ok(stack_id.clone())
        } else {
            self.replace_in_parent(stack_id, &only)?;
            self.take(stack_id)?;
            Ok(only)
        }
    }

    /// Convert a leaf into a one-child stack in place. The pane moves to the
    /// new child node `child_id`; the container keeps the leaf's ID and
    /// position.
    pub(crate) fn convert_leaf_to_stack(&mut self, leaf: &NodeId, child_id: NodeId) -> Result<()> {
        self.ensure_fresh(&[&child_id])?;
        let node = self.require_mut(leaf)?;
        if !node.is_leaf() {
            return Err(LayoutError::NotALeaf(leaf.clone()));
        }
        let previous = node.retag(NodeKind::Stack(StackNode {
            children: vec![child_id.clone()],
            active: 0,
        }));
        if let NodeKind::Leaf(pane) = previous {
            self.insert(PaneNode::new(
                child_id.clone(),
                Some(leaf.clone()),
                NodeKind::Leaf(pane),
            ));
        }
        Ok(())
    }

    /// Insert a detached node into `stack` at `index` (clamped to the end)
    /// and make it the visible child.
    pub(crate) fn insert_into_stack(
        &mut self,
        stack_id: &NodeId,
        index: usize,
        mut node: PaneNode,
    ) -> Result<usize> {
        let child_id = node.id().clone();
        let stack = self
            .require_mut(stack_id)?
            .stack_mut()
            .ok_or_else(|| LayoutError::NotAStack(stack_id.clone()))?;
        let index = index.min(stack.children.len());
        stack.children.insert(index, child_id);
        stack.active = index;
        node.set_parent(Some(stack_id.clone()));
        self.insert(node);
        Ok(index)
    }
}
