// Stacks: several panes sharing one slot, one of them visible.

use trellis_core::{Direction, NodeId, Pane, PaneId};

use crate::error::{LayoutError, Result};
use crate::node::{NodeKind, PaneNode};
use crate::workspace::Workspace;
use crate::PaneManager;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateStackOutcome {
    /// The converted node; it keeps the leaf's ID.
    pub stack_node: NodeId,
    /// Child now holding the original pane.
    pub original_node: NodeId,
    pub new_pane_node: NodeId,
    pub new_pane: PaneId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddToStackOutcome {
    pub new_pane_node: NodeId,
    pub index: usize,
}

impl PaneManager {
    /// Turn the leaf `node` into a stack holding its pane plus a new one,
    /// which becomes active.
    pub fn create_stack(
        &mut self,
        ws: &mut Workspace,
        node: &NodeId,
        pane: Option<Pane>,
    ) -> Result<CreateStackOutcome> {
        let target = ws.require(node)?;
        if !target.is_leaf() {
            return Err(LayoutError::NotALeaf(node.clone()));
        }
        if ws.parent_stack(node).is_some() {
            return Err(LayoutError::AlreadyStacked(node.clone()));
        }

        let pane = pane.unwrap_or_else(|| self.fresh_pane(None));
        ws.ensure_pane_absent(&pane.id)?;
        let new_pane = pane.id.clone();
        let new_pane_node = self.claim_node_id(ws, NodeId::for_pane(&new_pane), &[])?;
        let original_node =
            self.claim_node_id(ws, NodeId::stack_child(node), &[&new_pane_node])?;
        ws.ensure_fresh(&[&original_node, &new_pane_node])?;

        ws.convert_leaf_to_stack(node, original_node.clone())?;
        let leaf = PaneNode::leaf_with_id(new_pane_node.clone(), pane);
        ws.insert_into_stack(node, 1, leaf)?;
        ws.focus_pane(&new_pane)?;

        log::info!("created stack {} with new pane {}", node, new_pane);
        Ok(CreateStackOutcome {
            stack_node: node.clone(),
            original_node,
            new_pane_node,
            new_pane,
        })
    }

    /// Insert a pane right after the visible child of `stack` and show it.
    pub fn add_to_stack(
        &mut self,
        ws: &mut Workspace,
        stack: &NodeId,
        pane: Option<Pane>,
    ) -> Result<AddToStackOutcome> {
        let active = ws
            .require(stack)?
            .as_stack()
            .map(|s| s.active)
            .ok_or_else(|| LayoutError::NotAStack(stack.clone()))?;

        let pane = pane.unwrap_or_else(|| self.fresh_pane(None));
        ws.ensure_pane_absent(&pane.id)?;
        let pane_id = pane.id.clone();
        let new_pane_node = self.claim_node_id(ws, NodeId::for_pane(&pane_id), &[])?;
        let leaf = PaneNode::leaf_with_id(new_pane_node.clone(), pane);

        // insert_into_stack clamps, so an out of range active index appends.
        let index = ws.insert_into_stack(stack, active.saturating_add(1), leaf)?;
        ws.focus_pane(&pane_id)?;

        log::info!("added pane {} to stack {} at {}", pane_id, stack, index);
        Ok(AddToStackOutcome {
            new_pane_node,
            index,
        })
    }

    /// Cycle the visible child of `stack`: Up shows the previous child,
    /// Down the next. Focuses and returns the pane now shown.
    pub fn navigate_stack(
        &self,
        ws: &mut Workspace,
        stack: &NodeId,
        direction: Direction,
    ) -> Result<PaneId> {
        let (children, current) = ws
            .require(stack)?
            .as_stack()
            .map(|s| (s.children.clone(), s.active))
            .ok_or_else(|| LayoutError::NotAStack(stack.clone()))?;
        let count = children.len();
        if count == 0 {
            return Err(LayoutError::EmptyStack(stack.clone()));
        }

        let next = match direction {
            Direction::Up => (current + count - 1) % count,
            Direction::Down => (current + 1) % count,
            other => return Err(LayoutError::InvalidStackDirection(other)),
        };
        let pane = ws
            .first_leaf(&children[next])
            .and_then(PaneNode::pane)
            .map(|p| p.id.clone())
            .ok_or_else(|| LayoutError::NotALeaf(children[next].clone()))?;

        if let Some(s) = ws.node_mut(stack).and_then(PaneNode::stack_mut) {
            s.active = next;
        }
        ws.focus_pane(&pane)?;
        log::debug!("stack {} now shows {} ({}/{})", stack, pane, next + 1, count);
        Ok(pane)
    }

    /// Remove the child holding `pane` from `stack`. The stack is never
    /// dissolved here, even if one child remains.
    pub fn remove_from_stack(
        &self,
        ws: &mut Workspace,
        stack: &NodeId,
        pane: &PaneId,
    ) -> Result<Pane> {
        let children = ws
            .require(stack)?
            .as_stack()
            .map(|s| s.children.clone())
            .ok_or_else(|| LayoutError::NotAStack(stack.clone()))?;
        let child = children
            .iter()
            .find(|c| ws.node(c).and_then(PaneNode::pane).is_some_and(|p| &p.id == pane))
            .cloned()
            .ok_or_else(|| LayoutError::PaneNotFound(pane.clone()))?;
        if children.len() == 1 {
            return Err(LayoutError::LastStackChild(stack.clone()));
        }

        let was_active = ws.active_pane_id() == Some(pane);
        let removed = ws.remove_stack_child(stack, &child)?;
        if was_active {
            let visible = ws
                .require(stack)?
                .as_stack()
                .and_then(|s| s.active_child())
                .cloned()
                .ok_or_else(|| LayoutError::EmptyStack(stack.clone()))?;
            ws.focus_first_leaf(&visible)?;
        }

        log::info!("removed pane {} from stack {}", pane, stack);
        match removed.into_kind() {
            NodeKind::Leaf(pane) => Ok(pane),
            _ => Err(LayoutError::NotALeaf(child)),
        }
    }
}
