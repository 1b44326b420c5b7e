// Split and close.

use trellis_core::{Direction, NodeId, Pane};

use crate::error::{InvariantViolation, LayoutError, Result};
use crate::node::{CycleOrigin, PaneNode};
use crate::workspace::Workspace;
use crate::PaneManager;

#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub target: NodeId,
    pub direction: Direction,
    /// Existing pane to place in the new slot (popups). A fresh pane is
    /// created when absent.
    pub pane: Option<Pane>,
    pub initial_url: Option<String>,
}

impl SplitRequest {
    pub fn new(target: impl Into<NodeId>, direction: Direction) -> Self {
        Self {
            target: target.into(),
            direction,
            pane: None,
            initial_url: None,
        }
    }

    pub fn with_pane(mut self, pane: Pane) -> Self {
        self.pane = Some(pane);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.initial_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    pub new_pane_node: NodeId,
    pub parent_node: NodeId,
    pub split_ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloseOutcome {
    pub closed: Pane,
    /// Node now occupying the closed pane's old position; `None` when the
    /// workspace became empty.
    pub promoted: Option<NodeId>,
}

impl PaneManager {
    /// Split `target` in `direction`, placing a new pane on that side.
    /// Members of a stack are split around the whole stack.
    pub fn split(&mut self, ws: &mut Workspace, request: SplitRequest) -> Result<SplitOutcome> {
        log::debug!(
            "split target={} direction={}",
            request.target,
            request.direction
        );
        ws.require(&request.target)?;
        let anchor = ws.layout_node(&request.target);

        let pane = match request.pane {
            Some(pane) => pane,
            None => self.fresh_pane(request.initial_url.as_deref()),
        };
        ws.ensure_pane_absent(&pane.id)?;
        let new_pane_node = self.claim_node_id(ws, NodeId::for_pane(&pane.id), &[])?;
        let parent_node = NodeId::new(self.next_id());
        ws.ensure_fresh(&[&new_pane_node, &parent_node])?;
        let leaf = PaneNode::leaf_with_id(new_pane_node.clone(), pane);

        ws.wrap_in_split(
            &anchor,
            leaf,
            parent_node.clone(),
            request.direction.orientation(),
            !request.direction.is_forward(),
            CycleOrigin::None,
        )?;

        log::info!(
            "split anchor={} new_pane={} parent={}",
            anchor,
            new_pane_node,
            parent_node
        );
        Ok(SplitOutcome {
            new_pane_node,
            parent_node,
            split_ratio: 0.5,
        })
    }

    /// Close the leaf `node`.
    pub fn close(&self, ws: &mut Workspace, node: &NodeId) -> Result<CloseOutcome> {
        let target = ws.require(node)?;
        let closed = target
            .pane()
            .cloned()
            .ok_or_else(|| LayoutError::NotALeaf(node.clone()))?;
        let was_active = ws.active_pane_id() == Some(&closed.id);
        let parent = target.parent().cloned();

        let promoted = match parent {
            None => {
                ws.clear();
                log::info!("closed last pane {}; workspace empty", closed.id);
                None
            }
            Some(parent) if ws.node(&parent).is_some_and(PaneNode::is_stack) => {
                Some(close_stacked(ws, node, &parent, was_active)?)
            }
            Some(_) => {
                let (_, sibling) = ws.detach_promoting_sibling(node)?;
                if was_active {
                    ws.focus_first_leaf(&sibling)?;
                }
                log::info!("closed pane {}; promoted {}", closed.id, sibling);
                Some(sibling)
            }
        };

        Ok(CloseOutcome { closed, promoted })
    }
}

/// Close a stack member. A stack left with one child is replaced by that
/// child.
fn close_stacked(
    ws: &mut Workspace,
    node: &NodeId,
    stack_id: &NodeId,
    was_active: bool,
) -> Result<NodeId> {
    let children = ws
        .require(stack_id)?
        .as_stack()
        .map(|s| s.children.clone())
        .ok_or_else(|| LayoutError::NotAStack(stack_id.clone()))?;

    match children.len() {
        0 | 1 => Err(InvariantViolation::StackTooSmall {
            stack: stack_id.clone(),
            len: children.len(),
            min: 2,
        }
        .into()),
        2 => {
            let remaining = children
                .iter()
                .find(|c| *c != node)
                .cloned()
                .ok_or_else(|| LayoutError::NodeNotFound(node.clone()))?;
            ws.remove_stack_child(stack_id, node)?;
            ws.replace_in_parent(stack_id, &remaining)?;
            ws.take(stack_id)?;
            if was_active {
                ws.focus_first_leaf(&remaining)?;
            }
            log::info!("closed {} and dissolved stack {}", node, stack_id);
            Ok(remaining)
        }
        _ => {
            ws.remove_stack_child(stack_id, node)?;
            if was_active {
                let visible = ws
                    .require(stack_id)?
                    .as_stack()
                    .and_then(|s| s.active_child())
                    .cloned()
                    .ok_or_else(|| LayoutError::EmptyStack(stack_id.clone()))?;
                ws.focus_first_leaf(&visible)?;
            }
            log::info!("closed {} from stack {}", node, stack_id);
            Ok(stack_id.clone())
        }
    }
}
