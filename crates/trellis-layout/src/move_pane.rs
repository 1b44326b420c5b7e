// Moving a pane from one tab's workspace into another tab.

use trellis_core::{NodeId, PaneId, SplitDirection, TabId, WorkspaceId};

use crate::error::{InvariantViolation, LayoutError, Result};
use crate::node::{CycleOrigin, NodeKind, PaneNode};
use crate::tabs::{Tab, TabList, TabManager};
use crate::workspace::Workspace;

#[derive(Debug, Clone)]
pub struct MovePaneRequest {
    pub source_tab: TabId,
    pub pane: PaneId,
    /// Destination tab. `None` or an unknown ID moves the pane into a new
    /// tab.
    pub target_tab: Option<TabId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovePaneOutcome {
    pub target_tab: TabId,
    pub moved_node: NodeId,
    pub source_tab_closed: bool,
    pub new_tab_created: bool,
}

/// Where the pane lands, worked out before the source is touched.
enum Destination {
    EmptyWorkspace(TabId),
    RightOf {
        tab: TabId,
        anchor: NodeId,
        split: NodeId,
        moved: NodeId,
    },
    NewTab {
        tab: TabId,
        workspace: WorkspaceId,
    },
}

impl TabManager {
    /// Detach `request.pane` from its tab and insert it to the right of the
    /// target tab's active pane. An emptied source tab is closed.
    pub fn move_pane_to_tab(
        &mut self,
        tabs: &mut TabList,
        request: MovePaneRequest,
    ) -> Result<MovePaneOutcome> {
        log::debug!(
            "move pane={} from={} to={:?}",
            request.pane,
            request.source_tab,
            request.target_tab
        );
        if request.target_tab.as_ref() == Some(&request.source_tab) {
            return Err(LayoutError::SameTab);
        }

        let source = tabs
            .find(&request.source_tab)
            .ok_or_else(|| LayoutError::TabNotFound(request.source_tab.clone()))?;
        let leaf = source
            .workspace
            .find_pane(&request.pane)
            .map(|n| n.id().clone())
            .ok_or_else(|| LayoutError::PaneNotFound(request.pane.clone()))?;
        if let Some(stack) = source.workspace.parent_stack(&leaf) {
            let len = stack.children().len();
            if len < 2 {
                return Err(InvariantViolation::StackTooSmall {
                    stack: stack.id().clone(),
                    len,
                    min: 2,
                }
                .into());
            }
        }

        let destination = self.plan_destination(tabs, &request)?;

        let source_ws = &mut tabs
            .find_mut(&request.source_tab)
            .ok_or_else(|| LayoutError::TabNotFound(request.source_tab.clone()))?
            .workspace;
        let detached = detach(source_ws, &leaf)?;
        let source_tab_closed = source_ws.is_empty();
        if source_tab_closed {
            tabs.remove(&request.source_tab);
            log::info!("source tab {} emptied and closed", request.source_tab);
        }

        let pane = match detached.into_kind() {
            NodeKind::Leaf(pane) => pane,
            _ => return Err(LayoutError::NotALeaf(leaf)),
        };
        let moved_node = match &destination {
            Destination::RightOf { moved, .. } => moved.clone(),
            _ => NodeId::for_pane(&pane.id),
        };
        let moved = PaneNode::leaf_with_id(moved_node.clone(), pane);

        let (target_tab, new_tab_created) = match destination {
            Destination::EmptyWorkspace(tab) => {
                target_workspace(tabs, &tab)?.install_root(moved);
                (tab, false)
            }
            Destination::RightOf {
                tab, anchor, split, ..
            } => {
                let ws = target_workspace(tabs, &tab)?;
                ws.wrap_in_split(
                    &anchor,
                    moved,
                    split,
                    SplitDirection::Horizontal,
                    false,
                    CycleOrigin::None,
                )?;
                ws.focus_pane(&request.pane)?;
                (tab, false)
            }
            Destination::NewTab { tab, workspace } => {
                let ws = Workspace::empty(workspace);
                let mut new_tab = Tab::new(tab.clone(), ws);
                new_tab.workspace.install_root(moved);
                tabs.add(new_tab);
                (tab, true)
            }
        };

        log::info!(
            "moved pane={} to tab={} new_tab={} source_closed={}",
            request.pane,
            target_tab,
            new_tab_created,
            source_tab_closed
        );
        Ok(MovePaneOutcome {
            target_tab,
            moved_node,
            source_tab_closed,
            new_tab_created,
        })
    }

    fn plan_destination(&mut self, tabs: &TabList, request: &MovePaneRequest) -> Result<Destination> {
        let target = request
            .target_tab
            .as_ref()
            .and_then(|id| tabs.find(id));

        let Some(target) = target else {
            if let Some(unknown) = &request.target_tab {
                log::debug!("target tab {} not found; creating a new tab", unknown);
            }
            let tab = TabId::new(self.next_id());
            let workspace = WorkspaceId::new(self.next_id());
            if tabs.find(&tab).is_some() {
                return Err(LayoutError::IdCollision(tab.to_string()));
            }
            return Ok(Destination::NewTab { tab, workspace });
        };

        let ws = &target.workspace;
        ws.ensure_pane_absent(&request.pane)?;
        if ws.is_empty() {
            return Ok(Destination::EmptyWorkspace(target.id.clone()));
        }
        let active = ws.active_node().ok_or(LayoutError::NoActivePane)?;
        let anchor = ws.layout_node(active.id());
        let split = NodeId::new(self.next_id());
        let moved = self.claim_node_id(ws, NodeId::for_pane(&request.pane), &[&split])?;
        ws.ensure_fresh(&[&moved, &split])?;
        Ok(Destination::RightOf {
            tab: target.id.clone(),
            anchor,
            split,
            moved,
        })
    }
}

fn target_workspace<'a>(tabs: &'a mut TabList, id: &TabId) -> Result<&'a mut Workspace> {
    tabs.find_mut(id)
        .map(|t| &mut t.workspace)
        .ok_or_else(|| LayoutError::TabNotFound(id.clone()))
}

/// Take `leaf` out of `ws`, leaving the workspace consistent with a new
/// active pane.
fn detach(ws: &mut Workspace, leaf: &NodeId) -> Result<PaneNode> {
    if let Some(stack) = ws.parent_stack(leaf).map(|s| s.id().clone()) {
        let detached = ws.remove_stack_child(&stack, leaf)?;
        let remaining = ws.require(&stack)?.children().len();
        let visible = if remaining == 1 {
            ws.dissolve_stack(&stack)?
        } else {
            ws.require(&stack)?
                .as_stack()
                .and_then(|s| s.active_child())
                .cloned()
                .ok_or_else(|| LayoutError::EmptyStack(stack.clone()))?
        };
        ws.focus_first_leaf(&visible)?;
        return Ok(detached);
    }

    if ws.require(leaf)?.parent().is_none() {
        let detached = ws.take(leaf)?;
        ws.clear();
        return Ok(detached);
    }

    let (detached, sibling) = ws.detach_promoting_sibling(leaf)?;
    ws.focus_first_leaf(&sibling)?;
    Ok(detached)
}
