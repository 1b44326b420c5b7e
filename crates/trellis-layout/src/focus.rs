// Focus: direct, structural (tree walk) and geometric (screen rects).

use trellis_core::{Direction, NodeId, PaneId, PaneRect};

use crate::error::{LayoutError, Result};
use crate::node::NodeKind;
use crate::workspace::Workspace;
use crate::PaneManager;

/// Candidates with no perpendicular overlap rank behind every overlapping one.
const NO_OVERLAP_PENALTY: i64 = 10_000_000;
const PRIMARY_WEIGHT: i64 = 1000;

impl PaneManager {
    /// Focus `pane`, bringing it to the front of its stack.
    pub fn focus(&self, ws: &mut Workspace, pane: &PaneId) -> Result<NodeId> {
        let node = ws.focus_pane(pane)?;
        log::debug!("focus pane={} node={}", pane, node);
        Ok(node)
    }

    /// Move focus to the neighbouring pane in `direction` using the tree
    /// structure alone. Returns the newly focused leaf, or `None` when
    /// nothing lies in that direction.
    pub fn navigate_focus(&self, ws: &mut Workspace, direction: Direction) -> Result<Option<NodeId>> {
        let active = ws.active_node().ok_or(LayoutError::NoActivePane)?.id().clone();
        let Some(sibling) = sibling_in_direction(ws, &active, direction) else {
            log::debug!("navigate {}: nothing from {}", direction, active);
            return Ok(None);
        };
        let Some(leaf) = leaf_toward(ws, &sibling, !direction.is_forward()) else {
            return Ok(None);
        };
        let pane = ws
            .node(&leaf)
            .and_then(|n| n.pane())
            .map(|p| p.id.clone())
            .ok_or_else(|| LayoutError::NotALeaf(leaf.clone()))?;
        ws.focus_pane(&pane)?;
        log::debug!("navigate {}: {} -> {}", direction, active, leaf);
        Ok(Some(leaf))
    }

    /// Pick the pane whose rectangle lies nearest in `direction` from the
    /// active pane's rectangle.
    pub fn navigate_focus_geometric(
        &self,
        active: &PaneId,
        rects: &[PaneRect],
        direction: Direction,
    ) -> Option<PaneId> {
        nearest_in_direction(active, rects, direction).map(|r| r.pane_id.clone())
    }
}

/// Walk up from `start` until a split of matching axis has a child on the
/// requested side of the path.
fn sibling_in_direction(ws: &Workspace, start: &NodeId, direction: Direction) -> Option<NodeId> {
    let mut current = ws.layout_node(start);
    loop {
        let parent_id = ws.node(&current)?.parent()?.clone();
        if let Some(split) = ws.node(&parent_id)?.as_split() {
            if split.direction == direction.orientation() {
                match (split.index_of(&current), direction.is_forward()) {
                    (Some(0), true) => return Some(split.children[1].clone()),
                    (Some(1), false) => return Some(split.children[0].clone()),
                    _ => {}
                }
            }
        }
        current = parent_id;
    }
}

/// Descend to a leaf, taking the last split child when `from_end` and the
/// visible child of stacks.
fn leaf_toward(ws: &Workspace, start: &NodeId, from_end: bool) -> Option<NodeId> {
    let mut current = start.clone();
    loop {
        let node = ws.node(&current)?;
        current = match node.kind() {
            NodeKind::Leaf(_) => return Some(current),
            NodeKind::Stack(stack) => stack.active_child()?.clone(),
            NodeKind::Split(split) => split.children[usize::from(from_end)].clone(),
        };
    }
}

/// Nearest rectangle in `direction` from the rectangle of `active`.
///
/// Candidates must have their center strictly on the requested side.
/// Each scores `primary * 1000 + perpendicular` distance between centers,
/// plus a large penalty without perpendicular overlap; the lowest score
/// wins and earlier rectangles win ties.
pub fn nearest_in_direction<'a>(
    active: &PaneId,
    rects: &'a [PaneRect],
    direction: Direction,
) -> Option<&'a PaneRect> {
    let from = rects.iter().find(|r| &r.pane_id == active)?;
    let (fx, fy) = from.center();

    rects
        .iter()
        .filter(|r| &r.pane_id != active)
        .filter_map(|r| {
            let (cx, cy) = r.center();
            let (dx, dy) = (cx - fx, cy - fy);
            let (primary, perpendicular, overlaps) = match direction {
                Direction::Left if dx < 0 => (-dx, dy.abs(), from.overlaps_vertically(r)),
                Direction::Right if dx > 0 => (dx, dy.abs(), from.overlaps_vertically(r)),
                Direction::Up if dy < 0 => (-dy, dx.abs(), from.overlaps_horizontally(r)),
                Direction::Down if dy > 0 => (dy, dx.abs(), from.overlaps_horizontally(r)),
                _ => return None,
            };
            let penalty = if overlaps { 0 } else { NO_OVERLAP_PENALTY };
            Some((primary * PRIMARY_WEIGHT + perpendicular + penalty, r))
        })
        .min_by_key(|(score, _)| *score)
        .map(|(_, r)| r)
}
