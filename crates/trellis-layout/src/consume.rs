// Consume/expel: move the active pane into a neighbouring stack, or out of
// its own stack into a split. Repeated sideways presses cycle
// horizontal split -> vertical split -> stack.

use std::fmt;

use trellis_core::{Direction, NodeId, SplitDirection};

use crate::error::{InvariantViolation, LayoutError, Result};
use crate::node::{CycleOrigin, NodeKind, StackNode};
use crate::workspace::Workspace;
use crate::PaneManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoopReason {
    OnlyOnePane,
    NoPaneInDirection(Direction),
}

impl fmt::Display for NoopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoopReason::OnlyOnePane => "Only one pane",
            NoopReason::NoPaneInDirection(Direction::Left) => "No pane to the left",
            NoopReason::NoPaneInDirection(Direction::Right) => "No pane to the right",
            NoopReason::NoPaneInDirection(Direction::Up) => "No pane above",
            NoopReason::NoPaneInDirection(Direction::Down) => "No pane below",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsumeOrExpelOutcome {
    /// The split holding the active pane and its sibling changed axis.
    Reoriented {
        split: NodeId,
        direction: SplitDirection,
    },
    /// The active pane joined `stack` and is its visible child.
    Stacked { stack: NodeId },
    /// The active pane left its stack and sits in the new `split`.
    Expelled { split: NodeId },
    /// Nothing changed.
    Unchanged(NoopReason),
}

impl ConsumeOrExpelOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, ConsumeOrExpelOutcome::Unchanged(_))
    }
}

impl PaneManager {
    /// Consume the active pane into its neighbour in `direction`, or expel
    /// it from the stack it is in.
    pub fn consume_or_expel(
        &mut self,
        ws: &mut Workspace,
        direction: Direction,
    ) -> Result<ConsumeOrExpelOutcome> {
        if ws.is_empty() {
            return Ok(ConsumeOrExpelOutcome::Unchanged(NoopReason::OnlyOnePane));
        }
        let active = ws.active_node().ok_or(LayoutError::NoActivePane)?.id().clone();
        if ws.pane_count() <= 1 {
            return Ok(ConsumeOrExpelOutcome::Unchanged(NoopReason::OnlyOnePane));
        }

        let outcome = match ws.parent_stack(&active).map(|s| s.id().clone()) {
            Some(stack) => self.expel(ws, &active, &stack, direction)?,
            None => self.consume(ws, &active, direction)?,
        };
        log::info!("consume_or_expel {} on {}: {:?}", direction, active, outcome);
        Ok(outcome)
    }

    fn expel(
        &mut self,
        ws: &mut Workspace,
        active: &NodeId,
        stack: &NodeId,
        direction: Direction,
    ) -> Result<ConsumeOrExpelOutcome> {
        let len = ws.require(stack)?.children().len();
        if len < 2 {
            return Err(InvariantViolation::StackTooSmall {
                stack: stack.clone(),
                len,
                min: 2,
            }
            .into());
        }
        let split = NodeId::new(self.next_id());
        ws.ensure_fresh(&[&split])?;

        let moved = ws.remove_stack_child(stack, active)?;
        let pane = moved
            .pane()
            .map(|p| p.id.clone())
            .ok_or_else(|| LayoutError::NotALeaf(active.clone()))?;
        let anchor = if len == 2 {
            ws.dissolve_stack(stack)?
        } else {
            stack.clone()
        };

        let (expelled_first, cycle_origin) = match direction {
            Direction::Left => (true, CycleOrigin::ExpelledLeft),
            Direction::Right => (false, CycleOrigin::ExpelledRight),
            Direction::Up => (true, CycleOrigin::None),
            Direction::Down => (false, CycleOrigin::None),
        };
        ws.wrap_in_split(
            &anchor,
            moved,
            split.clone(),
            SplitDirection::Vertical,
            expelled_first,
            cycle_origin,
        )?;
        ws.focus_pane(&pane)?;
        Ok(ConsumeOrExpelOutcome::Expelled { split })
    }

    fn consume(
        &mut self,
        ws: &mut Workspace,
        active: &NodeId,
        direction: Direction,
    ) -> Result<ConsumeOrExpelOutcome> {
        let Some(target) = adjacent_sibling(ws, active, direction) else {
            return Ok(ConsumeOrExpelOutcome::Unchanged(
                NoopReason::NoPaneInDirection(direction),
            ));
        };

        if direction.is_horizontal() {
            if let Some(outcome) = cycle_orientation(ws, active, &target, direction)? {
                return Ok(outcome);
            }
        }

        let target_node = ws.require(&target)?;
        let needs_conversion = match target_node.kind() {
            NodeKind::Leaf(_) => true,
            NodeKind::Stack(_) => false,
            NodeKind::Split(_) => return Err(LayoutError::NotStackable(target)),
        };
        let stack_child = if needs_conversion {
            Some(self.claim_node_id(ws, NodeId::stack_child(&target), &[])?)
        } else {
            None
        };

        let (moved, _) = ws.detach_promoting_sibling(active)?;
        let pane = moved
            .pane()
            .map(|p| p.id.clone())
            .ok_or_else(|| LayoutError::NotALeaf(active.clone()))?;
        if let Some(child) = stack_child {
            ws.convert_leaf_to_stack(&target, child)?;
        }
        ws.insert_into_stack(&target, usize::MAX, moved)?;
        ws.focus_pane(&pane)?;
        Ok(ConsumeOrExpelOutcome::Stacked { stack: target })
    }
}

/// Neighbour of `start` in `direction`: the other child of the nearest
/// split of matching axis where `start`'s branch is on the near side.
/// Failing that, a leaf sibling across a cross-axis parent split.
fn adjacent_sibling(ws: &Workspace, start: &NodeId, direction: Direction) -> Option<NodeId> {
    let axis = direction.orientation();
    let mut current = start.clone();
    while let Some(parent_id) = ws.node(&current).and_then(|n| n.parent()).cloned() {
        if let Some(split) = ws.node(&parent_id).and_then(|n| n.as_split()) {
            if split.direction == axis {
                match (split.index_of(&current), direction.is_forward()) {
                    (Some(0), true) => return Some(split.children[1].clone()),
                    (Some(1), false) => return Some(split.children[0].clone()),
                    _ => {}
                }
            }
        }
        current = parent_id;
    }

    let start_node = ws.node(start)?;
    let split = ws.node(start_node.parent()?)?.as_split()?;
    if split.direction == axis {
        return None;
    }
    let sibling = split.sibling_of(start)?;
    let both_leaves = start_node.is_leaf() && ws.node(sibling).is_some_and(|n| n.is_leaf());
    both_leaves.then(|| sibling.clone())
}

/// Sideways cycle for two leaves sharing a split. Returns `None` when the
/// pair does not qualify and the caller should stack instead.
fn cycle_orientation(
    ws: &mut Workspace,
    active: &NodeId,
    sibling: &NodeId,
    direction: Direction,
) -> Result<Option<ConsumeOrExpelOutcome>> {
    let active_node = ws.require(active)?;
    let sibling_node = ws.require(sibling)?;
    if !active_node.is_leaf() || !sibling_node.is_leaf() {
        return Ok(None);
    }
    let Some(parent) = active_node.parent().cloned() else {
        return Ok(None);
    };
    if sibling_node.parent() != Some(&parent) {
        return Ok(None);
    }

    let node = ws.require_mut(&parent)?;
    let Some(split) = node.split_mut() else {
        return Ok(None);
    };

    let reoriented = match split.direction {
        SplitDirection::Horizontal => SplitDirection::Vertical,
        SplitDirection::Vertical
            if direction == Direction::Right && split.cycle_origin.is_expelled() =>
        {
            SplitDirection::Horizontal
        }
        SplitDirection::Vertical => {
            let children = split.children.to_vec();
            let active_index = split.index_of(active).unwrap_or(0);
            node.retag(NodeKind::Stack(StackNode {
                children,
                active: active_index,
            }));
            return Ok(Some(ConsumeOrExpelOutcome::Stacked { stack: parent }));
        }
    };

    split.direction = reoriented;
    split.children = [sibling.clone(), active.clone()];
    Ok(Some(ConsumeOrExpelOutcome::Reoriented {
        split: parent,
        direction: reoriented,
    }))
}
