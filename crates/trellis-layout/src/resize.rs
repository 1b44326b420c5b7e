// Divider movement: directional, smart and absolute ratio updates.

use serde::{Deserialize, Serialize};
use trellis_core::{NodeId, SplitDirection};

use crate::error::{LayoutError, Result};
use crate::workspace::Workspace;
use crate::PaneManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeDirection {
    IncreaseLeft,
    IncreaseRight,
    IncreaseUp,
    IncreaseDown,
    DecreaseLeft,
    DecreaseRight,
    DecreaseUp,
    DecreaseDown,
    /// Grow the focused pane along its nearest split.
    Increase,
    /// Shrink the focused pane along its nearest split.
    Decrease,
}

impl ResizeDirection {
    fn axis(self) -> Option<SplitDirection> {
        use ResizeDirection::*;
        match self {
            IncreaseLeft | IncreaseRight | DecreaseLeft | DecreaseRight => {
                Some(SplitDirection::Horizontal)
            }
            IncreaseUp | IncreaseDown | DecreaseUp | DecreaseDown => Some(SplitDirection::Vertical),
            Increase | Decrease => None,
        }
    }

    /// Ratio change when the divider moves one step. Moving it right or
    /// down grows the first child.
    fn ratio_delta(self, step: f64) -> f64 {
        use ResizeDirection::*;
        match self {
            IncreaseRight | IncreaseDown | DecreaseLeft | DecreaseUp => step,
            IncreaseLeft | IncreaseUp | DecreaseRight | DecreaseDown => -step,
            Increase | Decrease => 0.0,
        }
    }

    /// Concrete direction for a smart resize of the child on the given
    /// side of a split.
    fn smart(grow: bool, axis: SplitDirection, is_first: bool) -> Self {
        use ResizeDirection::*;
        match (axis, is_first, grow) {
            (SplitDirection::Horizontal, true, true) => IncreaseRight,
            (SplitDirection::Horizontal, false, true) => IncreaseLeft,
            (SplitDirection::Horizontal, true, false) => DecreaseRight,
            (SplitDirection::Horizontal, false, false) => DecreaseLeft,
            (SplitDirection::Vertical, true, true) => IncreaseDown,
            (SplitDirection::Vertical, false, true) => IncreaseUp,
            (SplitDirection::Vertical, true, false) => DecreaseDown,
            (SplitDirection::Vertical, false, false) => DecreaseUp,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOutcome {
    pub split_node: NodeId,
    pub old_ratio: f64,
    pub new_ratio: f64,
}

impl PaneManager {
    /// Move the divider of the split nearest to `node` by one step.
    pub fn resize(
        &self,
        ws: &mut Workspace,
        node: &NodeId,
        direction: ResizeDirection,
    ) -> Result<ResizeOutcome> {
        if ws.is_empty() {
            return Err(LayoutError::NothingToResize);
        }
        ws.require(node)?;
        let start = ws.layout_node(node);

        let direction = match direction {
            ResizeDirection::Increase | ResizeDirection::Decrease => {
                let (split, child) =
                    nearest_split(ws, &start, None).ok_or(LayoutError::NothingToResize)?;
                let split_node = ws.require(&split)?.as_split();
                let (axis, is_first) = split_node
                    .map(|s| (s.direction, s.index_of(&child) == Some(0)))
                    .ok_or_else(|| LayoutError::SplitNotFound(split.clone()))?;
                ResizeDirection::smart(direction == ResizeDirection::Increase, axis, is_first)
            }
            concrete => concrete,
        };

        let (split, _) =
            nearest_split(ws, &start, direction.axis()).ok_or(LayoutError::NothingToResize)?;
        let delta = direction.ratio_delta(self.settings.resize_step());
        let settings = self.settings;
        let split_node = ws
            .require_mut(&split)?
            .split_mut()
            .ok_or_else(|| LayoutError::SplitNotFound(split.clone()))?;
        let old_ratio = split_node.ratio;
        split_node.ratio = settings.clamp_ratio(old_ratio + delta);
        let new_ratio = split_node.ratio;

        log::debug!(
            "resize split={} {:?} ratio {:.3} -> {:.3}",
            split,
            direction,
            old_ratio,
            new_ratio
        );
        Ok(ResizeOutcome {
            split_node: split,
            old_ratio,
            new_ratio,
        })
    }

    /// Set the ratio of `split` directly, e.g. while dragging a divider.
    pub fn set_split_ratio(
        &self,
        ws: &mut Workspace,
        split: &NodeId,
        ratio: f64,
    ) -> Result<ResizeOutcome> {
        if ws.is_empty() {
            return Err(LayoutError::NothingToResize);
        }
        let settings = self.settings;
        let split_node = ws
            .node_mut(split)
            .and_then(|n| n.split_mut())
            .ok_or_else(|| LayoutError::SplitNotFound(split.clone()))?;

        let old_ratio = split_node.ratio;
        let rounded = (settings.clamp_ratio(ratio) * 100.0).round() / 100.0;
        split_node.ratio = settings.clamp_ratio(rounded);

        Ok(ResizeOutcome {
            split_node: split.clone(),
            old_ratio,
            new_ratio: split_node.ratio,
        })
    }
}

/// Walk up from `start` to the nearest split ancestor, optionally
/// restricted to one axis. Returns the split and the child on the path.
fn nearest_split(
    ws: &Workspace,
    start: &NodeId,
    axis: Option<SplitDirection>,
) -> Option<(NodeId, NodeId)> {
    let mut current = start.clone();
    loop {
        let parent_id = ws.node(&current)?.parent()?.clone();
        let parent = ws.node(&parent_id)?;
        if let Some(split) = parent.as_split() {
            if axis.map_or(true, |a| a == split.direction) {
                return Some((parent_id, current));
            }
        }
        current = parent_id;
    }
}
