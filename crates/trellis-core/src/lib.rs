use std::fmt;

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Identity
// ──────────────────────────────────────────────

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identity of a pane's content (one browsing context).
    PaneId
);
string_id!(
    /// Identity of a node in a workspace's pane tree.
    NodeId
);
string_id!(TabId);
string_id!(WorkspaceId);

impl NodeId {
    /// Leaf nodes are keyed by the pane they hold.
    pub fn for_pane(pane: &PaneId) -> Self {
        Self(pane.0.clone())
    }

    /// Node ID given to the original pane when a leaf turns into a stack.
    pub fn stack_child(container: &NodeId) -> Self {
        Self(format!("{}_0", container.0))
    }
}

// ──────────────────────────────────────────────
// Panes
// ──────────────────────────────────────────────

pub const BLANK_URI: &str = "about:blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    #[default]
    Tab,
    Popup,
}

/// Content handle stored in a leaf. The engine never looks past the ID;
/// URI and title are carried for the chrome layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    pub id: PaneId,
    pub uri: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub window_type: WindowType,
}

impl Pane {
    pub fn new(id: impl Into<PaneId>) -> Self {
        Self::with_uri(id, BLANK_URI)
    }

    pub fn with_uri(id: impl Into<PaneId>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            title: String::new(),
            window_type: WindowType::Tab,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn popup(mut self) -> Self {
        self.window_type = WindowType::Popup;
        self
    }
}

// ──────────────────────────────────────────────
// Directions
// ──────────────────────────────────────────────

/// Orientation of a split. Horizontal places children side by side,
/// Vertical stacks them top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Axis a split must have for this direction to move across it.
    pub fn orientation(self) -> SplitDirection {
        match self {
            Direction::Left | Direction::Right => SplitDirection::Horizontal,
            Direction::Up | Direction::Down => SplitDirection::Vertical,
        }
    }

    /// Right and Down move towards a split's second child.
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }

    pub fn is_horizontal(self) -> bool {
        self.orientation() == SplitDirection::Horizontal
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        })
    }
}

// ──────────────────────────────────────────────
// Geometry
// ──────────────────────────────────────────────

/// Screen rectangle of a pane as laid out by the renderer, in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneRect {
    pub pane_id: PaneId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PaneRect {
    pub fn new(pane_id: impl Into<PaneId>, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            pane_id: pane_id.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Center point, widened so rectangles near the `i32` limits cannot
    /// overflow.
    pub fn center(&self) -> (i64, i64) {
        (
            i64::from(self.x) + i64::from(self.width / 2),
            i64::from(self.y) + i64::from(self.height / 2),
        )
    }

    fn vertical_span(&self) -> (i64, i64) {
        let top = i64::from(self.y);
        (top, top + i64::from(self.height))
    }

    fn horizontal_span(&self) -> (i64, i64) {
        let left = i64::from(self.x);
        (left, left + i64::from(self.width))
    }

    /// True when the two rectangles share some vertical span.
    pub fn overlaps_vertically(&self, other: &PaneRect) -> bool {
        spans_overlap(self.vertical_span(), other.vertical_span())
    }

    /// True when the two rectangles share some horizontal span.
    pub fn overlaps_horizontally(&self, other: &PaneRect) -> bool {
        spans_overlap(self.horizontal_span(), other.horizontal_span())
    }
}

fn spans_overlap((a_start, a_end): (i64, i64), (b_start, b_end): (i64, i64)) -> bool {
    a_start < b_end && b_start < a_end
}

// ──────────────────────────────────────────────
// Trait: IdGenerator
// ──────────────────────────────────────────────

/// Source of fresh identifiers for panes, nodes, tabs and workspaces.
/// Called once per new ID; must not touch any tree.
pub trait IdGenerator {
    fn generate(&mut self) -> String;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> String,
{
    fn generate(&mut self) -> String {
        self()
    }
}

/// Monotonic `<prefix><n>` identifiers starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next_id: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next_id: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        format!("{}{}", self.prefix, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_are_prefixed_and_monotonic() {
        let mut ids = SequentialIds::new("n");
        assert_eq!(ids.generate(), "n1");
        assert_eq!(ids.generate(), "n2");
    }

    #[test]
    fn test_closure_is_an_id_generator() {
        let mut n = 10;
        let mut gen = move || {
            n += 1;
            format!("x{n}")
        };
        assert_eq!(IdGenerator::generate(&mut gen), "x11");
    }

    #[test]
    fn test_stack_child_id() {
        assert_eq!(NodeId::stack_child(&NodeId::new("a")).as_str(), "a_0");
    }

    #[test]
    fn test_rect_center_uses_integer_division() {
        let r = PaneRect::new("p", 10, 20, 101, 51);
        assert_eq!(r.center(), (60, 45));
    }

    #[test]
    fn test_rect_overlap_excludes_touching_edges() {
        let a = PaneRect::new("a", 0, 0, 100, 100);
        let below = PaneRect::new("b", 0, 100, 100, 100);
        let right = PaneRect::new("c", 100, 50, 100, 100);
        assert!(!a.overlaps_vertically(&below));
        assert!(a.overlaps_horizontally(&below));
        assert!(a.overlaps_vertically(&right));
        assert!(!a.overlaps_horizontally(&right));
    }

    #[test]
    fn test_rect_math_near_i32_limits() {
        let edge = PaneRect::new("e", i32::MAX - 10, i32::MAX - 10, i32::MAX, i32::MAX);
        let (cx, cy) = edge.center();
        assert_eq!(cx, i64::from(i32::MAX - 10) + i64::from(i32::MAX / 2));
        assert_eq!(cy, cx);

        let far_left = PaneRect::new("f", i32::MIN, i32::MAX - 5, 100, 100);
        assert!(edge.overlaps_vertically(&far_left));
        assert!(!edge.overlaps_horizontally(&far_left));
    }

    #[test]
    fn test_direction_axis() {
        assert_eq!(Direction::Left.orientation(), SplitDirection::Horizontal);
        assert_eq!(Direction::Down.orientation(), SplitDirection::Vertical);
        assert!(Direction::Down.is_forward());
        assert!(!Direction::Up.is_forward());
    }
}
