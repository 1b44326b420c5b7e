use thiserror::Error;
use trellis_core::{Direction, NodeId, PaneId, TabId};

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("pane not found: {0}")]
    PaneNotFound(PaneId),
    #[error("node {0} is not a leaf")]
    NotALeaf(NodeId),
    #[error("node {0} is not a stack")]
    NotAStack(NodeId),
    #[error("split node not found: {0}")]
    SplitNotFound(NodeId),
    #[error("pane {0} is already stacked")]
    AlreadyStacked(NodeId),
    #[error("node {0} cannot hold a stack")]
    NotStackable(NodeId),
    #[error("node {0} has no parent split")]
    NoParentSplit(NodeId),
    #[error("stack {0} has no children")]
    EmptyStack(NodeId),
    #[error("cannot remove the last child of stack {0}")]
    LastStackChild(NodeId),
    #[error("invalid stack navigation direction: {0} (use up or down)")]
    InvalidStackDirection(Direction),
    #[error("nothing to resize")]
    NothingToResize,
    #[error("workspace has no active pane")]
    NoActivePane,
    #[error("id already in use: {0}")]
    IdCollision(String),
    #[error("pane is already in the target tab")]
    SameTab,
    #[error("tab not found: {0}")]
    TabNotFound(TabId),
    #[error("invalid tab position {0}")]
    InvalidTabPosition(usize),
    #[error("corrupt pane tree: {0}")]
    Corrupt(#[from] InvariantViolation),
}

/// A structural rule of the pane tree that does not hold.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("node {0} is referenced but missing from the arena")]
    MissingNode(NodeId),
    #[error("node {node} has parent {actual:?}, expected {expected:?}")]
    ParentMismatch {
        node: NodeId,
        expected: Option<NodeId>,
        actual: Option<NodeId>,
    },
    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),
    #[error("node {0} appears twice in the tree")]
    Cycle(NodeId),
    #[error("stack {0} has no children")]
    EmptyStack(NodeId),
    #[error("stack {stack} needs at least {min} children, has {len}")]
    StackTooSmall { stack: NodeId, len: usize, min: usize },
    #[error("stack {stack} active index {index} out of range (len {len})")]
    ActiveIndexOutOfRange {
        stack: NodeId,
        index: usize,
        len: usize,
    },
    #[error("split {split} ratio {ratio} outside [{min}, {max}]")]
    RatioOutOfBounds {
        split: NodeId,
        ratio: f64,
        min: f64,
        max: f64,
    },
    #[error("pane {0} is held by more than one leaf")]
    DuplicatePane(PaneId),
    #[error("active pane {0} is not in the tree")]
    ActivePaneMissing(PaneId),
    #[error("active pane set on an empty workspace")]
    ActivePaneWithoutRoot,
    #[error("workspace has panes but no active pane")]
    NoActivePane,
}
