// Pane tree layout engine: splits, stacks, focus and tabs.

mod consume;
mod error;
mod focus;
mod move_pane;
mod node;
mod resize;
mod settings;
mod split;
mod stack;
mod tabs;
mod workspace;

pub use consume::{ConsumeOrExpelOutcome, NoopReason};
pub use error::{InvariantViolation, LayoutError, Result};
pub use focus::nearest_in_direction;
pub use move_pane::{MovePaneOutcome, MovePaneRequest};
pub use node::{CycleOrigin, NodeKind, PaneNode, SplitNode, StackNode};
pub use resize::{ResizeDirection, ResizeOutcome};
pub use settings::{
    load_settings, load_settings_from, read_settings, settings_path, LayoutSettings,
    SettingsError,
};
pub use split::{CloseOutcome, SplitOutcome, SplitRequest};
pub use stack::{AddToStackOutcome, CreateStackOutcome};
pub use tabs::{CreateTab, Tab, TabList, TabManager};
pub use workspace::Workspace;

use trellis_core::{IdGenerator, NodeId, Pane, PaneId, WorkspaceId, BLANK_URI};

// ──────────────────────────────────────────────
// PaneManager
// ──────────────────────────────────────────────

/// Runs pane tree operations against a [`Workspace`].
///
/// Operations either apply completely or leave the workspace untouched.
/// New IDs come from the injected generator.
pub struct PaneManager {
    ids: Box<dyn IdGenerator + Send>,
    settings: LayoutSettings,
}

impl PaneManager {
    pub fn new(ids: impl IdGenerator + Send + 'static) -> Self {
        Self::with_settings(ids, LayoutSettings::default())
    }

    pub fn with_settings(ids: impl IdGenerator + Send + 'static, settings: LayoutSettings) -> Self {
        Self {
            ids: Box::new(ids),
            settings,
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// A fresh workspace with one blank (or `initial_url`) pane.
    pub fn new_workspace(&mut self, initial_url: Option<&str>) -> Workspace {
        let workspace_id = WorkspaceId::new(self.next_id());
        let pane = self.fresh_pane(initial_url);
        log::debug!("new workspace id={} pane={}", workspace_id, pane.id);
        Workspace::with_pane(workspace_id, pane)
    }

    fn next_id(&mut self) -> String {
        self.ids.generate()
    }

    fn claim_node_id(
        &mut self,
        ws: &Workspace,
        preferred: NodeId,
        taken: &[&NodeId],
    ) -> Result<NodeId> {
        ws.claim_node_id(preferred, taken, &mut *self.ids)
    }

    fn fresh_pane(&mut self, url: Option<&str>) -> Pane {
        let id = PaneId::new(self.next_id());
        match url {
            Some(url) if !url.is_empty() => Pane::with_uri(id, url),
            _ => Pane::with_uri(id, BLANK_URI),
        }
    }
}
