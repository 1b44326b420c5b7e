// Tabs: each tab owns one workspace. TabList keeps order and the active
// tab; TabManager runs the tab lifecycle operations.

use std::time::SystemTime;

use serde::Serialize;
use trellis_core::{IdGenerator, NodeId, Pane, PaneId, TabId, WorkspaceId, BLANK_URI};

use crate::error::{LayoutError, Result};
use crate::workspace::Workspace;

const UNTITLED: &str = "New Tab";

// ──────────────────────────────────────────────
// Tab
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Tab {
    pub id: TabId,
    pub name: String,
    pub workspace: Workspace,
    pub position: usize,
    pub is_pinned: bool,
    pub created_at: SystemTime,
}

impl Tab {
    pub fn new(id: impl Into<TabId>, workspace: Workspace) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            workspace,
            position: 0,
            is_pinned: false,
            created_at: SystemTime::now(),
        }
    }

    /// Display title: the explicit name, else the active pane's title or
    /// URI.
    pub fn title(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        match self.workspace.active_pane() {
            Some(pane) if !pane.title.is_empty() => &pane.title,
            Some(pane) if !pane.uri.is_empty() => &pane.uri,
            _ => UNTITLED,
        }
    }

    pub fn pane_count(&self) -> usize {
        self.workspace.pane_count()
    }
}

// ──────────────────────────────────────────────
// TabList
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct TabList {
    tabs: Vec<Tab>,
    active_tab_id: Option<TabId>,
    previous_active_tab_id: Option<TabId>,
}

impl TabList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_tab_id(&self) -> Option<&TabId> {
        self.active_tab_id.as_ref()
    }

    pub fn previous_active_tab_id(&self) -> Option<&TabId> {
        self.previous_active_tab_id.as_ref()
    }

    pub fn find(&self, id: &TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| &t.id == id)
    }

    pub fn find_mut(&mut self, id: &TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| &t.id == id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.find(self.active_tab_id.as_ref()?)
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        let id = self.active_tab_id.clone()?;
        self.find_mut(&id)
    }

    /// Append `tab`; it becomes active only if no tab is.
    pub fn add(&mut self, mut tab: Tab) {
        tab.position = self.tabs.len();
        if self.active_tab_id.is_none() {
            self.active_tab_id = Some(tab.id.clone());
        }
        self.tabs.push(tab);
    }

    /// Remove a tab. If it was active, the tab now at its index (or the new
    /// last tab) takes over.
    pub fn remove(&mut self, id: &TabId) -> Option<Tab> {
        let index = self.tabs.iter().position(|t| &t.id == id)?;
        let removed = self.tabs.remove(index);
        self.reindex();

        if self.previous_active_tab_id.as_ref() == Some(id) {
            self.previous_active_tab_id = None;
        }
        if self.active_tab_id.as_ref() == Some(id) {
            self.active_tab_id = self
                .tabs
                .get(index)
                .or_else(|| self.tabs.last())
                .map(|t| t.id.clone());
        }
        Some(removed)
    }

    /// Move a tab to `new_position`. Returns false if either is invalid.
    pub fn move_tab(&mut self, id: &TabId, new_position: usize) -> bool {
        if new_position >= self.tabs.len() {
            return false;
        }
        let Some(index) = self.tabs.iter().position(|t| &t.id == id) else {
            return false;
        };
        let tab = self.tabs.remove(index);
        self.tabs.insert(new_position, tab);
        self.reindex();
        true
    }

    /// Activate `id`, remembering the previously active tab.
    pub fn set_active(&mut self, id: &TabId) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        if self.active_tab_id.as_ref() != Some(id) {
            self.previous_active_tab_id = self.active_tab_id.replace(id.clone());
        }
        true
    }

    fn reindex(&mut self) {
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            tab.position = i;
        }
    }
}

// ──────────────────────────────────────────────
// TabManager
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct CreateTab {
    pub name: String,
    pub initial_url: Option<String>,
    pub pinned: bool,
}

pub struct TabManager {
    ids: Box<dyn IdGenerator + Send>,
}

impl TabManager {
    pub fn new(ids: impl IdGenerator + Send + 'static) -> Self {
        Self { ids: Box::new(ids) }
    }

    pub(crate) fn next_id(&mut self) -> String {
        self.ids.generate()
    }

    pub(crate) fn claim_node_id(
        &mut self,
        ws: &Workspace,
        preferred: NodeId,
        taken: &[&NodeId],
    ) -> Result<NodeId> {
        ws.claim_node_id(preferred, taken, &mut *self.ids)
    }

    /// Append a new tab holding one fresh pane.
    pub fn create(&mut self, tabs: &mut TabList, request: CreateTab) -> TabId {
        let tab_id = TabId::new(self.next_id());
        let workspace_id = WorkspaceId::new(self.next_id());
        let pane_id = PaneId::new(self.next_id());
        let uri = request
            .initial_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| BLANK_URI.to_owned());

        let mut tab = Tab::new(
            tab_id.clone(),
            Workspace::with_pane(workspace_id, Pane::with_uri(pane_id.clone(), uri)),
        );
        tab.name = request.name;
        tab.is_pinned = request.pinned;
        tabs.add(tab);

        log::info!("tab created id={} pane={} count={}", tab_id, pane_id, tabs.count());
        tab_id
    }

    /// Append a new tab around an existing pane (e.g. a popup). Without a
    /// name the tab is named after the pane's title.
    pub fn create_with_pane(
        &mut self,
        tabs: &mut TabList,
        pane: Pane,
        name: Option<String>,
    ) -> TabId {
        let tab_id = TabId::new(self.next_id());
        let workspace_id = WorkspaceId::new(self.next_id());
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| pane.title.clone());
        let pane_id = pane.id.clone();

        let mut tab = Tab::new(tab_id.clone(), Workspace::with_pane(workspace_id, pane));
        tab.name = name;
        tabs.add(tab);

        log::info!("tab created id={} with existing pane={}", tab_id, pane_id);
        tab_id
    }

    /// Close a tab. Returns true when it was the last one; closing an
    /// unknown tab does nothing.
    pub fn close(&self, tabs: &mut TabList, id: &TabId) -> bool {
        if tabs.find(id).is_none() {
            log::debug!("close: tab {} not found", id);
            return false;
        }
        let was_last = tabs.count() == 1;
        tabs.remove(id);
        log::info!(
            "tab closed id={} remaining={} active={:?}",
            id,
            tabs.count(),
            tabs.active_tab_id()
        );
        was_last
    }

    pub fn switch(&self, tabs: &mut TabList, id: &TabId) -> Result<()> {
        if !tabs.set_active(id) {
            return Err(LayoutError::TabNotFound(id.clone()));
        }
        log::debug!("switched to tab {}", id);
        Ok(())
    }

    pub fn move_tab(&self, tabs: &mut TabList, id: &TabId, new_position: usize) -> Result<()> {
        if tabs.find(id).is_none() {
            return Err(LayoutError::TabNotFound(id.clone()));
        }
        if !tabs.move_tab(id, new_position) {
            return Err(LayoutError::InvalidTabPosition(new_position));
        }
        Ok(())
    }

    pub fn rename(&self, tabs: &mut TabList, id: &TabId, name: impl Into<String>) -> Result<()> {
        let tab = tabs
            .find_mut(id)
            .ok_or_else(|| LayoutError::TabNotFound(id.clone()))?;
        tab.name = name.into();
        Ok(())
    }

    pub fn pin(&self, tabs: &mut TabList, id: &TabId, pinned: bool) -> Result<()> {
        let tab = tabs
            .find_mut(id)
            .ok_or_else(|| LayoutError::TabNotFound(id.clone()))?;
        tab.is_pinned = pinned;
        Ok(())
    }

    /// Tab `step` places away from the active one, wrapping at either end.
    /// With no active tab, the first tab.
    pub fn next_tab_id(&self, tabs: &TabList, step: isize) -> Option<TabId> {
        let count = tabs.count() as isize;
        if count == 0 {
            return None;
        }
        let Some(active) = tabs.active_tab() else {
            return tabs.tabs().first().map(|t| t.id.clone());
        };
        let index = (active.position as isize + step).rem_euclid(count) as usize;
        tabs.tabs().get(index).map(|t| t.id.clone())
    }

    pub fn switch_next(&self, tabs: &mut TabList) -> Result<()> {
        self.switch_relative(tabs, 1)
    }

    pub fn switch_previous(&self, tabs: &mut TabList) -> Result<()> {
        self.switch_relative(tabs, -1)
    }

    fn switch_relative(&self, tabs: &mut TabList, step: isize) -> Result<()> {
        match self.next_tab_id(tabs, step) {
            Some(id) if tabs.active_tab_id() != Some(&id) => self.switch(tabs, &id),
            _ => Ok(()),
        }
    }

    /// Switch to the tab at `index`; out of range does nothing.
    pub fn switch_by_index(&self, tabs: &mut TabList, index: usize) -> Result<()> {
        match tabs.tabs().get(index).map(|t| t.id.clone()) {
            Some(id) => self.switch(tabs, &id),
            None => Ok(()),
        }
    }

    /// Toggle back to the previously active tab, forgetting it if it has
    /// since been closed.
    pub fn switch_to_last_active(&self, tabs: &mut TabList) -> Result<()> {
        let Some(previous) = tabs.previous_active_tab_id().cloned() else {
            return Ok(());
        };
        if tabs.find(&previous).is_none() {
            log::debug!("previous tab {} no longer exists", previous);
            tabs.previous_active_tab_id = None;
            return Ok(());
        }
        self.switch(tabs, &previous)
    }
}
