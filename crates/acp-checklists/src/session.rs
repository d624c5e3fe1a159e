//! Per-tab session state.
//!
//! The [`SessionStore`] keeps, for every checklist tab visited during the
//! process lifetime, which items are checked and where the view was scrolled.
//! Nothing here is persisted: a new process starts with every checklist
//! unchecked.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::checklist::{CheckedState, ChecklistDocument, ItemKey};
use crate::error::{Error, Result};
use crate::progress::{self, Progress, SectionStatus};
use crate::tab::TabId;

/// Where the view should scroll after a session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    /// Back to the top of the page.
    Top,
    /// To a previously recorded offset.
    Offset(u32),
}

/// Progress of one tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Checked items.
    pub checked: CheckedState,
    /// Scroll offset recorded when the tab was last left with progress.
    pub scroll_offset: Option<u32>,
}

/// In-memory store of every tab's session.
#[derive(Debug)]
pub struct SessionStore {
    catalog: Arc<Catalog>,
    sessions: HashMap<TabId, SessionState>,
}

impl SessionStore {
    /// Create an empty store over the given catalog.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            sessions: HashMap::new(),
        }
    }

    /// The catalog the sessions refer to.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    fn document<'c>(catalog: &'c Catalog, tab: &TabId) -> Result<&'c ChecklistDocument> {
        catalog
            .checklist(tab)
            .ok_or_else(|| Error::DocumentNotFound(tab.clone()))
    }

    fn session_mut(&mut self, tab: &TabId, document: &ChecklistDocument) -> &mut SessionState {
        self.sessions
            .entry(tab.clone())
            .or_insert_with(|| SessionState {
                checked: CheckedState::all_false(&document.checkable_keys()),
                scroll_offset: None,
            })
    }

    /// Flip one item, returning its new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab has no checklist or `key` is not one of its
    /// checkable items.
    pub fn toggle_item(&mut self, tab: &TabId, key: ItemKey) -> Result<bool> {
        let catalog = Arc::clone(&self.catalog);
        let document = Self::document(&catalog, tab)?;
        if !document.is_checkable(key) {
            return Err(Error::NotCheckable {
                tab: tab.clone(),
                key,
            });
        }

        let checked = self.session_mut(tab, document).checked.toggle(key);
        debug!(%tab, %key, checked, "Toggled item");
        Ok(checked)
    }

    /// Set every checkable item of a section to `checked`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab has no checklist or no such section.
    pub fn toggle_section(&mut self, tab: &TabId, section: usize, checked: bool) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        let document = Self::document(&catalog, tab)?;
        if section >= document.sections.len() {
            return Err(Error::SectionOutOfRange {
                tab: tab.clone(),
                section,
            });
        }

        let keys = document.section_keys(section);
        let state = &mut self.session_mut(tab, document).checked;
        for key in &keys {
            state.set(*key, checked);
        }
        debug!(%tab, section, checked, items = keys.len(), "Toggled section");
        Ok(())
    }

    /// Uncheck every item of the tab. Cannot be undone.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab has no checklist.
    pub fn reset(&mut self, tab: &TabId) -> Result<ScrollRequest> {
        let catalog = Arc::clone(&self.catalog);
        let document = Self::document(&catalog, tab)?;
        self.session_mut(tab, document).checked =
            CheckedState::all_false(&document.checkable_keys());
        info!(%tab, "Checklist reset");
        Ok(ScrollRequest::Top)
    }

    /// Remember the scroll offset of a tab being left.
    ///
    /// The offset is only kept when the tab has at least one checked item;
    /// returns whether it was kept.
    pub fn record_scroll_position(&mut self, tab: &TabId, offset: u32) -> bool {
        match self.sessions.get_mut(tab) {
            Some(session) if session.checked.any_checked() => {
                session.scroll_offset = Some(offset);
                debug!(%tab, offset, "Recorded scroll position");
                true
            }
            _ => false,
        }
    }

    /// Where to scroll when a tab becomes active: its recorded offset if it
    /// has progress, the top otherwise.
    #[must_use]
    pub fn restore_scroll_position(&self, tab: &TabId) -> ScrollRequest {
        self.sessions
            .get(tab)
            .filter(|session| session.checked.any_checked())
            .and_then(|session| session.scroll_offset)
            .map_or(ScrollRequest::Top, ScrollRequest::Offset)
    }

    /// Record the outgoing tab's offset and compute the incoming tab's scroll.
    pub fn switch_tab(&mut self, from: &TabId, to: &TabId, offset: u32) -> ScrollRequest {
        self.record_scroll_position(from, offset);
        self.restore_scroll_position(to)
    }

    /// Check whether the tab has at least one checked item.
    #[must_use]
    pub fn has_progress(&self, tab: &TabId) -> bool {
        self.sessions
            .get(tab)
            .is_some_and(|session| session.checked.any_checked())
    }

    /// The tab's checked state, or an all-unchecked state built from its
    /// checklist if the tab was never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab has no checklist.
    pub fn checked_state(&self, tab: &TabId) -> Result<CheckedState> {
        let document = Self::document(&self.catalog, tab)?;
        Ok(self.sessions.get(tab).map_or_else(
            || CheckedState::all_false(&document.checkable_keys()),
            |session| session.checked.clone(),
        ))
    }

    /// Classify the tab's items.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab has no checklist.
    pub fn progress(&self, tab: &TabId) -> Result<Progress> {
        let document = Self::document(&self.catalog, tab)?;
        let state = self.checked_state(tab)?;
        Ok(progress::classify(&document.checkable_keys(), &state))
    }

    /// Checkbox status of a section.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab has no checklist or no such section.
    pub fn section_status(&self, tab: &TabId, section: usize) -> Result<SectionStatus> {
        let document = Self::document(&self.catalog, tab)?;
        if section >= document.sections.len() {
            return Err(Error::SectionOutOfRange {
                tab: tab.clone(),
                section,
            });
        }
        let state = self.checked_state(tab)?;
        Ok(progress::section_status(
            &document.section_keys(section),
            &state,
        ))
    }
}
