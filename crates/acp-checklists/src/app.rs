//! Application controller.
//!
//! [`App`] owns everything that changes while the app runs: the active tab,
//! the per-tab sessions, the preferences, and the transient flags of the
//! checklist view (pending reset confirmation, dismissed warning). Every user
//! action is an [`Intent`] fed to [`App::dispatch`], which applies it and
//! returns the scroll [`Effect`]s the view should perform.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{AircraftRecap, Briefing, Catalog, Link};
use crate::checklist::{CheckedState, ChecklistDocument, ItemKey};
use crate::error::{Error, Result};
use crate::preferences::Preferences;
use crate::progress::{Progress, SectionStatus};
use crate::session::{ScrollRequest, SessionStore};
use crate::tab::{TabId, TabKind};

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Open another tab.
    SwitchTab(TabId),
    /// Flip one item of the active checklist.
    ToggleItem(ItemKey),
    /// Click a section checkbox: checks the section unless it is complete.
    ToggleSection(usize),
    /// Set every item of a section.
    SetSection {
        /// Section index.
        section: usize,
        /// Value to set.
        checked: bool,
    },
    /// Ask to reset the active checklist.
    RequestReset,
    /// Confirm a pending reset.
    ConfirmReset,
    /// Abort a pending reset.
    CancelReset,
    /// Toggle a tab as favorite.
    SelectFavorite(TabId),
    /// Forget the favorite.
    ClearFavorite,
    /// Hide the skipped-items warning until the next change.
    DismissWarning,
    /// Hide the welcome card for good.
    DismissWelcome,
    /// The view was scrolled.
    Scrolled(u32),
}

/// A scroll the view should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Scroll to the top of the page.
    ScrollToTop,
    /// Scroll to an absolute offset.
    ScrollTo(u32),
    /// Bring an item into sight.
    ScrollIntoView(ItemKey),
}

impl From<ScrollRequest> for Effect {
    fn from(request: ScrollRequest) -> Self {
        match request {
            ScrollRequest::Top => Self::ScrollToTop,
            ScrollRequest::Offset(offset) => Self::ScrollTo(offset),
        }
    }
}

/// Everything needed to draw a checklist tab.
#[derive(Debug, Clone)]
pub struct ChecklistScreen<'a> {
    /// The tab.
    pub tab: TabId,
    /// Its checklist.
    pub document: &'a ChecklistDocument,
    /// Performance card of the aircraft, if any.
    pub recap: Option<&'a AircraftRecap>,
    /// Checked items.
    pub state: CheckedState,
    /// Highlights.
    pub progress: Progress,
    /// Checkbox status of each section, in order.
    pub sections: Vec<SectionStatus>,
    /// Number of skipped items to warn about, if the warning is visible.
    pub warning: Option<usize>,
    /// Whether a reset is waiting for confirmation.
    pub reset_pending: bool,
}

/// What the active tab shows.
#[derive(Debug, Clone)]
pub enum Screen<'a> {
    /// Useful links and contact.
    Links {
        /// Links, in catalog order.
        links: &'a [Link],
        /// Contact e-mail address.
        contact: Option<&'a str>,
    },
    /// Usage notice.
    Notice,
    /// Favorite chooser.
    Favorites {
        /// Current favorite.
        current: Option<TabId>,
        /// Selectable tabs.
        options: Vec<TabId>,
    },
    /// Fleet performance recap.
    Recap {
        /// One card per aircraft.
        recaps: &'a [AircraftRecap],
        /// Passenger briefing card.
        briefing: Option<&'a Briefing>,
    },
    /// An aircraft checklist.
    Checklist(Box<ChecklistScreen<'a>>),
    /// An aircraft tab without a checklist.
    NotFound(TabId),
}

/// The application state.
#[derive(Debug)]
pub struct App {
    catalog: Arc<Catalog>,
    sessions: SessionStore,
    preferences: Preferences,
    active: TabId,
    offset: u32,
    reset_pending: bool,
    warning_dismissed: bool,
}

impl App {
    /// Start the app on the favorite tab, or on `default_tab` when no
    /// favorite is set.
    ///
    /// A default tab missing from the catalog falls back to the notice.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, preferences: Preferences, default_tab: TabId) -> Self {
        let active = match preferences.favorite() {
            Some(favorite) => favorite.clone(),
            None if catalog.contains(&default_tab) => default_tab,
            None => {
                warn!(tab = %default_tab, "Default tab not in catalog, showing notice");
                TabId::notice()
            }
        };
        debug!(tab = %active, "Starting");

        Self {
            sessions: SessionStore::new(Arc::clone(&catalog)),
            catalog,
            preferences,
            active,
            offset: 0,
            reset_pending: false,
            warning_dismissed: false,
        }
    }

    /// The catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The per-tab sessions.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// The active tab.
    #[must_use]
    pub fn active_tab(&self) -> &TabId {
        &self.active
    }

    /// Current scroll offset of the view.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The favorite tab.
    #[must_use]
    pub fn favorite(&self) -> Option<&TabId> {
        self.preferences.favorite()
    }

    /// Check whether the welcome card should be shown.
    #[must_use]
    pub fn welcome_pending(&self) -> bool {
        self.preferences.welcome_pending()
    }

    /// Check whether a reset waits for confirmation.
    #[must_use]
    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Apply a user action.
    ///
    /// # Errors
    ///
    /// Returns an error if the action does not apply to the active tab (no
    /// checklist, unknown item or section) or names a tab that cannot be a
    /// favorite. The state is unchanged in that case.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Vec<Effect>> {
        debug!(?intent, tab = %self.active, "Dispatching");
        match intent {
            Intent::SwitchTab(tab) => Ok(self.switch_tab(tab)),
            Intent::ToggleItem(key) => {
                self.sessions.toggle_item(&self.active, key)?;
                self.after_mutation()
            }
            Intent::ToggleSection(section) => {
                let checked = self
                    .sessions
                    .section_status(&self.active, section)?
                    .toggle_target();
                self.sessions.toggle_section(&self.active, section, checked)?;
                self.after_mutation()
            }
            Intent::SetSection { section, checked } => {
                self.sessions.toggle_section(&self.active, section, checked)?;
                self.after_mutation()
            }
            Intent::RequestReset => {
                if self.catalog.checklist(&self.active).is_none() {
                    return Err(Error::DocumentNotFound(self.active.clone()));
                }
                self.reset_pending = true;
                Ok(Vec::new())
            }
            Intent::ConfirmReset => self.confirm_reset(),
            Intent::CancelReset => {
                self.reset_pending = false;
                Ok(Vec::new())
            }
            Intent::SelectFavorite(tab) => self.select_favorite(tab),
            Intent::ClearFavorite => {
                self.preferences.clear_favorite();
                Ok(Vec::new())
            }
            Intent::DismissWarning => {
                self.warning_dismissed = true;
                Ok(Vec::new())
            }
            Intent::DismissWelcome => {
                self.preferences.dismiss_welcome();
                Ok(Vec::new())
            }
            Intent::Scrolled(offset) => {
                self.offset = offset;
                Ok(Vec::new())
            }
        }
    }

    fn switch_tab(&mut self, tab: TabId) -> Vec<Effect> {
        if tab == self.active {
            return Vec::new();
        }

        let scroll = self.sessions.switch_tab(&self.active, &tab, self.offset);
        self.offset = match scroll {
            ScrollRequest::Top => 0,
            ScrollRequest::Offset(offset) => offset,
        };
        self.active = tab;
        self.reset_pending = false;
        self.warning_dismissed = false;
        vec![scroll.into()]
    }

    fn confirm_reset(&mut self) -> Result<Vec<Effect>> {
        if !self.reset_pending {
            debug!("Reset confirmation without request, ignored");
            return Ok(Vec::new());
        }
        self.reset_pending = false;
        let scroll = self.sessions.reset(&self.active)?;
        self.offset = 0;
        self.warning_dismissed = false;
        Ok(vec![scroll.into()])
    }

    fn select_favorite(&mut self, tab: TabId) -> Result<Vec<Effect>> {
        if !self.catalog.favorite_options().contains(&tab) {
            return Err(Error::UnknownTab(tab.to_string()));
        }
        match self.preferences.select_favorite(tab).cloned() {
            Some(favorite) => Ok(self.switch_tab(favorite)),
            None => Ok(Vec::new()),
        }
    }

    fn after_mutation(&mut self) -> Result<Vec<Effect>> {
        self.warning_dismissed = false;
        let progress = self.sessions.progress(&self.active)?;
        Ok(progress
            .scroll_target()
            .map(Effect::ScrollIntoView)
            .into_iter()
            .collect())
    }

    /// Check whether the skipped-items warning is shown.
    ///
    /// # Errors
    ///
    /// Returns an error if the active tab has no checklist.
    pub fn warning_visible(&self) -> Result<bool> {
        let progress = self.sessions.progress(&self.active)?;
        Ok(!self.warning_dismissed && progress.skipped_count() > 0)
    }

    /// Model of the active tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the session of the active checklist cannot be read.
    pub fn screen(&self) -> Result<Screen<'_>> {
        let screen = match self.active.kind() {
            TabKind::Links => Screen::Links {
                links: self.catalog.links(),
                contact: self.catalog.contact(),
            },
            TabKind::Notice => Screen::Notice,
            TabKind::Favorites => Screen::Favorites {
                current: self.preferences.favorite().cloned(),
                options: self.catalog.favorite_options(),
            },
            TabKind::Recap => Screen::Recap {
                recaps: self.catalog.recaps(),
                briefing: self.catalog.briefing(),
            },
            TabKind::Aircraft => match self.catalog.checklist(&self.active) {
                Some(document) => Screen::Checklist(Box::new(self.checklist_screen(document)?)),
                None => Screen::NotFound(self.active.clone()),
            },
        };
        Ok(screen)
    }

    fn checklist_screen<'a>(
        &'a self,
        document: &'a ChecklistDocument,
    ) -> Result<ChecklistScreen<'a>> {
        let tab = self.active.clone();
        let state = self.sessions.checked_state(&tab)?;
        let progress = self.sessions.progress(&tab)?;
        let sections = (0..document.sections.len())
            .map(|section| self.sessions.section_status(&tab, section))
            .collect::<Result<Vec<_>>>()?;
        let warning = (!self.warning_dismissed && progress.skipped_count() > 0)
            .then_some(progress.skipped_count());

        Ok(ChecklistScreen {
            recap: self.catalog.recap(&tab),
            tab,
            document,
            state,
            progress,
            sections,
            warning,
            reset_pending: self.reset_pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::preferences::FAVORITE_KEY;
    use crate::progress::Highlight;
    use crate::storage::MemoryStore;

    fn giya() -> TabId {
        TabId::new("GIYA")
    }

    fn bubk() -> TabId {
        TabId::new("BUBK")
    }

    fn app_with(store: MemoryStore, default_tab: TabId) -> App {
        let catalog = Arc::new(catalog::sample());
        let preferences = Preferences::load(Box::new(store), &catalog);
        App::new(catalog, preferences, default_tab)
    }

    fn app_on(tab: TabId) -> App {
        app_with(MemoryStore::new(), tab)
    }

    fn checklist<'a>(screen: &'a Screen<'a>) -> &'a ChecklistScreen<'a> {
        match screen {
            Screen::Checklist(checklist) => checklist,
            other => panic!("expected a checklist, got {other:?}"),
        }
    }

    #[test]
    fn test_starts_on_default_tab() {
        let app = app_on(TabId::notice());
        assert_eq!(app.active_tab(), &TabId::notice());
        assert!(matches!(app.screen().unwrap(), Screen::Notice));
    }

    #[test]
    fn test_starts_on_favorite() {
        let app = app_with(
            MemoryStore::new().with_value(FAVORITE_KEY, "BUBK"),
            TabId::notice(),
        );
        assert_eq!(app.active_tab(), &bubk());
    }

    #[test]
    fn test_unknown_default_falls_back_to_notice() {
        let app = app_on(TabId::new("ZZZZ"));
        assert_eq!(app.active_tab(), &TabId::notice());
    }

    #[test]
    fn test_toggle_scrolls_to_next() {
        let mut app = app_on(giya());
        let effects = app.dispatch(Intent::ToggleItem(ItemKey::new(0, 0))).unwrap();
        assert_eq!(effects, vec![Effect::ScrollIntoView(ItemKey::new(0, 1))]);
    }

    #[test]
    fn test_skipped_item_wins_scroll() {
        let mut app = app_on(giya());
        let effects = app.dispatch(Intent::ToggleItem(ItemKey::new(1, 1))).unwrap();
        assert_eq!(effects, vec![Effect::ScrollIntoView(ItemKey::new(0, 0))]);
        assert!(app.warning_visible().unwrap());
    }

    #[test]
    fn test_complete_checklist_has_no_scroll() {
        let mut app = app_on(bubk());
        app.dispatch(Intent::ToggleSection(0)).unwrap();
        let effects = app.dispatch(Intent::SetSection {
            section: 0,
            checked: true,
        });
        assert_eq!(effects.unwrap(), Vec::new());
    }

    #[test]
    fn test_toggle_section_follows_status() {
        let mut app = app_on(bubk());
        app.dispatch(Intent::ToggleItem(ItemKey::new(0, 1))).unwrap();

        // Partial: checks everything.
        app.dispatch(Intent::ToggleSection(0)).unwrap();
        assert_eq!(
            app.sessions().section_status(&bubk(), 0).unwrap(),
            SectionStatus::Complete
        );

        // Complete: unchecks everything.
        app.dispatch(Intent::ToggleSection(0)).unwrap();
        assert_eq!(
            app.sessions().section_status(&bubk(), 0).unwrap(),
            SectionStatus::Unchecked
        );
    }

    #[test]
    fn test_rejected_toggle_leaves_state() {
        let mut app = app_on(giya());
        assert!(app.dispatch(Intent::ToggleItem(ItemKey::new(0, 2))).is_err());
        assert!(app.dispatch(Intent::ToggleSection(9)).is_err());
        assert!(!app.sessions().has_progress(&giya()));
    }

    #[test]
    fn test_dismissed_warning_returns_on_mutation() {
        let mut app = app_on(giya());
        app.dispatch(Intent::ToggleItem(ItemKey::new(0, 1))).unwrap();
        assert!(app.warning_visible().unwrap());

        app.dispatch(Intent::DismissWarning).unwrap();
        assert!(!app.warning_visible().unwrap());
        assert_eq!(checklist(&app.screen().unwrap()).warning, None);

        app.dispatch(Intent::ToggleItem(ItemKey::new(1, 1))).unwrap();
        assert!(app.warning_visible().unwrap());
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut app = app_on(giya());
        app.dispatch(Intent::ToggleItem(ItemKey::new(0, 0))).unwrap();

        // Confirmation alone does nothing.
        assert!(app.dispatch(Intent::ConfirmReset).unwrap().is_empty());
        assert!(app.sessions().has_progress(&giya()));

        app.dispatch(Intent::RequestReset).unwrap();
        assert!(app.reset_pending());
        app.dispatch(Intent::CancelReset).unwrap();
        assert!(app.sessions().has_progress(&giya()));

        app.dispatch(Intent::RequestReset).unwrap();
        let effects = app.dispatch(Intent::ConfirmReset).unwrap();
        assert_eq!(effects, vec![Effect::ScrollToTop]);
        assert!(!app.sessions().has_progress(&giya()));
        assert!(!app.reset_pending());
    }

    #[test]
    fn test_reset_needs_a_checklist() {
        let mut app = app_on(TabId::recap());
        assert!(matches!(
            app.dispatch(Intent::RequestReset),
            Err(Error::DocumentNotFound(_))
        ));
        assert!(!app.reset_pending());
    }

    #[test]
    fn test_switch_restores_scroll_with_progress() {
        let mut app = app_on(giya());
        app.dispatch(Intent::ToggleItem(ItemKey::new(0, 0))).unwrap();
        app.dispatch(Intent::Scrolled(640)).unwrap();

        assert_eq!(
            app.dispatch(Intent::SwitchTab(bubk())).unwrap(),
            vec![Effect::ScrollToTop]
        );
        assert_eq!(app.offset(), 0);

        assert_eq!(
            app.dispatch(Intent::SwitchTab(giya())).unwrap(),
            vec![Effect::ScrollTo(640)]
        );
        assert_eq!(app.offset(), 640);
    }

    #[test]
    fn test_switch_without_progress_scrolls_top() {
        let mut app = app_on(giya());
        app.dispatch(Intent::Scrolled(300)).unwrap();
        app.dispatch(Intent::SwitchTab(bubk())).unwrap();
        assert_eq!(
            app.dispatch(Intent::SwitchTab(giya())).unwrap(),
            vec![Effect::ScrollToTop]
        );
    }

    #[test]
    fn test_switch_to_same_tab_is_noop() {
        let mut app = app_on(giya());
        app.dispatch(Intent::RequestReset).unwrap();
        assert!(app.dispatch(Intent::SwitchTab(giya())).unwrap().is_empty());
        assert!(app.reset_pending());
    }

    #[test]
    fn test_switch_clears_pending_reset() {
        let mut app = app_on(giya());
        app.dispatch(Intent::ToggleItem(ItemKey::new(0, 0))).unwrap();
        app.dispatch(Intent::RequestReset).unwrap();
        app.dispatch(Intent::SwitchTab(bubk())).unwrap();
        app.dispatch(Intent::SwitchTab(giya())).unwrap();

        assert!(!app.reset_pending());
        assert!(app.dispatch(Intent::ConfirmReset).unwrap().is_empty());
        assert!(app.sessions().has_progress(&giya()));
    }

    #[test]
    fn test_select_favorite_switches() {
        let mut app = app_on(TabId::favorites());
        let effects = app.dispatch(Intent::SelectFavorite(giya())).unwrap();
        assert_eq!(effects, vec![Effect::ScrollToTop]);
        assert_eq!(app.active_tab(), &giya());
        assert_eq!(app.favorite(), Some(&giya()));
    }

    #[test]
    fn test_deselect_favorite_stays() {
        let mut app = app_on(TabId::favorites());
        app.dispatch(Intent::SelectFavorite(giya())).unwrap();
        app.dispatch(Intent::SwitchTab(TabId::favorites())).unwrap();

        let effects = app.dispatch(Intent::SelectFavorite(giya())).unwrap();
        assert!(effects.is_empty());
        assert_eq!(app.favorite(), None);
        assert_eq!(app.active_tab(), &TabId::favorites());
    }

    #[test]
    fn test_select_invalid_favorite() {
        let mut app = app_on(TabId::favorites());
        assert!(app.dispatch(Intent::SelectFavorite(TabId::notice())).is_err());
        assert!(app
            .dispatch(Intent::SelectFavorite(TabId::new("ZZZZ")))
            .is_err());
        assert_eq!(app.favorite(), None);
    }

    #[test]
    fn test_clear_favorite() {
        let mut app = app_with(
            MemoryStore::new().with_value(FAVORITE_KEY, "GIYA"),
            TabId::notice(),
        );
        app.dispatch(Intent::ClearFavorite).unwrap();
        assert_eq!(app.favorite(), None);
        assert_eq!(app.active_tab(), &giya());
    }

    #[test]
    fn test_dismiss_welcome() {
        let mut app = app_on(TabId::notice());
        assert!(app.welcome_pending());
        app.dispatch(Intent::DismissWelcome).unwrap();
        assert!(!app.welcome_pending());
    }

    #[test]
    fn test_screen_for_each_view() {
        let mut app = app_on(TabId::links());
        assert!(matches!(app.screen().unwrap(), Screen::Links { .. }));

        app.dispatch(Intent::SwitchTab(TabId::recap())).unwrap();
        assert!(matches!(app.screen().unwrap(), Screen::Recap { .. }));

        app.dispatch(Intent::SwitchTab(TabId::favorites())).unwrap();
        match app.screen().unwrap() {
            Screen::Favorites { current, options } => {
                assert_eq!(current, None);
                assert_eq!(options.len(), 4);
            }
            other => panic!("unexpected screen {other:?}"),
        }

        app.dispatch(Intent::SwitchTab(TabId::new("ZZZZ"))).unwrap();
        assert!(matches!(app.screen().unwrap(), Screen::NotFound(_)));
    }

    #[test]
    fn test_checklist_screen() {
        let mut app = app_on(giya());
        app.dispatch(Intent::ToggleItem(ItemKey::new(0, 1))).unwrap();
        app.dispatch(Intent::RequestReset).unwrap();

        let screen = app.screen().unwrap();
        let screen = checklist(&screen);
        assert_eq!(screen.tab, giya());
        assert_eq!(screen.sections, vec![SectionStatus::Partial, SectionStatus::Unchecked]);
        assert_eq!(screen.warning, Some(1));
        assert_eq!(screen.progress.highlight(ItemKey::new(0, 0)), Highlight::Skipped);
        assert_eq!(screen.progress.highlight(ItemKey::new(1, 1)), Highlight::Next);
        assert!(screen.reset_pending);
        assert!(screen.recap.is_none());
    }

    #[test]
    fn test_empty_document_is_not_found() {
        let gkqa = TabId::new("GKQA");
        let empty = ChecklistDocument::new("Checklist F-GKQA", vec![]);
        let catalog = Catalog::new([(gkqa.clone(), empty)]).unwrap();
        let preferences = Preferences::load(Box::new(MemoryStore::new()), &catalog);
        let mut app = App::new(Arc::new(catalog), preferences, gkqa.clone());
        assert_eq!(app.active_tab(), &gkqa);

        assert!(matches!(app.screen().unwrap(), Screen::NotFound(tab) if tab == gkqa));
        assert!(matches!(
            app.dispatch(Intent::RequestReset),
            Err(Error::DocumentNotFound(_))
        ));
        assert!(matches!(
            app.dispatch(Intent::ToggleItem(ItemKey::new(0, 0))),
            Err(Error::DocumentNotFound(_))
        ));
        assert!(!app.reset_pending());
    }
}
