//! Persisted user preferences.
//!
//! Two values survive a restart: the favorite tab and whether the welcome
//! card was dismissed. Both live behind a [`KeyValueStore`]. A store that
//! fails is never fatal here: reads degrade to "absent" and writes become
//! no-ops, each failure logged at `warn`.

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::storage::KeyValueStore;
use crate::tab::TabId;

/// Storage key of the favorite tab.
pub const FAVORITE_KEY: &str = "acp-checklist-favorite-tab";
/// Storage key of the welcome card dismissal.
pub const WELCOME_SEEN_KEY: &str = "acp-checklist-welcome-seen";

/// The user's persisted preferences.
#[derive(Debug)]
pub struct Preferences {
    store: Box<dyn KeyValueStore>,
    favorite: Option<TabId>,
    welcome_seen: bool,
}

impl Preferences {
    /// Load preferences from `store`.
    ///
    /// A stored favorite that is not one of the catalog's favorite options is
    /// ignored.
    #[must_use]
    pub fn load(store: Box<dyn KeyValueStore>, catalog: &Catalog) -> Self {
        let favorite = read(store.as_ref(), FAVORITE_KEY).and_then(|value| {
            let options = catalog.favorite_options();
            match value.parse::<TabId>() {
                Ok(tab) if options.contains(&tab) => Some(tab),
                _ => {
                    warn!(value = %value, "Ignoring stored favorite: not a known tab");
                    None
                }
            }
        });
        let welcome_seen = read(store.as_ref(), WELCOME_SEEN_KEY).is_some_and(|v| v == "true");

        debug!(favorite = ?favorite, welcome_seen, "Loaded preferences");
        Self {
            store,
            favorite,
            welcome_seen,
        }
    }

    /// The favorite tab, if any.
    #[must_use]
    pub fn favorite(&self) -> Option<&TabId> {
        self.favorite.as_ref()
    }

    /// Toggle `tab` as favorite.
    ///
    /// Selecting the current favorite clears it; selecting anything else
    /// replaces it. Returns the new favorite.
    pub fn select_favorite(&mut self, tab: TabId) -> Option<&TabId> {
        if self.favorite.as_ref() == Some(&tab) {
            self.clear_favorite();
        } else {
            write(self.store.as_mut(), FAVORITE_KEY, Some(tab.as_str()));
            self.favorite = Some(tab);
        }
        self.favorite.as_ref()
    }

    /// Forget the favorite tab.
    pub fn clear_favorite(&mut self) {
        write(self.store.as_mut(), FAVORITE_KEY, None);
        self.favorite = None;
    }

    /// Check whether the first-launch welcome card should be shown.
    #[must_use]
    pub fn welcome_pending(&self) -> bool {
        !self.welcome_seen
    }

    /// Hide the welcome card for good.
    pub fn dismiss_welcome(&mut self) {
        if !self.welcome_seen {
            write(self.store.as_mut(), WELCOME_SEEN_KEY, Some("true"));
            self.welcome_seen = true;
        }
    }
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    store.get(key).unwrap_or_else(|e| {
        warn!(key, error = %e, "Failed to read preference");
        None
    })
}

fn write(store: &mut dyn KeyValueStore, key: &str, value: Option<&str>) {
    let result = match value {
        Some(value) => store.set(key, value),
        None => store.remove(key),
    };
    if let Err(e) = result {
        warn!(key, error = %e, "Failed to persist preference");
    }
}
