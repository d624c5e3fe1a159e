//! Tab identifiers.
//!
//! A tab is a top-level navigation destination: either one of the fixed views
//! (links, notice, favorites, recap) or an aircraft checklist, named after the
//! aircraft registration without its country prefix (`F-BUBK` is `BUBK`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier of the links view.
pub const LINKS: &str = "LIENS";
/// Identifier of the usage notice view (the default tab).
pub const NOTICE: &str = "NOTICE";
/// Identifier of the favorite chooser.
pub const FAVORITES: &str = "FAVORI";
/// Identifier of the performance recap view.
pub const RECAP: &str = "RECAP";

/// What a tab shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabKind {
    /// Useful links and contact.
    Links,
    /// Usage notice.
    Notice,
    /// Favorite tab chooser.
    Favorites,
    /// Performance recap of the fleet.
    Recap,
    /// An aircraft checklist.
    Aircraft,
}

/// A tab identifier, always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TabId(String);

impl TabId {
    /// Create a tab identifier, normalizing case and surrounding whitespace.
    ///
    /// Use [`str::parse`] when the input may be empty.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_ascii_uppercase())
    }

    /// The links view.
    #[must_use]
    pub fn links() -> Self {
        Self(LINKS.to_string())
    }

    /// The notice view.
    #[must_use]
    pub fn notice() -> Self {
        Self(NOTICE.to_string())
    }

    /// The favorite chooser.
    #[must_use]
    pub fn favorites() -> Self {
        Self(FAVORITES.to_string())
    }

    /// The recap view.
    #[must_use]
    pub fn recap() -> Self {
        Self(RECAP.to_string())
    }

    /// The fixed (non-aircraft) views, in header order.
    #[must_use]
    pub fn fixed_views() -> [Self; 4] {
        [Self::links(), Self::notice(), Self::favorites(), Self::recap()]
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// What this tab shows.
    #[must_use]
    pub fn kind(&self) -> TabKind {
        match self.0.as_str() {
            LINKS => TabKind::Links,
            NOTICE => TabKind::Notice,
            FAVORITES => TabKind::Favorites,
            RECAP => TabKind::Recap,
            _ => TabKind::Aircraft,
        }
    }

    /// Check whether this tab is an aircraft checklist.
    #[must_use]
    pub fn is_aircraft(&self) -> bool {
        self.kind() == TabKind::Aircraft
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TabId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self::new(s);
        if id.0.is_empty() || id.0.chars().any(char::is_whitespace) {
            return Err(Error::UnknownTab(s.to_string()));
        }
        Ok(id)
    }
}

impl TryFrom<String> for TabId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TabId> for String {
    fn from(id: TabId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes() {
        assert_eq!(TabId::new("  giya ").as_str(), "GIYA");
    }

    #[test]
    fn test_kind() {
        assert_eq!(TabId::links().kind(), TabKind::Links);
        assert_eq!(TabId::notice().kind(), TabKind::Notice);
        assert_eq!(TabId::favorites().kind(), TabKind::Favorites);
        assert_eq!(TabId::recap().kind(), TabKind::Recap);
        assert_eq!(TabId::new("BUBK").kind(), TabKind::Aircraft);
        assert!(TabId::new("hppl").is_aircraft());
        assert!(!TabId::new("liens").is_aircraft());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!("".parse::<TabId>().is_err());
        assert!("   ".parse::<TabId>().is_err());
        assert!("GI YA".parse::<TabId>().is_err());
    }

    #[test]
    fn test_parse_ok() {
        let tab: TabId = "hnny".parse().unwrap();
        assert_eq!(tab, TabId::new("HNNY"));
        assert_eq!(tab.to_string(), "HNNY");
    }

    #[test]
    fn test_serde_transparent() {
        let tab = TabId::new("GLVX");
        assert_eq!(serde_json::to_string(&tab).unwrap(), "\"GLVX\"");

        let parsed: TabId = serde_json::from_str("\"glvx\"").unwrap();
        assert_eq!(parsed, tab);

        assert!(serde_json::from_str::<TabId>("\"\"").is_err());
    }

    #[test]
    fn test_fixed_views_order() {
        let views = TabId::fixed_views();
        assert_eq!(views[0].as_str(), "LIENS");
        assert_eq!(views[3].as_str(), "RECAP");
    }
}
